pub mod action;
pub mod error;
pub mod fsm;
pub mod manifest;
pub mod report;
pub mod value;

pub use action::*;
pub use error::{DialogueError, ErrorKind};
pub use fsm::*;
pub use manifest::*;
pub use report::*;
pub use value::*;
