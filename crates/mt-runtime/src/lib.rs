//! Executes dialogue source units and collects what they append.

mod builder;
mod helpers {
    pub(crate) mod rhai_bridge;
}
mod sandbox;
mod script_api;

pub use builder::{ActionSink, DialogueBuilder};
pub use sandbox::{
    ExecutionOutcome, SandboxOptions, ScriptSandbox, UnitIdentity, DEFAULT_ENTRY_POINT,
};
