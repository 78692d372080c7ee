mod config;
mod orchestrator;
mod project;
mod report;

pub use config::{CompilerConfig, DEFAULT_GENERATED_DIR, DEFAULT_PROJECTS_DIR, MANIFEST_FILE};
pub use orchestrator::{compile_project, CompileMode, CompileOptions, ProjectCompiler};
pub use project::{load_project, LoadedProject};
pub use report::{error_detail, CompileFailure, CompileResult};
