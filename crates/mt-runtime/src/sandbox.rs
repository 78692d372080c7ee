use std::cell::RefCell;
use std::fmt;
use std::fs;
use std::path::Path;
use std::rc::Rc;

use rhai::{CallFnOptions, Dynamic, Engine, EvalAltResult, Scope};

use mt_core::DialogueError;

use crate::builder::ActionSink;
use crate::script_api::{register_dialogue_api, ActionRecorder, SharedRecorder};

pub const DEFAULT_ENTRY_POINT: &str = "story";

const MAX_EXPR_DEPTH: usize = 64;
const MAX_FUNCTION_EXPR_DEPTH: usize = 32;
const MAX_CALL_LEVELS: usize = 64;

/// Identity of one source unit within one compile. Fresh for every run, so
/// the same file name under another project or group never shares state.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UnitIdentity {
    pub project: String,
    pub group: String,
    pub file: String,
}

impl UnitIdentity {
    pub fn new(project: &str, group: &str, file: &str) -> Self {
        Self {
            project: project.to_string(),
            group: group.to_string(),
            file: file.to_string(),
        }
    }
}

impl fmt::Display for UnitIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.project, self.group, self.file)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionOutcome {
    /// Top-level code and the entry point both ran.
    Completed { appended: usize },
    /// The source file does not exist.
    Skipped { reason: String },
    /// Top-level code ran but the unit has no entry point.
    NoEntryPoint { reason: String, appended: usize },
}

impl ExecutionOutcome {
    pub fn log_tag(&self) -> &'static str {
        match self {
            Self::Completed { .. } => "OK",
            Self::Skipped { .. } => "SKIP",
            Self::NoEntryPoint { .. } => "WARN",
        }
    }

    pub fn appended(&self) -> usize {
        match self {
            Self::Completed { appended } | Self::NoEntryPoint { appended, .. } => *appended,
            Self::Skipped { .. } => 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SandboxOptions {
    pub entry_point: String,
    /// Rhai operation budget per unit; `None` runs unbounded.
    pub max_operations: Option<u64>,
}

impl Default for SandboxOptions {
    fn default() -> Self {
        Self {
            entry_point: DEFAULT_ENTRY_POINT.to_string(),
            max_operations: None,
        }
    }
}

/// Executes dialogue source units. Each call re-reads the file and builds a
/// new engine; nothing compiled is kept between calls.
#[derive(Debug, Clone, Default)]
pub struct ScriptSandbox {
    options: SandboxOptions,
}

fn map_eval_error(unit: &UnitIdentity, error: Box<EvalAltResult>) -> DialogueError {
    DialogueError::internal(
        "SANDBOX_EVAL_ERROR",
        format!("Script \"{}\" failed: {}", unit, error),
    )
}

impl ScriptSandbox {
    pub fn new(options: SandboxOptions) -> Self {
        Self { options }
    }

    fn build_engine(&self, unit: &UnitIdentity, recorder: &SharedRecorder) -> Engine {
        let mut engine = Engine::new();
        engine.set_strict_variables(true);
        engine.set_max_expr_depths(MAX_EXPR_DEPTH, MAX_FUNCTION_EXPR_DEPTH);
        engine.set_max_call_levels(MAX_CALL_LEVELS);
        if let Some(limit) = self.options.max_operations {
            engine.set_max_operations(limit);
        }

        let print_unit = unit.to_string();
        engine.on_print(move |text| {
            tracing::info!(unit = %print_unit, "{}", text);
        });
        let debug_unit = unit.to_string();
        engine.on_debug(move |text, _source, position| {
            tracing::debug!(unit = %debug_unit, %position, "{}", text);
        });

        register_dialogue_api(&mut engine, recorder);
        engine
    }

    /// Runs one unit and forwards what it appended to `sink`. Parse and
    /// runtime faults are internal errors and leave `sink` untouched.
    pub fn load_and_run(
        &self,
        unit: &UnitIdentity,
        source_path: &Path,
        sink: &mut dyn ActionSink,
    ) -> Result<ExecutionOutcome, DialogueError> {
        if !source_path.exists() {
            tracing::debug!(unit = %unit, path = %source_path.display(), "source unit missing");
            return Ok(ExecutionOutcome::Skipped {
                reason: "not found".to_string(),
            });
        }

        let source = fs::read_to_string(source_path).map_err(|error| {
            DialogueError::internal(
                "SANDBOX_READ_ERROR",
                format!("Cannot read \"{}\": {}", source_path.display(), error),
            )
        })?;

        let recorder: SharedRecorder = Rc::new(RefCell::new(ActionRecorder::new()));
        let engine = self.build_engine(unit, &recorder);

        let mut ast = engine.compile(&source).map_err(|error| {
            DialogueError::internal(
                "SANDBOX_PARSE_ERROR",
                format!("Script \"{}\" does not parse: {}", unit, error),
            )
        })?;
        ast.set_source(unit.to_string());

        let mut scope = Scope::new();
        engine
            .run_ast_with_scope(&mut scope, &ast)
            .map_err(|error| map_eval_error(unit, error))?;

        let entry_point = self.options.entry_point.as_str();
        let has_entry_point = ast
            .iter_functions()
            .any(|function| function.name == entry_point && function.params.is_empty());
        if has_entry_point {
            let options = CallFnOptions::new().eval_ast(false).rewind_scope(true);
            engine
                .call_fn_with_options::<Dynamic>(options, &mut scope, &ast, entry_point, ())
                .map_err(|error| map_eval_error(unit, error))?;
        }

        let actions = {
            let mut recorder = recorder.borrow_mut();
            if recorder.depth() != 0 {
                return Err(DialogueError::internal(
                    "SANDBOX_RECORDER_UNBALANCED",
                    format!("Script \"{}\" left a conditional block open.", unit),
                ));
            }
            recorder.take_actions()
        };
        let appended = actions.len();
        sink.extend(actions);

        tracing::debug!(unit = %unit, appended, has_entry_point, "source unit executed");
        if has_entry_point {
            Ok(ExecutionOutcome::Completed { appended })
        } else {
            Ok(ExecutionOutcome::NoEntryPoint {
                reason: format!("no entry point `{}()`", entry_point),
                appended,
            })
        }
    }
}
