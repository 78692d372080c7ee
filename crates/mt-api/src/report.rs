use serde::Serialize;
use thiserror::Error;

use mt_core::{
    CompilationReport, DialogueError, ErrorKind, ErrorResponse, GroupReport, PreviewResult,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CompileResult {
    Report(CompilationReport),
    Preview(PreviewResult),
}

impl CompileResult {
    pub fn logs(&self) -> &[String] {
        match self {
            Self::Report(report) => &report.logs,
            Self::Preview(preview) => &preview.logs,
        }
    }
}

/// A compile request that aborted. Keeps everything logged and every group
/// finished before the abort.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{error}")]
pub struct CompileFailure {
    pub error: DialogueError,
    pub logs: Vec<String>,
    pub groups: Vec<GroupReport>,
}

impl From<DialogueError> for CompileFailure {
    fn from(error: DialogueError) -> Self {
        Self {
            error,
            logs: Vec::new(),
            groups: Vec::new(),
        }
    }
}

impl CompileFailure {
    pub fn status_code(&self) -> u16 {
        self.error.kind.status_code()
    }

    pub fn to_error_response(&self) -> ErrorResponse {
        ErrorResponse {
            status_code: self.status_code(),
            code: self.error.code.clone(),
            detail: error_detail(&self.error),
            logs: self.logs.clone(),
        }
    }
}

/// Caller-facing text for an error. Internal faults expose only their code.
pub fn error_detail(error: &DialogueError) -> String {
    match error.kind {
        ErrorKind::Script => format!("Script Validation Error: {}", error.message),
        ErrorKind::NotFound => error.message.clone(),
        ErrorKind::Internal => format!("Internal compiler error ({})", error.code),
    }
}

pub(crate) fn build_report(
    groups: Vec<GroupReport>,
    logs: Vec<String>,
    persisted: bool,
) -> CompilationReport {
    let verb = if persisted { "Compiled" } else { "Checked" };
    CompilationReport {
        message: format!("{} {} script group(s).", verb, groups.len()),
        groups,
        logs,
    }
}
