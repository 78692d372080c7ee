use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Who has to act on a failure: the script author, the caller, or us.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The author's scripts or manifest are wrong and can be fixed by editing them.
    Script,
    /// A project or group named by the request does not exist.
    NotFound,
    /// Anything else, including faults raised while executing a source unit.
    Internal,
}

impl ErrorKind {
    pub fn status_code(self) -> u16 {
        match self {
            Self::Script => 400,
            Self::NotFound => 404,
            Self::Internal => 500,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{code}: {message}")]
pub struct DialogueError {
    pub code: String,
    pub message: String,
    pub kind: ErrorKind,
}

impl DialogueError {
    pub fn new(kind: ErrorKind, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            kind,
        }
    }

    pub fn script(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Script, code, message)
    }

    pub fn not_found(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, code, message)
    }

    pub fn internal(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, code, message)
    }

    pub fn is_script_error(&self) -> bool {
        self.kind == ErrorKind::Script
    }
}

#[cfg(test)]
mod error_tests {
    use super::*;

    #[test]
    fn constructors_set_kind_and_display_code() {
        let error = DialogueError::script("COMPILER_LABEL_NOT_FOUND", "Label \"x\" not found.");
        assert!(error.is_script_error());
        assert_eq!(
            error.to_string(),
            "COMPILER_LABEL_NOT_FOUND: Label \"x\" not found."
        );

        assert_eq!(
            DialogueError::not_found("PROJECT_NOT_FOUND", "gone").kind,
            ErrorKind::NotFound
        );
        assert!(!DialogueError::internal("SANDBOX_EVAL_ERROR", "boom").is_script_error());
    }

    #[test]
    fn kinds_map_to_transport_status() {
        assert_eq!(ErrorKind::Script.status_code(), 400);
        assert_eq!(ErrorKind::NotFound.status_code(), 404);
        assert_eq!(ErrorKind::Internal.status_code(), 500);
    }
}
