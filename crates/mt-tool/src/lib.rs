mod case;
mod runner;
mod source;

pub use case::{CaseMode, ExpectedError, ExpectedGroup, TestCase, TESTCASE_SCHEMA_V1};
pub use runner::{assert_case, run_case, RunReport};
pub use source::{copy_project, read_test_case};

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MtToolError {
    #[error("Failed to read file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse testcase {path}: {source}")]
    ParseCase {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Invalid testcase schema version \"{found}\", expected \"{expected}\".")]
    InvalidSchemaVersion { expected: String, found: String },
    #[error("Failed to copy project into {path}: {source}")]
    CopyProject {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to scan project: {0}")]
    Scan(#[from] walkdir::Error),
    #[error("Project path {path} has no file name.")]
    ProjectName { path: PathBuf },
    #[error("Expected error {expected_code}, but the compile succeeded.")]
    UnexpectedSuccess { expected_code: String },
    #[error("Compile failed unexpectedly: {0}")]
    UnexpectedFailure(mt_core::DialogueError),
    #[error("Error mismatch. expected={expected} actual={actual}")]
    ErrorMismatch { expected: String, actual: String },
    #[error("Expected group count {expected}, actual {actual}. observed={observed}")]
    GroupCountMismatch {
        expected: usize,
        actual: usize,
        observed: String,
    },
    #[error("Group mismatch at index {index}. expected={expected} actual={actual}")]
    GroupMismatch {
        index: usize,
        expected: String,
        actual: String,
    },
    #[error("Log line missing: {line}. observed={observed}")]
    MissingLog { line: String, observed: String },
    #[error("Artifact for group \"{group}\" should {expectation}.")]
    ArtifactMismatch { group: String, expectation: String },
    #[error("Failed to serialize value for diff: {0}")]
    Serialize(serde_json::Error),
}
