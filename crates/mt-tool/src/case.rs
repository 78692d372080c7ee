use serde::{Deserialize, Serialize};

use mt_core::{ErrorKind, GroupStatus};

pub const TESTCASE_SCHEMA_V1: &str = "mt-tool-case.v1";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    pub schema_version: String,
    #[serde(default)]
    pub mode: CaseMode,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub expected_groups: Vec<ExpectedGroup>,
    #[serde(default)]
    pub expected_error: Option<ExpectedError>,
    /// Lines that must appear in the request log, in any position.
    #[serde(default)]
    pub expected_logs: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseMode {
    #[default]
    Persist,
    Preview,
    Check,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectedGroup {
    pub slug: String,
    pub status: GroupStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub states: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectedError {
    pub code: String,
    pub kind: ErrorKind,
}
