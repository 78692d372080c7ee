use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::DialogueError;
use crate::fsm::Fsm;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupStatus {
    Success,
    Empty,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupReport {
    #[serde(skip)]
    pub slug: String,
    pub status: GroupStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub states: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GroupReport {
    pub fn success(slug: &str, states: usize) -> Self {
        Self {
            slug: slug.to_string(),
            status: GroupStatus::Success,
            states: Some(states),
            error: None,
        }
    }

    pub fn empty(slug: &str) -> Self {
        Self {
            slug: slug.to_string(),
            status: GroupStatus::Empty,
            states: None,
            error: None,
        }
    }

    pub fn failed(slug: &str, error: &DialogueError) -> Self {
        Self {
            slug: slug.to_string(),
            status: GroupStatus::Failed,
            states: None,
            error: Some(error.message.clone()),
        }
    }
}

/// Outcome of a persisting compile: one entry per group in manifest order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilationReport {
    pub message: String,
    pub groups: Vec<GroupReport>,
    pub logs: Vec<String>,
}

impl CompilationReport {
    pub fn group(&self, slug: &str) -> Option<&GroupReport> {
        self.groups.iter().find(|group| group.slug == slug)
    }
}

struct GroupsBySlug<'a>(&'a [GroupReport]);

impl Serialize for GroupsBySlug<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for group in self.0 {
            map.serialize_entry(&group.slug, group)?;
        }
        map.end()
    }
}

impl Serialize for CompilationReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry("message", &self.message)?;
        map.serialize_entry("report", &GroupsBySlug(&self.groups))?;
        map.serialize_entry("logs", &self.logs)?;
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreviewResult {
    pub status: String,
    pub group: String,
    pub state_count: usize,
    pub data: Fsm,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub logs: Vec<String>,
}

/// Transport-facing view of a failed compile request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorResponse {
    pub status_code: u16,
    pub code: String,
    pub detail: String,
    pub logs: Vec<String>,
}

#[cfg(test)]
mod report_tests {
    use super::*;

    #[test]
    fn report_serializes_groups_keyed_by_slug_in_order() {
        let report = CompilationReport {
            message: "Compiled 2 script group(s).".to_string(),
            groups: vec![GroupReport::success("zz", 3), GroupReport::empty("aa")],
            logs: vec!["[zz] OK a.rhai".to_string()],
        };
        let json = serde_json::to_string(&report).expect("serialize");
        assert_eq!(
            json,
            r#"{"message":"Compiled 2 script group(s).","report":{"zz":{"status":"success","states":3},"aa":{"status":"empty"}},"logs":["[zz] OK a.rhai"]}"#
        );
        assert_eq!(report.group("aa").expect("aa").status, GroupStatus::Empty);
    }

    #[test]
    fn failed_group_carries_error_message() {
        let error = DialogueError::script("COMPILER_LABEL_NOT_FOUND", "Label \"x\" not found.");
        let group = GroupReport::failed("behavior", &error);
        let json = serde_json::to_string(&group).expect("serialize");
        assert_eq!(
            json,
            r#"{"status":"failed","error":"Label \"x\" not found."}"#
        );
    }
}
