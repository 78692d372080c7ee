use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use mt_core::DEFAULT_SOURCE_FILE;
use mt_runtime::{SandboxOptions, DEFAULT_ENTRY_POINT};

pub const DEFAULT_PROJECTS_DIR: &str = "projects";
pub const DEFAULT_GENERATED_DIR: &str = "generated";
pub const MANIFEST_FILE: &str = "manifest.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Directory holding one folder per project.
    pub projects_dir: PathBuf,
    /// Artifact directory, relative to each project folder.
    pub generated_dir: PathBuf,
    /// Source file of the default group when the manifest declares none.
    pub default_source_file: String,
    pub entry_point: String,
    pub max_operations: Option<u64>,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            projects_dir: PathBuf::from(DEFAULT_PROJECTS_DIR),
            generated_dir: PathBuf::from(DEFAULT_GENERATED_DIR),
            default_source_file: DEFAULT_SOURCE_FILE.to_string(),
            entry_point: DEFAULT_ENTRY_POINT.to_string(),
            max_operations: None,
        }
    }
}

impl CompilerConfig {
    pub fn with_projects_dir(projects_dir: impl Into<PathBuf>) -> Self {
        Self {
            projects_dir: projects_dir.into(),
            ..Self::default()
        }
    }

    pub fn project_dir(&self, project: &str) -> PathBuf {
        self.projects_dir.join(project)
    }

    pub fn artifact_dir(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.generated_dir)
    }

    pub fn artifact_path(&self, project_dir: &Path, group_slug: &str) -> PathBuf {
        self.artifact_dir(project_dir).join(format!("{}.json", group_slug))
    }

    pub(crate) fn sandbox_options(&self) -> SandboxOptions {
        SandboxOptions {
            entry_point: self.entry_point.clone(),
            max_operations: self.max_operations,
        }
    }
}

#[cfg(test)]
mod config_tests {
    use super::*;

    #[test]
    fn defaults_match_project_layout() {
        let config = CompilerConfig::default();
        assert_eq!(config.projects_dir, PathBuf::from("projects"));
        assert_eq!(config.default_source_file, "main.rhai");
        assert_eq!(config.entry_point, "story");
        assert_eq!(config.max_operations, None);

        let project_dir = config.project_dir("demo");
        assert_eq!(
            config.artifact_path(&project_dir, "behavior"),
            PathBuf::from("projects/demo/generated/behavior.json")
        );
    }

    #[test]
    fn partial_json_config_keeps_defaults() {
        let config: CompilerConfig =
            serde_json::from_str(r#"{"entry_point":"main","max_operations":5000}"#)
                .expect("config should parse");
        assert_eq!(config.entry_point, "main");
        assert_eq!(config.max_operations, Some(5000));
        assert_eq!(config.generated_dir, PathBuf::from("generated"));
        assert_eq!(config.sandbox_options().entry_point, "main");
    }
}
