use std::collections::BTreeSet;
use std::path::{Component, Path};
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::DialogueError;

pub const DEFAULT_GROUP_SLUG: &str = "behavior";
pub const DEFAULT_GROUP_NAME: &str = "Main";
pub const DEFAULT_SOURCE_FILE: &str = "main.rhai";

/// Source units compiled together into one artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptGroup {
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub source_files: Vec<String>,
}

impl ScriptGroup {
    pub fn default_group(source_files: Vec<String>) -> Self {
        Self {
            slug: DEFAULT_GROUP_SLUG.to_string(),
            name: DEFAULT_GROUP_NAME.to_string(),
            source_files,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectManifest {
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<String>,
    /// Older manifests list a single ordered file list instead of groups.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub build_order: Vec<String>,
    #[serde(default)]
    pub script_groups: Vec<ScriptGroup>,
}

impl ProjectManifest {
    /// Manifest assumed for a project folder that has no `manifest.json`.
    pub fn fallback(slug: &str) -> Self {
        Self {
            slug: slug.to_string(),
            name: slug.to_string(),
            description: String::new(),
            version: None,
            authors: Vec::new(),
            build_order: Vec::new(),
            script_groups: Vec::new(),
        }
    }

    pub fn parse(raw: &str) -> Result<Self, DialogueError> {
        let manifest: Self = serde_json::from_str(raw).map_err(|error| {
            DialogueError::script(
                "PROJECT_MANIFEST_INVALID",
                format!("manifest.json is not a valid project manifest: {}", error),
            )
        })?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Declared groups, or the single default group when none are declared.
    pub fn effective_groups(&self, default_source_file: &str) -> Vec<ScriptGroup> {
        if !self.script_groups.is_empty() {
            return self.script_groups.clone();
        }
        let files = if self.build_order.is_empty() {
            vec![default_source_file.to_string()]
        } else {
            self.build_order.clone()
        };
        vec![ScriptGroup::default_group(files)]
    }

    pub fn validate(&self) -> Result<(), DialogueError> {
        let mut seen = BTreeSet::new();
        for group in &self.script_groups {
            if !is_valid_slug(&group.slug) {
                return Err(DialogueError::script(
                    "PROJECT_SLUG_INVALID",
                    format!(
                        "Script group slug \"{}\" may only contain letters, digits, '-' and '_'.",
                        group.slug
                    ),
                ));
            }
            if !seen.insert(group.slug.as_str()) {
                return Err(DialogueError::script(
                    "PROJECT_GROUP_DUPLICATE",
                    format!("Script group \"{}\" is declared more than once.", group.slug),
                ));
            }
            for file in &group.source_files {
                check_source_path(file, &format!("group \"{}\"", group.slug))?;
            }
        }
        for file in &self.build_order {
            check_source_path(file, "build_order")?;
        }
        Ok(())
    }
}

/// Source files must stay inside the project folder.
fn check_source_path(file: &str, owner: &str) -> Result<(), DialogueError> {
    let path = Path::new(file);
    let escapes = file.is_empty()
        || file.starts_with('/')
        || file.starts_with('\\')
        || path.is_absolute()
        || path
            .components()
            .any(|component| !matches!(component, Component::Normal(_) | Component::CurDir));
    if escapes {
        return Err(DialogueError::script(
            "PROJECT_SOURCE_PATH_INVALID",
            format!(
                "Source file \"{}\" in {} must be relative to the project.",
                file, owner
            ),
        ));
    }
    Ok(())
}

pub fn is_valid_slug(slug: &str) -> bool {
    static SLUG: OnceLock<Regex> = OnceLock::new();
    SLUG.get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("slug regex must compile"))
        .is_match(slug)
}
