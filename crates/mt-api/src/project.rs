use std::fs;
use std::path::PathBuf;

use mt_core::{is_valid_slug, DialogueError, ProjectManifest, ScriptGroup};

use crate::config::{CompilerConfig, MANIFEST_FILE};

/// A project folder with its manifest resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedProject {
    pub slug: String,
    pub dir: PathBuf,
    pub manifest: ProjectManifest,
    pub groups: Vec<ScriptGroup>,
}

impl LoadedProject {
    pub fn group(&self, slug: &str) -> Option<&ScriptGroup> {
        self.groups.iter().find(|group| group.slug == slug)
    }

    pub fn require_group(&self, slug: &str) -> Result<&ScriptGroup, DialogueError> {
        self.group(slug).ok_or_else(|| {
            DialogueError::not_found(
                "PROJECT_GROUP_NOT_FOUND",
                format!(
                    "Script group \"{}\" does not exist in project \"{}\".",
                    slug, self.slug
                ),
            )
        })
    }

    /// Groups to compile: all of them, or just the one named by `filter`.
    pub fn select_groups(&self, filter: Option<&str>) -> Result<Vec<ScriptGroup>, DialogueError> {
        match filter {
            Some(slug) => Ok(vec![self.require_group(slug)?.clone()]),
            None => Ok(self.groups.clone()),
        }
    }

    /// Group used when a preview names none.
    pub fn first_group(&self) -> Result<&ScriptGroup, DialogueError> {
        self.groups.first().ok_or_else(|| {
            DialogueError::not_found(
                "PROJECT_GROUP_NOT_FOUND",
                format!("Project \"{}\" declares no script groups.", self.slug),
            )
        })
    }
}

pub fn load_project(config: &CompilerConfig, slug: &str) -> Result<LoadedProject, DialogueError> {
    if !is_valid_slug(slug) {
        return Err(DialogueError::script(
            "PROJECT_SLUG_INVALID",
            format!(
                "Project slug \"{}\" may only contain letters, digits, '-' and '_'.",
                slug
            ),
        ));
    }

    let dir = config.project_dir(slug);
    if !dir.is_dir() {
        return Err(DialogueError::not_found(
            "PROJECT_NOT_FOUND",
            format!("Project \"{}\" not found under {}.", slug, config.projects_dir.display()),
        ));
    }

    let manifest_path = dir.join(MANIFEST_FILE);
    let manifest = if manifest_path.is_file() {
        let raw = fs::read_to_string(&manifest_path).map_err(|error| {
            DialogueError::internal(
                "PROJECT_MANIFEST_READ",
                format!("Cannot read {}: {}", manifest_path.display(), error),
            )
        })?;
        ProjectManifest::parse(&raw)?
    } else {
        tracing::debug!(project = slug, "no manifest, using default group");
        ProjectManifest::fallback(slug)
    };

    let groups = manifest.effective_groups(&config.default_source_file);
    Ok(LoadedProject {
        slug: slug.to_string(),
        dir,
        manifest,
        groups,
    })
}
