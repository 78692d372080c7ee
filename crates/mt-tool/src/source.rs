use std::fs;
use std::path::Path;

use walkdir::WalkDir;

use crate::{MtToolError, TestCase, TESTCASE_SCHEMA_V1};

const SKIPPED_DIRS: &[&str] = &["generated"];

/// Copies `project_dir` into `projects_root` so a persisting run never writes
/// into the source tree. Returns the project slug.
pub fn copy_project(project_dir: &Path, projects_root: &Path) -> Result<String, MtToolError> {
    let slug = project_dir
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .ok_or_else(|| MtToolError::ProjectName {
            path: project_dir.to_path_buf(),
        })?;
    let target_root = projects_root.join(&slug);

    let walker = WalkDir::new(project_dir)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0
                || !(entry.file_type().is_dir()
                    && SKIPPED_DIRS
                        .iter()
                        .any(|skipped| entry.file_name() == *skipped))
        });

    for entry in walker {
        let entry = entry?;
        let Ok(relative) = entry.path().strip_prefix(project_dir) else {
            continue;
        };
        let target = target_root.join(relative);
        let copied = if entry.file_type().is_dir() {
            fs::create_dir_all(&target)
        } else {
            fs::copy(entry.path(), &target).map(|_| ())
        };
        copied.map_err(|source| MtToolError::CopyProject {
            path: target.clone(),
            source,
        })?;
    }

    Ok(slug)
}

pub fn read_test_case(case_path: &Path) -> Result<TestCase, MtToolError> {
    let raw = fs::read_to_string(case_path).map_err(|source| MtToolError::ReadFile {
        path: case_path.to_path_buf(),
        source,
    })?;
    let parsed: TestCase = serde_json::from_str(&raw).map_err(|source| MtToolError::ParseCase {
        path: case_path.to_path_buf(),
        source,
    })?;

    if parsed.schema_version != TESTCASE_SCHEMA_V1 {
        return Err(MtToolError::InvalidSchemaVersion {
            expected: TESTCASE_SCHEMA_V1.to_string(),
            found: parsed.schema_version,
        });
    }

    Ok(parsed)
}
