use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use mt_api::{compile_project, CompileMode, CompileOptions, CompileResult, CompilerConfig};
use mt_core::{DialogueError, GroupReport, GroupStatus};

use crate::source::{copy_project, read_test_case};
use crate::{CaseMode, ExpectedError, ExpectedGroup, MtToolError, TestCase};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub groups: Vec<ExpectedGroup>,
    pub error: Option<DialogueError>,
    pub logs: Vec<String>,
    /// Groups whose artifact exists after the run.
    pub artifacts: Vec<String>,
}

fn scratch_root() -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos())
        .unwrap_or_default();
    std::env::temp_dir().join(format!("mt-tool-run-{}-{}", std::process::id(), nanos))
}

fn observed_group(report: &GroupReport) -> ExpectedGroup {
    ExpectedGroup {
        slug: report.slug.clone(),
        status: report.status,
        states: report.states,
    }
}

fn compile_mode(mode: CaseMode) -> CompileMode {
    match mode {
        CaseMode::Persist => CompileMode::Persist,
        CaseMode::Preview => CompileMode::Preview,
        CaseMode::Check => CompileMode::Check,
    }
}

/// Compiles a copy of `project_dir` the way `case` asks and records what
/// happened. A failed compile is an observation, not an error.
pub fn run_case(project_dir: &Path, case: &TestCase) -> Result<RunReport, MtToolError> {
    let projects_root = scratch_root();
    let slug = copy_project(project_dir, &projects_root)?;
    let config = CompilerConfig::with_projects_dir(&projects_root);
    let options = CompileOptions {
        project: slug.clone(),
        mode: compile_mode(case.mode),
        group: case.group.clone(),
    };

    let (groups, error, logs) = match compile_project(&config, &options) {
        Ok(CompileResult::Report(report)) => (
            report.groups.iter().map(observed_group).collect::<Vec<_>>(),
            None,
            report.logs,
        ),
        Ok(CompileResult::Preview(preview)) => (
            vec![ExpectedGroup {
                slug: preview.group,
                status: GroupStatus::Success,
                states: Some(preview.state_count),
            }],
            None,
            preview.logs,
        ),
        Err(failure) => (
            failure.groups.iter().map(observed_group).collect::<Vec<_>>(),
            Some(failure.error),
            failure.logs,
        ),
    };

    let project_dir = config.project_dir(&slug);
    let artifacts = groups
        .iter()
        .filter(|group| config.artifact_path(&project_dir, &group.slug).is_file())
        .map(|group| group.slug.clone())
        .collect();

    Ok(RunReport {
        groups,
        error,
        logs,
        artifacts,
    })
}

fn check_error(
    expected: Option<&ExpectedError>,
    actual: Option<&DialogueError>,
) -> Result<(), MtToolError> {
    match (expected, actual) {
        (None, None) => Ok(()),
        (Some(expected), None) => Err(MtToolError::UnexpectedSuccess {
            expected_code: expected.code.clone(),
        }),
        (None, Some(actual)) => Err(MtToolError::UnexpectedFailure(actual.clone())),
        (Some(expected), Some(actual)) => {
            if expected.code == actual.code && expected.kind == actual.kind {
                return Ok(());
            }
            let actual = ExpectedError {
                code: actual.code.clone(),
                kind: actual.kind,
            };
            Err(MtToolError::ErrorMismatch {
                expected: serde_json::to_string(expected).map_err(MtToolError::Serialize)?,
                actual: serde_json::to_string(&actual).map_err(MtToolError::Serialize)?,
            })
        }
    }
}

fn check_groups(expected: &[ExpectedGroup], actual: &[ExpectedGroup]) -> Result<(), MtToolError> {
    if expected.len() != actual.len() {
        let observed = serde_json::to_string_pretty(actual).map_err(MtToolError::Serialize)?;
        return Err(MtToolError::GroupCountMismatch {
            expected: expected.len(),
            actual: actual.len(),
            observed,
        });
    }

    for (index, (expected, actual)) in expected.iter().zip(actual.iter()).enumerate() {
        if expected != actual {
            return Err(MtToolError::GroupMismatch {
                index,
                expected: serde_json::to_string(expected).map_err(MtToolError::Serialize)?,
                actual: serde_json::to_string(actual).map_err(MtToolError::Serialize)?,
            });
        }
    }
    Ok(())
}

fn check_artifacts(mode: CaseMode, report: &RunReport) -> Result<(), MtToolError> {
    for group in &report.groups {
        let written = report.artifacts.contains(&group.slug);
        let should_write = mode == CaseMode::Persist && group.status == GroupStatus::Success;
        if written != should_write {
            let expectation = if should_write { "exist" } else { "not exist" };
            return Err(MtToolError::ArtifactMismatch {
                group: group.slug.clone(),
                expectation: expectation.to_string(),
            });
        }
    }
    Ok(())
}

pub fn assert_case(project_dir: &Path, case_path: &Path) -> Result<(), MtToolError> {
    let case = read_test_case(case_path)?;
    let report = run_case(project_dir, &case)?;

    check_error(case.expected_error.as_ref(), report.error.as_ref())?;
    if case.expected_error.is_none() || !case.expected_groups.is_empty() {
        check_groups(&case.expected_groups, &report.groups)?;
    }

    for line in &case.expected_logs {
        if !report.logs.contains(line) {
            return Err(MtToolError::MissingLog {
                line: line.clone(),
                observed: report.logs.join("\n"),
            });
        }
    }

    check_artifacts(case.mode, &report)
}
