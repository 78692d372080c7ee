use std::fs;
use std::path::Path;

use mt_compiler::{compile_actions, Compilation};
use mt_core::{DialogueError, Fsm, GroupReport, PreviewResult, ScriptGroup};
use mt_runtime::{DialogueBuilder, ExecutionOutcome, ScriptSandbox, UnitIdentity};

use crate::config::CompilerConfig;
use crate::project::{load_project, LoadedProject};
use crate::report::{build_report, CompileFailure, CompileResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompileMode {
    /// Compile every selected group and write its artifact.
    Persist,
    /// Compile one group and return its state machine; nothing is written.
    Preview,
    /// Compile every selected group without writing artifacts.
    Check,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    pub project: String,
    pub mode: CompileMode,
    pub group: Option<String>,
}

impl CompileOptions {
    pub fn persist(project: &str) -> Self {
        Self {
            project: project.to_string(),
            mode: CompileMode::Persist,
            group: None,
        }
    }

    pub fn preview(project: &str, group: Option<&str>) -> Self {
        Self {
            project: project.to_string(),
            mode: CompileMode::Preview,
            group: group.map(str::to_string),
        }
    }

    pub fn check(project: &str) -> Self {
        Self {
            project: project.to_string(),
            mode: CompileMode::Check,
            group: None,
        }
    }

    pub fn with_group(mut self, group: &str) -> Self {
        self.group = Some(group.to_string());
        self
    }
}

/// Log lines of one request, in the order they happened.
#[derive(Debug, Default)]
struct RunLog {
    lines: Vec<String>,
}

impl RunLog {
    fn push(&mut self, group: &str, tag: &str, text: impl AsRef<str>) {
        self.lines.push(format!("[{}] {} {}", group, tag, text.as_ref()));
    }

    fn outcome(&mut self, group: &str, file: &str, outcome: &ExecutionOutcome) {
        let text = match outcome {
            ExecutionOutcome::Completed { appended } => {
                format!("{} ({} action(s))", file, appended)
            }
            ExecutionOutcome::Skipped { reason } => format!("{}: {}", file, reason),
            ExecutionOutcome::NoEntryPoint { reason, appended } => {
                format!("{}: {} ({} action(s))", file, reason, appended)
            }
        };
        self.push(group, outcome.log_tag(), text);
    }
}

/// Drives one project from its manifest to compiled artifacts.
///
/// One [`DialogueBuilder`] lives for the duration of a request and is reset
/// before every group, so an artifact holds exactly its group's files. The
/// first error ends the request; groups after it are never attempted.
#[derive(Debug, Clone)]
pub struct ProjectCompiler {
    config: CompilerConfig,
    sandbox: ScriptSandbox,
}

impl ProjectCompiler {
    pub fn new(config: CompilerConfig) -> Self {
        let sandbox = ScriptSandbox::new(config.sandbox_options());
        Self { config, sandbox }
    }

    pub fn compile_project(
        &self,
        options: &CompileOptions,
    ) -> Result<CompileResult, CompileFailure> {
        let result = load_project(&self.config, &options.project)
            .map_err(CompileFailure::from)
            .and_then(|project| {
                tracing::info!(
                    project = %project.slug,
                    mode = ?options.mode,
                    groups = project.groups.len(),
                    "compile requested"
                );
                let group = options.group.as_deref();
                match options.mode {
                    CompileMode::Preview => self.preview(&project, group),
                    CompileMode::Persist => self.compile_groups(&project, group, true),
                    CompileMode::Check => self.compile_groups(&project, group, false),
                }
            });

        if let Err(failure) = &result {
            let failed_group = failure.groups.last().map(|group| group.slug.as_str());
            tracing::error!(
                project = %options.project,
                group = %failed_group.unwrap_or("-"),
                code = %failure.error.code,
                kind = ?failure.error.kind,
                detail = %failure.error.message,
                "compile aborted"
            );
        }
        result
    }

    fn compile_groups(
        &self,
        project: &LoadedProject,
        filter: Option<&str>,
        persist: bool,
    ) -> Result<CompileResult, CompileFailure> {
        let groups = project.select_groups(filter)?;
        let mut builder = DialogueBuilder::new();
        let mut log = RunLog::default();
        let mut reports = Vec::with_capacity(groups.len());

        for group in &groups {
            let outcome = self
                .run_group(project, group, &mut builder, &mut log)
                .and_then(|compiled| match compiled {
                    None => Ok(GroupReport::empty(&group.slug)),
                    Some(compilation) => {
                        if persist {
                            self.write_artifact(project, &group.slug, &compilation.fsm)?;
                        }
                        Ok(GroupReport::success(
                            &group.slug,
                            compilation.fsm.state_count(),
                        ))
                    }
                });

            match outcome {
                Ok(report) => reports.push(report),
                Err(error) => {
                    reports.push(GroupReport::failed(&group.slug, &error));
                    return Err(CompileFailure {
                        error,
                        logs: log.lines,
                        groups: reports,
                    });
                }
            }
        }

        Ok(CompileResult::Report(build_report(reports, log.lines, persist)))
    }

    fn preview(
        &self,
        project: &LoadedProject,
        group: Option<&str>,
    ) -> Result<CompileResult, CompileFailure> {
        let group = match group {
            Some(slug) => project.require_group(slug)?,
            None => project.first_group()?,
        };
        let mut builder = DialogueBuilder::new();
        let mut log = RunLog::default();

        let compiled = self
            .run_group(project, group, &mut builder, &mut log)
            .and_then(|compiled| {
                compiled.ok_or_else(|| {
                    DialogueError::script(
                        "PREVIEW_GROUP_EMPTY",
                        format!("Script group \"{}\" produced no actions.", group.slug),
                    )
                })
            });

        match compiled {
            Ok(compilation) => Ok(CompileResult::Preview(PreviewResult {
                status: "success".to_string(),
                group: group.slug.clone(),
                state_count: compilation.fsm.state_count(),
                data: compilation.fsm,
                logs: log.lines,
            })),
            Err(error) => Err(CompileFailure {
                groups: vec![GroupReport::failed(&group.slug, &error)],
                error,
                logs: log.lines,
            }),
        }
    }

    /// Runs every source file of `group` into a freshly reset builder and
    /// compiles the result. `None` means the group appended nothing.
    fn run_group(
        &self,
        project: &LoadedProject,
        group: &ScriptGroup,
        builder: &mut DialogueBuilder,
        log: &mut RunLog,
    ) -> Result<Option<Compilation>, DialogueError> {
        builder.reset();
        for file in &group.source_files {
            let unit = UnitIdentity::new(&project.slug, &group.slug, file);
            let outcome = self
                .sandbox
                .load_and_run(&unit, &project.dir.join(file), builder)?;
            match &outcome {
                ExecutionOutcome::Completed { .. } => {}
                ExecutionOutcome::Skipped { reason }
                | ExecutionOutcome::NoEntryPoint { reason, .. } => {
                    tracing::warn!(unit = %unit, reason = %reason, "source unit incomplete");
                }
            }
            log.outcome(&group.slug, file, &outcome);
        }

        let actions = builder.flush();
        if actions.is_empty() {
            tracing::info!(project = %project.slug, group = %group.slug, "group is empty");
            return Ok(None);
        }

        let compilation = compile_actions(actions)?;
        for warning in &compilation.warnings {
            tracing::warn!(project = %project.slug, group = %group.slug, "{}", warning);
            log.push(&group.slug, "WARN", warning);
        }
        tracing::info!(
            project = %project.slug,
            group = %group.slug,
            actions = actions.len(),
            states = compilation.fsm.state_count(),
            "group compiled"
        );
        Ok(Some(compilation))
    }

    fn write_artifact(
        &self,
        project: &LoadedProject,
        group_slug: &str,
        fsm: &Fsm,
    ) -> Result<(), DialogueError> {
        let dir = self.config.artifact_dir(&project.dir);
        fs::create_dir_all(&dir).map_err(|error| map_artifact_write(&dir, error))?;

        let payload = fsm.to_json_pretty().map_err(|error| {
            DialogueError::internal(
                "ARTIFACT_ENCODE_ERROR",
                format!("Cannot encode group \"{}\": {}", group_slug, error),
            )
        })?;
        let path = self.config.artifact_path(&project.dir, group_slug);
        fs::write(&path, payload).map_err(|error| map_artifact_write(&path, error))?;
        tracing::info!(path = %path.display(), "artifact written");
        Ok(())
    }
}

fn map_artifact_write(path: &Path, error: std::io::Error) -> DialogueError {
    DialogueError::internal(
        "ARTIFACT_WRITE_ERROR",
        format!("Cannot write {}: {}", path.display(), error),
    )
}

pub fn compile_project(
    config: &CompilerConfig,
    options: &CompileOptions,
) -> Result<CompileResult, CompileFailure> {
    ProjectCompiler::new(config.clone()).compile_project(options)
}
