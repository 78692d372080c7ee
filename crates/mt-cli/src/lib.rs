use std::ffi::OsString;

use clap::Parser;
use mt_api::{CompileFailure, CompileMode, CompileOptions, CompileResult, ProjectCompiler};
use mt_core::{CompilationReport, GroupStatus, PreviewResult};

mod cli_args;
mod error_map;
mod logging;

pub(crate) use cli_args::{Cli, Mode, TargetArgs};
pub(crate) use error_map::{emit_error, map_cli_output_encode};
pub(crate) use logging::init_logging;

pub fn run_cli_from_args<I, T>(args: I) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(error) => {
            let _ = error.print();
            return error.exit_code();
        }
    };
    init_logging(&cli.global.log_level);
    match run(cli) {
        Ok(code) => code,
        Err(failure) => emit_error(&failure),
    }
}

fn run(cli: Cli) -> Result<i32, CompileFailure> {
    let compiler = ProjectCompiler::new(cli.global.to_config());
    match cli.command {
        Mode::Compile(args) => {
            let result = compiler.compile_project(&options(args, CompileMode::Persist))?;
            emit_report(expect_report(result)?)
        }
        Mode::Check(args) => {
            let result = compiler.compile_project(&options(args, CompileMode::Check))?;
            emit_report(expect_report(result)?)
        }
        Mode::Preview(args) => {
            let result = compiler.compile_project(&options(args, CompileMode::Preview))?;
            emit_preview(expect_preview(result)?)
        }
    }
}

fn options(args: TargetArgs, mode: CompileMode) -> CompileOptions {
    CompileOptions {
        project: args.project,
        mode,
        group: args.group,
    }
}

fn unexpected_result() -> CompileFailure {
    CompileFailure::from(mt_core::DialogueError::internal(
        "CLI_UNEXPECTED_RESULT",
        "Compile mode returned a result of the wrong shape.",
    ))
}

fn expect_report(result: CompileResult) -> Result<CompilationReport, CompileFailure> {
    match result {
        CompileResult::Report(report) => Ok(report),
        CompileResult::Preview(_) => Err(unexpected_result()),
    }
}

fn expect_preview(result: CompileResult) -> Result<PreviewResult, CompileFailure> {
    match result {
        CompileResult::Preview(preview) => Ok(preview),
        CompileResult::Report(_) => Err(unexpected_result()),
    }
}

fn emit_logs(logs: &[String]) {
    for line in logs {
        println!("LOG:{}", line);
    }
}

fn emit_group_lines(report: &CompilationReport) {
    for group in &report.groups {
        let status = match group.status {
            GroupStatus::Success => "success",
            GroupStatus::Empty => "empty",
            GroupStatus::Failed => "failed",
        };
        println!(
            "GROUP:{}|{}|{}",
            group.slug,
            status,
            group.states.unwrap_or_default()
        );
    }
}

fn emit_report(report: CompilationReport) -> Result<i32, CompileFailure> {
    let payload = serde_json::to_string(&report).map_err(map_cli_output_encode)?;
    println!("RESULT:OK");
    emit_logs(&report.logs);
    emit_group_lines(&report);
    println!("REPORT_JSON:{}", payload);
    Ok(0)
}

fn emit_preview(preview: PreviewResult) -> Result<i32, CompileFailure> {
    let payload = serde_json::to_string(&preview).map_err(map_cli_output_encode)?;
    println!("RESULT:OK");
    emit_logs(&preview.logs);
    println!("STATE_COUNT:{}", preview.state_count);
    println!("PREVIEW_JSON:{}", payload);
    Ok(0)
}
