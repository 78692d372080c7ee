use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use mt_api::{CompilerConfig, DEFAULT_PROJECTS_DIR};

#[derive(Debug, Parser)]
#[command(name = "mobtalk")]
#[command(about = "MobTalk dialogue compiler CLI")]
pub(crate) struct Cli {
    #[command(flatten)]
    pub(crate) global: GlobalArgs,
    #[command(subcommand)]
    pub(crate) command: Mode,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Mode {
    /// Compile every group and write `generated/<group>.json`.
    Compile(TargetArgs),
    /// Compile one group and print its state machine.
    Preview(TargetArgs),
    /// Compile every group without writing anything.
    Check(TargetArgs),
}

#[derive(Debug, Args)]
pub(crate) struct TargetArgs {
    #[arg(long = "project")]
    pub(crate) project: String,
    #[arg(long = "group")]
    pub(crate) group: Option<String>,
}

#[derive(Debug, Args)]
pub(crate) struct GlobalArgs {
    #[arg(long = "projects-dir", global = true, default_value = DEFAULT_PROJECTS_DIR)]
    pub(crate) projects_dir: PathBuf,
    #[arg(long = "entry-point", global = true)]
    pub(crate) entry_point: Option<String>,
    #[arg(long = "max-operations", global = true)]
    pub(crate) max_operations: Option<u64>,
    #[arg(long = "log-level", global = true, default_value = "warn")]
    pub(crate) log_level: String,
}

impl GlobalArgs {
    pub(crate) fn to_config(&self) -> CompilerConfig {
        let mut config = CompilerConfig::with_projects_dir(&self.projects_dir);
        if let Some(entry_point) = &self.entry_point {
            config.entry_point = entry_point.clone();
        }
        config.max_operations = self.max_operations;
        config
    }
}
