use std::path::PathBuf;

use clap::Parser;
use cmdplan_core::api::{Settings, DEFAULT_PLAN_FILE};

/// Run a declarative plan of series and parallel shell commands.
#[derive(Parser, Debug)]
#[command(name = "cmdplan", version)]
pub struct Args {
    /// Plan file to run.
    #[arg(default_value = DEFAULT_PLAN_FILE)]
    pub plan: PathBuf,

    /// Worker budget of every parallel batch.
    #[arg(long)]
    pub max_parallel: Option<usize>,

    /// Run parallel batches one command at a time, in plan order.
    #[arg(long)]
    pub serial: bool,

    /// Shell each command is handed to as `<shell> -c <cmd>`.
    #[arg(long)]
    pub shell: Option<String>,

    /// Log filter, e.g. "info" or "cmdplan_core=debug". RUST_LOG wins when set.
    #[arg(long)]
    pub log_level: Option<String>,

    /// Also append diagnostics to this file.
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Decode the plan and print its resolved outline without running it.
    #[arg(long)]
    pub check: bool,
}

impl Args {
    /// Command-line flags are the highest-priority settings layer.
    pub fn apply_overrides(&self, settings: &mut Settings) {
        if let Some(n) = self.max_parallel {
            settings.runner.max_parallel = n;
        }
        if self.serial {
            settings.runner.serial = true;
        }
        if let Some(shell) = &self.shell {
            settings.runner.shell = shell.clone();
        }
        if let Some(level) = &self.log_level {
            settings.logging.level = level.clone();
        }
        if let Some(file) = &self.log_file {
            settings.logging.file = Some(file.clone());
        }
    }
}
