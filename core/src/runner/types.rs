use std::fmt;

use crate::config::{RunnerConfig, DEFAULT_MAX_PARALLEL};

/// Options of one plan run.
#[derive(Debug, Clone)]
pub struct RunOpts {
    /// Worker budget of every parallel batch.
    pub max_parallel: usize,
    pub shell: String,
}

impl Default for RunOpts {
    fn default() -> Self {
        Self {
            max_parallel: DEFAULT_MAX_PARALLEL,
            shell: "/bin/sh".to_string(),
        }
    }
}

impl From<&RunnerConfig> for RunOpts {
    fn from(cfg: &RunnerConfig) -> Self {
        Self {
            max_parallel: cfg.effective_max_parallel(),
            shell: cfg.shell.clone(),
        }
    }
}

/// Summary of a successful run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub steps: usize,
    pub commands: usize,
    pub duration_ms: u64,
}

/// Where the orchestrator is in the plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Idle,
    Single { step: usize },
    ParallelBatch { step: usize },
    TopLevelParallel,
    Done,
    Failed,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Single { step } => write!(f, "series step {step}"),
            Self::ParallelBatch { step } => write!(f, "parallel batch at series step {step}"),
            Self::TopLevelParallel => write!(f, "top-level parallel group"),
            Self::Done => write!(f, "done"),
            Self::Failed => write!(f, "failed"),
        }
    }
}
