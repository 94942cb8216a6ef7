use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Default worker budget of a parallel batch. Large enough that realistic
/// groups run fully concurrently.
pub const DEFAULT_MAX_PARALLEL: usize = 1000;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub runner: RunnerConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Worker budget for every parallel batch. Zero is rejected by the scheduler.
    #[serde(default = "default_max_parallel")]
    pub max_parallel: usize,

    /// Shell each command string is handed to, as `<shell> -c <cmd>`.
    #[serde(default = "default_shell")]
    pub shell: String,

    /// Run every parallel batch one unit at a time, in submission order.
    #[serde(default)]
    pub serial: bool,
}

fn default_max_parallel() -> usize {
    DEFAULT_MAX_PARALLEL
}

fn default_shell() -> String {
    "/bin/sh".to_string()
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            max_parallel: default_max_parallel(),
            shell: default_shell(),
            serial: false,
        }
    }
}

impl RunnerConfig {
    /// Worker budget actually handed to the scheduler.
    pub fn effective_max_parallel(&self) -> usize {
        if self.serial {
            1
        } else {
            self.max_parallel
        }
    }
}

/// Diagnostics of the binary. Command output never goes through here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive such as "info" or "cmdplan_core=debug"; "off"
    /// silences diagnostics.
    pub level: String,

    /// Diagnostics on stderr.
    pub console: bool,

    /// Also append diagnostics to this file.
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            console: true,
            file: None,
        }
    }
}

impl LoggingConfig {
    /// No sink would receive anything.
    pub fn is_silent(&self) -> bool {
        (!self.console && self.file.is_none()) || self.level.trim() == "off"
    }
}
