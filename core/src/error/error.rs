use std::path::PathBuf;

use thiserror::Error;

use super::command::{AggregateError, CommandError};
use super::executor::ExecutorError;

/// Errors raised while reading and decoding plans or settings.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read {path:?}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML")]
    Parse(#[source] serde_yaml::Error),

    #[error("invalid plan {path:?}")]
    Plan {
        path: PathBuf,
        #[source]
        source: Box<ConfigError>,
    },

    #[error("invalid settings in {path:?}")]
    Settings {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid value {value:?} for {var}")]
    InvalidEnv { var: &'static str, value: String },

    #[error("invalid field `{field}`")]
    Field {
        field: &'static str,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("unsupported object: {0}")]
    UnsupportedNode(String),

    #[error("empty command: {0}")]
    EmptyCommand(String),

    #[error("empty parallel group: {0}")]
    EmptyGroup(String),
}

/// Terminal error of a plan run.
#[derive(Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Executor(#[from] ExecutorError),

    #[error("{label} failed")]
    Step {
        label: String,
        #[source]
        source: CommandError,
    },

    #[error("{label} failed")]
    Batch {
        label: String,
        #[source]
        source: AggregateError,
    },
}

impl RunError {
    /// Number of failed commands behind this error (0 for scheduler problems).
    pub fn failure_count(&self) -> usize {
        match self {
            Self::Step { .. } => 1,
            Self::Batch { source, .. } => source.failures.len(),
            Self::Executor(_) => 0,
        }
    }
}

/// Errors surfaced by the `cmdplan` binary.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Run(#[from] RunError),

    #[error("logging setup failed: {0}")]
    Logging(String),
}
