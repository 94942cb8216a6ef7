use std::fmt;
use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Failure of a single shell command. Captured per unit inside a batch.
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("ERROR: {argv:?} in {dir:?} failed to start: {source}")]
    Spawn {
        argv: Vec<String>,
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("ERROR: {argv:?} in {dir:?} failed => {status}")]
    Failed {
        argv: Vec<String>,
        dir: PathBuf,
        status: ExitStatus,
    },

    #[error("ERROR: {argv:?} could not write {stream} to {path:?}: {source}")]
    Sink {
        argv: Vec<String>,
        stream: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("write access check for {dir:?} failed: {reason}")]
    Precondition { dir: PathBuf, reason: String },
}

impl CommandError {
    /// Argument vector of the failing command, when one was built.
    pub fn argv(&self) -> Option<&[String]> {
        match self {
            Self::Spawn { argv, .. } | Self::Failed { argv, .. } | Self::Sink { argv, .. } => {
                Some(argv)
            }
            Self::Precondition { .. } => None,
        }
    }
}

/// Every failure of one parallel batch.
#[derive(Debug)]
pub struct AggregateError {
    pub total: usize,
    pub failures: Vec<CommandError>,
}

impl AggregateError {
    pub fn new(total: usize, failures: Vec<CommandError>) -> Self {
        Self { total, failures }
    }
}

impl fmt::Display for AggregateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} of {} commands failed", self.failures.len(), self.total)?;
        for failure in &self.failures {
            write!(f, "\n  - {failure}")?;
        }
        Ok(())
    }
}

impl std::error::Error for AggregateError {}
