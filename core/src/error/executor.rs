use thiserror::Error;

/// Errors raised by the bounded scheduler itself, never by the units it drives.
#[derive(Error, Debug)]
pub enum ExecutorError {
    #[error("max concurrency must be greater than zero, got {0}")]
    InvalidConcurrency(usize),

    #[error("worker failed: {0}")]
    Worker(String),
}
