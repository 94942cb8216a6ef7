pub mod command;
#[allow(clippy::module_inception)]
pub mod error;
pub mod executor;

pub use command::{AggregateError, CommandError};
pub use error::{CliError, ConfigError, RunError};
pub use executor::ExecutorError;
