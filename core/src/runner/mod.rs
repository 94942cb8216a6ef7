//! Plan execution: shell command runners, the work unit adapter for the
//! bounded scheduler, and the series/parallel orchestrator.

mod command;
mod io_pump;
mod run;
pub mod types;
mod unit;

pub use command::CommandRunner;
pub use io_pump::{FileSink, SinkRegistry};
pub use run::PlanRunner;
pub use types::{RunOpts, RunPhase, RunReport};
pub use unit::CommandUnit;
