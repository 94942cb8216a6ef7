//! Stable re-exports for consumers (`cli` and external crates).
//!
//! Prefer importing from `cmdplan_core::api` instead of reaching into internal modules.

pub use crate::config::{load_default, LoggingConfig, RunnerConfig, Settings, DEFAULT_MAX_PARALLEL};
pub use crate::error::{
    AggregateError, CliError, CommandError, ConfigError, ExecutorError, RunError,
};
pub use crate::executor::{run_bounded, WorkUnit};
pub use crate::plan::{load_plan, Command, Meta, Plan, SeriesItem, DEFAULT_PLAN_FILE};
pub use crate::runner::{CommandRunner, CommandUnit, PlanRunner, RunOpts, RunPhase, RunReport};
