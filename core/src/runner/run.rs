use std::time::Instant;

use crate::error::{AggregateError, ExecutorError, RunError};
use crate::executor::{run_bounded, WorkUnit};
use crate::plan::{Command, Plan, SeriesItem};

use super::command::CommandRunner;
use super::io_pump::SinkRegistry;
use super::types::{RunOpts, RunPhase, RunReport};
use super::unit::CommandUnit;

/// Walks a plan: series steps strictly in order, parallel groups through the
/// bounded scheduler, then the top-level parallel group. The first failing
/// step ends the run.
///
/// Output files are truncated once per runner, so build one runner per
/// invocation of a plan.
#[derive(Debug, Clone, Default)]
pub struct PlanRunner {
    opts: RunOpts,
    sinks: SinkRegistry,
}

impl PlanRunner {
    pub fn new(opts: RunOpts) -> Self {
        Self {
            opts,
            sinks: SinkRegistry::new(),
        }
    }

    #[tracing::instrument(name = "plan.run", skip_all, fields(steps = plan.step_count()))]
    pub async fn run(&self, plan: &Plan) -> Result<RunReport, RunError> {
        let started = Instant::now();
        let mut report = RunReport::default();
        tracing::debug!(phase = %RunPhase::Idle, max_parallel = self.opts.max_parallel);

        for (idx, item) in plan.series.iter().enumerate() {
            let step = idx + 1;
            let result = match item {
                SeriesItem::Single(cmd) => self.run_single(cmd, RunPhase::Single { step }).await,
                SeriesItem::Parallel(cmds) => {
                    self.run_batch(cmds, RunPhase::ParallelBatch { step }).await
                }
            };
            settle(result)?;
            report.steps += 1;
            report.commands += item.commands().len();
        }

        if !plan.parallel.is_empty() {
            let result = self.run_batch(&plan.parallel, RunPhase::TopLevelParallel).await;
            settle(result)?;
            report.steps += 1;
            report.commands += plan.parallel.len();
        }

        report.duration_ms = started.elapsed().as_millis() as u64;
        tracing::debug!(phase = %RunPhase::Done, ?report);
        Ok(report)
    }

    /// Prepare and run one command in the foreground.
    pub async fn run_single(&self, cmd: &Command, phase: RunPhase) -> Result<(), RunError> {
        tracing::debug!(%phase, cmd = %cmd.cmd);
        let step_error = |source| RunError::Step {
            label: phase.to_string(),
            source,
        };

        let runner =
            CommandRunner::prepare(cmd, &self.opts.shell, &self.sinks).map_err(step_error)?;
        runner.report_start();
        let started = Instant::now();
        let result = runner.run().await;
        runner.report_end(result.as_ref().err(), started.elapsed());

        result.map_err(step_error)
    }

    /// Run a group through the scheduler and fold every failure into one error.
    pub async fn run_batch(&self, cmds: &[Command], phase: RunPhase) -> Result<(), RunError> {
        tracing::debug!(%phase, units = cmds.len());
        if self.opts.max_parallel < 1 {
            return Err(ExecutorError::InvalidConcurrency(self.opts.max_parallel).into());
        }

        let units = cmds
            .iter()
            .map(|cmd| {
                CommandRunner::prepare(cmd, &self.opts.shell, &self.sinks).map(CommandUnit::new)
            })
            .collect::<Result<Vec<_>, _>>()
            .map_err(|source| RunError::Step {
                label: phase.to_string(),
                source,
            })?;

        let total = units.len();
        let done = run_bounded(units, self.opts.max_parallel).await?;

        let failures: Vec<_> = done.into_iter().filter_map(WorkUnit::into_error).collect();
        if !failures.is_empty() {
            return Err(RunError::Batch {
                label: phase.to_string(),
                source: AggregateError::new(total, failures),
            });
        }

        Ok(())
    }
}

fn settle(result: Result<(), RunError>) -> Result<(), RunError> {
    if let Err(e) = &result {
        tracing::error!(phase = %RunPhase::Failed, error = %e, "run halted");
    }
    result
}
