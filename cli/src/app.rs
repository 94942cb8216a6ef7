//! CLI assembly: load the plan, then either print its outline or run it.
use cmdplan_core::api::{self as core_api, PlanRunner, RunOpts, Settings};

use crate::commands::check::render_outline;
use crate::commands::cli::Args;

#[tracing::instrument(name = "cli.run_app", skip_all, fields(plan = %args.plan.display()))]
pub async fn run_app(args: &Args, settings: &Settings) -> Result<i32, core_api::CliError> {
    let plan = core_api::load_plan(&args.plan)?;

    if args.check {
        println!("{}", render_outline(&plan));
        return Ok(0);
    }

    let opts = RunOpts::from(&settings.runner);
    tracing::debug!(
        max_parallel = opts.max_parallel,
        shell = %opts.shell,
        serial = settings.runner.serial,
        "run configured"
    );

    let report = PlanRunner::new(opts).run(&plan).await?;
    tracing::info!(
        steps = report.steps,
        commands = report.commands,
        duration_ms = report.duration_ms,
        "plan completed"
    );

    Ok(0)
}
