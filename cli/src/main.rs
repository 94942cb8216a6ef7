use clap::Parser;
use cmdplan_cli::commands::cli;
use cmdplan_cli::{app, logging};
use cmdplan_core::api::{CliError, ExecutorError, RunError};

#[tokio::main]
async fn main() {
    let exit = match real_main().await {
        Ok(code) => code,
        Err(e) => {
            let code = exit_code_for_error(&e);
            eprintln!("{:?}", anyhow::Error::new(e));
            code
        }
    };

    std::process::exit(exit);
}

async fn real_main() -> Result<i32, CliError> {
    let args = cli::Args::parse();
    let mut settings = cmdplan_core::api::load_default()?;
    args.apply_overrides(&mut settings);
    logging::init(&settings.logging).map_err(CliError::Logging)?;

    app::run_app(&args, &settings).await
}

fn exit_code_for_error(e: &CliError) -> i32 {
    // 0: success
    // 11: plan, settings, logging or worker budget error
    // 20: a command or parallel batch failed
    // 50: internal scheduler failure
    match e {
        CliError::Config(_) | CliError::Logging(_) => 11,
        CliError::Run(RunError::Executor(ExecutorError::InvalidConcurrency(_))) => 11,
        CliError::Run(RunError::Executor(ExecutorError::Worker(_))) => 50,
        CliError::Run(RunError::Step { .. } | RunError::Batch { .. }) => 20,
    }
}
