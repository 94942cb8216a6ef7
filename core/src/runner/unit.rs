use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::error::CommandError;
use crate::executor::WorkUnit;

use super::command::CommandRunner;

/// Scheduler-facing wrapper around one prepared command.
#[derive(Debug)]
pub struct CommandUnit {
    runner: CommandRunner,
    error: Option<CommandError>,
    elapsed: Duration,
}

impl CommandUnit {
    pub fn new(runner: CommandRunner) -> Self {
        Self {
            runner,
            error: None,
            elapsed: Duration::ZERO,
        }
    }
}

#[async_trait]
impl WorkUnit for CommandUnit {
    type Error = CommandError;

    async fn process(&mut self) {
        self.runner.report_start();
        let started = Instant::now();
        self.error = self.runner.run().await.err();
        self.elapsed = started.elapsed();
    }

    fn finalize(&mut self) {
        self.runner.report_end(self.error.as_ref(), self.elapsed);
    }

    fn error(&self) -> Option<&CommandError> {
        self.error.as_ref()
    }

    fn into_error(self) -> Option<CommandError> {
        self.error
    }
}
