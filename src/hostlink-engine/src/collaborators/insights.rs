//! `insights-client` driven as a subprocess.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;

use super::AnalyticsService;
use super::command::{CommandLine, CommandRunner};
use crate::error::CollaboratorError;

pub struct InsightsClientCli {
    program: PathBuf,
    runner: Arc<dyn CommandRunner>,
}

impl InsightsClientCli {
    pub fn new(program: impl AsRef<Path>, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            program: program.as_ref().to_path_buf(),
            runner,
        }
    }

    async fn run_flag(&self, flag: &str) -> Result<(), CollaboratorError> {
        let command = CommandLine::new(&self.program).arg(flag);
        let output = self.runner.run(&command).await?;
        if output.success() {
            Ok(())
        } else {
            Err(command.failure(&output))
        }
    }
}

#[async_trait]
impl AnalyticsService for InsightsClientCli {
    async fn is_registered(&self) -> Result<bool, CollaboratorError> {
        // `--status` exits non-zero when the host is not registered.
        let command = CommandLine::new(&self.program).arg("--status");
        let output = self.runner.run(&command).await?;
        Ok(output.success())
    }

    async fn register(&self) -> Result<(), CollaboratorError> {
        self.run_flag("--register").await
    }

    async fn unregister(&self) -> Result<(), CollaboratorError> {
        self.run_flag("--unregister").await
    }
}
