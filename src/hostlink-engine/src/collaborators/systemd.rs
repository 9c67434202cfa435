//! `systemctl` driven as a subprocess.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::ServiceManager;
use super::command::{CommandLine, CommandOutput, CommandRunner};
use crate::error::CollaboratorError;

pub struct SystemctlCli {
    program: PathBuf,
    runner: Arc<dyn CommandRunner>,
}

impl SystemctlCli {
    pub fn new(program: impl AsRef<Path>, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            program: program.as_ref().to_path_buf(),
            runner,
        }
    }

    fn command(&self) -> CommandLine {
        CommandLine::new(&self.program)
    }

    async fn run_unit_command(&self, command: CommandLine, unit: &str) -> Result<(), CollaboratorError> {
        let output = self.runner.run(&command).await?;
        if output.success() {
            return Ok(());
        }
        if let Some(reason) = unavailable_reason(&output) {
            return Err(CollaboratorError::Unavailable {
                subsystem: unit.to_string(),
                reason,
            });
        }
        Err(command.failure(&output))
    }
}

/// Recognise systemctl's messages for units that cannot be operated on.
fn unavailable_reason(output: &CommandOutput) -> Option<String> {
    let message = output.diagnostic();
    let lower = message.to_lowercase();
    if lower.contains("masked") {
        Some("unit is masked".to_string())
    } else if lower.contains("not found") || lower.contains("does not exist") {
        Some("unit not found".to_string())
    } else {
        None
    }
}

#[async_trait]
impl ServiceManager for SystemctlCli {
    async fn enable_now(&self, unit: &str) -> Result<(), CollaboratorError> {
        debug!("Enabling {}", unit);
        let command = self.command().arg("enable").arg("--now").arg(unit);
        self.run_unit_command(command, unit).await
    }

    async fn disable_now(&self, unit: &str) -> Result<(), CollaboratorError> {
        debug!("Disabling {}", unit);
        let command = self.command().arg("disable").arg("--now").arg(unit);
        self.run_unit_command(command, unit).await
    }

    async fn start(&self, unit: &str) -> Result<(), CollaboratorError> {
        debug!("Starting {}", unit);
        let command = self.command().arg("start").arg(unit);
        self.run_unit_command(command, unit).await
    }

    async fn is_active(&self, unit: &str) -> Result<bool, CollaboratorError> {
        // `is-active` prints the state and exits non-zero for anything but "active".
        let command = self.command().arg("is-active").arg(unit);
        let output = self.runner.run(&command).await?;
        Ok(output.success() && output.stdout.trim() == "active")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failed(stderr: &str) -> CommandOutput {
        CommandOutput {
            stdout: String::new(),
            stderr: stderr.to_string(),
            exit_code: Some(1),
        }
    }

    #[test]
    fn test_masked_unit_is_unavailable() {
        let output = failed("Failed to enable unit: Unit file /etc/systemd/system/yggdrasil.service is masked.");
        assert_eq!(unavailable_reason(&output).as_deref(), Some("unit is masked"));
    }

    #[test]
    fn test_missing_unit_is_unavailable() {
        let output = failed("Failed to enable unit: Unit file yggdrasil.service does not exist.");
        assert_eq!(unavailable_reason(&output).as_deref(), Some("unit not found"));
    }

    #[test]
    fn test_other_failures_are_not_unavailable() {
        assert!(unavailable_reason(&failed("Job for x.service failed")).is_none());
    }
}
