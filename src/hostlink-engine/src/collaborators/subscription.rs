//! `subscription-manager` driven as a subprocess.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;

use super::command::{CommandLine, CommandRunner};
use super::SubscriptionService;
use crate::credentials::{Credentials, RegistrationRequest};
use crate::error::CollaboratorError;

pub struct SubscriptionManagerCli {
    program: PathBuf,
    runner: Arc<dyn CommandRunner>,
}

impl SubscriptionManagerCli {
    pub fn new(program: impl AsRef<Path>, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            program: program.as_ref().to_path_buf(),
            runner,
        }
    }

    fn command(&self) -> CommandLine {
        CommandLine::new(&self.program)
    }

    async fn run_checked(&self, command: CommandLine) -> Result<String, CollaboratorError> {
        let output = self.runner.run(&command).await?;
        if output.success() {
            Ok(output.stdout)
        } else {
            Err(command.failure(&output))
        }
    }
}

/// Build the `register` invocation.
fn register_command(
    base: CommandLine,
    request: &RegistrationRequest,
    enable_content: bool,
) -> CommandLine {
    let mut cmd = base.arg("register");
    match &request.credentials {
        Credentials::UsernamePassword {
            username,
            password,
            organization,
        } => {
            cmd = cmd
                .arg("--username")
                .arg(username)
                .arg("--password")
                .secret_arg(password);
            if let Some(org) = organization {
                cmd = cmd.arg("--org").arg(org);
            }
        }
        Credentials::ActivationKeys { keys, organization } => {
            for key in keys {
                cmd = cmd.arg("--activationkey").secret_arg(key);
            }
            cmd = cmd.arg("--org").arg(organization);
        }
    }
    if enable_content && !request.content_templates.is_empty() {
        cmd = cmd.arg(format!("--environments={}", request.content_templates.join(",")));
    }
    cmd
}

/// Parse `manage_repos` out of `subscription-manager config --list`.
/// Values are printed either bare or in brackets when defaulted.
fn parse_manage_repos(listing: &str) -> Option<bool> {
    listing.lines().find_map(|line| {
        let (key, value) = line.split_once('=')?;
        if key.trim() != "manage_repos" {
            return None;
        }
        let value = value.trim().trim_start_matches('[').trim_end_matches(']');
        match value.trim() {
            "1" => Some(true),
            "0" => Some(false),
            _ => None,
        }
    })
}

#[async_trait]
impl SubscriptionService for SubscriptionManagerCli {
    async fn is_registered(&self) -> Result<bool, CollaboratorError> {
        // `identity` exits 1 when the system is not registered.
        let command = self.command().arg("identity");
        let output = self.runner.run(&command).await?;
        match output.exit_code {
            Some(0) => Ok(true),
            Some(1) => Ok(false),
            _ => Err(command.failure(&output)),
        }
    }

    async fn register(
        &self,
        request: &RegistrationRequest,
        enable_content: bool,
    ) -> Result<(), CollaboratorError> {
        let command = register_command(self.command(), request, enable_content);
        self.run_checked(command).await.map(|_| ())
    }

    async fn unregister(&self) -> Result<(), CollaboratorError> {
        self.run_checked(self.command().arg("unregister"))
            .await
            .map(|_| ())
    }

    async fn manages_repos(&self) -> Result<bool, CollaboratorError> {
        let command = self.command().arg("config").arg("--list");
        let listing = self.run_checked(command.clone()).await?;
        parse_manage_repos(&listing).ok_or_else(|| CollaboratorError::UnexpectedOutput {
            command: command.to_string(),
            output: "no rhsm.manage_repos value".to_string(),
        })
    }

    async fn set_manage_repos(&self, enabled: bool) -> Result<(), CollaboratorError> {
        let value = if enabled { "1" } else { "0" };
        self.run_checked(
            self.command()
                .arg("config")
                .arg(format!("--rhsm.manage_repos={value}")),
        )
        .await
        .map(|_| ())
    }

    async fn refresh(&self) -> Result<(), CollaboratorError> {
        self.run_checked(self.command().arg("refresh"))
            .await
            .map(|_| ())
    }
}
