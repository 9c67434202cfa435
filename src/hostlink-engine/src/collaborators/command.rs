//! Running external tools.
//!
//! stdout and stderr of the child are captured separately so nothing the
//! tools print ever reaches our own stdout (which may carry JSON).

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use std::time::Instant;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::error::CollaboratorError;

/// Output streams from a subprocess, kept separate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    /// Exit code if the process exited normally.
    pub exit_code: Option<i32>,
}

impl CommandOutput {
    pub fn from_output(output: &Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            exit_code: output.status.code(),
        }
    }

    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Trimmed stderr, falling back to stdout when stderr is empty.
    pub fn diagnostic(&self) -> String {
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            self.stdout.trim().to_string()
        } else {
            stderr.to_string()
        }
    }
}

/// A program invocation whose secret arguments are masked when displayed.
#[derive(Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub program: PathBuf,
    pub args: Vec<String>,
    secret: Vec<usize>,
}

impl CommandLine {
    pub fn new(program: impl AsRef<Path>) -> Self {
        Self {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
            secret: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Add an argument that must never be logged.
    pub fn secret_arg(mut self, arg: impl Into<String>) -> Self {
        self.secret.push(self.args.len());
        self.args.push(arg.into());
        self
    }

    pub fn program_name(&self) -> String {
        self.program
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.program.display().to_string())
    }

    /// Build a `Failed` error for this command from its output.
    pub fn failure(&self, output: &CommandOutput) -> CollaboratorError {
        CollaboratorError::Failed {
            command: self.to_string(),
            code: output.exit_code,
            stderr: output.diagnostic(),
        }
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program_name())?;
        for (i, arg) in self.args.iter().enumerate() {
            if self.secret.contains(&i) {
                write!(f, " ******")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CommandLine({self})")
    }
}

/// Runs commands. Implemented over `tokio::process`, and by fakes in tests.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run to completion. A non-zero exit is not an error at this level.
    async fn run(&self, command: &CommandLine) -> Result<CommandOutput, CollaboratorError>;
}

/// [`CommandRunner`] backed by `tokio::process::Command`.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner;

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, command: &CommandLine) -> Result<CommandOutput, CollaboratorError> {
        let start = Instant::now();
        debug!("Running {}", command);

        let output = Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    CollaboratorError::Unavailable {
                        subsystem: command.program_name(),
                        reason: format!("{} not found", command.program.display()),
                    }
                } else {
                    CollaboratorError::Spawn {
                        program: command.program.display().to_string(),
                        message: e.to_string(),
                    }
                }
            })?;

        let output = CommandOutput::from_output(&output);
        debug!(
            "{} exited with {:?} after {:?}",
            command.program_name(),
            output.exit_code,
            start.elapsed()
        );
        Ok(output)
    }
}
