//! Command dispatch.

use std::path::PathBuf;

use anyhow::Result;
use hostlink_engine::{ConfigPaths, EngineConfig};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::args::{Cli, Commands};
use crate::{connect_cmd, disconnect_cmd, features_cmd, status_cmd};

/// State shared by every command: configuration and the interrupt token.
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub paths: ConfigPaths,
    pub config: EngineConfig,
    pub cancel: CancellationToken,
}

impl CommandContext {
    /// Load `config.toml` from `config_dir`.
    pub async fn load(config_dir: impl Into<PathBuf>, cancel: CancellationToken) -> Result<Self> {
        let paths = ConfigPaths::new(config_dir);
        let config = EngineConfig::load(&paths.config_file()).await?;
        debug!("Loaded configuration from {}", paths.config_dir.display());
        Ok(Self {
            paths,
            config,
            cancel,
        })
    }
}

/// Run the selected command and return its exit code.
pub async fn dispatch_command(cli: Cli, ctx: CommandContext) -> Result<i32> {
    match cli.command {
        Commands::Connect(args) => connect_cmd::run(args, &ctx).await,
        Commands::Disconnect(args) => disconnect_cmd::run(args, &ctx).await,
        Commands::Status(args) => status_cmd::run(args, &ctx).await,
        Commands::Features(args) => features_cmd::run(args, &ctx).await,
    }
}
