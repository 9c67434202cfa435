//! CLI argument structures and parsing.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use hostlink_engine::CredentialArgs;
use hostlink_engine::config::DEFAULT_CONFIG_DIR;
use hostlink_features::CliLayer;

use super::styles::{AFTER_HELP, get_styles};

/// Log verbosity level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogLevel {
    /// Only show errors
    Error,
    /// Show warnings and errors
    Warn,
    /// Show informational messages, warnings, and errors (default)
    #[default]
    Info,
    /// Show debug messages and above
    Debug,
    /// Show all messages including trace-level details
    Trace,
}

impl LogLevel {
    /// Convert to tracing filter string.
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }

    /// Parse from string (case-insensitive).
    pub fn from_str_loose(s: &str) -> Option<LogLevel> {
        match s.trim().to_lowercase().as_str() {
            "error" => Some(LogLevel::Error),
            "warn" | "warning" => Some(LogLevel::Warn),
            "info" => Some(LogLevel::Info),
            "debug" => Some(LogLevel::Debug),
            "trace" => Some(LogLevel::Trace),
            _ => None,
        }
    }

    /// Pick the effective level: flag, then environment, then config file.
    pub fn resolve(flag: Option<LogLevel>, env: Option<&str>, config: Option<&str>) -> LogLevel {
        flag.or_else(|| env.and_then(LogLevel::from_str_loose))
            .or_else(|| config.and_then(LogLevel::from_str_loose))
            .unwrap_or_default()
    }
}

/// Color output mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ColorMode {
    /// Automatically detect if output is a terminal
    #[default]
    Auto,
    /// Always output with colors
    Always,
    /// Never output with colors
    Never,
}

/// Hostlink - connect this host to subscription, analytics and remote management services.
#[derive(Parser, Debug)]
#[command(name = "hostlink")]
#[command(version, about = "Connect this host to its management services", long_about = None)]
#[command(styles = get_styles(), after_help = AFTER_HELP)]
pub struct Cli {
    /// Configuration directory holding config.toml and config.toml.d/
    #[arg(
        long = "config-dir",
        global = true,
        env = "HOSTLINK_CONFIG_DIR",
        default_value = DEFAULT_CONFIG_DIR,
        value_name = "DIR"
    )]
    pub config_dir: PathBuf,

    /// Log verbosity written to the log file
    #[arg(long = "log-level", global = true, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Control color output: auto (default), always, or never
    #[arg(long = "color", global = true, value_enum, default_value_t = ColorMode::Auto)]
    pub color: ColorMode,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Register this host and activate the selected features
    Connect(ConnectArgs),

    /// Stop the daemon and unregister this host
    Disconnect(FormatArgs),

    /// Show what this host is connected to
    Status(FormatArgs),

    /// Preview the resolved feature set without touching the host
    Features(FeaturesArgs),
}

impl Commands {
    /// The raw `--format` value, before validation.
    pub fn format(&self) -> Option<&str> {
        match self {
            Commands::Connect(args) => args.output.format.as_deref(),
            Commands::Disconnect(args) | Commands::Status(args) => args.format.as_deref(),
            Commands::Features(args) => args.output.format.as_deref(),
        }
    }
}

/// Output format selection.
#[derive(Args, Debug, Default, Clone)]
pub struct FormatArgs {
    /// Output format: text (default) or json
    #[arg(long = "format", short = 'f', value_name = "FORMAT")]
    pub format: Option<String>,
}

/// Per-invocation feature overrides.
#[derive(Args, Debug, Default, Clone)]
pub struct FeatureArgs {
    /// Enable a feature for this invocation (repeatable)
    #[arg(long = "enable-feature", short = 'e', value_name = "FEATURE")]
    pub enable_feature: Vec<String>,

    /// Disable a feature for this invocation (repeatable)
    #[arg(long = "disable-feature", short = 'd', value_name = "FEATURE")]
    pub disable_feature: Vec<String>,
}

impl FeatureArgs {
    pub fn cli_layer(&self) -> CliLayer {
        CliLayer::new(self.enable_feature.clone(), self.disable_feature.clone())
    }
}

#[derive(Args, Debug, Default, Clone)]
pub struct ConnectArgs {
    /// Username for subscription registration
    #[arg(long, short = 'u', help_heading = "Credentials")]
    pub username: Option<String>,

    /// Password for subscription registration
    #[arg(long, short = 'p', help_heading = "Credentials")]
    pub password: Option<String>,

    /// Activation key (repeatable); requires --organization
    #[arg(
        long = "activation-key",
        short = 'a',
        value_name = "KEY",
        help_heading = "Credentials"
    )]
    pub activation_key: Vec<String>,

    /// Organization ID
    #[arg(long, short = 'o', value_name = "ID", help_heading = "Credentials")]
    pub organization: Option<String>,

    /// Content template to register with (repeatable)
    #[arg(long = "content-template", value_name = "TEMPLATE")]
    pub content_template: Vec<String>,

    #[command(flatten)]
    pub features: FeatureArgs,

    #[command(flatten)]
    pub output: FormatArgs,
}

impl ConnectArgs {
    pub fn credential_args(&self) -> CredentialArgs {
        CredentialArgs {
            username: self.username.clone(),
            password: self.password.clone(),
            activation_keys: self.activation_key.clone(),
            organization: self.organization.clone(),
            content_templates: self.content_template.clone(),
        }
    }
}

#[derive(Args, Debug, Default, Clone)]
pub struct FeaturesArgs {
    #[command(flatten)]
    pub features: FeatureArgs,

    #[command(flatten)]
    pub output: FormatArgs,
}
