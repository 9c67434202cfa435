//! Hostlink CLI - Main entry point.
//!
//! Parses arguments, loads `config.toml`, sets up file logging and hands
//! the command to [`dispatch_command`]. The process exit code is the
//! sysexits-style code the command produced.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use hostlink_cli::cli::{Cli, ColorMode, CommandContext, LogLevel, dispatch_command};
use hostlink_cli::output::{OutputFormat, exit_code_for};
use hostlink_cli::styled_output::{print_error, print_warning};
use hostlink_engine::exit_status::{EXIT_FAILURE, EXIT_OK, EXIT_USAGE};

const SYSTEM_LOG_FILE: &str = "/var/log/hostlink/hostlink.log";

/// Guard that flushes the log file when dropped.
struct LogGuard {
    _guard: tracing_appender::non_blocking::WorkerGuard,
}

/// Root logs to /var/log, everyone else to the XDG state directory.
fn log_file_path() -> Option<PathBuf> {
    // SAFETY: geteuid has no preconditions and cannot fail.
    if unsafe { libc::geteuid() } == 0 {
        return Some(PathBuf::from(SYSTEM_LOG_FILE));
    }
    dirs::state_dir().map(|dir| dir.join("hostlink").join("hostlink.log"))
}

/// Level from the resolved verbosity; `RUST_LOG` directives refine it.
fn build_filter(level: LogLevel) -> EnvFilter {
    let mut filter = EnvFilter::new(level.as_filter_str());
    if let Ok(rust_log) = std::env::var("RUST_LOG") {
        for directive in rust_log.split(',').filter(|d| !d.trim().is_empty()) {
            match directive.trim().parse::<tracing_subscriber::filter::Directive>() {
                Ok(directive) => filter = filter.add_directive(directive),
                Err(e) => eprintln!("Ignoring invalid RUST_LOG directive '{directive}': {e}"),
            }
        }
    }
    filter
}

fn setup_file_logging(level: LogLevel) -> Result<LogGuard> {
    let path = log_file_path().ok_or_else(|| anyhow!("no state directory for log file"))?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("cannot create {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("cannot open log file {}", path.display()))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(build_filter(level))
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow!("cannot install log subscriber: {e}"))?;

    Ok(LogGuard { _guard: guard })
}

fn exit_code(code: i32) -> ExitCode {
    ExitCode::from(u8::try_from(code).unwrap_or(EXIT_FAILURE as u8))
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // Help and version go to stdout and are not errors.
            let code = if err.use_stderr() { EXIT_USAGE } else { EXIT_OK };
            let _ = err.print();
            return exit_code(code);
        }
    };

    // SAFETY: Environment variable mutations happen before any command runs
    match cli.color {
        ColorMode::Never => unsafe { std::env::set_var("NO_COLOR", "1") },
        ColorMode::Always => unsafe { std::env::remove_var("NO_COLOR") },
        ColorMode::Auto => {}
    }

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, features not yet activated will be skipped");
            interrupt.cancel();
        }
    });

    let ctx = match CommandContext::load(cli.config_dir.clone(), cancel).await {
        Ok(ctx) => ctx,
        Err(err) => {
            print_error(&err.to_string());
            return exit_code(exit_code_for(&err));
        }
    };

    let env_level = std::env::var("HOSTLINK_LOG_LEVEL").ok();
    let log_level = LogLevel::resolve(
        cli.log_level,
        env_level.as_deref(),
        ctx.config.log_level.as_deref(),
    );

    let json_output = OutputFormat::is_json(cli.command.format());
    let _log_guard = match setup_file_logging(log_level) {
        Ok(guard) => Some(guard),
        Err(err) => {
            if !json_output {
                print_warning(&format!("logging disabled: {err:#}"));
            }
            None
        }
    };

    info!(
        "hostlink {} starting (config dir {})",
        env!("CARGO_PKG_VERSION"),
        ctx.paths.config_dir.display()
    );

    let code = match dispatch_command(cli, ctx).await {
        Ok(code) => code,
        Err(err) => {
            error!("{err:#}");
            print_error(&err.to_string());
            exit_code_for(&err)
        }
    };

    info!("hostlink exiting with code {code}");
    exit_code(code)
}
