//! Output format selection, report printing and process exit codes.

use std::fmt;

use anyhow::Result;
use hostlink_engine::EngineError;
use hostlink_engine::exit_status::{EXIT_CONFIG, EXIT_DATA_ERR, EXIT_SOFTWARE, EXIT_USAGE};
use hostlink_features::{ConfigError, DependencyConflictError, RegistryError, ResolveError};
use serde::Serialize;
use thiserror::Error;

/// Errors raised by the CLI layer itself.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("unsupported output format \"{0}\" (expected text or json)")]
    UnsupportedFormat(String),

    #[error("cannot serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::UnsupportedFormat(_) => EXIT_DATA_ERR,
            CliError::Serialize(_) => EXIT_SOFTWARE,
        }
    }
}

/// Report format selected with `--format`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl OutputFormat {
    /// Parse the raw `--format` value; absent means text.
    pub fn parse(raw: Option<&str>) -> Result<Self, CliError> {
        match raw.map(str::trim) {
            None => Ok(OutputFormat::Text),
            Some(value) if value.eq_ignore_ascii_case("text") => Ok(OutputFormat::Text),
            Some(value) if value.eq_ignore_ascii_case("json") => Ok(OutputFormat::Json),
            Some(value) => Err(CliError::UnsupportedFormat(value.to_string())),
        }
    }

    /// Whether `raw` selects JSON, without validating it.
    pub fn is_json(raw: Option<&str>) -> bool {
        matches!(Self::parse(raw), Ok(OutputFormat::Json))
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => f.write_str("text"),
            OutputFormat::Json => f.write_str("json"),
        }
    }
}

/// Print a report as pretty JSON on stdout.
pub fn print_json<T: Serialize>(report: &T) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(report)?;
    println!("{json}");
    Ok(())
}

/// Map an error that ended the invocation to its exit code.
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    if let Some(e) = err.downcast_ref::<EngineError>() {
        return e.exit_code();
    }
    if let Some(e) = err.downcast_ref::<CliError>() {
        return e.exit_code();
    }
    if err.downcast_ref::<ResolveError>().is_some()
        || err.downcast_ref::<DependencyConflictError>().is_some()
    {
        return EXIT_USAGE;
    }
    if err.downcast_ref::<ConfigError>().is_some() || err.downcast_ref::<RegistryError>().is_some()
    {
        return EXIT_CONFIG;
    }
    EXIT_SOFTWARE
}

/// Two-column `STEP  ERROR` table appended to text reports.
pub fn format_error_table(rows: &[(String, String)]) -> String {
    if rows.is_empty() {
        return String::new();
    }
    let width = rows
        .iter()
        .map(|(step, _)| step.len())
        .max()
        .unwrap_or(0)
        .max("STEP".len());

    let mut table = format!("\n{:<width$}  ERROR\n", "STEP");
    for (step, error) in rows {
        table.push_str(&format!("{step:<width$}  {error}\n"));
    }
    table
}
