//! Hostlink CLI library module.
//!
//! - `cli/` - argument parsing and command dispatch
//! - `*_cmd.rs` - one module per subcommand, each with its text renderer
//! - `output` - output formats, JSON printing and exit codes
//! - `styled_output` - terminal styling

pub mod cli;
pub mod output;
pub mod styled_output;

pub mod connect_cmd;
pub mod disconnect_cmd;
pub mod features_cmd;
pub mod status_cmd;

pub use output::{CliError, OutputFormat, exit_code_for};
