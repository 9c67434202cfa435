//! CLI argument parsing and command dispatch.
//!
//! - `args` - Command-line argument structures
//! - `styles` - ANSI styling for help output
//! - `handlers` - Command execution handlers

pub mod args;
pub mod handlers;
pub mod styles;

pub use args::{
    Cli, ColorMode, Commands, ConnectArgs, FeatureArgs, FeaturesArgs, FormatArgs, LogLevel,
};
pub use handlers::{CommandContext, dispatch_command};
pub use styles::{AFTER_HELP, get_styles};
