//! CLI styling for help output.

use clap::builder::styling::{AnsiColor, Effects, Styles};

/// Help theme: bold cyan headers, green literals, yellow placeholders.
pub fn get_styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Yellow.on_default())
        .error(AnsiColor::Red.on_default() | Effects::BOLD)
        .valid(AnsiColor::Cyan.on_default())
        .invalid(AnsiColor::Yellow.on_default())
}

/// After-help section with examples, environment variables and paths.
pub const AFTER_HELP: &str = color_print::cstr!(
    r#"<cyan,bold>EXAMPLES</>
    <green,bold>hostlink connect</> <dim>-u admin -p secret</>                   Connect with all features
    <green,bold>hostlink connect</> <dim>-a key -o 1234 -d remote-management</>  Connect without remote management
    <green,bold>hostlink features</> <dim>-e content --format json</>            Preview the resolved feature set
    <green,bold>hostlink status</>                                         Show what is connected

<cyan,bold>ENVIRONMENT VARIABLES</>
    <yellow>HOSTLINK_CONFIG_DIR</>  Override the configuration directory (default: /etc/hostlink)
    <yellow>HOSTLINK_LOG_LEVEL</>   Log verbosity (error, warn, info, debug, trace)
    <yellow>RUST_LOG</>             Fine-grained log filter directives
    <yellow>NO_COLOR</>             Disable colored output (set to '1' or 'true')

<cyan,bold>PATHS</>
    <dim>Config</>      /etc/hostlink/config.toml
    <dim>Features</>    /etc/hostlink/config.toml.d/*.toml
    <dim>Logs</>        /var/log/hostlink/hostlink.log (root), $XDG_STATE_HOME/hostlink/hostlink.log"#
);
