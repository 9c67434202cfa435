//! Styled terminal output.
//!
//! Colors follow the terminal: they are dropped when the stream is not a
//! TTY or when `NO_COLOR` is set. Reports are built as strings through a
//! [`Painter`] so the renderers can be tested without a terminal.

use std::io::IsTerminal;

/// Check if colors should be disabled based on NO_COLOR env var.
fn colors_disabled() -> bool {
    std::env::var("NO_COLOR")
        .map(|v| !v.is_empty() && v != "0" && v.to_lowercase() != "false")
        .unwrap_or(false)
}

fn is_terminal_output(stderr: bool) -> bool {
    if stderr {
        std::io::stderr().is_terminal()
    } else {
        std::io::stdout().is_terminal()
    }
}

mod codes {
    pub const SUCCESS: &str = "\x1b[38;2;0;245;212m";
    pub const FAILURE: &str = "\x1b[38;2;255;107;107m";
    pub const WARNING: &str = "\x1b[38;2;255;200;87m";
    pub const DIM: &str = "\x1b[38;2;130;154;177m";
    pub const BOLD: &str = "\x1b[1m";
    pub const RESET: &str = "\x1b[0m";
}

/// Message type for a status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    Success,
    Failure,
    Warning,
    /// Nothing to do, or intentionally left alone.
    Skipped,
}

impl MessageType {
    fn icon(&self) -> &'static str {
        match self {
            MessageType::Success => "✓",
            MessageType::Failure => "✗",
            MessageType::Warning => "!",
            MessageType::Skipped => "·",
        }
    }

    fn color(&self) -> &'static str {
        match self {
            MessageType::Success => codes::SUCCESS,
            MessageType::Failure => codes::FAILURE,
            MessageType::Warning => codes::WARNING,
            MessageType::Skipped => codes::DIM,
        }
    }
}

/// Applies (or omits) ANSI styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Painter {
    colors: bool,
}

impl Painter {
    /// Painter for stdout or stderr, honouring TTY detection and NO_COLOR.
    pub fn detect(stderr: bool) -> Self {
        Self {
            colors: !colors_disabled() && is_terminal_output(stderr),
        }
    }

    /// Painter that never emits escape codes.
    pub fn plain() -> Self {
        Self { colors: false }
    }

    pub fn bold(&self, text: &str) -> String {
        if self.colors {
            format!("{}{}{}", codes::BOLD, text, codes::RESET)
        } else {
            text.to_string()
        }
    }

    /// `<icon> <message>` colored by message type.
    pub fn status(&self, msg_type: MessageType, message: &str) -> String {
        if self.colors {
            format!(
                "{}{} {}{}",
                msg_type.color(),
                msg_type.icon(),
                message,
                codes::RESET
            )
        } else {
            format!("{} {}", msg_type.icon(), message)
        }
    }
}

/// Print `error: <message>` to stderr.
pub fn print_error(message: &str) {
    let painter = Painter::detect(true);
    if painter.colors {
        eprintln!(
            "{}{}error:{} {}",
            codes::FAILURE,
            codes::BOLD,
            codes::RESET,
            message
        );
    } else {
        eprintln!("error: {message}");
    }
}

/// Print `warning: <message>` to stderr.
pub fn print_warning(message: &str) {
    let painter = Painter::detect(true);
    if painter.colors {
        eprintln!("{}warning:{} {}", codes::WARNING, codes::RESET, message);
    } else {
        eprintln!("warning: {message}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_plain_painter_has_no_escapes() {
        let line = Painter::plain().status(MessageType::Success, "Connected");
        assert_eq!(line, "✓ Connected");
        assert!(!Painter::plain().bold("x").contains('\x1b'));
    }

    #[test]
    #[serial]
    fn test_no_color_env() {
        // SAFETY: serialized with other environment-mutating tests.
        unsafe { std::env::set_var("NO_COLOR", "1") };
        assert!(colors_disabled());
        assert_eq!(Painter::detect(false), Painter::plain());

        unsafe { std::env::set_var("NO_COLOR", "false") };
        assert!(!colors_disabled());

        unsafe { std::env::remove_var("NO_COLOR") };
        assert!(!colors_disabled());
    }
}
