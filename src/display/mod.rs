//! Terminal display and formatting utilities.
//!
//! Handles colorized JSON output, token status and the human-readable
//! report. Every renderer returns a `String`; commands decide where it goes.

pub mod json_printer;
pub mod report;
pub mod token_status;

use std::io::IsTerminal;

use owo_colors::{OwoColorize, Style};

/// Color is used only for a terminal stdout and when `NO_COLOR` is unset.
pub fn use_color() -> bool {
    std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none()
}

/// Apply `style` to `text` when color is enabled.
pub(crate) fn paint(text: &str, style: Style, use_color: bool) -> String {
    if use_color {
        text.style(style).to_string()
    } else {
        text.to_string()
    }
}
