//! Terminal status messages.
//!
//! These go to stderr and are meant for people, unlike the `tracing` log
//! stream. `check` reports through them; `serve` mostly logs.

mod messages;

pub use messages::{info, success, warning};

/// Apply `--no-color` and the `NO_COLOR`/`FORCE_COLOR` conventions to
/// `owo-colors` output.
pub fn init_colors(no_color: bool) {
    if no_color || std::env::var_os("NO_COLOR").is_some() {
        owo_colors::set_override(false);
    } else if std::env::var_os("FORCE_COLOR").is_some() {
        owo_colors::set_override(true);
    }
}
