//! Miette report conversion for CLI errors.

use miette::Report;

use crate::error::{CliError, ConfigError};

/// Convert a `CliError` into a report for `main` to print.
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        // The issue list reads better without the "Configuration error:" prefix
        CliError::Config(e @ ConfigError::ValidationFailed { .. }) => miette::miette!("{}", e),
        CliError::Config(e) => miette::miette!("Configuration error: {}", e),
        CliError::Server(e) => miette::miette!("Server error: {}", e),
        _ => miette::miette!("{}", err),
    }
}
