//! Check command implementation.
//!
//! Loads the options file the same way `serve` does, including the
//! tsconfig of the compiler strategy, without opening any socket.

use crate::cli::CheckArgs;
use crate::commands::utils;
use crate::config::TsdConfig;
use crate::error::{ConfigError, Result};
use crate::ui;

/// Execute the check command.
///
/// Prints every configuration issue and the effective configuration. Fails
/// when there is at least one issue.
pub async fn execute(args: CheckArgs) -> Result<()> {
    if args.schema {
        println!("{}", serde_json::to_string_pretty(&TsdConfig::json_schema()?)?);
        return Ok(());
    }

    let (loaded, _handler, issues) = utils::prepare(args.config.as_deref()).await?;

    match &loaded.path {
        Some(path) => ui::info(&format!("Checking {}", path.display())),
        None => ui::info("No options file found, checking defaults"),
    }

    for issue in &issues {
        ui::warning(&issue.to_string());
    }

    println!("{}", serde_json::to_string_pretty(&loaded.config)?);

    if !issues.is_empty() {
        return Err(ConfigError::ValidationFailed {
            count: issues.len(),
            issues: issues
                .iter()
                .map(|issue| format!("  {issue}"))
                .collect::<Vec<_>>()
                .join("\n"),
        }
        .into());
    }

    ui::success("Configuration is valid");
    Ok(())
}
