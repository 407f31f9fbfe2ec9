//! Serve command implementation.

use std::sync::Arc;

use crate::cli::ServeArgs;
use crate::commands::utils;
use crate::error::Result;
use crate::server;

/// Execute the serve command.
///
/// Configuration issues are logged and the server starts anyway with the
/// affected entries ignored. Returns once every listener has shut down.
pub async fn execute(args: ServeArgs) -> Result<()> {
    let (loaded, handler, issues) = utils::prepare(args.config.as_deref()).await?;

    match &loaded.path {
        Some(path) => tracing::info!("Using options from {}", path.display()),
        None => tracing::info!("No options file found, using defaults"),
    }
    for issue in &issues {
        tracing::warn!("{}", issue);
    }

    server::serve(Arc::new(handler), &args.listen, server::shutdown_signal()).await?;
    Ok(())
}
