use std::path::PathBuf;
use std::sync::Arc;

use tsdserver_core::{ConfigIssue, NativeRuntime, RequestHandler};

use crate::config::{LoadedConfig, TsdConfig};
use crate::error::{Result, ResultExt};

pub(crate) fn get_cwd() -> Result<PathBuf> {
    std::env::current_dir().context("Failed to get current directory")
}

/// Load, validate and build the request handler.
///
/// Issues from validation and from loading the tsconfig are returned
/// together, in that order.
pub(crate) async fn prepare(
    config: Option<&std::path::Path>,
) -> Result<(LoadedConfig, RequestHandler, Vec<ConfigIssue>)> {
    let cwd = get_cwd()?;
    let loaded = TsdConfig::load(config, &cwd)?;
    let (options, mut issues) = loaded.config.validate(&loaded.base_dir);

    let (handler, build_issues) = RequestHandler::build(options, Arc::new(NativeRuntime)).await;
    issues.extend(build_issues);

    Ok((loaded, handler, issues))
}
