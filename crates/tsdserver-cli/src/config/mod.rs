//! Options file handling.
//!
//! Settings come from three layers, later ones winning:
//! built-in defaults, the options file (`tsdserver.json`, `.toml` or
//! `.yaml`), and `TSDSERVER_*` environment variables. The merged
//! [`TsdConfig`] is then validated into core `ServerOptions`; entries that
//! cannot be honoured become issues instead of errors.

mod defaults;
mod loading;
mod tests;
mod types;
mod validation;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use defaults::*;
pub use loading::{CONFIG_FILE_NAMES, LoadedConfig, discover, env_key_to_field};
pub use types::*;

/// tsdserver configuration, as read from the options file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TsdConfig {
    /// Project root, relative to the options file
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// File served for `/`
    #[serde(default = "default_welcome")]
    pub welcome: String,

    /// Extra directories searched for request paths, before `.` and `node_modules`
    #[serde(default)]
    pub directories: Vec<PathBuf>,

    /// Serve `x.html` as an ES module when `x.html.js` is requested
    #[serde(default = "default_true")]
    pub wrap_js_resources: bool,

    /// Rewrite import specifiers in served `.js` files
    #[serde(default = "default_true")]
    pub update_js_import: bool,

    /// How `.js` files are parsed
    #[serde(default)]
    pub source_type: SourceType,

    /// Highest ECMAScript version accepted, as a year (2015..=2024) or edition (5..=15)
    #[serde(default = "default_ecma_version")]
    pub ecma_version: u32,

    /// How bare import specifiers are resolved
    #[serde(default)]
    pub module_resolver: ModuleResolverConfig,

    /// Request path to candidate file names
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_file_name: Option<AliasSpec<FileNames>>,

    /// Next path to try when a request path has no file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<AliasSpec<String>>,
}

impl Default for TsdConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            welcome: default_welcome(),
            directories: Vec::new(),
            wrap_js_resources: true,
            update_js_import: true,
            source_type: SourceType::default(),
            ecma_version: default_ecma_version(),
            module_resolver: ModuleResolverConfig::default(),
            map_file_name: None,
            fallback: None,
        }
    }
}

impl TsdConfig {
    /// JSON Schema for the options file.
    pub fn json_schema() -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(schemars::schema_for!(TsdConfig))
    }
}
