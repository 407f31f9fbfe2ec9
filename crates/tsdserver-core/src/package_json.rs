//! `package.json` reading for node-style package resolution.
//!
//! Only the fields the module resolvers care about are modelled: the entry
//! points (`module`, `main`) of installed packages and the `dependencies`
//! map of the project itself, which may redirect a package to a local
//! directory with a `file:` reference.

use serde::{Deserialize, Deserializer};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::runtime::{Runtime, RuntimeResult};

/// Maximum allowed size for package.json files (10MB)
const MAX_PACKAGE_JSON_SIZE: u64 = 10 * 1024 * 1024;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackageJson {
    /// Package name
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    /// ES module entry point
    #[serde(default, deserialize_with = "lenient_string")]
    pub module: Option<String>,
    /// CommonJS entry point
    #[serde(default, deserialize_with = "lenient_string")]
    pub main: Option<String>,
    /// Production dependencies
    #[serde(default)]
    pub dependencies: HashMap<String, String>,
    /// File path this was loaded from
    #[serde(skip)]
    pub path: PathBuf,
}

/// Accept only strings; any other JSON value reads as absent.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => Some(s),
        _ => None,
    })
}

impl PackageJson {
    /// Load a manifest if one exists at `path`.
    ///
    /// Returns `Ok(None)` when there is no file, and also when the file is
    /// oversized or not valid JSON: a broken manifest inside `node_modules`
    /// should cost one resolution, not the whole request. Those cases are
    /// logged at warn level. Other I/O failures are returned.
    pub async fn load(runtime: &dyn Runtime, path: &Path) -> RuntimeResult<Option<Self>> {
        let Some(metadata) = runtime.stat(path).await? else {
            return Ok(None);
        };
        if !metadata.is_file {
            return Ok(None);
        }
        if metadata.size > MAX_PACKAGE_JSON_SIZE {
            tracing::warn!(
                path = %path.display(),
                "package.json exceeds maximum size of {}MB, ignoring",
                MAX_PACKAGE_JSON_SIZE / 1024 / 1024
            );
            return Ok(None);
        }

        let bytes = match runtime.read_file(path).await {
            Ok(bytes) => bytes,
            Err(err) if err.is_not_found() => return Ok(None),
            Err(err) => return Err(err),
        };

        match serde_json::from_slice::<PackageJson>(&bytes) {
            Ok(mut package) => {
                package.path = path.to_path_buf();
                Ok(Some(package))
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), "Ignoring malformed package.json: {}", err);
                Ok(None)
            }
        }
    }

    /// The file browsers should load: `module`, falling back to `main`.
    pub fn entry(&self) -> Option<&str> {
        self.module
            .as_deref()
            .filter(|m| !m.is_empty())
            .or_else(|| self.main.as_deref().filter(|m| !m.is_empty()))
    }

    /// Local directory a dependency is redirected to with `"name": "file:<dir>"`.
    pub fn file_dependency(&self, name: &str) -> Option<&str> {
        self.dependencies
            .get(name)
            .and_then(|spec| spec.strip_prefix("file:"))
            .filter(|dir| !dir.is_empty())
    }
}
