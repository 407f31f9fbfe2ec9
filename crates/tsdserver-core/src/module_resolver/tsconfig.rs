//! `compilerOptions` from a tsconfig file.
//!
//! tsconfig files are JSON with comments and trailing commas, so they go
//! through `jsonc-parser` before serde sees them. Only the fields the
//! compiler path-mapping strategy needs are read; `extends` is not followed.

use indexmap::IndexMap;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{CoreError, Result};
use crate::runtime::Runtime;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerOptions {
    pub base_url: String,
    pub target: String,
    pub module: String,
    pub out_dir: String,
    /// Path patterns in declaration order
    pub paths: IndexMap<String, Vec<String>>,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            base_url: "./".to_string(),
            target: "ES2020".to_string(),
            module: "ES2020".to_string(),
            out_dir: "./dist/".to_string(),
            paths: IndexMap::new(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TsconfigFile {
    #[serde(default)]
    compiler_options: RawCompilerOptions,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCompilerOptions {
    base_url: Option<String>,
    target: Option<String>,
    module: Option<String>,
    out_dir: Option<String>,
    paths: Option<IndexMap<String, Vec<String>>>,
}

impl CompilerOptions {
    /// Parse tsconfig text, filling unset options with defaults.
    pub fn from_jsonc(text: &str) -> std::result::Result<Self, String> {
        let value = jsonc_parser::parse_to_serde_value(text, &Default::default())
            .map_err(|e| e.to_string())?
            .unwrap_or(serde_json::Value::Null);
        if value.is_null() {
            return Ok(Self::default());
        }

        let file: TsconfigFile = serde_json::from_value(value).map_err(|e| e.to_string())?;
        let raw = file.compiler_options;
        let defaults = Self::default();
        Ok(Self {
            base_url: raw.base_url.unwrap_or(defaults.base_url),
            target: raw.target.unwrap_or(defaults.target),
            module: raw.module.unwrap_or(defaults.module),
            out_dir: raw.out_dir.unwrap_or(defaults.out_dir),
            paths: raw.paths.unwrap_or(defaults.paths),
        })
    }

    pub async fn load(runtime: &dyn Runtime, path: &Path) -> Result<Self> {
        let error = |reason: String| CoreError::Tsconfig {
            path: path.to_path_buf(),
            reason,
        };
        let bytes = runtime
            .read_file(path)
            .await
            .map_err(|e| error(e.to_string()))?;
        let text = String::from_utf8(bytes).map_err(|e| error(e.to_string()))?;
        Self::from_jsonc(&text).map_err(error)
    }

    /// `outDir` as a path relative to the project root.
    pub fn out_dir_path(&self) -> PathBuf {
        PathBuf::from(&self.out_dir)
    }
}
