use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tsdserver_core::JsSourceType;

use crate::config::defaults::default_tsconfig;

/// How `.js` files are parsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    #[default]
    Module,
    Script,
}

impl From<SourceType> for JsSourceType {
    fn from(source_type: SourceType) -> Self {
        match source_type {
            SourceType::Module => JsSourceType::Module,
            SourceType::Script => JsSourceType::Script,
        }
    }
}

/// Import resolution strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "strategy", rename_all = "lowercase", deny_unknown_fields)]
pub enum ModuleResolverConfig {
    /// Alias rules, then `node_modules/<name>/package.json`
    Alias {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        alias: Option<AliasSpec<String>>,
    },
    /// tsconfig `paths` mapped into `outDir`, then `node_modules`
    Compiler {
        /// tsconfig location, relative to the project root
        #[serde(default = "default_tsconfig")]
        tsconfig: PathBuf,
    },
}

impl Default for ModuleResolverConfig {
    fn default() -> Self {
        ModuleResolverConfig::Alias { alias: None }
    }
}

/// Find/replace rules, either as a literal map or as an ordered rule list.
///
/// ```json
/// { "lit": "/vendor/lit.js", "server-only": null }
/// [{ "pattern": "^@app/(.*)$", "replace": "/src/$1" }, { "find": "fs", "replace": null }]
/// ```
///
/// A `null` (or missing) replacement suppresses the name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum AliasSpec<T> {
    Map(BTreeMap<String, Option<T>>),
    Rules(Vec<AliasRuleConfig<T>>),
}

/// One rule of an [`AliasSpec`] list. Exactly one of `find` or `pattern` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields, bound(deserialize = "T: Deserialize<'de>"))]
pub struct AliasRuleConfig<T> {
    /// Exact name to match
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub find: Option<String>,
    /// Regular expression; `$0`, `$1`... in the replacement refer to its groups
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default)]
    pub replace: Option<T>,
}

/// One candidate file name or several, tried in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum FileNames {
    One(String),
    Many(Vec<String>),
}

impl FileNames {
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            FileNames::One(name) => vec![name.clone()],
            FileNames::Many(names) => names.clone(),
        }
    }
}
