//! Validated server options.
//!
//! `ServerOptions` is what the request handler is built from. It is produced
//! once at startup (by the CLI's configuration layer, or directly by library
//! callers) and never changes afterwards. Anything that could be wrong with
//! the user's input has already been reported as a [`ConfigIssue`] by then.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::alias::AliasResolver;
use crate::module_resolver::ModuleResolver;

/// Whether `.js` files are parsed as ES modules or classic scripts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsSourceType {
    #[default]
    Module,
    Script,
}

/// Highest ECMAScript edition the parser accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EcmaVersion {
    Es5,
    Es2015,
    Es2016,
    Es2017,
    Es2018,
    Es2019,
    Es2020,
    Es2021,
    Es2022,
    Es2023,
    Es2024,
}

impl EcmaVersion {
    /// One behind the newest supported edition.
    pub const DEFAULT: EcmaVersion = EcmaVersion::Es2023;

    const ALL: [EcmaVersion; 11] = [
        EcmaVersion::Es5,
        EcmaVersion::Es2015,
        EcmaVersion::Es2016,
        EcmaVersion::Es2017,
        EcmaVersion::Es2018,
        EcmaVersion::Es2019,
        EcmaVersion::Es2020,
        EcmaVersion::Es2021,
        EcmaVersion::Es2022,
        EcmaVersion::Es2023,
        EcmaVersion::Es2024,
    ];

    /// Accepts a year (`2015`..=`2024`) or an edition number (`5`, `6`..=`15`).
    pub fn from_year_or_edition(value: u32) -> Option<Self> {
        let year = match value {
            5 => return Some(EcmaVersion::Es5),
            6..=15 => value + 2009,
            _ => value,
        };
        Self::ALL.into_iter().find(|v| v.year() == Some(year))
    }

    /// Publication year, `None` for ES5.
    pub fn year(self) -> Option<u32> {
        match self {
            EcmaVersion::Es5 => None,
            other => Some(2014 + other as u32),
        }
    }

    pub fn supports_module_syntax(self) -> bool {
        self >= EcmaVersion::Es2015
    }

    pub fn supports_dynamic_import(self) -> bool {
        self >= EcmaVersion::Es2020
    }
}

impl Default for EcmaVersion {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for EcmaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.year() {
            Some(year) => write!(f, "ES{year}"),
            None => f.write_str("ES5"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParserOptions {
    pub source_type: JsSourceType,
    pub ecma_version: EcmaVersion,
}

/// How bare import specifiers are turned into served paths.
#[derive(Clone)]
pub enum ModuleStrategy {
    /// Alias rules, then `node_modules/<name>/package.json`
    AliasPackage(AliasResolver<String>),
    /// tsconfig `paths` into `outDir`, then `node_modules`
    CompilerPaths { tsconfig: PathBuf },
    /// Caller-supplied resolver
    Custom(Arc<dyn ModuleResolver>),
}

impl Default for ModuleStrategy {
    fn default() -> Self {
        ModuleStrategy::AliasPackage(AliasResolver::default())
    }
}

impl fmt::Debug for ModuleStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModuleStrategy::AliasPackage(aliases) => f
                .debug_struct("AliasPackage")
                .field("rules", &aliases.len())
                .finish(),
            ModuleStrategy::CompilerPaths { tsconfig } => f
                .debug_struct("CompilerPaths")
                .field("tsconfig", tsconfig)
                .finish(),
            ModuleStrategy::Custom(resolver) => f.debug_tuple("Custom").field(resolver).finish(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerOptions {
    /// Project root every other path is resolved against
    pub root: PathBuf,
    /// Served for an empty request path
    pub welcome: String,
    /// Extra directories searched before `.` and `node_modules`
    pub directories: Vec<PathBuf>,
    /// Serve `x.html` as a JS module when `x.html.js` is requested
    pub wrap_js_resources: bool,
    /// Rewrite import specifiers in served `.js` files
    pub update_js_import: bool,
    pub parser: ParserOptions,
    pub module_strategy: ModuleStrategy,
    /// Request path to candidate file names
    pub map_file_name: Option<AliasResolver<Vec<String>>>,
    /// Next path to try when a request path has no file
    pub fallback: AliasResolver<String>,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            welcome: "index.html".to_string(),
            directories: Vec::new(),
            wrap_js_resources: true,
            update_js_import: true,
            parser: ParserOptions::default(),
            module_strategy: ModuleStrategy::default(),
            map_file_name: None,
            fallback: AliasResolver::default(),
        }
    }
}

/// A configuration entry that was ignored or replaced by a default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigIssue {
    /// Dotted path of the offending field (`moduleResolver.alias[2]`)
    pub field: String,
    pub message: String,
}

impl ConfigIssue {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}
