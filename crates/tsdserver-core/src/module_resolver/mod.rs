//! Bare import specifier resolution.
//!
//! The import rewriter hands every non-relative specifier to a
//! [`ModuleResolver`] and gets back a browser-servable path, a request to
//! drop the statement, or nothing. The concrete strategy is chosen once when
//! the request handler is built:
//!
//! - [`AliasPackageResolver`] applies alias rules, then looks the name up in
//!   `node_modules/<name>/package.json`.
//! - [`CompilerPathsResolver`] follows tsconfig `paths` into `outDir`, then
//!   falls back to `node_modules`.
//! - [`CustomResolver`] wraps a caller-supplied callback.

mod alias_package;
mod compiler_paths;
pub mod tsconfig;

use async_trait::async_trait;
use std::fmt;
use std::ops::Range;
use std::path::PathBuf;
use std::sync::Arc;

use crate::runtime::RuntimeResult;

pub use alias_package::AliasPackageResolver;
pub use compiler_paths::CompilerPathsResolver;
pub use tsconfig::CompilerOptions;

/// One module specifier found in a source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDeclaration {
    /// The specifier exactly as written
    pub specifier: String,
    /// Package part of the specifier (`lodash`, `@scope/pkg`)
    pub module_name: String,
    /// Remainder after the package part (`map` in `lodash/map`)
    pub sub_path: Option<String>,
    /// Byte range of the string literal, quotes included
    pub range: Range<u32>,
    /// File the specifier was found in
    pub declaring_file: PathBuf,
}

impl ImportDeclaration {
    pub fn new(specifier: impl Into<String>, range: Range<u32>, declaring_file: PathBuf) -> Self {
        let specifier = specifier.into();
        let (module_name, sub_path) = split_specifier(&specifier);
        Self {
            module_name: module_name.to_string(),
            sub_path: sub_path.map(str::to_string),
            specifier,
            range,
            declaring_file,
        }
    }
}

/// Split at the first `/`, or the second for scoped (`@scope/pkg`) names.
pub fn split_specifier(specifier: &str) -> (&str, Option<&str>) {
    let search_from = if specifier.starts_with('@') {
        match specifier.find('/') {
            Some(i) => i + 1,
            None => return (specifier, None),
        }
    } else {
        0
    };

    match specifier[search_from..].find('/') {
        Some(i) => {
            let split = search_from + i;
            let rest = &specifier[split + 1..];
            (&specifier[..split], (!rest.is_empty()).then_some(rest))
        }
        None => (specifier, None),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleResolution {
    /// Browser-servable path to use instead of the specifier
    Resolved(String),
    /// Drop the statement that contains the specifier
    Suppressed,
    /// Keep the specifier as written
    Unresolved,
}

#[async_trait]
pub trait ModuleResolver: Send + Sync + fmt::Debug {
    async fn resolve(&self, declaration: &ImportDeclaration) -> RuntimeResult<ModuleResolution>;
}

pub type ResolveFn = Arc<dyn Fn(&ImportDeclaration) -> ModuleResolution + Send + Sync>;

/// Resolver backed by a caller-supplied callback.
#[derive(Clone)]
pub struct CustomResolver {
    callback: ResolveFn,
}

impl CustomResolver {
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(&ImportDeclaration) -> ModuleResolution + Send + Sync + 'static,
    {
        Self {
            callback: Arc::new(callback),
        }
    }
}

impl fmt::Debug for CustomResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CustomResolver(..)")
    }
}

#[async_trait]
impl ModuleResolver for CustomResolver {
    async fn resolve(&self, declaration: &ImportDeclaration) -> RuntimeResult<ModuleResolution> {
        Ok((self.callback)(declaration))
    }
}
