use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;

use super::{ImportDeclaration, ModuleResolution, ModuleResolver};
use crate::alias::{AliasOutcome, AliasResolver};
use crate::package_json::PackageJson;
use crate::paths::{is_relative_specifier, join_within, servable_path};
use crate::runtime::{Runtime, RuntimeResult};

/// Alias rules first, then the package manifest under `node_modules`.
///
/// The returned path is relative to the served root (`/lodash/map.js`); the
/// file resolver always searches `node_modules`, so it finds the package
/// there without the prefix.
#[derive(Debug, Clone)]
pub struct AliasPackageResolver {
    root: PathBuf,
    aliases: AliasResolver<String>,
    runtime: Arc<dyn Runtime>,
}

impl AliasPackageResolver {
    pub fn new(root: PathBuf, aliases: AliasResolver<String>, runtime: Arc<dyn Runtime>) -> Self {
        Self {
            root,
            aliases,
            runtime,
        }
    }

    async fn package_entry(&self, name: &str) -> RuntimeResult<Option<String>> {
        let Some(package_dir) = join_within(&self.root.join("node_modules"), name) else {
            return Ok(None);
        };
        let manifest = package_dir.join("package.json");
        let Some(package) = PackageJson::load(self.runtime.as_ref(), &manifest).await? else {
            return Ok(None);
        };
        let Some(entry) = package.entry() else {
            return Ok(None);
        };
        let Some(entry_file) = join_within(&package_dir, entry) else {
            return Ok(None);
        };
        if self.runtime.is_file(&entry_file).await? {
            Ok(Some(servable_path(name, entry)))
        } else {
            Ok(None)
        }
    }
}

#[async_trait]
impl ModuleResolver for AliasPackageResolver {
    async fn resolve(&self, declaration: &ImportDeclaration) -> RuntimeResult<ModuleResolution> {
        let name = match self.aliases.resolve(&declaration.specifier) {
            AliasOutcome::Suppressed => return Ok(ModuleResolution::Suppressed),
            AliasOutcome::Replaced(name) => name,
            AliasOutcome::NotMatched => declaration.specifier.clone(),
        };

        // An alias may point straight at a served path; there is no package to look up
        if is_relative_specifier(&name) {
            return Ok(ModuleResolution::Resolved(name));
        }

        if let Some(path) = self.package_entry(&name).await? {
            return Ok(ModuleResolution::Resolved(path));
        }
        Ok(ModuleResolution::Resolved(format!("/{name}")))
    }
}
