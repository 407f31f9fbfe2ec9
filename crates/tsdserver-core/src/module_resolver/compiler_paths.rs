use async_trait::async_trait;
use path_clean::PathClean;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::{CompilerOptions, ImportDeclaration, ModuleResolution, ModuleResolver};
use crate::package_json::PackageJson;
use crate::paths::{ensure_js_suffix, join_within, relative, servable_path, to_posix};
use crate::runtime::{Runtime, RuntimeResult};

/// tsconfig `paths` mapped into `outDir`, then `node_modules`.
///
/// Path patterns are checked in declaration order. The first key that
/// matches the specifier (exactly, or by prefix for a trailing `*`) decides
/// the candidate list, and the first candidate that exists as compiled
/// output wins. Without a hit the specifier is looked up as a package.
#[derive(Debug, Clone)]
pub struct CompilerPathsResolver {
    root: PathBuf,
    options: CompilerOptions,
    runtime: Arc<dyn Runtime>,
}

impl CompilerPathsResolver {
    pub fn new(root: PathBuf, options: CompilerOptions, runtime: Arc<dyn Runtime>) -> Self {
        Self {
            root,
            options,
            runtime,
        }
    }

    /// Candidate files (relative to `outDir`) for the first matching pattern.
    fn mapped_candidates(&self, specifier: &str) -> Option<Vec<String>> {
        for (key, values) in &self.options.paths {
            if key == specifier {
                return Some(values.iter().map(|v| ensure_js_suffix(v)).collect());
            }
            if let Some(prefix) = key.strip_suffix('*') {
                if let Some(rest) = specifier.strip_prefix(prefix) {
                    let replacement = ensure_js_suffix(rest);
                    return Some(
                        values
                            .iter()
                            .map(|v| ensure_js_suffix(&v.replacen('*', &replacement, 1)))
                            .collect(),
                    );
                }
            }
        }
        None
    }

    async fn resolve_mapped(&self, specifier: &str) -> RuntimeResult<Option<String>> {
        let Some(candidates) = self.mapped_candidates(specifier) else {
            return Ok(None);
        };
        let out_dir = self.options.out_dir_path();
        for candidate in candidates {
            let Some(file) = join_within(&self.root.join(&out_dir), &candidate) else {
                continue;
            };
            if self.runtime.is_file(&file).await? {
                return Ok(Some(servable_path(&out_dir, &candidate)));
            }
        }
        Ok(None)
    }

    /// Package directory relative to the root, honouring `file:` redirects
    /// in the project manifest.
    async fn package_dir(&self, module_name: &str) -> RuntimeResult<PathBuf> {
        let project = PackageJson::load(self.runtime.as_ref(), &self.root.join("package.json")).await?;
        if let Some(dir) = project.as_ref().and_then(|p| p.file_dependency(module_name)) {
            return Ok(relative(Path::new(dir)).clean());
        }
        Ok(Path::new("node_modules").join(module_name))
    }

    async fn resolve_package(&self, declaration: &ImportDeclaration) -> RuntimeResult<Option<String>> {
        let package_dir = self.package_dir(&declaration.module_name).await?;
        let absolute_dir = self.root.join(&package_dir);

        if let Some(sub_path) = declaration.sub_path.as_deref() {
            let file_name = ensure_js_suffix(sub_path);
            if let Some(file) = join_within(&absolute_dir, &file_name) {
                if self.runtime.is_file(&file).await? {
                    return Ok(Some(servable_path(&package_dir, &file_name)));
                }
            }
        }

        let manifest = absolute_dir.join("package.json");
        let Some(package) = PackageJson::load(self.runtime.as_ref(), &manifest).await? else {
            return Ok(None);
        };
        let Some(entry) = package.entry() else {
            return Ok(None);
        };
        match join_within(&absolute_dir, entry) {
            Some(file) if self.runtime.is_file(&file).await? => {
                Ok(Some(servable_path(&package_dir, entry)))
            }
            _ => Ok(None),
        }
    }
}

#[async_trait]
impl ModuleResolver for CompilerPathsResolver {
    async fn resolve(&self, declaration: &ImportDeclaration) -> RuntimeResult<ModuleResolution> {
        if let Some(path) = self.resolve_mapped(&declaration.specifier).await? {
            return Ok(ModuleResolution::Resolved(path));
        }
        if let Some(path) = self.resolve_package(declaration).await? {
            return Ok(ModuleResolution::Resolved(path));
        }
        tracing::debug!(
            specifier = %declaration.specifier,
            file = %to_posix(&declaration.declaring_file),
            "No compiled output or package found, keeping specifier"
        );
        Ok(ModuleResolution::Unresolved)
    }
}
