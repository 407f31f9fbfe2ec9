//! Request path to file on disk.
//!
//! A request path first goes through the optional name mapping, which turns
//! it into an ordered list of candidate paths. Each candidate is looked up in
//! every search directory in turn; when none of them has it, the fallback
//! chain proposes the next path to try (`widget.html.js` -> `widget.html`),
//! until a file turns up or the chain runs dry.

use path_clean::PathClean;
use rustc_hash::FxHashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::alias::{AliasOutcome, AliasResolver};
use crate::paths::join_within;
use crate::resolved_file::ResolvedFile;
use crate::runtime::{Runtime, RuntimeResult};

/// Upper bound on fallback steps for one candidate.
const MAX_FALLBACK_DEPTH: usize = 32;

#[derive(Debug, Clone)]
pub struct FileResolver {
    directories: Vec<PathBuf>,
    map_file_name: Option<AliasResolver<Vec<String>>>,
    fallback: AliasResolver<String>,
    strip_js_suffix: bool,
    runtime: Arc<dyn Runtime>,
}

impl FileResolver {
    /// `directories` are searched in order, followed by `.` and
    /// `node_modules`. All are taken relative to `root`; duplicates keep
    /// their first position.
    pub fn new(root: &Path, directories: &[PathBuf], runtime: Arc<dyn Runtime>) -> Self {
        let mut seen = FxHashSet::default();
        let directories = directories
            .iter()
            .map(PathBuf::as_path)
            .chain([Path::new("."), Path::new("node_modules")])
            .map(|dir| root.join(dir).clean())
            .filter(|dir| seen.insert(dir.clone()))
            .collect();

        Self {
            directories,
            map_file_name: None,
            fallback: AliasResolver::default(),
            strip_js_suffix: false,
            runtime,
        }
    }

    pub fn with_name_mapping(mut self, mapping: Option<AliasResolver<Vec<String>>>) -> Self {
        self.map_file_name = mapping;
        self
    }

    pub fn with_fallback(mut self, fallback: AliasResolver<String>) -> Self {
        self.fallback = fallback;
        self
    }

    /// Retry `x.html.js` as `x.html` so resources can be wrapped as modules.
    pub fn with_js_suffix_fallback(mut self, enabled: bool) -> Self {
        self.strip_js_suffix = enabled;
        self
    }

    pub fn directories(&self) -> &[PathBuf] {
        &self.directories
    }

    pub async fn resolve(&self, request_path: &str) -> RuntimeResult<Option<ResolvedFile>> {
        for candidate in self.candidates(request_path) {
            if let Some(file) = self.resolve_with_fallback(request_path, candidate).await? {
                return Ok(Some(file));
            }
        }
        Ok(None)
    }

    fn candidates(&self, request_path: &str) -> Vec<String> {
        let Some(mapping) = &self.map_file_name else {
            return vec![request_path.to_string()];
        };
        match mapping.resolve(request_path) {
            AliasOutcome::Replaced(candidates) => candidates,
            AliasOutcome::Suppressed => Vec::new(),
            AliasOutcome::NotMatched => vec![request_path.to_string()],
        }
    }

    async fn resolve_with_fallback(
        &self,
        request_path: &str,
        candidate: String,
    ) -> RuntimeResult<Option<ResolvedFile>> {
        let mut visited = FxHashSet::default();
        let mut current = Some(candidate);

        while let Some(path) = current.take() {
            if visited.len() >= MAX_FALLBACK_DEPTH || !visited.insert(path.clone()) {
                tracing::debug!(request = request_path, path = %path, "Fallback chain stopped");
                break;
            }
            if let Some(file) = self.find_in_directories(request_path, &path).await? {
                return Ok(Some(file));
            }
            current = self.next_fallback(&path);
        }
        Ok(None)
    }

    async fn find_in_directories(
        &self,
        request_path: &str,
        path: &str,
    ) -> RuntimeResult<Option<ResolvedFile>> {
        if path.is_empty() {
            return Ok(None);
        }
        for directory in &self.directories {
            let Some(file) = join_within(directory, path) else {
                continue;
            };
            match self.runtime.stat(&file).await? {
                Some(metadata) if metadata.is_file => {
                    return Ok(Some(ResolvedFile::new(
                        request_path,
                        path,
                        file,
                        metadata,
                        Arc::clone(&self.runtime),
                    )));
                }
                _ => {}
            }
        }
        Ok(None)
    }

    fn next_fallback(&self, path: &str) -> Option<String> {
        if self.strip_js_suffix {
            if let Some(stripped) = path.strip_suffix(".js") {
                return Some(stripped.to_string());
            }
        }
        match self.fallback.resolve(path) {
            AliasOutcome::Replaced(next) => Some(next),
            AliasOutcome::Suppressed | AliasOutcome::NotMatched => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alias::AliasRule;
    use crate::runtime::NativeRuntime;
    use regex::Regex;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn resolver(root: &Path, dirs: &[&str]) -> FileResolver {
        let dirs: Vec<PathBuf> = dirs.iter().map(PathBuf::from).collect();
        FileResolver::new(root, &dirs, Arc::new(NativeRuntime))
    }

    #[test]
    fn test_directories_are_deduplicated_in_order() {
        let resolver = resolver(Path::new("/srv"), &["dist", "./dist/", ".", "lib"]);
        let dirs: Vec<_> = resolver.directories().to_vec();
        assert_eq!(
            dirs,
            vec![
                PathBuf::from("/srv/dist"),
                PathBuf::from("/srv"),
                PathBuf::from("/srv/lib"),
                PathBuf::from("/srv/node_modules"),
            ]
        );
    }

    #[tokio::test]
    async fn test_first_directory_wins() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "dist/app.js", "dist");
        write(temp.path(), "app.js", "root");

        let file = resolver(temp.path(), &["dist"])
            .resolve("app.js")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(file.file, temp.path().join("dist/app.js"));
        assert_eq!(file.resolved_path, "app.js");
    }

    #[tokio::test]
    async fn test_node_modules_is_searched_last() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "node_modules/lit/index.js", "");

        let file = resolver(temp.path(), &[]).resolve("lit/index.js").await.unwrap();
        assert!(file.is_some());
    }

    #[tokio::test]
    async fn test_directories_are_not_files() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("assets")).unwrap();

        let file = resolver(temp.path(), &[]).resolve("assets").await.unwrap();
        assert!(file.is_none());
    }

    #[tokio::test]
    async fn test_js_suffix_fallback() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "tpl/card.html", "<div></div>");

        let resolver = resolver(temp.path(), &[]).with_js_suffix_fallback(true);
        let file = resolver.resolve("tpl/card.html.js").await.unwrap().unwrap();
        assert_eq!(file.requested_path, "tpl/card.html.js");
        assert_eq!(file.resolved_path, "tpl/card.html");

        let disabled = self::resolver(temp.path(), &[]);
        assert!(disabled.resolve("tpl/card.html.js").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_configured_fallback_chain() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "index.html", "<html>");

        let fallback = AliasResolver::new(vec![AliasRule::regex(
            Regex::new(r"^app/.*$").unwrap(),
            Some("index.html".to_string()),
        )]);
        let resolver = resolver(temp.path(), &[]).with_fallback(fallback);
        let file = resolver.resolve("app/settings/profile").await.unwrap().unwrap();
        assert_eq!(file.resolved_path, "index.html");
    }

    #[tokio::test]
    async fn test_fallback_cycle_terminates() {
        let temp = TempDir::new().unwrap();
        let fallback = AliasResolver::from_pairs([
            ("a", Some("b".to_string())),
            ("b", Some("a".to_string())),
        ]);
        let resolver = resolver(temp.path(), &[]).with_fallback(fallback);
        assert!(resolver.resolve("a").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_name_mapping_candidates() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "legacy/main.js", "");

        let mapping = AliasResolver::from_pairs([
            ("main.js", Some(vec!["modern/main.js".to_string(), "legacy/main.js".to_string()])),
            ("hidden.js", None),
            ("nothing.js", Some(Vec::new())),
        ]);
        write(temp.path(), "hidden.js", "");
        write(temp.path(), "nothing.js", "");
        let resolver = resolver(temp.path(), &[]).with_name_mapping(Some(mapping));

        let file = resolver.resolve("main.js").await.unwrap().unwrap();
        assert_eq!(file.resolved_path, "legacy/main.js");
        assert!(resolver.resolve("hidden.js").await.unwrap().is_none());
        assert!(resolver.resolve("nothing.js").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_parent_escape_is_not_found() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "site/index.html", "");
        write(temp.path(), "secret.txt", "");

        let resolver = resolver(&temp.path().join("site"), &[]);
        assert!(resolver.resolve("../secret.txt").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_path_through_a_file_is_not_found() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "index.html", "");

        let resolver = resolver(temp.path(), &[]);
        assert!(resolver.resolve("index.html/x.js").await.unwrap().is_none());
    }
}
