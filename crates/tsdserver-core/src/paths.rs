//! Small path helpers shared by the resolvers.

use path_clean::PathClean;
use std::path::{Component, Path, PathBuf};

/// `/x`, `./x` and `../x` are served as-is; everything else names a package.
pub fn is_relative_specifier(specifier: &str) -> bool {
    specifier.starts_with('/') || specifier.starts_with("./") || specifier.starts_with("../")
}

pub fn ensure_js_suffix(name: &str) -> String {
    if name.ends_with(".js") {
        name.to_string()
    } else {
        format!("{name}.js")
    }
}

/// Render a relative path with `/` separators regardless of platform.
pub fn to_posix(path: &Path) -> String {
    path.components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            Component::ParentDir => Some("..".to_string()),
            Component::CurDir | Component::RootDir | Component::Prefix(_) => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Join and normalize, then render as a browser-absolute path (`/a/b.js`).
pub fn servable_path(base: impl AsRef<Path>, rest: impl AsRef<Path>) -> String {
    let joined = base.as_ref().join(relative(rest.as_ref())).clean();
    format!("/{}", to_posix(&joined))
}

/// Strip any root so `join` never discards the base.
pub fn relative(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::RootDir | Component::Prefix(_)))
        .collect()
}

/// `dir.join(rest)`, refusing results that climb out of `dir`.
pub fn join_within(dir: &Path, rest: &str) -> Option<PathBuf> {
    let rest = relative(Path::new(rest)).clean();
    match rest.components().next() {
        Some(Component::ParentDir) => None,
        _ => Some(dir.join(rest)),
    }
}
