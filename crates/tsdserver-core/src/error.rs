//! Error types for request resolution and source rewriting.
//!
//! Resolution misses are not errors: a missing file is a `None`, a bare
//! specifier nobody can resolve is `ModuleResolution::Unresolved`. What ends
//! up here is the unexpected stuff that becomes a `500` for one request.

use std::path::PathBuf;

use thiserror::Error;

use crate::runtime::RuntimeError;

/// Result type alias using `CoreError` as the default error type.
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum CoreError {
    /// Filesystem failure other than "does not exist"
    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    /// The request URL could not be turned into a path
    #[error("invalid request path '{path}': {reason}")]
    InvalidRequestPath { path: String, reason: String },

    /// A file selected for rewriting is not valid UTF-8
    #[error("{} is not valid UTF-8", .0.display())]
    NotUtf8(PathBuf),

    /// Two rewrite edits claim the same bytes
    #[error("overlapping edits at {first_start}..{first_end} and {second_start}..{second_end}")]
    OverlappingEdits {
        first_start: u32,
        first_end: u32,
        second_start: u32,
        second_end: u32,
    },

    /// An edit range lies outside the text it applies to
    #[error("edit range {start}..{end} is out of bounds for text of length {len}")]
    EditOutOfBounds { start: u32, end: u32, len: usize },

    /// tsconfig.json could not be read or understood
    #[error("failed to load {}: {reason}", .path.display())]
    Tsconfig { path: PathBuf, reason: String },
}
