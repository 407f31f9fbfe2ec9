//! Filesystem runtime abstraction.
//!
//! Everything in the resolution pipeline that touches the disk goes through
//! the `Runtime` trait: stats for the file resolver, existence checks and
//! manifest reads for the module resolvers, text reads for the transformers.
//! The server wires in [`NativeRuntime`]; tests can substitute their own to
//! simulate failures that are hard to produce on a real filesystem.

pub mod native;

use async_trait::async_trait;
use std::path::{Path, PathBuf};

pub use native::NativeRuntime;

/// Result type for runtime operations
pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// Errors that can occur during runtime operations
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// Nothing exists at the path (or a parent component is not a directory)
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(String),

    /// Other runtime error
    #[error("Runtime error: {0}")]
    Other(String),
}

impl RuntimeError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, RuntimeError::FileNotFound(_))
    }
}

/// File metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileMetadata {
    /// File size in bytes
    pub size: u64,
    /// Whether this is a directory
    pub is_dir: bool,
    /// Whether this is a file
    pub is_file: bool,
    /// Last modified timestamp (milliseconds since epoch)
    pub modified: Option<u64>,
}

/// Platform runtime trait
#[async_trait]
pub trait Runtime: Send + Sync + std::fmt::Debug {
    /// Read a file from the filesystem
    async fn read_file(&self, path: &Path) -> RuntimeResult<Vec<u8>>;

    /// Get file metadata
    async fn metadata(&self, path: &Path) -> RuntimeResult<FileMetadata>;

    /// Stat a path, folding "does not exist" into `None`.
    ///
    /// Any other failure (permissions, I/O) is returned as an error so the
    /// caller can surface it instead of treating it as a miss.
    async fn stat(&self, path: &Path) -> RuntimeResult<Option<FileMetadata>> {
        match self.metadata(path).await {
            Ok(metadata) => Ok(Some(metadata)),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Whether a regular file exists at `path`
    async fn is_file(&self, path: &Path) -> RuntimeResult<bool> {
        Ok(self.stat(path).await?.is_some_and(|m| m.is_file))
    }
}
