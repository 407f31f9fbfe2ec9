//! Native filesystem runtime.
//!
//! Wraps `std::fs` calls in `tokio::task::spawn_blocking` so a slow disk
//! never stalls the request executor.

// NativeRuntime is the one place allowed to touch std::fs directly
#![allow(clippy::disallowed_methods)]

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::task;

use super::{FileMetadata, Runtime, RuntimeError, RuntimeResult};

/// Native filesystem `Runtime` implementation using `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeRuntime;

impl NativeRuntime {
    pub fn new() -> Self {
        Self
    }
}

fn map_io_error(path: &Path, action: &str, err: std::io::Error) -> RuntimeError {
    match err.kind() {
        ErrorKind::NotFound | ErrorKind::NotADirectory => {
            RuntimeError::FileNotFound(path.to_path_buf())
        }
        _ => RuntimeError::Io(format!("Failed to {} {}: {}", action, path.display(), err)),
    }
}

async fn blocking<T, F>(path: &Path, f: F) -> RuntimeResult<T>
where
    T: Send + 'static,
    F: FnOnce(PathBuf) -> RuntimeResult<T> + Send + 'static,
{
    let path = path.to_path_buf();
    task::spawn_blocking(move || f(path))
        .await
        .map_err(|e| RuntimeError::Other(format!("Task join error: {}", e)))?
}

#[async_trait]
impl Runtime for NativeRuntime {
    async fn read_file(&self, path: &Path) -> RuntimeResult<Vec<u8>> {
        blocking(path, |path| {
            std::fs::read(&path).map_err(|e| map_io_error(&path, "read", e))
        })
        .await
    }

    async fn metadata(&self, path: &Path) -> RuntimeResult<FileMetadata> {
        blocking(path, |path| {
            let metadata =
                std::fs::metadata(&path).map_err(|e| map_io_error(&path, "stat", e))?;

            let modified = metadata
                .modified()
                .ok()
                .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
                .map(|d| d.as_millis() as u64);

            Ok(FileMetadata {
                size: metadata.len(),
                is_dir: metadata.is_dir(),
                is_file: metadata.is_file(),
                modified,
            })
        })
        .await
    }
}
