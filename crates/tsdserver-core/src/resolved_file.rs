//! A request path bound to a file on disk.

use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::OnceCell;

use crate::error::{CoreError, Result};
use crate::runtime::{FileMetadata, Runtime};

/// The file that answers one request.
///
/// Owned by that request alone. The disk text is read at most once; the
/// transformer pipeline replaces `content` as it goes, and the response
/// streams the file only if nothing did.
#[derive(Debug)]
pub struct ResolvedFile {
    /// Path as requested, leading `/` stripped and percent-decoded
    pub requested_path: String,
    /// Candidate path that matched, after name mapping and fallbacks
    pub resolved_path: String,
    /// Absolute file on disk
    pub file: PathBuf,
    pub metadata: FileMetadata,
    content: Option<String>,
    disk_text: OnceCell<String>,
    runtime: Arc<dyn Runtime>,
}

impl ResolvedFile {
    pub fn new(
        requested_path: impl Into<String>,
        resolved_path: impl Into<String>,
        file: PathBuf,
        metadata: FileMetadata,
        runtime: Arc<dyn Runtime>,
    ) -> Self {
        Self {
            requested_path: requested_path.into(),
            resolved_path: resolved_path.into(),
            file,
            metadata,
            content: None,
            disk_text: OnceCell::new(),
            runtime,
        }
    }

    /// Modification time in milliseconds since the epoch, 0 if unknown.
    pub fn modified_ms(&self) -> u64 {
        self.metadata.modified.unwrap_or(0)
    }

    pub fn requested_is_js(&self) -> bool {
        self.requested_path.ends_with(".js")
    }

    pub fn resolved_is_js(&self) -> bool {
        has_js_extension(&self.file)
    }

    /// File text as it is on disk, read on first use.
    pub async fn read_text(&self) -> Result<&str> {
        let text = self
            .disk_text
            .get_or_try_init(|| async {
                let bytes = self
                    .runtime
                    .read_file(&self.file)
                    .await
                    .map_err(CoreError::from)?;
                String::from_utf8(bytes).map_err(|_| CoreError::NotUtf8(self.file.clone()))
            })
            .await?;
        Ok(text.as_str())
    }

    /// Disk text with invalid UTF-8 sequences replaced by U+FFFD.
    pub async fn read_text_lossy(&self) -> Result<Cow<'_, str>> {
        match self.read_text().await {
            Ok(text) => Ok(Cow::Borrowed(text)),
            Err(CoreError::NotUtf8(_)) => {
                let bytes = self.runtime.read_file(&self.file).await?;
                Ok(Cow::Owned(String::from_utf8_lossy(&bytes).into_owned()))
            }
            Err(err) => Err(err),
        }
    }

    /// Latest text: the last transformer output, else the disk text.
    pub async fn text(&self) -> Result<&str> {
        match &self.content {
            Some(content) => Ok(content.as_str()),
            None => self.read_text().await,
        }
    }

    pub fn set_content(&mut self, content: String) {
        self.content = Some(content);
    }

    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    pub fn into_content(self) -> Option<String> {
        self.content
    }
}

fn has_js_extension(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "js")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::NativeRuntime;
    use tempfile::TempDir;

    async fn resolved(temp: &TempDir, name: &str, content: &[u8]) -> ResolvedFile {
        let file = temp.path().join(name);
        std::fs::write(&file, content).unwrap();
        let runtime: Arc<dyn Runtime> = Arc::new(NativeRuntime);
        let metadata = runtime.metadata(&file).await.unwrap();
        ResolvedFile::new(name, name, file, metadata, runtime)
    }

    #[tokio::test]
    async fn test_text_prefers_transformed_content() {
        let temp = TempDir::new().unwrap();
        let mut file = resolved(&temp, "a.js", b"original").await;

        assert_eq!(file.text().await.unwrap(), "original");
        file.set_content("rewritten".to_string());
        assert_eq!(file.text().await.unwrap(), "rewritten");
        assert_eq!(file.read_text().await.unwrap(), "original");
    }

    #[tokio::test]
    async fn test_disk_text_is_memoized() {
        let temp = TempDir::new().unwrap();
        let file = resolved(&temp, "a.js", b"first").await;

        assert_eq!(file.read_text().await.unwrap(), "first");
        std::fs::write(temp.path().join("a.js"), "second").unwrap();
        assert_eq!(file.read_text().await.unwrap(), "first");
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_error() {
        let temp = TempDir::new().unwrap();
        let file = resolved(&temp, "bin.js", &[0xff, 0xfe, 0x00]).await;

        let err = file.read_text().await.unwrap_err();
        assert!(matches!(err, CoreError::NotUtf8(_)));
    }

    #[tokio::test]
    async fn test_lossy_text_replaces_invalid_bytes() {
        let temp = TempDir::new().unwrap();
        let file = resolved(&temp, "caf.txt", b"caf\xe9 ok").await;

        assert_eq!(file.read_text_lossy().await.unwrap(), "caf\u{fffd} ok");

        let valid = resolved(&temp, "plain.txt", b"plain").await;
        assert!(matches!(valid.read_text_lossy().await.unwrap(), Cow::Borrowed("plain")));
    }

    #[tokio::test]
    async fn test_js_flags() {
        let temp = TempDir::new().unwrap();
        let mut file = resolved(&temp, "tpl.html", b"<p>").await;
        file.requested_path = "tpl.html.js".to_string();

        assert!(file.requested_is_js());
        assert!(!file.resolved_is_js());
    }
}
