use async_trait::async_trait;

use super::Transformer;
use crate::error::Result;
use crate::resolved_file::ResolvedFile;

/// Serves a non-JS file requested as `.js` as a module whose default
/// export is the file text.
///
/// `import card from './card.html.js'` yields the raw HTML as a string.
/// The text is embedded verbatim between backticks. Bytes that are not
/// valid UTF-8 come through as U+FFFD.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResourceWrapper;

#[async_trait]
impl Transformer for ResourceWrapper {
    async fn transform(&self, file: &ResolvedFile) -> Result<Option<String>> {
        if !file.requested_is_js() || file.resolved_is_js() {
            return Ok(None);
        }
        let text = file.read_text_lossy().await?;
        tracing::debug!(file = %file.file.display(), "Wrapping resource as JS module");
        Ok(Some(format!("export default `{text}`;\n")))
    }
}
