//! Content transformers applied to a resolved file before it is served.
//!
//! Transformers run in a fixed order and each one sees the latest content.
//! Returning `None` leaves the content as it was; if no transformer produces
//! anything the file is streamed straight from disk.

mod import_rewriter;
mod resource_wrapper;

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

use crate::error::Result;
use crate::resolved_file::ResolvedFile;

pub use import_rewriter::ImportRewriter;
pub use resource_wrapper::ResourceWrapper;

#[async_trait]
pub trait Transformer: Send + Sync + fmt::Debug {
    /// New content for `file`, or `None` to leave it unchanged.
    async fn transform(&self, file: &ResolvedFile) -> Result<Option<String>>;
}

/// Ordered list of transformers.
#[derive(Debug, Clone, Default)]
pub struct TransformPipeline {
    transformers: Vec<Arc<dyn Transformer>>,
}

impl TransformPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, transformer: Arc<dyn Transformer>) {
        self.transformers.push(transformer);
    }

    pub fn len(&self) -> usize {
        self.transformers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transformers.is_empty()
    }

    /// Run every transformer over `file`, storing each output as the new
    /// content. Returns whether anything changed.
    pub async fn run(&self, file: &mut ResolvedFile) -> Result<bool> {
        let mut transformed = false;
        for transformer in &self.transformers {
            if let Some(content) = transformer.transform(file).await? {
                file.set_content(content);
                transformed = true;
            }
        }
        Ok(transformed)
    }
}
