//! In-memory document source for tests and embedding callers

use async_trait::async_trait;

use crate::traits::*;
use crate::types::*;

/// A document whose text is already held in memory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryDocument {
    name: String,
    media_type: MediaType,
    text: String,
}

impl MemoryDocument {
    /// Create a document with an explicit media type
    pub fn new(name: String, media_type: MediaType, text: String) -> Self {
        Self {
            name,
            media_type,
            text,
        }
    }

    /// Create a document, guessing the media type from the name's extension
    pub fn from_named(name: &str, text: &str) -> Self {
        Self::new(
            name.to_string(),
            MediaType::from_filename(name),
            text.to_string(),
        )
    }

    /// Box the document for heterogeneous source lists
    pub fn boxed(self) -> Box<dyn DocumentSource> {
        Box::new(self)
    }
}

#[async_trait]
impl DocumentSource for MemoryDocument {
    fn name(&self) -> &str {
        &self.name
    }

    fn media_type(&self) -> MediaType {
        self.media_type
    }

    async fn read_text(&self) -> IngestResult<String> {
        Ok(self.text.clone())
    }
}
