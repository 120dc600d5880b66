//! Traits for pluggable extraction and source classification
//!
//! These keep the matching core independent of document layouts: new
//! sales-report or statement formats are added by implementing a trait,
//! never by touching the engine.

use async_trait::async_trait;

use crate::types::*;

/// Extracts sales from the raw text of a sales report
pub trait SaleExtractor: Send + Sync {
    /// Parse every sale found in `raw`, in document order
    fn extract_sales(&self, raw: &str) -> IngestResult<Vec<Sale>>;
}

/// Extracts credit lines from the raw text of one bank statement
pub trait StatementExtractor: Send + Sync {
    /// Parse every statement line found in `raw`, in document order
    fn extract_statement(&self, raw: &str) -> IngestResult<Vec<StatementLine>>;
}

/// Assigns a bank to a statement source
pub trait SourceClassifier: Send + Sync {
    /// Classify a source; sources nothing recognizes map to [`BankId::Unknown`]
    fn classify(&self, name: &str, media_type: MediaType) -> BankId;
}

/// A document that can be read as text.
///
/// Reading is async so callers can fetch or extract several sources
/// concurrently; ingestion still waits for every source before pooling.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Name of the source, typically the file name
    fn name(&self) -> &str;

    /// Kind of document
    fn media_type(&self) -> MediaType;

    /// Full text content
    async fn read_text(&self) -> IngestResult<String>;
}
