//! Core types and data structures for settlement reconciliation

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::utils::normalize::normalize_label;

/// Banks and acquirers that settle point-of-sale payments
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum BankId {
    /// Banco do Brasil
    Bb,
    /// Caixa Econômica Federal
    Caixa,
    /// PagBank (PagSeguro) acquirer
    Pagbank,
    /// Itaú Unibanco
    Itau,
    /// Santander
    Santander,
    /// Source that could not be attributed to any known bank
    Unknown,
}

impl BankId {
    /// Every identifier, sentinel last
    pub const ALL: [BankId; 6] = [
        BankId::Bb,
        BankId::Caixa,
        BankId::Pagbank,
        BankId::Itau,
        BankId::Santander,
        BankId::Unknown,
    ];

    /// Short lowercase code used in configuration and serialized output
    pub fn code(&self) -> &'static str {
        match self {
            BankId::Bb => "bb",
            BankId::Caixa => "caixa",
            BankId::Pagbank => "pagbank",
            BankId::Itau => "itau",
            BankId::Santander => "santander",
            BankId::Unknown => "unknown",
        }
    }

    /// Human-readable name for display
    pub fn display_name(&self) -> &'static str {
        match self {
            BankId::Bb => "Banco do Brasil",
            BankId::Caixa => "Caixa",
            BankId::Pagbank => "PagBank",
            BankId::Itau => "Itaú",
            BankId::Santander => "Santander",
            BankId::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for BankId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for BankId {
    type Err = IngestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_lowercase();
        BankId::ALL
            .into_iter()
            .find(|bank| bank.code() == code)
            .ok_or_else(|| IngestError::Validation(format!("Unknown bank identifier: {s}")))
    }
}

/// Kind of document a source holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaType {
    /// Delimited tabular export
    Csv,
    /// Text layer already extracted from a PDF (or a plain text export)
    PdfText,
    /// Anything else; never ingested
    Other,
}

impl MediaType {
    /// Guess the media type from a file name extension
    pub fn from_filename(name: &str) -> Self {
        let lower = name.trim().to_lowercase();
        if lower.ends_with(".csv") {
            MediaType::Csv
        } else if lower.ends_with(".pdf") || lower.ends_with(".txt") {
            MediaType::PdfText
        } else {
            MediaType::Other
        }
    }

    /// Map a MIME type to a media type
    pub fn from_mime(mime: &str) -> Self {
        match mime.trim().to_lowercase().as_str() {
            "text/csv" => MediaType::Csv,
            "application/pdf" | "text/plain" => MediaType::PdfText,
            _ => MediaType::Other,
        }
    }
}

/// A single point-of-sale transaction awaiting settlement confirmation.
///
/// Fields are private: a sale never changes after construction, and the
/// match it takes part in is recorded by the reconciliation output only.
/// The amount keeps its sign: a refund row is still a sale to account for,
/// and since pools hold only positive credits it ends up unmatched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sale {
    customer: String,
    payment_method: String,
    amount: BigDecimal,
    document_id: Option<String>,
    date: Option<NaiveDate>,
}

impl Sale {
    /// Create a new sale, normalizing the payment method label
    pub fn new(customer: &str, payment_method: &str, amount: BigDecimal) -> IngestResult<Self> {
        let customer = customer.trim();
        if customer.is_empty() {
            return Err(IngestError::Validation(
                "Sale customer cannot be empty".to_string(),
            ));
        }

        let payment_method = normalize_label(payment_method);
        if payment_method.is_empty() {
            return Err(IngestError::Validation(format!(
                "Sale for '{customer}' has no payment method"
            )));
        }

        Ok(Self {
            customer: customer.to_string(),
            payment_method,
            amount,
            document_id: None,
            date: None,
        })
    }

    /// Builder pattern: attach the receipt/document number
    pub fn with_document_id(mut self, document_id: String) -> Self {
        self.document_id = Some(document_id);
        self
    }

    /// Builder pattern: attach the sale date
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn customer(&self) -> &str {
        &self.customer
    }

    /// Normalized payment method label
    pub fn payment_method(&self) -> &str {
        &self.payment_method
    }

    pub fn amount(&self) -> &BigDecimal {
        &self.amount
    }

    pub fn document_id(&self) -> Option<&str> {
        self.document_id.as_deref()
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }
}

/// A credit line as extracted from a statement, before it is attributed to a bank
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementLine {
    /// Free text from the statement line
    pub description: String,
    /// Parsed amount; zero when the source value was unparseable
    pub amount: BigDecimal,
}

impl StatementLine {
    pub fn new(description: String, amount: BigDecimal) -> Self {
        Self {
            description,
            amount,
        }
    }
}

/// Every line extracted from one statement source, tagged with its bank
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementBatch {
    /// Bank assigned by the source classifier
    pub bank_id: BankId,
    /// Name of the source the lines came from
    pub source_name: String,
    /// Extracted lines in source order
    pub lines: Vec<StatementLine>,
}

impl StatementBatch {
    pub fn new(bank_id: BankId, source_name: String, lines: Vec<StatementLine>) -> Self {
        Self {
            bank_id,
            source_name,
            lines,
        }
    }
}

/// A statement credit that belongs to a bank pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementEntry {
    /// Bank whose pool holds this entry
    pub bank_id: BankId,
    /// Free text from the statement line
    pub description: String,
    /// Credit amount, always positive once pooled
    pub amount: BigDecimal,
}

impl StatementEntry {
    pub fn new(bank_id: BankId, description: String, amount: BigDecimal) -> Self {
        Self {
            bank_id,
            description,
            amount,
        }
    }
}

/// Errors raised while ingesting source documents
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("Unsupported source format: {0}")]
    UnsupportedFormat(String),
    #[error("No sales found in {0}")]
    NoSalesFound(String),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Invalid extraction pattern: {0}")]
    Pattern(#[from] regex::Error),
    #[error("Source error: {0}")]
    Source(String),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type for ingestion operations
pub type IngestResult<T> = Result<T, IngestError>;
