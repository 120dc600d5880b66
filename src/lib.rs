//! # Reconciliation Core
//!
//! Settlement reconciliation for small retail back offices: point-of-sale
//! sales are paired with the credits that appear on several bank and
//! acquirer statements.
//!
//! ## Features
//!
//! - **Normalization**: locale-formatted amounts (`1.234,56` and `1234.56`)
//!   and payment method labels in one canonical form
//! - **Routing**: configurable payment method to candidate bank table
//! - **Aggregation**: per-bank pools of statement credits, noise excluded
//! - **Matching**: greedy first-fit engine with a configurable amount tolerance
//! - **Ingestion**: pluggable extractors for sales exports, receipt text and
//!   bank statements, plus a swappable source classifier
//!
//! ## Quick Start
//!
//! ```rust
//! use reconciliation_core::{
//!     BankId, ReconciliationEngine, Sale, StatementBatch, StatementLine, StatementPools,
//! };
//! use bigdecimal::BigDecimal;
//!
//! let sales = vec![Sale::new("Maria", "pix", BigDecimal::from(100)).unwrap()];
//! let mut pools = StatementPools::aggregate(vec![StatementBatch::new(
//!     BankId::Bb,
//!     "bb_marco.csv".to_string(),
//!     vec![StatementLine::new("PIX RECEBIDO".to_string(), BigDecimal::from(100))],
//! )]);
//!
//! let result = ReconciliationEngine::new().reconcile(&sales, &mut pools);
//! assert_eq!(result.matched_sales().len(), 1);
//! assert!(result.unidentified_credits().is_empty());
//! ```

pub mod config;
pub mod ingest;
pub mod reconciliation;
pub mod routing;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use config::*;
pub use ingest::Ingestor;
pub use reconciliation::*;
pub use routing::RoutingTable;
pub use traits::*;
pub use types::*;
pub use utils::normalize::{normalize_label, parse_amount};
