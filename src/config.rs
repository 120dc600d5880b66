//! Reconciliation run configuration

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::routing::RoutingTable;

/// How a sale amount is compared against a statement credit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmountMatch {
    /// Amounts match when they differ by strictly less than the epsilon
    Tolerance(BigDecimal),
    /// Amounts must be numerically identical
    Exact,
}

impl AmountMatch {
    /// One cent, the default tolerance
    pub fn default_tolerance() -> BigDecimal {
        BigDecimal::new(1.into(), 2)
    }

    /// Check whether two amounts are considered equal under this policy
    pub fn matches(&self, left: &BigDecimal, right: &BigDecimal) -> bool {
        match self {
            AmountMatch::Tolerance(epsilon) => (left - right).abs() < *epsilon,
            AmountMatch::Exact => left == right,
        }
    }
}

impl Default for AmountMatch {
    fn default() -> Self {
        AmountMatch::Tolerance(Self::default_tolerance())
    }
}

/// Everything a reconciliation run is parameterized by
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationConfig {
    /// Payment method to candidate bank routing
    #[serde(default)]
    pub routing: RoutingTable,
    /// Amount comparison policy
    #[serde(default)]
    pub amount_match: AmountMatch,
}

impl ReconciliationConfig {
    /// Parse a configuration from JSON; missing sections fall back to defaults
    pub fn from_json(text: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Load a configuration from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Serialize the configuration for audit
    pub fn to_json(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Errors raised while loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Cannot read configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("Routing entry has an empty payment method")]
    EmptyPaymentMethod,
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;
