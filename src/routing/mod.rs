//! Routing of normalized payment methods to the banks expected to settle them
//!
//! The table is plain configuration: it can be enumerated for audit,
//! replaced from JSON and edited in tests without touching the engine.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::config::{ConfigError, ConfigResult};
use crate::types::BankId;
use crate::utils::normalize::normalize_label;

/// Mapping from normalized payment method to an ordered list of candidate banks.
///
/// List order is search priority. Keys are always stored normalized, so
/// lookups compare in the same normal form as ingested sales.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<String, Vec<BankId>>",
    into = "BTreeMap<String, Vec<BankId>>"
)]
pub struct RoutingTable {
    routes: BTreeMap<String, Vec<BankId>>,
}

impl RoutingTable {
    /// Create a table with no routes; every sale routed through it is unmatchable
    pub fn empty() -> Self {
        Self {
            routes: BTreeMap::new(),
        }
    }

    /// The standard back-office routing
    pub fn standard() -> Self {
        let card = vec![BankId::Pagbank, BankId::Itau];
        let rows = [
            ("PIX", vec![BankId::Bb]),
            ("DINHEIRO", vec![BankId::Caixa]),
            ("CARTÃO DE CRÉDITO", card.clone()),
            ("DÉBITO", card.clone()),
            ("PIX QRCODE", card.clone()),
            ("PIX CNPJ", vec![BankId::Santander]),
            // Label variants seen in older exports
            ("CRÉDITO", card.clone()),
            ("DEBITO", card.clone()),
            ("PIX QR CODE", card.clone()),
            ("LINK 2X", card),
        ];

        Self {
            routes: rows
                .into_iter()
                .map(|(method, banks)| (method.to_string(), banks))
                .collect(),
        }
    }

    /// Add or replace a route, returning the previous bank list if any
    pub fn insert(
        &mut self,
        payment_method: &str,
        banks: Vec<BankId>,
    ) -> ConfigResult<Option<Vec<BankId>>> {
        let key = normalize_label(payment_method);
        if key.is_empty() {
            return Err(ConfigError::EmptyPaymentMethod);
        }
        Ok(self.routes.insert(key, banks))
    }

    /// Remove a route
    pub fn remove(&mut self, payment_method: &str) -> Option<Vec<BankId>> {
        self.routes.remove(&normalize_label(payment_method))
    }

    /// Candidate banks for a payment method, in priority order.
    ///
    /// Unknown methods route nowhere.
    pub fn route(&self, payment_method: &str) -> &[BankId] {
        self.routes
            .get(&normalize_label(payment_method))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// All routes sorted by payment method
    pub fn entries(&self) -> impl Iterator<Item = (&str, &[BankId])> {
        self.routes
            .iter()
            .map(|(method, banks)| (method.as_str(), banks.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Parse a table from a JSON object of `method -> [bank codes]`
    pub fn from_json(text: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Load a table from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Serialize the table for audit
    pub fn to_json(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Default for RoutingTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl TryFrom<BTreeMap<String, Vec<BankId>>> for RoutingTable {
    type Error = ConfigError;

    fn try_from(raw: BTreeMap<String, Vec<BankId>>) -> Result<Self, Self::Error> {
        let mut table = Self::empty();
        for (method, banks) in raw {
            table.insert(&method, banks)?;
        }
        Ok(table)
    }
}

impl From<RoutingTable> for BTreeMap<String, Vec<BankId>> {
    fn from(table: RoutingTable) -> Self {
        table.routes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_routes() {
        let table = RoutingTable::standard();
        assert_eq!(table.route("PIX"), &[BankId::Bb]);
        assert_eq!(table.route("DINHEIRO"), &[BankId::Caixa]);
        assert_eq!(
            table.route("CARTÃO DE CRÉDITO"),
            &[BankId::Pagbank, BankId::Itau]
        );
        assert_eq!(table.route("DÉBITO"), &[BankId::Pagbank, BankId::Itau]);
        assert_eq!(table.route("PIX QRCODE"), &[BankId::Pagbank, BankId::Itau]);
        assert_eq!(table.route("PIX CNPJ"), &[BankId::Santander]);
    }

    #[test]
    fn test_lookup_is_normalized() {
        let table = RoutingTable::standard();
        assert_eq!(table.route("  pix   cnpj "), &[BankId::Santander]);
        assert_eq!(table.route("débito"), &[BankId::Pagbank, BankId::Itau]);
    }

    #[test]
    fn test_unknown_method_routes_nowhere() {
        let table = RoutingTable::standard();
        assert!(table.route("BOLETO").is_empty());
        assert!(table.route("").is_empty());
    }

    #[test]
    fn test_insert_and_remove() {
        let mut table = RoutingTable::empty();
        assert!(table.is_empty());

        let previous = table.insert(" vale  refeição", vec![BankId::Caixa]).unwrap();
        assert!(previous.is_none());
        assert_eq!(table.route("VALE REFEIÇÃO"), &[BankId::Caixa]);

        let previous = table.insert("VALE REFEIÇÃO", vec![BankId::Bb]).unwrap();
        assert_eq!(previous, Some(vec![BankId::Caixa]));
        assert_eq!(table.len(), 1);

        assert!(matches!(
            table.insert("   ", vec![BankId::Bb]),
            Err(ConfigError::EmptyPaymentMethod)
        ));

        assert_eq!(table.remove("vale refeição"), Some(vec![BankId::Bb]));
        assert!(table.is_empty());
    }

    #[test]
    fn test_entries_are_sorted_for_audit() {
        let table = RoutingTable::standard();
        let methods: Vec<&str> = table.entries().map(|(method, _)| method).collect();
        let mut sorted = methods.clone();
        sorted.sort();
        assert_eq!(methods, sorted);
        assert_eq!(methods.len(), 10);
    }

    #[test]
    fn test_json_round_trip() {
        let table = RoutingTable::from_json(r#"{ "pix  qrcode": ["itau", "pagbank"] }"#).unwrap();
        assert_eq!(table.route("PIX QRCODE"), &[BankId::Itau, BankId::Pagbank]);

        let json = table.to_json().unwrap();
        assert!(json.contains("\"PIX QRCODE\""));
        assert_eq!(RoutingTable::from_json(&json).unwrap(), table);
    }

    #[test]
    fn test_json_rejects_bad_input() {
        assert!(RoutingTable::from_json(r#"{ "PIX": ["nubank"] }"#).is_err());
        assert!(RoutingTable::from_json(r#"{ " ": ["bb"] }"#).is_err());
    }
}
