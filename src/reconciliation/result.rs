//! Classified output of a reconciliation run

use bigdecimal::BigDecimal;
use serde::Serialize;

use crate::types::*;

/// A sale paired with the statement credit that settled it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchedSale {
    pub sale: Sale,
    /// Bank whose pool yielded the credit
    pub bank_id: BankId,
    /// The consumed credit
    pub entry: StatementEntry,
}

/// A sale no candidate bank pool could settle
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnmatchedSale {
    pub sale: Sale,
    /// Banks that were searched, in priority order; empty when the payment
    /// method has no route
    pub searched_banks: Vec<BankId>,
}

/// Immutable snapshot produced by one reconciliation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconciliationResult {
    matched_sales: Vec<MatchedSale>,
    unmatched_sales: Vec<UnmatchedSale>,
    unidentified_credits: Vec<StatementEntry>,
    total_sales: usize,
}

impl ReconciliationResult {
    pub(crate) fn new(
        matched_sales: Vec<MatchedSale>,
        unmatched_sales: Vec<UnmatchedSale>,
        unidentified_credits: Vec<StatementEntry>,
        total_sales: usize,
    ) -> Self {
        debug_assert_eq!(matched_sales.len() + unmatched_sales.len(), total_sales);
        Self {
            matched_sales,
            unmatched_sales,
            unidentified_credits,
            total_sales,
        }
    }

    /// Sales paired with a credit, in input order
    pub fn matched_sales(&self) -> &[MatchedSale] {
        &self.matched_sales
    }

    /// Sales with no credit, in input order
    pub fn unmatched_sales(&self) -> &[UnmatchedSale] {
        &self.unmatched_sales
    }

    /// Credits no sale consumed, pool by pool in aggregation order
    pub fn unidentified_credits(&self) -> &[StatementEntry] {
        &self.unidentified_credits
    }

    /// Number of sales submitted to the run
    pub fn total_sales(&self) -> usize {
        self.total_sales
    }

    /// Counts and amount totals for each bucket
    pub fn summary(&self) -> ReconciliationSummary {
        let matched_amount: BigDecimal = self
            .matched_sales
            .iter()
            .map(|m| m.sale.amount())
            .sum();
        let unmatched_amount: BigDecimal = self
            .unmatched_sales
            .iter()
            .map(|u| u.sale.amount())
            .sum();
        let unidentified_amount: BigDecimal =
            self.unidentified_credits.iter().map(|e| &e.amount).sum();

        ReconciliationSummary {
            total_sales: self.total_sales,
            matched_count: self.matched_sales.len(),
            unmatched_count: self.unmatched_sales.len(),
            unidentified_count: self.unidentified_credits.len(),
            matched_amount,
            unmatched_amount,
            unidentified_amount,
            is_fully_reconciled: self.total_sales > 0 && self.unmatched_sales.is_empty(),
        }
    }
}

/// Tallies of a reconciliation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconciliationSummary {
    pub total_sales: usize,
    pub matched_count: usize,
    pub unmatched_count: usize,
    pub unidentified_count: usize,
    pub matched_amount: BigDecimal,
    pub unmatched_amount: BigDecimal,
    pub unidentified_amount: BigDecimal,
    /// Every sale found a credit (and there was at least one sale)
    pub is_fully_reconciled: bool,
}
