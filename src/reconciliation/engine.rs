//! Greedy first-fit matching of sales against statement pools

use crate::config::{AmountMatch, ReconciliationConfig};
use crate::reconciliation::pool::StatementPools;
use crate::reconciliation::result::*;
use crate::routing::RoutingTable;
use crate::types::*;

/// Reconciliation engine pairing sales with bank statement credits.
///
/// Matching is greedy and non-reassignable: sales are processed in input
/// order, candidate banks in routing order, pool entries in aggregation
/// order, and the first unconsumed entry with a matching amount wins.
#[derive(Debug, Clone, Default)]
pub struct ReconciliationEngine {
    config: ReconciliationConfig,
}

impl ReconciliationEngine {
    /// Create an engine with the standard routing and a one-cent tolerance
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine from an explicit configuration
    pub fn with_config(config: ReconciliationConfig) -> Self {
        Self { config }
    }

    /// Create an engine with a custom routing table
    pub fn with_routing(routing: RoutingTable) -> Self {
        Self::with_config(ReconciliationConfig {
            routing,
            ..ReconciliationConfig::default()
        })
    }

    /// Replace the amount comparison policy
    pub fn amount_match(mut self, amount_match: AmountMatch) -> Self {
        self.config.amount_match = amount_match;
        self
    }

    pub fn config(&self) -> &ReconciliationConfig {
        &self.config
    }

    pub fn routing(&self) -> &RoutingTable {
        &self.config.routing
    }

    /// Reconcile sales against the pools.
    ///
    /// Consumption state left over from an earlier run on the same pools is
    /// cleared first, so repeated calls classify identically.
    pub fn reconcile(&self, sales: &[Sale], pools: &mut StatementPools) -> ReconciliationResult {
        pools.begin_run();

        let mut matched_sales = Vec::new();
        let mut unmatched_sales = Vec::new();

        for sale in sales {
            let candidates = self.config.routing.route(sale.payment_method());

            let hit = candidates.iter().find_map(|&bank_id| {
                let pool = pools.get_mut(bank_id)?;
                pool.consume_first(sale.amount(), &self.config.amount_match)
                    .map(|entry| (bank_id, entry.clone()))
            });

            match hit {
                Some((bank_id, entry)) => {
                    tracing::debug!(
                        customer = sale.customer(),
                        method = sale.payment_method(),
                        amount = %sale.amount(),
                        bank = %bank_id,
                        "sale matched"
                    );
                    matched_sales.push(MatchedSale {
                        sale: sale.clone(),
                        bank_id,
                        entry,
                    });
                }
                None => {
                    if candidates.is_empty() {
                        tracing::debug!(
                            customer = sale.customer(),
                            method = sale.payment_method(),
                            "payment method has no route"
                        );
                    }
                    unmatched_sales.push(UnmatchedSale {
                        sale: sale.clone(),
                        searched_banks: candidates.to_vec(),
                    });
                }
            }
        }

        let unidentified_credits: Vec<StatementEntry> = pools.unconsumed().cloned().collect();

        tracing::info!(
            total_sales = sales.len(),
            matched = matched_sales.len(),
            unmatched = unmatched_sales.len(),
            unidentified = unidentified_credits.len(),
            "reconciliation finished"
        );

        ReconciliationResult::new(
            matched_sales,
            unmatched_sales,
            unidentified_credits,
            sales.len(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn sale(customer: &str, method: &str, amount: &str) -> Sale {
        Sale::new(customer, method, dec(amount)).unwrap()
    }

    fn pools(batches: Vec<(BankId, Vec<(&str, &str)>)>) -> StatementPools {
        StatementPools::aggregate(batches.into_iter().map(|(bank_id, lines)| {
            StatementBatch::new(
                bank_id,
                format!("{bank_id}.csv"),
                lines
                    .into_iter()
                    .map(|(description, amount)| {
                        StatementLine::new(description.to_string(), dec(amount))
                    })
                    .collect(),
            )
        }))
    }

    #[test]
    fn test_single_pix_sale_matches_bb() {
        let engine = ReconciliationEngine::new();
        let sales = vec![sale("Ana", "PIX", "100.00")];
        let mut pools = pools(vec![(BankId::Bb, vec![("PIX RECEBIDO", "100.00")])]);

        let result = engine.reconcile(&sales, &mut pools);

        assert_eq!(result.matched_sales().len(), 1);
        assert_eq!(result.matched_sales()[0].bank_id, BankId::Bb);
        assert_eq!(result.matched_sales()[0].entry.description, "PIX RECEBIDO");
        assert!(result.unmatched_sales().is_empty());
        assert!(result.unidentified_credits().is_empty());
        assert!(pools.get(BankId::Bb).unwrap().is_consumed(0));
    }

    #[test]
    fn test_rerun_is_idempotent() {
        let engine = ReconciliationEngine::new();
        let sales = vec![sale("Ana", "PIX", "100.00")];
        let mut pools = pools(vec![(BankId::Bb, vec![("PIX RECEBIDO", "100.00")])]);

        let first = engine.reconcile(&sales, &mut pools);
        let second = engine.reconcile(&sales, &mut pools);

        assert_eq!(first, second);
        assert_eq!(pools.get(BankId::Bb).unwrap().consumed_count(), 1);
    }

    #[test]
    fn test_duplicate_amounts_first_sale_wins() {
        let engine = ReconciliationEngine::new();
        let sales = vec![
            sale("Primeiro", "DINHEIRO", "50.00"),
            sale("Segundo", "DINHEIRO", "50.00"),
        ];
        let mut pools = pools(vec![(BankId::Caixa, vec![("DEPOSITO", "50.00")])]);

        let result = engine.reconcile(&sales, &mut pools);

        assert_eq!(result.matched_sales().len(), 1);
        assert_eq!(result.matched_sales()[0].sale.customer(), "Primeiro");
        assert_eq!(result.unmatched_sales().len(), 1);
        assert_eq!(result.unmatched_sales()[0].sale.customer(), "Segundo");
        assert_eq!(
            result.unmatched_sales()[0].searched_banks,
            vec![BankId::Caixa]
        );
        assert_eq!(pools.get(BankId::Caixa).unwrap().consumed_count(), 1);
    }

    #[test]
    fn test_unrouted_method_consumes_nothing() {
        let engine = ReconciliationEngine::new();
        let sales = vec![sale("Ana", "BOLETO", "10.00")];
        let mut pools = pools(vec![
            (BankId::Bb, vec![("X", "10.00")]),
            (BankId::Unknown, vec![("Y", "10.00")]),
        ]);

        let result = engine.reconcile(&sales, &mut pools);

        assert_eq!(result.unmatched_sales().len(), 1);
        assert!(result.unmatched_sales()[0].searched_banks.is_empty());
        assert_eq!(result.unidentified_credits().len(), 2);
        assert!(pools.iter().all(|pool| pool.consumed_count() == 0));
    }

    #[test]
    fn test_candidate_banks_searched_in_priority_order() {
        let engine = ReconciliationEngine::new();
        let sales = vec![
            sale("A", "DÉBITO", "30.00"),
            sale("B", "DÉBITO", "30.00"),
            sale("C", "DÉBITO", "30.00"),
        ];
        let mut pools = pools(vec![
            (BankId::Itau, vec![("ITAU 1", "30.00")]),
            (BankId::Pagbank, vec![("PAGBANK 1", "30.00")]),
        ]);

        let result = engine.reconcile(&sales, &mut pools);

        let banks: Vec<BankId> = result.matched_sales().iter().map(|m| m.bank_id).collect();
        assert_eq!(banks, vec![BankId::Pagbank, BankId::Itau]);
        assert_eq!(result.unmatched_sales()[0].sale.customer(), "C");
        assert_eq!(
            result.unmatched_sales()[0].searched_banks,
            vec![BankId::Pagbank, BankId::Itau]
        );
    }

    #[test]
    fn test_missing_pool_is_skipped() {
        let engine = ReconciliationEngine::new();
        let sales = vec![sale("A", "CARTÃO DE CRÉDITO", "80.00")];
        let mut pools = pools(vec![(BankId::Itau, vec![("CARTAO", "80.00")])]);

        let result = engine.reconcile(&sales, &mut pools);

        assert_eq!(result.matched_sales()[0].bank_id, BankId::Itau);
    }

    #[test]
    fn test_tolerance_versus_exact() {
        let sales = vec![sale("A", "PIX", "19.99")];
        let batches = vec![(BankId::Bb, vec![("PIX", "19.995")])];

        let tolerant = ReconciliationEngine::new().reconcile(&sales, &mut pools(batches.clone()));
        assert_eq!(tolerant.matched_sales().len(), 1);

        let exact = ReconciliationEngine::new()
            .amount_match(AmountMatch::Exact)
            .reconcile(&sales, &mut pools(batches));
        assert_eq!(exact.matched_sales().len(), 0);
        assert_eq!(exact.unidentified_credits().len(), 1);
    }

    #[test]
    fn test_amount_one_cent_apart_does_not_match() {
        let engine = ReconciliationEngine::new();
        let sales = vec![sale("A", "PIX", "10.00")];
        let mut pools = pools(vec![(BankId::Bb, vec![("PIX", "10.01")])]);

        let result = engine.reconcile(&sales, &mut pools);

        assert!(result.matched_sales().is_empty());
        assert_eq!(result.unidentified_credits().len(), 1);
    }

    #[test]
    fn test_zero_sale_is_still_classified() {
        let engine = ReconciliationEngine::new();
        let sales = vec![sale("Brinde", "DINHEIRO", "0")];
        let mut pools = pools(vec![(BankId::Caixa, vec![("DEP", "25.00")])]);

        let result = engine.reconcile(&sales, &mut pools);

        assert_eq!(result.total_sales(), 1);
        assert_eq!(result.unmatched_sales().len(), 1);
    }

    #[test]
    fn test_custom_routing() {
        let mut routing = RoutingTable::empty();
        routing.insert("VALE", vec![BankId::Santander]).unwrap();
        let engine = ReconciliationEngine::with_routing(routing);

        let sales = vec![sale("A", "vale", "12.00"), sale("B", "PIX", "12.00")];
        let mut pools = pools(vec![
            (BankId::Santander, vec![("VALE", "12.00")]),
            (BankId::Bb, vec![("PIX", "12.00")]),
        ]);

        let result = engine.reconcile(&sales, &mut pools);

        assert_eq!(result.matched_sales().len(), 1);
        assert_eq!(result.matched_sales()[0].bank_id, BankId::Santander);
        assert_eq!(result.unidentified_credits()[0].bank_id, BankId::Bb);
    }

    #[test]
    fn test_summary_totals() {
        let engine = ReconciliationEngine::new();
        let sales = vec![
            sale("A", "PIX", "100.00"),
            sale("B", "PIX CNPJ", "40.50"),
        ];
        let mut pools = pools(vec![
            (BankId::Bb, vec![("PIX", "100.00"), ("PIX", "7.25")]),
            (BankId::Unknown, vec![("TED", "2.75")]),
        ]);

        let summary = engine.reconcile(&sales, &mut pools).summary();

        assert_eq!(summary.total_sales, 2);
        assert_eq!(summary.matched_count, 1);
        assert_eq!(summary.unmatched_count, 1);
        assert_eq!(summary.unidentified_count, 2);
        assert_eq!(summary.matched_amount, dec("100.00"));
        assert_eq!(summary.unmatched_amount, dec("40.50"));
        assert_eq!(summary.unidentified_amount, dec("10.00"));
        assert!(!summary.is_fully_reconciled);
    }

    #[test]
    fn test_empty_run() {
        let engine = ReconciliationEngine::new();
        let mut pools = StatementPools::new();
        let result = engine.reconcile(&[], &mut pools);
        assert_eq!(result.total_sales(), 0);
        assert!(!result.summary().is_fully_reconciled);
    }
}
