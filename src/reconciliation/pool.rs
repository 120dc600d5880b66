//! Per-bank pools of statement credits and their consumption bookkeeping

use bigdecimal::BigDecimal;
use serde::Serialize;

use crate::config::AmountMatch;
use crate::types::*;

/// All statement entries aggregated under one bank identifier.
///
/// Membership is fixed once aggregation finishes; only the per-entry
/// consumption flags change while a run is matching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatementPool {
    bank_id: BankId,
    entries: Vec<StatementEntry>,
    consumed: Vec<bool>,
}

impl StatementPool {
    /// Create an empty pool for a bank
    pub fn new(bank_id: BankId) -> Self {
        Self {
            bank_id,
            entries: Vec::new(),
            consumed: Vec::new(),
        }
    }

    fn push(&mut self, entry: StatementEntry) {
        self.entries.push(entry);
        self.consumed.push(false);
    }

    pub fn bank_id(&self) -> BankId {
        self.bank_id
    }

    /// Entries in aggregation order
    pub fn entries(&self) -> &[StatementEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether the entry at `index` has been assigned to a sale this run
    pub fn is_consumed(&self, index: usize) -> bool {
        self.consumed.get(index).copied().unwrap_or(false)
    }

    pub fn consumed_count(&self) -> usize {
        self.consumed.iter().filter(|used| **used).count()
    }

    /// Clear every consumption flag
    pub fn reset(&mut self) {
        self.consumed.fill(false);
    }

    /// Consume the first unconsumed entry whose amount matches, in pool order
    pub fn consume_first(
        &mut self,
        amount: &BigDecimal,
        amount_match: &AmountMatch,
    ) -> Option<&StatementEntry> {
        let index = self
            .entries
            .iter()
            .zip(&self.consumed)
            .position(|(entry, used)| !*used && amount_match.matches(&entry.amount, amount))?;

        self.consumed[index] = true;
        Some(&self.entries[index])
    }

    /// Entries not consumed by any sale
    pub fn unconsumed(&self) -> impl Iterator<Item = &StatementEntry> {
        self.entries
            .iter()
            .zip(&self.consumed)
            .filter(|(_, used)| !**used)
            .map(|(entry, _)| entry)
    }
}

/// Statement pools keyed by bank, in the order banks were first seen
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatementPools {
    pools: Vec<StatementPool>,
}

impl StatementPools {
    /// Create an empty pool set
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge classified statement batches into one pool per bank.
    ///
    /// Lines with a non-positive amount (debits, blanks, unparseable values)
    /// are statement noise and never enter a pool. Batches tagged
    /// [`BankId::Unknown`] are pooled like any other bank.
    pub fn aggregate(batches: impl IntoIterator<Item = StatementBatch>) -> Self {
        let mut pools = Self::new();
        let zero = BigDecimal::from(0);

        for batch in batches {
            let mut excluded = 0usize;
            let mut pooled = 0usize;
            let pool = pools.pool_mut(batch.bank_id);

            for line in batch.lines {
                if line.amount <= zero {
                    excluded += 1;
                    continue;
                }
                pool.push(StatementEntry::new(
                    batch.bank_id,
                    line.description,
                    line.amount,
                ));
                pooled += 1;
            }

            tracing::debug!(
                bank = %batch.bank_id,
                source = %batch.source_name,
                pooled,
                excluded,
                "aggregated statement batch"
            );
        }

        pools
    }

    fn pool_mut(&mut self, bank_id: BankId) -> &mut StatementPool {
        match self.pools.iter().position(|pool| pool.bank_id == bank_id) {
            Some(index) => &mut self.pools[index],
            None => {
                self.pools.push(StatementPool::new(bank_id));
                let last = self.pools.len() - 1;
                &mut self.pools[last]
            }
        }
    }

    /// Pool for a bank, if any statement was aggregated for it
    pub fn get(&self, bank_id: BankId) -> Option<&StatementPool> {
        self.pools.iter().find(|pool| pool.bank_id == bank_id)
    }

    pub(crate) fn get_mut(&mut self, bank_id: BankId) -> Option<&mut StatementPool> {
        self.pools.iter_mut().find(|pool| pool.bank_id == bank_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &StatementPool> {
        self.pools.iter()
    }

    /// Banks with a pool, in first-seen order
    pub fn banks(&self) -> Vec<BankId> {
        self.pools.iter().map(StatementPool::bank_id).collect()
    }

    /// Total entries across every pool
    pub fn total_entries(&self) -> usize {
        self.pools.iter().map(StatementPool::len).sum()
    }

    /// Reset all consumption state before a run starts matching
    pub fn begin_run(&mut self) {
        for pool in &mut self.pools {
            pool.reset();
        }
    }

    /// Every unconsumed entry across all pools, pool by pool
    pub fn unconsumed(&self) -> impl Iterator<Item = &StatementEntry> {
        self.pools.iter().flat_map(StatementPool::unconsumed)
    }
}
