//! Per-sender nonce tracking.

use crate::PoolTransaction;
use std::{collections::BTreeMap, sync::Arc};

/// The pooled transactions of one sender, keyed by nonce.
#[derive(Debug, Default)]
pub(crate) struct TransactionsBySender {
    transactions: BTreeMap<u64, Arc<PoolTransaction>>,
}

impl TransactionsBySender {
    pub(crate) fn get(&self, nonce: u64) -> Option<&Arc<PoolTransaction>> {
        self.transactions.get(&nonce)
    }

    /// Tracks a transaction under its nonce, returning whatever it displaced.
    pub(crate) fn insert(&mut self, transaction: Arc<PoolTransaction>) -> Option<Arc<PoolTransaction>> {
        self.transactions.insert(transaction.transaction.nonce(), transaction)
    }

    pub(crate) fn remove(&mut self, nonce: u64) -> Option<Arc<PoolTransaction>> {
        self.transactions.remove(&nonce)
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.transactions.len()
    }

    /// Transactions in ascending nonce order.
    pub(crate) fn iter_ascending(&self) -> impl Iterator<Item = &Arc<PoolTransaction>> + '_ {
        self.transactions.values()
    }

    /// One past the highest nonce reachable contiguously from the lowest
    /// tracked nonce, `None` when no transactions are tracked.
    pub(crate) fn next_nonce(&self) -> Option<u64> {
        let (&lowest, _) = self.transactions.first_key_value()?;
        let mut next = lowest;
        for &nonce in self.transactions.keys() {
            if nonce == next {
                next += 1;
            } else {
                break
            }
        }
        Some(next)
    }
}
