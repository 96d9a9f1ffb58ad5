//! Priority keys for the two prioritized ranges.
//!
//! Both ranges order by `(local, fee key, sequence)`, each descending for
//! iteration from the best entry. The fee key never depends on the current
//! base fee: the static range keys on the priority fee bid, the dynamic
//! range keys on the fee cap (the gas price for fixed-price transactions),
//! which orders identically to the effective priority fee because the base
//! fee is uniform across one range.

use crate::PoolTransaction;
use corvid_primitives::Transaction;
use std::{cmp::Ordering, sync::Arc};

/// The fee a block producer earns per gas from this transaction at the given
/// base fee. Negative when the base fee exceeds what the transaction pays.
pub fn effective_priority_fee_per_gas(transaction: &Transaction, base_fee: u64) -> i128 {
    let cap_minus_base = saturating_i128(transaction.max_fee_per_gas()) - base_fee as i128;
    match transaction.max_priority_fee_per_gas() {
        Some(priority_fee) => saturating_i128(priority_fee).min(cap_minus_base),
        None => cap_minus_base,
    }
}

/// True if the transaction belongs to the static range at the given base
/// fee: its priority fee bid is not clipped by the fee cap. Fixed-price
/// transactions never qualify.
pub fn is_in_static_range(transaction: &Transaction, base_fee: u64) -> bool {
    match transaction.max_priority_fee_per_gas() {
        Some(priority_fee) => {
            effective_priority_fee_per_gas(transaction, base_fee) >= saturating_i128(priority_fee)
        }
        None => false,
    }
}

fn saturating_i128(value: u128) -> i128 {
    i128::try_from(value).unwrap_or(i128::MAX)
}

/// An element of one of the prioritized ranges.
///
/// Ordering is worst-first so that the range's first element is the eviction
/// candidate and reverse iteration yields the selection order.
#[derive(Debug, Clone)]
pub(crate) struct PrioritizedTransaction {
    pub(crate) local: bool,
    pub(crate) key: u128,
    pub(crate) sequence: u64,
    pub(crate) transaction: Arc<PoolTransaction>,
}

impl PrioritizedTransaction {
    /// Builds the range element for `transaction` at the given base fee,
    /// returning whether it belongs to the static range.
    pub(crate) fn new(transaction: Arc<PoolTransaction>, base_fee: u64) -> (bool, Self) {
        let in_static_range = is_in_static_range(&transaction.transaction, base_fee);
        let key = if in_static_range {
            transaction
                .transaction
                .max_priority_fee_per_gas()
                .expect("only fee market transactions enter the static range")
        } else {
            transaction.transaction.max_fee_per_gas()
        };
        let this = Self {
            local: transaction.local,
            key,
            sequence: transaction.sequence,
            transaction,
        };
        (in_static_range, this)
    }
}

impl PartialEq for PrioritizedTransaction {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for PrioritizedTransaction {}

impl PartialOrd for PrioritizedTransaction {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PrioritizedTransaction {
    fn cmp(&self, other: &Self) -> Ordering {
        // each component ascending; the unique sequence keeps distinct
        // transactions from comparing equal, so sets never merge them
        self.local
            .cmp(&other.local)
            .then_with(|| self.key.cmp(&other.key))
            .then_with(|| self.sequence.cmp(&other.sequence))
    }
}
