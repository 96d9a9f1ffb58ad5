//! The structural state of the pool.
//!
//! [`PendingTransactions`] is single-threaded; the outer
//! [`TransactionPool`](crate::TransactionPool) wraps it in the structural
//! lock and fires listener notifications from the outcomes returned here.
//!
//! Every pooled transaction is tracked three ways at once: by hash, by
//! `(sender, nonce)`, and in exactly one of the two prioritized ranges. A
//! fee-market transaction whose priority bid is not clipped by its fee cap
//! at the current base fee sits in the static range, everything else in the
//! dynamic range. Base-fee changes move entries between the ranges but never
//! reorder within one, because the range keys do not depend on the base fee.

use crate::{
    error::TransactionAddedStatus,
    ordering::{effective_priority_fee_per_gas, is_in_static_range, PrioritizedTransaction},
    sender::TransactionsBySender,
    PoolTransaction,
};
use corvid_primitives::{Address, TransactionSigned, TxHash};
use std::{
    cmp::Ordering,
    collections::{BTreeSet, HashMap, VecDeque},
    sync::Arc,
    time::SystemTime,
};
use tracing::trace;

/// Verdict returned by the block producer for each offered transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionSelectionResult {
    /// Keep the transaction pooled and keep iterating.
    Continue,
    /// Remove the transaction from the pool and keep iterating. Removals are
    /// applied after the iteration finishes.
    DropAndContinue,
    /// End the iteration; pending removals are still applied.
    Stop,
}

/// What happened when a transaction was offered to the structural state.
#[derive(Debug)]
pub(crate) struct AddOutcome {
    pub(crate) status: TransactionAddedStatus,
    /// Entries that left the pool as a side effect: a replaced same-nonce
    /// transaction and/or a capacity eviction victim.
    pub(crate) dropped: Vec<Arc<PoolTransaction>>,
}

/// The current set of pending transactions with the ability to iterate them
/// in priority order for block production or to look them up by hash.
pub(crate) struct PendingTransactions {
    /// All pooled transactions by hash.
    by_hash: HashMap<TxHash, Arc<PoolTransaction>>,
    /// All pooled transactions grouped by sender and nonce.
    by_sender: HashMap<Address, TransactionsBySender>,
    /// Fee-market transactions currently paying their full priority bid,
    /// keyed on that bid.
    static_range: BTreeSet<PrioritizedTransaction>,
    /// Everything else, keyed on the fee cap.
    dynamic_range: BTreeSet<PrioritizedTransaction>,
    /// Base fee at the current chain head; zero before the fee market
    /// activates.
    base_fee: u64,
    /// Monotonic insertion counter used as the ordering tie breaker.
    sequence: u64,
    max_pending_transactions: usize,
    price_bump_percent: u8,
}

impl PendingTransactions {
    pub(crate) fn new(
        base_fee: u64,
        max_pending_transactions: usize,
        price_bump_percent: u8,
    ) -> Self {
        Self {
            by_hash: HashMap::new(),
            by_sender: HashMap::new(),
            static_range: BTreeSet::new(),
            dynamic_range: BTreeSet::new(),
            base_fee,
            sequence: 0,
            max_pending_transactions,
            price_bump_percent,
        }
    }

    /// Assigns the next insertion sequence number.
    pub(crate) fn next_sequence(&mut self) -> u64 {
        let sequence = self.sequence;
        self.sequence = self.sequence.wrapping_add(1);
        sequence
    }

    pub(crate) const fn base_fee(&self) -> u64 {
        self.base_fee
    }

    pub(crate) fn len(&self) -> usize {
        self.by_hash.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.by_hash.is_empty()
    }

    pub(crate) fn contains(&self, hash: &TxHash) -> bool {
        self.by_hash.contains_key(hash)
    }

    pub(crate) fn get(&self, hash: &TxHash) -> Option<Arc<PoolTransaction>> {
        self.by_hash.get(hash).cloned()
    }

    /// All pooled entries, in no particular order.
    pub(crate) fn all(&self) -> Vec<Arc<PoolTransaction>> {
        self.by_hash.values().cloned().collect()
    }

    pub(crate) fn next_nonce(&self, sender: &Address) -> Option<u64> {
        self.by_sender.get(sender).and_then(TransactionsBySender::next_nonce)
    }

    /// Admits a transaction, replacing a same-sender-same-nonce entry when
    /// the newcomer pays the configured fee bump, and evicting the lowest
    /// priority entry when the pool would exceed its cap.
    pub(crate) fn add_transaction(&mut self, transaction: Arc<PoolTransaction>) -> AddOutcome {
        let hash = transaction.transaction.hash();
        if self.by_hash.contains_key(&hash) {
            return AddOutcome { status: TransactionAddedStatus::AlreadyKnown, dropped: vec![] }
        }

        let mut dropped = Vec::new();

        // same sender and nonce never coexist: replace or reject
        if let Some(existing) = self
            .by_sender
            .get(&transaction.sender)
            .and_then(|sender| sender.get(transaction.transaction.nonce()))
            .cloned()
        {
            if !self.meets_price_bump(&existing.transaction, &transaction.transaction) {
                trace!(target: "txpool", ?hash, "rejected underpriced replacement");
                return AddOutcome {
                    status: TransactionAddedStatus::ReplacementUnderpriced,
                    dropped,
                }
            }
            self.remove_transaction(&existing.transaction.hash())
                .expect("the replaced transaction is pooled");
            dropped.push(existing);
        }

        let (in_static_range, prioritized) =
            PrioritizedTransaction::new(transaction.clone(), self.base_fee);
        if in_static_range {
            self.static_range.insert(prioritized);
        } else {
            self.dynamic_range.insert(prioritized);
        }
        self.by_sender.entry(transaction.sender).or_default().insert(transaction.clone());
        self.by_hash.insert(hash, transaction);

        // capacity pressure: drop the lowest-priority entry, which may well
        // be the transaction that was just admitted
        if self.by_hash.len() > self.max_pending_transactions {
            let victim = self.eviction_candidate().expect("the pool is not empty");
            self.remove_transaction(&victim.transaction.hash())
                .expect("the eviction candidate is pooled");
            trace!(
                target: "txpool",
                hash = ?victim.transaction.hash(),
                "evicted transaction over capacity",
            );
            dropped.push(victim);
        }

        AddOutcome { status: TransactionAddedStatus::Added, dropped }
    }

    /// Removes a transaction from all three indices.
    pub(crate) fn remove_transaction(&mut self, hash: &TxHash) -> Option<Arc<PoolTransaction>> {
        let transaction = self.by_hash.remove(hash)?;

        let (in_static_range, prioritized) =
            PrioritizedTransaction::new(transaction.clone(), self.base_fee);
        let removed = if in_static_range {
            self.static_range.remove(&prioritized)
        } else {
            self.dynamic_range.remove(&prioritized)
        };
        // a transaction tracked by hash but absent from its range means the
        // ordering state is corrupt and nothing further can be trusted
        assert!(removed, "transaction {hash:?} was missing from its prioritized range");

        let nonce = transaction.transaction.nonce();
        if let Some(sender) = self.by_sender.get_mut(&transaction.sender) {
            sender.remove(nonce);
            if sender.is_empty() {
                self.by_sender.remove(&transaction.sender);
            }
        }
        Some(transaction)
    }

    /// Re-partitions the ranges for a changed base fee. A no-op when the
    /// value is unchanged.
    pub(crate) fn update_base_fee(&mut self, new_base_fee: u64) {
        if new_base_fee == self.base_fee {
            return
        }
        let increased = new_base_fee > self.base_fee;
        self.base_fee = new_base_fee;

        if increased {
            // entries whose bids the new base fee clips move out
            let moving = self
                .static_range
                .iter()
                .filter(|entry| !is_in_static_range(&entry.transaction.transaction, new_base_fee))
                .cloned()
                .collect::<Vec<_>>();
            for entry in moving {
                self.static_range.remove(&entry);
                let (in_static_range, rekeyed) =
                    PrioritizedTransaction::new(entry.transaction, new_base_fee);
                debug_assert!(!in_static_range);
                self.dynamic_range.insert(rekeyed);
            }
        } else {
            // entries whose bids fit under the lower base fee move back
            let moving = self
                .dynamic_range
                .iter()
                .filter(|entry| is_in_static_range(&entry.transaction.transaction, new_base_fee))
                .cloned()
                .collect::<Vec<_>>();
            for entry in moving {
                self.dynamic_range.remove(&entry);
                let (in_static_range, rekeyed) =
                    PrioritizedTransaction::new(entry.transaction, new_base_fee);
                debug_assert!(in_static_range);
                self.static_range.insert(rekeyed);
            }
        }
        trace!(target: "txpool", base_fee = new_base_fee, "re-partitioned prioritized ranges");
    }

    /// Offers transactions to `selector` in priority order, grouped so each
    /// sender's transactions are seen in ascending nonce order. Requested
    /// drops are applied after the iteration and returned.
    pub(crate) fn select_transactions(
        &mut self,
        selector: &mut dyn FnMut(&TransactionSigned) -> TransactionSelectionResult,
    ) -> Vec<Arc<PoolTransaction>> {
        let mut to_remove = Vec::new();

        {
            let mut account_orders: HashMap<Address, AccountTransactionOrder> = HashMap::new();
            let mut static_iter = self.static_range.iter().rev().peekable();
            let mut dynamic_iter = self.dynamic_range.iter().rev().peekable();

            'selection: loop {
                let pick_dynamic = match (static_iter.peek(), dynamic_iter.peek()) {
                    (None, None) => break,
                    (Some(_), None) => false,
                    (None, Some(_)) => true,
                    (Some(static_head), Some(dynamic_head)) => {
                        let static_fee = effective_priority_fee_per_gas(
                            &static_head.transaction.transaction,
                            self.base_fee,
                        );
                        let dynamic_fee = effective_priority_fee_per_gas(
                            &dynamic_head.transaction.transaction,
                            self.base_fee,
                        );
                        match dynamic_fee.cmp(&static_fee) {
                            Ordering::Greater => true,
                            Ordering::Less => false,
                            Ordering::Equal => match dynamic_head.local.cmp(&static_head.local) {
                                Ordering::Greater => true,
                                Ordering::Less => false,
                                Ordering::Equal => dynamic_head.sequence < static_head.sequence,
                            },
                        }
                    }
                };
                let best = if pick_dynamic {
                    dynamic_iter.next().expect("peeked")
                } else {
                    static_iter.next().expect("peeked")
                };

                let sender = best.transaction.sender;
                let order = account_orders.entry(sender).or_insert_with(|| {
                    AccountTransactionOrder::new(
                        self.by_sender.get(&sender).expect("pooled sender"),
                    )
                });
                for transaction in order.transactions_to_process(best.transaction.transaction.nonce())
                {
                    match selector(&transaction.transaction) {
                        TransactionSelectionResult::Continue => {}
                        TransactionSelectionResult::DropAndContinue => {
                            to_remove.push(transaction.transaction.hash());
                        }
                        TransactionSelectionResult::Stop => break 'selection,
                    }
                }
            }
        }

        to_remove.into_iter().filter_map(|hash| self.remove_transaction(&hash)).collect()
    }

    /// Drops every entry admitted before `cutoff` and returns them.
    pub(crate) fn evict_old_transactions(
        &mut self,
        cutoff: SystemTime,
    ) -> Vec<Arc<PoolTransaction>> {
        let stale = self
            .by_hash
            .values()
            .filter(|transaction| transaction.added_at < cutoff)
            .map(|transaction| transaction.transaction.hash())
            .collect::<Vec<_>>();
        stale.into_iter().filter_map(|hash| self.remove_transaction(&hash)).collect()
    }

    /// The entry to drop under capacity pressure: the tail of whichever
    /// range currently pays the producer less, never a local transaction
    /// while a remote one remains.
    fn eviction_candidate(&self) -> Option<Arc<PoolTransaction>> {
        let static_tail = self.static_range.iter().next();
        let dynamic_tail = self.dynamic_range.iter().next();
        let candidate = match (static_tail, dynamic_tail) {
            (None, None) => return None,
            (Some(tail), None) => tail,
            (None, Some(tail)) => tail,
            (Some(static_tail), Some(dynamic_tail)) => {
                if static_tail.local != dynamic_tail.local {
                    if static_tail.local {
                        dynamic_tail
                    } else {
                        static_tail
                    }
                } else {
                    let static_fee = effective_priority_fee_per_gas(
                        &static_tail.transaction.transaction,
                        self.base_fee,
                    );
                    let dynamic_fee = effective_priority_fee_per_gas(
                        &dynamic_tail.transaction.transaction,
                        self.base_fee,
                    );
                    if dynamic_fee > static_fee {
                        static_tail
                    } else {
                        dynamic_tail
                    }
                }
            }
        };
        Some(candidate.transaction.clone())
    }

    /// True if `replacement` pays at least the configured bump over
    /// `existing` on every fee axis. Fixed-price transactions participate
    /// with their gas price standing in for both fee-market fields.
    fn meets_price_bump(
        &self,
        existing: &TransactionSigned,
        replacement: &TransactionSigned,
    ) -> bool {
        let bump = self.price_bump_percent as u128;
        let bumped = |fee: u128| fee.saturating_mul(100 + bump) / 100;

        let fee_floor = |transaction: &TransactionSigned| match transaction
            .max_priority_fee_per_gas()
        {
            Some(priority_fee) => (priority_fee, transaction.max_fee_per_gas()),
            None => (transaction.max_fee_per_gas(), transaction.max_fee_per_gas()),
        };

        let (existing_priority, existing_cap) = fee_floor(existing);
        let (replacement_priority, replacement_cap) = fee_floor(replacement);
        replacement_priority >= bumped(existing_priority) && replacement_cap >= bumped(existing_cap)
    }

    /// Checks the cross-index invariants; test builds only.
    #[cfg(test)]
    pub(crate) fn assert_invariants(&self) {
        assert_eq!(
            self.by_hash.len(),
            self.static_range.len() + self.dynamic_range.len(),
            "every pooled transaction is in exactly one range",
        );
        let tracked_by_sender: usize =
            self.by_sender.values().map(TransactionsBySender::len).sum();
        assert_eq!(self.by_hash.len(), tracked_by_sender, "sender tracking is complete");
        assert!(
            self.by_hash.len() <= self.max_pending_transactions,
            "the pool respects its capacity",
        );
        for entry in &self.static_range {
            assert!(
                is_in_static_range(&entry.transaction.transaction, self.base_fee),
                "static range only holds unclipped fee market transactions",
            );
        }
        for entry in &self.dynamic_range {
            assert!(
                !is_in_static_range(&entry.transaction.transaction, self.base_fee),
                "dynamic range holds no unclipped fee market transactions",
            );
        }
    }
}

/// Hands out one sender's transactions in ascending nonce order, regardless
/// of the order the priority iteration reaches them.
struct AccountTransactionOrder {
    queue: VecDeque<Arc<PoolTransaction>>,
}

impl AccountTransactionOrder {
    fn new(sender: &TransactionsBySender) -> Self {
        Self { queue: sender.iter_ascending().cloned().collect() }
    }

    /// All of the sender's not-yet-processed transactions up to and
    /// including `nonce`.
    fn transactions_to_process(&mut self, nonce: u64) -> Vec<Arc<PoolTransaction>> {
        let mut batch = Vec::new();
        while let Some(front) = self.queue.front() {
            if front.transaction.nonce() <= nonce {
                batch.push(self.queue.pop_front().expect("front exists"));
            } else {
                break
            }
        }
        batch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    fn pool() -> PendingTransactions {
        PendingTransactions::new(0, 128, 10)
    }

    /// Runs a full selection and returns the offered transactions in order.
    fn selection_order(pool: &mut PendingTransactions) -> Vec<TxHash> {
        let mut order = Vec::new();
        pool.select_transactions(&mut |transaction| {
            order.push(transaction.hash());
            TransactionSelectionResult::Continue
        });
        order
    }

    #[test]
    fn duplicate_hash_is_already_known() {
        let mut pool = pool();
        let tx = pool_transaction(0xaa, 0, 100, false, 0);
        assert_eq!(pool.add_transaction(tx.clone()).status, TransactionAddedStatus::Added);
        let outcome = pool.add_transaction(tx);
        assert_eq!(outcome.status, TransactionAddedStatus::AlreadyKnown);
        assert!(outcome.dropped.is_empty());
        assert_eq!(pool.len(), 1);
        pool.assert_invariants();
    }

    #[test]
    fn replacement_requires_the_price_bump() {
        let mut pool = pool();
        let original = pool_transaction(0xaa, 0, 100, false, 0);
        pool.add_transaction(original.clone());

        // 9% bump is not enough
        let underpriced = pool_transaction(0xaa, 0, 109, false, 1);
        let outcome = pool.add_transaction(underpriced);
        assert_eq!(outcome.status, TransactionAddedStatus::ReplacementUnderpriced);
        assert!(pool.contains(&original.transaction.hash()));

        // exactly 10% is
        let replacement = pool_transaction(0xaa, 0, 110, false, 2);
        let outcome = pool.add_transaction(replacement.clone());
        assert_eq!(outcome.status, TransactionAddedStatus::Added);
        assert_eq!(outcome.dropped.len(), 1);
        assert_eq!(outcome.dropped[0].transaction.hash(), original.transaction.hash());
        assert!(!pool.contains(&original.transaction.hash()));
        assert!(pool.contains(&replacement.transaction.hash()));
        assert_eq!(pool.len(), 1);
        pool.assert_invariants();
    }

    #[test]
    fn fee_market_replacement_needs_both_bumps() {
        let mut pool = pool();
        pool.add_transaction(fee_market_pool_transaction(0xaa, 0, 100, 200, false, 0));

        // cap bumped, priority fee not
        let outcome =
            pool.add_transaction(fee_market_pool_transaction(0xaa, 0, 105, 220, false, 1));
        assert_eq!(outcome.status, TransactionAddedStatus::ReplacementUnderpriced);

        // priority bumped, cap not
        let outcome =
            pool.add_transaction(fee_market_pool_transaction(0xaa, 0, 110, 210, false, 2));
        assert_eq!(outcome.status, TransactionAddedStatus::ReplacementUnderpriced);

        let outcome =
            pool.add_transaction(fee_market_pool_transaction(0xaa, 0, 110, 220, false, 3));
        assert_eq!(outcome.status, TransactionAddedStatus::Added);
        pool.assert_invariants();
    }

    #[test]
    fn cross_type_replacement_synthesizes_the_old_fees() {
        let mut pool = pool();
        pool.add_transaction(pool_transaction(0xaa, 0, 100, false, 0));

        // a fee market replacement must bump both against the old gas price
        let outcome =
            pool.add_transaction(fee_market_pool_transaction(0xaa, 0, 110, 109, false, 1));
        assert_eq!(outcome.status, TransactionAddedStatus::ReplacementUnderpriced);

        let outcome =
            pool.add_transaction(fee_market_pool_transaction(0xaa, 0, 110, 110, false, 2));
        assert_eq!(outcome.status, TransactionAddedStatus::Added);
        pool.assert_invariants();
    }

    #[test]
    fn ordering_shifts_with_the_base_fee() {
        let mut pool = pool();
        let bid_3_cap_5 = fee_market_pool_transaction(0xaa, 0, 3, 5, false, 0);
        let bid_2_cap_10 = fee_market_pool_transaction(0xbb, 0, 2, 10, false, 1);
        let bid_1_cap_20 = fee_market_pool_transaction(0xcc, 0, 1, 20, false, 2);
        for tx in [&bid_3_cap_5, &bid_2_cap_10, &bid_1_cap_20] {
            assert!(pool.add_transaction(tx.clone()).status.is_added());
        }
        pool.assert_invariants();

        // nothing is clipped at base fee zero: order follows the bids
        assert_eq!(
            selection_order(&mut pool),
            vec![
                bid_3_cap_5.transaction.hash(),
                bid_2_cap_10.transaction.hash(),
                bid_1_cap_20.transaction.hash(),
            ],
        );

        // at base fee 6 the 5-cap bid is under water (effective fee -1) and
        // moves to the dynamic range behind everything else
        pool.update_base_fee(6);
        pool.assert_invariants();
        assert_eq!(
            selection_order(&mut pool),
            vec![
                bid_2_cap_10.transaction.hash(),
                bid_1_cap_20.transaction.hash(),
                bid_3_cap_5.transaction.hash(),
            ],
        );

        // dropping the base fee again restores the original order
        pool.update_base_fee(0);
        pool.assert_invariants();
        assert_eq!(
            selection_order(&mut pool),
            vec![
                bid_3_cap_5.transaction.hash(),
                bid_2_cap_10.transaction.hash(),
                bid_1_cap_20.transaction.hash(),
            ],
        );
    }

    #[test]
    fn base_fee_update_is_idempotent() {
        let mut pool = pool();
        pool.add_transaction(fee_market_pool_transaction(0xaa, 0, 3, 5, false, 0));
        pool.update_base_fee(6);
        let order_first = selection_order(&mut pool);
        pool.update_base_fee(6);
        assert_eq!(selection_order(&mut pool), order_first);
        pool.assert_invariants();
    }

    #[test]
    fn capacity_eviction_spares_local_transactions() {
        let mut pool = PendingTransactions::new(0, 2, 10);
        let cheap_remote = pool_transaction(0xaa, 0, 5, false, 0);
        let rich_remote = pool_transaction(0xbb, 0, 10, false, 1);
        let cheapest_local = pool_transaction(0xcc, 0, 1, true, 2);

        pool.add_transaction(cheap_remote.clone());
        pool.add_transaction(rich_remote.clone());
        let outcome = pool.add_transaction(cheapest_local.clone());

        assert!(outcome.status.is_added());
        assert_eq!(outcome.dropped.len(), 1);
        assert_eq!(outcome.dropped[0].transaction.hash(), cheap_remote.transaction.hash());
        assert_eq!(pool.len(), 2);
        assert!(pool.contains(&cheapest_local.transaction.hash()));
        assert!(pool.contains(&rich_remote.transaction.hash()));
        pool.assert_invariants();
    }

    #[test]
    fn capacity_eviction_picks_the_cheaper_range_tail() {
        let mut pool = PendingTransactions::new(0, 2, 10);
        // static range: effective fee 2; dynamic range: effective fee 50
        let weak_static = fee_market_pool_transaction(0xaa, 0, 2, 100, false, 0);
        let strong_dynamic = pool_transaction(0xbb, 0, 50, false, 1);
        pool.add_transaction(weak_static.clone());
        pool.add_transaction(strong_dynamic.clone());

        let newcomer = fee_market_pool_transaction(0xcc, 0, 10, 100, false, 2);
        let outcome = pool.add_transaction(newcomer);
        assert!(outcome.status.is_added());
        assert_eq!(outcome.dropped[0].transaction.hash(), weak_static.transaction.hash());
        pool.assert_invariants();
    }

    #[test]
    fn a_hopeless_newcomer_is_evicted_right_back() {
        let mut pool = PendingTransactions::new(0, 2, 10);
        pool.add_transaction(pool_transaction(0xaa, 0, 50, false, 0));
        pool.add_transaction(pool_transaction(0xbb, 0, 60, false, 1));

        let hopeless = pool_transaction(0xcc, 0, 1, false, 2);
        let outcome = pool.add_transaction(hopeless.clone());
        assert!(outcome.status.is_added());
        assert_eq!(outcome.dropped[0].transaction.hash(), hopeless.transaction.hash());
        assert_eq!(pool.len(), 2);
        assert!(!pool.contains(&hopeless.transaction.hash()));
        pool.assert_invariants();
    }

    #[test]
    fn selection_respects_sender_nonce_order() {
        let mut pool = pool();
        let a0 = pool_transaction(0xaa, 0, 1, false, 0);
        let a1 = pool_transaction(0xaa, 1, 100, false, 1);
        let b0 = pool_transaction(0xbb, 0, 50, false, 2);
        for tx in [&a0, &a1, &b0] {
            pool.add_transaction(tx.clone());
        }

        // a1 has the highest fee, but reaching it first pulls a0 ahead of it
        assert_eq!(
            selection_order(&mut pool),
            vec![a0.transaction.hash(), a1.transaction.hash(), b0.transaction.hash()],
        );
    }

    #[test]
    fn selection_drops_are_applied_after_iteration() {
        let mut pool = pool();
        let a = pool_transaction(0xaa, 0, 100, false, 0);
        let b = pool_transaction(0xbb, 0, 50, false, 1);
        pool.add_transaction(a.clone());
        pool.add_transaction(b.clone());

        let dropped = pool.select_transactions(&mut |transaction| {
            if transaction.hash() == a.transaction.hash() {
                TransactionSelectionResult::DropAndContinue
            } else {
                TransactionSelectionResult::Continue
            }
        });
        assert_eq!(dropped.len(), 1);
        assert_eq!(dropped[0].transaction.hash(), a.transaction.hash());
        assert!(!pool.contains(&a.transaction.hash()));
        assert!(pool.contains(&b.transaction.hash()));
        pool.assert_invariants();
    }

    #[test]
    fn selection_stop_ends_the_iteration() {
        let mut pool = pool();
        pool.add_transaction(pool_transaction(0xaa, 0, 100, false, 0));
        pool.add_transaction(pool_transaction(0xbb, 0, 50, false, 1));

        let mut seen = 0;
        pool.select_transactions(&mut |_| {
            seen += 1;
            TransactionSelectionResult::Stop
        });
        assert_eq!(seen, 1);
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn local_transactions_outrank_remote_ones() {
        let mut pool = pool();
        let rich_remote = pool_transaction(0xaa, 0, 1000, false, 0);
        let modest_local = pool_transaction(0xbb, 0, 1, true, 1);
        pool.add_transaction(rich_remote.clone());
        pool.add_transaction(modest_local.clone());

        assert_eq!(
            selection_order(&mut pool),
            vec![modest_local.transaction.hash(), rich_remote.transaction.hash()],
        );
    }

    #[test]
    fn evict_old_drops_only_stale_entries() {
        use std::time::{Duration, SystemTime};

        let mut pool = pool();
        let epoch = SystemTime::UNIX_EPOCH;
        let stale = entry_at(signed_legacy(0xaa, 0, 100), 0xaa, false, 0, epoch);
        let fresh = entry_at(
            signed_legacy(0xbb, 0, 100),
            0xbb,
            false,
            1,
            epoch + Duration::from_secs(7200),
        );
        pool.add_transaction(stale.clone());
        pool.add_transaction(fresh.clone());

        let dropped = pool.evict_old_transactions(epoch + Duration::from_secs(3600));
        assert_eq!(dropped.len(), 1);
        assert_eq!(dropped[0].transaction.hash(), stale.transaction.hash());
        assert!(pool.contains(&fresh.transaction.hash()));
        pool.assert_invariants();
    }

    #[test]
    fn next_nonce_tracks_the_contiguous_run() {
        let mut pool = pool();
        let sender = Address([0xaa; 20]);
        for (sequence, nonce) in [(0u64, 5u64), (1, 6), (2, 9)] {
            pool.add_transaction(pool_transaction(0xaa, nonce, 100, false, sequence));
        }
        assert_eq!(pool.next_nonce(&sender), Some(7));
        assert_eq!(pool.next_nonce(&Address([0xbb; 20])), None);

        let lowest = pool.by_sender[&sender].get(5).unwrap().transaction.hash();
        pool.remove_transaction(&lowest);
        assert_eq!(pool.next_nonce(&sender), Some(7));
    }
}
