#![warn(missing_docs, unreachable_pub)]
#![deny(unused_must_use, rust_2018_idioms)]

//! The corvid transaction pool.
//!
//! Holds the current set of pending transactions with the ability to iterate
//! them based on priority for block production or to look them up by hash,
//! and is safe for use across multiple threads.
//!
//! Incoming transactions are validated (chain binding, fee invariants,
//! intrinsic gas, signature recovery) before admission. Admitted
//! transactions are tracked per sender and nonce, so a newcomer for an
//! occupied `(sender, nonce)` slot either replaces the incumbent by paying
//! the configured fee bump or is rejected. When the pool exceeds its
//! capacity the entry currently paying the block producer the least is
//! dropped, with locally submitted transactions always outranking remote
//! ones.
//!
//! Prioritization is split across two ordered ranges. Fee-market
//! transactions whose priority bid is unclipped by their fee cap at the
//! current base fee live in the *static* range ordered by that bid;
//! everything else lives in the *dynamic* range ordered by fee cap (gas
//! price, for fixed-price transactions). A base-fee change only migrates
//! entries between the ranges; the in-range order never depends on the base
//! fee. Selection merges the two ranges by effective priority fee while
//! offering each sender's transactions in ascending nonce order.
//!
//! # Locking
//!
//! One writer-preferring reader/writer lock guards the structural state; all
//! mutating operations hold it for their whole critical section and read
//! operations take the read side. Listener callbacks are *never* invoked
//! under that lock: notifications are collected during the critical section
//! and fired after it is released, so a listener may freely re-enter the
//! pool. The recently-announced-hash queue has its own mutex.

mod announced;
mod config;
pub mod error;
mod listener;
pub mod maintain;
mod ordering;
mod pending;
mod sender;
#[cfg(test)]
mod test_utils;
mod traits;
mod validate;

use crate::{announced::AnnouncedHashes, listener::Subscribers, pending::PendingTransactions};
use corvid_primitives::{Address, Header, TransactionSigned, TxHash};
use parking_lot::{Mutex, RwLock};
use std::{fmt, sync::Arc, time::SystemTime};
use tracing::debug;

pub use config::{
    PoolConfig, DEFAULT_MAX_ANNOUNCED_HASHES, DEFAULT_MAX_PENDING_TRANSACTIONS,
    DEFAULT_PRICE_BUMP_PERCENT, DEFAULT_RETENTION_HOURS,
};
pub use error::{InvalidTransactionError, PoolError, PoolResult, TransactionAddedStatus};
pub use listener::ListenerId;
pub use ordering::{effective_priority_fee_per_gas, is_in_static_range};
pub use pending::TransactionSelectionResult;
pub use traits::{AccountNonceProvider, ChainHeadSource, Clock, NoAccountNonces, SystemClock};
pub use validate::{intrinsic_gas, TransactionValidator};

/// One pooled transaction together with the metadata that drives
/// prioritization and aging.
#[derive(Debug)]
pub struct PoolTransaction {
    /// The signed transaction.
    pub transaction: TransactionSigned,
    /// The recovered sender.
    pub sender: Address,
    /// True if submitted through the local API rather than received from a
    /// peer; local transactions are preferred in ordering and never evicted
    /// ahead of remote ones.
    pub local: bool,
    /// When the pool admitted this transaction.
    pub added_at: SystemTime,
    /// Insertion sequence, the ordering tie breaker.
    pub(crate) sequence: u64,
}

impl PoolTransaction {
    /// The canonical transaction hash.
    pub fn hash(&self) -> TxHash {
        self.transaction.hash()
    }
}

type PoolListener = Box<dyn Fn(&Arc<PoolTransaction>) + Send + Sync>;

/// The shared, thread-safe transaction pool.
pub struct TransactionPool {
    /// Structural state behind the single reader/writer lock.
    pool: RwLock<PendingTransactions>,
    /// Recently announced hashes, bounded FIFO with its own lock.
    announced: Mutex<AnnouncedHashes>,
    /// Listeners fired for every admitted transaction.
    added_listeners: Subscribers<PoolListener>,
    /// Listeners fired for every transaction dropped other than by block
    /// inclusion.
    dropped_listeners: Subscribers<PoolListener>,
    validator: TransactionValidator,
    clock: Arc<dyn Clock>,
    config: PoolConfig,
}

impl TransactionPool {
    /// Creates a pool positioned at the given chain head.
    pub fn new(
        config: PoolConfig,
        validator: TransactionValidator,
        chain_head: &dyn ChainHeadSource,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let base_fee = chain_head.chain_head().base_fee_per_gas.unwrap_or_default();
        Self {
            pool: RwLock::new(PendingTransactions::new(
                base_fee,
                config.max_pending_transactions,
                config.price_bump_percent,
            )),
            announced: Mutex::new(AnnouncedHashes::with_capacity(config.max_announced_hashes)),
            added_listeners: Subscribers::default(),
            dropped_listeners: Subscribers::default(),
            validator,
            clock,
            config,
        }
    }

    /// Offers a transaction received from a peer.
    pub fn add_remote_transaction(
        &self,
        transaction: TransactionSigned,
    ) -> PoolResult<TransactionAddedStatus> {
        self.add_transaction(transaction, false)
    }

    /// Offers a transaction submitted through the local API. Local
    /// transactions are preferred in ordering and eviction.
    pub fn add_local_transaction(
        &self,
        transaction: TransactionSigned,
    ) -> PoolResult<TransactionAddedStatus> {
        self.add_transaction(transaction, true)
    }

    fn add_transaction(
        &self,
        transaction: TransactionSigned,
        local: bool,
    ) -> PoolResult<TransactionAddedStatus> {
        let hash = transaction.hash();
        let sender =
            self.validator.validate(&transaction).map_err(|kind| PoolError::new(hash, kind))?;
        let added_at = self.clock.now();

        let (outcome, admitted) = {
            let mut pool = self.pool.write();
            if pool.contains(&hash) {
                return Ok(TransactionAddedStatus::AlreadyKnown)
            }
            let sequence = pool.next_sequence();
            let entry =
                Arc::new(PoolTransaction { transaction, sender, local, added_at, sequence });
            (pool.add_transaction(entry.clone()), entry)
        };

        if outcome.status.is_added() {
            // the body is pooled now, no need to keep announcing the hash
            self.announced.lock().remove(&hash);
            debug!(target: "txpool", ?hash, local, "transaction added");
            self.notify_added(&admitted);
            for dropped in &outcome.dropped {
                self.notify_dropped(dropped);
            }
        }
        Ok(outcome.status)
    }

    /// Removes a transaction and notifies dropped-listeners.
    pub fn remove_transaction(&self, hash: &TxHash) -> Option<Arc<PoolTransaction>> {
        let removed = self.pool.write().remove_transaction(hash);
        if let Some(transaction) = &removed {
            self.notify_dropped(transaction);
        }
        removed
    }

    /// Removes a transaction because it was included in a block. No dropped
    /// notification is fired.
    pub fn transaction_added_to_block(&self, hash: &TxHash) -> Option<Arc<PoolTransaction>> {
        self.pool.write().remove_transaction(hash)
    }

    /// Iterates transactions in priority order for block production,
    /// offering each sender's transactions in ascending nonce order. Drops
    /// requested by the selector are applied after the iteration and
    /// announced to dropped-listeners.
    pub fn select_transactions(
        &self,
        mut selector: impl FnMut(&TransactionSigned) -> TransactionSelectionResult,
    ) {
        let dropped = self.pool.write().select_transactions(&mut selector);
        for transaction in &dropped {
            self.notify_dropped(transaction);
        }
    }

    /// Re-partitions the prioritized ranges for a new base fee. A no-op if
    /// the value is unchanged.
    pub fn update_base_fee(&self, base_fee: u64) {
        self.pool.write().update_base_fee(base_fee);
    }

    /// Applies the fee consequences of a new chain head.
    pub fn on_new_head(&self, header: &Header) {
        self.update_base_fee(header.base_fee_per_gas.unwrap_or_default());
    }

    /// The base fee the pool currently prioritizes against.
    pub fn base_fee(&self) -> u64 {
        self.pool.read().base_fee()
    }

    /// Drops every transaction older than the configured retention period
    /// and returns the dropped entries; dropped-listeners are notified.
    pub fn evict_old_transactions(&self) -> Vec<Arc<PoolTransaction>> {
        let cutoff = self
            .clock
            .now()
            .checked_sub(self.config.retention_period)
            .unwrap_or(SystemTime::UNIX_EPOCH);
        let dropped = self.pool.write().evict_old_transactions(cutoff);
        for transaction in &dropped {
            self.notify_dropped(transaction);
        }
        dropped
    }

    /// True if a transaction with this hash is pooled.
    pub fn contains(&self, hash: &TxHash) -> bool {
        self.pool.read().contains(hash)
    }

    /// Looks up a pooled transaction by hash.
    pub fn get(&self, hash: &TxHash) -> Option<Arc<PoolTransaction>> {
        self.pool.read().get(hash)
    }

    /// Number of pooled transactions.
    pub fn len(&self) -> usize {
        self.pool.read().len()
    }

    /// True if nothing is pooled.
    pub fn is_empty(&self) -> bool {
        self.pool.read().is_empty()
    }

    /// The configured capacity.
    pub fn max_size(&self) -> usize {
        self.config.max_pending_transactions
    }

    /// One past the highest contiguously pooled nonce of the sender, `None`
    /// when nothing of theirs is pooled.
    pub fn next_nonce(&self, sender: &Address) -> Option<u64> {
        self.pool.read().next_nonce(sender)
    }

    /// All pooled entries, in no particular order.
    pub fn all_transactions(&self) -> Vec<Arc<PoolTransaction>> {
        self.pool.read().all()
    }

    /// All locally submitted entries, e.g. for re-broadcast after restart.
    pub fn local_transactions(&self) -> Vec<Arc<PoolTransaction>> {
        self.pool.read().all().into_iter().filter(|transaction| transaction.local).collect()
    }

    /// Records an announced transaction hash. Returns false when the hash is
    /// already tracked or its body is already pooled, i.e. when announcing
    /// it again would be noise.
    pub fn add_announced_hash(&self, hash: TxHash) -> bool {
        if self.pool.read().contains(&hash) {
            return false
        }
        self.announced.lock().insert(hash)
    }

    /// The currently tracked announced hashes, oldest first.
    pub fn announced_hashes(&self) -> Vec<TxHash> {
        self.announced.lock().snapshot()
    }

    /// Registers a listener invoked (outside the structural lock) for every
    /// admitted transaction.
    pub fn subscribe_added(
        &self,
        listener: impl Fn(&Arc<PoolTransaction>) + Send + Sync + 'static,
    ) -> ListenerId {
        self.added_listeners.subscribe(Box::new(listener))
    }

    /// Removes an added-listener.
    pub fn unsubscribe_added(&self, id: ListenerId) -> bool {
        self.added_listeners.unsubscribe(id)
    }

    /// Registers a listener invoked (outside the structural lock) for every
    /// dropped transaction; block inclusion does not count as a drop.
    pub fn subscribe_dropped(
        &self,
        listener: impl Fn(&Arc<PoolTransaction>) + Send + Sync + 'static,
    ) -> ListenerId {
        self.dropped_listeners.subscribe(Box::new(listener))
    }

    /// Removes a dropped-listener.
    pub fn unsubscribe_dropped(&self, id: ListenerId) -> bool {
        self.dropped_listeners.unsubscribe(id)
    }

    fn notify_added(&self, transaction: &Arc<PoolTransaction>) {
        self.added_listeners.for_each(|listener| listener(transaction));
    }

    fn notify_dropped(&self, transaction: &Arc<PoolTransaction>) {
        self.dropped_listeners.for_each(|listener| listener(transaction));
    }
}

impl fmt::Debug for TransactionPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransactionPool")
            .field("len", &self.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
