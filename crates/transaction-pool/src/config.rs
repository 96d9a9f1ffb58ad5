use std::time::Duration;

/// Default cap on the number of transactions kept in the pool.
pub const DEFAULT_MAX_PENDING_TRANSACTIONS: usize = 4096;

/// Default capacity of the recently-announced-hash queue.
pub const DEFAULT_MAX_ANNOUNCED_HASHES: usize = 4096;

/// Default number of hours a transaction may sit in the pool before the
/// maintenance task drops it.
pub const DEFAULT_RETENTION_HOURS: u64 = 13;

/// Default minimum fee increase, in percent, required to replace a pending
/// transaction of the same sender and nonce.
pub const DEFAULT_PRICE_BUMP_PERCENT: u8 = 10;

/// Configuration options for the transaction pool.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Maximum number of transactions held at once; the lowest-priority
    /// entry is evicted when an admission exceeds this.
    pub max_pending_transactions: usize,
    /// Capacity of the bounded queue of recently announced hashes.
    pub max_announced_hashes: usize,
    /// How long a transaction may remain pooled before aging out.
    pub retention_period: Duration,
    /// Fee bump, in percent, a replacement must pay over the transaction it
    /// displaces.
    pub price_bump_percent: u8,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_pending_transactions: DEFAULT_MAX_PENDING_TRANSACTIONS,
            max_announced_hashes: DEFAULT_MAX_ANNOUNCED_HASHES,
            retention_period: Duration::from_secs(DEFAULT_RETENTION_HOURS * 60 * 60),
            price_bump_percent: DEFAULT_PRICE_BUMP_PERCENT,
        }
    }
}
