//! Bounded FIFO of recently announced transaction hashes.

use corvid_primitives::TxHash;
use std::collections::{HashSet, VecDeque};

/// Remembers which transaction hashes were recently announced so outbound
/// announcements can be throttled. Oldest entries fall out when the capacity
/// is exceeded; a hash is dropped early once the full transaction body is
/// admitted.
#[derive(Debug)]
pub(crate) struct AnnouncedHashes {
    capacity: usize,
    order: VecDeque<TxHash>,
    known: HashSet<TxHash>,
}

impl AnnouncedHashes {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self { capacity, order: VecDeque::new(), known: HashSet::new() }
    }

    /// Records a hash. Returns false if it is already tracked.
    pub(crate) fn insert(&mut self, hash: TxHash) -> bool {
        if !self.known.insert(hash) {
            return false
        }
        self.order.push_back(hash);
        while self.order.len() > self.capacity {
            if let Some(evicted) = self.order.pop_front() {
                self.known.remove(&evicted);
            }
        }
        true
    }

    /// Stops tracking a hash, usually because its transaction arrived.
    pub(crate) fn remove(&mut self, hash: &TxHash) {
        if self.known.remove(hash) {
            self.order.retain(|known| known != hash);
        }
    }

    pub(crate) fn contains(&self, hash: &TxHash) -> bool {
        self.known.contains(hash)
    }

    /// The currently tracked hashes, oldest first.
    pub(crate) fn snapshot(&self) -> Vec<TxHash> {
        self.order.iter().copied().collect()
    }
}
