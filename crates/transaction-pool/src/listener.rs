//! Listener registry for pool events.

use fnv::FnvHashMap;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identifies one subscription; returned on subscribe, consumed on
/// unsubscribe.
pub type ListenerId = u64;

/// An id-keyed set of callbacks.
///
/// Subscription management takes the write side of a lightweight lock;
/// notification takes the read side, so concurrent notifiers do not block
/// each other. Callbacks are always invoked outside the pool's structural
/// lock, see the crate level docs.
pub(crate) struct Subscribers<F> {
    next_id: AtomicU64,
    listeners: RwLock<FnvHashMap<ListenerId, F>>,
}

impl<F> Default for Subscribers<F> {
    fn default() -> Self {
        Self { next_id: AtomicU64::new(0), listeners: RwLock::new(FnvHashMap::default()) }
    }
}

impl<F> Subscribers<F> {
    /// Registers a listener and returns its id.
    pub(crate) fn subscribe(&self, listener: F) -> ListenerId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.listeners.write().insert(id, listener);
        id
    }

    /// Removes the listener with the given id, returning whether it existed.
    pub(crate) fn unsubscribe(&self, id: ListenerId) -> bool {
        self.listeners.write().remove(&id).is_some()
    }

    /// Invokes `apply` for every registered listener.
    pub(crate) fn for_each(&self, mut apply: impl FnMut(&F)) {
        for listener in self.listeners.read().values() {
            apply(listener);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn subscribe_notify_unsubscribe() {
        let subscribers: Subscribers<Box<dyn Fn() + Send + Sync>> = Default::default();
        static CALLS: AtomicUsize = AtomicUsize::new(0);

        let id = subscribers.subscribe(Box::new(|| {
            CALLS.fetch_add(1, Ordering::SeqCst);
        }));
        subscribers.for_each(|listener| listener());
        assert_eq!(CALLS.load(Ordering::SeqCst), 1);

        assert!(subscribers.unsubscribe(id));
        assert!(!subscribers.unsubscribe(id));
        subscribers.for_each(|listener| listener());
        assert_eq!(CALLS.load(Ordering::SeqCst), 1);
    }
}
