//! Interfaces of the collaborators the pool consumes.

use corvid_primitives::{Address, Header};
use std::time::SystemTime;

/// A source of timestamps for admission times and aging.
///
/// Injected so tests can move time instead of sleeping.
pub trait Clock: Send + Sync + 'static {
    /// The current time.
    fn now(&self) -> SystemTime;
}

/// The wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// Provides the block header at the current chain head.
pub trait ChainHeadSource: Send + Sync {
    /// The header of the current head block.
    fn chain_head(&self) -> Header;
}

impl ChainHeadSource for Header {
    fn chain_head(&self) -> Header {
        self.clone()
    }
}

/// Looks up the current account nonce of a sender.
///
/// The pool itself does not model world state; wiring this in enables the
/// nonce-too-low rejection for senders the embedder can resolve.
pub trait AccountNonceProvider: Send + Sync {
    /// The next nonce the sender account would execute, if known.
    fn account_nonce(&self, sender: &Address) -> Option<u64>;
}

/// An [`AccountNonceProvider`] that knows nothing, disabling the nonce check.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAccountNonces;

impl AccountNonceProvider for NoAccountNonces {
    fn account_nonce(&self, _sender: &Address) -> Option<u64> {
        None
    }
}
