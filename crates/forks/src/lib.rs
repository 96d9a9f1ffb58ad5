#![warn(missing_docs, unreachable_pub)]
#![deny(unused_must_use, rust_2018_idioms)]

//! EIP-2124 fork identifier.
//!
//! Nodes exchange a short digest of their fork history at handshake time: a
//! rolling CRC-32 over the genesis hash and every activated fork block, plus
//! the next fork block they know about. The [`ForkFilter`] decides whether a
//! remote digest is compatible with the local chain configuration.

mod forkid;

pub use forkid::{ForkFilter, ForkHash, ForkId, ValidationError};
