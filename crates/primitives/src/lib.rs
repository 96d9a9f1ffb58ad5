#![warn(missing_docs, unreachable_pub)]
#![deny(unused_must_use, rust_2018_idioms)]

//! Commonly used types for the corvid node: fixed-width byte strings,
//! keccak-256, the block header, and the signed transaction model with its
//! wire codec.

mod bits;
mod bytes;
mod header;
pub mod transaction;

pub use crate::bytes::Bytes;
pub use bits::{Address, Bloom, B256};
pub use header::Header;
pub use transaction::{
    util::{public_key_to_address, sign_message},
    AccessList, AccessListItem, Signature, Transaction, TransactionKind, TransactionSigned,
    TxAccessList, TxFeeMarket, TxLegacy, TxType,
};

/// 256-bit unsigned integer used for balances and transfer values.
pub use ruint::aliases::U256;

/// A transaction hash is the keccak-256 of its canonical envelope encoding.
pub type TxHash = B256;

/// A block hash.
pub type BlockHash = B256;

/// A block number.
pub type BlockNumber = u64;

/// An EIP-155 chain id.
pub type ChainId = u64;

/// Computes the keccak-256 hash of the input.
pub fn keccak256(data: impl AsRef<[u8]>) -> B256 {
    use tiny_keccak::{Hasher, Keccak};

    let mut hasher = Keccak::v256();
    hasher.update(data.as_ref());
    let mut output = [0u8; 32];
    hasher.finalize(&mut output);
    B256(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn keccak256_empty_input() {
        // well known constant, keccak256 of the empty string
        assert_eq!(
            keccak256([0u8; 0]),
            B256(hex!("c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"))
        );
    }
}
