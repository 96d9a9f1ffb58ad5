//! Builders for hand-assembled pool entries used across the unit tests.
//!
//! These bypass signature recovery: the sender is set directly and a fixed
//! dummy signature is attached. The transfer value doubles as a sender tag
//! so entries from different senders never collide on the canonical hash.

use crate::{traits::Clock, PoolTransaction};
use corvid_primitives::{
    sign_message, Address, ChainId, Signature, Transaction, TransactionKind, TransactionSigned,
    TxFeeMarket, TxLegacy, B256, U256,
};
use parking_lot::Mutex;
use std::{
    sync::Arc,
    time::{Duration, SystemTime},
};

pub(crate) fn dummy_signature() -> Signature {
    Signature { r: U256::from(1u64), s: U256::from(1u64), odd_y_parity: false }
}

pub(crate) fn signed_legacy(sender_tag: u8, nonce: u64, gas_price: u128) -> TransactionSigned {
    TransactionSigned::from_transaction_and_signature(
        Transaction::Legacy(TxLegacy {
            chain_id: None,
            nonce,
            gas_price,
            gas_limit: 21000,
            to: TransactionKind::Call(Address([0x42; 20])),
            value: U256::from(sender_tag),
            input: Default::default(),
        }),
        dummy_signature(),
    )
}

pub(crate) fn signed_fee_market(
    sender_tag: u8,
    nonce: u64,
    max_priority: u128,
    max_fee: u128,
) -> TransactionSigned {
    TransactionSigned::from_transaction_and_signature(
        Transaction::FeeMarket(TxFeeMarket {
            chain_id: 1,
            nonce,
            max_priority_fee_per_gas: max_priority,
            max_fee_per_gas: max_fee,
            gas_limit: 21000,
            to: TransactionKind::Call(Address([0x42; 20])),
            value: U256::from(sender_tag),
            input: Default::default(),
            access_list: Default::default(),
        }),
        dummy_signature(),
    )
}

pub(crate) fn entry(
    transaction: TransactionSigned,
    sender_tag: u8,
    local: bool,
    sequence: u64,
) -> Arc<PoolTransaction> {
    entry_at(transaction, sender_tag, local, sequence, SystemTime::UNIX_EPOCH)
}

pub(crate) fn entry_at(
    transaction: TransactionSigned,
    sender_tag: u8,
    local: bool,
    sequence: u64,
    added_at: SystemTime,
) -> Arc<PoolTransaction> {
    Arc::new(PoolTransaction {
        transaction,
        sender: Address([sender_tag; 20]),
        local,
        added_at,
        sequence,
    })
}

pub(crate) fn pool_transaction(
    sender_tag: u8,
    nonce: u64,
    gas_price: u128,
    local: bool,
    sequence: u64,
) -> Arc<PoolTransaction> {
    entry(signed_legacy(sender_tag, nonce, gas_price), sender_tag, local, sequence)
}

pub(crate) fn fee_market_pool_transaction(
    sender_tag: u8,
    nonce: u64,
    max_priority: u128,
    max_fee: u128,
    local: bool,
    sequence: u64,
) -> Arc<PoolTransaction> {
    entry(signed_fee_market(sender_tag, nonce, max_priority, max_fee), sender_tag, local, sequence)
}

pub(crate) fn seconds(n: u64) -> Duration {
    Duration::from_secs(n)
}

/// A legacy transaction carrying a real signature from the key
/// `[key_byte; 32]`, so it survives the validator's sender recovery.
pub(crate) fn properly_signed_legacy(
    key_byte: u8,
    nonce: u64,
    gas_price: u128,
    chain_id: Option<ChainId>,
) -> TransactionSigned {
    let transaction = Transaction::Legacy(TxLegacy {
        chain_id,
        nonce,
        gas_price,
        gas_limit: 21000,
        to: TransactionKind::Call(Address([0x42; 20])),
        value: U256::from(1u64),
        input: Default::default(),
    });
    let signature =
        sign_message(B256([key_byte; 32]), transaction.signature_hash()).expect("valid key");
    TransactionSigned::from_transaction_and_signature(transaction, signature)
}

/// A fee-market transaction carrying a real signature from the key
/// `[key_byte; 32]`.
pub(crate) fn properly_signed_fee_market(
    key_byte: u8,
    nonce: u64,
    max_priority: u128,
    max_fee: u128,
    chain_id: ChainId,
) -> TransactionSigned {
    let transaction = Transaction::FeeMarket(TxFeeMarket {
        chain_id,
        nonce,
        max_priority_fee_per_gas: max_priority,
        max_fee_per_gas: max_fee,
        gas_limit: 21000,
        to: TransactionKind::Call(Address([0x42; 20])),
        value: U256::from(1u64),
        input: Default::default(),
        access_list: Default::default(),
    });
    let signature =
        sign_message(B256([key_byte; 32]), transaction.signature_hash()).expect("valid key");
    TransactionSigned::from_transaction_and_signature(transaction, signature)
}

/// A [`Clock`] the tests can move by hand.
pub(crate) struct MockClock(Mutex<SystemTime>);

impl MockClock {
    /// Starts well past the epoch so retention cutoffs never underflow.
    pub(crate) fn new() -> Self {
        Self(Mutex::new(SystemTime::UNIX_EPOCH + Duration::from_secs(1_000_000_000)))
    }

    pub(crate) fn advance(&self, by: Duration) {
        *self.0.lock() += by;
    }
}

impl Clock for MockClock {
    fn now(&self) -> SystemTime {
        *self.0.lock()
    }
}
