//! Stateless admission checks.

use crate::{
    error::InvalidTransactionError,
    traits::{AccountNonceProvider, NoAccountNonces},
};
use corvid_primitives::{Address, ChainId, Transaction, TransactionSigned};
use std::sync::Arc;

/// Base cost of any transaction.
const TX_BASE_GAS: u128 = 21_000;
/// Additional base cost of a contract creation.
const TX_CREATE_GAS: u128 = 32_000;
/// Cost per zero byte of payload.
const TX_DATA_ZERO_GAS: u128 = 4;
/// Cost per non-zero byte of payload.
const TX_DATA_NON_ZERO_GAS: u128 = 16;
/// Cost per access-list address.
const ACCESS_LIST_ADDRESS_GAS: u128 = 2_400;
/// Cost per access-list storage key.
const ACCESS_LIST_STORAGE_KEY_GAS: u128 = 1_900;

/// Gas charged before any execution happens: the base cost plus payload and
/// access-list costs.
pub fn intrinsic_gas(transaction: &Transaction) -> u128 {
    let mut gas = if transaction.kind().is_create() {
        TX_BASE_GAS + TX_CREATE_GAS
    } else {
        TX_BASE_GAS
    };

    let input = transaction.input();
    let zero_bytes = input.iter().filter(|byte| **byte == 0).count() as u128;
    let non_zero_bytes = input.len() as u128 - zero_bytes;
    gas += zero_bytes * TX_DATA_ZERO_GAS + non_zero_bytes * TX_DATA_NON_ZERO_GAS;

    if let Some(access_list) = transaction.access_list() {
        gas += access_list.0.len() as u128 * ACCESS_LIST_ADDRESS_GAS;
        gas += access_list.storage_key_count() as u128 * ACCESS_LIST_STORAGE_KEY_GAS;
    }

    gas
}

/// Validates transactions for admission: chain binding, fee invariants,
/// signature validity and, when an [`AccountNonceProvider`] is wired in, the
/// account nonce floor.
pub struct TransactionValidator {
    chain_id: ChainId,
    account_nonces: Arc<dyn AccountNonceProvider>,
}

impl TransactionValidator {
    /// Creates a validator for the given chain, with the nonce check
    /// disabled.
    pub fn new(chain_id: ChainId) -> Self {
        Self { chain_id, account_nonces: Arc::new(NoAccountNonces) }
    }

    /// Enables the nonce-too-low rejection backed by `provider`.
    pub fn with_account_nonces(mut self, provider: Arc<dyn AccountNonceProvider>) -> Self {
        self.account_nonces = provider;
        self
    }

    /// The chain id this validator admits transactions for.
    pub const fn chain_id(&self) -> ChainId {
        self.chain_id
    }

    /// Runs all checks and returns the recovered sender.
    pub fn validate(
        &self,
        transaction: &TransactionSigned,
    ) -> Result<Address, InvalidTransactionError> {
        if let Some(tx_chain_id) = transaction.chain_id() {
            if tx_chain_id != self.chain_id {
                return Err(InvalidTransactionError::ChainIdMismatch {
                    tx: tx_chain_id,
                    node: self.chain_id,
                })
            }
        }

        if let Some(priority_fee) = transaction.max_priority_fee_per_gas() {
            if priority_fee > transaction.max_fee_per_gas() {
                return Err(InvalidTransactionError::TipAboveFeeCap)
            }
        }

        let intrinsic = intrinsic_gas(transaction);
        if intrinsic > transaction.gas_limit() as u128 {
            return Err(InvalidTransactionError::IntrinsicGasExceedsGasLimit {
                intrinsic,
                gas_limit: transaction.gas_limit(),
            })
        }

        let sender =
            transaction.recover_signer().ok_or(InvalidTransactionError::InvalidSignature)?;

        if let Some(account_nonce) = self.account_nonces.account_nonce(&sender) {
            if transaction.nonce() < account_nonce {
                return Err(InvalidTransactionError::NonceTooLow {
                    tx: transaction.nonce(),
                    state: account_nonce,
                })
            }
        }

        Ok(sender)
    }
}
