//! Transaction pool errors.

use corvid_primitives::{ChainId, TxHash};

/// Transaction pool result type.
pub type PoolResult<T> = Result<T, PoolError>;

/// An error attributed to a specific transaction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("[{hash:?}] {kind}")]
pub struct PoolError {
    /// Hash of the offending transaction.
    pub hash: TxHash,
    /// What was wrong with it.
    pub kind: InvalidTransactionError,
}

impl PoolError {
    /// Creates a new pool error.
    pub const fn new(hash: TxHash, kind: InvalidTransactionError) -> Self {
        Self { hash, kind }
    }
}

/// Rejections produced while validating a transaction for admission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum InvalidTransactionError {
    /// The transaction is bound to a different chain than this node.
    #[error("chain id {tx} does not match the node chain id {node}")]
    ChainIdMismatch {
        /// Chain id carried by the transaction.
        tx: ChainId,
        /// Chain id the node is configured with.
        node: ChainId,
    },
    /// The priority fee bid exceeds the overall fee cap.
    #[error("max priority fee per gas exceeds max fee per gas")]
    TipAboveFeeCap,
    /// The static cost of the transaction alone exceeds its gas limit.
    #[error("intrinsic gas cost {intrinsic} exceeds the gas limit {gas_limit}")]
    IntrinsicGasExceedsGasLimit {
        /// Gas consumed before any execution happens.
        intrinsic: u128,
        /// The limit declared by the transaction.
        gas_limit: u64,
    },
    /// Sender recovery failed, or the signature is malleable (high s).
    #[error("signature recovery failed or the signature is malleable")]
    InvalidSignature,
    /// The sender account has already executed this nonce.
    #[error("nonce {tx} is lower than the account nonce {state}")]
    NonceTooLow {
        /// Nonce carried by the transaction.
        tx: u64,
        /// Current nonce of the sender account.
        state: u64,
    },
}

/// Outcome of offering a transaction to the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionAddedStatus {
    /// The transaction is now pending.
    Added,
    /// A transaction with the same hash is already pooled; nothing changed.
    AlreadyKnown,
    /// A transaction with the same sender and nonce is already pooled and
    /// the newcomer did not pay the required fee bump; nothing changed.
    ReplacementUnderpriced,
}

impl TransactionAddedStatus {
    /// True if the transaction entered the pool.
    pub const fn is_added(&self) -> bool {
        matches!(self, TransactionAddedStatus::Added)
    }
}
