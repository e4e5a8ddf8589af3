//! Error types for the entity store.
//!
//! Every store operation that can fail returns a [`StoreError`]. Lookups that
//! simply find nothing return `Option` instead; an error means the caller
//! asked for something the store refuses to do.

use thiserror::Error;

use crate::model::TransactionStatus;

/// Errors returned by [`crate::store::EntityStore`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// No collectible with this ordinal id exists.
    #[error("collectible not found: {0}")]
    CollectibleNotFound(String),

    /// The collectible was minted before this request reached the store.
    #[error("collectible already minted: {0}")]
    AlreadyMinted(String),

    /// A collectible with this ordinal id is already in the store.
    #[error("duplicate collectible: {0}")]
    DuplicateCollectible(String),

    /// Mint fees are positive amounts in the smallest currency unit.
    #[error("mint fee must be positive for collectible {0}")]
    InvalidMintFee(String),

    /// No transaction with this id exists.
    #[error("transaction not found: {0}")]
    TransactionNotFound(String),

    /// A transaction with this id is already in the store.
    #[error("duplicate transaction: {0}")]
    DuplicateTransaction(String),

    /// The requested status change would move the transaction backwards or
    /// leave it where it is.
    #[error("invalid status transition for {tx_id}: {from} -> {to}")]
    InvalidTransition {
        /// Transaction being updated.
        tx_id: String,
        /// Status currently stored.
        from: TransactionStatus,
        /// Status that was requested.
        to: TransactionStatus,
    },
}
