// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # ordmint Core Library
//!
//! Everything the storefront server needs that is not HTTP: the in-memory
//! entity store, mint-candidate allocation, and the transaction simulator
//! that walks a mint from `pending` to `completed`.
//!
//! Nothing here touches a real chain. Transactions are records in a map and
//! "confirmation" is two timers. That is the whole point: the storefront can
//! be developed and demoed end to end without a wallet or a node.
//!
//! ## Architecture
//!
//! - **config** — Constants: delays, paging defaults, tx-id format.
//! - **model** — Collectibles, transactions, and the status lifecycle.
//! - **store** — The entity store. Single source of truth for the process.
//! - **allocation** — Random selection of an unminted collectible.
//! - **txid** — `tx_<millis>_<base36>` identifier generation.
//! - **simulator** — Cancellable timed status advancement.
//! - **ownership** — Seam for the external ownership check.
//! - **catalog** — Collection statistics and pagination.
//! - **seed** — The fixed seed catalog loaded at startup.
//! - **error** — Store error type.
//!
//! ## Invariants
//!
//! 1. A collectible is minted at most once. The check and the flip happen
//!    under one write lock together with the transaction insert.
//! 2. Transaction status only moves forward.
//! 3. Candidate selection does not reserve anything.

pub mod allocation;
pub mod catalog;
pub mod config;
pub mod error;
pub mod model;
pub mod ownership;
pub mod seed;
pub mod simulator;
pub mod store;
pub mod txid;

pub use error::StoreError;
pub use model::{
    Collectible, CollectibleMetadata, NewCollectible, NewTransaction, Transaction,
    TransactionStatus,
};
pub use simulator::TransactionSimulator;
pub use store::EntityStore;
