//! # Entity Store
//!
//! The single source of truth for collectibles and transactions. Everything
//! lives in process memory and dies with the process.
//!
//! ## Design
//!
//! - Collectibles sit behind a `parking_lot::RwLock`. Reads (listing,
//!   candidate selection, stats) vastly outnumber writes, and the write lock
//!   doubles as the mint critical section.
//! - Transactions live in a `DashMap` keyed by tx id. Status polling from the
//!   client is the hot path and should never wait on a mint.
//! - Lock order is always collectibles, then a transaction shard. Nothing
//!   takes them the other way round.

use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;

use crate::error::StoreError;
use crate::model::{Collectible, NewCollectible, NewTransaction, Transaction, TransactionStatus};
use crate::seed;

// ---------------------------------------------------------------------------
// CollectibleTable
// ---------------------------------------------------------------------------

/// Collectibles keyed by ordinal id, plus the next serial to hand out.
#[derive(Default)]
struct CollectibleTable {
    by_ordinal_id: HashMap<String, Collectible>,
    next_serial: u64,
}

// ---------------------------------------------------------------------------
// EntityStore
// ---------------------------------------------------------------------------

/// In-memory store shared by request handlers and the simulator.
///
/// Share it as `Arc<EntityStore>`; every method takes `&self`.
#[derive(Default)]
pub struct EntityStore {
    collectibles: RwLock<CollectibleTable>,
    transactions: DashMap<String, Transaction>,
}

impl fmt::Debug for EntityStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityStore")
            .field("collectibles", &self.collectible_count())
            .field("transactions", &self.transaction_count())
            .finish()
    }
}

impl EntityStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store loaded with the seed catalog.
    pub fn seeded() -> Self {
        let store = Self::new();
        for item in seed::catalog() {
            if let Err(e) = store.insert_collectible(item) {
                tracing::warn!(error = %e, "skipping seed collectible");
            }
        }
        tracing::info!(count = store.collectible_count(), "seed catalog loaded");
        store
    }

    // -- Collectibles ------------------------------------------------------

    /// Insert a new, unminted collectible and assign it the next serial id.
    pub fn insert_collectible(&self, item: NewCollectible) -> Result<Collectible, StoreError> {
        if item.mint_fee == 0 {
            return Err(StoreError::InvalidMintFee(item.ordinal_id));
        }

        let mut table = self.collectibles.write();
        if table.by_ordinal_id.contains_key(&item.ordinal_id) {
            return Err(StoreError::DuplicateCollectible(item.ordinal_id));
        }

        table.next_serial += 1;
        let collectible = Collectible {
            id: table.next_serial,
            ordinal_id: item.ordinal_id,
            collection_name: item.collection_name,
            image_url: item.image_url,
            metadata: item.metadata,
            mint_fee: item.mint_fee,
            is_minted: false,
        };
        table
            .by_ordinal_id
            .insert(collectible.ordinal_id.clone(), collectible.clone());
        Ok(collectible)
    }

    /// Look up a collectible by ordinal id.
    pub fn get(&self, ordinal_id: &str) -> Option<Collectible> {
        self.collectibles.read().by_ordinal_id.get(ordinal_id).cloned()
    }

    /// All collectibles of a collection, in insertion order.
    ///
    /// An unknown collection and an empty one look the same: an empty vec.
    pub fn list_by_collection(&self, collection_name: &str) -> Vec<Collectible> {
        let table = self.collectibles.read();
        let mut items: Vec<Collectible> = table
            .by_ordinal_id
            .values()
            .filter(|c| c.collection_name == collection_name)
            .cloned()
            .collect();
        drop(table);
        items.sort_by_key(|c| c.id);
        items
    }

    /// Set the minted flag. The flag never goes back to `false`, so calling
    /// this on an already-minted collectible just returns it.
    pub fn set_minted(&self, ordinal_id: &str) -> Option<Collectible> {
        let mut table = self.collectibles.write();
        let collectible = table.by_ordinal_id.get_mut(ordinal_id)?;
        collectible.is_minted = true;
        Some(collectible.clone())
    }

    /// Number of collectibles across all collections.
    pub fn collectible_count(&self) -> usize {
        self.collectibles.read().by_ordinal_id.len()
    }

    // -- Minting -----------------------------------------------------------

    /// Mint a collectible: check it is unminted, record a `pending`
    /// transaction, and flip the minted flag, all under the collectibles
    /// write lock.
    ///
    /// Two racing requests for the same collectible cannot both get past the
    /// check; the loser sees [`StoreError::AlreadyMinted`].
    pub fn mint(
        &self,
        ordinal_id: &str,
        wallet_address: &str,
        tx_id: &str,
    ) -> Result<(Collectible, Transaction), StoreError> {
        let mut table = self.collectibles.write();
        let collectible = table
            .by_ordinal_id
            .get_mut(ordinal_id)
            .ok_or_else(|| StoreError::CollectibleNotFound(ordinal_id.to_string()))?;

        if collectible.is_minted {
            return Err(StoreError::AlreadyMinted(ordinal_id.to_string()));
        }

        let transaction =
            self.create_transaction(NewTransaction::pending(tx_id, wallet_address, ordinal_id))?;
        collectible.is_minted = true;

        tracing::info!(
            ordinal_id,
            tx_id,
            wallet = wallet_address,
            "collectible minted"
        );
        Ok((collectible.clone(), transaction))
    }

    // -- Transactions ------------------------------------------------------

    /// Record a new transaction. Both timestamps are set to now.
    pub fn create_transaction(&self, new_tx: NewTransaction) -> Result<Transaction, StoreError> {
        match self.transactions.entry(new_tx.tx_id.clone()) {
            Entry::Occupied(_) => Err(StoreError::DuplicateTransaction(new_tx.tx_id)),
            Entry::Vacant(slot) => {
                let now = Utc::now();
                let transaction = Transaction {
                    tx_id: new_tx.tx_id,
                    wallet_address: new_tx.wallet_address,
                    ordinal_id: new_tx.ordinal_id,
                    status: new_tx.status,
                    created_at: now,
                    updated_at: now,
                };
                slot.insert(transaction.clone());
                Ok(transaction)
            }
        }
    }

    /// Look up a transaction by id.
    pub fn get_transaction(&self, tx_id: &str) -> Option<Transaction> {
        self.transactions.get(tx_id).map(|entry| entry.value().clone())
    }

    /// Move a transaction to `status` and bump `updated_at`.
    ///
    /// Only forward steps are accepted (see
    /// [`TransactionStatus::can_transition_to`]). A missing transaction is
    /// [`StoreError::TransactionNotFound`].
    pub fn update_transaction_status(
        &self,
        tx_id: &str,
        status: TransactionStatus,
    ) -> Result<Transaction, StoreError> {
        let mut entry = self
            .transactions
            .get_mut(tx_id)
            .ok_or_else(|| StoreError::TransactionNotFound(tx_id.to_string()))?;

        let current = entry.status;
        if !current.can_transition_to(status) {
            return Err(StoreError::InvalidTransition {
                tx_id: tx_id.to_string(),
                from: current,
                to: status,
            });
        }

        let updated = Transaction {
            status,
            updated_at: Utc::now(),
            ..entry.value().clone()
        };
        *entry = updated.clone();

        tracing::debug!(tx_id, from = %current, to = %status, "transaction status updated");
        Ok(updated)
    }

    /// All transactions for a wallet, oldest first.
    pub fn transactions_by_wallet(&self, wallet_address: &str) -> Vec<Transaction> {
        let mut txs: Vec<Transaction> = self
            .transactions
            .iter()
            .filter(|entry| entry.wallet_address == wallet_address)
            .map(|entry| entry.value().clone())
            .collect();
        txs.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.tx_id.cmp(&b.tx_id))
        });
        txs
    }

    /// Number of transactions recorded.
    pub fn transaction_count(&self) -> usize {
        self.transactions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CollectibleMetadata;
    use std::sync::Arc;

    fn new_item(ordinal_id: &str, collection: &str) -> NewCollectible {
        NewCollectible {
            ordinal_id: ordinal_id.into(),
            collection_name: collection.into(),
            image_url: format!("https://img/{ordinal_id}"),
            metadata: CollectibleMetadata::new(ordinal_id, [("kind", "test")]),
            mint_fee: 500,
        }
    }

    #[test]
    fn seeded_store_has_pixel_foxes() {
        let store = EntityStore::seeded();
        let foxes = store.list_by_collection("Pixel Foxes");
        assert_eq!(foxes.len(), 5);
        assert!(foxes.iter().all(|c| !c.is_minted));
        // Insertion order survives the HashMap.
        let ids: Vec<_> = foxes.iter().map(|c| c.ordinal_id.as_str()).collect();
        assert_eq!(
            ids,
            [
                "ord1:pixel-fox-1",
                "ord1:pixel-fox-2",
                "ord1:pixel-fox-3",
                "ord1:pixel-fox-4",
                "ord1:pixel-fox-5"
            ]
        );
    }

    #[test]
    fn get_and_list_unknown_return_nothing() {
        let store = EntityStore::seeded();
        assert!(store.get("ord1:nope").is_none());
        assert!(store.list_by_collection("Unknown").is_empty());
    }

    #[test]
    fn insert_rejects_duplicates_and_zero_fee() {
        let store = EntityStore::new();
        let first = store.insert_collectible(new_item("a", "C")).unwrap();
        assert_eq!(first.id, 1);
        assert!(!first.is_minted);

        assert_eq!(
            store.insert_collectible(new_item("a", "C")),
            Err(StoreError::DuplicateCollectible("a".into()))
        );

        let mut free = new_item("b", "C");
        free.mint_fee = 0;
        assert_eq!(
            store.insert_collectible(free),
            Err(StoreError::InvalidMintFee("b".into()))
        );
        assert_eq!(store.collectible_count(), 1);
    }

    #[test]
    fn set_minted_is_one_way() {
        let store = EntityStore::seeded();
        let c = store.set_minted("ord1:pixel-fox-2").unwrap();
        assert!(c.is_minted);
        // Second call is harmless.
        assert!(store.set_minted("ord1:pixel-fox-2").unwrap().is_minted);
        assert!(store.set_minted("ord1:nope").is_none());
    }

    #[test]
    fn mint_creates_pending_transaction_and_flips_flag() {
        let store = EntityStore::seeded();
        let (c, tx) = store.mint("ord1:pixel-fox-1", "1Wallet", "tx_1_abc").unwrap();

        assert!(c.is_minted);
        assert!(store.get("ord1:pixel-fox-1").unwrap().is_minted);
        assert_eq!(tx.status, TransactionStatus::Pending);
        assert_eq!(tx.ordinal_id, "ord1:pixel-fox-1");
        assert_eq!(tx.created_at, tx.updated_at);
        assert_eq!(store.get_transaction("tx_1_abc"), Some(tx));
    }

    #[test]
    fn mint_rejects_already_minted_and_unknown() {
        let store = EntityStore::seeded();
        store.mint("ord1:pixel-fox-1", "w", "tx_1").unwrap();

        assert_eq!(
            store.mint("ord1:pixel-fox-1", "w", "tx_2").unwrap_err(),
            StoreError::AlreadyMinted("ord1:pixel-fox-1".into())
        );
        assert_eq!(
            store.mint("ord1:nope", "w", "tx_3").unwrap_err(),
            StoreError::CollectibleNotFound("ord1:nope".into())
        );
        // Rejected mints leave no transaction behind.
        assert_eq!(store.transaction_count(), 1);
    }

    #[test]
    fn mint_with_duplicate_tx_id_leaves_collectible_unminted() {
        let store = EntityStore::seeded();
        store.mint("ord1:pixel-fox-1", "w", "tx_same").unwrap();
        assert_eq!(
            store.mint("ord1:pixel-fox-2", "w", "tx_same").unwrap_err(),
            StoreError::DuplicateTransaction("tx_same".into())
        );
        assert!(!store.get("ord1:pixel-fox-2").unwrap().is_minted);
    }

    #[test]
    fn concurrent_mints_have_exactly_one_winner() {
        let store = Arc::new(EntityStore::seeded());
        let handles: Vec<_> = (0..16)
            .map(|i| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    store
                        .mint("ord1:pixel-fox-3", "w", &format!("tx_race_{i}"))
                        .is_ok()
                })
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(winners, 1);
        assert_eq!(store.transaction_count(), 1);
    }

    #[test]
    fn status_moves_forward_only() {
        let store = EntityStore::new();
        store
            .create_transaction(NewTransaction::pending("tx", "w", "o"))
            .unwrap();

        let tx = store
            .update_transaction_status("tx", TransactionStatus::Processing)
            .unwrap();
        assert_eq!(tx.status, TransactionStatus::Processing);
        assert!(tx.updated_at >= tx.created_at);

        store
            .update_transaction_status("tx", TransactionStatus::Completed)
            .unwrap();

        let err = store
            .update_transaction_status("tx", TransactionStatus::Pending)
            .unwrap_err();
        assert_eq!(
            err,
            StoreError::InvalidTransition {
                tx_id: "tx".into(),
                from: TransactionStatus::Completed,
                to: TransactionStatus::Pending,
            }
        );
        assert_eq!(
            store.get_transaction("tx").unwrap().status,
            TransactionStatus::Completed
        );
    }

    #[test]
    fn update_missing_transaction_is_not_found() {
        let store = EntityStore::new();
        assert_eq!(
            store
                .update_transaction_status("tx_missing", TransactionStatus::Processing)
                .unwrap_err(),
            StoreError::TransactionNotFound("tx_missing".into())
        );
    }

    #[test]
    fn pending_can_fail() {
        let store = EntityStore::new();
        store
            .create_transaction(NewTransaction::pending("tx", "w", "o"))
            .unwrap();
        let tx = store
            .update_transaction_status("tx", TransactionStatus::Failed)
            .unwrap();
        assert_eq!(tx.status, TransactionStatus::Failed);
    }

    #[test]
    fn duplicate_transaction_id_rejected() {
        let store = EntityStore::new();
        store
            .create_transaction(NewTransaction::pending("tx", "w", "o"))
            .unwrap();
        assert_eq!(
            store
                .create_transaction(NewTransaction::pending("tx", "w2", "o2"))
                .unwrap_err(),
            StoreError::DuplicateTransaction("tx".into())
        );
        assert_eq!(store.get_transaction("tx").unwrap().wallet_address, "w");
    }

    #[test]
    fn transactions_by_wallet_filters() {
        let store = EntityStore::seeded();
        store.mint("ord1:pixel-fox-1", "alice", "tx_a1").unwrap();
        store.mint("ord1:pixel-fox-2", "bob", "tx_b1").unwrap();
        store.mint("ord1:pixel-fox-3", "alice", "tx_a2").unwrap();

        let alice: Vec<_> = store
            .transactions_by_wallet("alice")
            .into_iter()
            .map(|t| t.ordinal_id)
            .collect();
        assert_eq!(alice.len(), 2);
        assert!(alice.contains(&"ord1:pixel-fox-1".to_string()));
        assert!(alice.contains(&"ord1:pixel-fox-3".to_string()));
        assert!(store.transactions_by_wallet("carol").is_empty());
    }
}
