//! Core record types for the storefront.
//!
//! Two records, both memory-resident: a [`Collectible`] that can be minted
//! exactly once, and a [`Transaction`] that tracks a mint through its
//! simulated lifecycle. Wire names are camelCase because the browser client
//! reads these shapes directly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ---------------------------------------------------------------------------
// Collectible
// ---------------------------------------------------------------------------

/// Free-form descriptive data attached to a collectible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectibleMetadata {
    /// Display name, e.g. "Pixel Fox #1".
    pub name: String,
    /// Trait name to trait value. Sorted so serialized output is stable.
    #[serde(default)]
    pub traits: BTreeMap<String, String>,
}

impl CollectibleMetadata {
    /// Metadata with a name and the given `(trait, value)` pairs.
    pub fn new<'a>(
        name: impl Into<String>,
        traits: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Self {
        Self {
            name: name.into(),
            traits: traits
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

/// A mintable collectible.
///
/// `id` is a serial number assigned by the store on insertion and defines
/// listing order within a collection. `is_minted` only ever goes from
/// `false` to `true`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collectible {
    pub id: u64,
    pub ordinal_id: String,
    pub collection_name: String,
    pub image_url: String,
    pub metadata: CollectibleMetadata,
    /// Fee in the smallest currency unit (satoshis).
    pub mint_fee: u64,
    pub is_minted: bool,
}

/// Insert payload for [`crate::store::EntityStore::insert_collectible`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCollectible {
    pub ordinal_id: String,
    pub collection_name: String,
    pub image_url: String,
    pub metadata: CollectibleMetadata,
    pub mint_fee: u64,
}

// ---------------------------------------------------------------------------
// TransactionStatus
// ---------------------------------------------------------------------------

/// Lifecycle state of a mint transaction.
///
/// ```text
/// pending ──► processing ──► completed
///    │
///    └──────► failed
/// ```
///
/// The simulator only ever drives the top row. `Failed` is part of the wire
/// contract but nothing in the normal mint flow produces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    /// Created by a mint request, not yet picked up.
    Pending,
    /// Picked up by the simulator.
    Processing,
    /// Terminal success.
    Completed,
    /// Terminal failure.
    Failed,
}

impl TransactionStatus {
    /// Lowercase wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Whether no further transition is possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Whether `self -> next` is a legal forward step.
    pub fn can_transition_to(&self, next: TransactionStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Processing)
                | (Self::Processing, Self::Completed)
                | (Self::Pending, Self::Failed)
        )
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Transaction
// ---------------------------------------------------------------------------

/// A simulated mint transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub tx_id: String,
    pub wallet_address: String,
    /// The collectible this transaction minted.
    pub ordinal_id: String,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload for [`crate::store::EntityStore::create_transaction`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    pub tx_id: String,
    pub wallet_address: String,
    pub ordinal_id: String,
    pub status: TransactionStatus,
}

impl NewTransaction {
    /// A transaction in its initial `pending` state.
    pub fn pending(
        tx_id: impl Into<String>,
        wallet_address: impl Into<String>,
        ordinal_id: impl Into<String>,
    ) -> Self {
        Self {
            tx_id: tx_id.into(),
            wallet_address: wallet_address.into(),
            ordinal_id: ordinal_id.into(),
            status: TransactionStatus::Pending,
        }
    }
}
