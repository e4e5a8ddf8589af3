//! The fixed seed catalog.
//!
//! Loaded into the store at process start. There is no persistence, so every
//! restart begins from exactly this list with nothing minted.

use crate::config::{SEED_COLLECTION, SEED_MINT_FEE};
use crate::model::{CollectibleMetadata, NewCollectible};

/// `(ordinal id, image colour, background, eyes)` for each Pixel Fox.
const PIXEL_FOXES: [(&str, &str, &str, &str); 5] = [
    ("ord1:pixel-fox-1", "f97316", "Orange", "Blue"),
    ("ord1:pixel-fox-2", "3b82f6", "Blue", "Green"),
    ("ord1:pixel-fox-3", "10b981", "Green", "Yellow"),
    ("ord1:pixel-fox-4", "f59e0b", "Yellow", "Red"),
    ("ord1:pixel-fox-5", "6366f1", "Indigo", "Purple"),
];

/// The seed catalog, in listing order.
pub fn catalog() -> Vec<NewCollectible> {
    PIXEL_FOXES
        .iter()
        .enumerate()
        .map(|(i, (ordinal_id, colour, background, eyes))| {
            let n = i + 1;
            NewCollectible {
                ordinal_id: (*ordinal_id).to_string(),
                collection_name: SEED_COLLECTION.to_string(),
                image_url: format!(
                    "https://via.placeholder.com/200x200/{colour}/ffffff?text=Fox%20{n}"
                ),
                metadata: CollectibleMetadata::new(
                    format!("Pixel Fox #{n}"),
                    [("background", *background), ("eyes", *eyes)],
                ),
                mint_fee: SEED_MINT_FEE,
            }
        })
        .collect()
}
