//! Mint-candidate allocation.
//!
//! Picks a random unminted collectible from a collection. The pick is a
//! suggestion, not a reservation: nothing is locked, and two callers can be
//! offered the same candidate. Whoever mints it first wins; the other mint
//! request fails with "already minted" in the store.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::model::Collectible;
use crate::store::EntityStore;

/// Choose uniformly at random among the unminted collectibles of
/// `collection_name`. Returns `None` when the collection is unknown or sold
/// out.
pub fn pick_unminted<R: Rng + ?Sized>(
    store: &EntityStore,
    collection_name: &str,
    rng: &mut R,
) -> Option<Collectible> {
    let unminted: Vec<Collectible> = store
        .list_by_collection(collection_name)
        .into_iter()
        .filter(|c| !c.is_minted)
        .collect();

    let candidate = unminted.choose(rng).cloned();
    match &candidate {
        Some(c) => tracing::debug!(
            collection = collection_name,
            ordinal_id = %c.ordinal_id,
            remaining = unminted.len(),
            "mint candidate selected"
        ),
        None => tracing::debug!(collection = collection_name, "no mint candidates"),
    }
    candidate
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn picks_only_unminted() {
        let store = EntityStore::seeded();
        for n in 1..=4 {
            store.set_minted(&format!("ord1:pixel-fox-{n}"));
        }

        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let c = pick_unminted(&store, "Pixel Foxes", &mut rng).unwrap();
            assert_eq!(c.ordinal_id, "ord1:pixel-fox-5");
        }
    }

    #[test]
    fn sold_out_and_unknown_collections_yield_none() {
        let store = EntityStore::seeded();
        let mut rng = StdRng::seed_from_u64(1);
        assert!(pick_unminted(&store, "Unknown", &mut rng).is_none());

        for c in store.list_by_collection("Pixel Foxes") {
            store.set_minted(&c.ordinal_id);
        }
        assert!(pick_unminted(&store, "Pixel Foxes", &mut rng).is_none());
    }

    #[test]
    fn selection_does_not_reserve() {
        let store = EntityStore::seeded();
        for n in 2..=5 {
            store.set_minted(&format!("ord1:pixel-fox-{n}"));
        }
        let mut rng = StdRng::seed_from_u64(3);
        let first = pick_unminted(&store, "Pixel Foxes", &mut rng).unwrap();
        let second = pick_unminted(&store, "Pixel Foxes", &mut rng).unwrap();
        assert_eq!(first.ordinal_id, second.ordinal_id);
        assert!(!store.get(&first.ordinal_id).unwrap().is_minted);
    }

    #[test]
    fn eventually_covers_every_unminted_candidate() {
        let store = EntityStore::seeded();
        let mut rng = StdRng::seed_from_u64(42);
        let seen: HashSet<String> = (0..500)
            .filter_map(|_| pick_unminted(&store, "Pixel Foxes", &mut rng))
            .map(|c| c.ordinal_id)
            .collect();
        assert_eq!(seen.len(), 5);
    }
}
