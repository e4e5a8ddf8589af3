// Allocation and catalog benchmarks for ordmint.
//
// Covers candidate selection and stats over collections far larger than the
// seed catalog, with a varying fraction already minted.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::SeedableRng;

use ordmint_core::allocation::pick_unminted;
use ordmint_core::catalog::{paginate, CollectionStats, PageRequest};
use ordmint_core::{CollectibleMetadata, EntityStore, NewCollectible};

const COLLECTION: &str = "Bench Collection";

/// Builds a store with `n` collectibles, every `minted_every`-th one minted.
fn setup_store(n: usize, minted_every: usize) -> EntityStore {
    let store = EntityStore::new();
    for i in 0..n {
        let ordinal_id = format!("ord1:bench-{i}");
        store
            .insert_collectible(NewCollectible {
                ordinal_id: ordinal_id.clone(),
                collection_name: COLLECTION.to_string(),
                image_url: format!("https://img/{i}"),
                metadata: CollectibleMetadata::new(format!("Bench #{i}"), [("tier", "common")]),
                mint_fee: 1_000,
            })
            .expect("unique id");
        if i % minted_every == 0 {
            store.set_minted(&ordinal_id);
        }
    }
    store
}

fn bench_pick_unminted(c: &mut Criterion) {
    let mut group = c.benchmark_group("allocation/pick_unminted");
    for size in [100usize, 1_000, 10_000] {
        let store = setup_store(size, 2);
        let mut rng = StdRng::seed_from_u64(1);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| pick_unminted(&store, COLLECTION, &mut rng));
        });
    }
    group.finish();
}

fn bench_stats_and_page(c: &mut Criterion) {
    let store = setup_store(10_000, 3);

    c.bench_function("catalog/stats_10k", |b| {
        b.iter(|| {
            let items = store.list_by_collection(COLLECTION);
            CollectionStats::compute(COLLECTION, &items)
        });
    });

    c.bench_function("catalog/page_10k", |b| {
        b.iter(|| {
            let items = store.list_by_collection(COLLECTION);
            paginate(&items, PageRequest { page: 50, limit: 20 })
        });
    });
}

criterion_group!(benches, bench_pick_unminted, bench_stats_and_page);
criterion_main!(benches);
