//! Benchmarks for deduplication.
//!
//! Measures:
//! - Fingerprinting
//! - Membership filter add/check
//! - Full batch filtering against an in-memory `SQLite` store

// Criterion macros generate items without docs - this is expected for benchmarks
// Benchmarks use expect/unwrap for simplicity - panics are acceptable in benchmarks
#![allow(missing_docs)]
#![allow(clippy::expect_used, clippy::unwrap_used)]

use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};
use feedsift::RawItem;
use feedsift::services::deduplication::{
    ContentHasher, DeduplicationConfig, DeduplicationService, MembershipFilter,
};
use feedsift::storage::SqliteRecordStore;
use std::hint::black_box;
use std::sync::Arc;

fn batch(size: usize, offset: usize) -> Vec<RawItem> {
    (0..size)
        .map(|i| {
            let n = i + offset;
            RawItem::new(format!("p{n}"), format!("Post title {n}"), format!("Body text for post {n}"), "Bitcoin")
        })
        .collect()
}

fn bench_fingerprint(c: &mut Criterion) {
    let body = "lorem ipsum ".repeat(100);
    c.bench_function("fingerprint_1k_body", |b| {
        b.iter(|| ContentHasher::fingerprint(black_box("Bitcoin rises"), black_box(&body)));
    });
}

fn bench_filter(c: &mut Criterion) {
    let fingerprints: Vec<_> = (0..10_000)
        .map(|i| ContentHasher::fingerprint(&format!("t{i}"), ""))
        .collect();

    c.bench_function("filter_add_10k", |b| {
        b.iter_batched(
            || MembershipFilter::new(100_000, 0.1),
            |mut filter| {
                for fp in &fingerprints {
                    filter.add(fp);
                }
                filter
            },
            BatchSize::SmallInput,
        );
    });

    let mut filter = MembershipFilter::new(100_000, 0.1);
    for fp in &fingerprints {
        filter.add(fp);
    }
    c.bench_function("filter_check_10k", |b| {
        b.iter(|| fingerprints.iter().filter(|fp| filter.might_contain(fp)).count());
    });
}

fn bench_filter_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter_batch");

    for size in [100usize, 1_000] {
        group.bench_with_input(BenchmarkId::new("all_new", size), &size, |b, &size| {
            b.iter_batched(
                || {
                    let store = Arc::new(SqliteRecordStore::in_memory().unwrap());
                    DeduplicationService::open(store, DeduplicationConfig::default()).unwrap()
                },
                |service| service.filter_batch(batch(size, 0)),
                BatchSize::SmallInput,
            );
        });

        group.bench_with_input(BenchmarkId::new("all_duplicate", size), &size, |b, &size| {
            let store = Arc::new(SqliteRecordStore::in_memory().unwrap());
            let service = DeduplicationService::open(store, DeduplicationConfig::default()).unwrap();
            service.filter_batch(batch(size, 0));
            b.iter(|| service.filter_batch(batch(size, 0)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_fingerprint, bench_filter, bench_filter_batch);
criterion_main!(benches);
