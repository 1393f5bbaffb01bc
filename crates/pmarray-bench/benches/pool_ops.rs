//! Criterion micro-benchmarks for pool commit and open.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use pmarray_bench::populated_registry;
use pmarray_pool::{MemStore, Pool, PoolError};

fn bench_open(c: &mut Criterion) {
    let (_, store) = populated_registry(1000, 64).unwrap();
    c.bench_function("open_1000_arrays", |b| {
        b.iter(|| black_box(Pool::open(store.clone(), "").unwrap()));
    });
}

fn bench_commit(c: &mut Criterion) {
    c.bench_function("commit_alloc_into_1000_arrays", |b| {
        b.iter_batched(
            || populated_registry(1000, 64).unwrap().0.into_pool(),
            |mut pool| {
                pool.transaction(|tx| tx.alloc_ints(256).map_err(PoolError::from))
                    .unwrap();
                black_box(pool);
            },
            BatchSize::LargeInput,
        );
    });
}

fn bench_empty_commit(c: &mut Criterion) {
    let mut pool = Pool::create(MemStore::new(), Default::default()).unwrap();
    c.bench_function("commit_empty_transaction", |b| {
        b.iter(|| pool.transaction(|_| Ok::<_, PoolError>(())).unwrap());
    });
}

criterion_group!(benches, bench_open, bench_commit, bench_empty_commit);
criterion_main!(benches);
