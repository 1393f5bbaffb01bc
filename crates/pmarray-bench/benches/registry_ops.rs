//! Criterion micro-benchmarks for registry operations.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use pmarray_bench::{array_name, populated_registry};
use pmarray_test_utils::{mem_registry, workload};

fn bench_allocate(c: &mut Criterion) {
    c.bench_function("allocate_1k_into_100", |b| {
        b.iter_batched(
            || populated_registry(100, 16).unwrap().0,
            |mut registry| {
                registry.allocate("fresh", 1024).unwrap();
                black_box(registry);
            },
            BatchSize::SmallInput,
        );
    });
}

fn bench_resize(c: &mut Criterion) {
    c.bench_function("resize_grow_1k_to_4k", |b| {
        b.iter_batched(
            || {
                let (mut registry, _) = mem_registry();
                registry.allocate("a", 1024).unwrap();
                registry
            },
            |mut registry| {
                registry.resize("a", 4096).unwrap();
                black_box(registry);
            },
            BatchSize::SmallInput,
        );
    });
}

fn bench_delete(c: &mut Criterion) {
    c.bench_function("delete_middle_of_100", |b| {
        b.iter_batched(
            || populated_registry(100, 16).unwrap().0,
            |mut registry| {
                registry.delete(&array_name(50)).unwrap();
                black_box(registry);
            },
            BatchSize::SmallInput,
        );
    });
}

fn bench_lookup(c: &mut Criterion) {
    let (registry, _) = populated_registry(1000, 8).unwrap();
    let last = array_name(999);
    c.bench_function("lookup_last_of_1000", |b| {
        b.iter(|| black_box(registry.lookup(black_box(&last)).unwrap()));
    });
}

fn bench_workload(c: &mut Criterion) {
    let ops = workload(42, 500, 64);
    c.bench_function("mixed_workload_500_ops", |b| {
        b.iter_batched(
            || mem_registry().0,
            |mut registry| {
                for op in &ops {
                    op.apply(&mut registry).unwrap();
                }
                black_box(registry);
            },
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(
    benches,
    bench_allocate,
    bench_resize,
    bench_delete,
    bench_lookup,
    bench_workload
);
criterion_main!(benches);
