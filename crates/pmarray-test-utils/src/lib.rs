//! Test utilities and fault-injecting stores for pmarray development.
//!
//! Provides a [`FaultyStore`] that fails commits on demand, registry
//! constructors backed by in-memory stores, and seeded workloads (see
//! [`workload`]) with a plain in-memory model to compare against.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod workload;

use std::io;

use pmarray_pool::{MemStore, Pool, PoolConfig, PoolError, PoolStore};
use pmarray_registry::ArrayRegistry;

pub use workload::{workload, ModelRegistry, Op};

/// Capacity used by test pools: 1 MiB.
pub const TEST_CAPACITY: u64 = 1 << 20;

/// How a [`FaultyStore`] misbehaves once its budget of good commits runs out.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FaultMode {
    /// Fail before anything is written, like a crash before the temp file
    /// is renamed into place.
    FailBeforeWrite,
    /// Write the first half of the image, then fail. Models a store without
    /// atomic replace; reopening must detect the torn image.
    TornWrite,
}

/// A [`MemStore`] wrapper that fails after a number of successful stores.
///
/// Clones of the inner `MemStore` observe exactly what a real disk would
/// hold after the failure.
#[derive(Clone, Debug)]
pub struct FaultyStore {
    inner: MemStore,
    good_stores_left: Option<usize>,
    mode: FaultMode,
}

impl FaultyStore {
    /// Wrap `inner`; the store never fails until [`FaultyStore::fail_after`].
    pub fn new(inner: MemStore) -> Self {
        Self {
            inner,
            good_stores_left: None,
            mode: FaultMode::FailBeforeWrite,
        }
    }

    /// Let `n` more stores succeed, then fail every store with `mode`.
    pub fn fail_after(mut self, n: usize, mode: FaultMode) -> Self {
        self.good_stores_left = Some(n);
        self.mode = mode;
        self
    }
}

impl PoolStore for FaultyStore {
    fn load(&mut self) -> Result<Option<Vec<u8>>, PoolError> {
        self.inner.load()
    }

    fn store(&mut self, image: &[u8]) -> Result<(), PoolError> {
        match self.good_stores_left {
            Some(0) => {
                if self.mode == FaultMode::TornWrite {
                    self.inner.replace(Some(image[..image.len() / 2].to_vec()));
                }
                Err(PoolError::Io(io::Error::other("injected store failure")))
            }
            Some(ref mut n) => {
                *n -= 1;
                self.inner.store(image)
            }
            None => self.inner.store(image),
        }
    }

    fn exists(&self) -> bool {
        self.inner.exists()
    }
}

/// A fresh, initialized registry over an in-memory pool.
///
/// Returns the store too, so tests can reopen what was committed.
pub fn mem_registry() -> (ArrayRegistry, MemStore) {
    let store = MemStore::new();
    let pool = Pool::create(store.clone(), PoolConfig::new(TEST_CAPACITY))
        .expect("create in-memory pool");
    let registry = ArrayRegistry::open(pool).expect("initialize registry");
    (registry, store)
}

/// Reopen a registry from a store written by an earlier pool.
pub fn reopen(store: &MemStore) -> ArrayRegistry {
    let pool = Pool::open(store.clone(), "").expect("reopen in-memory pool");
    ArrayRegistry::open(pool).expect("initialize registry")
}

/// An initialized registry whose store starts failing after `good_stores`
/// more commits.
pub fn faulty_registry(good_stores: usize, mode: FaultMode) -> (ArrayRegistry, MemStore) {
    let (registry, store) = mem_registry();
    drop(registry);
    let faulty = FaultyStore::new(store.clone()).fail_after(good_stores, mode);
    let pool = Pool::open(faulty, "").expect("reopen through faulty store");
    (ArrayRegistry::new(pool), store)
}

/// Every entry's values, in list order.
pub fn contents(registry: &ArrayRegistry) -> Vec<(String, Vec<i32>)> {
    registry
        .entries()
        .expect("read entries")
        .into_iter()
        .map(|e| (e.name().to_string(), e.values().to_vec()))
        .collect()
}
