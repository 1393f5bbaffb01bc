//! Benchmark profiles for pmarray.
//!
//! - [`populated_registry`]: a registry pre-filled with `count` arrays
//! - [`array_name`]: the naming scheme used by the profiles

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use pmarray_pool::{MemStore, Pool, PoolConfig};
use pmarray_registry::{ArrayRegistry, RegistryError};

/// Capacity for benchmark pools: 64 MiB.
pub const BENCH_CAPACITY: u64 = PoolConfig::DEFAULT_CAPACITY;

/// Name of the `i`th array in a profile.
pub fn array_name(i: usize) -> String {
    format!("array-{i:05}")
}

/// An in-memory registry holding `count` arrays of `size` elements each.
pub fn populated_registry(count: usize, size: u64) -> Result<(ArrayRegistry, MemStore), RegistryError> {
    let store = MemStore::new();
    let pool = Pool::create(store.clone(), PoolConfig::new(BENCH_CAPACITY))?;
    let mut registry = ArrayRegistry::open(pool)?;
    for i in 0..count {
        registry.allocate(&array_name(i), size)?;
    }
    Ok((registry, store))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_has_requested_arrays() {
        let (registry, _) = populated_registry(10, 4).unwrap();
        assert_eq!(registry.len().unwrap(), 10);
        assert_eq!(registry.lookup(&array_name(9)).unwrap().unwrap().size(), 4);
    }
}
