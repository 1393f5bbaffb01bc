//! pmarray: named, resizable integer arrays kept in a crash-consistent,
//! transactional pool file.
//!
//! This is the facade crate that re-exports the public API of the pmarray
//! sub-crates. The command-line tool lives in `pmarray-cli`.
//!
//! # Quick start
//!
//! ```rust
//! use pmarray::prelude::*;
//!
//! let store = MemStore::new();
//! let pool = Pool::create(store.clone(), PoolConfig::new(1 << 20)).unwrap();
//! let mut registry = ArrayRegistry::open(pool).unwrap();
//!
//! registry.allocate("nums", 3).unwrap();
//! registry.resize("nums", 5).unwrap();
//! assert_eq!(
//!     registry.render("nums").unwrap().as_deref(),
//!     Some("nums = [0, 1, 2, 0, 0]")
//! );
//!
//! // Everything committed is visible after reopening the store.
//! drop(registry);
//! let registry = ArrayRegistry::open(Pool::open(store, "").unwrap()).unwrap();
//! assert_eq!(registry.lookup("nums").unwrap().unwrap().size(), 5);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `pmarray-core` | Object ids, the durable object model, `ObjectReader` |
//! | [`pool`] | `pmarray-pool` | `Pool`, transactions, stores, image codec |
//! | [`registry`] | `pmarray-registry` | `ArrayRegistry` and `Entry` |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Object ids, generations, the object model and its reader trait
/// (`pmarray-core`).
pub use pmarray_core as types;

/// The transactional pool (`pmarray-pool`).
///
/// Open or create a [`pool::Pool`] over a [`pool::FileStore`] or
/// [`pool::MemStore`] and mutate it through [`pool::Pool::transaction`].
pub use pmarray_pool as pool;

/// The array registry (`pmarray-registry`).
pub use pmarray_registry as registry;

/// Common imports for typical pmarray usage.
///
/// ```rust
/// use pmarray::prelude::*;
/// ```
pub mod prelude {
    // Core
    pub use pmarray_core::{Object, ObjectId, ObjectReader, PoolGeneration};

    // Pool
    pub use pmarray_pool::{FileStore, MemStore, Pool, PoolConfig, PoolStore, Tx};

    // Registry
    pub use pmarray_registry::{ArrayRegistry, Entry};

    // Errors
    pub use pmarray_core::ObjectError;
    pub use pmarray_pool::{ConfigError, PoolError};
    pub use pmarray_registry::RegistryError;
}
