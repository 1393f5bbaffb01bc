//! File-backed transactional object pool for pmarray.
//!
//! A pool is a heap of [`Object`](pmarray_core::Object)s addressed by
//! stable [`ObjectId`](pmarray_core::ObjectId)s, persisted as a single
//! checksummed image. Mutation is only possible inside
//! [`Pool::transaction`], which either commits every staged change or none.
//!
//! # Architecture
//!
//! ```text
//! Pool
//! ├── Heap (committed slots + free list)
//! ├── Tx (per-transaction overlay: copy-on-write, fresh ids, tombstones)
//! ├── codec (image encode/decode, FNV-1a trailer)
//! └── Box<dyn PoolStore> (FileStore: write tmp + rename / MemStore)
//! ```
//!
//! # Commit protocol
//!
//! Commit applies the overlay to a shadow copy of the heap, encodes the
//! copy, and asks the store to replace the image atomically. The in-memory
//! heap is swapped only after the store reports success, so a failed
//! commit leaves memory and disk at the previous generation.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod checksum;
pub mod codec;
pub mod config;
pub mod error;
pub mod heap;
pub mod pool;
pub mod store;
pub mod tx;

pub use config::{ConfigError, PoolConfig};
pub use error::PoolError;
pub use pool::Pool;
pub use store::{FileStore, MemStore, PoolStore};
pub use tx::Tx;

/// Magic bytes at the start of every pool image.
pub const MAGIC: [u8; 4] = *b"PMAR";

/// Current image format version.
pub const FORMAT_VERSION: u8 = 1;
