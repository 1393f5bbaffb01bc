//! Named, resizable integer arrays stored in a transactional pool.
//!
//! The registry is an ordered list of entries hanging off the pool root.
//! Each entry owns three pool objects: its name text, its `i32` data
//! buffer, and the record tying them together with the element count.
//!
//! ```text
//! Root { arrays } ──► List [e0, e1, ...]
//!                          │
//!                          ▼
//!                     Entry { name ──► Text, size, data ──► Ints }
//! ```
//!
//! Every mutation ([`ArrayRegistry::allocate`], [`ArrayRegistry::resize`],
//! [`ArrayRegistry::delete`], [`ArrayRegistry::initialize`]) is a single
//! pool transaction, so an entry's size and buffer are never observed out
//! of step, even after a crash.
//!
//! # Growing arrays
//!
//! Elements added by growing an array are zero. Pool buffers are always
//! zero-initialised; there is no way to read uninitialised memory.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod entry;
pub mod error;
pub mod registry;

pub use entry::Entry;
pub use error::RegistryError;
pub use registry::ArrayRegistry;
