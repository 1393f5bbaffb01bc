//! Core types and traits for pmarray pools.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the vocabulary shared by the pool and the array registry: object ids,
//! the durable object model, object errors, and the read trait that both
//! committed pools and in-flight transactions implement.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod id;
pub mod object;
pub mod traits;

pub use error::ObjectError;
pub use id::{ObjectId, PoolGeneration};
pub use object::{EntryRecord, Object, ObjectKind, OBJECT_HEADER_BYTES};
pub use traits::ObjectReader;
