//! Errors raised while reading or staging objects.

use std::error::Error;
use std::fmt;

use crate::id::ObjectId;
use crate::object::ObjectKind;

/// Errors from object access and allocation inside a pool.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ObjectError {
    /// The id does not name a live object.
    UnknownObject {
        /// The dangling id.
        id: ObjectId,
    },
    /// The object exists but has a different kind than the caller expected.
    KindMismatch {
        /// The object that was read.
        id: ObjectId,
        /// The kind the caller asked for.
        expected: ObjectKind,
        /// The kind actually stored.
        found: ObjectKind,
    },
    /// Staging the allocation would exceed the pool capacity.
    OutOfSpace {
        /// Bytes the pool would need after the allocation.
        requested: u64,
        /// Configured pool capacity in bytes.
        capacity: u64,
    },
}

impl fmt::Display for ObjectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownObject { id } => write!(f, "unknown object {id}"),
            Self::KindMismatch {
                id,
                expected,
                found,
            } => {
                write!(f, "object {id} is {found}, expected {expected}")
            }
            Self::OutOfSpace {
                requested,
                capacity,
            } => {
                write!(
                    f,
                    "pool out of space: {requested} bytes needed, capacity {capacity} bytes"
                )
            }
        }
    }
}

impl Error for ObjectError {}
