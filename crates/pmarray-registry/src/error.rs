//! Registry error types.

use std::error::Error;
use std::fmt;

use pmarray_core::ObjectError;
use pmarray_pool::PoolError;

/// Errors from array registry operations.
///
/// The first three variants are user errors: they are detected before any
/// transaction starts and never change the pool. The rest come from the
/// pool and abort whatever transaction was running.
#[derive(Debug)]
pub enum RegistryError {
    /// `allocate` was called with a name that is already registered.
    DuplicateName {
        /// The rejected name.
        name: String,
    },
    /// A size below 1 was requested.
    InvalidSize {
        /// The rejected size.
        size: u64,
    },
    /// No entry has the given name.
    NotFound {
        /// The name that was looked up.
        name: String,
    },
    /// A mutating operation ran before [`initialize`](crate::ArrayRegistry::initialize).
    NotInitialized,
    /// An entry's recorded size disagrees with its data buffer.
    Inconsistent {
        /// Entry name.
        name: String,
        /// Size stored in the entry record.
        size: u64,
        /// Actual length of the data buffer.
        len: usize,
    },
    /// The pool failed (I/O, corruption, out of space, ...).
    Pool(PoolError),
}

impl RegistryError {
    /// Whether this error was caused by the caller's request rather than by
    /// the pool.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::DuplicateName { .. } | Self::InvalidSize { .. } | Self::NotFound { .. }
        )
    }
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateName { name } => write!(f, "array '{name}' already exists"),
            Self::InvalidSize { size } => write!(f, "invalid array size {size}, must be at least 1"),
            Self::NotFound { name } => write!(f, "no array named '{name}'"),
            Self::NotInitialized => write!(f, "array registry is not initialized"),
            Self::Inconsistent { name, size, len } => write!(
                f,
                "array '{name}' records size {size} but holds {len} elements"
            ),
            Self::Pool(e) => write!(f, "pool: {e}"),
        }
    }
}

impl Error for RegistryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Pool(e) => Some(e),
            _ => None,
        }
    }
}

impl From<PoolError> for RegistryError {
    fn from(e: PoolError) -> Self {
        Self::Pool(e)
    }
}

impl From<ObjectError> for RegistryError {
    fn from(e: ObjectError) -> Self {
        Self::Pool(PoolError::Object(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pmarray_core::ObjectId;

    #[test]
    fn user_errors_classified() {
        assert!(RegistryError::NotFound { name: "a".into() }.is_user_error());
        assert!(RegistryError::InvalidSize { size: 0 }.is_user_error());
        assert!(RegistryError::DuplicateName { name: "a".into() }.is_user_error());
        assert!(!RegistryError::NotInitialized.is_user_error());
        let pool_err: RegistryError = ObjectError::UnknownObject { id: ObjectId(3) }.into();
        assert!(!pool_err.is_user_error());
    }

    #[test]
    fn pool_error_is_source() {
        let err: RegistryError = ObjectError::UnknownObject { id: ObjectId(3) }.into();
        assert!(err.source().is_some());
        assert_eq!(err.to_string(), "pool: unknown object #3");
    }
}
