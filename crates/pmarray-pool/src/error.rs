//! Pool error types.

use std::error::Error;
use std::fmt;
use std::io;

use pmarray_core::ObjectError;

use crate::config::ConfigError;

/// Errors from creating, opening, or committing to a pool.
#[derive(Debug)]
pub enum PoolError {
    /// An I/O error from the backing store.
    Io(io::Error),
    /// `create` was called on a store that already holds a pool.
    AlreadyExists,
    /// `open` was called on a store that holds no pool.
    NotFound,
    /// The image does not start with the expected `b"PMAR"` magic bytes.
    InvalidMagic,
    /// The image format version is not supported by this build.
    UnsupportedVersion {
        /// The version found in the image.
        found: u8,
    },
    /// The image trailer checksum does not match its contents.
    ChecksumMismatch {
        /// Checksum stored in the image.
        stored: u64,
        /// Checksum computed over the image body.
        computed: u64,
    },
    /// The image body could not be decoded.
    Malformed {
        /// Human-readable description of what went wrong.
        detail: String,
    },
    /// The pool was created with a different layout name.
    LayoutMismatch {
        /// Layout requested by the caller.
        expected: String,
        /// Layout stored in the image.
        found: String,
    },
    /// The pool configuration is invalid.
    Config(ConfigError),
    /// An object access or allocation failed inside a transaction.
    Object(ObjectError),
}

impl fmt::Display for PoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::AlreadyExists => write!(f, "pool already exists"),
            Self::NotFound => write!(f, "pool does not exist"),
            Self::InvalidMagic => write!(f, "invalid magic bytes (expected b\"PMAR\")"),
            Self::UnsupportedVersion { found } => {
                write!(f, "unsupported pool format version {found}")
            }
            Self::ChecksumMismatch { stored, computed } => {
                write!(
                    f,
                    "pool checksum mismatch: stored={stored:#018x}, computed={computed:#018x}"
                )
            }
            Self::Malformed { detail } => write!(f, "malformed pool image: {detail}"),
            Self::LayoutMismatch { expected, found } => {
                write!(f, "pool layout mismatch: expected {expected:?}, found {found:?}")
            }
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Object(e) => write!(f, "{e}"),
        }
    }
}

impl Error for PoolError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Config(e) => Some(e),
            Self::Object(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for PoolError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<ObjectError> for PoolError {
    fn from(e: ObjectError) -> Self {
        Self::Object(e)
    }
}

impl From<ConfigError> for PoolError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}
