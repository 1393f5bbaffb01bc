//! Pool configuration parameters.

use std::error::Error;
use std::fmt;

/// Configuration for creating or opening a pool.
///
/// `capacity` only matters at creation: an opened pool keeps the capacity
/// recorded in its image. `layout` must match the layout stored in the
/// image when opening.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PoolConfig {
    /// Total bytes available for live objects.
    ///
    /// Default: 67_108_864 (64 MiB). Must be at least [`PoolConfig::MIN_CAPACITY`].
    pub capacity: u64,

    /// Layout name identifying what kind of data the pool holds.
    ///
    /// Default: the empty string. At most [`PoolConfig::MAX_LAYOUT_LEN`] bytes.
    pub layout: String,
}

impl PoolConfig {
    /// Default pool capacity: 64 MiB.
    pub const DEFAULT_CAPACITY: u64 = 1024 * 1024 * 64;

    /// Smallest accepted capacity.
    pub const MIN_CAPACITY: u64 = 4096;

    /// Longest accepted layout name in bytes.
    pub const MAX_LAYOUT_LEN: usize = 1024;

    /// Create a config with the given capacity and the default layout.
    pub fn new(capacity: u64) -> Self {
        Self {
            capacity,
            layout: String::new(),
        }
    }

    /// Replace the layout name.
    pub fn with_layout(mut self, layout: impl Into<String>) -> Self {
        self.layout = layout.into();
        self
    }

    /// Check all invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity < Self::MIN_CAPACITY {
            return Err(ConfigError::CapacityTooSmall {
                configured: self.capacity,
            });
        }
        if self.layout.len() > Self::MAX_LAYOUT_LEN {
            return Err(ConfigError::LayoutTooLong {
                len: self.layout.len(),
            });
        }
        Ok(())
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected during [`PoolConfig::validate()`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// Capacity is below [`PoolConfig::MIN_CAPACITY`].
    CapacityTooSmall {
        /// The configured capacity.
        configured: u64,
    },
    /// Layout name exceeds [`PoolConfig::MAX_LAYOUT_LEN`].
    LayoutTooLong {
        /// Length of the rejected layout in bytes.
        len: usize,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityTooSmall { configured } => write!(
                f,
                "pool capacity {configured} is below minimum of {}",
                PoolConfig::MIN_CAPACITY
            ),
            Self::LayoutTooLong { len } => write!(
                f,
                "layout name is {len} bytes, maximum is {}",
                PoolConfig::MAX_LAYOUT_LEN
            ),
        }
    }
}

impl Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_capacity_is_64mib() {
        let config = PoolConfig::default();
        assert_eq!(config.capacity, 64 * 1024 * 1024);
        assert_eq!(config.layout, "");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn tiny_capacity_rejected() {
        let config = PoolConfig::new(100);
        assert_eq!(
            config.validate(),
            Err(ConfigError::CapacityTooSmall { configured: 100 })
        );
    }

    #[test]
    fn long_layout_rejected() {
        let config = PoolConfig::default().with_layout("x".repeat(1025));
        assert_eq!(
            config.validate(),
            Err(ConfigError::LayoutTooLong { len: 1025 })
        );
    }
}
