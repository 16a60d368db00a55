//! Configuration for reading blocks from a source.
//!
//! - [`ReadConfig`] - Block size, read limit and zero-read policy
//!
//! # Example
//!
//! ```
//! use segrs::ReadConfig;
//!
//! // Custom block size
//! let config = ReadConfig::new(4096)?;
//!
//! // Builder pattern
//! let config = ReadConfig::default()
//!     .with_block_size(1024)
//!     .with_read_limit(1 << 20)
//!     .with_end_on_zero_read(true);
//! # Ok::<(), segrs::SegError>(())
//! ```

use crate::error::SegError;

/// Default number of units pulled from a source per block (8 KiB).
pub const DEFAULT_BLOCK_SIZE: usize = 8 * 1024;

/// Configuration for how a pipeline pulls blocks from its source.
///
/// - `block_size` - Units requested from the reader per block, must be non-zero
/// - `read_limit` - Maximum total units read from the source, `None` for unbounded
/// - `end_on_zero_read` - Treat a zero-length underlying read as end of input
///
/// The zero-read policy matters for non-blocking sources only: with it
/// disabled a read that returns no data is retried until data or end of
/// stream arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReadConfig {
    block_size: usize,
    read_limit: Option<u64>,
    end_on_zero_read: bool,
}

impl ReadConfig {
    /// Creates a new configuration with the given block size.
    ///
    /// # Errors
    ///
    /// Returns [`SegError::InvalidConfig`] if `block_size` is zero.
    ///
    /// # Example
    ///
    /// ```
    /// use segrs::ReadConfig;
    ///
    /// let config = ReadConfig::new(4096)?;
    /// assert_eq!(config.block_size(), 4096);
    /// assert!(ReadConfig::new(0).is_err());
    /// # Ok::<(), segrs::SegError>(())
    /// ```
    pub fn new(block_size: usize) -> Result<Self, SegError> {
        if block_size == 0 {
            return Err(SegError::invalid("block size must be non-zero"));
        }
        Ok(Self {
            block_size,
            ..Self::default()
        })
    }

    /// Sets the block size.
    ///
    /// Note: This does not validate the configuration. Use [`ReadConfig::validate`]
    /// to check if the configuration is valid.
    pub fn with_block_size(mut self, size: usize) -> Self {
        self.block_size = size;
        self
    }

    /// Sets the maximum number of units read from the source.
    pub fn with_read_limit(mut self, limit: u64) -> Self {
        self.read_limit = Some(limit);
        self
    }

    /// Removes the read limit.
    pub fn without_read_limit(mut self) -> Self {
        self.read_limit = None;
        self
    }

    /// Sets whether a zero-length underlying read ends the input.
    pub fn with_end_on_zero_read(mut self, end_on_zero_read: bool) -> Self {
        self.end_on_zero_read = end_on_zero_read;
        self
    }

    /// Returns the block size.
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Returns the read limit, if any.
    pub fn read_limit(&self) -> Option<u64> {
        self.read_limit
    }

    /// Returns the zero-read policy.
    pub fn end_on_zero_read(&self) -> bool {
        self.end_on_zero_read
    }

    /// Validates the current configuration.
    ///
    /// # Example
    ///
    /// ```
    /// use segrs::ReadConfig;
    ///
    /// let config = ReadConfig::default().with_block_size(0);
    /// assert!(config.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<(), SegError> {
        Self::new(self.block_size).map(|_| ())
    }
}

impl Default for ReadConfig {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            read_limit: None,
            end_on_zero_read: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ReadConfig::default();
        assert_eq!(config.block_size(), DEFAULT_BLOCK_SIZE);
        assert_eq!(config.read_limit(), None);
        assert!(!config.end_on_zero_read());
    }

    #[test]
    fn test_builder_pattern() {
        let config = ReadConfig::default()
            .with_block_size(512)
            .with_read_limit(100)
            .with_end_on_zero_read(true);

        assert_eq!(config.block_size(), 512);
        assert_eq!(config.read_limit(), Some(100));
        assert!(config.end_on_zero_read());

        let config = config.without_read_limit();
        assert_eq!(config.read_limit(), None);
    }

    #[test]
    fn test_invalid_config_zero_block() {
        assert!(ReadConfig::new(0).is_err());
        assert!(ReadConfig::default().with_block_size(0).validate().is_err());
    }

    #[test]
    fn test_zero_read_limit_is_valid() {
        let config = ReadConfig::new(16).unwrap().with_read_limit(0);
        assert!(config.validate().is_ok());
    }
}
