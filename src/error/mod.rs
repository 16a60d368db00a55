//! Error types for segrs.

use std::io;

use thiserror::Error;

/// Error raised by a transform stage.
///
/// Stages are user code, so any error type is accepted. The pipeline wraps it
/// into [`SegError::Transform`] before handing it to the caller.
pub type TransformError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while reading, transforming or writing segments.
#[derive(Debug, Error)]
pub enum SegError {
    /// An I/O error occurred on the source or the destination.
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    /// A transform stage failed. Nothing further is read or written.
    #[error("transform failed: {0}")]
    Transform(#[source] TransformError),

    /// Invalid configuration parameter.
    #[error("invalid config: {message}")]
    InvalidConfig {
        /// Description of what was invalid.
        message: &'static str,
    },

    /// An offset/length pair does not fit the backing storage.
    #[error("out of bounds: offset {offset} + length {length} exceeds {capacity}")]
    OutOfBounds {
        /// Requested start offset.
        offset: usize,
        /// Requested length.
        length: usize,
        /// Length of the backing storage.
        capacity: usize,
    },

    /// A fixed-size destination has no room for the data.
    #[error("insufficient space: need {needed} units, {available} available")]
    InsufficientSpace {
        /// Units that had to be written.
        needed: usize,
        /// Units left in the destination.
        available: usize,
    },

    /// The reader does not support the operation.
    #[error("unsupported operation: {operation}")]
    Unsupported {
        /// The operation name.
        operation: &'static str,
    },

    /// The source has been closed.
    #[error("stream closed")]
    Closed,
}

impl SegError {
    /// Returns true if this error was raised by a transform stage.
    pub fn is_transform(&self) -> bool {
        matches!(self, SegError::Transform(_))
    }

    /// Returns true if this error came from the underlying source or destination.
    pub fn is_io(&self) -> bool {
        matches!(self, SegError::Io(_))
    }

    pub(crate) fn invalid(message: &'static str) -> Self {
        SegError::InvalidConfig { message }
    }

    pub(crate) fn unsupported(operation: &'static str) -> Self {
        SegError::Unsupported { operation }
    }
}

impl From<SegError> for io::Error {
    fn from(e: SegError) -> Self {
        match e {
            SegError::Io(e) => e,
            SegError::InvalidConfig { .. } | SegError::OutOfBounds { .. } => {
                io::Error::new(io::ErrorKind::InvalidInput, e)
            }
            SegError::InsufficientSpace { .. } => io::Error::new(io::ErrorKind::WriteZero, e),
            SegError::Unsupported { .. } => io::Error::new(io::ErrorKind::Unsupported, e),
            SegError::Closed => io::Error::new(io::ErrorKind::BrokenPipe, e),
            SegError::Transform(_) => io::Error::other(e),
        }
    }
}

/// Checks that `offset..offset + length` lies within `capacity`.
pub(crate) fn check_bounds(offset: usize, length: usize, capacity: usize) -> Result<(), SegError> {
    match offset.checked_add(length) {
        Some(end) if end <= capacity => Ok(()),
        _ => Err(SegError::OutOfBounds {
            offset,
            length,
            capacity,
        }),
    }
}
