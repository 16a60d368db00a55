//! Pass-through digest stage.

use bytes::Bytes;

use super::Transform;
use crate::block::Block;
use crate::error::TransformError;
use crate::hash::{Blake3Hasher, Digest};

/// Passes bytes through unchanged while hashing them with BLAKE3.
///
/// The digest becomes available after the final call.
///
/// # Example
///
/// ```
/// use segrs::{BytePipeline, DigestStage};
///
/// let mut digest = DigestStage::new();
/// let out = BytePipeline::from_bytes(&b"hello world"[..])
///     .stage(&mut digest)
///     .to_vec()?;
///
/// assert_eq!(out, b"hello world");
/// assert_eq!(digest.digest().unwrap().to_hex().len(), 64);
/// # Ok::<(), segrs::SegError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct DigestStage {
    hasher: Blake3Hasher,
    digest: Option<Digest>,
}

impl DigestStage {
    /// Creates a stage with a fresh hasher.
    pub fn new() -> Self {
        Self {
            hasher: Blake3Hasher::new(),
            digest: None,
        }
    }

    /// Returns the digest of everything seen, once the final call has run.
    pub fn digest(&self) -> Option<Digest> {
        self.digest
    }

    /// Clears the hasher and any finished digest.
    pub fn reset(&mut self) {
        self.hasher.reset();
        self.digest = None;
    }
}

impl Transform<Bytes> for DigestStage {
    fn transform(&mut self, data: &mut Bytes, end: bool) -> Result<Option<Bytes>, TransformError> {
        self.hasher.update(data);
        if end {
            self.digest = Some(self.hasher.finalize());
        }
        Ok(Some(data.take_all()))
    }
}
