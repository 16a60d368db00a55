//! Ordered list of stages.

use std::fmt;

use super::Transform;
use crate::block::Block;
use crate::error::SegError;

/// An ordered chain of stages applied to each block.
///
/// The end flag of a block is handed unchanged to every stage. When a stage
/// returns `None` the remaining stages are skipped for that block.
///
/// # Example
///
/// ```
/// use bytes::Bytes;
/// use segrs::{Chain, FixedSize, Identity};
///
/// let mut chain = Chain::new()
///     .stage(Identity)
///     .stage(FixedSize::new(Identity, 4)?);
///
/// assert!(chain.apply(Bytes::from_static(b"ab"), false)?.is_none());
/// let out = chain.apply(Bytes::from_static(b"cd"), true)?;
/// assert_eq!(out.unwrap(), "abcd");
/// # Ok::<(), segrs::SegError>(())
/// ```
pub struct Chain<'a, B> {
    stages: Vec<Box<dyn Transform<B> + 'a>>,
}

impl<'a, B: Block> Chain<'a, B> {
    /// Creates an empty chain.
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    /// Appends a stage.
    pub fn stage(mut self, stage: impl Transform<B> + 'a) -> Self {
        self.push(stage);
        self
    }

    /// Appends a stage in place.
    pub fn push(&mut self, stage: impl Transform<B> + 'a) {
        self.stages.push(Box::new(stage));
    }

    /// Returns the number of stages.
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Returns true if the chain has no stages.
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Threads one block through every stage.
    ///
    /// With no stages the block is returned as is.
    ///
    /// # Errors
    ///
    /// A stage failure is returned as [`SegError::Transform`].
    pub fn apply(&mut self, mut data: B, end: bool) -> Result<Option<B>, SegError> {
        for stage in &mut self.stages {
            match stage.transform(&mut data, end).map_err(SegError::Transform)? {
                Some(next) => data = next,
                None => return Ok(None),
            }
        }
        Ok(Some(data))
    }
}

impl<B: Block> Default for Chain<'_, B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B> fmt::Debug for Chain<'_, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chain")
            .field("stages", &self.stages.len())
            .finish()
    }
}
