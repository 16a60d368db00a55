//! Carry-over wrapper for stages that consume a prefix.

use std::fmt;

use super::Transform;
use crate::block::{Block, concat};
use crate::error::TransformError;

/// Carries units the wrapped stage left unconsumed into its next call.
///
/// Before each call the saved tail is joined onto the front of the new
/// input. On the final call any remainder is dropped.
///
/// # Example
///
/// ```
/// use segrs::{Block, Buffered, CharBlock, Transform, transform};
///
/// // Emits complete lines only.
/// let lines = transform::from_fn(|data: &mut CharBlock, end| {
///     let cut = match data.as_slice().iter().rposition(|&c| c == '\n') {
///         Some(i) => i + 1,
///         None if end => data.len(),
///         None => return Ok(None),
///     };
///     Ok(Some(data.split_to(cut)))
/// });
/// let mut buffered = Buffered::new(lines);
///
/// assert!(buffered.transform(&mut CharBlock::from_str("par"), false).unwrap().is_none());
/// let out = buffered.transform(&mut CharBlock::from_str("tial\nne"), false).unwrap();
/// assert_eq!(out.unwrap(), "partial\n");
/// assert_eq!(buffered.tail_len(), 2);
/// ```
pub struct Buffered<B, T> {
    stage: T,
    tail: B,
}

impl<B: Block, T: Transform<B>> Buffered<B, T> {
    /// Wraps `stage`.
    pub fn new(stage: T) -> Self {
        Self {
            stage,
            tail: B::empty(),
        }
    }

    /// Returns the number of units carried into the next call.
    pub fn tail_len(&self) -> usize {
        self.tail.len()
    }

    /// Returns a reference to the wrapped stage.
    pub fn get_ref(&self) -> &T {
        &self.stage
    }

    /// Returns the wrapped stage, dropping any tail.
    pub fn into_inner(self) -> T {
        self.stage
    }
}

impl<B: Block, T: Transform<B>> Transform<B> for Buffered<B, T> {
    fn transform(&mut self, data: &mut B, end: bool) -> Result<Option<B>, TransformError> {
        let mut combined = if self.tail.is_empty() {
            data.take_all()
        } else {
            concat(vec![self.tail.take_all(), data.take_all()])
        };
        let result = self.stage.transform(&mut combined, end)?;
        if !end {
            self.tail = combined;
        }
        Ok(result)
    }
}

impl<B: Block, T> fmt::Debug for Buffered<B, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Buffered")
            .field("tail", &self.tail.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::from_fn;
    use bytes::Bytes;

    /// Consumes exactly `m` units per call when available.
    fn prefix(m: usize) -> impl Transform<Bytes> {
        from_fn(move |data: &mut Bytes, _end| {
            let n = m.min(data.len());
            Ok(Some(data.split_to(n)))
        })
    }

    #[test]
    fn test_tail_carried() {
        let mut buffered = Buffered::new(prefix(3));
        let out = buffered.transform(&mut Bytes::from_static(b"abcde"), false).unwrap();
        assert_eq!(out.unwrap().as_ref(), b"abc");
        assert_eq!(buffered.tail_len(), 2);

        let out = buffered.transform(&mut Bytes::from_static(b"fg"), false).unwrap();
        assert_eq!(out.unwrap().as_ref(), b"def");
        assert_eq!(buffered.tail_len(), 1);
    }

    #[test]
    fn test_tail_dropped_on_end() {
        let mut buffered = Buffered::new(prefix(1));
        buffered.transform(&mut Bytes::from_static(b"xyz"), false).unwrap();
        let out = buffered.transform(&mut Bytes::from_static(b"w"), true).unwrap();
        assert_eq!(out.unwrap().as_ref(), b"y");
        assert_eq!(buffered.tail_len(), 0);
    }

    #[test]
    fn test_empty_tail_passes_input_through() {
        let source = Bytes::from(b"shared".to_vec());
        let mut buffered = Buffered::new(prefix(6));
        let out = buffered.transform(&mut source.clone(), false).unwrap().unwrap();
        assert_eq!(out.as_ptr(), source.as_ptr());
    }

    #[test]
    fn test_input_always_consumed() {
        let mut buffered = Buffered::new(prefix(0));
        let mut input = Bytes::from_static(b"abc");
        buffered.transform(&mut input, false).unwrap();
        assert!(input.is_empty());
        assert_eq!(buffered.tail_len(), 3);
    }
}
