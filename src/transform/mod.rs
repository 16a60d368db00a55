//! Transform stages and block-size wrappers.
//!
//! A stage receives a view of input units and an end flag and returns:
//!
//! - `Ok(None)` - nothing produced yet, more input needed; the chain stops for this block
//! - `Ok(Some(out))` - output for the next stage (possibly empty)
//! - `Err(e)` - the run is aborted
//!
//! A stage consumes input by advancing the view's cursor. Units left in the
//! view are discarded unless the stage is wrapped in [`Buffered`].
//!
//! Wrappers normalize what the wrapped stage sees:
//!
//! - [`FixedSize`] - exact blocks of `size` units, short block only on the final call
//! - [`RoundingSize`] - one multiple of `size` units per call
//! - [`Buffered`] - unconsumed units are carried into the next call

mod buffered;
mod chain;
#[cfg(feature = "hash-blake3")]
mod digest;
mod sized;

pub use buffered::Buffered;
pub use chain::Chain;
#[cfg(feature = "hash-blake3")]
pub use digest::DigestStage;
pub use sized::{FixedSize, RoundingSize};

use std::fmt;

use crate::block::Block;
use crate::error::TransformError;

/// A stateful transformation stage.
///
/// `end` is true on the final call of a run; a stage must flush any state it
/// holds when it sees it.
pub trait Transform<B: Block> {
    /// Transforms `data`, consuming the units it uses.
    fn transform(&mut self, data: &mut B, end: bool) -> Result<Option<B>, TransformError>;
}

impl<B: Block, T: Transform<B> + ?Sized> Transform<B> for &mut T {
    fn transform(&mut self, data: &mut B, end: bool) -> Result<Option<B>, TransformError> {
        (**self).transform(data, end)
    }
}

impl<B: Block, T: Transform<B> + ?Sized> Transform<B> for Box<T> {
    fn transform(&mut self, data: &mut B, end: bool) -> Result<Option<B>, TransformError> {
        (**self).transform(data, end)
    }
}

/// Creates a stage from a closure.
///
/// # Example
///
/// ```
/// use bytes::Bytes;
/// use segrs::{Block, Transform, transform};
///
/// let mut upper = transform::from_fn(|data: &mut Bytes, _end| {
///     let out = data.take_all().to_ascii_uppercase();
///     Ok(Some(Bytes::from(out)))
/// });
///
/// let out = upper.transform(&mut Bytes::from_static(b"abc"), true).unwrap();
/// assert_eq!(out.unwrap(), "ABC");
/// ```
pub fn from_fn<B, F>(f: F) -> FnTransform<F>
where
    B: Block,
    F: FnMut(&mut B, bool) -> Result<Option<B>, TransformError>,
{
    FnTransform { f }
}

/// A stage backed by a closure. See [`from_fn`].
pub struct FnTransform<F> {
    f: F,
}

impl<B, F> Transform<B> for FnTransform<F>
where
    B: Block,
    F: FnMut(&mut B, bool) -> Result<Option<B>, TransformError>,
{
    fn transform(&mut self, data: &mut B, end: bool) -> Result<Option<B>, TransformError> {
        (self.f)(data, end)
    }
}

impl<F> fmt::Debug for FnTransform<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnTransform").finish_non_exhaustive()
    }
}

/// A stage returning its input unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl<B: Block> Transform<B> for Identity {
    fn transform(&mut self, data: &mut B, _end: bool) -> Result<Option<B>, TransformError> {
        Ok(Some(data.take_all()))
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::CharBlock;
    use bytes::Bytes;

    #[test]
    fn test_identity() {
        let mut data = Bytes::from_static(b"same");
        let out = Identity.transform(&mut data, false).unwrap();
        assert_eq!(out.unwrap().as_ref(), b"same");
        assert!(data.is_empty());
    }

    #[test]
    fn test_from_fn_none_and_error() {
        let mut calls = 0;
        let mut stage = from_fn(|data: &mut CharBlock, end| {
            calls += 1;
            if data.len() > 3 {
                return Err("too long".into());
            }
            Ok(end.then(|| data.take_all()))
        });

        assert!(stage.transform(&mut CharBlock::from_str("ab"), false).unwrap().is_none());
        assert_eq!(
            stage.transform(&mut CharBlock::from_str("cd"), true).unwrap().unwrap(),
            "cd"
        );
        assert!(stage.transform(&mut CharBlock::from_str("long"), true).is_err());
        drop(stage);
        assert_eq!(calls, 3);
    }

    #[test]
    fn test_borrowed_stage_keeps_state() {
        let mut recorder = recording::Recorder::<u8>::default();
        {
            let mut borrowed: Box<dyn Transform<Bytes> + '_> = Box::new(&mut recorder);
            borrowed.transform(&mut Bytes::from_static(b"x"), true).unwrap();
        }
        assert_eq!(recorder.calls, vec![(b"x".to_vec(), true)]);
    }
}
