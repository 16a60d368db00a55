//! Size-normalizing wrappers.

use std::cmp;
use std::fmt;

use super::Transform;
use crate::block::{Block, concat};
use crate::error::{SegError, TransformError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// One call per `size` units.
    Fixed,
    /// One call per largest multiple of `size` units.
    Rounding,
}

/// Results gathered from the dispatches of one wrapper call.
struct Collected<B> {
    parts: Vec<B>,
    dispatched: bool,
}

impl<B: Block> Collected<B> {
    fn new() -> Self {
        Self {
            parts: Vec::new(),
            dispatched: false,
        }
    }

    fn dispatch<T: Transform<B>>(
        &mut self,
        stage: &mut T,
        mut block: B,
        end: bool,
    ) -> Result<(), TransformError> {
        self.dispatched = true;
        if let Some(out) = stage.transform(&mut block, end)? {
            self.parts.push(out);
        }
        Ok(())
    }

    fn finish(self) -> Option<B> {
        if self.parts.is_empty() {
            None
        } else {
            Some(concat(self.parts))
        }
    }
}

/// Shared residual-buffer state of [`FixedSize`] and [`RoundingSize`].
///
/// The residual holds fewer than `size` units between calls.
struct Normalizer<B: Block, T> {
    stage: T,
    size: usize,
    residual: Vec<B::Unit>,
    mode: Mode,
}

impl<B: Block, T: Transform<B>> Normalizer<B, T> {
    fn new(stage: T, size: usize, mode: Mode) -> Result<Self, SegError> {
        if size == 0 {
            return Err(SegError::invalid("stage block size must be non-zero"));
        }
        Ok(Self {
            stage,
            size,
            residual: Vec::with_capacity(size),
            mode,
        })
    }

    fn take_residual(&mut self) -> B {
        let block = B::copy_from(&self.residual);
        self.residual.clear();
        block
    }

    fn run(&mut self, data: &mut B, end: bool) -> Result<Option<B>, TransformError> {
        let mut out = Collected::new();

        // Top off the residual first.
        if !self.residual.is_empty() {
            let take = cmp::min(self.size - self.residual.len(), data.len());
            self.residual.extend_from_slice(&data.units()[..take]);
            data.advance(take);

            if self.residual.len() < self.size {
                if !end {
                    return Ok(None);
                }
                let mut block = self.take_residual();
                return self.stage.transform(&mut block, true);
            }

            let last = end && data.is_empty();
            let block = self.take_residual();
            out.dispatch(&mut self.stage, block, last)?;
            if last {
                return Ok(out.finish());
            }
        }

        match self.mode {
            Mode::Fixed => {
                while data.len() >= self.size {
                    let block = data.split_to(self.size);
                    let last = end && data.is_empty();
                    out.dispatch(&mut self.stage, block, last)?;
                    if last {
                        return Ok(out.finish());
                    }
                }
            }
            Mode::Rounding => {
                let n = data.len() / self.size * self.size;
                if n > 0 {
                    let block = data.split_to(n);
                    let last = end && data.is_empty();
                    out.dispatch(&mut self.stage, block, last)?;
                    if last {
                        return Ok(out.finish());
                    }
                }
            }
        }

        if !data.is_empty() {
            self.residual.extend_from_slice(data.units());
            let rest = data.len();
            data.advance(rest);
            if end {
                let block = self.take_residual();
                out.dispatch(&mut self.stage, block, true)?;
                return Ok(out.finish());
            }
        }

        if end && !out.dispatched {
            out.dispatch(&mut self.stage, B::empty(), true)?;
        }
        Ok(out.finish())
    }
}

macro_rules! size_wrapper {
    ($(#[$doc:meta])* $name:ident, $mode:expr) => {
        $(#[$doc])*
        pub struct $name<B: Block, T> {
            inner: Normalizer<B, T>,
        }

        impl<B: Block, T: Transform<B>> $name<B, T> {
            /// Wraps `stage` with the given block size.
            ///
            /// # Errors
            ///
            /// Returns [`SegError::InvalidConfig`] if `size` is zero.
            pub fn new(stage: T, size: usize) -> Result<Self, SegError> {
                Ok(Self {
                    inner: Normalizer::new(stage, size, $mode)?,
                })
            }

            /// Returns the block size.
            pub fn size(&self) -> usize {
                self.inner.size
            }

            /// Returns the number of units held back for the next call.
            pub fn residual_len(&self) -> usize {
                self.inner.residual.len()
            }

            /// Returns a reference to the wrapped stage.
            pub fn get_ref(&self) -> &T {
                &self.inner.stage
            }

            /// Returns the wrapped stage, dropping any residual.
            pub fn into_inner(self) -> T {
                self.inner.stage
            }
        }

        impl<B: Block, T: Transform<B>> Transform<B> for $name<B, T> {
            fn transform(&mut self, data: &mut B, end: bool) -> Result<Option<B>, TransformError> {
                self.inner.run(data, end)
            }
        }

        impl<B: Block, T> fmt::Debug for $name<B, T> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_struct(stringify!($name))
                    .field("size", &self.inner.size)
                    .field("residual", &self.inner.residual.len())
                    .finish()
            }
        }
    };
}

size_wrapper!(
    /// Feeds the wrapped stage blocks of exactly `size` units.
    ///
    /// Only the final call (`end == true`) may carry fewer units. Results of
    /// all dispatches made during one call are concatenated in order.
    ///
    /// # Example
    ///
    /// ```
    /// use bytes::Bytes;
    /// use segrs::{Block, FixedSize, Transform, transform};
    ///
    /// let mut seen = Vec::new();
    /// let stage = transform::from_fn(|data: &mut Bytes, end| {
    ///     seen.push((data.len(), end));
    ///     Ok(Some(data.take_all()))
    /// });
    /// let mut fixed = FixedSize::new(stage, 4)?;
    ///
    /// let out = fixed.transform(&mut Bytes::from_static(b"0123456789"), true).unwrap();
    /// assert_eq!(out.unwrap().len(), 10);
    /// drop(fixed);
    /// assert_eq!(seen, vec![(4, false), (4, false), (2, true)]);
    /// # Ok::<(), segrs::SegError>(())
    /// ```
    FixedSize,
    Mode::Fixed
);

size_wrapper!(
    /// Feeds the wrapped stage the largest multiple of `size` units available.
    ///
    /// Same residual handling as [`FixedSize`], with one call per input
    /// instead of one per block.
    RoundingSize,
    Mode::Rounding
);
