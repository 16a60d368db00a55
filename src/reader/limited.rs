//! Size-limited reader decorator.

use std::cmp;

use super::SegmentRead;
use crate::error::SegError;
use crate::segment::Segment;

/// A reader delivering at most a fixed number of units from an inner reader.
///
/// Once the budget is used up every read reports `end == true`, whether or
/// not the inner reader has more data.
///
/// # Example
///
/// ```
/// use segrs::{ByteReader, SegmentRead};
///
/// let mut reader = ByteReader::from_bytes(&b"0123456789"[..]).limit(4);
/// let segment = reader.read_segment(100)?;
/// assert_eq!(segment.data().as_ref(), b"0123");
/// assert!(segment.end());
/// # Ok::<(), segrs::SegError>(())
/// ```
#[derive(Debug)]
pub struct Limited<R> {
    inner: R,
    limit: u64,
    remaining: u64,
    mark: Option<u64>,
}

impl<R: SegmentRead> Limited<R> {
    /// Wraps `inner` with a budget of `limit` units.
    pub fn new(inner: R, limit: u64) -> Self {
        Self {
            inner,
            limit,
            remaining: limit,
            mark: None,
        }
    }

    /// Returns the number of units still allowed.
    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    /// Returns the inner reader.
    pub fn into_inner(self) -> R {
        self.inner
    }

    fn cap(&self, size: u64) -> u64 {
        cmp::min(size, self.remaining)
    }
}

impl<R: SegmentRead> SegmentRead for Limited<R> {
    type Block = R::Block;

    fn read_segment_with(
        &mut self,
        size: usize,
        end_on_zero_read: bool,
    ) -> Result<Segment<R::Block>, SegError> {
        if self.remaining == 0 {
            return Ok(Segment::empty(true));
        }
        let want = self.cap(size as u64) as usize;
        let segment = self.inner.read_segment_with(want, end_on_zero_read)?;
        self.remaining -= segment.len() as u64;
        let end = segment.end() || self.remaining == 0;
        Ok(segment.with_end(end))
    }

    fn skip_units_with(&mut self, size: u64, end_on_zero_read: bool) -> Result<u64, SegError> {
        let skipped = self
            .inner
            .skip_units_with(self.cap(size), end_on_zero_read)?;
        self.remaining -= skipped;
        Ok(skipped)
    }

    fn mark_supported(&self) -> bool {
        self.inner.mark_supported()
    }

    fn mark(&mut self) -> Result<(), SegError> {
        self.inner.mark()?;
        self.mark = Some(self.remaining);
        Ok(())
    }

    fn reset(&mut self) -> Result<(), SegError> {
        self.inner.reset()?;
        // Without a mark the inner reader rewinds to its start.
        self.remaining = self.mark.unwrap_or(self.limit);
        Ok(())
    }

    fn close(&mut self) -> Result<(), SegError> {
        self.inner.close()
    }
}
