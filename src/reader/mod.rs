//! Pull-based segment readers.
//!
//! A reader hands out the next [`Segment`] on request, consuming up to the
//! requested number of units from its source:
//!
//! - [`ByteReader`] - bytes from an `io::Read`, a `Bytes` window, a `Buf`, or encoded chars
//! - [`CharReader`] - chars from a char array, a char iterator, or decoded bytes
//! - [`Limited`] - caps the total number of units delivered by any reader
//!
//! All of them implement [`SegmentRead`].

mod array;
mod byte_reader;
mod char_reader;
mod codec;
mod limited;

pub use byte_reader::ByteReader;
pub use char_reader::CharReader;
pub use limited::Limited;

use crate::block::Block;
use crate::config::DEFAULT_BLOCK_SIZE;
use crate::error::SegError;
use crate::segment::Segment;
use crate::sink::Sink;

/// A forward-only source of segments.
///
/// `read_segment(size)` reads continuously until `size` units are gathered or
/// the source is exhausted. A short underlying read is never taken as end of
/// input on its own. Reading never fails to produce a segment: an exhausted
/// source yields empty segments with `end == true`.
///
/// # Example
///
/// ```
/// use segrs::{ByteReader, SegmentRead};
///
/// let mut reader = ByteReader::from_bytes(&b"hello world"[..]);
/// let first = reader.read_segment(5)?;
/// assert_eq!(first.data().as_ref(), b"hello");
/// assert!(!first.end());
///
/// let rest = reader.read_segment(100)?;
/// assert_eq!(rest.data().as_ref(), b" world");
/// assert!(rest.end());
/// # Ok::<(), segrs::SegError>(())
/// ```
pub trait SegmentRead {
    /// The view type of the segments produced.
    type Block: Block;

    /// Reads up to `size` units.
    ///
    /// With `end_on_zero_read` set, an underlying read that yields no data
    /// (a non-blocking source with nothing ready) ends the segment with
    /// `end == true` instead of being retried.
    ///
    /// `size == 0` returns an empty segment carrying the source's current end
    /// state without touching the source.
    fn read_segment_with(
        &mut self,
        size: usize,
        end_on_zero_read: bool,
    ) -> Result<Segment<Self::Block>, SegError>;

    /// Reads up to `size` units, retrying zero-length reads.
    fn read_segment(&mut self, size: usize) -> Result<Segment<Self::Block>, SegError> {
        self.read_segment_with(size, false)
    }

    /// Skips up to `size` units and returns the number skipped.
    fn skip_units_with(&mut self, size: u64, end_on_zero_read: bool) -> Result<u64, SegError>;

    /// Skips up to `size` units, retrying zero-length reads.
    fn skip_units(&mut self, size: u64) -> Result<u64, SegError> {
        self.skip_units_with(size, false)
    }

    /// Returns true if [`mark`](Self::mark) and [`reset`](Self::reset) are supported.
    fn mark_supported(&self) -> bool {
        false
    }

    /// Remembers the current position.
    fn mark(&mut self) -> Result<(), SegError> {
        Err(SegError::unsupported("mark"))
    }

    /// Returns to the last marked position.
    fn reset(&mut self) -> Result<(), SegError> {
        Err(SegError::unsupported("reset"))
    }

    /// Releases the source.
    fn close(&mut self) -> Result<(), SegError>;

    /// Wraps this reader so it delivers at most `limit` units in total.
    fn limit(self, limit: u64) -> Limited<Self>
    where
        Self: Sized,
    {
        Limited::new(self, limit)
    }

    /// Drains the reader into `sink`.
    ///
    /// Returns the number of units read, or `None` if the source was already
    /// exhausted.
    fn read_to<S: Sink<Self::Block>>(&mut self, mut sink: S) -> Result<Option<u64>, SegError>
    where
        Self: Sized,
    {
        let mut count = 0u64;
        loop {
            let (mut data, end) = self.read_segment(DEFAULT_BLOCK_SIZE)?.into_parts();
            count += data.len() as u64;
            if !data.is_empty() {
                sink.write_block(&mut data)?;
            }
            if end {
                break;
            }
        }
        Ok((count > 0).then_some(count))
    }
}

impl<R: SegmentRead + ?Sized> SegmentRead for &mut R {
    type Block = R::Block;

    fn read_segment_with(
        &mut self,
        size: usize,
        end_on_zero_read: bool,
    ) -> Result<Segment<R::Block>, SegError> {
        (**self).read_segment_with(size, end_on_zero_read)
    }

    fn skip_units_with(&mut self, size: u64, end_on_zero_read: bool) -> Result<u64, SegError> {
        (**self).skip_units_with(size, end_on_zero_read)
    }

    fn mark_supported(&self) -> bool {
        (**self).mark_supported()
    }

    fn mark(&mut self) -> Result<(), SegError> {
        (**self).mark()
    }

    fn reset(&mut self) -> Result<(), SegError> {
        (**self).reset()
    }

    fn close(&mut self) -> Result<(), SegError> {
        (**self).close()
    }
}

impl<R: SegmentRead + ?Sized> SegmentRead for Box<R> {
    type Block = R::Block;

    fn read_segment_with(
        &mut self,
        size: usize,
        end_on_zero_read: bool,
    ) -> Result<Segment<R::Block>, SegError> {
        (**self).read_segment_with(size, end_on_zero_read)
    }

    fn skip_units_with(&mut self, size: u64, end_on_zero_read: bool) -> Result<u64, SegError> {
        (**self).skip_units_with(size, end_on_zero_read)
    }

    fn mark_supported(&self) -> bool {
        (**self).mark_supported()
    }

    fn mark(&mut self) -> Result<(), SegError> {
        (**self).mark()
    }

    fn reset(&mut self) -> Result<(), SegError> {
        (**self).reset()
    }

    fn close(&mut self) -> Result<(), SegError> {
        (**self).close()
    }
}
