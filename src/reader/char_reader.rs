//! Char reader over char arrays, iterators and decoded bytes.

use std::fmt;
use std::io::Read;
use std::iter::Peekable;

use bytes::Bytes;
use encoding_rs::Encoding;

use super::array::ArraySource;
use super::codec::{BytesToChars, Transcoded};
use super::{ByteReader, SegmentRead};
use crate::block::{Block, CharBlock};
use crate::error::{SegError, check_bounds};
use crate::segment::CharSegment;

type CharIter<'a> = Peekable<Box<dyn Iterator<Item = char> + 'a>>;

enum CharSource<'a> {
    Array(ArraySource<CharBlock>),
    Iter(Option<CharIter<'a>>),
    Decoded(Box<Transcoded<'a, BytesToChars>>),
}

/// A char reader.
///
/// # Example
///
/// ```
/// use segrs::{CharReader, SegmentRead};
///
/// let mut reader = CharReader::from_str("héllo wörld");
/// let segment = reader.read_segment(5)?;
/// assert_eq!(segment.data().to_string(), "héllo");
/// # Ok::<(), segrs::SegError>(())
/// ```
pub struct CharReader<'a> {
    source: CharSource<'a>,
}

impl<'a> CharReader<'a> {
    /// Creates a reader over a block of chars.
    pub fn from_block(block: CharBlock) -> Self {
        Self {
            source: CharSource::Array(ArraySource::new(block)),
        }
    }

    /// Creates a reader over owned chars.
    pub fn from_chars(chars: Vec<char>) -> Self {
        Self::from_block(CharBlock::new(chars))
    }

    /// Creates a reader over the chars of a string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Self {
        Self::from_block(CharBlock::from_str(s))
    }

    /// Creates a reader over `length` chars of `block` starting at `offset`.
    ///
    /// # Errors
    ///
    /// Returns [`SegError::OutOfBounds`] if the window does not fit `block`.
    pub fn from_slice(block: CharBlock, offset: usize, length: usize) -> Result<Self, SegError> {
        check_bounds(offset, length, block.len())?;
        Ok(Self::from_block(block.slice(offset..offset + length)))
    }

    /// Creates a reader pulling chars from an iterator.
    pub fn from_char_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = char>,
        I::IntoIter: 'a,
    {
        let boxed: Box<dyn Iterator<Item = char> + 'a> = Box::new(iter.into_iter().fuse());
        Self {
            source: CharSource::Iter(Some(boxed.peekable())),
        }
    }

    /// Creates a reader producing the bytes of `reader` decoded with `encoding`.
    pub fn decode<R>(reader: R, encoding: &'static Encoding) -> Self
    where
        R: SegmentRead<Block = Bytes> + 'a,
    {
        let transcoded = Transcoded::new(Box::new(reader), BytesToChars::new(encoding));
        Self {
            source: CharSource::Decoded(Box::new(transcoded)),
        }
    }

    /// Creates a reader decoding an `io::Read` with `encoding`.
    pub fn from_read<R: Read + 'a>(reader: R, encoding: &'static Encoding) -> Self {
        Self::decode(ByteReader::from_read(reader), encoding)
    }
}

impl SegmentRead for CharReader<'_> {
    type Block = CharBlock;

    fn read_segment_with(
        &mut self,
        size: usize,
        end_on_zero_read: bool,
    ) -> Result<CharSegment, SegError> {
        match &mut self.source {
            CharSource::Array(array) => Ok(array.read(size)),
            CharSource::Iter(iter) => {
                let iter = iter.as_mut().ok_or(SegError::Closed)?;
                if size == 0 {
                    return Ok(CharSegment::empty(false));
                }
                let chars: Vec<char> = iter.by_ref().take(size).collect();
                let end = iter.peek().is_none();
                Ok(CharSegment::new(CharBlock::new(chars), end))
            }
            CharSource::Decoded(decoded) => decoded.read(size, end_on_zero_read),
        }
    }

    fn skip_units_with(&mut self, size: u64, end_on_zero_read: bool) -> Result<u64, SegError> {
        match &mut self.source {
            CharSource::Array(array) => Ok(array.skip(size)),
            CharSource::Iter(iter) => {
                let iter = iter.as_mut().ok_or(SegError::Closed)?;
                let mut skipped = 0u64;
                while skipped < size && iter.next().is_some() {
                    skipped += 1;
                }
                Ok(skipped)
            }
            CharSource::Decoded(decoded) => decoded.skip(size, end_on_zero_read),
        }
    }

    fn mark_supported(&self) -> bool {
        matches!(self.source, CharSource::Array(_))
    }

    fn mark(&mut self) -> Result<(), SegError> {
        match &mut self.source {
            CharSource::Array(array) => {
                array.mark();
                Ok(())
            }
            _ => Err(SegError::unsupported("mark")),
        }
    }

    fn reset(&mut self) -> Result<(), SegError> {
        match &mut self.source {
            CharSource::Array(array) => {
                array.reset();
                Ok(())
            }
            _ => Err(SegError::unsupported("reset")),
        }
    }

    fn close(&mut self) -> Result<(), SegError> {
        match &mut self.source {
            CharSource::Array(_) => Ok(()),
            CharSource::Iter(iter) => {
                iter.take();
                Ok(())
            }
            CharSource::Decoded(decoded) => decoded.close(),
        }
    }
}

impl fmt::Debug for CharReader<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.source {
            CharSource::Array(_) => "array",
            CharSource::Iter(_) => "iter",
            CharSource::Decoded(_) => "decoded",
        };
        f.debug_struct("CharReader").field("source", &kind).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::{UTF_16LE, UTF_8};

    #[test]
    fn test_array_segments() {
        let mut reader = CharReader::from_str("0123456789");
        let a = reader.read_segment(4).unwrap();
        let b = reader.read_segment(4).unwrap();
        let c = reader.read_segment(4).unwrap();
        assert_eq!((a.len(), a.end()), (4, false));
        assert_eq!((b.len(), b.end()), (4, false));
        assert_eq!(*c.data(), "89");
        assert!(c.end());
    }

    #[test]
    fn test_from_slice() {
        let block = CharBlock::from_str("abcdef");
        let mut reader = CharReader::from_slice(block.clone(), 1, 3).unwrap();
        assert_eq!(*reader.read_segment(10).unwrap().data(), "bcd");
        assert!(CharReader::from_slice(block, 4, 3).is_err());
    }

    #[test]
    fn test_mark_reset() {
        let mut reader = CharReader::from_chars(vec!['a', 'b', 'c', 'd']);
        reader.read_segment(1).unwrap();
        reader.mark().unwrap();
        reader.read_segment(2).unwrap();
        reader.reset().unwrap();
        assert_eq!(*reader.read_segment(10).unwrap().data(), "bcd");
    }

    #[test]
    fn test_iter_source_detects_end() {
        let mut reader = CharReader::from_char_iter("abcd".chars());
        let segment = reader.read_segment(4).unwrap();
        assert_eq!(*segment.data(), "abcd");
        assert!(segment.end());
    }

    #[test]
    fn test_iter_source_zero_size_leaves_source_alone() {
        use std::cell::Cell;

        let pulled = Cell::new(0);
        let mut reader = CharReader::from_char_iter(std::iter::from_fn(|| {
            pulled.set(pulled.get() + 1);
            Some('x')
        }));

        let segment = reader.read_segment(0).unwrap();
        assert!(segment.is_empty());
        assert!(!segment.end());
        assert_eq!(pulled.get(), 0);
    }

    #[test]
    fn test_iter_source_skip_and_close() {
        let mut reader = CharReader::from_char_iter(('a'..='z').cycle().take(30));
        assert_eq!(reader.skip_units(26).unwrap(), 26);
        let segment = reader.read_segment(2).unwrap();
        assert_eq!(*segment.data(), "ab");
        assert!(!segment.end());
        assert!(!reader.mark_supported());

        reader.close().unwrap();
        assert!(matches!(reader.read_segment(1), Err(SegError::Closed)));
    }

    #[test]
    fn test_decode_multibyte_across_segments() {
        let text = "aé€😀".repeat(50);
        let bytes = ByteReader::from_bytes(text.clone().into_bytes());
        let mut reader = CharReader::decode(bytes, UTF_8);

        let mut out = String::new();
        loop {
            let segment = reader.read_segment(7).unwrap();
            assert!(segment.len() <= 7);
            out.push_str(&segment.data().to_string());
            if segment.end() {
                break;
            }
        }
        assert_eq!(out, text);
    }

    #[test]
    fn test_from_read_utf16() {
        let wide: Vec<u8> = "hi".encode_utf16().flat_map(|u| u.to_le_bytes()).collect();

        let mut reader = CharReader::from_read(&wide[..], UTF_16LE);
        let segment = reader.read_segment(10).unwrap();
        assert_eq!(*segment.data(), "hi");
        assert!(segment.end());
    }
}
