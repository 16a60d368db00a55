//! The Segment type - the result of one read operation.

use std::fmt;

use bytes::Bytes;

use crate::block::{Block, CharBlock};

/// A block of data read from a source, with an end-of-input flag.
///
/// `end == true` means the source has no data after this segment. The data
/// may be empty, including on the final segment.
///
/// Segments read from array-backed sources share storage with the source.
/// [`Clone`] is a deep copy: the clone owns fresh storage and is unaffected
/// by anything done to the original or its source.
///
/// # Example
///
/// ```
/// use segrs::ByteSegment;
/// use bytes::Bytes;
///
/// let mut segment = ByteSegment::new(Bytes::from_static(b"hello"), true);
/// assert_eq!(segment.copy_vec(), b"hello");
/// assert_eq!(segment.to_vec(), b"hello");
/// assert!(segment.is_empty());
/// assert!(segment.end());
/// ```
pub struct Segment<B> {
    data: B,
    end: bool,
}

/// A segment of bytes.
pub type ByteSegment = Segment<Bytes>;

/// A segment of chars.
pub type CharSegment = Segment<CharBlock>;

impl<B: Block> Segment<B> {
    /// Creates a segment.
    pub fn new(data: B, end: bool) -> Self {
        Self { data, end }
    }

    /// Creates an empty segment.
    pub fn empty(end: bool) -> Self {
        Self {
            data: B::empty(),
            end,
        }
    }

    /// Returns the remaining data.
    pub fn data(&self) -> &B {
        &self.data
    }

    /// Returns the remaining data for consumption.
    pub fn data_mut(&mut self) -> &mut B {
        &mut self.data
    }

    /// Returns true if no data follows this segment.
    pub fn end(&self) -> bool {
        self.end
    }

    /// Returns a segment with the same data and the given end flag.
    pub fn with_end(mut self, end: bool) -> Self {
        self.end = end;
        self
    }

    /// Returns the number of remaining units.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if no units remain.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Consumes the remaining units into a new vector.
    pub fn to_vec(&mut self) -> Vec<B::Unit> {
        self.data.take_all().units().to_vec()
    }

    /// Copies the remaining units into a new vector, leaving the cursor as is.
    pub fn copy_vec(&self) -> Vec<B::Unit> {
        self.data.units().to_vec()
    }

    /// Consumes the segment and returns the data.
    pub fn into_data(self) -> B {
        self.data
    }

    /// Splits the segment into (data, end).
    pub fn into_parts(self) -> (B, bool) {
        (self.data, self.end)
    }
}

impl<B: Block> Clone for Segment<B> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.detached(),
            end: self.end,
        }
    }
}

impl<B: Block> fmt::Debug for Segment<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Segment")
            .field("len", &self.data.len())
            .field("end", &self.end)
            .finish()
    }
}

impl<B: Block> fmt::Display for Segment<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Segment({} units", self.len())?;
        if self.end {
            write!(f, ", end")?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let segment = ByteSegment::new(Bytes::from_static(b"hello"), false);
        assert_eq!(segment.len(), 5);
        assert!(!segment.is_empty());
        assert!(!segment.end());
    }

    #[test]
    fn test_empty() {
        let segment = CharSegment::empty(true);
        assert!(segment.is_empty());
        assert!(segment.end());
    }

    #[test]
    fn test_to_vec_consumes() {
        let mut segment = ByteSegment::new(Bytes::from_static(b"abc"), false);
        assert_eq!(segment.to_vec(), b"abc");
        assert!(segment.is_empty());
        assert!(segment.to_vec().is_empty());
    }

    #[test]
    fn test_copy_vec_keeps_cursor() {
        let segment = CharSegment::new(CharBlock::from_str("xyz"), true);
        assert_eq!(segment.copy_vec(), vec!['x', 'y', 'z']);
        assert_eq!(segment.len(), 3);
    }

    #[test]
    fn test_clone_is_deep() {
        let source = Bytes::from(b"shared".to_vec());
        let segment = ByteSegment::new(source.slice(1..), true);
        let copy = segment.clone();

        assert_eq!(copy.data(), segment.data());
        assert!(copy.end());
        assert_ne!(copy.data().as_ptr(), segment.data().as_ptr());
    }

    #[test]
    fn test_with_end() {
        let segment = ByteSegment::new(Bytes::from_static(b"a"), false).with_end(true);
        assert!(segment.end());
        assert_eq!(segment.len(), 1);
    }

    #[test]
    fn test_display() {
        let segment = ByteSegment::new(Bytes::from_static(b"hello"), true);
        let s = format!("{}", segment);
        assert!(s.contains("5 units"));
        assert!(s.contains("end"));
    }
}
