//! The CharBlock type - a shared, sliceable view of chars.

use std::fmt;
use std::ops::{Bound, RangeBounds};
use std::sync::{Arc, LazyLock};

use super::Block;

/// Storage shared by every empty block.
static EMPTY: LazyLock<Arc<[char]>> = LazyLock::new(|| Arc::from(Vec::new()));

/// A window over shared char storage.
///
/// Cloning a `CharBlock` is cheap and shares storage, like [`bytes::Bytes`].
///
/// # Example
///
/// ```
/// use segrs::{Block, CharBlock};
///
/// let mut block = CharBlock::from_str("hello world");
/// let head = block.split_to(5);
///
/// assert_eq!(head, "hello");
/// assert_eq!(block, " world");
/// ```
#[derive(Clone)]
pub struct CharBlock {
    buf: Arc<[char]>,
    start: usize,
    end: usize,
}

impl CharBlock {
    /// Creates a block owning the given chars.
    pub fn new(chars: Vec<char>) -> Self {
        let end = chars.len();
        Self {
            buf: Arc::from(chars),
            start: 0,
            end,
        }
    }

    /// Creates a block holding the chars of a string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Self {
        Self::new(s.chars().collect())
    }

    /// Returns the remaining chars.
    pub fn as_slice(&self) -> &[char] {
        &self.buf[self.start..self.end]
    }

    /// Returns a sub-view of the remaining chars sharing storage.
    ///
    /// # Panics
    ///
    /// Panics if the range is out of bounds.
    pub fn slice(&self, range: impl RangeBounds<usize>) -> Self {
        let len = self.end - self.start;
        let from = match range.start_bound() {
            Bound::Included(&n) => n,
            Bound::Excluded(&n) => n + 1,
            Bound::Unbounded => 0,
        };
        let to = match range.end_bound() {
            Bound::Included(&n) => n + 1,
            Bound::Excluded(&n) => n,
            Bound::Unbounded => len,
        };
        assert!(
            from <= to && to <= len,
            "range {}..{} out of bounds for length {}",
            from,
            to,
            len
        );
        Self {
            buf: Arc::clone(&self.buf),
            start: self.start + from,
            end: self.start + to,
        }
    }
}

impl Block for CharBlock {
    type Unit = char;

    fn empty() -> Self {
        Self {
            buf: Arc::clone(&EMPTY),
            start: 0,
            end: 0,
        }
    }

    fn len(&self) -> usize {
        self.end - self.start
    }

    fn units(&self) -> &[char] {
        self.as_slice()
    }

    fn advance(&mut self, n: usize) {
        assert!(n <= self.len(), "cannot advance past the end of a CharBlock");
        self.start += n;
    }

    fn split_to(&mut self, n: usize) -> Self {
        let head = self.slice(..n);
        self.start += n;
        head
    }

    fn from_vec(units: Vec<char>) -> Self {
        Self::new(units)
    }

    fn copy_from(units: &[char]) -> Self {
        Self::new(units.to_vec())
    }
}

impl From<Vec<char>> for CharBlock {
    fn from(chars: Vec<char>) -> Self {
        Self::new(chars)
    }
}

impl From<&str> for CharBlock {
    fn from(s: &str) -> Self {
        Self::from_str(s)
    }
}

impl PartialEq for CharBlock {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl Eq for CharBlock {}

impl PartialEq<[char]> for CharBlock {
    fn eq(&self, other: &[char]) -> bool {
        self.as_slice() == other
    }
}

impl PartialEq<&str> for CharBlock {
    fn eq(&self, other: &&str) -> bool {
        self.as_slice().iter().copied().eq(other.chars())
    }
}

impl fmt::Display for CharBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in self.as_slice() {
            fmt::Write::write_char(f, *c)?;
        }
        Ok(())
    }
}

impl fmt::Debug for CharBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CharBlock")
            .field("len", &self.len())
            .field("text", &self.to_string())
            .finish()
    }
}
