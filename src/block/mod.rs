//! Cursor-based views over unit storage.
//!
//! A [`Block`] is a window of units (bytes or chars) with a read cursor.
//! Consuming units advances the cursor; `split_to` detaches a prefix without
//! copying. Two implementations exist:
//!
//! - [`bytes::Bytes`] - byte views, reference counted and sliceable
//! - [`CharBlock`] - char views over shared `Arc<[char]>` storage
//!
//! Views handed out by array-backed readers share storage with their source.
//! Use [`Block::detached`] when an independent copy is needed.

mod chars;

pub use chars::CharBlock;

use std::fmt;

use bytes::{Buf, Bytes};

/// A contiguous view of units with an independent read cursor.
pub trait Block: Sized + fmt::Debug + 'static {
    /// The unit type (`u8` or `char`).
    type Unit: Copy + Default + PartialEq + fmt::Debug + 'static;

    /// Returns an empty view.
    fn empty() -> Self;

    /// Returns the number of remaining units.
    fn len(&self) -> usize;

    /// Returns true if no units remain.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the remaining units.
    fn units(&self) -> &[Self::Unit];

    /// Consumes `n` units.
    ///
    /// # Panics
    ///
    /// Panics if `n > self.len()`.
    fn advance(&mut self, n: usize);

    /// Detaches the first `n` remaining units into a new view sharing storage.
    ///
    /// # Panics
    ///
    /// Panics if `n > self.len()`.
    fn split_to(&mut self, n: usize) -> Self;

    /// Detaches all remaining units, leaving this view empty.
    fn take_all(&mut self) -> Self {
        let n = self.len();
        self.split_to(n)
    }

    /// Creates a view owning the given units.
    fn from_vec(units: Vec<Self::Unit>) -> Self;

    /// Creates a view over a fresh copy of the given units.
    fn copy_from(units: &[Self::Unit]) -> Self;

    /// Returns a copy of the remaining units backed by fresh storage.
    fn detached(&self) -> Self {
        Self::copy_from(self.units())
    }
}

impl Block for Bytes {
    type Unit = u8;

    fn empty() -> Self {
        Bytes::new()
    }

    fn len(&self) -> usize {
        Bytes::len(self)
    }

    fn units(&self) -> &[u8] {
        self.as_ref()
    }

    fn advance(&mut self, n: usize) {
        Buf::advance(self, n);
    }

    fn split_to(&mut self, n: usize) -> Self {
        Bytes::split_to(self, n)
    }

    fn from_vec(units: Vec<u8>) -> Self {
        Bytes::from(units)
    }

    fn copy_from(units: &[u8]) -> Self {
        Bytes::copy_from_slice(units)
    }
}

/// Concatenates views in order.
///
/// A single part is returned as is, without copying.
pub(crate) fn concat<B: Block>(mut parts: Vec<B>) -> B {
    match parts.len() {
        0 => B::empty(),
        1 => parts.pop().unwrap_or_else(B::empty),
        _ => {
            let total = parts.iter().map(Block::len).sum();
            let mut joined = Vec::with_capacity(total);
            for part in &parts {
                joined.extend_from_slice(part.units());
            }
            B::from_vec(joined)
        }
    }
}
