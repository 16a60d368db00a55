//! Array-backed source shared by the byte and char readers.

use crate::block::Block;
use crate::segment::Segment;

/// A window over in-memory units, read by zero-copy slicing.
#[derive(Debug)]
pub(crate) struct ArraySource<B> {
    data: B,
    mark: B,
}

impl<B: Block + Clone> ArraySource<B> {
    pub(crate) fn new(data: B) -> Self {
        let mark = data.clone();
        Self { data, mark }
    }

    /// The returned view shares storage with the source. The segment that
    /// reaches the end of the window carries `end == true`.
    pub(crate) fn read(&mut self, size: usize) -> Segment<B> {
        if size == 0 {
            return Segment::empty(self.data.is_empty());
        }
        let n = size.min(self.data.len());
        let chunk = self.data.split_to(n);
        Segment::new(chunk, self.data.is_empty())
    }

    pub(crate) fn skip(&mut self, size: u64) -> u64 {
        let n = usize::try_from(size).unwrap_or(usize::MAX).min(self.data.len());
        self.data.advance(n);
        n as u64
    }

    pub(crate) fn mark(&mut self) {
        self.mark = self.data.clone();
    }

    pub(crate) fn reset(&mut self) {
        self.data = self.mark.clone();
    }
}
