//! Lazy view over a pipeline.

use std::cmp;
use std::fmt;
use std::io;

use bytes::Bytes;
use log::{debug, trace};

use crate::block::{Block, concat};
use crate::config::ReadConfig;
use crate::error::SegError;
use crate::reader::{Limited, SegmentRead};
use crate::segment::Segment;
use crate::transform::Chain;

/// A pipeline run on demand by its consumer.
///
/// Each read first drains the pending output of the last block; only when it
/// is used up is the next block pulled from the source and threaded through
/// the stages. Once the final block has been drained every read reports end
/// of input.
///
/// Byte streams implement [`io::Read`], so the output of a pipeline can feed
/// anything that reads.
///
/// # Example
///
/// ```
/// use std::io::Read;
/// use segrs::BytePipeline;
///
/// let mut stream = BytePipeline::from_bytes(&b"lazy output"[..]).into_stream();
/// let mut text = String::new();
/// stream.read_to_string(&mut text)?;
/// assert_eq!(text, "lazy output");
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct PipelineStream<'a, R: SegmentRead> {
    reader: Limited<R>,
    block_size: usize,
    end_on_zero_read: bool,
    chain: Chain<'a, R::Block>,
    pending: Segment<R::Block>,
    mark: Option<Segment<R::Block>>,
    closed: bool,
}

impl<'a, R: SegmentRead> PipelineStream<'a, R> {
    pub(crate) fn new(reader: Limited<R>, config: &ReadConfig, chain: Chain<'a, R::Block>) -> Self {
        Self {
            reader,
            block_size: config.block_size(),
            end_on_zero_read: config.end_on_zero_read(),
            chain,
            pending: Segment::empty(false),
            mark: None,
            closed: false,
        }
    }

    /// Copies output units into `buf` and returns how many were copied.
    ///
    /// Returns `0` only at end of output (or when `buf` is empty).
    ///
    /// # Errors
    ///
    /// Returns [`SegError::Closed`] after [`close`](SegmentRead::close), or
    /// any error raised while pulling the next block.
    pub fn read_units(&mut self, buf: &mut [<R::Block as Block>::Unit]) -> Result<usize, SegError> {
        if self.closed {
            return Err(SegError::Closed);
        }
        if buf.is_empty() || !self.fill(self.end_on_zero_read)? {
            return Ok(0);
        }
        let data = self.pending.data_mut();
        let n = cmp::min(buf.len(), data.len());
        buf[..n].copy_from_slice(&data.units()[..n]);
        data.advance(n);
        Ok(n)
    }

    /// Returns the number of output units ready without touching the source.
    pub fn available(&self) -> usize {
        self.pending.len()
    }

    fn exhausted(&self) -> bool {
        self.pending.is_empty() && self.pending.end()
    }

    /// Makes sure output is pending. Returns false at end of output.
    fn fill(&mut self, end_on_zero_read: bool) -> Result<bool, SegError> {
        while self.pending.is_empty() {
            if self.pending.end() {
                return Ok(false);
            }
            let (data, end) = self
                .reader
                .read_segment_with(self.block_size, end_on_zero_read)?
                .into_parts();
            trace!("lazy block of {} units pulled (end: {})", data.len(), end);
            self.pending = match self.chain.apply(data, end)? {
                Some(out) => Segment::new(out, end),
                None => Segment::empty(end),
            };
            if end {
                debug!("lazy pipeline reached end of input");
            }
        }
        Ok(true)
    }
}

impl<R: SegmentRead> SegmentRead for PipelineStream<'_, R> {
    type Block = R::Block;

    fn read_segment_with(
        &mut self,
        size: usize,
        end_on_zero_read: bool,
    ) -> Result<Segment<R::Block>, SegError> {
        if self.closed {
            return Err(SegError::Closed);
        }
        let end_on_zero_read = end_on_zero_read || self.end_on_zero_read;

        let mut parts = Vec::new();
        let mut got = 0;
        while got < size && self.fill(end_on_zero_read)? {
            let data = self.pending.data_mut();
            let n = cmp::min(size - got, data.len());
            parts.push(data.split_to(n));
            got += n;
        }
        Ok(Segment::new(concat(parts), self.exhausted()))
    }

    fn skip_units_with(&mut self, size: u64, end_on_zero_read: bool) -> Result<u64, SegError> {
        if self.closed {
            return Err(SegError::Closed);
        }
        let end_on_zero_read = end_on_zero_read || self.end_on_zero_read;

        let mut skipped = 0u64;
        while skipped < size && self.fill(end_on_zero_read)? {
            let data = self.pending.data_mut();
            let n = cmp::min(size - skipped, data.len() as u64) as usize;
            data.advance(n);
            skipped += n as u64;
        }
        Ok(skipped)
    }

    /// Supported only when the pipeline has no stages and the source supports it.
    fn mark_supported(&self) -> bool {
        self.chain.is_empty() && self.reader.mark_supported()
    }

    fn mark(&mut self) -> Result<(), SegError> {
        if !self.chain.is_empty() {
            return Err(SegError::unsupported("mark"));
        }
        self.reader.mark()?;
        self.mark = Some(self.pending.clone());
        Ok(())
    }

    fn reset(&mut self) -> Result<(), SegError> {
        if !self.chain.is_empty() {
            return Err(SegError::unsupported("reset"));
        }
        self.reader.reset()?;
        self.pending = self.mark.clone().unwrap_or_else(|| Segment::empty(false));
        Ok(())
    }

    fn close(&mut self) -> Result<(), SegError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.pending = Segment::empty(true);
        self.mark = None;
        self.reader.close()
    }
}

impl<R: SegmentRead<Block = Bytes>> io::Read for PipelineStream<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(self.read_units(buf)?)
    }
}

impl<R: SegmentRead> fmt::Debug for PipelineStream<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineStream")
            .field("block_size", &self.block_size)
            .field("stages", &self.chain.len())
            .field("pending", &self.pending)
            .field("closed", &self.closed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use super::*;
    use crate::block::CharBlock;
    use crate::pipeline::{BytePipeline, CharPipeline, Pipeline};
    use crate::transform::{Identity, from_fn};

    #[test]
    fn test_read_units_drains_pending_first() {
        let mut stream = CharPipeline::from_str("abcdefgh")
            .block_size(4)
            .unwrap()
            .stage(Identity)
            .into_stream();

        let mut buf = ['-'; 3];
        assert_eq!(stream.read_units(&mut buf).unwrap(), 3);
        assert_eq!(buf, ['a', 'b', 'c']);
        assert_eq!(stream.available(), 1);
        assert_eq!(stream.read_units(&mut buf).unwrap(), 1);
        assert_eq!(buf[0], 'd');
        assert_eq!(stream.read_units(&mut buf).unwrap(), 3);
        assert_eq!(stream.read_units(&mut buf).unwrap(), 1);
        assert_eq!(stream.read_units(&mut buf).unwrap(), 0);
        assert_eq!(stream.read_units(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_segments_end_exactly_once() {
        let mut stream = BytePipeline::from_bytes(vec![1u8; 10])
            .block_size(4)
            .unwrap()
            .into_stream();

        let a = stream.read_segment(6).unwrap();
        assert_eq!((a.len(), a.end()), (6, false));
        let b = stream.read_segment(6).unwrap();
        assert_eq!((b.len(), b.end()), (4, true));
        let c = stream.read_segment(6).unwrap();
        assert!(c.is_empty() && c.end());
    }

    #[test]
    fn test_none_on_final_block_ends_view() {
        let mut stream = BytePipeline::from_bytes(&b"swallowed"[..])
            .stage(from_fn(|data: &mut Bytes, _| {
                data.take_all();
                Ok(None)
            }))
            .into_stream();

        let segment = stream.read_segment(100).unwrap();
        assert!(segment.is_empty() && segment.end());
        assert_eq!(stream.read(&mut [0u8; 8]).unwrap(), 0);
    }

    #[test]
    fn test_close_closes_source() {
        let data = b"abcdef".to_vec();
        let mut stream = BytePipeline::from_read(&data[..])
            .block_size(2)
            .unwrap()
            .into_stream();
        assert_eq!(stream.read_segment(1).unwrap().len(), 1);

        stream.close().unwrap();
        assert!(matches!(stream.read_segment(1), Err(SegError::Closed)));
        assert!(stream.read(&mut [0u8; 1]).is_err());
        stream.close().unwrap();
    }

    #[test]
    fn test_skip() {
        let mut stream = CharPipeline::from_str("0123456789")
            .block_size(3)
            .unwrap()
            .into_stream();
        assert_eq!(stream.skip_units(5).unwrap(), 5);
        assert_eq!(*stream.read_segment(2).unwrap().data(), "56");
        assert_eq!(stream.skip_units(10).unwrap(), 3);
    }

    #[test]
    fn test_mark_without_stages() {
        let mut stream = CharPipeline::from_str("abcdef")
            .block_size(4)
            .unwrap()
            .into_stream();
        assert!(stream.mark_supported());

        stream.read_segment(1).unwrap();
        stream.mark().unwrap();
        assert_eq!(*stream.read_segment(4).unwrap().data(), "bcde");
        stream.reset().unwrap();
        assert_eq!(*stream.read_segment(10).unwrap().data(), "bcdef");
    }

    #[test]
    fn test_mark_with_stages_unsupported() {
        let mut stream = CharPipeline::from_str("abc").stage(Identity).into_stream();
        assert!(!stream.mark_supported());
        assert!(stream.mark().is_err());
        assert!(stream.reset().is_err());
    }

    #[test]
    fn test_stream_as_source_of_another_pipeline() {
        let inner = CharPipeline::from_str("nested")
            .stage(from_fn(|data: &mut CharBlock, _| {
                let reversed: Vec<char> = data.take_all().as_slice().iter().rev().copied().collect();
                Ok(Some(CharBlock::new(reversed)))
            }))
            .into_stream();
        let out = Pipeline::new(inner).to_string().unwrap();
        assert_eq!(out, "detsen");
    }
}
