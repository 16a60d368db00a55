//! Async stream adapter for pipelines.

use std::cmp;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures_core::Stream;
use futures_io::AsyncRead;
use log::{debug, trace};
use pin_project_lite::pin_project;

use crate::config::ReadConfig;
use crate::error::SegError;
use crate::transform::Chain;

pin_project! {
    /// A stream of transformed blocks read from an async reader.
    ///
    /// Each block of up to `block_size` bytes is threaded through the chain
    /// with the same end-flag rules as a synchronous pipeline; every non-empty
    /// result is yielded. The stream ends after the final block, or after the
    /// first error.
    pub struct SegmentStream<'a, R> {
        #[pin]
        reader: R,
        chain: Chain<'a, Bytes>,
        buffer: Vec<u8>,
        filled: usize,
        remaining: u64,
        eof: bool,
        finished: bool,
    }
}

impl<'a, R: AsyncRead> SegmentStream<'a, R> {
    fn new(reader: R, config: ReadConfig, chain: Chain<'a, Bytes>) -> Self {
        Self {
            reader,
            chain,
            buffer: vec![0u8; config.block_size()],
            filled: 0,
            remaining: config.read_limit().unwrap_or(u64::MAX),
            eof: false,
            finished: false,
        }
    }

    /// Returns true once the stream has yielded its last item.
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl<R: AsyncRead> Stream for SegmentStream<'_, R> {
    type Item = Result<Bytes, SegError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        loop {
            if *this.finished {
                return Poll::Ready(None);
            }

            // A partial block survives a Pending and is topped off on the next poll.
            let want = cmp::min(this.buffer.len() as u64, *this.remaining) as usize;
            while *this.filled < want && !*this.eof {
                let buf = &mut this.buffer[*this.filled..want];
                match this.reader.as_mut().poll_read(cx, buf) {
                    Poll::Pending => return Poll::Pending,
                    Poll::Ready(Err(e)) if e.kind() == io::ErrorKind::Interrupted => {}
                    Poll::Ready(Err(e)) => {
                        *this.finished = true;
                        return Poll::Ready(Some(Err(SegError::Io(e))));
                    }
                    Poll::Ready(Ok(0)) => *this.eof = true,
                    Poll::Ready(Ok(n)) => *this.filled += n,
                }
            }

            let len = *this.filled;
            *this.remaining -= len as u64;
            *this.filled = 0;
            let end = *this.eof || *this.remaining == 0;
            let data = Bytes::copy_from_slice(&this.buffer[..len]);
            trace!("async block of {} bytes read (end: {})", len, end);

            if end {
                *this.finished = true;
                debug!("async pipeline reached end of input");
            }
            match this.chain.apply(data, end) {
                Err(e) => {
                    *this.finished = true;
                    return Poll::Ready(Some(Err(e)));
                }
                Ok(Some(out)) if !out.is_empty() => return Poll::Ready(Some(Ok(out))),
                Ok(_) => {}
            }
        }
    }
}

/// Creates a stream of transformed blocks from an async reader.
///
/// Uses `futures_io::AsyncRead` for runtime-agnostic async I/O. The block
/// size and read limit of `config` apply; the zero-read policy does not, since
/// an async reader signals "no data yet" by returning `Pending`.
///
/// For tokio users, `tokio_util::compat` converts `tokio::io::AsyncRead` to
/// `futures_io::AsyncRead`:
///
/// ```ignore
/// use tokio_util::compat::TokioAsyncReadCompatExt;
/// use segrs::{Chain, ReadConfig, pipe_async};
///
/// let file = tokio::fs::File::open("data.bin").await?;
/// let stream = pipe_async(file.compat(), ReadConfig::default(), Chain::new());
/// ```
///
/// # Example
///
/// ```
/// use bytes::Bytes;
/// use futures_util::StreamExt;
/// use segrs::{Block, Chain, ReadConfig, pipe_async, transform};
///
/// # tokio_test::block_on(async {
/// let chain = Chain::new().stage(transform::from_fn(|data: &mut Bytes, _end| {
///     Ok(Some(Bytes::from(data.take_all().to_ascii_uppercase())))
/// }));
/// let reader = futures_util::io::Cursor::new(b"quiet".to_vec());
/// let blocks: Vec<_> = pipe_async(reader, ReadConfig::new(2)?, chain).collect().await;
///
/// let out: Vec<u8> = blocks.into_iter().flat_map(|b| b.unwrap()).collect();
/// assert_eq!(out, b"QUIET");
/// # Ok::<(), segrs::SegError>(())
/// # }).unwrap();
/// ```
pub fn pipe_async<'a, R: AsyncRead>(
    reader: R,
    config: ReadConfig,
    chain: Chain<'a, Bytes>,
) -> SegmentStream<'a, R> {
    SegmentStream::new(reader, config, chain)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::Block;
    use crate::transform::{FixedSize, from_fn};
    use futures_util::StreamExt;
    use futures_util::io::Cursor;

    async fn collect(stream: SegmentStream<'_, impl AsyncRead>) -> Result<Vec<Bytes>, SegError> {
        stream.collect::<Vec<_>>().await.into_iter().collect()
    }

    /// Returns `Pending` before every chunk of data.
    struct Sluggish {
        data: Vec<u8>,
        pos: usize,
        ready: bool,
    }

    impl AsyncRead for Sluggish {
        fn poll_read(
            mut self: Pin<&mut Self>,
            cx: &mut Context<'_>,
            buf: &mut [u8],
        ) -> Poll<io::Result<usize>> {
            if !self.ready {
                self.ready = true;
                cx.waker().wake_by_ref();
                return Poll::Pending;
            }
            self.ready = false;
            let n = cmp::min(3, cmp::min(buf.len(), self.data.len() - self.pos));
            let start = self.pos;
            buf[..n].copy_from_slice(&self.data[start..start + n]);
            self.pos += n;
            Poll::Ready(Ok(n))
        }
    }

    struct Failing;

    impl AsyncRead for Failing {
        fn poll_read(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            _buf: &mut [u8],
        ) -> Poll<io::Result<usize>> {
            Poll::Ready(Err(io::Error::other("device gone")))
        }
    }

    #[tokio::test]
    async fn test_empty_source() {
        let stream = pipe_async(Cursor::new(Vec::new()), ReadConfig::default(), Chain::new());
        assert!(collect(stream).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_blocks_of_block_size() {
        let data: Vec<u8> = (0..10).collect();
        let config = ReadConfig::new(4).unwrap();
        let blocks = collect(pipe_async(Cursor::new(data.clone()), config, Chain::new()))
            .await
            .unwrap();

        let lens: Vec<usize> = blocks.iter().map(|b| b.len()).collect();
        assert_eq!(lens, vec![4, 4, 2]);
        assert_eq!(blocks.concat(), data);
    }

    #[tokio::test]
    async fn test_pending_reader_fills_whole_blocks() {
        let data: Vec<u8> = (0..20).collect();
        let reader = Sluggish {
            data: data.clone(),
            pos: 0,
            ready: false,
        };
        let blocks = collect(pipe_async(reader, ReadConfig::new(8).unwrap(), Chain::new()))
            .await
            .unwrap();

        let lens: Vec<usize> = blocks.iter().map(|b| b.len()).collect();
        assert_eq!(lens, vec![8, 8, 4]);
        assert_eq!(blocks.concat(), data);
    }

    #[tokio::test]
    async fn test_read_limit() {
        let config = ReadConfig::new(4).unwrap().with_read_limit(6);
        let blocks = collect(pipe_async(Cursor::new(vec![7u8; 100]), config, Chain::new()))
            .await
            .unwrap();
        assert_eq!(blocks.concat(), vec![7u8; 6]);
    }

    #[tokio::test]
    async fn test_end_flag_and_sized_stage() {
        let mut calls = Vec::new();
        {
            let stage = from_fn(|data: &mut Bytes, end| {
                calls.push((data.len(), end));
                Ok(Some(data.take_all()))
            });
            let chain = Chain::new().stage(FixedSize::new(stage, 3).unwrap());
            let config = ReadConfig::new(5).unwrap();
            let blocks = collect(pipe_async(Cursor::new(vec![1u8; 8]), config, chain))
                .await
                .unwrap();
            assert_eq!(blocks.concat().len(), 8);
        }
        assert_eq!(calls, vec![(3, false), (3, false), (2, true)]);
    }

    #[tokio::test]
    async fn test_empty_results_are_skipped() {
        let chain = Chain::new().stage(from_fn(|data: &mut Bytes, end| {
            let block = data.take_all();
            Ok(Some(if end { block } else { Bytes::new() }))
        }));
        let config = ReadConfig::new(2).unwrap();
        let blocks = collect(pipe_async(Cursor::new(b"abcde".to_vec()), config, chain))
            .await
            .unwrap();
        assert_eq!(blocks, vec![Bytes::from_static(b"e")]);
    }

    #[tokio::test]
    async fn test_stage_error_ends_stream() {
        let chain = Chain::new().stage(from_fn(|_: &mut Bytes, _| Err("no thanks".into())));
        let mut stream = pipe_async(Cursor::new(b"abc".to_vec()), ReadConfig::default(), chain);

        let err = stream.next().await.unwrap().unwrap_err();
        assert!(err.is_transform());
        assert!(stream.is_finished());
        assert!(stream.next().await.is_none());
    }

    #[test]
    fn test_io_error_ends_stream() {
        tokio_test::block_on(async {
            let mut stream = pipe_async(Failing, ReadConfig::default(), Chain::new());
            let err = stream.next().await.unwrap().unwrap_err();
            assert!(err.is_io());
            assert!(stream.next().await.is_none());
        });
    }
}
