//! Byte reader over streams, in-memory windows and buffers.

use std::cmp;
use std::fmt;
use std::io::{self, Read};
use std::thread;

use bytes::{Buf, Bytes};
use encoding_rs::Encoding;
use log::trace;

use super::SegmentRead;
use super::array::ArraySource;
use super::codec::{CharsToBytes, Transcoded};
use crate::block::CharBlock;
use crate::buffer::Scratch;
use crate::error::{SegError, check_bounds};
use crate::segment::ByteSegment;

enum ByteSource<'a> {
    Stream {
        reader: Option<Box<dyn Read + 'a>>,
        eof: bool,
    },
    Array(ArraySource<Bytes>),
    Buf(Box<dyn Buf + 'a>),
    Encoded(Box<Transcoded<'a, CharsToBytes>>),
}

/// A byte reader.
///
/// The kind of source is fixed at construction:
///
/// - [`from_read`](Self::from_read) - any `io::Read`; each segment owns fresh storage
/// - [`from_bytes`](Self::from_bytes) / [`from_slice`](Self::from_slice) - in-memory window; segments share storage
/// - [`from_buf`](Self::from_buf) - any `bytes::Buf`
/// - [`encode`](Self::encode) - chars from another reader, encoded with a charset
///
/// # Example
///
/// ```
/// use segrs::{ByteReader, SegmentRead};
///
/// let data = b"stream data".to_vec();
/// let mut reader = ByteReader::from_read(&data[..]);
///
/// let segment = reader.read_segment(6)?;
/// assert_eq!(segment.data().as_ref(), b"stream");
/// # Ok::<(), segrs::SegError>(())
/// ```
pub struct ByteReader<'a> {
    source: ByteSource<'a>,
}

impl<'a> ByteReader<'a> {
    /// Creates a reader pulling from an `io::Read`.
    pub fn from_read<R: Read + 'a>(reader: R) -> Self {
        Self {
            source: ByteSource::Stream {
                reader: Some(Box::new(reader)),
                eof: false,
            },
        }
    }

    /// Creates a reader over in-memory bytes.
    pub fn from_bytes(data: impl Into<Bytes>) -> Self {
        Self {
            source: ByteSource::Array(ArraySource::new(data.into())),
        }
    }

    /// Creates a reader over `length` bytes of `data` starting at `offset`.
    ///
    /// # Errors
    ///
    /// Returns [`SegError::OutOfBounds`] if the window does not fit `data`.
    pub fn from_slice(data: Bytes, offset: usize, length: usize) -> Result<Self, SegError> {
        check_bounds(offset, length, data.len())?;
        Ok(Self::from_bytes(data.slice(offset..offset + length)))
    }

    /// Creates a reader consuming a `bytes::Buf`.
    pub fn from_buf<B: Buf + 'a>(buf: B) -> Self {
        Self {
            source: ByteSource::Buf(Box::new(buf)),
        }
    }

    /// Creates a reader producing the chars of `reader` encoded with `encoding`.
    pub fn encode<R>(reader: R, encoding: &'static Encoding) -> Self
    where
        R: SegmentRead<Block = CharBlock> + 'a,
    {
        let transcoded = Transcoded::new(Box::new(reader), CharsToBytes::new(encoding));
        Self {
            source: ByteSource::Encoded(Box::new(transcoded)),
        }
    }
}

impl SegmentRead for ByteReader<'_> {
    type Block = Bytes;

    fn read_segment_with(
        &mut self,
        size: usize,
        end_on_zero_read: bool,
    ) -> Result<ByteSegment, SegError> {
        match &mut self.source {
            ByteSource::Stream { reader, eof } => {
                let reader = reader.as_deref_mut().ok_or(SegError::Closed)?;
                if *eof {
                    return Ok(ByteSegment::empty(true));
                }
                if size == 0 {
                    return Ok(ByteSegment::empty(false));
                }
                let mut buf = vec![0u8; size];
                let (filled, stop) = fill(reader, &mut buf, end_on_zero_read)?;
                *eof = stop == Stop::Eof;
                buf.truncate(filled);
                Ok(ByteSegment::new(Bytes::from(buf), stop != Stop::Full))
            }
            ByteSource::Array(array) => Ok(array.read(size)),
            ByteSource::Buf(buf) => {
                let n = cmp::min(size, buf.remaining());
                let data = buf.copy_to_bytes(n);
                Ok(ByteSegment::new(data, !buf.has_remaining()))
            }
            ByteSource::Encoded(encoded) => encoded.read(size, end_on_zero_read),
        }
    }

    fn skip_units_with(&mut self, size: u64, end_on_zero_read: bool) -> Result<u64, SegError> {
        match &mut self.source {
            ByteSource::Stream { reader, eof } => {
                let reader = reader.as_deref_mut().ok_or(SegError::Closed)?;
                let mut scratch = Scratch::take();
                let mut skipped = 0u64;
                while skipped < size && !*eof {
                    let want = usize::try_from(size - skipped).unwrap_or(usize::MAX);
                    let (n, stop) = fill(reader, scratch.window(want), end_on_zero_read)?;
                    skipped += n as u64;
                    *eof = stop == Stop::Eof;
                    if stop != Stop::Full {
                        break;
                    }
                }
                Ok(skipped)
            }
            ByteSource::Array(array) => Ok(array.skip(size)),
            ByteSource::Buf(buf) => {
                let n = cmp::min(usize::try_from(size).unwrap_or(usize::MAX), buf.remaining());
                buf.advance(n);
                Ok(n as u64)
            }
            ByteSource::Encoded(encoded) => encoded.skip(size, end_on_zero_read),
        }
    }

    fn mark_supported(&self) -> bool {
        matches!(self.source, ByteSource::Array(_))
    }

    fn mark(&mut self) -> Result<(), SegError> {
        match &mut self.source {
            ByteSource::Array(array) => {
                array.mark();
                Ok(())
            }
            _ => Err(SegError::unsupported("mark")),
        }
    }

    fn reset(&mut self) -> Result<(), SegError> {
        match &mut self.source {
            ByteSource::Array(array) => {
                array.reset();
                Ok(())
            }
            _ => Err(SegError::unsupported("reset")),
        }
    }

    fn close(&mut self) -> Result<(), SegError> {
        match &mut self.source {
            ByteSource::Stream { reader, .. } => {
                reader.take();
                Ok(())
            }
            ByteSource::Encoded(encoded) => encoded.close(),
            ByteSource::Array(_) | ByteSource::Buf(_) => Ok(()),
        }
    }
}

impl fmt::Debug for ByteReader<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.source {
            ByteSource::Stream { .. } => "stream",
            ByteSource::Array(_) => "array",
            ByteSource::Buf(_) => "buf",
            ByteSource::Encoded(_) => "encoded",
        };
        f.debug_struct("ByteReader").field("source", &kind).finish()
    }
}

/// Why a fill of the buffer stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stop {
    Full,
    Eof,
    ZeroRead,
}

/// Fills `buf` from `reader`, looping across short reads.
fn fill(
    reader: &mut (dyn Read + '_),
    buf: &mut [u8],
    end_on_zero_read: bool,
) -> Result<(usize, Stop), SegError> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => return Ok((filled, Stop::Eof)),
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                if end_on_zero_read {
                    trace!("zero-length read after {} bytes, ending segment", filled);
                    return Ok((filled, Stop::ZeroRead));
                }
                thread::yield_now();
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok((filled, Stop::Full))
}
