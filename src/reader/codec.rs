//! Charset bridge between byte and char readers.
//!
//! Transcoding is incremental: a multi-byte sequence split across two input
//! segments is carried inside the codec until its remaining units arrive.

use std::cmp;

use bytes::Bytes;
use encoding_rs::{CoderResult, Decoder, Encoder, Encoding};
use log::trace;

use super::SegmentRead;
use crate::block::{Block, CharBlock, concat};
use crate::config::DEFAULT_BLOCK_SIZE;
use crate::error::SegError;
use crate::segment::Segment;

/// Smallest number of input units pulled per underlying read.
const MIN_INPUT: usize = 64;

/// Converts units of one block type into another.
pub(crate) trait Codec {
    type In: Block;
    type Out: Block;

    /// Converts `input`. With `last` set, any partial sequence held inside
    /// the codec is flushed.
    fn convert(&mut self, input: &[<Self::In as Block>::Unit], last: bool) -> Self::Out;
}

/// Bytes to chars. Malformed input becomes U+FFFD.
pub(crate) struct BytesToChars {
    decoder: Decoder,
}

impl BytesToChars {
    pub(crate) fn new(encoding: &'static Encoding) -> Self {
        Self {
            decoder: encoding.new_decoder_with_bom_removal(),
        }
    }
}

impl Codec for BytesToChars {
    type In = Bytes;
    type Out = CharBlock;

    fn convert(&mut self, input: &[u8], last: bool) -> CharBlock {
        let mut out = String::new();
        let mut src = input;
        loop {
            let needed = self
                .decoder
                .max_utf8_buffer_length(src.len())
                .unwrap_or(src.len().saturating_mul(3));
            out.reserve(needed.max(4));
            let (result, read, _) = self.decoder.decode_to_string(src, &mut out, last);
            src = &src[read..];
            match result {
                CoderResult::InputEmpty => break,
                CoderResult::OutputFull => continue,
            }
        }
        CharBlock::from_str(&out)
    }
}

/// Chars to bytes. Unmappable chars become decimal numeric character references.
///
/// UTF-16 targets produce UTF-8, which is the output encoding of their encoders.
pub(crate) struct CharsToBytes {
    encoder: Encoder,
}

impl CharsToBytes {
    pub(crate) fn new(encoding: &'static Encoding) -> Self {
        Self {
            encoder: encoding.new_encoder(),
        }
    }
}

impl Codec for CharsToBytes {
    type In = CharBlock;
    type Out = Bytes;

    fn convert(&mut self, input: &[char], last: bool) -> Bytes {
        let text: String = input.iter().collect();
        let mut out = Vec::new();
        let mut src = text.as_str();
        loop {
            let needed = self
                .encoder
                .max_buffer_length_from_utf8_if_no_unmappables(src.len())
                .unwrap_or(src.len());
            out.reserve(needed.max(16));
            let (result, read, _) = self.encoder.encode_from_utf8_to_vec(src, &mut out, last);
            src = &src[read..];
            match result {
                CoderResult::InputEmpty => break,
                CoderResult::OutputFull => continue,
            }
        }
        Bytes::from(out)
    }
}

/// A reader producing the transcoded content of another reader.
pub(crate) struct Transcoded<'a, C: Codec> {
    input: Box<dyn SegmentRead<Block = C::In> + 'a>,
    codec: C,
    pending: C::Out,
    done: bool,
}

impl<'a, C: Codec> Transcoded<'a, C> {
    pub(crate) fn new(input: Box<dyn SegmentRead<Block = C::In> + 'a>, codec: C) -> Self {
        Self {
            input,
            codec,
            pending: C::Out::empty(),
            done: false,
        }
    }

    pub(crate) fn read(
        &mut self,
        size: usize,
        end_on_zero_read: bool,
    ) -> Result<Segment<C::Out>, SegError> {
        if size == 0 {
            return Ok(Segment::empty(self.exhausted()));
        }

        let mut parts = Vec::new();
        let mut got = 0;
        loop {
            if !self.pending.is_empty() {
                let n = cmp::min(size - got, self.pending.len());
                parts.push(self.pending.split_to(n));
                got += n;
            }
            if got == size || self.done {
                break;
            }

            let (data, end) = self
                .input
                .read_segment_with(cmp::max(size - got, MIN_INPUT), end_on_zero_read)?
                .into_parts();
            self.done = end;
            self.pending = self.codec.convert(data.units(), end);
            trace!(
                "transcoded {} input units into {} output units",
                data.len(),
                self.pending.len()
            );
            if !end && data.is_empty() {
                break;
            }
        }

        Ok(Segment::new(concat(parts), self.exhausted()))
    }

    pub(crate) fn skip(&mut self, size: u64, end_on_zero_read: bool) -> Result<u64, SegError> {
        let mut skipped = 0u64;
        while skipped < size {
            let want = usize::try_from(size - skipped).unwrap_or(usize::MAX);
            let segment = self.read(cmp::min(want, DEFAULT_BLOCK_SIZE), end_on_zero_read)?;
            skipped += segment.len() as u64;
            if segment.end() || segment.is_empty() {
                break;
            }
        }
        Ok(skipped)
    }

    pub(crate) fn close(&mut self) -> Result<(), SegError> {
        self.pending = C::Out::empty();
        self.done = true;
        self.input.close()
    }

    fn exhausted(&self) -> bool {
        self.done && self.pending.is_empty()
    }
}
