//! Pipeline driver.
//!
//! A [`Pipeline`] pulls blocks from a reader, threads each block through a
//! [`Chain`] of stages and writes whatever comes out to a sink. It is built
//! with consuming setter methods and run by exactly one terminal method:
//!
//! - eager: [`process`](Pipeline::process), [`process_to`](Pipeline::process_to),
//!   `to_vec`, `to_bytes`, `to_string`, ...
//! - lazy: [`into_stream`](Pipeline::into_stream), which pulls blocks on demand
//!
//! Eager terminal methods that report a count return the number of units
//! read from the source, or `None` if the source was already exhausted.
//!
//! # Example
//!
//! ```
//! use bytes::Bytes;
//! use segrs::{Block, BytePipeline, transform};
//!
//! let upper = transform::from_fn(|data: &mut Bytes, _end| {
//!     Ok(Some(Bytes::from(data.take_all().to_ascii_uppercase())))
//! });
//!
//! let out = BytePipeline::from_bytes(&b"hello world"[..])
//!     .block_size(4)?
//!     .stage_fixed_size(upper, 3)?
//!     .to_vec()?;
//! assert_eq!(out, b"HELLO WORLD");
//! # Ok::<(), segrs::SegError>(())
//! ```

mod stream;

pub use stream::PipelineStream;

use std::fmt;
use std::io::Read;

use bytes::{Buf, Bytes, BytesMut};
use encoding_rs::Encoding;
use log::{debug, trace};

use crate::block::{Block, CharBlock};
use crate::config::ReadConfig;
use crate::error::SegError;
use crate::reader::{ByteReader, CharReader, Limited, SegmentRead};
use crate::sink::{ByteSink, CharSink, Discard, Sink};
use crate::transform::{Buffered, Chain, FixedSize, RoundingSize, Transform};

/// A read-transform-write pipeline over a reader.
pub struct Pipeline<'a, R: SegmentRead> {
    reader: R,
    config: ReadConfig,
    chain: Chain<'a, R::Block>,
}

/// A pipeline over a [`ByteReader`].
pub type BytePipeline<'a> = Pipeline<'a, ByteReader<'a>>;

/// A pipeline over a [`CharReader`].
pub type CharPipeline<'a> = Pipeline<'a, CharReader<'a>>;

impl<'a, R: SegmentRead> Pipeline<'a, R> {
    /// Creates a pipeline over any reader with the default configuration.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            config: ReadConfig::default(),
            chain: Chain::new(),
        }
    }

    /// Returns the current configuration.
    pub fn config(&self) -> &ReadConfig {
        &self.config
    }

    /// Replaces the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SegError::InvalidConfig`] if `config` is invalid.
    pub fn with_config(mut self, config: ReadConfig) -> Result<Self, SegError> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    /// Sets the number of units pulled from the source per block.
    ///
    /// # Errors
    ///
    /// Returns [`SegError::InvalidConfig`] if `size` is zero.
    pub fn block_size(self, size: usize) -> Result<Self, SegError> {
        let config = self.config.with_block_size(size);
        self.with_config(config)
    }

    /// Caps the total number of units read from the source.
    pub fn read_limit(mut self, limit: u64) -> Self {
        self.config = self.config.with_read_limit(limit);
        self
    }

    /// Sets whether a zero-length underlying read ends the input.
    pub fn end_on_zero_read(mut self, end_on_zero_read: bool) -> Self {
        self.config = self.config.with_end_on_zero_read(end_on_zero_read);
        self
    }

    /// Appends a stage.
    pub fn stage(mut self, stage: impl Transform<R::Block> + 'a) -> Self {
        self.chain.push(stage);
        self
    }

    /// Appends a stage fed exact blocks of `size` units.
    ///
    /// # Errors
    ///
    /// Returns [`SegError::InvalidConfig`] if `size` is zero.
    pub fn stage_fixed_size<T>(self, stage: T, size: usize) -> Result<Self, SegError>
    where
        T: Transform<R::Block> + 'a,
    {
        Ok(self.stage(FixedSize::new(stage, size)?))
    }

    /// Appends a stage fed multiples of `size` units.
    ///
    /// # Errors
    ///
    /// Returns [`SegError::InvalidConfig`] if `size` is zero.
    pub fn stage_rounding_size<T>(self, stage: T, size: usize) -> Result<Self, SegError>
    where
        T: Transform<R::Block> + 'a,
    {
        Ok(self.stage(RoundingSize::new(stage, size)?))
    }

    /// Appends a stage whose unconsumed input is carried into its next call.
    pub fn stage_buffered<T>(self, stage: T) -> Self
    where
        T: Transform<R::Block> + 'a,
    {
        self.stage(Buffered::new(stage))
    }

    /// Runs the pipeline and discards the output.
    pub fn process(self) -> Result<Option<u64>, SegError> {
        self.process_to(Discard)
    }

    /// Runs the pipeline, writing the output to `sink`.
    ///
    /// Returns the number of units read from the source, or `None` if the
    /// source was already exhausted.
    ///
    /// # Errors
    ///
    /// Source and sink failures are returned as they occur; a stage failure
    /// is returned as [`SegError::Transform`]. Nothing more is read or
    /// written after an error.
    pub fn process_to<S: Sink<R::Block>>(self, mut sink: S) -> Result<Option<u64>, SegError> {
        let Pipeline {
            reader,
            config,
            mut chain,
        } = self;
        let mut reader = limited(reader, &config);

        let mut count = 0u64;
        loop {
            let (data, end) = reader
                .read_segment_with(config.block_size(), config.end_on_zero_read())?
                .into_parts();
            count += data.len() as u64;
            trace!("block of {} units read (end: {})", data.len(), end);

            if let Some(mut out) = chain.apply(data, end)? {
                if !out.is_empty() {
                    sink.write_block(&mut out)?;
                }
            }
            if end {
                break;
            }
        }

        debug!(
            "pipeline finished: {} units read through {} stages",
            count,
            chain.len()
        );
        Ok((count > 0).then_some(count))
    }

    /// Turns the pipeline into a lazy view that runs on demand.
    pub fn into_stream(self) -> PipelineStream<'a, R> {
        let reader = limited(self.reader, &self.config);
        PipelineStream::new(reader, &self.config, self.chain)
    }
}

fn limited<R: SegmentRead>(reader: R, config: &ReadConfig) -> Limited<R> {
    Limited::new(reader, config.read_limit().unwrap_or(u64::MAX))
}

/// Config for a pipeline reading the output of another one.
fn downstream_config(config: &ReadConfig) -> ReadConfig {
    ReadConfig::default()
        .with_block_size(config.block_size())
        .with_end_on_zero_read(config.end_on_zero_read())
}

impl<'a> Pipeline<'a, ByteReader<'a>> {
    /// Creates a pipeline reading an `io::Read`.
    pub fn from_read<T: Read + 'a>(reader: T) -> Self {
        Self::new(ByteReader::from_read(reader))
    }

    /// Creates a pipeline over in-memory bytes.
    pub fn from_bytes(data: impl Into<Bytes>) -> Self {
        Self::new(ByteReader::from_bytes(data))
    }

    /// Creates a pipeline over `length` bytes of `data` starting at `offset`.
    ///
    /// # Errors
    ///
    /// Returns [`SegError::OutOfBounds`] if the window does not fit `data`.
    pub fn from_slice(data: Bytes, offset: usize, length: usize) -> Result<Self, SegError> {
        Ok(Self::new(ByteReader::from_slice(data, offset, length)?))
    }

    /// Creates a pipeline consuming a `bytes::Buf`.
    pub fn from_buf<B: Buf + 'a>(buf: B) -> Self {
        Self::new(ByteReader::from_buf(buf))
    }
}

impl<'a, R: SegmentRead<Block = Bytes> + 'a> Pipeline<'a, R> {
    /// Runs the pipeline and collects the output.
    pub fn to_vec(self) -> Result<Vec<u8>, SegError> {
        let mut out = Vec::new();
        self.process_to(ByteSink::from(&mut out))?;
        Ok(out)
    }

    /// Runs the pipeline and collects the output into `Bytes`.
    pub fn to_bytes(self) -> Result<Bytes, SegError> {
        let mut out = BytesMut::new();
        self.process_to(ByteSink::from(&mut out))?;
        Ok(out.freeze())
    }

    /// Runs the pipeline and collects the output as UTF-8, replacing invalid sequences.
    pub fn to_string_lossy(self) -> Result<String, SegError> {
        let out = self.to_vec()?;
        Ok(match String::from_utf8(out) {
            Ok(text) => text,
            Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
        })
    }

    /// Continues as a char pipeline over this pipeline's output decoded with `encoding`.
    ///
    /// The new pipeline keeps the block size and zero-read policy.
    pub fn decode(self, encoding: &'static Encoding) -> CharPipeline<'a> {
        let config = downstream_config(&self.config);
        let reader = CharReader::decode(self.into_stream(), encoding);
        Pipeline {
            reader,
            config,
            chain: Chain::new(),
        }
    }
}

impl<'a> Pipeline<'a, CharReader<'a>> {
    /// Creates a pipeline over the chars of a string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Self {
        Self::new(CharReader::from_str(s))
    }

    /// Creates a pipeline over owned chars.
    pub fn from_chars(chars: Vec<char>) -> Self {
        Self::new(CharReader::from_chars(chars))
    }

    /// Creates a pipeline over `length` chars of `block` starting at `offset`.
    ///
    /// # Errors
    ///
    /// Returns [`SegError::OutOfBounds`] if the window does not fit `block`.
    pub fn from_slice(block: CharBlock, offset: usize, length: usize) -> Result<Self, SegError> {
        Ok(Self::new(CharReader::from_slice(block, offset, length)?))
    }

    /// Creates a pipeline pulling chars from an iterator.
    pub fn from_char_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = char>,
        I::IntoIter: 'a,
    {
        Self::new(CharReader::from_char_iter(iter))
    }

    /// Creates a pipeline decoding an `io::Read` with `encoding`.
    pub fn from_read<T: Read + 'a>(reader: T, encoding: &'static Encoding) -> Self {
        Self::new(CharReader::from_read(reader, encoding))
    }
}

impl<'a, R: SegmentRead<Block = CharBlock> + 'a> Pipeline<'a, R> {
    /// Runs the pipeline and collects the output.
    #[allow(clippy::inherent_to_string)]
    pub fn to_string(self) -> Result<String, SegError> {
        let mut out = String::new();
        self.process_to(CharSink::from(&mut out))?;
        Ok(out)
    }

    /// Runs the pipeline and collects the output chars.
    pub fn to_chars(self) -> Result<Vec<char>, SegError> {
        let mut out = Vec::new();
        self.process_to(CharSink::from(&mut out))?;
        Ok(out)
    }

    /// Continues as a byte pipeline over this pipeline's output encoded with `encoding`.
    ///
    /// The new pipeline keeps the block size and zero-read policy.
    pub fn encode(self, encoding: &'static Encoding) -> BytePipeline<'a> {
        let config = downstream_config(&self.config);
        let reader = ByteReader::encode(self.into_stream(), encoding);
        Pipeline {
            reader,
            config,
            chain: Chain::new(),
        }
    }
}

impl<R: SegmentRead + fmt::Debug> fmt::Debug for Pipeline<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("reader", &self.reader)
            .field("config", &self.config)
            .field("chain", &self.chain)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::{Identity, from_fn};
    use encoding_rs::{UTF_8, WINDOWS_1252};

    #[test]
    fn test_no_stages_round_trip() {
        let data: Vec<u8> = (0..=255).cycle().take(50_000).collect();
        let mut out = Vec::new();
        let count = BytePipeline::from_read(&data[..])
            .block_size(1000)
            .unwrap()
            .process_to(ByteSink::from(&mut out))
            .unwrap();
        assert_eq!(count, Some(50_000));
        assert_eq!(out, data);
    }

    #[test]
    fn test_empty_source_returns_none() {
        assert_eq!(BytePipeline::from_bytes(Bytes::new()).process().unwrap(), None);
        assert_eq!(CharPipeline::from_str("").process().unwrap(), None);
    }

    #[test]
    fn test_count_is_units_read() {
        let count = CharPipeline::from_str("abcdef")
            .stage(from_fn(|data: &mut CharBlock, _| {
                data.take_all();
                Ok(Some(CharBlock::from_str("x")))
            }))
            .process()
            .unwrap();
        assert_eq!(count, Some(6));
    }

    #[test]
    fn test_zero_block_size_rejected() {
        assert!(BytePipeline::from_bytes(&b"a"[..]).block_size(0).is_err());
        assert!(
            BytePipeline::from_bytes(&b"a"[..])
                .stage_fixed_size(Identity, 0)
                .is_err()
        );
    }

    #[test]
    fn test_read_limit() {
        let out = BytePipeline::from_bytes(&b"0123456789"[..])
            .block_size(3)
            .unwrap()
            .read_limit(5)
            .to_vec()
            .unwrap();
        assert_eq!(out, b"01234");
    }

    #[test]
    fn test_stage_error_aborts() {
        let mut written = Vec::new();
        let err = BytePipeline::from_bytes(vec![0u8; 100])
            .block_size(10)
            .unwrap()
            .stage(from_fn(|data: &mut Bytes, _| {
                if data.len() < 10 {
                    return Err("short".into());
                }
                Ok(Some(data.take_all()))
            }))
            .read_limit(25)
            .process_to(ByteSink::from(&mut written))
            .unwrap_err();
        assert!(err.is_transform());
        assert_eq!(written.len(), 20);
    }

    #[test]
    fn test_slice_sink_too_small() {
        let mut buf = [0u8; 4];
        let err = BytePipeline::from_bytes(&b"too long"[..])
            .process_to(ByteSink::from(&mut buf[..]))
            .unwrap_err();
        assert!(matches!(err, SegError::InsufficientSpace { .. }));
    }

    #[test]
    fn test_to_bytes_and_lossy() {
        let bytes = BytePipeline::from_buf(&b"buf data"[..]).to_bytes().unwrap();
        assert_eq!(bytes, "buf data");

        let text = BytePipeline::from_bytes(vec![b'o', b'k', 0xff])
            .to_string_lossy()
            .unwrap();
        assert_eq!(text, "ok\u{fffd}");
    }

    #[test]
    fn test_decode_then_encode() {
        let latin = WINDOWS_1252.encode("café crème").0.into_owned();
        let upper = BytePipeline::from_bytes(latin)
            .block_size(3)
            .unwrap()
            .decode(WINDOWS_1252)
            .stage(from_fn(|data: &mut CharBlock, _| {
                let text: String = data.take_all().to_string().to_uppercase();
                Ok(Some(CharBlock::from_str(&text)))
            }))
            .encode(UTF_8)
            .to_vec()
            .unwrap();
        assert_eq!(upper, "CAFÉ CRÈME".as_bytes());
    }

    #[test]
    fn test_char_sources() {
        let text = CharPipeline::from_char_iter("iterated".chars())
            .block_size(3)
            .unwrap()
            .to_string()
            .unwrap();
        assert_eq!(text, "iterated");

        let chars = CharPipeline::from_slice(CharBlock::from_str("window"), 1, 3)
            .unwrap()
            .to_chars()
            .unwrap();
        assert_eq!(chars, vec!['i', 'n', 'd']);

        let decoded = CharPipeline::from_read(&b"plain"[..], UTF_8)
            .to_string()
            .unwrap();
        assert_eq!(decoded, "plain");
    }

    #[test]
    fn test_with_config() {
        let config = ReadConfig::new(2).unwrap().with_read_limit(3);
        let out = CharPipeline::from_chars(vec!['a'; 10])
            .with_config(config)
            .unwrap()
            .to_string()
            .unwrap();
        assert_eq!(out, "aaa");

        let bad = ReadConfig::default().with_block_size(0);
        assert!(CharPipeline::from_str("x").with_config(bad).is_err());
    }
}
