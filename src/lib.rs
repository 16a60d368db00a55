//! segrs
//!
//! Pull-based segment readers and chunked transform pipelines for byte and
//! char streams.
//!
//! `segrs` reads a source in blocks, threads every block through an ordered
//! chain of stateful stages, and writes the result to a sink. It is designed
//! as a small, composable primitive for:
//!
//! - block ciphers and codecs that need input in exact multiples
//! - line and record splitters that carry partial input over
//! - charset bridges between byte and char streams
//! - hashing data as it passes through
//!
//! The crate intentionally:
//! - does NOT manage files or paths
//! - does NOT manage concurrency
//! - does NOT parse formats
//!
//! It only does one thing: **Source in → blocks → stages → sink out**
//!
//! # Sync
//!
//! ```
//! use bytes::Bytes;
//! use segrs::{Block, ByteSink, BytePipeline, SegError, transform};
//!
//! fn main() -> Result<(), SegError> {
//!     let shout = transform::from_fn(|data: &mut Bytes, _end| {
//!         Ok(Some(Bytes::from(data.take_all().to_ascii_uppercase())))
//!     });
//!
//!     let mut out = Vec::new();
//!     let count = BytePipeline::from_read(&b"hello pipeline"[..])
//!         .block_size(4)?
//!         .stage(shout)
//!         .process_to(ByteSink::from(&mut out))?;
//!
//!     assert_eq!(count, Some(14));
//!     assert_eq!(out, b"HELLO PIPELINE");
//!     Ok(())
//! }
//! ```
//!
//! # Async (feature = "async-io")
//!
//! ```ignore
//! use futures_util::StreamExt;
//! use segrs::{Chain, ReadConfig, pipe_async};
//! use futures_io::AsyncRead;
//!
//! async fn demo<R: AsyncRead + Unpin>(reader: R) -> Result<(), segrs::SegError> {
//!     let mut stream = pipe_async(reader, ReadConfig::default(), Chain::new());
//!
//!     while let Some(block) = stream.next().await {
//!         let block = block?;
//!         println!("block {}", block.len());
//!     }
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod block;
mod config;
mod error;
mod pipeline;
mod reader;
mod segment;
mod sink;
pub mod transform;

mod buffer; // internal (thread-local scratch reuse)

#[cfg(feature = "hash-blake3")]
mod hash;

#[cfg(feature = "async-io")]
mod async_stream;

//
// Public surface
//

pub use block::{Block, CharBlock};
pub use config::{DEFAULT_BLOCK_SIZE, ReadConfig};
pub use error::{SegError, TransformError};
pub use pipeline::{BytePipeline, CharPipeline, Pipeline, PipelineStream};
pub use reader::{ByteReader, CharReader, Limited, SegmentRead};
pub use segment::{ByteSegment, CharSegment, Segment};
pub use sink::{ByteSink, CharSink, Sink};
pub use transform::{Buffered, Chain, FixedSize, Identity, RoundingSize, Transform};

#[cfg(feature = "hash-blake3")]
pub use hash::Digest;
#[cfg(feature = "hash-blake3")]
pub use transform::DigestStage;

#[cfg(feature = "async-io")]
pub use async_stream::{SegmentStream, pipe_async};
