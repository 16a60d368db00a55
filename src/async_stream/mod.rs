//! Async source driver.
//!
//! Pulls blocks from a `futures_io::AsyncRead`, so it works with tokio,
//! async-std, smol, or any futures-compatible runtime.
//!
//! - [`pipe_async`] - Creates a stream of transformed blocks from an async reader
//!
//! This module requires the `async-io` feature to be enabled.

mod stream;

pub use stream::{SegmentStream, pipe_async};
