//! Internal scratch buffer management.
//!
//! Skipping over a stream source reads into a throwaway buffer. This module
//! keeps those buffers in a thread-local pool so repeated skips do not
//! allocate. It is an implementation detail and not part of the public API.

mod pool;

pub(crate) use pool::Scratch;
