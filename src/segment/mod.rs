//! Segment types.
//!
//! - [`Segment`] - A view paired with an end-of-input flag
//! - [`ByteSegment`] / [`CharSegment`] - The byte and char instantiations

mod data;

pub use data::{ByteSegment, CharSegment, Segment};
