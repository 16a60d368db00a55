//! Destinations for pipeline output.
//!
//! A destination is one of a closed set of kinds, picked once when the sink
//! is built:
//!
//! - [`ByteSink`] - `io::Write`, growable `Vec<u8>` / `BytesMut`, fixed `&mut [u8]`, or nothing
//! - [`CharSink`] - `fmt::Write`, growable `String` / `Vec<char>`, fixed `&mut [char]`, or nothing
//!
//! Both implement [`Sink`], which is what the pipeline drives.

use std::fmt;
use std::io;

use bytes::{BufMut, Bytes, BytesMut};

use crate::block::{Block, CharBlock};
use crate::error::SegError;

/// A destination accepting blocks of output.
pub trait Sink<B: Block> {
    /// Writes all remaining units of `data`, consuming them.
    fn write_block(&mut self, data: &mut B) -> Result<(), SegError>;
}

impl<B: Block, S: Sink<B> + ?Sized> Sink<B> for &mut S {
    fn write_block(&mut self, data: &mut B) -> Result<(), SegError> {
        (**self).write_block(data)
    }
}

/// A byte destination.
///
/// # Example
///
/// ```
/// use segrs::ByteSink;
///
/// let mut out = Vec::new();
/// let sink = ByteSink::from(&mut out);
/// # drop(sink);
/// ```
pub enum ByteSink<'a> {
    /// Any `io::Write`.
    Writer(&'a mut (dyn io::Write + 'a)),
    /// A growable vector.
    Vec(&'a mut Vec<u8>),
    /// A growable `BytesMut`.
    BytesMut(&'a mut BytesMut),
    /// A fixed slice, filled from `pos`.
    Slice {
        /// The destination slice.
        buf: &'a mut [u8],
        /// Number of bytes written so far.
        pos: usize,
    },
    /// Discards everything.
    Null,
}

impl<'a> ByteSink<'a> {
    /// Creates a sink writing into any `io::Write`.
    pub fn writer(writer: &'a mut (dyn io::Write + 'a)) -> Self {
        ByteSink::Writer(writer)
    }

    /// Returns the number of bytes written into a fixed slice, or `None` for other kinds.
    pub fn written(&self) -> Option<usize> {
        match self {
            ByteSink::Slice { pos, .. } => Some(*pos),
            _ => None,
        }
    }
}

impl<'a> From<&'a mut Vec<u8>> for ByteSink<'a> {
    fn from(vec: &'a mut Vec<u8>) -> Self {
        ByteSink::Vec(vec)
    }
}

impl<'a> From<&'a mut BytesMut> for ByteSink<'a> {
    fn from(buf: &'a mut BytesMut) -> Self {
        ByteSink::BytesMut(buf)
    }
}

impl<'a> From<&'a mut [u8]> for ByteSink<'a> {
    fn from(buf: &'a mut [u8]) -> Self {
        ByteSink::Slice { buf, pos: 0 }
    }
}

impl Sink<Bytes> for ByteSink<'_> {
    fn write_block(&mut self, data: &mut Bytes) -> Result<(), SegError> {
        match self {
            ByteSink::Writer(w) => w.write_all(data.units())?,
            ByteSink::Vec(v) => v.extend_from_slice(data.units()),
            ByteSink::BytesMut(b) => b.put_slice(data.units()),
            ByteSink::Slice { buf, pos } => fill_slice(buf, pos, data.units())?,
            ByteSink::Null => {}
        }
        data.take_all();
        Ok(())
    }
}

/// A char destination.
pub enum CharSink<'a> {
    /// Any `fmt::Write`.
    Fmt(&'a mut (dyn fmt::Write + 'a)),
    /// A growable string.
    String(&'a mut String),
    /// A growable vector.
    Vec(&'a mut Vec<char>),
    /// A fixed slice, filled from `pos`.
    Slice {
        /// The destination slice.
        buf: &'a mut [char],
        /// Number of chars written so far.
        pos: usize,
    },
    /// Discards everything.
    Null,
}

impl<'a> CharSink<'a> {
    /// Creates a sink writing into any `fmt::Write`.
    pub fn fmt(writer: &'a mut (dyn fmt::Write + 'a)) -> Self {
        CharSink::Fmt(writer)
    }

    /// Returns the number of chars written into a fixed slice, or `None` for other kinds.
    pub fn written(&self) -> Option<usize> {
        match self {
            CharSink::Slice { pos, .. } => Some(*pos),
            _ => None,
        }
    }
}

impl<'a> From<&'a mut String> for CharSink<'a> {
    fn from(s: &'a mut String) -> Self {
        CharSink::String(s)
    }
}

impl<'a> From<&'a mut Vec<char>> for CharSink<'a> {
    fn from(vec: &'a mut Vec<char>) -> Self {
        CharSink::Vec(vec)
    }
}

impl<'a> From<&'a mut [char]> for CharSink<'a> {
    fn from(buf: &'a mut [char]) -> Self {
        CharSink::Slice { buf, pos: 0 }
    }
}

impl Sink<CharBlock> for CharSink<'_> {
    fn write_block(&mut self, data: &mut CharBlock) -> Result<(), SegError> {
        match self {
            CharSink::Fmt(w) => {
                for c in data.units() {
                    w.write_char(*c).map_err(io::Error::other)?;
                }
            }
            CharSink::String(s) => s.extend(data.units()),
            CharSink::Vec(v) => v.extend_from_slice(data.units()),
            CharSink::Slice { buf, pos } => fill_slice(buf, pos, data.units())?,
            CharSink::Null => {}
        }
        data.take_all();
        Ok(())
    }
}

/// Drops everything written to it.
#[derive(Debug, Default)]
pub(crate) struct Discard;

impl<B: Block> Sink<B> for Discard {
    fn write_block(&mut self, data: &mut B) -> Result<(), SegError> {
        data.take_all();
        Ok(())
    }
}

fn fill_slice<T: Copy>(buf: &mut [T], pos: &mut usize, units: &[T]) -> Result<(), SegError> {
    let available = buf.len() - *pos;
    if units.len() > available {
        return Err(SegError::InsufficientSpace {
            needed: units.len(),
            available,
        });
    }
    buf[*pos..*pos + units.len()].copy_from_slice(units);
    *pos += units.len();
    Ok(())
}
