//! Digests of pipeline data.
//!
//! - [`Digest`] - 32-byte digest value
//! - `Blake3Hasher` - incremental BLAKE3 hasher behind [`DigestStage`](crate::DigestStage)

mod blake3;
mod digest;

pub use digest::Digest;

pub(crate) use self::blake3::Blake3Hasher;
