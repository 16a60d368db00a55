//! BLAKE3 hashing.

use super::Digest;

/// An incremental BLAKE3 hasher.
#[derive(Debug, Clone, Default)]
pub(crate) struct Blake3Hasher {
    state: blake3::Hasher,
}

impl Blake3Hasher {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn update(&mut self, data: &[u8]) {
        self.state.update(data);
    }

    pub(crate) fn finalize(&self) -> Digest {
        Digest::new(self.state.finalize().into())
    }

    pub(crate) fn reset(&mut self) {
        self.state.reset();
    }
}
