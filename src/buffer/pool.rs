//! Thread-local scratch buffer pool.

use std::cell::RefCell;

/// Size of a pooled scratch buffer.
pub const SCRATCH_SIZE: usize = 8 * 1024;

/// Maximum number of buffers kept per thread.
pub const MAX_POOL_SIZE: usize = 4;

/// A reusable, zero-filled byte buffer of [`SCRATCH_SIZE`] bytes.
pub struct Scratch {
    data: Vec<u8>,
}

impl Scratch {
    /// Takes a buffer from the thread-local pool or allocates a new one.
    pub fn take() -> Self {
        let data = SCRATCH_POOL
            .with(|pool| pool.borrow_mut().pop())
            .unwrap_or_else(|| vec![0u8; SCRATCH_SIZE]);
        Self { data }
    }

    /// Returns the first `len` bytes of the buffer, capped at its size.
    pub fn window(&mut self, len: usize) -> &mut [u8] {
        let len = len.min(self.data.len());
        &mut self.data[..len]
    }
}

impl Drop for Scratch {
    fn drop(&mut self) {
        if self.data.len() == SCRATCH_SIZE {
            SCRATCH_POOL.with(|pool| {
                let mut pool = pool.borrow_mut();
                if pool.len() < MAX_POOL_SIZE {
                    pool.push(std::mem::take(&mut self.data));
                }
            });
        }
    }
}

thread_local! {
    static SCRATCH_POOL: RefCell<Vec<Vec<u8>>> = const { RefCell::new(Vec::new()) };
}
