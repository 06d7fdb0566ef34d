use std::sync::{Arc, Mutex, PoisonError};

/// Page size assumed when forcing physical commitment of a buffer.
pub const PAGE_SIZE: usize = 4096;

/// Write one byte into every `stride`-sized page of `buf`.
///
/// Freshly mapped memory is usually backed by a shared zero page until it is
/// written to, so an allocation alone does not raise the resident set size.
/// Returns the number of pages touched.
pub fn touch_pages(buf: &mut [u8], stride: usize) -> usize {
    let stride = stride.max(1);
    let mut touched = 0;
    for offset in (0..buf.len()).step_by(stride) {
        buf[offset] = 0xFF;
        touched += 1;
    }
    touched
}

/// A fixed-size block of committed memory held until the process exits.
pub struct RetainedBuffer {
    bytes: Vec<u8>,
}

impl RetainedBuffer {
    /// Wrap an allocation and touch every page of it.
    pub fn commit(mut bytes: Vec<u8>) -> Self {
        touch_pages(&mut bytes, PAGE_SIZE);
        Self { bytes }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl std::fmt::Debug for RetainedBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetainedBuffer")
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Append-only owner of every chunk the pressure generator allocates.
///
/// Buffers are never handed back out; the only way to release them is to end
/// the process. Clones share the same underlying storage.
#[derive(Clone, Default)]
pub struct RetentionStore {
    buffers: Arc<Mutex<Vec<RetainedBuffer>>>,
}

impl RetentionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of `buffer`. Safe to call from concurrent tasks.
    pub fn retain(&self, buffer: RetainedBuffer) {
        // A panic while holding the lock cannot leave the Vec half-pushed.
        let mut buffers = self.buffers.lock().unwrap_or_else(PoisonError::into_inner);
        buffers.push(buffer);
    }

    /// Number of chunks currently retained.
    pub fn len(&self) -> usize {
        self.buffers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sum of the sizes of all retained chunks.
    pub fn total_bytes(&self) -> usize {
        self.buffers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(RetainedBuffer::len)
            .sum()
    }

    /// Sizes of the retained chunks in insertion order.
    pub fn chunk_sizes(&self) -> Vec<usize> {
        self.buffers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(RetainedBuffer::len)
            .collect()
    }
}

impl std::fmt::Debug for RetentionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetentionStore")
            .field("chunks", &self.len())
            .field("total_bytes", &self.total_bytes())
            .finish()
    }
}
