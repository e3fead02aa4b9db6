use std::ops::Range;
use std::sync::Mutex;

use crate::util::lock;

/// Hands out consecutive index ranges of a collection to competing workers.
///
/// The cursor is locked only for the compare-and-advance step; the claimed
/// range is processed without holding anything.
#[derive(Debug)]
pub struct ChunkDispenser {
    cursor: Mutex<usize>,
    len: usize,
    chunk_size: usize,
}

impl ChunkDispenser {
    pub fn new(len: usize, chunk_size: usize) -> Self {
        assert!(chunk_size > 0, "chunk size must be positive");
        ChunkDispenser {
            cursor: Mutex::new(0),
            len,
            chunk_size,
        }
    }

    /// Claims the next range, or `None` once the collection is exhausted.
    pub fn claim(&self) -> Option<Range<usize>> {
        let mut cursor = lock(&self.cursor, "lock chunk cursor");
        if *cursor >= self.len {
            return None;
        }
        let start = *cursor;
        *cursor = start.saturating_add(self.chunk_size);
        Some(start..(*cursor).min(self.len))
    }
}
