//! Deterministic chunk partitioning
//!
//! A plan slices `file_size` bytes into `ceil(file_size / chunk_size)` chunks;
//! every chunk except possibly the last is exactly `chunk_size` bytes and the
//! final chunk absorbs the remainder. No state is retained between calls.

use std::ops::Range;

use sealdrop_core::{FileMeta, ShareError, ShareResult};

/// A chunking plan for one file. Zero-byte files are rejected at
/// construction - a 0-chunk plan does not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkPlan {
    file_size: u64,
    chunk_size: u64,
}

impl ChunkPlan {
    pub fn new(file_size: u64, chunk_size: u64) -> ShareResult<Self> {
        if file_size == 0 {
            return Err(ShareError::EmptyFile);
        }
        if chunk_size == 0 {
            return Err(ShareError::Other(anyhow::anyhow!(
                "chunk size must be non-zero"
            )));
        }
        Ok(Self {
            file_size,
            chunk_size,
        })
    }

    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    /// Number of chunks: `ceil(file_size / chunk_size)`, minimum 1.
    pub fn count(&self) -> usize {
        (self.file_size.div_ceil(self.chunk_size)) as usize
    }

    /// Byte range of chunk `index`: `[i*chunk_size, min(size, (i+1)*chunk_size))`.
    pub fn range(&self, index: usize) -> Range<u64> {
        let start = index as u64 * self.chunk_size;
        let end = self.file_size.min(start + self.chunk_size);
        start..end
    }

    pub fn ranges(&self) -> impl Iterator<Item = Range<u64>> + '_ {
        (0..self.count()).map(|i| self.range(i))
    }

    /// The file description recorded alongside the upload.
    pub fn file_meta(&self, name: &str, mime_type: &str) -> FileMeta {
        FileMeta {
            name: name.to_string(),
            size: self.file_size,
            mime_type: mime_type.to_string(),
            is_single_chunk: self.count() == 1,
        }
    }
}
