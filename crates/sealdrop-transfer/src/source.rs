//! Byte-range read abstraction over the plaintext file
//!
//! Upload workers read their slice through this trait instead of sharing a
//! file cursor; `FileSource` opens the file per range read so concurrent
//! workers never contend on a seek position.

use std::future::Future;
use std::ops::Range;
use std::path::PathBuf;

use bytes::Bytes;
use tokio::io::{AsyncReadExt, AsyncSeekExt, SeekFrom};

use sealdrop_core::{ShareError, ShareResult};

/// A random-access plaintext source of known size.
pub trait ChunkSource {
    /// Total size in bytes.
    fn len(&self) -> u64;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read exactly the bytes in `range`.
    fn read_range(&self, range: Range<u64>) -> impl Future<Output = ShareResult<Bytes>> + Send;
}

/// A file on disk.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    len: u64,
}

impl FileSource {
    pub async fn open(path: impl Into<PathBuf>) -> ShareResult<Self> {
        let path = path.into();
        let meta = tokio::fs::metadata(&path).await?;
        if !meta.is_file() {
            return Err(ShareError::Other(anyhow::anyhow!(
                "not a regular file: {}",
                path.display()
            )));
        }
        Ok(Self {
            path,
            len: meta.len(),
        })
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl ChunkSource for FileSource {
    fn len(&self) -> u64 {
        self.len
    }

    fn read_range(&self, range: Range<u64>) -> impl Future<Output = ShareResult<Bytes>> + Send {
        let path = self.path.clone();
        async move {
            let mut file = tokio::fs::File::open(&path).await?;
            file.seek(SeekFrom::Start(range.start)).await?;

            let mut buf = vec![0u8; (range.end - range.start) as usize];
            file.read_exact(&mut buf).await?;
            Ok(Bytes::from(buf))
        }
    }
}

/// An in-memory source, mainly for tests and small payloads.
#[derive(Debug, Clone)]
pub struct MemorySource {
    data: Bytes,
}

impl MemorySource {
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self { data: data.into() }
    }
}

impl From<Vec<u8>> for MemorySource {
    fn from(data: Vec<u8>) -> Self {
        Self::new(data)
    }
}

impl ChunkSource for MemorySource {
    fn len(&self) -> u64 {
        self.data.len() as u64
    }

    fn read_range(&self, range: Range<u64>) -> impl Future<Output = ShareResult<Bytes>> + Send {
        let result = if range.end > self.data.len() as u64 {
            Err(ShareError::Other(anyhow::anyhow!(
                "range {}..{} out of bounds for {} byte source",
                range.start,
                range.end,
                self.data.len()
            )))
        } else {
            Ok(self.data.slice(range.start as usize..range.end as usize))
        };
        async move { result }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_memory_source_ranges() {
        let source = MemorySource::new(b"0123456789".to_vec());
        assert_eq!(source.len(), 10);

        let mid = source.read_range(3..7).await.unwrap();
        assert_eq!(&mid[..], b"3456");

        let all = source.read_range(0..10).await.unwrap();
        assert_eq!(&all[..], b"0123456789");
    }

    #[tokio::test]
    async fn test_memory_source_out_of_bounds() {
        let source = MemorySource::new(b"abc".to_vec());
        assert!(source.read_range(0..4).await.is_err());
    }

    #[tokio::test]
    async fn test_file_source_reads_ranges() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"hello chunked world").unwrap();

        let source = FileSource::open(tmp.path()).await.unwrap();
        assert_eq!(source.len(), 19);

        let chunk = source.read_range(6..13).await.unwrap();
        assert_eq!(&chunk[..], b"chunked");
    }

    #[tokio::test]
    async fn test_file_source_missing_file() {
        let result = FileSource::open("/nonexistent/sealdrop-test-file").await;
        assert!(matches!(result, Err(ShareError::Io(_))));
    }
}
