//! sealdrop-transfer: the chunked encrypted transfer engine
//!
//! Upload: split a file into fixed-size chunks, encrypt and sign each chunk,
//! and move them to content-addressed storage through a bounded worker pool
//! with a two-path transport (direct presigned HTTP, proxy fallback).
//!
//! Download: fetch chunks strictly in their stored order, decrypt each, and
//! re-stream the concatenation as one ordered byte sequence with live
//! progress.
//!
//! - `plan`: deterministic chunk partitioning
//! - `source`: byte-range read abstraction over the plaintext file
//! - `broker`: HTTP client for the URL broker / proxy / secrets endpoints
//! - `transport`: per-chunk upload (direct → proxy) and fetch
//! - `upload` / `download`: the two orchestrators
//! - `progress` / `retry`: progress accounting and the HTTP retry policy

pub mod broker;
pub mod download;
pub mod plan;
pub mod progress;
pub mod retry;
pub mod source;
pub mod transport;
pub mod upload;

pub use broker::{BrokerClient, CreateSecretRequest};
pub use download::download_file;
pub use plan::ChunkPlan;
pub use progress::ProgressFn;
pub use retry::RetryPolicy;
pub use source::{ChunkSource, FileSource, MemorySource};
pub use transport::ChunkTransport;
pub use upload::{upload_file, UploadOptions};

/// Upload worker pool ceiling; the effective pool is `min(3, chunk count)`.
pub const MAX_CONCURRENT_UPLOADS: usize = 3;
