//! Upload orchestrator
//!
//! Runs the chunk planner and a bounded pool of concurrent chunk uploads,
//! aggregates per-chunk progress into one overall value, and returns the
//! chunk descriptors ordered by original chunk index - the only mechanism
//! that lets a later download reconstruct the file.

use std::sync::Arc;

use futures::{StreamExt, TryStreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use uuid::Uuid;

use sealdrop_core::config::ShareConfig;
use sealdrop_core::types::Chunk;
use sealdrop_core::{ShareError, ShareResult};
use sealdrop_crypto::{encrypt_chunk, hash_key, MasterKey, SenderIdentity};

use crate::plan::ChunkPlan;
use crate::progress::{ProgressFn, ProgressTable};
use crate::source::ChunkSource;
use crate::transport::ChunkTransport;
use crate::MAX_CONCURRENT_UPLOADS;

#[derive(Debug, Clone)]
pub struct UploadOptions {
    pub bucket: String,
    /// Plaintext bytes per chunk.
    pub chunk_size: u64,
    /// Uploads larger than this are rejected before planning.
    pub max_file_size: u64,
}

impl UploadOptions {
    pub fn from_config(config: &ShareConfig) -> Self {
        Self {
            bucket: config.broker.bucket.clone(),
            chunk_size: config.transfer.chunk_size,
            max_file_size: config.transfer.max_file_size,
        }
    }
}

/// Encrypt and upload `source`, returning the chunk descriptors in planned
/// order regardless of per-chunk completion order.
///
/// Any fatal per-chunk failure aborts the whole job; chunks already stored
/// are not cleaned up here (that is the storage layer's concern). A failed
/// job must be restarted from scratch.
pub async fn upload_file<S: ChunkSource>(
    transport: &ChunkTransport,
    source: &S,
    master_key: &MasterKey,
    identity: &SenderIdentity,
    options: &UploadOptions,
    progress: Option<ProgressFn>,
    cancel: &CancellationToken,
) -> ShareResult<Vec<Chunk>> {
    let size = source.len();
    if size == 0 {
        return Err(ShareError::EmptyFile);
    }
    if size > options.max_file_size {
        return Err(ShareError::FileTooLarge {
            size,
            limit: options.max_file_size,
        });
    }

    let plan = ChunkPlan::new(size, options.chunk_size)?;
    let count = plan.count();
    let concurrency = count.min(MAX_CONCURRENT_UPLOADS);

    let table = Arc::new(ProgressTable::new(count, progress));
    table.emit_start();

    info!(size, count, concurrency, bucket = %options.bucket, "starting upload");

    // Buffered over per-index jobs: bounded concurrency, output in input
    // order no matter which upload finishes first.
    let chunks: Vec<Chunk> = futures::stream::iter((0..count).map(|index| {
        upload_one(
            transport, source, plan, index, master_key, identity, &options.bucket, &table, cancel,
        )
    }))
    .buffered(concurrency)
    .try_collect()
    .await?;

    info!(count = chunks.len(), "upload complete");
    Ok(chunks)
}

#[allow(clippy::too_many_arguments)]
async fn upload_one<S: ChunkSource>(
    transport: &ChunkTransport,
    source: &S,
    plan: ChunkPlan,
    index: usize,
    master_key: &MasterKey,
    identity: &SenderIdentity,
    bucket: &str,
    table: &Arc<ProgressTable>,
    cancel: &CancellationToken,
) -> ShareResult<Chunk> {
    if cancel.is_cancelled() {
        return Err(ShareError::Cancelled);
    }

    let range = plan.range(index);
    let plain_size = range.end - range.start;

    let plaintext = source.read_range(range).await?;
    let encrypted = encrypt_chunk(master_key, &plaintext)?;

    let key = Uuid::new_v4().to_string();
    let signature = identity.sign(&key);
    let key_hash = hash_key(&key);

    let per_chunk = {
        let table = table.clone();
        move |fraction: f64| table.report(index, fraction)
    };
    transport
        .upload_chunk(bucket, &key_hash, encrypted.into(), per_chunk)
        .await?;

    debug!(index, key = %key_hash, size = plain_size, "chunk uploaded");

    // Descriptor records the PLAINTEXT slice size so downstream accounting
    // matches what the user sees.
    Ok(Chunk {
        key,
        signature,
        size: plain_size,
    })
}
