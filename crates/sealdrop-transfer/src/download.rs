//! Download orchestrator
//!
//! Fetches chunks strictly in their stored order - never concurrently - and
//! re-streams the decrypted concatenation as one lazily-produced byte
//! sequence. Chunk order is the only reconstruction key (chunk identifiers
//! are random and unordered); concurrent fetch-and-decrypt would have to
//! buffer out-of-order chunks until their turn, and for small-to-medium
//! shared files sequential fetch is the accepted trade-off.

use bytes::Bytes;
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use sealdrop_core::types::SecretFile;
use sealdrop_core::{ShareError, ShareResult};
use sealdrop_crypto::{decrypt_chunk, MasterKey, CHUNK_OVERHEAD};

use crate::progress::{ProgressFn, ProgressGauge};
use crate::transport::ChunkTransport;

const CHANNEL_CAPACITY: usize = 4;

/// Reconstruct the plaintext of `secret` as an ordered byte stream.
///
/// Each item is one decrypted chunk; an `Err` item is terminal. Progress is
/// reported through `progress` after every network read event, so it moves
/// continuously even within a large single chunk. Dropping the returned
/// stream stops the job at the next chunk boundary.
pub fn download_file(
    transport: ChunkTransport,
    secret: SecretFile,
    progress: Option<ProgressFn>,
    cancel: CancellationToken,
) -> impl futures::Stream<Item = ShareResult<Bytes>> {
    let (tx, rx) = mpsc::channel::<ShareResult<Bytes>>(CHANNEL_CAPACITY);

    tokio::spawn(async move {
        if let Err(err) = run_download(&transport, &secret, &tx, progress, &cancel).await {
            // Receiver may already be gone; nothing further to do then.
            let _ = tx.send(Err(err)).await;
        }
    });

    ReceiverStream::new(rx)
}

async fn run_download(
    transport: &ChunkTransport,
    secret: &SecretFile,
    tx: &mpsc::Sender<ShareResult<Bytes>>,
    progress: Option<ProgressFn>,
    cancel: &CancellationToken,
) -> ShareResult<()> {
    let chunks = &secret.reference.chunks;
    if chunks.is_empty() {
        return Err(ShareError::Other(anyhow::anyhow!(
            "file reference contains no chunks"
        )));
    }

    let master_key = MasterKey::from_base64(&secret.decryption_key)?;
    let total: u64 = chunks.iter().map(|c| c.size).sum();
    let mut gauge = ProgressGauge::new(total, progress);

    info!(alias = %secret.alias, chunks = chunks.len(), total, "starting download");

    for (index, chunk) in chunks.iter().enumerate() {
        if cancel.is_cancelled() {
            return Err(ShareError::Cancelled);
        }

        let body = transport
            .fetch_chunk(&secret.alias, &secret.reference.bucket, chunk)
            .await?;
        futures::pin_mut!(body);

        let mut encrypted = Vec::with_capacity(chunk.size as usize + CHUNK_OVERHEAD);
        while let Some(frame) = body.next().await {
            let frame = frame.map_err(|_| ShareError::ChunkUnavailable)?;
            gauge.add(frame.len());
            encrypted.extend_from_slice(&frame);
        }

        if encrypted.is_empty() {
            return Err(ShareError::ChunkUnavailable);
        }

        let plaintext = decrypt_chunk(&master_key, &encrypted)?;
        debug!(index, bytes = plaintext.len(), "chunk decrypted");

        if tx.send(Ok(Bytes::from(plaintext))).await.is_err() {
            debug!("receiver dropped, stopping download");
            return Ok(());
        }
    }

    gauge.finish();
    Ok(())
}
