use thiserror::Error;

pub type ShareResult<T> = Result<T, ShareError>;

/// Central error taxonomy for the transfer engine.
///
/// Transient, path-local failures (`PresignedUrl` on upload, `DirectUpload`)
/// are absorbed by the transport's proxy fallback and never reach the job
/// caller; everything past the last fallback aborts the whole job. There is
/// no partial-success result for a multi-chunk job.
#[derive(Debug, Error)]
pub enum ShareError {
    #[error("empty file (zero bytes)")]
    EmptyFile,

    #[error("file of {size} bytes exceeds the {limit} byte limit")]
    FileTooLarge { size: u64, limit: u64 },

    #[error("presigned URL issuance failed: {0}")]
    PresignedUrl(String),

    #[error("direct upload failed: {0}")]
    DirectUpload(String),

    #[error("chunk upload failed for {key}: {reason}")]
    ChunkUpload { key: String, reason: String },

    #[error("couldn't retrieve chunk - the file may no longer exist")]
    ChunkUnavailable,

    #[error("not authorized to access this file")]
    Unauthorized,

    #[error("chunk decryption failed: wrong key or corrupted data")]
    Decryption,

    #[error("invalid key material: {0}")]
    InvalidKey(String),

    #[error("transfer cancelled")]
    Cancelled,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ShareError {
    /// True for failures the upload path recovers from by switching to the
    /// proxy route; fatal errors pass through the fallback loop untouched.
    pub fn is_direct_path_failure(&self) -> bool {
        matches!(
            self,
            ShareError::PresignedUrl(_) | ShareError::DirectUpload(_) | ShareError::Http(_)
        )
    }
}
