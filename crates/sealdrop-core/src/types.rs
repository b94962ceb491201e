//! Share data model, serialized in the broker's camelCase wire format.
//!
//! `FileMeta`, `FileReference`, and `Chunk` are produced once by the upload
//! orchestrator and handed to the metadata store; a recipient reconstitutes
//! them into a `SecretFile` to drive a download. The chunk order inside
//! `FileReference.chunks` is the only record of reassembly order - chunk keys
//! are random and carry no ordering information.

use serde::{Deserialize, Serialize};

/// Description of the plaintext file, immutable once computed at plan time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMeta {
    pub name: String,
    /// Plaintext size in bytes.
    pub size: u64,
    pub mime_type: String,
    pub is_single_chunk: bool,
}

/// One uploaded chunk, created exactly once at upload time.
///
/// The stored object lives under `hash(key)`; `size` is the PLAINTEXT slice
/// size (not the encrypted size), so downstream progress and stats accounting
/// match what the user sees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chunk {
    /// Random identifier, unique per chunk.
    pub key: String,
    /// Sender's Ed25519 signature over `key`, base64.
    pub signature: String,
    /// Plaintext chunk size in bytes.
    pub size: u64,
}

/// Where the encrypted chunks live and in which order they reassemble.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileReference {
    pub bucket: String,
    pub chunks: Vec<Chunk>,
}

impl FileReference {
    /// Sum of plaintext chunk sizes; equals `FileMeta.size` by invariant.
    pub fn total_size(&self) -> u64 {
        self.chunks.iter().map(|c| c.size).sum()
    }
}

/// Recipient-side view of a share: everything needed to fetch and decrypt.
///
/// Download progress is not part of this type; the download orchestrator
/// owns it and reports through a callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretFile {
    #[serde(flatten)]
    pub meta: FileMeta,
    #[serde(flatten)]
    pub reference: FileReference,
    pub alias: String,
    /// Base64 master key for chunk decryption.
    pub decryption_key: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_secret() -> SecretFile {
        SecretFile {
            meta: FileMeta {
                name: "report.pdf".into(),
                size: 7_000_000,
                mime_type: "application/pdf".into(),
                is_single_chunk: false,
            },
            reference: FileReference {
                bucket: "shares".into(),
                chunks: vec![
                    Chunk {
                        key: "k1".into(),
                        signature: "s1".into(),
                        size: 3_000_000,
                    },
                    Chunk {
                        key: "k2".into(),
                        signature: "s2".into(),
                        size: 3_000_000,
                    },
                    Chunk {
                        key: "k3".into(),
                        signature: "s3".into(),
                        size: 1_000_000,
                    },
                ],
            },
            alias: "a1b2c3".into(),
            decryption_key: "bWFzdGVy".into(),
        }
    }

    #[test]
    fn test_total_size_matches_meta() {
        let secret = sample_secret();
        assert_eq!(secret.reference.total_size(), secret.meta.size);
    }

    #[test]
    fn test_wire_format_is_camel_case() {
        let json = serde_json::to_string(&sample_secret()).unwrap();
        assert!(json.contains("\"mimeType\""));
        assert!(json.contains("\"isSingleChunk\""));
        assert!(json.contains("\"decryptionKey\""));
        assert!(!json.contains("mime_type"));
    }

    #[test]
    fn test_secret_file_roundtrip_preserves_chunk_order() {
        let secret = sample_secret();
        let json = serde_json::to_string(&secret).unwrap();
        let back: SecretFile = serde_json::from_str(&json).unwrap();
        assert_eq!(back, secret);
        let keys: Vec<_> = back.reference.chunks.iter().map(|c| &c.key).collect();
        assert_eq!(keys, vec!["k1", "k2", "k3"]);
    }
}
