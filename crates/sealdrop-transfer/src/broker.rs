//! HTTP client for the URL broker and its sibling endpoints
//!
//! The broker issues short-lived presigned URLs against the object store,
//! accepts proxied chunk writes when direct access fails, and persists the
//! share record. Request/response bodies are camelCase JSON.
//!
//! Download-URL issuance is the system's sole access-control checkpoint: the
//! broker verifies the chunk-key signature against the alias's registered
//! public key before issuing a read URL. Rejections surface as an opaque
//! authorization failure - callers cannot tell an unknown alias from a bad
//! signature, so aliases cannot be enumerated.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use sealdrop_core::{ShareError, ShareResult};

use crate::retry::RetryPolicy;

pub(crate) const OCTET_STREAM: &str = "application/octet-stream";

#[derive(Debug, Clone)]
pub struct BrokerClient {
    http: Client,
    base_url: String,
    retry: RetryPolicy,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UploadUrlRequest<'a> {
    key: &'a str,
    content_type: &'a str,
    bucket: &'a str,
}

#[derive(Debug, Deserialize)]
struct SignedUrlResponse {
    url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DownloadUrlRequest<'a> {
    alias: &'a str,
    bucket: &'a str,
    key_hash: &'a str,
    signature: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProxyUploadRequest<'a> {
    key: &'a str,
    /// Chunk bytes, base64-encoded for JSON transport.
    content: String,
    content_type: &'a str,
    bucket: &'a str,
}

/// The share record registered after a successful upload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSecretRequest {
    pub alias: String,
    pub public_key: String,
    /// `FileMeta` as a JSON string, stored opaquely by the broker.
    pub file_meta: String,
    /// `FileReference` as a JSON string, stored opaquely by the broker.
    pub file_reference: String,
    pub file_size: u64,
}

impl BrokerClient {
    pub fn new(base_url: &str, timeout: Duration, retry: RetryPolicy) -> ShareResult<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            retry,
        })
    }

    pub(crate) fn http(&self) -> &Client {
        &self.http
    }

    pub(crate) fn retry(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Request a short-lived single-object write URL for `(bucket, key)`.
    pub async fn issue_upload_url(&self, bucket: &str, key: &str) -> ShareResult<Url> {
        let endpoint = format!("{}/api/v1/presigned-url", self.base_url);
        let body = UploadUrlRequest {
            key,
            content_type: OCTET_STREAM,
            bucket,
        };

        let response = self
            .retry
            .run(|| {
                let request = self.http.post(&endpoint).json(&body);
                async move { request.send().await?.error_for_status() }
            })
            .await
            .map_err(|e| ShareError::PresignedUrl(e.to_string()))?;

        let signed: SignedUrlResponse = response
            .json()
            .await
            .map_err(|e| ShareError::PresignedUrl(format!("malformed response: {e}")))?;

        debug!(key, "issued upload URL");
        parse_signed_url(&signed.url)
    }

    /// Request a short-lived read URL for one chunk, authenticated by the
    /// sender's signature over the chunk key.
    pub async fn issue_download_url(
        &self,
        alias: &str,
        bucket: &str,
        key: &str,
        key_hash: &str,
        signature: &str,
    ) -> ShareResult<Url> {
        let endpoint = format!("{}/api/v1/files/{}", self.base_url, key);
        let body = DownloadUrlRequest {
            alias,
            bucket,
            key_hash,
            signature,
        };

        let response = self
            .retry
            .run(|| {
                let request = self.http.post(&endpoint).json(&body);
                async move { request.send().await?.error_for_status() }
            })
            .await
            .map_err(|e| {
                if e.status().is_some_and(|status| status.is_client_error()) {
                    // Unknown alias and invalid signature are deliberately
                    // indistinguishable here.
                    ShareError::Unauthorized
                } else {
                    ShareError::PresignedUrl(e.to_string())
                }
            })?;

        let signed: SignedUrlResponse = response
            .json()
            .await
            .map_err(|e| ShareError::PresignedUrl(format!("malformed response: {e}")))?;

        debug!(alias, key_hash, "issued download URL");
        parse_signed_url(&signed.url)
    }

    /// Submit a chunk through the server-mediated write path. Not retried:
    /// this is the last resort after the direct path has already failed.
    pub async fn proxy_upload(&self, bucket: &str, key: &str, content: &[u8]) -> ShareResult<()> {
        let endpoint = format!("{}/api/v1/upload-proxy", self.base_url);
        let body = ProxyUploadRequest {
            key,
            content: STANDARD.encode(content),
            content_type: OCTET_STREAM,
            bucket,
        };

        self.http
            .post(&endpoint)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        debug!(key, bytes = content.len(), "proxy upload complete");
        Ok(())
    }

    /// Register the share record (alias, public key, metadata, reference).
    pub async fn create_secret(&self, secret: &CreateSecretRequest) -> ShareResult<()> {
        let endpoint = format!("{}/api/v1/secrets", self.base_url);

        self.http
            .post(&endpoint)
            .json(secret)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| ShareError::Other(anyhow::anyhow!("storing secret: {e}")))?;

        debug!(alias = %secret.alias, "share record created");
        Ok(())
    }
}

fn parse_signed_url(raw: &str) -> ShareResult<Url> {
    Url::parse(raw).map_err(|e| ShareError::PresignedUrl(format!("invalid URL from broker: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requests_serialize_camel_case() {
        let upload = UploadUrlRequest {
            key: "abc",
            content_type: OCTET_STREAM,
            bucket: "shares",
        };
        let json = serde_json::to_string(&upload).unwrap();
        assert!(json.contains("\"contentType\""));

        let download = DownloadUrlRequest {
            alias: "a",
            bucket: "b",
            key_hash: "deadbeef",
            signature: "sig",
        };
        let json = serde_json::to_string(&download).unwrap();
        assert!(json.contains("\"keyHash\""));

        let secret = CreateSecretRequest {
            alias: "a".into(),
            public_key: "pk".into(),
            file_meta: "{}".into(),
            file_reference: "{}".into(),
            file_size: 42,
        };
        let json = serde_json::to_string(&secret).unwrap();
        assert!(json.contains("\"publicKey\""));
        assert!(json.contains("\"fileReference\""));
        assert!(json.contains("\"fileSize\""));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let broker = BrokerClient::new(
            "http://localhost:3000/",
            Duration::from_secs(5),
            RetryPolicy::default(),
        )
        .unwrap();
        assert_eq!(broker.base_url, "http://localhost:3000");
    }

    #[test]
    fn test_invalid_signed_url_rejected() {
        let result = parse_signed_url("not a url");
        assert!(matches!(result, Err(ShareError::PresignedUrl(_))));
    }
}
