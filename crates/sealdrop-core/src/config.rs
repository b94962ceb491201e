use serde::{Deserialize, Serialize};

/// Decimal megabyte (1 000 000 bytes), matching the broker's accounting.
pub const MB: u64 = 1_000_000;
/// Decimal gigabyte (1 000 000 000 bytes).
pub const GB: u64 = 1_000_000_000;

/// Top-level client configuration (loaded from sealdrop.toml)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShareConfig {
    pub broker: BrokerConfig,
    pub transfer: TransferConfig,
    /// Log level (default: info)
    pub log_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrokerConfig {
    /// Base URL of the URL broker / proxy server
    pub base_url: String,
    /// Default bucket for uploads
    pub bucket: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Retry attempts for idempotent broker calls
    pub max_retries: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferConfig {
    /// Plaintext bytes per chunk
    pub chunk_size: u64,
    /// Uploads larger than this are rejected before planning
    pub max_file_size: u64,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".into(),
            bucket: "sealdrop".into(),
            timeout_secs: 120,
            max_retries: 5,
        }
    }
}

impl Default for TransferConfig {
    fn default() -> Self {
        TransferConfig::for_environment("development")
    }
}

impl TransferConfig {
    /// Environment-dependent limits: 3 MB chunks and a 10 GB cap in
    /// production, 1 MB and 1 GB everywhere else.
    pub fn for_environment(env: &str) -> Self {
        if env == "production" {
            Self {
                chunk_size: 3 * MB,
                max_file_size: 10 * GB,
            }
        } else {
            Self {
                chunk_size: MB,
                max_file_size: GB,
            }
        }
    }
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            broker: BrokerConfig::default(),
            transfer: TransferConfig::default(),
            log_level: "info".into(),
        }
    }
}
