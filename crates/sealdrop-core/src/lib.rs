//! sealdrop-core: shared types, config schema, and error types
//!
//! Everything the other sealdrop crates agree on lives here:
//! - `types`: the share data model (`FileMeta`, `Chunk`, `FileReference`,
//!   `SecretFile`) in the broker's camelCase wire format
//! - `error`: the central `ShareError` enum
//! - `config`: TOML configuration with environment-dependent transfer limits

pub mod config;
pub mod error;
pub mod types;

pub use config::{BrokerConfig, ShareConfig, TransferConfig, GB, MB};
pub use error::{ShareError, ShareResult};
pub use types::{Chunk, FileMeta, FileReference, SecretFile};
