//! sealdrop-crypto: client-side cryptography for encrypted file sharing
//!
//! Pipeline: plaintext slice → encrypt (XChaCha20-Poly1305, master key) →
//! upload under BLAKE3(chunk key), with an Ed25519 signature over the chunk
//! key binding "this chunk belongs to this sender" without revealing sender
//! identity to the storage layer.
//!
//! ```text
//! Master Key (256-bit random, travels base64 inside the share link)
//!   └── Chunk AEAD: XChaCha20-Poly1305 (nonce = random 192-bit per chunk)
//! Sender keypair (Ed25519, per share)
//!   └── signature over chunk key → download authorization at the broker
//! ```
//!
//! All operations are pure and side-effect-free; a failure never partially
//! mutates caller state.

pub mod chunk;
pub mod hashing;
pub mod identity;
pub mod keys;

pub use chunk::{decrypt_chunk, encrypt_chunk, CHUNK_OVERHEAD};
pub use hashing::hash_key;
pub use identity::{verify, SenderIdentity};
pub use keys::MasterKey;

/// Size of a master key in bytes (256-bit)
pub const KEY_SIZE: usize = 32;

/// Size of an XChaCha20-Poly1305 nonce (192-bit)
pub const NONCE_SIZE: usize = 24;

/// Size of a Poly1305 authentication tag
pub const TAG_SIZE: usize = 16;
