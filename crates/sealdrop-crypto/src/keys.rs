//! Master key type: 256-bit random key, base64 transport form
//!
//! The base64 form is what travels inside the share link as the data model's
//! `decryption_key` string; it never touches the broker or the object store.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rand::RngCore;
use zeroize::Zeroize;

use sealdrop_core::{ShareError, ShareResult};

use crate::KEY_SIZE;

/// A 256-bit symmetric key for chunk encryption. Zeroized on drop.
#[derive(Clone)]
pub struct MasterKey {
    bytes: [u8; KEY_SIZE],
}

impl MasterKey {
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }

    /// Generate a fresh random master key from the OS RNG.
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_SIZE];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self { bytes }
    }

    /// The `decryption_key` string form of the share data model.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.bytes)
    }

    /// Parse the base64 `decryption_key` string back into a key.
    pub fn from_base64(encoded: &str) -> ShareResult<Self> {
        let decoded = STANDARD
            .decode(encoded)
            .map_err(|e| ShareError::InvalidKey(format!("base64 decode: {e}")))?;

        if decoded.len() != KEY_SIZE {
            return Err(ShareError::InvalidKey(format!(
                "key is {} bytes (expected {})",
                decoded.len(),
                KEY_SIZE
            )));
        }

        let mut bytes = [0u8; KEY_SIZE];
        bytes.copy_from_slice(&decoded);
        Ok(Self { bytes })
    }
}

impl Drop for MasterKey {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl std::fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MasterKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}
