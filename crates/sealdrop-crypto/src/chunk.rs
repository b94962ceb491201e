//! Per-chunk XChaCha20-Poly1305 encryption/decryption
//!
//! Encrypted chunk format (binary):
//! ```text
//! [24 bytes: random nonce][N bytes: ciphertext][16 bytes: Poly1305 tag]
//! ```
//!
//! Every chunk of a file is encrypted under the same master key with a fresh
//! random nonce. Reassembly order lives solely in the share's ordered chunk
//! list; the ciphertext carries no positional binding.

use chacha20poly1305::{
    aead::{Aead, KeyInit},
    XChaCha20Poly1305, XNonce,
};
use rand::RngCore;

use sealdrop_core::{ShareError, ShareResult};

use crate::keys::MasterKey;
use crate::{NONCE_SIZE, TAG_SIZE};

/// Fixed size delta between plaintext and ciphertext (nonce + tag).
///
/// Upstream size accounting relies on this being constant: an encrypted
/// chunk is always exactly `plaintext.len() + CHUNK_OVERHEAD` bytes.
pub const CHUNK_OVERHEAD: usize = NONCE_SIZE + TAG_SIZE;

/// Encrypt a single chunk with XChaCha20-Poly1305.
///
/// Returns `[24-byte nonce][ciphertext][16-byte tag]`.
pub fn encrypt_chunk(key: &MasterKey, plaintext: &[u8]) -> ShareResult<Vec<u8>> {
    let cipher = XChaCha20Poly1305::new(key.as_bytes().into());

    let mut nonce_bytes = [0u8; NONCE_SIZE];
    rand::thread_rng().fill_bytes(&mut nonce_bytes);
    let nonce = XNonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, plaintext)
        .map_err(|e| anyhow::anyhow!("chunk encryption failed: {e}"))?;

    let mut result = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
    result.extend_from_slice(&nonce_bytes);
    result.extend_from_slice(&ciphertext);
    Ok(result)
}

/// Decrypt a single chunk with XChaCha20-Poly1305.
///
/// The Poly1305 tag is verified before any plaintext is returned; a wrong
/// key or a single flipped ciphertext bit yields `ShareError::Decryption`.
pub fn decrypt_chunk(key: &MasterKey, encrypted: &[u8]) -> ShareResult<Vec<u8>> {
    if encrypted.len() < CHUNK_OVERHEAD {
        return Err(ShareError::Decryption);
    }

    let (nonce_bytes, ciphertext) = encrypted.split_at(NONCE_SIZE);
    let nonce = XNonce::from_slice(nonce_bytes);
    let cipher = XChaCha20Poly1305::new(key.as_bytes().into());

    cipher
        .decrypt(nonce, ciphertext)
        .map_err(|_| ShareError::Decryption)
}
