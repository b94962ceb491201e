//! Ed25519 sender identity: chunk-key signing and verification
//!
//! Each share gets a fresh keypair. The public key is registered with the
//! share's alias; every chunk key is signed by the sender, and the broker
//! verifies the signature before issuing a download URL. This binds "this
//! chunk belongs to this sender" without revealing sender identity to the
//! storage layer.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey, SECRET_KEY_LENGTH};
use rand::rngs::OsRng;

use sealdrop_core::{ShareError, ShareResult};

/// The sender's signing keypair for one share.
#[derive(Clone)]
pub struct SenderIdentity {
    signing_key: SigningKey,
}

impl SenderIdentity {
    /// Generate a fresh Ed25519 keypair from the OS RNG.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Restore an identity from its raw secret key bytes.
    pub fn from_secret_key_bytes(bytes: &[u8; SECRET_KEY_LENGTH]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(bytes),
        }
    }

    /// Secret key bytes, for secure storage only.
    pub fn secret_key_bytes(&self) -> [u8; SECRET_KEY_LENGTH] {
        self.signing_key.to_bytes()
    }

    /// Public key in the base64 form the metadata store persists.
    pub fn public_key_base64(&self) -> String {
        STANDARD.encode(self.signing_key.verifying_key().to_bytes())
    }

    /// Sign a chunk key; the result is the chunk descriptor's `signature`.
    pub fn sign(&self, message: &str) -> String {
        let signature = self.signing_key.sign(message.as_bytes());
        STANDARD.encode(signature.to_bytes())
    }
}

impl std::fmt::Debug for SenderIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SenderIdentity")
            .field("public_key", &self.public_key_base64())
            .finish()
    }
}

/// Verify a base64 signature over `message` against a base64 public key.
///
/// Returns false for any malformed input; the caller treats invalid and
/// unverifiable signatures identically.
pub fn verify(message: &str, signature_b64: &str, public_key_b64: &str) -> bool {
    let Ok(key_bytes) = decode_fixed::<32>(public_key_b64) else {
        return false;
    };
    let Ok(verifying_key) = VerifyingKey::from_bytes(&key_bytes) else {
        return false;
    };
    let Ok(sig_bytes) = decode_fixed::<64>(signature_b64) else {
        return false;
    };
    let signature = Signature::from_bytes(&sig_bytes);

    verifying_key.verify(message.as_bytes(), &signature).is_ok()
}

fn decode_fixed<const N: usize>(encoded: &str) -> ShareResult<[u8; N]> {
    let decoded = STANDARD
        .decode(encoded)
        .map_err(|e| ShareError::InvalidKey(format!("base64 decode: {e}")))?;
    decoded
        .try_into()
        .map_err(|_| ShareError::InvalidKey(format!("expected {N} bytes")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_verify_roundtrip() {
        let identity = SenderIdentity::generate();
        let message = "3f0c9f2a-8a77-4d4e-9e6b-0f8a1b2c3d4e";

        let signature = identity.sign(message);
        assert!(verify(message, &signature, &identity.public_key_base64()));
    }

    #[test]
    fn test_tampered_signature_rejected() {
        let identity = SenderIdentity::generate();
        let signature = identity.sign("chunk-key");

        // Re-encode with one corrupted byte
        let mut raw = STANDARD.decode(&signature).unwrap();
        raw[0] ^= 0xFF;
        let tampered = STANDARD.encode(&raw);

        assert!(!verify("chunk-key", &tampered, &identity.public_key_base64()));
    }

    #[test]
    fn test_wrong_message_rejected() {
        let identity = SenderIdentity::generate();
        let signature = identity.sign("chunk-key");
        assert!(!verify(
            "other-chunk-key",
            &signature,
            &identity.public_key_base64()
        ));
    }

    #[test]
    fn test_wrong_public_key_rejected() {
        let identity = SenderIdentity::generate();
        let other = SenderIdentity::generate();
        let signature = identity.sign("chunk-key");
        assert!(!verify("chunk-key", &signature, &other.public_key_base64()));
    }

    #[test]
    fn test_malformed_inputs_do_not_panic() {
        assert!(!verify("m", "not base64!", "also not base64!"));
        assert!(!verify("m", &STANDARD.encode([0u8; 10]), &STANDARD.encode([0u8; 10])));
    }

    #[test]
    fn test_identity_restores_from_secret_bytes() {
        let identity = SenderIdentity::generate();
        let restored = SenderIdentity::from_secret_key_bytes(&identity.secret_key_bytes());

        assert_eq!(identity.public_key_base64(), restored.public_key_base64());
        let signature = restored.sign("chunk-key");
        assert!(verify("chunk-key", &signature, &identity.public_key_base64()));
    }
}
