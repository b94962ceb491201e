//! BLAKE3 hashing of chunk keys
//!
//! The random chunk key is hashed before it becomes the object-store key, so
//! the store's key space leaks nothing correlating chunks to a file or to
//! each other. One-way and deterministic: the broker recomputes nothing, it
//! receives the hash from the client and the raw key only inside the signed
//! download request.

/// Hash a chunk key into its object-store form (64 hex chars).
pub fn hash_key(key: &str) -> String {
    blake3::hash(key.as_bytes()).to_hex().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_hash_is_hex_of_fixed_length() {
        let h = hash_key("3f0c9f2a-8a77-4d4e-9e6b-0f8a1b2c3d4e");
        assert_eq!(h.len(), 64);
        assert!(h.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_different_keys_different_hashes() {
        assert_ne!(hash_key("chunk-a"), hash_key("chunk-b"));
    }

    proptest! {
        #[test]
        fn hash_is_deterministic(key in "[a-z0-9-]{1,64}") {
            prop_assert_eq!(hash_key(&key), hash_key(&key));
        }
    }
}
