//! Deterministic hashing: the shared join key and the digest stream the
//! synthetic generator draws values from.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use sha2::{Digest, Sha256};

/// Salted join key both parties compute over the same identifier:
/// `base64(SHA-256(identifier || salt))`.
///
/// The salt is appended without a separator, so the key matches what a
/// warehouse-side `TO_BASE64(SHA256(CONCAT(identifier, salt)))` produces.
pub fn join_key(identifier: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(identifier.as_bytes());
    hasher.update(salt.as_bytes());
    STANDARD.encode(hasher.finalize())
}

/// First eight digest bytes of the tagged parts, as a big-endian integer.
///
/// This is the generator's only source of variation. Parts are separated
/// by a unit separator so `["ab", "c"]` and `["a", "bc"]` hash apart.
pub(crate) fn derive_u64(parts: &[&str]) -> u64 {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part.as_bytes());
        hasher.update([0x1f]);
    }
    let digest: [u8; 32] = hasher.finalize().into();
    let [b0, b1, b2, b3, b4, b5, b6, b7, ..] = digest;
    u64::from_be_bytes([b0, b1, b2, b3, b4, b5, b6, b7])
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_join_key_is_base64_of_a_sha256() {
        let key = join_key("jane.doe@example.com", "shared_salt");
        // 32 digest bytes encode to 44 base64 characters.
        assert_eq!(key.len(), 44);
        assert!(key.ends_with('='));
        assert_eq!(key, join_key("jane.doe@example.com", "shared_salt"));
    }

    #[test]
    fn test_salt_changes_the_key() {
        let a = join_key("jane.doe@example.com", "salt_one");
        let b = join_key("jane.doe@example.com", "salt_two");
        assert_ne!(a, b);
    }

    #[test]
    fn test_derive_u64_separates_parts() {
        assert_ne!(derive_u64(&["ab", "c"]), derive_u64(&["a", "bc"]));
        assert_eq!(derive_u64(&["dob", "x@y.z"]), derive_u64(&["dob", "x@y.z"]));
    }

    proptest! {
        #[test]
        fn prop_join_key_is_deterministic(id in ".{0,64}", salt in ".{0,64}") {
            prop_assert_eq!(join_key(&id, &salt), join_key(&id, &salt));
        }

        #[test]
        fn prop_distinct_salts_yield_distinct_keys(
            id in ".{1,64}",
            salt_a in ".{0,32}",
            salt_b in ".{0,32}",
        ) {
            prop_assume!(salt_a != salt_b);
            prop_assert_ne!(join_key(&id, &salt_a), join_key(&id, &salt_b));
        }
    }
}
