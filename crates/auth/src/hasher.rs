//! Credential hashing.
//!
//! Digests are unsalted SHA-256, hex encoded, because that is the format
//! existing account rows were written with. The [`CredentialHasher`] trait is
//! the single place a salted, memory-hard scheme would be introduced.

use sha2::{Digest, Sha256};

/// One-way, deterministic transform of a plaintext credential.
pub trait CredentialHasher: Send + Sync {
    fn hash(&self, plaintext: &str) -> PasswordDigest;
}

/// Lower-case hex SHA-256 of the UTF-8 plaintext.
#[derive(Debug, Default, Clone, Copy)]
pub struct Sha256Hasher;

impl CredentialHasher for Sha256Hasher {
    fn hash(&self, plaintext: &str) -> PasswordDigest {
        PasswordDigest(hex::encode(Sha256::digest(plaintext.as_bytes())))
    }
}

/// Hash with the default hasher.
pub fn hash_password(plaintext: &str) -> PasswordDigest {
    Sha256Hasher.hash(plaintext)
}

/// A stored/comparable credential digest.
///
/// Deliberately not `Serialize`: digests never leave the server in responses.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct PasswordDigest(String);

impl PasswordDigest {
    /// Wrap a digest read back from storage.
    pub fn from_stored(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Debug for PasswordDigest {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("PasswordDigest(<redacted>)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_known_sha256_vectors() {
        assert_eq!(
            hash_password("abc").as_str(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(
            hash_password("").as_str(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn is_deterministic() {
        assert_eq!(hash_password("pw123"), hash_password("pw123"));
        assert_eq!(Sha256Hasher.hash("pw123"), hash_password("pw123"));
    }

    #[test]
    fn distinct_inputs_produce_distinct_digests() {
        let inputs = ["pw123", "pw124", "PW123", "pw123 ", "", "correct horse battery staple"];
        for (i, a) in inputs.iter().enumerate() {
            for b in &inputs[i + 1..] {
                assert_ne!(hash_password(a), hash_password(b), "{a:?} vs {b:?}");
            }
        }
    }

    #[test]
    fn digest_debug_is_redacted() {
        let rendered = format!("{:?}", hash_password("pw123"));
        assert_eq!(rendered, "PasswordDigest(<redacted>)");
    }

    #[test]
    fn stored_digest_compares_equal_to_fresh_hash() {
        let stored = PasswordDigest::from_stored(hash_password("pw123").as_str().to_string());
        assert_eq!(stored, hash_password("pw123"));
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn digest_is_64_lowercase_hex(input in ".*") {
                let digest = hash_password(&input);
                prop_assert_eq!(digest.as_str().len(), 64);
                prop_assert!(digest.as_str().chars().all(|c| matches!(c, '0'..='9' | 'a'..='f')));
                prop_assert_eq!(digest, hash_password(&input));
            }

            #[test]
            fn different_inputs_differ(a in ".{0,32}", b in ".{0,32}") {
                prop_assume!(a != b);
                prop_assert_ne!(hash_password(&a), hash_password(&b));
            }
        }
    }
}
