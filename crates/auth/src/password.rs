//! Password verifier: salted, adaptive one-way hashing (bcrypt).

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Work factor used for every stored hash.
pub const DEFAULT_HASH_COST: u32 = 10;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),
}

/// Stored password digest (bcrypt modular crypt format, salt included).
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap a digest loaded from storage.
    pub fn from_digest(digest: impl Into<String>) -> Self {
        Self(digest.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("PasswordHash(..)")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordHasher {
    cost: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordHasher {
    pub fn new() -> Self {
        Self {
            cost: DEFAULT_HASH_COST,
        }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hash a plaintext secret. Each call draws a fresh salt.
    pub fn hash(&self, plaintext: &str) -> Result<PasswordHash, PasswordError> {
        Ok(PasswordHash(bcrypt::hash(plaintext, self.cost)?))
    }

    /// Check a plaintext secret against a stored digest.
    ///
    /// An unparsable digest never matches.
    pub fn verify(&self, plaintext: &str, digest: &PasswordHash) -> bool {
        match bcrypt::verify(plaintext, digest.as_str()) {
            Ok(matches) => matches,
            Err(e) => {
                tracing::warn!(error = %e, "stored password digest could not be parsed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let hasher = PasswordHasher::new();
        let digest = hasher.hash("correct horse").unwrap();
        assert!(hasher.verify("correct horse", &digest));
        assert!(!hasher.verify("correct horse ", &digest));
        assert!(!hasher.verify("", &digest));
    }

    #[test]
    fn uses_work_factor_ten() {
        let digest = PasswordHasher::new().hash("pw").unwrap();
        assert!(digest.as_str().starts_with("$2b$10$"), "{}", digest.as_str());
    }

    #[test]
    fn salt_differs_per_call() {
        let hasher = PasswordHasher::new();
        let a = hasher.hash("same").unwrap();
        let b = hasher.hash("same").unwrap();
        assert_ne!(a, b);
        assert!(hasher.verify("same", &a));
        assert!(hasher.verify("same", &b));
    }

    #[test]
    fn garbage_digest_never_matches() {
        let hasher = PasswordHasher::new();
        assert!(!hasher.verify("anything", &PasswordHash::from_digest("not-a-bcrypt-hash")));
    }

    #[test]
    fn debug_hides_digest() {
        let digest = PasswordHasher::new().hash("pw").unwrap();
        assert_eq!(format!("{digest:?}"), "PasswordHash(..)");
    }
}
