//! Password hashing and verification.
//!
//! bcrypt with a fixed cost; the salt is embedded in the stored hash.
//! The cost bounds the CPU spent per login attempt, keeping request
//! latency predictable under load.

use anyhow::{Context, Result};
use bcrypt::DEFAULT_COST;

/// Hash a plaintext password for storage.
pub fn hash(plaintext: &str) -> Result<String> {
    bcrypt::hash(plaintext, DEFAULT_COST).context("Failed to hash password")
}

/// Verify a plaintext password against a stored hash.
///
/// Returns `false` for malformed stored hashes instead of erroring;
/// a corrupt credential record must read as "wrong password".
pub fn verify(plaintext: &str, stored_hash: &str) -> bool {
    bcrypt::verify(plaintext, stored_hash).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_roundtrip() {
        let hashed = hash("secret").unwrap();
        assert!(verify("secret", &hashed));
        assert!(!verify("wrong", &hashed));
    }

    #[test]
    fn same_password_hashes_differently() {
        let a = hash("secret").unwrap();
        let b = hash("secret").unwrap();
        assert_ne!(a, b);
        assert!(verify("secret", &a));
        assert!(verify("secret", &b));
    }

    #[test]
    fn malformed_hash_is_just_wrong() {
        assert!(!verify("secret", "not-a-bcrypt-hash"));
        assert!(!verify("secret", ""));
    }
}
