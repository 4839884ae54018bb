//! One-way password hashing.

use anyhow::{Context, Result};

/// Salted, slow, one-way password hashing.
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, password: &str) -> Result<String>;

    /// `Ok(false)` on mismatch; `Err` only if the stored digest is unusable.
    fn verify(&self, password: &str, digest: &str) -> Result<bool>;
}

/// bcrypt with a configurable work factor.
#[derive(Debug, Clone)]
pub struct BcryptHasher {
    cost: u32,
}

impl BcryptHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }
}

impl PasswordHasher for BcryptHasher {
    fn hash(&self, password: &str) -> Result<String> {
        bcrypt::hash(password, self.cost).context("password hashing failed")
    }

    fn verify(&self, password: &str, digest: &str) -> Result<bool> {
        bcrypt::verify(password, digest).context("password verification failed")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashes_are_salted_and_verifiable() {
        let hasher = BcryptHasher::new(4);
        let first = hasher.hash("pw1").unwrap();
        let second = hasher.hash("pw1").unwrap();

        assert_ne!(first, second);
        assert_ne!(first, "pw1");
        assert!(hasher.verify("pw1", &first).unwrap());
        assert!(hasher.verify("pw1", &second).unwrap());
        assert!(!hasher.verify("pw2", &first).unwrap());
    }

    #[test]
    fn malformed_digest_is_an_error() {
        let hasher = BcryptHasher::new(4);
        assert!(hasher.verify("pw1", "not-a-bcrypt-digest").is_err());
    }
}
