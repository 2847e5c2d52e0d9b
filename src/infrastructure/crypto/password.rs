//! Password hashing

use bcrypt::{hash, verify, DEFAULT_COST};

/// Hash a password using bcrypt
pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    hash(password, DEFAULT_COST)
}

/// Verify a password against a bcrypt hash
pub fn verify_password(password: &str, hash: &str) -> Result<bool, bcrypt::BcryptError> {
    verify(password, hash)
}

/// Hash with the minimum cost. Tests only; DEFAULT_COST is slow.
#[cfg(test)]
pub fn hash_password_fast(password: &str) -> String {
    hash(password, 4).unwrap()
}
