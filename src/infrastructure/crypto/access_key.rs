//! Per-customer access key

use sha2::{Digest, Sha256};

/// Random access key: hex SHA-256 of a fresh v4 UUID (64 hex chars)
pub fn generate_access_key() -> String {
    let seed = uuid::Uuid::new_v4();
    hex::encode(Sha256::digest(seed.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_is_64_hex_chars() {
        let key = generate_access_key();
        assert_eq!(key.len(), 64);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn keys_are_unique() {
        assert_ne!(generate_access_key(), generate_access_key());
    }
}
