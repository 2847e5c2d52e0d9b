//! Credentials: JWT, bcrypt password hashes, access keys

pub mod access_key;
pub mod jwt;
pub mod password;

pub use access_key::generate_access_key;
pub use jwt::{create_token, verify_token, JwtConfig, TokenClaims};
pub use password::{hash_password, verify_password};
