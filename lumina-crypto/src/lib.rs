//! Credential hashing and random material for Lumina admission control.
//!
//! - Argon2id password hashing stored as PHC strings (salt per record)
//! - Constant-time comparison for secret-bearing strings
//! - OS-RNG backed key material and human-typed codes

mod error;
mod password;
mod random;

pub use error::{CryptoError, CryptoResult};
pub use password::{KdfParams, SALT_SIZE, hash_password, verify_password};
pub use random::{CODE_ALPHABET, constant_time_eq, random_bytes, random_code};
