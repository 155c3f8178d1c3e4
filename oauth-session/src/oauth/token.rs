//! Token helpers: random opaque handles and the default internal-token generator.

use rand::Rng;
use sha2::{Digest, Sha256};

/// Generate a cryptographically random token (32 bytes, hex encoded).
///
/// Used for temporary session tokens and CSRF state values.
pub fn random_token() -> String {
    let random_bytes: [u8; 32] = rand::thread_rng().gen();
    hex::encode(random_bytes)
}

/// Internal-token generator deriving the host token from the provider access token.
///
/// Hex-encoded SHA-256, so the host never stores the access token itself as a key.
pub fn sha256_hex(access_token: &str) -> String {
    hex::encode(Sha256::digest(access_token.as_bytes()))
}
