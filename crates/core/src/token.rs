//! Opaque credential secrets and the bearer token response shape.
//!
//! Access tokens, refresh tokens, API keys and session cookies all share
//! the same credential scheme: a random secret handed to the caller once,
//! with only its SHA-256 hash persisted for lookup.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Generate a random credential secret using cryptographically secure RNG.
pub fn generate_token_secret() -> String {
    use base64::Engine;
    use rand::RngCore;
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

/// Hash a credential secret for storage lookup (lowercase hex).
pub fn hash_token_secret(secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    let result = hasher.finalize();
    result.iter().map(|b| format!("{b:02x}")).collect()
}

/// Standard bearer-token response body for the token endpoint.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BearerTokenResponse {
    /// The access token secret (only returned once).
    pub access_token: String,
    /// Always "Bearer".
    pub token_type: String,
    /// Access token lifetime in seconds.
    pub expires_in: u64,
    /// The refresh token secret bound to this access token.
    pub refresh_token: String,
    /// Space-delimited granted scope names.
    pub scope: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secrets_are_unique_and_url_safe() {
        let a = generate_token_secret();
        let b = generate_token_secret();
        assert_ne!(a, b);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn test_hash_is_hex_and_deterministic() {
        let hash = hash_token_secret("some-secret");
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(hash, hash_token_secret("some-secret"));
        assert_ne!(hash, hash_token_secret("other-secret"));
    }
}
