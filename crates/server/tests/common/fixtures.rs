//! Test fixtures for generating test data.
//! Note: #[allow(dead_code)] because each test file compiles common/ separately.

use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, PasswordHasher};
use fonoteca_core::token::{generate_token_secret, hash_token_secret};
use fonoteca_metadata::MetadataStore;
use fonoteca_metadata::models::{ApiClientRow, ApiKeyRow, SessionRow, UserRow};
use std::sync::Arc;
use time::OffsetDateTime;
use uuid::Uuid;

/// Generate deterministic audio-ish payload bytes based on a seed.
#[allow(dead_code)]
pub fn seeded_bytes(seed: u64, len: usize) -> Vec<u8> {
    let mut data = vec![0u8; len];
    let mut state = seed;

    for chunk in data.chunks_mut(8) {
        // Simple LCG for deterministic data
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
        let bytes = state.to_le_bytes();
        for (i, byte) in chunk.iter_mut().enumerate() {
            *byte = bytes[i % 8];
        }
    }

    data
}

/// Build a minimal WAV-flavored payload: RIFF/WAVE magic followed by
/// deterministic bytes. Enough for the classifier, not a playable file.
#[allow(dead_code)]
pub fn test_wav_data(seed: u64, len: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(len.max(12));
    data.extend_from_slice(b"RIFF");
    data.extend_from_slice(&(len as u32).to_le_bytes());
    data.extend_from_slice(b"WAVE");
    data.extend_from_slice(&seeded_bytes(seed, len.saturating_sub(12)));
    data
}

/// Hash a test password with Argon2id.
#[allow(dead_code)]
pub fn hash_password(password: &str) -> String {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .expect("hashing failed")
        .to_string()
}

/// Create a user with the given password.
#[allow(dead_code)]
pub async fn seed_user(
    metadata: &Arc<dyn MetadataStore>,
    username: &str,
    password: &str,
) -> UserRow {
    let user = UserRow {
        user_id: Uuid::new_v4(),
        username: username.to_string(),
        password_hash: hash_password(password),
        created_at: OffsetDateTime::now_utc(),
    };
    metadata.create_user(&user).await.expect("create user");
    user
}

/// Create an API client owned by `developer`; returns the row and the
/// plaintext client secret.
#[allow(dead_code)]
pub async fn seed_client(
    metadata: &Arc<dyn MetadataStore>,
    developer: Uuid,
    allow_password_grant: bool,
    scope: &str,
) -> (ApiClientRow, String) {
    let secret = generate_token_secret();
    let client = ApiClientRow {
        client_id: Uuid::new_v4(),
        user_id: developer,
        client_key: format!("client-{}", Uuid::new_v4()),
        client_secret_hash: hash_token_secret(&secret),
        name: "Test Application".to_string(),
        allow_password_grant,
        scope: scope.to_string(),
        created_at: OffsetDateTime::now_utc(),
    };
    metadata.create_client(&client).await.expect("create client");
    (client, secret)
}

/// Create an API key for `developer`; returns the plaintext secret.
#[allow(dead_code)]
pub async fn seed_api_key(metadata: &Arc<dyn MetadataStore>, developer: Uuid) -> String {
    let secret = generate_token_secret();
    let key = ApiKeyRow {
        key_id: Uuid::new_v4(),
        key_hash: hash_token_secret(&secret),
        user_id: developer,
        name: "test key".to_string(),
        created_at: OffsetDateTime::now_utc(),
    };
    metadata.create_api_key(&key).await.expect("create api key");
    secret
}

/// Create a browser session for `user`; returns the plaintext cookie value.
#[allow(dead_code)]
pub async fn seed_session(metadata: &Arc<dyn MetadataStore>, user: Uuid) -> String {
    let secret = generate_token_secret();
    let now = OffsetDateTime::now_utc();
    let session = SessionRow {
        session_id: Uuid::new_v4(),
        session_hash: hash_token_secret(&secret),
        user_id: user,
        created_at: now,
        expires_at: now + time::Duration::days(14),
    };
    metadata.create_session(&session).await.expect("create session");
    secret
}
