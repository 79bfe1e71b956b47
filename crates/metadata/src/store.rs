//! Metadata store trait and SQLite implementation.

use crate::error::{MetadataError, MetadataResult};
use crate::repos::{
    ApiKeyRepo, ClientRepo, GeoTagRepo, LicenseRepo, PackRepo, SessionRepo, SoundRepo, TokenRepo,
    UserRepo,
};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Combined metadata store trait.
#[async_trait]
pub trait MetadataStore:
    UserRepo
    + ClientRepo
    + TokenRepo
    + ApiKeyRepo
    + SessionRepo
    + LicenseRepo
    + SoundRepo
    + PackRepo
    + GeoTagRepo
    + Send
    + Sync
{
    /// Run database migrations.
    async fn migrate(&self) -> MetadataResult<()>;

    /// Check database connectivity and health.
    async fn health_check(&self) -> MetadataResult<()>;
}

/// SQLite-based metadata store.
pub struct SqliteStore {
    pool: Pool<Sqlite>,
}

impl SqliteStore {
    /// Create a new SQLite store.
    pub async fn new(path: impl AsRef<Path>) -> MetadataResult<Self> {
        let path = path.as_ref();

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| MetadataError::Internal(format!("create db directory: {e}")))?;
        }

        let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}?mode=rwc", path.display()))?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
            // Required: refresh tokens are removed by the cascade when
            // their access token is deleted.
            .foreign_keys(true)
            // Prevent transient "database is locked" errors under concurrent access.
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            // SQLite permits limited write concurrency; a single connection
            // avoids persistent "database is locked" failures under axum
            // concurrency.
            .max_connections(1)
            .connect_with(opts)
            .await?;

        let store = Self { pool };
        store.migrate().await?;

        Ok(store)
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }
}

#[async_trait]
impl MetadataStore for SqliteStore {
    async fn migrate(&self) -> MetadataResult<()> {
        sqlx::query(SCHEMA_SQL).execute(&self.pool).await?;
        Ok(())
    }

    async fn health_check(&self) -> MetadataResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

// Implement all the repository traits for SqliteStore
mod sqlite_impl {
    use super::*;
    use crate::models::*;
    use time::OffsetDateTime;
    use uuid::Uuid;

    #[async_trait]
    impl UserRepo for SqliteStore {
        async fn create_user(&self, user: &UserRow) -> MetadataResult<()> {
            sqlx::query(
                "INSERT INTO users (user_id, username, password_hash, created_at) VALUES (?, ?, ?, ?)",
            )
            .bind(user.user_id)
            .bind(&user.username)
            .bind(&user.password_hash)
            .bind(user.created_at)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                let err = MetadataError::from(e);
                if err.is_unique_violation() {
                    MetadataError::AlreadyExists(format!(
                        "username '{}' already exists",
                        user.username
                    ))
                } else {
                    err
                }
            })?;
            Ok(())
        }

        async fn get_user(&self, user_id: Uuid) -> MetadataResult<Option<UserRow>> {
            let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE user_id = ?")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;
            Ok(row)
        }

        async fn get_user_by_username(&self, username: &str) -> MetadataResult<Option<UserRow>> {
            let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE username = ?")
                .bind(username)
                .fetch_optional(&self.pool)
                .await?;
            Ok(row)
        }
    }

    #[async_trait]
    impl ClientRepo for SqliteStore {
        async fn create_client(&self, client: &ApiClientRow) -> MetadataResult<()> {
            sqlx::query(
                r#"
                INSERT INTO api_clients (
                    client_id, user_id, client_key, client_secret_hash,
                    name, allow_password_grant, scope, created_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(client.client_id)
            .bind(client.user_id)
            .bind(&client.client_key)
            .bind(&client.client_secret_hash)
            .bind(&client.name)
            .bind(client.allow_password_grant)
            .bind(&client.scope)
            .bind(client.created_at)
            .execute(&self.pool)
            .await?;
            Ok(())
        }

        async fn get_client(&self, client_id: Uuid) -> MetadataResult<Option<ApiClientRow>> {
            let row =
                sqlx::query_as::<_, ApiClientRow>("SELECT * FROM api_clients WHERE client_id = ?")
                    .bind(client_id)
                    .fetch_optional(&self.pool)
                    .await?;
            Ok(row)
        }

        async fn get_client_by_key(
            &self,
            client_key: &str,
        ) -> MetadataResult<Option<ApiClientRow>> {
            let row =
                sqlx::query_as::<_, ApiClientRow>("SELECT * FROM api_clients WHERE client_key = ?")
                    .bind(client_key)
                    .fetch_optional(&self.pool)
                    .await?;
            Ok(row)
        }
    }

    #[async_trait]
    impl TokenRepo for SqliteStore {
        async fn create_access_token(&self, token: &AccessTokenRow) -> MetadataResult<()> {
            sqlx::query(
                r#"
                INSERT INTO access_tokens (
                    token_id, token_hash, user_id, client_id, scope, created_at, expires_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(token.token_id)
            .bind(&token.token_hash)
            .bind(token.user_id)
            .bind(token.client_id)
            .bind(&token.scope)
            .bind(token.created_at)
            .bind(token.expires_at)
            .execute(&self.pool)
            .await?;
            Ok(())
        }

        async fn get_access_token(
            &self,
            token_id: Uuid,
        ) -> MetadataResult<Option<AccessTokenRow>> {
            let row = sqlx::query_as::<_, AccessTokenRow>(
                "SELECT * FROM access_tokens WHERE token_id = ?",
            )
            .bind(token_id)
            .fetch_optional(&self.pool)
            .await?;
            Ok(row)
        }

        async fn get_access_token_by_hash(
            &self,
            token_hash: &str,
        ) -> MetadataResult<Option<AccessTokenRow>> {
            let row = sqlx::query_as::<_, AccessTokenRow>(
                "SELECT * FROM access_tokens WHERE token_hash = ?",
            )
            .bind(token_hash)
            .fetch_optional(&self.pool)
            .await?;
            Ok(row)
        }

        async fn delete_access_token(&self, token_id: Uuid) -> MetadataResult<()> {
            let result = sqlx::query("DELETE FROM access_tokens WHERE token_id = ?")
                .bind(token_id)
                .execute(&self.pool)
                .await?;
            if result.rows_affected() == 0 {
                return Err(MetadataError::NotFound(format!(
                    "access token {token_id} not found"
                )));
            }
            Ok(())
        }

        async fn count_access_tokens(
            &self,
            user_id: Uuid,
            client_id: Uuid,
        ) -> MetadataResult<u64> {
            let count: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM access_tokens WHERE user_id = ? AND client_id = ?",
            )
            .bind(user_id)
            .bind(client_id)
            .fetch_one(&self.pool)
            .await?;
            Ok(count as u64)
        }

        async fn create_refresh_token(&self, token: &RefreshTokenRow) -> MetadataResult<()> {
            sqlx::query(
                r#"
                INSERT INTO refresh_tokens (
                    token_id, token_hash, user_id, client_id, access_token_id, created_at
                ) VALUES (?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(token.token_id)
            .bind(&token.token_hash)
            .bind(token.user_id)
            .bind(token.client_id)
            .bind(token.access_token_id)
            .bind(token.created_at)
            .execute(&self.pool)
            .await?;
            Ok(())
        }

        async fn get_refresh_token_by_hash(
            &self,
            token_hash: &str,
        ) -> MetadataResult<Option<RefreshTokenRow>> {
            let row = sqlx::query_as::<_, RefreshTokenRow>(
                "SELECT * FROM refresh_tokens WHERE token_hash = ?",
            )
            .bind(token_hash)
            .fetch_optional(&self.pool)
            .await?;
            Ok(row)
        }

        async fn count_refresh_tokens(
            &self,
            user_id: Uuid,
            client_id: Uuid,
        ) -> MetadataResult<u64> {
            let count: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM refresh_tokens WHERE user_id = ? AND client_id = ?",
            )
            .bind(user_id)
            .bind(client_id)
            .fetch_one(&self.pool)
            .await?;
            Ok(count as u64)
        }

        async fn rotate_token_pair(
            &self,
            old_access_token_id: Uuid,
            new_access: &AccessTokenRow,
            new_refresh: &RefreshTokenRow,
        ) -> MetadataResult<()> {
            let mut tx = self.pool.begin().await?;

            // Deleting the access token cascades away the refresh token
            // bound to it.
            let result = sqlx::query("DELETE FROM access_tokens WHERE token_id = ?")
                .bind(old_access_token_id)
                .execute(&mut *tx)
                .await?;
            if result.rows_affected() == 0 {
                return Err(MetadataError::NotFound(format!(
                    "access token {old_access_token_id} not found"
                )));
            }

            sqlx::query(
                r#"
                INSERT INTO access_tokens (
                    token_id, token_hash, user_id, client_id, scope, created_at, expires_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(new_access.token_id)
            .bind(&new_access.token_hash)
            .bind(new_access.user_id)
            .bind(new_access.client_id)
            .bind(&new_access.scope)
            .bind(new_access.created_at)
            .bind(new_access.expires_at)
            .execute(&mut *tx)
            .await?;

            sqlx::query(
                r#"
                INSERT INTO refresh_tokens (
                    token_id, token_hash, user_id, client_id, access_token_id, created_at
                ) VALUES (?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(new_refresh.token_id)
            .bind(&new_refresh.token_hash)
            .bind(new_refresh.user_id)
            .bind(new_refresh.client_id)
            .bind(new_refresh.access_token_id)
            .bind(new_refresh.created_at)
            .execute(&mut *tx)
            .await?;

            tx.commit().await?;
            Ok(())
        }
    }

    #[async_trait]
    impl ApiKeyRepo for SqliteStore {
        async fn create_api_key(&self, key: &ApiKeyRow) -> MetadataResult<()> {
            sqlx::query(
                "INSERT INTO api_keys (key_id, key_hash, user_id, name, created_at) VALUES (?, ?, ?, ?, ?)",
            )
            .bind(key.key_id)
            .bind(&key.key_hash)
            .bind(key.user_id)
            .bind(&key.name)
            .bind(key.created_at)
            .execute(&self.pool)
            .await?;
            Ok(())
        }

        async fn get_api_key_by_hash(&self, key_hash: &str) -> MetadataResult<Option<ApiKeyRow>> {
            let row = sqlx::query_as::<_, ApiKeyRow>("SELECT * FROM api_keys WHERE key_hash = ?")
                .bind(key_hash)
                .fetch_optional(&self.pool)
                .await?;
            Ok(row)
        }
    }

    #[async_trait]
    impl SessionRepo for SqliteStore {
        async fn create_session(&self, session: &SessionRow) -> MetadataResult<()> {
            sqlx::query(
                r#"
                INSERT INTO sessions (
                    session_id, session_hash, user_id, created_at, expires_at
                ) VALUES (?, ?, ?, ?, ?)
                "#,
            )
            .bind(session.session_id)
            .bind(&session.session_hash)
            .bind(session.user_id)
            .bind(session.created_at)
            .bind(session.expires_at)
            .execute(&self.pool)
            .await?;
            Ok(())
        }

        async fn get_session_by_hash(
            &self,
            session_hash: &str,
        ) -> MetadataResult<Option<SessionRow>> {
            let row =
                sqlx::query_as::<_, SessionRow>("SELECT * FROM sessions WHERE session_hash = ?")
                    .bind(session_hash)
                    .fetch_optional(&self.pool)
                    .await?;
            Ok(row)
        }

        async fn delete_session(&self, session_id: Uuid) -> MetadataResult<()> {
            let result = sqlx::query("DELETE FROM sessions WHERE session_id = ?")
                .bind(session_id)
                .execute(&self.pool)
                .await?;
            if result.rows_affected() == 0 {
                return Err(MetadataError::NotFound(format!(
                    "session {session_id} not found"
                )));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl LicenseRepo for SqliteStore {
        async fn create_license(&self, license: &LicenseRow) -> MetadataResult<()> {
            sqlx::query(
                "INSERT INTO licenses (license_id, name, deed_url) VALUES (?, ?, ?)",
            )
            .bind(license.license_id)
            .bind(&license.name)
            .bind(&license.deed_url)
            .execute(&self.pool)
            .await?;
            Ok(())
        }

        async fn get_license(&self, license_id: Uuid) -> MetadataResult<Option<LicenseRow>> {
            let row =
                sqlx::query_as::<_, LicenseRow>("SELECT * FROM licenses WHERE license_id = ?")
                    .bind(license_id)
                    .fetch_optional(&self.pool)
                    .await?;
            Ok(row)
        }

        async fn get_license_by_name(&self, name: &str) -> MetadataResult<Option<LicenseRow>> {
            let row = sqlx::query_as::<_, LicenseRow>("SELECT * FROM licenses WHERE name = ?")
                .bind(name)
                .fetch_optional(&self.pool)
                .await?;
            Ok(row)
        }
    }

    #[async_trait]
    impl SoundRepo for SqliteStore {
        async fn create_sound(&self, sound: &NewSoundRow) -> MetadataResult<i64> {
            let result = sqlx::query(
                r#"
                INSERT INTO sounds (
                    user_id, original_filename, original_path, filesize, sound_type,
                    md5, license_id, description, created_at, updated_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, '', ?, ?)
                "#,
            )
            .bind(sound.user_id)
            .bind(&sound.original_filename)
            .bind(&sound.original_path)
            .bind(sound.filesize)
            .bind(&sound.sound_type)
            .bind(&sound.md5)
            .bind(sound.license_id)
            .bind(sound.created_at)
            .bind(sound.created_at)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                let err = MetadataError::from(e);
                if err.is_unique_violation() {
                    MetadataError::AlreadyExists(format!(
                        "a sound with content hash {} already exists",
                        sound.md5
                    ))
                } else {
                    err
                }
            })?;
            Ok(result.last_insert_rowid())
        }

        async fn get_sound(&self, sound_id: i64) -> MetadataResult<Option<SoundRow>> {
            let row = sqlx::query_as::<_, SoundRow>("SELECT * FROM sounds WHERE sound_id = ?")
                .bind(sound_id)
                .fetch_optional(&self.pool)
                .await?;
            Ok(row)
        }

        async fn update_sound_path(
            &self,
            sound_id: i64,
            path: &str,
            updated_at: OffsetDateTime,
        ) -> MetadataResult<()> {
            let result = sqlx::query(
                "UPDATE sounds SET original_path = ?, updated_at = ? WHERE sound_id = ?",
            )
            .bind(path)
            .bind(updated_at)
            .bind(sound_id)
            .execute(&self.pool)
            .await?;
            if result.rows_affected() == 0 {
                return Err(MetadataError::NotFound(format!(
                    "sound {sound_id} not found"
                )));
            }
            Ok(())
        }

        async fn set_sound_pack(&self, sound_id: i64, pack_id: Uuid) -> MetadataResult<()> {
            let result = sqlx::query("UPDATE sounds SET pack_id = ? WHERE sound_id = ?")
                .bind(pack_id)
                .bind(sound_id)
                .execute(&self.pool)
                .await?;
            if result.rows_affected() == 0 {
                return Err(MetadataError::NotFound(format!(
                    "sound {sound_id} not found"
                )));
            }
            Ok(())
        }

        async fn set_sound_geotag(&self, sound_id: i64, geotag_id: Uuid) -> MetadataResult<()> {
            let result = sqlx::query("UPDATE sounds SET geotag_id = ? WHERE sound_id = ?")
                .bind(geotag_id)
                .bind(sound_id)
                .execute(&self.pool)
                .await?;
            if result.rows_affected() == 0 {
                return Err(MetadataError::NotFound(format!(
                    "sound {sound_id} not found"
                )));
            }
            Ok(())
        }

        async fn update_sound_description(
            &self,
            sound_id: i64,
            description: &str,
            updated_at: OffsetDateTime,
        ) -> MetadataResult<()> {
            let result = sqlx::query(
                "UPDATE sounds SET description = ?, updated_at = ? WHERE sound_id = ?",
            )
            .bind(description)
            .bind(updated_at)
            .bind(sound_id)
            .execute(&self.pool)
            .await?;
            if result.rows_affected() == 0 {
                return Err(MetadataError::NotFound(format!(
                    "sound {sound_id} not found"
                )));
            }
            Ok(())
        }

        async fn set_sound_tags(&self, sound_id: i64, tags: &[String]) -> MetadataResult<()> {
            let mut tx = self.pool.begin().await?;

            sqlx::query("DELETE FROM sound_tags WHERE sound_id = ?")
                .bind(sound_id)
                .execute(&mut *tx)
                .await?;

            for tag in tags {
                sqlx::query("INSERT OR IGNORE INTO sound_tags (sound_id, tag) VALUES (?, ?)")
                    .bind(sound_id)
                    .bind(tag)
                    .execute(&mut *tx)
                    .await?;
            }

            tx.commit().await?;
            Ok(())
        }

        async fn get_sound_tags(&self, sound_id: i64) -> MetadataResult<Vec<String>> {
            let tags: Vec<String> = sqlx::query_scalar(
                "SELECT tag FROM sound_tags WHERE sound_id = ? ORDER BY tag",
            )
            .bind(sound_id)
            .fetch_all(&self.pool)
            .await?;
            Ok(tags)
        }

        async fn update_processing_state(&self, sound_id: i64, state: &str) -> MetadataResult<()> {
            let result = sqlx::query("UPDATE sounds SET processing_state = ? WHERE sound_id = ?")
                .bind(state)
                .bind(sound_id)
                .execute(&self.pool)
                .await?;
            if result.rows_affected() == 0 {
                return Err(MetadataError::NotFound(format!(
                    "sound {sound_id} not found"
                )));
            }
            Ok(())
        }

        async fn increment_downloads(&self, sound_id: i64) -> MetadataResult<i64> {
            let count: Option<i64> = sqlx::query_scalar(
                "UPDATE sounds SET num_downloads = num_downloads + 1 WHERE sound_id = ? RETURNING num_downloads",
            )
            .bind(sound_id)
            .fetch_optional(&self.pool)
            .await?;
            count.ok_or_else(|| MetadataError::NotFound(format!("sound {sound_id} not found")))
        }

        async fn count_sounds(&self) -> MetadataResult<u64> {
            let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sounds")
                .fetch_one(&self.pool)
                .await?;
            Ok(count as u64)
        }
    }

    #[async_trait]
    impl PackRepo for SqliteStore {
        async fn get_or_create_pack(
            &self,
            user_id: Uuid,
            name: &str,
            now: OffsetDateTime,
        ) -> MetadataResult<PackRow> {
            // Attempt-insert over the unique constraint, then re-fetch.
            // A concurrent creator wins the insert; both callers read the
            // same surviving row.
            sqlx::query(
                r#"
                INSERT INTO packs (pack_id, user_id, name, created_at)
                VALUES (?, ?, ?, ?)
                ON CONFLICT(user_id, name) DO NOTHING
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(name)
            .bind(now)
            .execute(&self.pool)
            .await?;

            let row = sqlx::query_as::<_, PackRow>(
                "SELECT * FROM packs WHERE user_id = ? AND name = ?",
            )
            .bind(user_id)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

            row.ok_or_else(|| {
                MetadataError::Internal(format!("pack '{name}' missing after upsert"))
            })
        }

        async fn get_pack(&self, pack_id: Uuid) -> MetadataResult<Option<PackRow>> {
            let row = sqlx::query_as::<_, PackRow>("SELECT * FROM packs WHERE pack_id = ?")
                .bind(pack_id)
                .fetch_optional(&self.pool)
                .await?;
            Ok(row)
        }

        async fn count_packs_for_user(&self, user_id: Uuid) -> MetadataResult<u64> {
            let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM packs WHERE user_id = ?")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;
            Ok(count as u64)
        }
    }

    #[async_trait]
    impl GeoTagRepo for SqliteStore {
        async fn create_geotag(&self, geotag: &GeoTagRow) -> MetadataResult<()> {
            sqlx::query(
                r#"
                INSERT INTO geotags (geotag_id, user_id, lat, lon, zoom, created_at)
                VALUES (?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(geotag.geotag_id)
            .bind(geotag.user_id)
            .bind(geotag.lat)
            .bind(geotag.lon)
            .bind(geotag.zoom)
            .bind(geotag.created_at)
            .execute(&self.pool)
            .await?;
            Ok(())
        }

        async fn get_geotag(&self, geotag_id: Uuid) -> MetadataResult<Option<GeoTagRow>> {
            let row = sqlx::query_as::<_, GeoTagRow>("SELECT * FROM geotags WHERE geotag_id = ?")
                .bind(geotag_id)
                .fetch_optional(&self.pool)
                .await?;
            Ok(row)
        }
    }
}

const SCHEMA_SQL: &str = r#"
-- Users
CREATE TABLE IF NOT EXISTS users (
    user_id BLOB PRIMARY KEY,
    username TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    created_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_users_username ON users(username);

-- Registered API clients
CREATE TABLE IF NOT EXISTS api_clients (
    client_id BLOB PRIMARY KEY,
    user_id BLOB NOT NULL REFERENCES users(user_id),
    client_key TEXT NOT NULL UNIQUE,
    client_secret_hash TEXT NOT NULL,
    name TEXT NOT NULL,
    allow_password_grant INTEGER NOT NULL DEFAULT 0,
    scope TEXT NOT NULL DEFAULT 'read',
    created_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_api_clients_key ON api_clients(client_key);

-- Access tokens
CREATE TABLE IF NOT EXISTS access_tokens (
    token_id BLOB PRIMARY KEY,
    token_hash TEXT NOT NULL UNIQUE,
    user_id BLOB NOT NULL REFERENCES users(user_id),
    client_id BLOB NOT NULL REFERENCES api_clients(client_id),
    scope TEXT NOT NULL DEFAULT '',
    created_at TEXT NOT NULL,
    expires_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_access_tokens_hash ON access_tokens(token_hash);
CREATE INDEX IF NOT EXISTS idx_access_tokens_user_client ON access_tokens(user_id, client_id);

-- Refresh tokens, one-to-one with the access token they renew.
-- The cascade removes the refresh token when its access token is deleted.
CREATE TABLE IF NOT EXISTS refresh_tokens (
    token_id BLOB PRIMARY KEY,
    token_hash TEXT NOT NULL UNIQUE,
    user_id BLOB NOT NULL REFERENCES users(user_id),
    client_id BLOB NOT NULL REFERENCES api_clients(client_id),
    access_token_id BLOB NOT NULL UNIQUE REFERENCES access_tokens(token_id) ON DELETE CASCADE,
    created_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_refresh_tokens_hash ON refresh_tokens(token_hash);

-- Opaque API keys
CREATE TABLE IF NOT EXISTS api_keys (
    key_id BLOB PRIMARY KEY,
    key_hash TEXT NOT NULL UNIQUE,
    user_id BLOB NOT NULL REFERENCES users(user_id),
    name TEXT NOT NULL,
    created_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_api_keys_hash ON api_keys(key_hash);

-- Browser sessions
CREATE TABLE IF NOT EXISTS sessions (
    session_id BLOB PRIMARY KEY,
    session_hash TEXT NOT NULL UNIQUE,
    user_id BLOB NOT NULL REFERENCES users(user_id),
    created_at TEXT NOT NULL,
    expires_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_sessions_hash ON sessions(session_hash);

-- Licenses, seeded with the standard set
CREATE TABLE IF NOT EXISTS licenses (
    license_id BLOB PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    deed_url TEXT NOT NULL DEFAULT ''
);
INSERT OR IGNORE INTO licenses (license_id, name, deed_url) VALUES
    (X'00000000000000000000000000000001', 'Creative Commons 0', 'https://creativecommons.org/publicdomain/zero/1.0/'),
    (X'00000000000000000000000000000002', 'Attribution', 'https://creativecommons.org/licenses/by/4.0/'),
    (X'00000000000000000000000000000003', 'Attribution NonCommercial', 'https://creativecommons.org/licenses/by-nc/4.0/');

-- Sounds. sound_id is an integer because the canonical storage path
-- embeds it in the filename slug, derived after insertion.
CREATE TABLE IF NOT EXISTS sounds (
    sound_id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id BLOB NOT NULL REFERENCES users(user_id),
    original_filename TEXT NOT NULL,
    original_path TEXT NOT NULL,
    filesize INTEGER NOT NULL,
    sound_type TEXT NOT NULL,
    md5 TEXT NOT NULL UNIQUE,
    license_id BLOB NOT NULL REFERENCES licenses(license_id),
    pack_id BLOB REFERENCES packs(pack_id),
    geotag_id BLOB REFERENCES geotags(geotag_id),
    description TEXT NOT NULL DEFAULT '',
    moderation_state TEXT NOT NULL DEFAULT 'pending',
    processing_state TEXT NOT NULL DEFAULT 'pending',
    num_downloads INTEGER NOT NULL DEFAULT 0 CHECK (num_downloads >= 0),
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE UNIQUE INDEX IF NOT EXISTS idx_sounds_md5 ON sounds(md5);
CREATE INDEX IF NOT EXISTS idx_sounds_user ON sounds(user_id);
CREATE INDEX IF NOT EXISTS idx_sounds_downloads ON sounds(num_downloads);

-- Sound tags. The composite primary key deduplicates.
CREATE TABLE IF NOT EXISTS sound_tags (
    sound_id INTEGER NOT NULL,
    tag TEXT NOT NULL,
    PRIMARY KEY (sound_id, tag),
    FOREIGN KEY (sound_id) REFERENCES sounds(sound_id) ON DELETE CASCADE
);
CREATE INDEX IF NOT EXISTS idx_sound_tags_tag ON sound_tags(tag);

-- Packs
CREATE TABLE IF NOT EXISTS packs (
    pack_id BLOB PRIMARY KEY,
    user_id BLOB NOT NULL REFERENCES users(user_id),
    name TEXT NOT NULL,
    created_at TEXT NOT NULL,
    UNIQUE (user_id, name)
);
CREATE INDEX IF NOT EXISTS idx_packs_user ON packs(user_id);

-- Geotags
CREATE TABLE IF NOT EXISTS geotags (
    geotag_id BLOB PRIMARY KEY,
    user_id BLOB NOT NULL REFERENCES users(user_id),
    lat REAL NOT NULL,
    lon REAL NOT NULL,
    zoom INTEGER NOT NULL,
    created_at TEXT NOT NULL
);
"#;
