//! OAuth2 token endpoint and authorize page.

use crate::error::{ApiError, ApiResult, OAuthError};
use crate::metrics::{TOKENS_ISSUED, TOKENS_REFRESHED};
use crate::state::AppState;
use axum::Json;
use axum::extract::{Form, Query, State};
use axum::response::Html;
use fonoteca_core::config::TemplateVariant;
use fonoteca_core::scope::ScopeSet;
use fonoteca_core::token::{BearerTokenResponse, generate_token_secret, hash_token_secret};
use fonoteca_metadata::models::{AccessTokenRow, ApiClientRow, RefreshTokenRow};
use serde::Deserialize;
use std::collections::BTreeMap;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

/// Form body of a token endpoint request.
#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub grant_type: String,
    pub client_id: String,
    pub client_secret: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// POST /oauth2/token - Issue or refresh a token pair.
pub async fn token(
    State(state): State<AppState>,
    Form(request): Form<TokenRequest>,
) -> Result<Json<BearerTokenResponse>, OAuthError> {
    // Client authentication applies to every grant type.
    let client = state
        .metadata
        .get_client_by_key(&request.client_id)
        .await?
        .ok_or(OAuthError::InvalidClient)?;
    if client.client_secret_hash != hash_token_secret(&request.client_secret) {
        return Err(OAuthError::InvalidClient);
    }

    match request.grant_type.as_str() {
        "password" => password_grant(&state, &client, &request).await,
        "refresh_token" => refresh_grant(&state, &client, &request).await,
        _ => Err(OAuthError::UnsupportedGrantType),
    }
}

/// Handle `grant_type=password`.
///
/// Password grants are a per-client privilege; clients without the flag
/// receive the same `unsupported_grant_type` answer as an unknown grant.
async fn password_grant(
    state: &AppState,
    client: &ApiClientRow,
    request: &TokenRequest,
) -> Result<Json<BearerTokenResponse>, OAuthError> {
    if !client.allow_password_grant {
        return Err(OAuthError::UnsupportedGrantType);
    }

    let mut details = BTreeMap::new();
    let username = request.username.as_deref().unwrap_or("");
    let password = request.password.as_deref().unwrap_or("");
    if username.is_empty() {
        details.insert("username".to_string(), "this field is required".to_string());
    }
    if password.is_empty() {
        details.insert("password".to_string(), "this field is required".to_string());
    }
    if !details.is_empty() {
        return Err(OAuthError::InvalidRequest(details));
    }

    let user = state
        .metadata
        .get_user_by_username(username)
        .await?
        .ok_or_else(|| OAuthError::InvalidGrant("invalid credentials".to_string()))?;
    if !verify_password(password, &user.password_hash) {
        return Err(OAuthError::InvalidGrant("invalid credentials".to_string()));
    }

    // An absent scope parameter requests everything the client may have.
    let requested = match request.scope.as_deref() {
        Some(scope) => ScopeSet::parse(scope),
        None => ScopeSet::parse(&client.scope),
    };
    let response = issue_token_pair(state, user.user_id, client, &requested).await?;

    TOKENS_ISSUED.inc();
    tracing::info!(client = %client.name, user = %user.username, "access token issued");
    Ok(Json(response))
}

/// Handle `grant_type=refresh_token`.
///
/// The token pair is replaced, never accumulated: the old access token is
/// deleted (its refresh token cascades away with it) and a brand-new pair
/// is issued in the same transaction. Without deletion-before-reissue,
/// repeated refreshes would grow the valid-credential surface without
/// bound.
async fn refresh_grant(
    state: &AppState,
    client: &ApiClientRow,
    request: &TokenRequest,
) -> Result<Json<BearerTokenResponse>, OAuthError> {
    let Some(refresh_secret) = request.refresh_token.as_deref().filter(|s| !s.is_empty()) else {
        let mut details = BTreeMap::new();
        details.insert(
            "refresh_token".to_string(),
            "this field is required".to_string(),
        );
        return Err(OAuthError::InvalidRequest(details));
    };

    let refresh = state
        .metadata
        .get_refresh_token_by_hash(&hash_token_secret(refresh_secret))
        .await?
        .ok_or_else(|| OAuthError::InvalidGrant("unknown refresh token".to_string()))?;
    if refresh.client_id != client.client_id {
        return Err(OAuthError::InvalidGrant(
            "refresh token was issued to a different client".to_string(),
        ));
    }

    let old_access = state
        .metadata
        .get_access_token(refresh.access_token_id)
        .await?
        .ok_or_else(|| OAuthError::InvalidGrant("refresh token has no access token".to_string()))?;

    // Scope carries over from the replaced token, re-filtered in case the
    // client's allowed scopes narrowed since issuance.
    let scope = ScopeSet::parse(&old_access.scope).filter(&ScopeSet::parse(&client.scope));
    let now = OffsetDateTime::now_utc();
    let lifetime = state.config.auth.access_token_lifetime_secs;

    let access_secret = generate_token_secret();
    let refresh_secret = generate_token_secret();
    let new_access = AccessTokenRow {
        token_id: Uuid::new_v4(),
        token_hash: hash_token_secret(&access_secret),
        user_id: refresh.user_id,
        client_id: client.client_id,
        scope: scope.as_string(),
        created_at: now,
        expires_at: now + Duration::seconds(lifetime as i64),
    };
    let new_refresh = RefreshTokenRow {
        token_id: Uuid::new_v4(),
        token_hash: hash_token_secret(&refresh_secret),
        user_id: refresh.user_id,
        client_id: client.client_id,
        access_token_id: new_access.token_id,
        created_at: now,
    };

    state
        .metadata
        .rotate_token_pair(old_access.token_id, &new_access, &new_refresh)
        .await?;

    TOKENS_REFRESHED.inc();
    tracing::info!(client = %client.name, user_id = %refresh.user_id, "token pair refreshed");

    Ok(Json(BearerTokenResponse {
        access_token: access_secret,
        token_type: "Bearer".to_string(),
        expires_in: lifetime,
        refresh_token: refresh_secret,
        scope: scope.as_string(),
    }))
}

/// Create and persist a fresh access/refresh pair for a user and client.
///
/// Issued scope is the intersection of the requested scopes and the
/// client's allowed scopes.
async fn issue_token_pair(
    state: &AppState,
    user_id: Uuid,
    client: &ApiClientRow,
    requested: &ScopeSet,
) -> Result<BearerTokenResponse, OAuthError> {
    let scope = requested.filter(&ScopeSet::parse(&client.scope));
    let now = OffsetDateTime::now_utc();
    let lifetime = state.config.auth.access_token_lifetime_secs;

    let access_secret = generate_token_secret();
    let refresh_secret = generate_token_secret();

    let access = AccessTokenRow {
        token_id: Uuid::new_v4(),
        token_hash: hash_token_secret(&access_secret),
        user_id,
        client_id: client.client_id,
        scope: scope.as_string(),
        created_at: now,
        expires_at: now + Duration::seconds(lifetime as i64),
    };
    state.metadata.create_access_token(&access).await?;

    let refresh = RefreshTokenRow {
        token_id: Uuid::new_v4(),
        token_hash: hash_token_secret(&refresh_secret),
        user_id,
        client_id: client.client_id,
        access_token_id: access.token_id,
        created_at: now,
    };
    state.metadata.create_refresh_token(&refresh).await?;

    Ok(BearerTokenResponse {
        access_token: access_secret,
        token_type: "Bearer".to_string(),
        expires_in: lifetime,
        refresh_token: refresh_secret,
        scope: scope.as_string(),
    })
}

/// Verify a plaintext password against an Argon2id PHC-format hash.
fn verify_password(password: &str, hash: &str) -> bool {
    use argon2::{Argon2, PasswordVerifier};
    let Ok(parsed_hash) = argon2::PasswordHash::new(hash) else {
        tracing::error!("stored password hash is malformed");
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

/// Query parameters for the authorize page.
#[derive(Debug, Deserialize)]
pub struct AuthorizeQuery {
    pub client_id: String,
}

/// GET /oauth2/authorize - Render the client approval page.
///
/// Two template variants exist, selected by configuration; they differ
/// only in chrome, never in behavior.
pub async fn authorize(
    State(state): State<AppState>,
    Query(query): Query<AuthorizeQuery>,
) -> ApiResult<Html<String>> {
    let client = state
        .metadata
        .get_client_by_key(&query.client_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("unknown client: {}", query.client_id)))?;

    let scopes = ScopeSet::parse(&client.scope).as_string();
    let body = match state.config.template_variant {
        TemplateVariant::Minimal => format!(
            "<!DOCTYPE html>\n<html><body>\
             <p><strong>{}</strong> requests access to your account ({}).</p>\
             </body></html>",
            escape_html(&client.name),
            scopes
        ),
        TemplateVariant::Full => format!(
            "<!DOCTYPE html>\n<html><head><title>Authorize {name}</title></head><body>\
             <h1>Authorize application</h1>\
             <p><strong>{name}</strong> is requesting permission to access your account.</p>\
             <p>Requested capabilities: <code>{scopes}</code></p>\
             </body></html>",
            name = escape_html(&client.name),
            scopes = scopes
        ),
    };
    Ok(Html(body))
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
