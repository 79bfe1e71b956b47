//! Authentication-context resolution and write gating.
//!
//! Three interchangeable strategies are tried in order: OAuth2 bearer
//! token, opaque API key, session cookie. The winning strategy determines
//! two identities: the *user* (resource owner) and the *developer* (the
//! API client's registered owner). Resolution happens once per request in
//! middleware; handlers read the result from request extensions.

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::extract::{Request, State};
use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::middleware::Next;
use axum::response::Response;
use fonoteca_core::scope::{Scope, ScopeSet};
use fonoteca_core::token::hash_token_secret;
use time::OffsetDateTime;
use uuid::Uuid;

/// Session cookie name.
const SESSION_COOKIE: &str = "sessionid";

/// Which authentication strategy succeeded for a request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthMethod {
    /// OAuth2 bearer access token.
    OAuth2,
    /// Opaque API key.
    Token,
    /// Browser session cookie.
    Session,
}

impl AuthMethod {
    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OAuth2 => "OAuth2",
            Self::Token => "Token",
            Self::Session => "Session",
        }
    }
}

/// Per-request authentication context.
///
/// | strategy | user            | developer        |
/// |----------|-----------------|------------------|
/// | OAuth2   | token's user    | client's owner   |
/// | Token    | absent          | key's owner      |
/// | Session  | session's user  | absent           |
/// | none     | absent          | absent           |
#[derive(Clone, Debug, Default)]
pub struct AuthContext {
    /// The strategy that succeeded, if any.
    pub method: Option<AuthMethod>,
    /// The resource owner.
    pub user_id: Option<Uuid>,
    /// The owner of the API client or key.
    pub developer_id: Option<Uuid>,
    /// Scopes granted to the access token (OAuth2 only).
    pub scopes: Option<ScopeSet>,
}

impl AuthContext {
    /// Anonymous context: no recognized successful authenticator.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Require a resolved resource owner.
    pub fn require_user(&self) -> ApiResult<Uuid> {
        self.user_id
            .ok_or_else(|| ApiError::Unauthorized("authentication required".to_string()))
    }
}

/// Extract the value of an `Authorization` scheme, case-insensitively.
fn extract_authorization<'a>(req: &'a Request, scheme: &str) -> Option<&'a str> {
    req.headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| {
            let prefix_len = scheme.len() + 1;
            if v.len() > prefix_len
                && v[..scheme.len()].eq_ignore_ascii_case(scheme)
                && v.as_bytes()[scheme.len()] == b' '
            {
                Some(v[prefix_len..].trim())
            } else {
                None
            }
        })
}

/// Extract the session cookie value, if present.
fn extract_session_cookie(req: &Request) -> Option<String> {
    let header = req.headers().get(COOKIE)?.to_str().ok()?;
    header.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == SESSION_COOKIE).then(|| value.to_string())
    })
}

/// Resolve the authentication context for a request.
///
/// Strategies are tried in order; a presented-but-invalid credential
/// falls through so the next strategy can still succeed, ending at
/// anonymous.
async fn resolve_context(state: &AppState, req: &Request) -> ApiResult<AuthContext> {
    let now = OffsetDateTime::now_utc();

    // OAuth2 bearer token: user is the resource owner, developer is the
    // client's registered owner.
    if let Some(secret) = extract_authorization(req, "Bearer").map(str::to_owned) {
        let token_hash = hash_token_secret(&secret);
        if let Some(token) = state.metadata.get_access_token_by_hash(&token_hash).await?
            && token.is_valid(now)
        {
            let developer_id = state
                .metadata
                .get_client(token.client_id)
                .await?
                .map(|client| client.user_id);
            return Ok(AuthContext {
                method: Some(AuthMethod::OAuth2),
                user_id: Some(token.user_id),
                developer_id,
                scopes: Some(ScopeSet::parse(&token.scope)),
            });
        }
    }

    // Opaque API key: developer only, no resource owner.
    if let Some(secret) = extract_authorization(req, "Token") {
        let key_hash = hash_token_secret(secret);
        if let Some(key) = state.metadata.get_api_key_by_hash(&key_hash).await? {
            return Ok(AuthContext {
                method: Some(AuthMethod::Token),
                user_id: None,
                developer_id: Some(key.user_id),
                scopes: None,
            });
        }
    }

    // Session cookie: resource owner only, no developer.
    if let Some(secret) = extract_session_cookie(req) {
        let session_hash = hash_token_secret(&secret);
        if let Some(session) = state.metadata.get_session_by_hash(&session_hash).await?
            && session.is_valid(now)
        {
            return Ok(AuthContext {
                method: Some(AuthMethod::Session),
                user_id: Some(session.user_id),
                developer_id: None,
                scopes: None,
            });
        }
    }

    Ok(AuthContext::anonymous())
}

/// Authentication middleware: resolves the context once per request and
/// stores it in request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let context = resolve_context(&state, &req).await?;
    req.extensions_mut().insert(context);
    Ok(next.run(req).await)
}

/// Write gate for state-mutating routes.
///
/// OAuth2-authenticated requests must carry the `write` scope; session
/// authentication passes unconditionally; API keys cannot act on behalf
/// of a resource owner and are rejected, as are anonymous requests. Runs
/// before any domain logic.
pub async fn require_write(req: Request, next: Next) -> Result<Response, ApiError> {
    let context = auth_context(&req)?;
    match context.method {
        Some(AuthMethod::OAuth2) => {
            let has_write = context
                .scopes
                .as_ref()
                .is_some_and(|scopes| scopes.contains(Scope::Write));
            if !has_write {
                return Err(ApiError::Unauthorized(
                    "client is not authorized for write access".to_string(),
                ));
            }
        }
        Some(AuthMethod::Session) => {}
        Some(AuthMethod::Token) => {
            return Err(ApiError::Unauthorized(
                "API key authentication cannot modify resources".to_string(),
            ));
        }
        None => {
            return Err(ApiError::Unauthorized(
                "authentication required".to_string(),
            ));
        }
    }
    Ok(next.run(req).await)
}

/// Get the authentication context from request extensions.
pub fn auth_context(req: &Request) -> ApiResult<&AuthContext> {
    req.extensions()
        .get::<AuthContext>()
        .ok_or_else(|| ApiError::Internal("authentication context missing".to_string()))
}
