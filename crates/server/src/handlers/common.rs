//! Health and identity endpoints.

use crate::auth::auth_context;
use crate::error::ApiResult;
use crate::state::AppState;
use axum::Json;
use axum::extract::{Request, State};
use serde::Serialize;
use uuid::Uuid;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// GET /v1/health - Health check.
/// Intentionally unauthenticated for load balancer probes.
pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    state.metadata.health_check().await?;
    Ok(Json(HealthResponse { status: "ok" }))
}

/// A named identity in the `/v1/me` response.
#[derive(Debug, Serialize)]
pub struct IdentityResponse {
    pub user_id: Uuid,
    pub username: String,
}

/// Response exposing the resolved authentication context.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    /// Which strategy authenticated this request, if any.
    pub authentication: Option<&'static str>,
    /// The resource owner.
    pub user: Option<IdentityResponse>,
    /// The API client's or key's registered owner.
    pub developer: Option<IdentityResponse>,
}

/// GET /v1/me - Return the caller's resolved authentication context.
pub async fn me(State(state): State<AppState>, req: Request) -> ApiResult<Json<MeResponse>> {
    let context = auth_context(&req)?.clone();

    let user = resolve_identity(&state, context.user_id).await?;
    let developer = resolve_identity(&state, context.developer_id).await?;

    Ok(Json(MeResponse {
        authentication: context.method.map(|m| m.as_str()),
        user,
        developer,
    }))
}

async fn resolve_identity(
    state: &AppState,
    user_id: Option<Uuid>,
) -> ApiResult<Option<IdentityResponse>> {
    let Some(user_id) = user_id else {
        return Ok(None);
    };
    Ok(state
        .metadata
        .get_user(user_id)
        .await?
        .map(|user| IdentityResponse {
            user_id: user.user_id,
            username: user.username,
        }))
}
