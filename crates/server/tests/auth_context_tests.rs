//! Authentication-context resolution and write-gate integration tests.

mod common;

use axum::http::{StatusCode, header};
use common::*;
use fonoteca_core::token::{generate_token_secret, hash_token_secret};
use fonoteca_metadata::models::AccessTokenRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Issue a token pair through the password grant; returns the access
/// token secret.
async fn issue_access_token(server: &TestServer, scope: &str) -> String {
    let metadata = server.metadata();
    let developer = seed_user(&metadata, "dev", "devpass").await;
    seed_user(&metadata, "ana", "anapass").await;
    let (client, secret) = seed_client(&metadata, developer.user_id, true, scope).await;

    let response = server
        .post_form(
            "/oauth2/token",
            &[
                ("grant_type", "password"),
                ("client_id", &client.client_key),
                ("client_secret", &secret),
                ("username", "ana"),
                ("password", "anapass"),
            ],
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["access_token"]
        .as_str()
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn anonymous_request_has_no_identities() {
    let server = TestServer::new().await;
    let me = body_json(server.get("/v1/me", &[]).await).await;
    assert!(me["authentication"].is_null());
    assert!(me["user"].is_null());
    assert!(me["developer"].is_null());
}

#[tokio::test]
async fn bearer_auth_resolves_user_and_developer() {
    let server = TestServer::new().await;
    let access_token = issue_access_token(&server, "read write").await;

    let me = body_json(
        server
            .get(
                "/v1/me",
                &[(header::AUTHORIZATION, format!("Bearer {access_token}"))],
            )
            .await,
    )
    .await;
    assert_eq!(me["authentication"], "OAuth2");
    assert_eq!(me["user"]["username"], "ana");
    assert_eq!(me["developer"]["username"], "dev");
}

#[tokio::test]
async fn api_key_auth_resolves_developer_only() {
    let server = TestServer::new().await;
    let metadata = server.metadata();
    let developer = seed_user(&metadata, "dev", "devpass").await;
    let key = seed_api_key(&metadata, developer.user_id).await;

    let me = body_json(
        server
            .get("/v1/me", &[(header::AUTHORIZATION, format!("Token {key}"))])
            .await,
    )
    .await;
    assert_eq!(me["authentication"], "Token");
    assert!(me["user"].is_null());
    assert_eq!(me["developer"]["username"], "dev");
}

#[tokio::test]
async fn session_auth_resolves_user_only() {
    let server = TestServer::new().await;
    let metadata = server.metadata();
    let user = seed_user(&metadata, "ana", "anapass").await;
    let cookie = seed_session(&metadata, user.user_id).await;

    let me = body_json(
        server
            .get("/v1/me", &[(header::COOKIE, format!("sessionid={cookie}"))])
            .await,
    )
    .await;
    assert_eq!(me["authentication"], "Session");
    assert_eq!(me["user"]["username"], "ana");
    assert!(me["developer"].is_null());
}

#[tokio::test]
async fn expired_access_token_does_not_authenticate() {
    let server = TestServer::new().await;
    let metadata = server.metadata();
    let developer = seed_user(&metadata, "dev", "devpass").await;
    let user = seed_user(&metadata, "ana", "anapass").await;
    let (client, _secret) = seed_client(&metadata, developer.user_id, true, "read").await;

    let secret = generate_token_secret();
    let now = OffsetDateTime::now_utc();
    metadata
        .create_access_token(&AccessTokenRow {
            token_id: Uuid::new_v4(),
            token_hash: hash_token_secret(&secret),
            user_id: user.user_id,
            client_id: client.client_id,
            scope: "read".to_string(),
            created_at: now - time::Duration::hours(48),
            expires_at: now - time::Duration::hours(24),
        })
        .await
        .unwrap();

    let me = body_json(
        server
            .get(
                "/v1/me",
                &[(header::AUTHORIZATION, format!("Bearer {secret}"))],
            )
            .await,
    )
    .await;
    assert!(me["authentication"].is_null());
}

#[tokio::test]
async fn write_gate_rejects_read_only_oauth_client() {
    let server = TestServer::new().await;
    let access_token = issue_access_token(&server, "read").await;

    let response = server
        .post_json(
            "/v1/sounds",
            &serde_json::json!({"upload_filename": "x.wav", "license": "Attribution"}),
            &[(header::AUTHORIZATION, format!("Bearer {access_token}"))],
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], "unauthorized");
}

#[tokio::test]
async fn write_gate_passes_oauth_client_with_write_scope() {
    let server = TestServer::new().await;
    let access_token = issue_access_token(&server, "read write").await;

    // Gate passes; the pipeline then rejects the missing staged file,
    // proving the request reached domain logic.
    let response = server
        .post_json(
            "/v1/sounds",
            &serde_json::json!({"upload_filename": "x.wav", "license": "Attribution"}),
            &[(header::AUTHORIZATION, format!("Bearer {access_token}"))],
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn write_gate_rejects_api_key_and_anonymous() {
    let server = TestServer::new().await;
    let metadata = server.metadata();
    let developer = seed_user(&metadata, "dev", "devpass").await;
    let key = seed_api_key(&metadata, developer.user_id).await;
    let body = serde_json::json!({"upload_filename": "x.wav", "license": "Attribution"});

    let response = server
        .post_json(
            "/v1/sounds",
            &body,
            &[(header::AUTHORIZATION, format!("Token {key}"))],
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = server.post_json("/v1/sounds", &body, &[]).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn write_gate_passes_session_auth() {
    let server = TestServer::new().await;
    let metadata = server.metadata();
    let user = seed_user(&metadata, "ana", "anapass").await;
    let cookie = seed_session(&metadata, user.user_id).await;

    let response = server
        .post_json(
            "/v1/sounds",
            &serde_json::json!({"upload_filename": "x.wav", "license": "Attribution"}),
            &[(header::COOKIE, format!("sessionid={cookie}"))],
        )
        .await;
    // Past the gate: rejected only because nothing was staged.
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn read_routes_have_no_write_gate() {
    let server = TestServer::new().await;
    let access_token = issue_access_token(&server, "read").await;

    // A read-only client can read; 404 (not 401) proves the gate is
    // absent on pure-read routes.
    let response = server
        .get(
            "/v1/sounds/999",
            &[(header::AUTHORIZATION, format!("Bearer {access_token}"))],
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
