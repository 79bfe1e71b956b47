//! Upload ingestion integration tests.

mod common;

use axum::http::{StatusCode, header};
use common::*;
use fonoteca_metadata::models::UserRow;
use std::time::Duration;

/// Seed a user with a session cookie and return both.
async fn seed_uploader(server: &TestServer) -> (UserRow, Vec<(header::HeaderName, String)>) {
    let metadata = server.metadata();
    let user = seed_user(&metadata, "ana", "anapass").await;
    let cookie = seed_session(&metadata, user.user_id).await;
    (user, vec![(header::COOKIE, format!("sessionid={cookie}"))])
}

#[tokio::test]
async fn ingestion_persists_and_relocates_the_sound() {
    let server = TestServer::new().await;
    let (user, auth) = seed_uploader(&server).await;

    let data = test_wav_data(1, 4096);
    server.stage_file(user.user_id, "My Guitar Loop.wav", &data).await;

    let response = server
        .post_json(
            "/v1/sounds",
            &serde_json::json!({
                "upload_filename": "My Guitar Loop.wav",
                "license": "Attribution",
                "description": "a loop",
                "tags": " Guitar  loop ",
            }),
            &auth,
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;

    let sound_id = body["id"].as_i64().unwrap();
    assert!(sound_id > 0);
    // Display name defaults to the upload filename.
    assert_eq!(body["name"], "My Guitar Loop.wav");
    assert_eq!(body["sound_type"], "wav");
    assert_eq!(body["filesize"], data.len() as i64);
    assert_eq!(body["license"], "Attribution");
    assert_eq!(body["description"], "a loop");
    assert_eq!(body["num_downloads"], 0);
    // Tags are lower-cased, whitespace-split, empties dropped.
    assert_eq!(body["tags"][0], "guitar");
    assert_eq!(body["tags"][1], "loop");
    assert!(body["geotag"].is_null());
    assert!(body["pack"].is_null());

    // The file moved to the canonical bucketed path and the staging copy
    // is gone.
    let sound = server.metadata().get_sound(sound_id).await.unwrap().unwrap();
    let expected = server
        .state
        .config
        .ingest
        .sounds_root
        .join((sound_id / 1000).to_string())
        .join(format!("{sound_id}__ana__my-guitar-loop.wav"));
    assert_eq!(sound.original_path, expected.display().to_string());
    assert!(expected.exists());
    assert!(!server.staging_path(user.user_id, "My Guitar Loop.wav").exists());
    assert_eq!(tokio::fs::read(&expected).await.unwrap(), data);
}

#[tokio::test]
async fn duplicate_content_is_rejected_and_staged_file_removed() {
    let server = TestServer::new().await;
    let (user, auth) = seed_uploader(&server).await;

    let data = test_wav_data(7, 2048);
    server.stage_file(user.user_id, "first.wav", &data).await;
    let response = server
        .post_json(
            "/v1/sounds",
            &serde_json::json!({"upload_filename": "first.wav", "license": "Attribution"}),
            &auth,
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    // Byte-identical content under a different name.
    server.stage_file(user.user_id, "second.wav", &data).await;
    let response = server
        .post_json(
            "/v1/sounds",
            &serde_json::json!({"upload_filename": "second.wav", "license": "Attribution"}),
            &auth,
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = body_json(response).await;
    assert_eq!(body["code"], "conflict");

    // Exactly one record survives and the duplicate staged file is gone.
    assert_eq!(server.metadata().count_sounds().await.unwrap(), 1);
    assert!(!server.staging_path(user.user_id, "second.wav").exists());
}

#[tokio::test]
async fn pack_is_created_once_and_reused() {
    let server = TestServer::new().await;
    let (user, auth) = seed_uploader(&server).await;

    server
        .stage_file(user.user_id, "a.wav", &test_wav_data(10, 1024))
        .await;
    let response = server
        .post_json(
            "/v1/sounds",
            &serde_json::json!({
                "upload_filename": "a.wav",
                "license": "Attribution",
                "pack": "field recordings",
            }),
            &auth,
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let first = body_json(response).await;
    assert_eq!(first["pack"], "field recordings");

    server
        .stage_file(user.user_id, "b.wav", &test_wav_data(11, 1024))
        .await;
    let response = server
        .post_json(
            "/v1/sounds",
            &serde_json::json!({
                "upload_filename": "b.wav",
                "license": "Attribution",
                "pack": "field recordings",
            }),
            &auth,
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let second = body_json(response).await;
    assert_eq!(second["pack"], "field recordings");

    // One pack exists; both sounds point at it.
    let metadata = server.metadata();
    assert_eq!(metadata.count_packs_for_user(user.user_id).await.unwrap(), 1);
    let a = metadata
        .get_sound(first["id"].as_i64().unwrap())
        .await
        .unwrap()
        .unwrap();
    let b = metadata
        .get_sound(second["id"].as_i64().unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(a.pack_id, b.pack_id);
    assert!(a.pack_id.is_some());
}

#[tokio::test]
async fn geotag_is_parsed_and_attached() {
    let server = TestServer::new().await;
    let (user, auth) = seed_uploader(&server).await;

    server
        .stage_file(user.user_id, "birds.wav", &test_wav_data(20, 1024))
        .await;
    let response = server
        .post_json(
            "/v1/sounds",
            &serde_json::json!({
                "upload_filename": "birds.wav",
                "license": "Attribution",
                "geotag": "12.5,-3.25,10",
            }),
            &auth,
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["geotag"]["lat"], 12.5);
    assert_eq!(body["geotag"]["lon"], -3.25);
    assert_eq!(body["geotag"]["zoom"], 10);
}

#[tokio::test]
async fn malformed_geotag_fails_before_any_side_effect() {
    let server = TestServer::new().await;
    let (user, auth) = seed_uploader(&server).await;

    server
        .stage_file(user.user_id, "birds.wav", &test_wav_data(21, 1024))
        .await;
    let response = server
        .post_json(
            "/v1/sounds",
            &serde_json::json!({
                "upload_filename": "birds.wav",
                "license": "Attribution",
                "geotag": "12.5,-3.25",
            }),
            &auth,
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Nothing was persisted, the staged file is untouched.
    assert_eq!(server.metadata().count_sounds().await.unwrap(), 0);
    assert!(server.staging_path(user.user_id, "birds.wav").exists());
}

#[tokio::test]
async fn unknown_license_is_a_validation_failure() {
    let server = TestServer::new().await;
    let (user, auth) = seed_uploader(&server).await;

    server
        .stage_file(user.user_id, "a.wav", &test_wav_data(30, 1024))
        .await;
    let response = server
        .post_json(
            "/v1/sounds",
            &serde_json::json!({"upload_filename": "a.wav", "license": "No Such License"}),
            &auth,
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(server.metadata().count_sounds().await.unwrap(), 0);
}

#[tokio::test]
async fn traversal_filenames_are_rejected() {
    let server = TestServer::new().await;
    let (_user, auth) = seed_uploader(&server).await;

    let response = server
        .post_json(
            "/v1/sounds",
            &serde_json::json!({"upload_filename": "../../etc/passwd", "license": "Attribution"}),
            &auth,
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn explicit_name_overrides_filename() {
    let server = TestServer::new().await;
    let (user, auth) = seed_uploader(&server).await;

    server
        .stage_file(user.user_id, "raw_take_03.wav", &test_wav_data(40, 1024))
        .await;
    let response = server
        .post_json(
            "/v1/sounds",
            &serde_json::json!({
                "upload_filename": "raw_take_03.wav",
                "name": "Morning Birds",
                "license": "Creative Commons 0",
            }),
            &auth,
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["name"], "Morning Birds");

    // The canonical filename slugs the display name, with the detected
    // extension re-attached.
    let sound_id = body["id"].as_i64().unwrap();
    let sound = server.metadata().get_sound(sound_id).await.unwrap().unwrap();
    assert!(
        sound
            .original_path
            .ends_with(&format!("{sound_id}__ana__morning-birds.wav"))
    );
}

#[tokio::test]
async fn processing_failure_does_not_fail_ingestion() {
    // Every dispatch is dropped on the floor; ingestion must not notice.
    let server = TestServer::with_dead_processor().await;
    let (user, auth) = seed_uploader(&server).await;

    server
        .stage_file(user.user_id, "a.wav", &test_wav_data(50, 1024))
        .await;
    let response = server
        .post_json(
            "/v1/sounds",
            &serde_json::json!({"upload_filename": "a.wav", "license": "Attribution"}),
            &auth,
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;

    let sound = server
        .metadata()
        .get_sound(body["id"].as_i64().unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(sound.processing_state, "pending");
}

#[tokio::test]
async fn processing_marks_the_sound_ok() {
    let server = TestServer::new().await;
    let (user, auth) = seed_uploader(&server).await;

    server
        .stage_file(user.user_id, "a.wav", &test_wav_data(60, 1024))
        .await;
    let response = server
        .post_json(
            "/v1/sounds",
            &serde_json::json!({"upload_filename": "a.wav", "license": "Attribution"}),
            &auth,
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let sound_id = body_json(response).await["id"].as_i64().unwrap();

    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    loop {
        let sound = server.metadata().get_sound(sound_id).await.unwrap().unwrap();
        if sound.processing_state == "ok" {
            break;
        }
        if tokio::time::Instant::now() > deadline {
            panic!("sound was not processed in time");
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

#[tokio::test]
async fn download_serves_bytes_and_counts() {
    let server = TestServer::new().await;
    let (user, auth) = seed_uploader(&server).await;

    let data = test_wav_data(70, 2048);
    server.stage_file(user.user_id, "a.wav", &data).await;
    let response = server
        .post_json(
            "/v1/sounds",
            &serde_json::json!({"upload_filename": "a.wav", "license": "Attribution"}),
            &auth,
        )
        .await;
    let sound_id = body_json(response).await["id"].as_i64().unwrap();

    let response = server
        .get(&format!("/v1/sounds/{sound_id}/download"), &[])
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "audio/x-wav"
    );
    assert_eq!(body_bytes(response).await, data);

    let detail = body_json(server.get(&format!("/v1/sounds/{sound_id}"), &[]).await).await;
    assert_eq!(detail["num_downloads"], 1);
}
