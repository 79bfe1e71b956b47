//! Server test utilities.
//! Note: #[allow(dead_code)] because each test file compiles common/ separately.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, header};
use fonoteca_core::config::AppConfig;
use fonoteca_metadata::{MetadataStore, SqliteStore};
use fonoteca_server::{AppState, ProcessingQueue, create_router};
use std::sync::Arc;
use tempfile::TempDir;
use tower::util::ServiceExt;
use uuid::Uuid;

/// A test server wrapper with all dependencies.
#[allow(dead_code)]
pub struct TestServer {
    pub router: Router,
    pub state: AppState,
    _temp_dir: TempDir,
}

#[allow(dead_code)]
impl TestServer {
    /// Create a new test server with temporary storage.
    pub async fn new() -> Self {
        Self::build(|_| {}, false).await
    }

    /// Create a test server with custom config modifications.
    pub async fn with_config<F>(modifier: F) -> Self
    where
        F: FnOnce(&mut AppConfig),
    {
        Self::build(modifier, false).await
    }

    /// Create a test server whose processing queue drops every dispatch.
    pub async fn with_dead_processor() -> Self {
        Self::build(|_| {}, true).await
    }

    async fn build<F>(modifier: F, dead_processor: bool) -> Self
    where
        F: FnOnce(&mut AppConfig),
    {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");

        let mut config = AppConfig::for_testing();
        config.metadata.path = temp_dir.path().join("metadata.db");
        config.ingest.uploads_root = temp_dir.path().join("uploads");
        config.ingest.sounds_root = temp_dir.path().join("sounds");
        modifier(&mut config);

        std::fs::create_dir_all(&config.ingest.uploads_root)
            .expect("Failed to create uploads root");
        std::fs::create_dir_all(&config.ingest.sounds_root)
            .expect("Failed to create sounds root");

        let metadata: Arc<dyn MetadataStore> = Arc::new(
            SqliteStore::new(&config.metadata.path)
                .await
                .expect("Failed to create metadata store"),
        );

        let processor = if dead_processor {
            ProcessingQueue::disabled()
        } else {
            ProcessingQueue::spawn(metadata.clone())
        };

        let state = AppState::new(config, metadata, processor);
        let router = create_router(state.clone());

        Self {
            router,
            state,
            _temp_dir: temp_dir,
        }
    }

    /// Get access to the underlying metadata store.
    pub fn metadata(&self) -> Arc<dyn MetadataStore> {
        self.state.metadata.clone()
    }

    /// Write a staged upload for a user.
    pub async fn stage_file(&self, user_id: Uuid, filename: &str, data: &[u8]) {
        let dir = self
            .state
            .config
            .ingest
            .uploads_root
            .join(user_id.to_string());
        tokio::fs::create_dir_all(&dir).await.expect("create staging dir");
        tokio::fs::write(dir.join(filename), data)
            .await
            .expect("write staged file");
    }

    /// The staging path of a declared upload.
    pub fn staging_path(&self, user_id: Uuid, filename: &str) -> std::path::PathBuf {
        self.state
            .config
            .ingest
            .uploads_root
            .join(user_id.to_string())
            .join(filename)
    }

    /// Send a request through the router.
    pub async fn request(&self, request: Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router request failed")
    }

    /// POST a form-encoded body (the token endpoint contract).
    /// Values are spaces-and-alphanumerics in tests; only spaces need
    /// encoding.
    pub async fn post_form(&self, path: &str, fields: &[(&str, &str)]) -> Response<Body> {
        let body = fields
            .iter()
            .map(|(k, v)| format!("{k}={}", v.replace(' ', "+")))
            .collect::<Vec<_>>()
            .join("&");
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap();
        self.request(request).await
    }

    /// POST a JSON body with optional auth headers.
    pub async fn post_json(
        &self,
        path: &str,
        body: &serde_json::Value,
        headers: &[(header::HeaderName, String)],
    ) -> Response<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json");
        for (name, value) in headers {
            builder = builder.header(name.clone(), value.as_str());
        }
        let request = builder.body(Body::from(body.to_string())).unwrap();
        self.request(request).await
    }

    /// GET with optional auth headers.
    pub async fn get(
        &self,
        path: &str,
        headers: &[(header::HeaderName, String)],
    ) -> Response<Body> {
        let mut builder = Request::builder().method("GET").uri(path);
        for (name, value) in headers {
            builder = builder.header(name.clone(), value.as_str());
        }
        let request = builder.body(Body::empty()).unwrap();
        self.request(request).await
    }
}

/// Read a response body as JSON.
#[allow(dead_code)]
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read response body");
    serde_json::from_slice(&bytes).expect("response body is not JSON")
}

/// Read a response body as raw bytes.
#[allow(dead_code)]
pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read response body")
        .to_vec()
}
