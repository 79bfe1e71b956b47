//! Route configuration.

use crate::auth::{auth_middleware, require_write};
use crate::handlers;
use crate::metrics::metrics_handler;
use crate::state::AppState;
use axum::Router;
use axum::middleware;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Health check (intentionally unauthenticated for load balancers)
        .route("/v1/health", get(handlers::health_check))
        // Authentication context discovery
        .route("/v1/me", get(handlers::me))
        // Sounds
        .route(
            "/v1/sounds",
            post(handlers::finalize_upload).route_layer(middleware::from_fn(require_write)),
        )
        .route("/v1/sounds/{sound_id}", get(handlers::get_sound))
        .route(
            "/v1/sounds/{sound_id}/download",
            get(handlers::download_sound),
        );

    let oauth_routes = Router::new()
        .route("/oauth2/token", post(handlers::token))
        .route("/oauth2/authorize", get(handlers::authorize));

    let mut router = Router::new().merge(api_routes).merge(oauth_routes);

    // The metrics endpoint is unauthenticated; restrict it at the
    // infrastructure level.
    if state.config.server.metrics_enabled {
        router = router.merge(Router::new().route("/metrics", get(metrics_handler)));
    }

    // Middleware layers are applied in reverse order (outermost first).
    // Order of execution: TraceLayer -> Auth -> (write gate on mutating
    // routes) -> Handler
    router
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
