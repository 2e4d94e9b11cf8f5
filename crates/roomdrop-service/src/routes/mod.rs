//! HTTP routes for the Roomdrop service.
//!
//! Defines the Axum router and application state.

use crate::blobs::BlobStore;
use crate::config::Config;
use crate::handlers;
use crate::middleware::{http_metrics_middleware, require_session, AuthState};
use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method},
    middleware,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use roomdrop_core::identity::Identity;
use roomdrop_core::ledger::FileLedger;
use roomdrop_core::registry::RoomRegistry;
use roomdrop_core::sessions::Sessions;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Account creation and credential checks.
    pub identity: Identity,

    /// Bearer token lifecycle.
    pub sessions: Sessions,

    /// Room lifecycle and membership.
    pub registry: RoomRegistry,

    /// Per-room file records.
    pub ledger: FileLedger,

    /// Uploaded file content.
    pub blobs: Arc<dyn BlobStore>,

    /// Service configuration.
    pub config: Config,
}

/// Build the application routes.
///
/// Creates an Axum router with:
/// - `/health` - Liveness probe (simple "OK") - public, unversioned
/// - `/ready` - Readiness probe (checks upload dir) - public, unversioned
/// - `/metrics` - Prometheus metrics endpoint - public, unversioned
/// - `/api/v1/auth/signup` - Create an account (public)
/// - `/api/v1/auth/login` - Open a session (public)
/// - `/api/v1/auth/logout` - Close a session (public, token optional)
/// - `/api/v1/auth/me` - Current user (authenticated)
/// - `/api/v1/rooms` - Create a room (authenticated)
/// - `/api/v1/rooms/join` - Join a room (authenticated)
/// - `/api/v1/rooms/{id}` - Room details (authenticated)
/// - `/api/v1/rooms/{id}/files` - Upload files (authenticated)
/// - `/api/v1/files/{locator}` - Download a file (public, for share links)
/// - CORS and request body size limit from configuration
/// - TraceLayer for request logging
/// - HTTP metrics middleware
/// - 30 second request timeout
pub fn build_routes(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let auth_state = Arc::new(AuthState {
        sessions: state.sessions.clone(),
    });
    let cors = cors_layer(&state.config);
    let max_upload_bytes = state.config.max_upload_bytes;

    // Public routes (no authentication required)
    let public_routes = Router::new()
        // Health check endpoints (unversioned operational endpoints)
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        // Account and session endpoints
        .route("/api/v1/auth/signup", post(handlers::signup))
        .route("/api/v1/auth/login", post(handlers::login))
        .route("/api/v1/auth/logout", post(handlers::logout))
        // Download endpoint (public so share links work without a session)
        .route("/api/v1/files/:locator", get(handlers::download_file))
        .with_state(state.clone());

    // Metrics route with its own state
    let metrics_routes = Router::new()
        .route("/metrics", get(handlers::metrics_handler))
        .with_state(metrics_handle);

    // Protected routes (authentication required)
    let protected_routes = Router::new()
        // Current user endpoint
        .route("/api/v1/auth/me", get(handlers::get_me))
        // Room lifecycle endpoints
        .route("/api/v1/rooms", post(handlers::create_room))
        .route("/api/v1/rooms/join", post(handlers::join_room))
        .route("/api/v1/rooms/:id", get(handlers::get_room))
        // Upload endpoint
        .route("/api/v1/rooms/:id/files", post(handlers::upload_files))
        .route_layer(middleware::from_fn_with_state(
            auth_state.clone(),
            require_session,
        ))
        .with_state(state);

    // Merge routes and apply global middleware layers
    // Layer order (bottom-to-top execution):
    // 1. DefaultBodyLimit - Cap request bodies at the configured size (innermost)
    // 2. CorsLayer - Handle preflight and origin headers
    // 3. TraceLayer - Log request details
    // 4. TimeoutLayer - Timeout the request
    // 5. http_metrics_middleware - Record ALL responses (outermost)
    public_routes
        .merge(metrics_routes)
        .merge(protected_routes)
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        // HTTP metrics layer (outermost) - captures ALL responses including
        // framework-level errors like 415, 400, 404, 405
        .layer(middleware::from_fn(http_metrics_middleware))
}

/// Build the CORS layer from configuration.
///
/// An empty allow list means any origin is accepted, which suits local
/// development. Configured origins restrict browsers to the deployed
/// frontends.
fn cors_layer(config: &Config) -> CorsLayer {
    if config.allowed_origins.is_empty() {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
            .allow_origin(config.allowed_origins.clone())
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_app_state_is_clone() {
        // This test verifies that AppState implements Clone,
        // which is required for Axum's State extractor.
        fn assert_clone<T: Clone>() {}
        assert_clone::<AppState>();
    }

    #[test]
    fn test_config_is_clone() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<Config>();
    }

    #[test]
    fn test_cors_layer_builds_for_both_modes() {
        let open = Config::from_vars(&HashMap::new()).unwrap();
        let _ = cors_layer(&open);

        let mut vars = HashMap::new();
        vars.insert(
            "RD_ALLOWED_ORIGINS".to_string(),
            "https://app.example.com".to_string(),
        );
        let restricted = Config::from_vars(&vars).unwrap();
        assert_eq!(restricted.allowed_origins.len(), 1);
        let _ = cors_layer(&restricted);
    }
}
