//! Health check handlers.
//!
//! Provides health check endpoints for Kubernetes liveness and readiness probes.
//!
//! - `/health`: Liveness probe - returns OK if the process is running
//! - `/ready`: Readiness probe - checks the upload directory is writable

use crate::models::ReadinessResponse;
use crate::routes::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use std::sync::Arc;

/// Probe file written (and removed) by the readiness check.
const READY_PROBE_FILE: &str = ".ready-probe";

/// Liveness probe handler.
///
/// Returns a simple "OK" response to indicate the process is running.
/// Does NOT check any dependencies - failure means the process is hung/deadlocked.
///
/// Kubernetes will kill and restart the pod if this fails.
pub async fn health_check() -> &'static str {
    "OK"
}

/// Readiness probe handler.
///
/// Checks critical dependencies to determine if the service can handle traffic.
/// Returns 200 if ready, 503 if not ready.
///
/// Kubernetes will remove the pod from the service load balancer if this fails.
///
/// ## Checks
///
/// 1. Upload directory writability - writes and removes a small probe file
///
/// ## Security
///
/// Error messages are intentionally generic to avoid leaking filesystem details.
/// Actual errors are logged server-side with `tracing::warn!`.
#[tracing::instrument(skip_all, name = "rd.health.readiness")]
pub async fn readiness_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let probe_path = state.config.upload_dir.join(READY_PROBE_FILE);

    let write_check = tokio::fs::write(&probe_path, b"ok").await;

    if let Err(e) = write_check {
        // Log actual error server-side for operators
        tracing::warn!("Readiness check failed: upload directory error: {}", e);
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ReadinessResponse {
                status: "not_ready",
                upload_dir: Some("unwritable"),
                // Generic error - don't leak filesystem details
                error: Some("Service dependencies unavailable".to_string()),
            }),
        );
    }

    // Probe cleanup failure is not a readiness failure, the write proved
    // the directory usable
    if let Err(e) = tokio::fs::remove_file(&probe_path).await {
        tracing::debug!("Failed to remove readiness probe file: {}", e);
    }

    (
        StatusCode::OK,
        Json(ReadinessResponse {
            status: "ready",
            upload_dir: Some("writable"),
            error: None,
        }),
    )
}
