//! Metrics definitions for the Roomdrop service.
//!
//! All metrics follow Prometheus naming conventions:
//! - `roomdrop_` prefix
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Cardinality
//!
//! Labels are bounded to prevent cardinality explosion:
//! - `method`: 7 values max (GET, POST, PATCH, DELETE, PUT, HEAD, OPTIONS)
//! - `endpoint`: ~12 values (parameterized paths)
//! - `status`: 3 values (success, error, timeout)
//! - domain counters carry at most a two-value `status` label

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Initialize Prometheus metrics recorder and return the handle
/// for serving metrics via HTTP.
///
/// Must be called before any metrics are recorded.
///
/// # Errors
///
/// Returns error if Prometheus recorder fails to install (e.g., already installed).
pub fn init_metrics_recorder() -> Result<PrometheusHandle, String> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Prefix("roomdrop_http_request".to_string()),
            &[
                0.005, 0.010, 0.025, 0.050, 0.100, 0.150, 0.200, 0.300, 0.500, 1.000, 2.000,
            ],
        )
        .map_err(|e| format!("Failed to set HTTP request buckets: {e}"))?
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {e}"))
}

// ============================================================================
// HTTP Request Metrics
// ============================================================================

/// Record HTTP request completion
///
/// Metric: `roomdrop_http_requests_total`, `roomdrop_http_request_duration_seconds`
/// Labels: `method`, `endpoint`, `status`
///
/// This captures ALL HTTP responses including framework-level errors like:
/// - 415 Unsupported Media Type (wrong Content-Type)
/// - 400 Bad Request (JSON parse errors)
/// - 404 Not Found
/// - 405 Method Not Allowed
pub fn record_http_request(method: &str, endpoint: &str, status_code: u16, duration: Duration) {
    // Normalize endpoint to prevent cardinality explosion
    let normalized_endpoint = normalize_endpoint(endpoint);

    // Determine status category for simplified querying
    let status = categorize_status_code(status_code);

    histogram!("roomdrop_http_request_duration_seconds",
        "method" => method.to_string(),
        "endpoint" => normalized_endpoint.clone(),
        "status" => status.to_string()
    )
    .record(duration.as_secs_f64());

    counter!("roomdrop_http_requests_total",
        "method" => method.to_string(),
        "endpoint" => normalized_endpoint,
        "status_code" => status_code.to_string()
    )
    .increment(1);
}

/// Categorize HTTP status code into success/error/timeout
fn categorize_status_code(status_code: u16) -> &'static str {
    match status_code {
        200..=299 => "success",
        408 | 504 => "timeout",
        _ => "error",
    }
}

/// Normalize endpoint path to prevent label cardinality explosion
///
/// Replaces dynamic segments (room ids, blob locators) with placeholders.
fn normalize_endpoint(path: &str) -> String {
    // Known static paths
    match path {
        "/" => "/".to_string(),
        "/health" => "/health".to_string(),
        "/ready" => "/ready".to_string(),
        "/metrics" => "/metrics".to_string(),
        "/api/v1/auth/signup" => "/api/v1/auth/signup".to_string(),
        "/api/v1/auth/login" => "/api/v1/auth/login".to_string(),
        "/api/v1/auth/logout" => "/api/v1/auth/logout".to_string(),
        "/api/v1/auth/me" => "/api/v1/auth/me".to_string(),
        "/api/v1/rooms" => "/api/v1/rooms".to_string(),
        "/api/v1/rooms/join" => "/api/v1/rooms/join".to_string(),
        _ => normalize_dynamic_endpoint(path),
    }
}

/// Normalize paths with dynamic segments
///
/// Replaces room ids and blob locators with placeholders.
fn normalize_dynamic_endpoint(path: &str) -> String {
    // Room endpoints: /api/v1/rooms/{id}
    if path.starts_with("/api/v1/rooms/") {
        let parts: Vec<&str> = path.split('/').collect();

        // /api/v1/rooms/{id} → parts.len() == 5
        if parts.len() == 5 {
            return "/api/v1/rooms/{id}".to_string();
        }

        // /api/v1/rooms/{id}/files → parts.len() == 6
        if parts.len() == 6 {
            if let Some(action) = parts.get(5) {
                if *action == "files" {
                    return "/api/v1/rooms/{id}/files".to_string();
                }
            }
        }
    }

    // Download endpoint: /api/v1/files/{locator}
    if path.starts_with("/api/v1/files/") {
        let parts: Vec<&str> = path.split('/').collect();
        if parts.len() == 5 {
            return "/api/v1/files/{locator}".to_string();
        }
    }

    // Unknown paths normalized to "/other" to bound cardinality
    "/other".to_string()
}

// ============================================================================
// Room Lifecycle Metrics
// ============================================================================

/// Record a room creation.
///
/// Metric: `roomdrop_rooms_created_total`
pub fn record_room_created() {
    counter!("roomdrop_rooms_created_total").increment(1);
}

/// Record a room join attempt outcome.
///
/// Metric: `roomdrop_room_joins_total`
/// Labels: `status`
///
/// Status values: "success", "rejected"
pub fn record_room_join(status: &str) {
    counter!("roomdrop_room_joins_total",
        "status" => status.to_string()
    )
    .increment(1);
}

// ============================================================================
// Upload Metrics
// ============================================================================

/// Record an upload request outcome.
///
/// Metrics: `roomdrop_uploads_total` (labels: `status`),
/// `roomdrop_upload_files_total`, `roomdrop_upload_bytes_total`
///
/// Status values: "accepted", "rejected"
pub fn record_upload(status: &str, file_count: u64, total_bytes: u64) {
    counter!("roomdrop_uploads_total",
        "status" => status.to_string()
    )
    .increment(1);

    if file_count > 0 {
        counter!("roomdrop_upload_files_total").increment(file_count);
    }

    if total_bytes > 0 {
        counter!("roomdrop_upload_bytes_total").increment(total_bytes);
    }
}

// ============================================================================
// Tests
// ============================================================================
