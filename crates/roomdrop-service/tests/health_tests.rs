//! Health endpoint integration tests.
//!
//! Tests the `/health` (liveness), `/ready` (readiness), and `/metrics`
//! endpoints, plus the cross-cutting CORS layer, using the `TestServer`
//! harness.
//!
//! Note: `/health` returns plain text "OK" for Kubernetes liveness probes.
//! `/ready` returns JSON with detailed status for readiness probes.

use roomdrop_test_utils::TestServer;

/// Test that /health liveness endpoint returns 200 and plain text "OK".
#[tokio::test]
async fn test_health_endpoint_returns_200() -> Result<(), anyhow::Error> {
    let server = TestServer::spawn().await?;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/health", server.url()))
        .send()
        .await?;

    assert_eq!(response.status(), 200);

    // /health returns plain text "OK" for Kubernetes liveness probes
    let body = response.text().await?;
    assert_eq!(body, "OK");

    Ok(())
}

/// Test that /ready readiness endpoint returns JSON with status details.
#[tokio::test]
async fn test_ready_endpoint_returns_json() -> Result<(), anyhow::Error> {
    let server = TestServer::spawn().await?;
    let client = reqwest::Client::new();

    let response = client.get(format!("{}/ready", server.url())).send().await?;

    assert_eq!(response.status(), 200);

    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok());

    assert!(
        content_type.is_some_and(|ct| ct.contains("application/json")),
        "Expected application/json content type, got {:?}",
        content_type
    );

    // /ready returns JSON with detailed status
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["status"], "ready");
    assert_eq!(body["upload_dir"], "writable");

    Ok(())
}

/// Test that non-existent routes return 404.
#[tokio::test]
async fn test_unknown_route_returns_404() -> Result<(), anyhow::Error> {
    let server = TestServer::spawn().await?;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/v1/nonexistent", server.url()))
        .send()
        .await?;

    assert_eq!(response.status(), 404);

    Ok(())
}

/// Test that /metrics renders Prometheus text after traffic has flowed.
#[tokio::test]
async fn test_metrics_endpoint_renders_request_counters() -> Result<(), anyhow::Error> {
    let server = TestServer::spawn().await?;
    let client = reqwest::Client::new();

    // Drive one request through the middleware so the counter family exists
    let response = client
        .get(format!("{}/health", server.url()))
        .send()
        .await?;
    assert_eq!(response.status(), 200);

    let response = client
        .get(format!("{}/metrics", server.url()))
        .send()
        .await?;

    assert_eq!(response.status(), 200);

    let body = response.text().await?;
    assert!(
        body.contains("roomdrop_http_requests_total"),
        "Expected request counter family in metrics output"
    );

    Ok(())
}

/// Test that CORS preflight succeeds with the permissive default config.
#[tokio::test]
async fn test_cors_preflight_allowed_by_default() -> Result<(), anyhow::Error> {
    let server = TestServer::spawn().await?;
    let client = reqwest::Client::new();

    let response = client
        .request(
            reqwest::Method::OPTIONS,
            format!("{}/api/v1/auth/login", server.url()),
        )
        .header("Origin", "http://app.example.com")
        .header("Access-Control-Request-Method", "POST")
        .send()
        .await?;

    assert!(
        response.status().is_success(),
        "Preflight should succeed, got {}",
        response.status()
    );
    assert!(
        response
            .headers()
            .get("access-control-allow-origin")
            .is_some(),
        "Expected Access-Control-Allow-Origin header"
    );

    Ok(())
}

/// Test that simple cross-origin requests carry the allow-origin header.
#[tokio::test]
async fn test_cors_headers_on_simple_request() -> Result<(), anyhow::Error> {
    let server = TestServer::spawn().await?;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/health", server.url()))
        .header("Origin", "http://app.example.com")
        .send()
        .await?;

    assert_eq!(response.status(), 200);
    assert!(
        response
            .headers()
            .get("access-control-allow-origin")
            .is_some(),
        "Expected Access-Control-Allow-Origin header"
    );

    Ok(())
}
