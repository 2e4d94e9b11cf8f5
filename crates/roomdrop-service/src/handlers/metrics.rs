//! Prometheus metrics scrape handler.
//!
//! Exposes the metrics recorded by the observability module in the Prometheus
//! text exposition format at `GET /metrics`.

use axum::extract::State;
use metrics_exporter_prometheus::PrometheusHandle;

/// Handler for GET /metrics
///
/// Renders the current state of the Prometheus recorder. The handle is
/// installed once at startup and shared with the router as route state.
#[tracing::instrument(skip_all, name = "rd.metrics.scrape")]
pub async fn metrics_handler(State(handle): State<PrometheusHandle>) -> String {
    handle.render()
}

#[cfg(test)]
mod tests {
    // Note: The scrape output is asserted by the metrics integration test,
    // which drives real requests through the server and checks the rendered
    // counter families.
}
