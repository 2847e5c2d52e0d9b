//! Prometheus scrape endpoint
//!
//! `GET /metrics` renders whatever the installed `metrics-exporter-prometheus`
//! recorder has collected.

use axum::{extract::State, http::header, http::StatusCode, response::IntoResponse};
use metrics::{describe_counter, describe_histogram, Unit};
use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub struct MetricsState {
    pub handle: PrometheusHandle,
}

/// Register help text for every metric the service emits. Call once after
/// installing the recorder.
pub fn describe_metrics() {
    describe_counter!("http_requests_total", "HTTP requests by method, route and status");
    describe_histogram!(
        "http_request_duration_seconds",
        Unit::Seconds,
        "HTTP request latency by method and route"
    );
    describe_counter!("quota_checks_total", "Quota checks by outcome (allowed, blocked, unbounded)");
    describe_counter!("quota_resets_total", "Usage counters reset after their period lapsed");
    describe_counter!("usage_increments_total", "Metered operations recorded");
    describe_counter!("fee_calculations_total", "Successful fee calculations");
}

#[utoipa::path(
    get,
    path = "/metrics",
    tag = "Health",
    responses((status = 200, description = "Prometheus text exposition", content_type = "text/plain"))
)]
pub async fn prometheus_metrics(State(state): State<MetricsState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        state.handle.render(),
    )
}
