//! Prometheus metrics for the API server.

use axum::body::Body;
use axum::extract::MatchedPath;
use axum::http::{Request, Response};
use axum::middleware::Next;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use std::time::Instant;

/// Initialize the Prometheus metrics recorder.
/// Returns a handle that can be used to render metrics.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Metric names as constants for consistency.
pub mod names {
    // HTTP metrics
    pub const HTTP_REQUESTS_TOTAL: &str = "ootd_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "ootd_http_request_duration_seconds";
    pub const HTTP_REQUESTS_IN_FLIGHT: &str = "ootd_http_requests_in_flight";

    // Collaborator metrics
    pub const WEBHOOK_TRIGGERS_TOTAL: &str = "ootd_webhook_triggers_total";
    pub const IMAGE_GENERATIONS_TOTAL: &str = "ootd_image_generations_total";

    // Assembly metrics (render-level metrics live in ootd-media)
    pub const ASSEMBLIES_TOTAL: &str = "ootd_assemblies_total";

    // Rate limiting metrics
    pub const RATE_LIMIT_HITS_TOTAL: &str = "ootd_rate_limit_hits_total";
}

/// Record an HTTP request.
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("path", path.to_string()),
        ("status", status.to_string()),
    ];

    counter!(names::HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record a workflow webhook trigger by outcome.
pub fn record_webhook_trigger(outcome: &str) {
    let labels = [("outcome", outcome.to_string())];
    counter!(names::WEBHOOK_TRIGGERS_TOTAL, &labels).increment(1);
}

/// Record an image generation call by outcome.
pub fn record_image_generation(outcome: &str) {
    let labels = [("outcome", outcome.to_string())];
    counter!(names::IMAGE_GENERATIONS_TOTAL, &labels).increment(1);
}

/// Record a clip assembly by outcome (`success` or an error kind).
pub fn record_assembly(outcome: &str) {
    let labels = [("outcome", outcome.to_string())];
    counter!(names::ASSEMBLIES_TOTAL, &labels).increment(1);
}

/// Record rate limit hit.
pub fn record_rate_limit_hit(endpoint: &str) {
    let labels = [("endpoint", endpoint.to_string())];
    counter!(names::RATE_LIMIT_HITS_TOTAL, &labels).increment(1);
}

/// Route template for metrics labels, so path parameters never explode cardinality.
fn route_label(request: &Request<Body>) -> String {
    request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string())
}

/// Metrics middleware for HTTP requests.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let method = request.method().to_string();
    let path = route_label(&request);
    let start = Instant::now();

    // Increment in-flight counter
    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).increment(1.0);

    let response = next.run(request).await;

    // Decrement in-flight counter
    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).decrement(1.0);

    let status = response.status().as_u16();
    let duration = start.elapsed().as_secs_f64();

    record_http_request(&method, &path, status, duration);

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unrouted_request_label() {
        let request = Request::builder()
            .uri("/wp-admin/setup-config.php")
            .body(Body::empty())
            .unwrap();
        assert_eq!(route_label(&request), "unmatched");
    }
}
