//! HTTP request/response tracing middleware.

use tower_http::LatencyUnit;
use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::trace::{
    DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer,
};
use tracing::Level;

/// Creates a tracing middleware for HTTP requests.
///
/// - one `INFO` span per request (method, URI, version)
/// - request start logged at `DEBUG`
/// - response logged at `INFO` with status and latency in milliseconds
/// - 5xx responses logged at `ERROR`
///
/// # Example Logs
///
/// ```text
/// INFO request{method=GET uri=/link/Ab3dE6gH9jK1 version=HTTP/1.1}: finished processing request latency=1 ms status=307
/// INFO request{method=GET uri=/stats?from=2024-01-01&to=2024-01-31&by=day version=HTTP/1.1}: finished processing request latency=4 ms status=200
/// ```
pub fn layer() -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>> {
    TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
        .on_response(
            DefaultOnResponse::new()
                .level(Level::INFO)
                .latency_unit(LatencyUnit::Millis),
        )
        .on_failure(
            DefaultOnFailure::new()
                .level(Level::ERROR)
                .latency_unit(LatencyUnit::Millis),
        )
}
