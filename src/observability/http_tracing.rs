//! # HTTP Request Tracing Middleware
//!
//! Axum middleware that wraps every request in a `request_span!` span, logs
//! the outcome and records Prometheus request metrics.

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::Instrument;

use super::metrics::MetricsRecorder;

/// Metrics label for requests that did not hit a registered route
const UNMATCHED_ROUTE: &str = "unmatched";

/// Trace a single HTTP request
pub async fn trace_http_requests(request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let route = route_label(&request);
    let start = Instant::now();

    let span = crate::request_span!(method, path);
    let response = next.run(request).instrument(span.clone()).await;

    let status = response.status().as_u16();
    let elapsed = start.elapsed();

    span.in_scope(|| {
        if status >= 500 {
            tracing::warn!(status, elapsed_ms = elapsed.as_millis() as u64, "Request failed");
        } else {
            tracing::debug!(status, elapsed_ms = elapsed.as_millis() as u64, "Request completed");
        }
    });

    MetricsRecorder::new().record_http_request(&method, &route, status, elapsed.as_secs_f64());

    response
}

/// Route template used as the metrics path label
///
/// Raw paths carry ids and arbitrary client input, so only the matched route
/// template is recorded. Requests that reach the fallback share one label.
fn route_label(request: &Request) -> String {
    request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| UNMATCHED_ROUTE.to_string(), |matched| matched.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{HeaderValue, StatusCode},
        middleware,
        routing::get,
        Router,
    };
    use tower::ServiceExt;

    async fn echo_route_label(request: Request, next: Next) -> Response {
        let label = route_label(&request);
        let mut response = next.run(request).await;
        if let Ok(value) = HeaderValue::from_str(&label) {
            response.headers_mut().insert("x-route-label", value);
        }
        response
    }

    fn labelled_router() -> Router {
        let github = Router::new()
            .route("/rdf/{id}", get(|| async { "available" }))
            .route("/ratings/{id}/stats", get(|| async { "{}" }));

        Router::new()
            .route("/health", get(|| async { "ok" }))
            .nest("/listener-service/api/v1/github", github)
            .layer(middleware::from_fn(echo_route_label))
    }

    async fn label_for(router: &Router, uri: &str) -> (StatusCode, String) {
        let response = router
            .clone()
            .oneshot(axum::http::Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let label = response.headers()["x-route-label"].to_str().unwrap().to_string();
        (response.status(), label)
    }

    #[tokio::test]
    async fn test_trace_middleware_passes_response_through() {
        let app = Router::new()
            .route("/health", get(|| async { StatusCode::IM_A_TEAPOT }))
            .layer(middleware::from_fn(trace_http_requests));

        let response = app
            .oneshot(axum::http::Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);
    }

    #[tokio::test]
    async fn test_matched_routes_use_template() {
        let router = labelled_router();

        assert_eq!(label_for(&router, "/health").await, (StatusCode::OK, "/health".to_string()));

        let template = "/listener-service/api/v1/github/rdf/{id}".to_string();
        assert_eq!(
            label_for(&router, "/listener-service/api/v1/github/rdf/42").await,
            (StatusCode::OK, template.clone())
        );
        assert_eq!(
            label_for(&router, "/listener-service/api/v1/github/rdf/blub").await,
            (StatusCode::OK, template)
        );
        assert_eq!(
            label_for(&router, "/listener-service/api/v1/github/ratings/7/stats").await.1,
            "/listener-service/api/v1/github/ratings/{id}/stats"
        );
    }

    #[tokio::test]
    async fn test_unknown_paths_share_one_label() {
        let router = labelled_router();

        for uri in [
            "/listener-service/api/v1/github/rdf/aaa/extra",
            "/listener-service/api/v1/github/unknown/bbb",
            "/totally/random-xyz",
        ] {
            let (status, label) = label_for(&router, uri).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{}", uri);
            assert_eq!(label, UNMATCHED_ROUTE, "{}", uri);
        }
    }

    #[test]
    fn test_request_without_routing_is_unmatched() {
        for uri in
            ["/listener-service/api/v1/github/rdf/aaa", "/listener-service/api/v1/github/rdf/bbb"]
        {
            let request = axum::http::Request::builder().uri(uri).body(Body::empty()).unwrap();
            assert_eq!(route_label(&request), UNMATCHED_ROUTE);
        }
    }
}
