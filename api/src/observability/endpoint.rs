//! `GET /metrics`

use axum::{
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

use super::recorder::MetricsRegistry;

/// Content type of the Prometheus text exposition format
pub const EXPOSITION_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Serve every accumulated series for scraping
pub async fn metrics_endpoint(State(registry): State<MetricsRegistry>) -> Response {
    let body = registry.render();

    tracing::debug!(metrics_size = %body.len(), "Metrics served");

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, EXPOSITION_CONTENT_TYPE)],
        body,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MetricsConfig;
    use crate::observability::RequestLabels;
    use axum::body::to_bytes;
    use std::time::Duration;

    #[tokio::test]
    async fn test_metrics_endpoint_serves_exposition() {
        let registry = MetricsRegistry::new(&MetricsConfig::default()).unwrap();
        registry.observe_request(
            &RequestLabels::new("POST", "/api/process", 200),
            Duration::from_millis(30),
        );

        let response = metrics_endpoint(State(registry)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            EXPOSITION_CONTENT_TYPE
        );

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.contains("http_request_duration_seconds_bucket"));
        assert!(text.contains("route=\"/api/process\""));
    }
}
