use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::{
    Router, middleware,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};

use super::AppState;
use crate::config::AppConfig;
use crate::health::handlers::{liveness_handler, readiness_handler};
use crate::logging::trace_requests;
use crate::observability::{MetricsRegistry, metrics_endpoint};
use crate::process::{PROCESS_ROUTE, process_handler};
use crate::services::HttpAuthServiceClient;

/// Build the shared state from configuration: the auth service client and
/// the metrics registry that lives as long as the server.
pub fn build_state(config: &AppConfig) -> Result<AppState> {
    let auth_client = HttpAuthServiceClient::new(&config.auth_service)?;
    info!(
        auth_service = %auth_client.base_url(),
        request_timeout_ms = %config.auth_service.request_timeout_ms,
        "Auth service client configured"
    );

    let metrics = MetricsRegistry::new(&config.metrics)?;

    Ok(AppState::new(Arc::new(auth_client), metrics))
}

/// Bind the configured address and serve until SIGINT/SIGTERM
pub async fn start_server(config: AppConfig, state: AppState) -> Result<()> {
    let bind_addr = format!("{}:{}", config.server.bind, config.server.port);
    info!("Attempting to bind to {}", bind_addr);

    let listener = TcpListener::bind(&bind_addr).await.map_err(|e| {
        anyhow::anyhow!(
            "Failed to bind to {}: {}. Is another process using this port?",
            bind_addr,
            e
        )
    })?;

    serve(listener, state, config.server.shutdown_timeout).await
}

/// Serve on an already bound listener
pub async fn serve(listener: TcpListener, state: AppState, shutdown_timeout: u64) -> Result<()> {
    let local_addr = listener.local_addr()?;
    info!("API Service listening on {}", local_addr);

    let app = create_router(state);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(Duration::from_secs(shutdown_timeout)))
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Create the Axum router with all routes and middleware
///
/// Only `POST /api/process` records into the request duration histogram;
/// health and metrics routes are not instrumented.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/metrics", get(metrics_endpoint))
        .route("/health", get(liveness_handler))
        .route("/health/live", get(liveness_handler))
        .route("/health/ready", get(readiness_handler))
        .route(PROCESS_ROUTE, post(process_handler))
        .with_state(state)
        .layer(middleware::from_fn(trace_requests))
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
}

/// Resolve on SIGINT or SIGTERM.
///
/// Once the signal arrives axum stops accepting connections and drains
/// in-flight requests; a watchdog exits the process if draining outlives
/// `grace`.
async fn shutdown_signal(grace: Duration) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C), starting graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        }
    }

    tokio::spawn(async move {
        tokio::time::sleep(grace).await;
        warn!(grace_secs = %grace.as_secs(), "Graceful shutdown timed out, exiting");
        std::process::exit(1);
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MetricsConfig;
    use crate::health::state::tests::SwitchableLiveness;
    use crate::logging::TRACE_ID_HEADER;
    use crate::services::DependencyError;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use tower::ServiceExt;

    fn router(liveness: Result<(), DependencyError>) -> Router {
        let metrics = MetricsRegistry::new(&MetricsConfig::default()).unwrap();
        create_router(AppState::new(SwitchableLiveness::new(liveness), metrics))
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_liveness_routes() {
        for uri in ["/health", "/health/live"] {
            let (status, body) =
                get_json(router(Err(DependencyError::Unreachable("down".into()))), uri).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body, serde_json::json!({ "status": "alive" }));
        }
    }

    #[tokio::test]
    async fn test_readiness_route() {
        let (status, body) = get_json(router(Ok(())), "/health/ready").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!({ "status": "ready" }));

        let (status, body) = get_json(
            router(Err(DependencyError::Timeout(Duration::from_secs(5)))),
            "/health/ready",
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], "not ready");
        assert!(!body["error"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_metrics_route_content_type_and_trace_header() {
        let response = router(Ok(()))
            .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            crate::observability::EXPOSITION_CONTENT_TYPE
        );
        assert!(response.headers().contains_key(TRACE_ID_HEADER));
    }

    #[tokio::test]
    async fn test_process_route_rejects_get() {
        let response = router(Ok(()))
            .oneshot(Request::builder().uri(PROCESS_ROUTE).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
