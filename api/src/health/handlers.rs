use axum::{Json, extract::State, http::StatusCode};
use tracing::debug;

use super::{HealthChecker, HealthResponse, HealthStatus};

/// `GET /health/live`: 200 while the process runs, whatever the dependencies say
pub async fn liveness_handler(State(checker): State<HealthChecker>) -> Json<HealthResponse> {
    debug!("Liveness check requested");
    Json(HealthResponse::from(&checker.liveness()))
}

/// `GET /health/ready`: 200 when the auth service answers its liveness probe,
/// 503 with the failure reason otherwise
pub async fn readiness_handler(
    State(checker): State<HealthChecker>,
) -> (StatusCode, Json<HealthResponse>) {
    debug!("Readiness check requested");

    let status = checker.readiness().await;
    let code = match status {
        HealthStatus::NotReady { .. } => StatusCode::SERVICE_UNAVAILABLE,
        HealthStatus::Alive | HealthStatus::Ready => StatusCode::OK,
    };

    (code, Json(HealthResponse::from(&status)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::state::tests::SwitchableLiveness;
    use crate::services::DependencyError;
    use std::time::Duration;

    #[tokio::test]
    async fn test_liveness_handler() {
        let client = SwitchableLiveness::new(Err(DependencyError::Timeout(Duration::from_secs(5))));
        let Json(body) = liveness_handler(State(HealthChecker::new(client))).await;
        assert_eq!(body.status, "alive");
        assert!(body.error.is_none());
    }

    #[tokio::test]
    async fn test_readiness_handler_ready() {
        let client = SwitchableLiveness::new(Ok(()));
        let (code, Json(body)) = readiness_handler(State(HealthChecker::new(client))).await;
        assert_eq!(code, StatusCode::OK);
        assert_eq!(body.status, "ready");
    }

    #[tokio::test]
    async fn test_readiness_handler_not_ready() {
        let client = SwitchableLiveness::new(Err(DependencyError::Unreachable(
            "tcp connect error: Connection refused".into(),
        )));
        let (code, Json(body)) = readiness_handler(State(HealthChecker::new(client))).await;
        assert_eq!(code, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body.status, "not ready");
        assert!(body.error.unwrap().contains("Connection refused"));
    }
}
