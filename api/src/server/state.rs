use std::sync::Arc;

use axum::extract::FromRef;

use crate::health::HealthChecker;
use crate::observability::MetricsRegistry;
use crate::services::AuthServiceClient;

/// Everything a handler can reach, shared across all requests.
///
/// Cloned per request; every field is a cheap handle.
#[derive(Clone, FromRef)]
pub struct AppState {
    pub auth_client: Arc<dyn AuthServiceClient>,
    pub metrics: MetricsRegistry,
    pub health: HealthChecker,
}

impl AppState {
    pub fn new(auth_client: Arc<dyn AuthServiceClient>, metrics: MetricsRegistry) -> Self {
        let health = HealthChecker::new(auth_client.clone());
        Self {
            auth_client,
            metrics,
            health,
        }
    }
}
