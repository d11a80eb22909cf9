use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::logging::sanitize_log_message;
use crate::services::AuthServiceClient;

/// Outcome of a health probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// The process is running
    Alive,
    /// The auth service answered its liveness probe
    Ready,
    /// The auth service could not be confirmed live
    NotReady { reason: String },
}

/// JSON body of the health endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&HealthStatus> for HealthResponse {
    fn from(status: &HealthStatus) -> Self {
        match status {
            HealthStatus::Alive => Self {
                status: "alive".to_string(),
                error: None,
            },
            HealthStatus::Ready => Self {
                status: "ready".to_string(),
                error: None,
            },
            HealthStatus::NotReady { reason } => Self {
                status: "not ready".to_string(),
                error: Some(reason.clone()),
            },
        }
    }
}

const UNKNOWN: u8 = 0;
const READY: u8 = 1;
const NOT_READY: u8 = 2;

/// Runs readiness probes against the auth service.
///
/// Every call probes the dependency afresh; the only state kept is the last
/// outcome, so that ready/not-ready transitions are logged once instead of
/// on every probe.
#[derive(Clone)]
pub struct HealthChecker {
    auth_client: Arc<dyn AuthServiceClient>,
    last_readiness: Arc<AtomicU8>,
}

impl HealthChecker {
    pub fn new(auth_client: Arc<dyn AuthServiceClient>) -> Self {
        Self {
            auth_client,
            last_readiness: Arc::new(AtomicU8::new(UNKNOWN)),
        }
    }

    /// Always [`HealthStatus::Alive`]; no dependency is consulted.
    pub fn liveness(&self) -> HealthStatus {
        HealthStatus::Alive
    }

    /// Probe the auth service. Never fails: every error becomes `NotReady`.
    pub async fn readiness(&self) -> HealthStatus {
        let status = match self.auth_client.check_liveness().await {
            Ok(()) => HealthStatus::Ready,
            Err(err) => HealthStatus::NotReady {
                reason: err.to_string(),
            },
        };

        self.note_transition(&status);
        status
    }

    fn note_transition(&self, status: &HealthStatus) {
        let current = match status {
            HealthStatus::NotReady { .. } => NOT_READY,
            _ => READY,
        };
        let previous = self.last_readiness.swap(current, Ordering::Relaxed);
        if previous == current {
            debug!(?status, "Readiness unchanged");
            return;
        }

        match status {
            HealthStatus::NotReady { reason } => {
                warn!(reason = %sanitize_log_message(reason), "Service is not ready: auth service check failed");
            }
            _ => info!("Service is ready: auth service reachable"),
        }
    }
}
