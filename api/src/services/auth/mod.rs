//! Client side of the authentication service
//!
//! The gateway never decides whether a credential is good. It forwards the
//! raw `Authorization` value to the auth service and maps the answer:
//!
//! - the call itself failed (connect error, timeout, non-2xx, malformed body)
//!   → [`DependencyError`], which the handlers turn into a 5xx
//! - the call succeeded and the service said no → [`ValidationResult::Invalid`]
//! - the call succeeded and the service said yes → [`ValidationResult::Valid`]
//!
//! Both outbound calls are bounded by the configured request timeout and are
//! never retried.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

pub mod http;
pub mod types;

pub use http::HttpAuthServiceClient;
pub use types::*;

/// Failure to get a usable answer from the auth service
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DependencyError {
    /// Connection could not be established or broke mid-request
    #[error("auth service unreachable: {0}")]
    Unreachable(String),

    #[error("auth service timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// Non-2xx status or a body that does not match the expected schema
    #[error("auth service rejected the request: {0}")]
    Rejected(String),
}

impl DependencyError {
    /// Short machine-friendly label, used in log fields
    pub fn kind(&self) -> &'static str {
        match self {
            DependencyError::Unreachable(_) => "unreachable",
            DependencyError::Timeout(_) => "timeout",
            DependencyError::Rejected(_) => "rejected",
        }
    }
}

/// Calls the gateway makes against the auth service
#[async_trait]
pub trait AuthServiceClient: Send + Sync {
    /// `GET /health/live` on the auth service
    async fn check_liveness(&self) -> Result<(), DependencyError>;

    /// `POST /validate` with the caller's token
    async fn validate(&self, token: &AuthToken) -> Result<ValidationResult, DependencyError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_carry_cause() {
        let err = DependencyError::Unreachable("tcp connect error: Connection refused".into());
        assert_eq!(
            err.to_string(),
            "auth service unreachable: tcp connect error: Connection refused"
        );

        let err = DependencyError::Timeout(Duration::from_millis(1500));
        assert_eq!(err.to_string(), "auth service timed out after 1500ms");
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(DependencyError::Unreachable(String::new()).kind(), "unreachable");
        assert_eq!(DependencyError::Timeout(Duration::ZERO).kind(), "timeout");
        assert_eq!(DependencyError::Rejected(String::new()).kind(), "rejected");
    }
}
