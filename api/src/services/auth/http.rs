use std::error::Error as StdError;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tracing::{debug, warn};

use super::{
    AuthServiceClient, AuthToken, DependencyError, ValidateRequest, ValidateResponse,
    ValidationResult,
};
use crate::config::AuthServiceConfig;
use crate::logging::sanitize_log_message;

const LIVENESS_PATH: &str = "/health/live";
const VALIDATE_PATH: &str = "/validate";

/// Longest slice of a rejected response body kept in the error message
const BODY_EXCERPT_LEN: usize = 200;

/// reqwest-backed client for the auth service.
///
/// Cloning is cheap; clones share one connection pool.
#[derive(Debug, Clone)]
pub struct HttpAuthServiceClient {
    client: reqwest::Client,
    base_url: String,
    request_timeout: Duration,
    connect_timeout: Duration,
}

impl HttpAuthServiceClient {
    pub fn new(config: &AuthServiceConfig) -> Result<Self, DependencyError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .connect_timeout(config.connect_timeout())
            .build()
            .map_err(|e| DependencyError::Unreachable(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url().trim_end_matches('/').to_string(),
            request_timeout: config.request_timeout(),
            connect_timeout: config.connect_timeout(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a request, turning transport failures and non-2xx statuses into
    /// [`DependencyError`].
    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        operation: &str,
    ) -> Result<reqwest::Response, DependencyError> {
        let started = Instant::now();
        let response = request
            .send()
            .await
            .map_err(|e| self.transport_error(e, operation))?;

        let status = response.status();
        debug!(
            operation = %operation,
            status = %status.as_u16(),
            duration_ms = %started.elapsed().as_millis(),
            "Auth service responded"
        );

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DependencyError::Rejected(format!(
                "{operation} returned HTTP {status}{}",
                excerpt(&body)
            )));
        }

        Ok(response)
    }

    fn transport_error(&self, err: reqwest::Error, operation: &str) -> DependencyError {
        let error = if err.is_timeout() {
            self.timeout_error(err.is_connect())
        } else if err.is_decode() || err.is_body() {
            DependencyError::Rejected(format!("{operation}: {}", error_chain(&err)))
        } else {
            DependencyError::Unreachable(format!("{operation}: {}", error_chain(&err)))
        };

        warn!(
            operation = %operation,
            kind = %error.kind(),
            error = %error,
            "Auth service call failed"
        );
        error
    }

    /// Timeout carrying the limit that fired, connect or whole request
    fn timeout_error(&self, during_connect: bool) -> DependencyError {
        if during_connect {
            DependencyError::Timeout(self.connect_timeout)
        } else {
            DependencyError::Timeout(self.request_timeout)
        }
    }
}

#[async_trait]
impl AuthServiceClient for HttpAuthServiceClient {
    async fn check_liveness(&self) -> Result<(), DependencyError> {
        let request = self.client.get(self.url(LIVENESS_PATH));
        self.send(request, "liveness").await?;
        Ok(())
    }

    async fn validate(&self, token: &AuthToken) -> Result<ValidationResult, DependencyError> {
        debug!(token_present = %token.is_present(), "Validating token with auth service");

        let request = self
            .client
            .post(self.url(VALIDATE_PATH))
            .json(&ValidateRequest::from(token));
        let response = self.send(request, "validate").await?;

        let body = response
            .text()
            .await
            .map_err(|e| self.transport_error(e, "validate"))?;

        let parsed: ValidateResponse = serde_json::from_str(&body).map_err(|e| {
            DependencyError::Rejected(format!("validate returned a malformed body: {e}"))
        })?;

        ValidationResult::try_from(parsed)
    }
}

/// Display an error followed by any causes its own message does not
/// already include.
fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

fn excerpt(body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        return String::new();
    }
    let cut: String = body.chars().take(BODY_EXCERPT_LEN).collect();
    format!(": {}", sanitize_log_message(&cut))
}
