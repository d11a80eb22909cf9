use axum::{
    Extension, Json,
    extract::State,
    http::{HeaderMap, Method, StatusCode, header},
    response::{IntoResponse, Response},
};
use tracing::{info, warn};

use super::{PROCESS_ROUTE, ProcessedResponse};
use crate::error::AppError;
use crate::logging::{TraceId, sanitize_log_message};
use crate::observability::RequestLabels;
use crate::server::AppState;
use crate::services::auth::{AuthToken, ValidationResult};

/// `POST /api/process`
pub async fn process_handler(
    State(state): State<AppState>,
    trace_id: Option<Extension<TraceId>>,
    method: Method,
    headers: HeaderMap,
) -> Response {
    let trace_id = trace_id
        .map(|Extension(id)| id.as_str().to_owned())
        .unwrap_or_default();
    let timer = state.metrics.start_timer();

    let token = extract_token(&headers);
    let outcome = process(&state, &token).await;

    let status = match &outcome {
        Ok(_) => StatusCode::OK,
        Err(err) => err.status_code(),
    };
    let elapsed = timer.finish(RequestLabels::new(
        method.as_str(),
        PROCESS_ROUTE,
        status.as_u16(),
    ));

    match outcome {
        Ok(body) => {
            info!(
                trace_id = %trace_id,
                user = %body.user,
                duration_ms = %elapsed.as_millis(),
                "Request processed"
            );
            (status, Json(body)).into_response()
        }
        Err(err) => {
            match &err {
                AppError::Unauthorized => {
                    info!(
                        trace_id = %trace_id,
                        duration_ms = %elapsed.as_millis(),
                        "Request rejected: unauthorized"
                    )
                }
                other => warn!(
                    trace_id = %trace_id,
                    error = %sanitize_log_message(&other.to_string()),
                    duration_ms = %elapsed.as_millis(),
                    "Request failed"
                ),
            }
            err.into_response()
        }
    }
}

/// Validate the token and build the response. Pure decision logic; timing
/// and response encoding live in [`process_handler`].
pub async fn process(state: &AppState, token: &AuthToken) -> Result<ProcessedResponse, AppError> {
    match state.auth_client.validate(token).await? {
        ValidationResult::Valid { user } => Ok(ProcessedResponse::for_user(user)),
        ValidationResult::Invalid => Err(AppError::Unauthorized),
    }
}

/// Raw `Authorization` value. Non-UTF-8 bytes are replaced, never dropped;
/// only an absent header is forwarded as missing.
fn extract_token(headers: &HeaderMap) -> AuthToken {
    headers
        .get(header::AUTHORIZATION)
        .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
        .into()
}
