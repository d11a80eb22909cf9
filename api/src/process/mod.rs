//! The authenticated processing path, `POST /api/process`
//!
//! Per request: start a timer, forward the raw `Authorization` header to the
//! auth service, then settle in exactly one terminal state:
//!
//! | auth service answer        | status | body                               |
//! |----------------------------|--------|------------------------------------|
//! | call failed                | 500    | `{error: <cause>}`                 |
//! | `{valid: false}`           | 401    | `{error: "Unauthorized"}`          |
//! | `{valid: true, user}`      | 200    | `{message, user, timestamp}`       |
//!
//! The timer is finished with the resolved status on every one of them.

pub mod handlers;

pub use handlers::*;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::services::auth::UserIdentity;

pub const PROCESS_ROUTE: &str = "/api/process";
pub const SUCCESS_MESSAGE: &str = "Request processed successfully";

/// Body of a successful `POST /api/process`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessedResponse {
    pub message: String,
    pub user: UserIdentity,
    /// RFC 3339 / ISO-8601 UTC instant with millisecond precision
    pub timestamp: String,
}

impl ProcessedResponse {
    /// Build the response for `user`, stamped with the current time
    pub fn for_user(user: UserIdentity) -> Self {
        Self {
            message: SUCCESS_MESSAGE.to_string(),
            user,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}
