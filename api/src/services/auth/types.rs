//! Request/response shapes exchanged with the authentication service

use serde::{Deserialize, Serialize};

use super::DependencyError;

/// Credential exactly as the caller sent it in `Authorization`.
///
/// No format is assumed; a missing header is carried as `None` and the auth
/// service decides what that means.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthToken(Option<String>);

impl AuthToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(Some(value.into()))
    }

    pub fn missing() -> Self {
        Self(None)
    }

    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }

    pub fn is_present(&self) -> bool {
        self.0.is_some()
    }
}

impl From<Option<String>> for AuthToken {
    fn from(value: Option<String>) -> Self {
        Self(value)
    }
}

/// Opaque user identifier handed back by the auth service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserIdentity(String);

impl UserIdentity {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of a validate call that reached the auth service and got a
/// well-formed answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    Valid { user: UserIdentity },
    Invalid,
}

/// Body of `POST /validate`
#[derive(Debug, Serialize)]
pub struct ValidateRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<&'a str>,
}

impl<'a> From<&'a AuthToken> for ValidateRequest<'a> {
    fn from(token: &'a AuthToken) -> Self {
        Self {
            token: token.as_deref(),
        }
    }
}

/// Raw body returned by `POST /validate`
#[derive(Debug, Deserialize)]
pub struct ValidateResponse {
    pub valid: bool,
    #[serde(default)]
    pub user: Option<UserIdentity>,
}

impl TryFrom<ValidateResponse> for ValidationResult {
    type Error = DependencyError;

    fn try_from(response: ValidateResponse) -> Result<Self, Self::Error> {
        match response {
            ValidateResponse { valid: false, .. } => Ok(ValidationResult::Invalid),
            ValidateResponse {
                valid: true,
                user: Some(user),
            } => Ok(ValidationResult::Valid { user }),
            ValidateResponse {
                valid: true,
                user: None,
            } => Err(DependencyError::Rejected(
                "validate response marked the token valid but carried no user".to_string(),
            )),
        }
    }
}
