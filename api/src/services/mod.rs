pub mod auth;

pub use auth::{AuthServiceClient, DependencyError, HttpAuthServiceClient};
