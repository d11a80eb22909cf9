use std::time::Duration;

use garde::Validate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize, Validate, Default)]
pub struct AppConfig {
    #[garde(dive)]
    #[serde(default)]
    pub server: ServerConfig,

    #[garde(dive)]
    #[serde(default)]
    pub logging: LoggingConfig,

    #[garde(dive)]
    #[serde(default)]
    pub auth_service: AuthServiceConfig,

    #[garde(dive)]
    #[serde(default)]
    pub metrics: MetricsConfig,

    #[garde(skip)]
    #[serde(default)]
    pub environment: Environment,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct ServerConfig {
    #[garde(range(min = 1024, max = 65535))]
    #[serde(default = "default_port")]
    pub port: u16,

    #[garde(length(min = 1), custom(validate_bind_address))]
    #[serde(default = "default_bind")]
    pub bind: String,

    #[garde(range(min = 1, max = 300))]
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout: u64, // seconds
}

fn default_port() -> u16 {
    3000
}

fn default_bind() -> String {
    "0.0.0.0".to_string()
}

fn default_shutdown_timeout() -> u64 {
    30
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind: default_bind(),
            shutdown_timeout: default_shutdown_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct LoggingConfig {
    #[garde(length(min = 1))]
    #[serde(default = "default_log_level")]
    pub level: String, // trace, debug, info, warn, error

    #[garde(pattern(r"^(json|pretty)$"))]
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// Where the authentication service lives and how long we wait for it.
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct AuthServiceConfig {
    #[garde(length(min = 1))]
    #[serde(default = "default_auth_host")]
    pub host: String,

    #[garde(range(min = 1))]
    #[serde(default = "default_auth_port")]
    pub port: u16,

    #[garde(range(min = 1, max = 60_000))]
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    #[garde(range(min = 1, max = 60_000))]
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

fn default_auth_host() -> String {
    "localhost".to_string()
}

fn default_auth_port() -> u16 {
    8080
}

fn default_request_timeout_ms() -> u64 {
    5_000
}

fn default_connect_timeout_ms() -> u64 {
    2_000
}

impl AuthServiceConfig {
    /// Base URL of the auth service, without a trailing slash.
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

impl Default for AuthServiceConfig {
    fn default() -> Self {
        Self {
            host: default_auth_host(),
            port: default_auth_port(),
            request_timeout_ms: default_request_timeout_ms(),
            connect_timeout_ms: default_connect_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct MetricsConfig {
    /// Upper bounds (seconds) of the request duration histogram buckets
    #[garde(length(min = 1), custom(validate_buckets))]
    #[serde(default = "default_duration_buckets")]
    pub duration_buckets: Vec<f64>,
}

fn default_duration_buckets() -> Vec<f64> {
    vec![0.1, 0.5, 1.0, 2.0, 5.0]
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            duration_buckets: default_duration_buckets(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
pub enum Environment {
    Development,
    Staging,
    #[default]
    Production,
}

impl Environment {
    /// Parse the loose names accepted on the command line and in `ENVIRONMENT`
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "development" | "dev" | "test" => Environment::Development,
            "staging" => Environment::Staging,
            _ => Environment::Production,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }
}

fn validate_bind_address(value: &str, _: &()) -> garde::Result {
    value
        .parse::<std::net::IpAddr>()
        .map(|_| ())
        .map_err(|_| garde::Error::new("Invalid IP address"))
}

#[allow(clippy::ptr_arg)]
fn validate_buckets(value: &Vec<f64>, _: &()) -> garde::Result {
    if value.iter().any(|b| !b.is_finite() || *b <= 0.0) {
        return Err(garde::Error::new("bucket bounds must be positive and finite"));
    }
    if value.windows(2).any(|w| w[0] >= w[1]) {
        return Err(garde::Error::new("bucket bounds must be strictly increasing"));
    }
    Ok(())
}
