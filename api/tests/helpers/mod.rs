#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use gateway_api::config::{AuthServiceConfig, MetricsConfig};
use gateway_api::observability::MetricsRegistry;
use gateway_api::services::HttpAuthServiceClient;
use gateway_api::{AppState, serve};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Auth service config pointing at `addr` with short timeouts
pub fn auth_config(addr: SocketAddr, request_timeout_ms: u64) -> AuthServiceConfig {
    AuthServiceConfig {
        host: addr.ip().to_string(),
        port: addr.port(),
        request_timeout_ms,
        connect_timeout_ms: 500,
    }
}

/// An address nothing listens on
pub fn unreachable_addr() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

pub struct TestServer {
    pub base_url: String,
    pub state: AppState,
    handle: JoinHandle<anyhow::Result<()>>,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Serve the full router on an ephemeral port, backed by the real HTTP
/// auth client pointed at `auth`.
pub async fn spawn_server(auth: AuthServiceConfig) -> TestServer {
    let client = HttpAuthServiceClient::new(&auth).unwrap();
    let metrics = MetricsRegistry::new(&MetricsConfig::default()).unwrap();
    let state = AppState::new(Arc::new(client), metrics);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(serve(listener, state.clone(), 5));

    TestServer {
        base_url: format!("http://{}", addr),
        state,
        handle,
    }
}

/// `_count` of `http_request_duration_seconds` for one label set, 0 when absent
pub fn sample_count(exposition: &str, method: &str, route: &str, status: u16) -> u64 {
    let method = format!("method=\"{method}\"");
    let route = format!("route=\"{route}\"");
    let status = format!("status_code=\"{status}\"");

    exposition
        .lines()
        .filter(|line| line.starts_with("http_request_duration_seconds_count{"))
        .filter(|line| line.contains(&method) && line.contains(&route) && line.contains(&status))
        .filter_map(|line| line.rsplit(' ').next())
        .filter_map(|value| value.parse::<f64>().ok())
        .map(|value| value as u64)
        .sum()
}
