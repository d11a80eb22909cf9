use std::time::Duration;

use anyhow::{Context, Result, bail};

use crate::config::ServerConfig;

/// Probe this service's own `/health/live`, for container HEALTHCHECKs
pub async fn probe_self(server: &ServerConfig) -> Result<()> {
    let host = match server.bind.as_str() {
        "0.0.0.0" => "127.0.0.1",
        "::" => "[::1]",
        other => other,
    };
    let url = format!("http://{}:{}/health/live", host, server.port);

    let response = reqwest::Client::builder()
        .timeout(Duration::from_secs(3))
        .build()?
        .get(&url)
        .send()
        .await
        .with_context(|| format!("liveness probe to {url} failed"))?;

    if !response.status().is_success() {
        bail!("liveness probe to {} returned {}", url, response.status());
    }
    Ok(())
}
