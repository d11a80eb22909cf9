pub mod config;
pub mod error;
pub mod health;
pub mod logging;
pub mod observability;
pub mod process;
pub mod server;
pub mod services;

pub use config::*;
pub use error::*;
pub use server::*;

use anyhow::Result;
use std::panic;

/// Main server entry point for library usage
pub async fn run_server(cli: Cli) -> Result<()> {
    let app_config = config::load_config(&cli)?;

    logging::setup_tracing(&app_config.logging)?;

    // Set up panic handler (so it can use logging)
    panic::set_hook(Box::new(|panic_info| {
        ::tracing::error!(?panic_info, "FATAL: Panic occurred");
        std::process::exit(1);
    }));

    ::tracing::info!(
        environment = %app_config.environment.as_str(),
        "Gateway API starting up"
    );

    let state = server::build_state(&app_config)?;
    server::start_server(app_config, state).await
}
