use anyhow::Result;
use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use garde::Validate;

use super::{AppConfig, Environment};

#[derive(Parser, Clone, Debug, Default)]
#[command(name = "gateway-api", about = "Gateway API fronting the authentication service")]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, env = "APP_CONFIG")]
    pub config: Option<std::path::PathBuf>,

    /// Server port
    #[arg(long)]
    pub port: Option<u16>,

    /// Environment name
    #[arg(long, env = "ENVIRONMENT")]
    pub environment: Option<String>,

    /// Probe this service's liveness endpoint and exit
    #[arg(long)]
    pub healthcheck: bool,
}

/// Deployment env vars that predate the `APP_` scheme, mapped onto config keys
const LEGACY_ENV_KEYS: &[(&str, &str)] = &[
    ("PORT", "server.port"),
    ("AUTH_SERVICE_HOST", "auth_service.host"),
    ("AUTH_SERVICE_PORT", "auth_service.port"),
];

/// Build the layered figment without extracting it.
///
/// Precedence, lowest first: built-in defaults, `config/default.toml`,
/// `config/<environment>.toml` (or `--config`), `APP_*` env vars,
/// `PORT`/`AUTH_SERVICE_*` env vars, command-line flags.
pub fn layered_figment(cli: &Cli) -> Figment {
    let environment = resolve_environment(cli);

    let mut figment = Figment::new()
        .merge(Serialized::defaults(defaults_for(environment)))
        .merge(Toml::file("config/default.toml"))
        .merge(Toml::file(format!("config/{}.toml", environment.as_str())));

    if let Some(path) = &cli.config {
        figment = figment.merge(Toml::file(path));
    }

    figment = figment.merge(Env::prefixed("APP_").split("__"));

    for (var, key) in LEGACY_ENV_KEYS {
        figment = figment.merge(Env::raw().only(&[*var]).map(move |_| (*key).into()));
    }

    if let Some(port) = cli.port {
        figment = figment.merge(Serialized::default("server.port", port));
    }

    figment
}

/// Load and validate the application configuration.
pub fn load_config(cli: &Cli) -> Result<AppConfig> {
    let config: AppConfig = layered_figment(cli).extract()?;

    config.validate()?;

    Ok(config)
}

/// Built-in defaults; development logs default to the pretty format
fn defaults_for(environment: Environment) -> AppConfig {
    let mut config = AppConfig {
        environment,
        ..AppConfig::default()
    };
    if environment == Environment::Development {
        config.logging.format = "pretty".to_string();
    }
    config
}

fn resolve_environment(cli: &Cli) -> Environment {
    cli.environment
        .as_deref()
        .map(Environment::from_name)
        .unwrap_or_default()
}
