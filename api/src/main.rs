use clap::Parser;
use gateway_api::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if cli.healthcheck {
        let result = match gateway_api::load_config(&cli) {
            Ok(config) => gateway_api::health::probe_self(&config.server).await,
            Err(e) => Err(e),
        };
        if let Err(e) = result {
            eprintln!("Healthcheck failed: {:#}", e);
            std::process::exit(1);
        }
        return;
    }

    if let Err(e) = gateway_api::run_server(cli).await {
        eprintln!("Gateway API failed: {:#}", e);
        std::process::exit(1);
    }
}
