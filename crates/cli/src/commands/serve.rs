//! `vademecum serve` — Start the HTTP gateway server.

use std::path::Path;

use tracing::warn;

use vademecum_config::AppConfig;

pub async fn run(
    config_path: Option<&Path>,
    port_override: Option<u16>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config =
        AppConfig::load(config_path).map_err(|e| format!("Failed to load config: {e}"))?;

    if let Some(port) = port_override {
        config.gateway.port = port;
    }

    println!("Vademecum Gateway");
    println!("  Listening: {}:{}", config.gateway.host, config.gateway.port);
    println!("  Store:     {} ({})", config.store.backend, config.store.path);
    println!("  Model:     {}", config.inference.model);
    if !config.has_api_token() {
        warn!("No inference token configured; every chat request will be refused");
    }

    vademecum_gateway::start(config).await?;
    Ok(())
}
