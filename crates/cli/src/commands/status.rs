//! `vademecum status` — Show configuration and knowledge base size.

use std::path::Path;

use vademecum_config::AppConfig;

pub async fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load(config_path).map_err(|e| format!("Failed to load config: {e}"))?;

    println!("Vademecum Status");
    println!("================");
    println!("  Config dir:  {}", AppConfig::config_dir().display());
    println!("  Store:       {} ({})", config.store.backend, config.store.path);
    println!("  Retrieval:   {} (top_k {}, budget {} tokens)",
        config.retrieval.policy, config.retrieval.top_k, config.retrieval.max_context_tokens);
    println!("  Model:       {}", config.inference.model);
    println!("  Endpoint:    {}", config.inference.base_url);
    println!("  Token:       {}", if config.has_api_token() { "configured" } else { "missing" });
    println!("  Gateway:     {}:{}", config.gateway.host, config.gateway.port);

    match vademecum_store::build_store(&config.store).await {
        Ok(store) => match store.count().await {
            Ok(n) => println!("  Entries:     {n}"),
            Err(e) => println!("  Entries:     unavailable ({e})"),
        },
        Err(e) => println!("  Entries:     store unavailable ({e})"),
    }

    Ok(())
}
