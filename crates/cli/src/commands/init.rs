//! `vademecum init` — Write a default configuration file.

use std::path::Path;

use vademecum_config::AppConfig;

pub fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let path = match config_path {
        Some(p) => p.to_path_buf(),
        None => AppConfig::config_dir().join("config.toml"),
    };

    if path.exists() {
        println!("Config file already exists: {}", path.display());
        return Ok(());
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, AppConfig::default_toml())?;

    println!("Created {}", path.display());
    println!("Set VADEMECUM_HF_TOKEN (or HUGGINGFACEHUB_API_TOKEN) before serving.");
    Ok(())
}
