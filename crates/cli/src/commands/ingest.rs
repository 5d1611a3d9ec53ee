//! `vademecum ingest` — Append text to the knowledge base.
//!
//! The CLI runs on the operator's machine with direct store access, so it
//! bypasses the HTTP role check the same way a master caller would pass it.

use std::path::{Path, PathBuf};

use vademecum_config::AppConfig;

pub async fn run(
    config_path: Option<&Path>,
    text: Option<String>,
    file: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load(config_path).map_err(|e| format!("Failed to load config: {e}"))?;

    let content = match (text, file) {
        (Some(text), None) => text,
        (None, Some(path)) => std::fs::read_to_string(&path)
            .map_err(|e| format!("Failed to read {}: {e}", path.display()))?,
        (Some(_), Some(_)) => return Err("Pass either text or --file, not both".into()),
        (None, None) => return Err("Pass the text to store, or --file <path>".into()),
    };

    if content.trim().is_empty() {
        return Err("The text to store cannot be empty".into());
    }

    let store = vademecum_store::build_store(&config.store).await?;
    let id = store.append(&content).await?;

    println!("Stored entry {id} ({} chars)", content.chars().count());
    Ok(())
}
