//! `vademecum ask` — One-shot pipeline run from the terminal.

use std::path::Path;

use vademecum_config::AppConfig;
use vademecum_core::generation::GenerationParams;
use vademecum_core::query::{CallerRole, Query};
use vademecum_pipeline::{ChatPipeline, ContextAssembler};

pub async fn run(config_path: Option<&Path>, question: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load(config_path).map_err(|e| format!("Failed to load config: {e}"))?;

    let store = vademecum_store::build_store(&config.store).await?;
    let generator = vademecum_inference::build_generator(&config.inference);

    let pipeline = ChatPipeline::new(
        store,
        generator,
        ContextAssembler::from_config(&config.retrieval),
        GenerationParams {
            temperature: config.inference.temperature,
            max_new_tokens: config.inference.max_new_tokens,
            return_full_text: false,
        },
    );

    let query = Query::new(question, CallerRole::Regular);
    let reply = pipeline.answer(&query).await;
    println!("{}", reply.text());
    Ok(())
}
