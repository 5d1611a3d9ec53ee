//! HTTP API gateway for vademecum.
//!
//! Exposes the chat and knowledge-ingestion endpoints plus the embedded
//! static frontend. Built on Axum; request handlers run concurrently on the
//! tokio runtime and share one injected pipeline and store.

pub mod frontend;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use vademecum_config::AppConfig;
use vademecum_core::generation::GenerationParams;
use vademecum_core::knowledge::KnowledgeStore;
use vademecum_pipeline::{ChatPipeline, ContextAssembler};

/// Maximum request body size — PDFs of procedure manuals stay well under this.
const MAX_BODY_BYTES: usize = 20 * 1024 * 1024;

/// Shared state for all request handlers.
pub struct GatewayState {
    pub pipeline: ChatPipeline,
    pub store: Arc<dyn KnowledgeStore>,
}

pub type SharedState = Arc<GatewayState>;

/// Build the full application router: API routes, embedded frontend,
/// permissive CORS (the service is consumed from arbitrary origins),
/// request tracing, and an upload-sized body limit.
pub fn router(state: SharedState) -> Router {
    Router::new()
        .merge(frontend::frontend_router())
        .merge(routes::api_router(state))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
}

/// Build all subsystems from configuration and serve until shutdown.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let store = vademecum_store::build_store(&config.store).await?;
    let generator = vademecum_inference::build_generator(&config.inference);

    let pipeline = ChatPipeline::new(
        store.clone(),
        generator,
        ContextAssembler::from_config(&config.retrieval),
        GenerationParams {
            temperature: config.inference.temperature,
            max_new_tokens: config.inference.max_new_tokens,
            return_full_text: false,
        },
    );

    let state = Arc::new(GatewayState { pipeline, store });
    let app = router(state);

    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);
    info!(%addr, backend = %config.store.backend, "Gateway listening");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
