//! End-to-end integration tests for the vademecum service.
//!
//! These exercise the full path from an HTTP request through the real
//! router, pipeline, and a file-backed store, with only the remote
//! generator replaced by a scripted implementation.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use vademecum_core::error::GenerationError;
use vademecum_core::generation::{GenerationParams, Generator};
use vademecum_core::knowledge::KnowledgeStore;
use vademecum_core::reply::CANONICAL_REFUSAL;
use vademecum_gateway::{GatewayState, router};
use vademecum_pipeline::{ChatPipeline, ContextAssembler, SelectionPolicy};
use vademecum_store::JsonlStore;

// ── Scripted generator ───────────────────────────────────────────────────

/// A generator that returns scripted results in sequence and counts calls.
struct ScriptedGenerator {
    results: std::sync::Mutex<Vec<Result<String, GenerationError>>>,
    call_count: AtomicUsize,
}

impl ScriptedGenerator {
    fn new(results: Vec<Result<String, GenerationError>>) -> Arc<Self> {
        Arc::new(Self {
            results: std::sync::Mutex::new(results),
            call_count: AtomicUsize::new(0),
        })
    }

    fn text(response: &str) -> Arc<Self> {
        Self::new(vec![Ok(response.to_string())])
    }

    fn failing(error: GenerationError) -> Arc<Self> {
        Self::new(vec![Err(error)])
    }

    fn calls(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Generator for ScriptedGenerator {
    fn name(&self) -> &str {
        "e2e_mock"
    }

    async fn generate(
        &self,
        _prompt: &str,
        _params: &GenerationParams,
    ) -> Result<String, GenerationError> {
        let count = self.call_count.fetch_add(1, Ordering::SeqCst);
        let results = self.results.lock().unwrap();
        results
            .get(count)
            .cloned()
            .unwrap_or_else(|| panic!("ScriptedGenerator exhausted: call #{count}"))
    }
}

// ── Harness ──────────────────────────────────────────────────────────────

struct TestApp {
    app: axum::Router,
    store: Arc<dyn KnowledgeStore>,
    _dir: tempfile::TempDir,
}

fn test_app(generator: Arc<ScriptedGenerator>) -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let store: Arc<dyn KnowledgeStore> =
        Arc::new(JsonlStore::new(dir.path().join("knowledge.jsonl")));

    let pipeline = ChatPipeline::new(
        store.clone(),
        generator,
        ContextAssembler::new(SelectionPolicy::Keyword { fallback_recent: 3 }, 3000),
        GenerationParams::default(),
    );

    let state = Arc::new(GatewayState {
        pipeline,
        store: store.clone(),
    });

    TestApp {
        app: router(state),
        store,
        _dir: dir,
    }
}

fn json_post(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ── E2E: the retrieval-and-refusal contract over HTTP ────────────────────

#[tokio::test]
async fn e2e_empty_base_refuses_and_skips_generation() {
    let generator = ScriptedGenerator::text("nunca deveria ser chamado");
    let harness = test_app(generator.clone());

    let response = harness
        .app
        .oneshot(json_post(
            "/chat",
            serde_json::json!({"message": "Qual o horário de almoço?", "user_type": "visitor"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["response"], CANONICAL_REFUSAL);
    assert_eq!(generator.calls(), 0);
}

#[tokio::test]
async fn e2e_ingest_then_ask_round_trip() {
    let generator = ScriptedGenerator::text("O almoço é das 12h às 13h.");
    let harness = test_app(generator.clone());

    // Master uploads a procedure text
    let response = harness
        .app
        .clone()
        .oneshot(json_post(
            "/upload-text",
            serde_json::json!({"text": "Horário de almoço: 12h às 13h.", "user_type": "master"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // The stored entry round-trips unchanged
    let entries = harness.store.all().await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].content, "Horário de almoço: 12h às 13h.");

    // A visitor gets a grounded answer
    let response = harness
        .app
        .oneshot(json_post(
            "/chat",
            serde_json::json!({"message": "Qual o horário de almoço?", "user_type": "visitor"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["response"], "O almoço é das 12h às 13h.");
    assert_eq!(generator.calls(), 1);
}

#[tokio::test]
async fn e2e_visitor_upload_is_rejected_without_mutation() {
    let generator = ScriptedGenerator::text("resposta");
    let harness = test_app(generator);

    let response = harness
        .app
        .oneshot(json_post(
            "/upload-text",
            serde_json::json!({"text": "Tentativa não autorizada.", "user_type": "visitor"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = json_body(response).await;
    assert_eq!(
        body["error"],
        "Apenas usuários Master podem atualizar o conhecimento."
    );
    assert_eq!(harness.store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn e2e_generator_timeout_still_returns_200_refusal() {
    let generator = ScriptedGenerator::failing(GenerationError::Timeout("15s elapsed".into()));
    let harness = test_app(generator.clone());

    harness
        .store
        .append("Horário de almoço: 12h às 13h.")
        .await
        .unwrap();

    let response = harness
        .app
        .oneshot(json_post(
            "/chat",
            serde_json::json!({"message": "Qual o horário de almoço?", "user_type": "visitor"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["response"], CANONICAL_REFUSAL);
    assert_eq!(generator.calls(), 1);
}

#[tokio::test]
async fn e2e_uncertain_generation_is_refused() {
    let generator = ScriptedGenerator::text("Sorry, I don't know.");
    let harness = test_app(generator);

    harness
        .store
        .append("Horário de almoço: 12h às 13h.")
        .await
        .unwrap();

    let response = harness
        .app
        .oneshot(json_post(
            "/chat",
            serde_json::json!({"message": "Qual o horário de almoço?", "user_type": "visitor"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["response"], CANONICAL_REFUSAL);
}

#[tokio::test]
async fn e2e_answers_survive_store_restart() {
    let generator = ScriptedGenerator::new(vec![
        Ok("A visita é das 14h às 16h.".into()),
    ]);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("knowledge.jsonl");

    // First process life: ingest
    {
        let store = JsonlStore::new(path.clone());
        store.append("Horário de visitas: 14h às 16h.").await.unwrap();
    }

    // Second process life: reload and answer
    let store: Arc<dyn KnowledgeStore> = Arc::new(JsonlStore::new(path));
    let pipeline = ChatPipeline::new(
        store.clone(),
        generator,
        ContextAssembler::new(SelectionPolicy::Keyword { fallback_recent: 3 }, 3000),
        GenerationParams::default(),
    );
    let state = Arc::new(GatewayState { pipeline, store });

    let response = router(state)
        .oneshot(json_post(
            "/chat",
            serde_json::json!({"message": "Qual o horário de visitas?", "user_type": "visitor"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["response"], "A visita é das 14h às 16h.");
}

#[tokio::test]
async fn e2e_frontend_is_served_at_root() {
    let generator = ScriptedGenerator::text("resposta");
    let harness = test_app(generator);

    let response = harness
        .app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert!(String::from_utf8_lossy(&bytes).contains("Vademecum"));
}
