//! API routes — chat, knowledge ingestion, and health.
//!
//! Endpoints:
//!
//! - `POST /chat`        — ask a question; always 200, answer or refusal
//! - `POST /upload-text` — append one knowledge entry (master only)
//! - `POST /upload-pdf`  — extract a PDF's text and append it (master only)
//! - `GET  /health`      — backend name and entry count
//!
//! The chat endpoint never surfaces an error status: any internal failure
//! renders as the canonical refusal with HTTP 200.

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use vademecum_core::query::{CallerRole, Query};
use vademecum_core::reply::{INGEST_SUCCESS_MESSAGE, MASTER_ONLY_MESSAGE};

use crate::SharedState;

/// Build the API router.
pub fn api_router(state: SharedState) -> Router {
    Router::new()
        .route("/chat", post(chat_handler))
        .route("/upload-text", post(upload_text_handler))
        .route("/upload-pdf", post(upload_pdf_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

// ── Wire types ────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct ChatRequest {
    message: String,
    user_type: String,
}

#[derive(Serialize, Deserialize)]
struct ChatResponse {
    response: String,
}

#[derive(Deserialize)]
struct UploadTextRequest {
    text: String,
    user_type: String,
}

#[derive(Serialize, Deserialize)]
struct MessageResponse {
    message: String,
}

#[derive(Serialize, Deserialize)]
struct ErrorResponse {
    error: String,
}

type Rejection = (StatusCode, Json<ErrorResponse>);

fn reject(status: StatusCode, error: impl Into<String>) -> Rejection {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
}

// ── Handlers ──────────────────────────────────────────────────────────────

/// `POST /chat` — always HTTP 200; either a grounded answer or the
/// canonical refusal.
async fn chat_handler(
    State(state): State<SharedState>,
    Json(payload): Json<ChatRequest>,
) -> Json<ChatResponse> {
    let query = Query::new(
        payload.message,
        CallerRole::from_user_type(&payload.user_type),
    );
    let reply = state.pipeline.answer(&query).await;
    Json(ChatResponse {
        response: reply.text().to_string(),
    })
}

/// `POST /upload-text` — append one knowledge entry. Master only.
async fn upload_text_handler(
    State(state): State<SharedState>,
    Json(payload): Json<UploadTextRequest>,
) -> Result<Json<MessageResponse>, Rejection> {
    if !CallerRole::from_user_type(&payload.user_type).is_master() {
        return Err(reject(StatusCode::FORBIDDEN, MASTER_ONLY_MESSAGE));
    }

    if payload.text.trim().is_empty() {
        return Err(reject(
            StatusCode::UNPROCESSABLE_ENTITY,
            "O texto não pode estar vazio.",
        ));
    }

    match state.store.append(&payload.text).await {
        Ok(id) => {
            info!(entry_id = %id, "Knowledge entry appended");
            Ok(Json(MessageResponse {
                message: INGEST_SUCCESS_MESSAGE.to_string(),
            }))
        }
        Err(e) => {
            warn!(error = %e, "Knowledge write failed");
            Err(reject(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Falha ao gravar o conhecimento. Tente novamente.",
            ))
        }
    }
}

/// `POST /upload-pdf` — multipart `file` + `user_type`. Master only.
///
/// Extracts text per page, concatenates, and appends the whole document as
/// one knowledge entry.
async fn upload_pdf_handler(
    State(state): State<SharedState>,
    mut multipart: Multipart,
) -> Result<Json<MessageResponse>, Rejection> {
    let mut file_bytes: Option<Vec<u8>> = None;
    let mut filename = String::from("documento.pdf");
    let mut user_type = String::new();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        reject(
            StatusCode::UNPROCESSABLE_ENTITY,
            format!("Upload inválido: {e}"),
        )
    })? {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "file" => {
                if let Some(name) = field.file_name() {
                    filename = name.to_string();
                }
                let bytes = field.bytes().await.map_err(|e| {
                    reject(
                        StatusCode::UNPROCESSABLE_ENTITY,
                        format!("Falha ao ler o arquivo: {e}"),
                    )
                })?;
                file_bytes = Some(bytes.to_vec());
            }
            "user_type" => {
                user_type = field.text().await.unwrap_or_default();
            }
            _ => {}
        }
    }

    if !CallerRole::from_user_type(&user_type).is_master() {
        return Err(reject(StatusCode::FORBIDDEN, MASTER_ONLY_MESSAGE));
    }

    let Some(bytes) = file_bytes else {
        return Err(reject(
            StatusCode::UNPROCESSABLE_ENTITY,
            "Nenhum arquivo foi enviado.",
        ));
    };

    let text = extract_pdf_text(&bytes)?;
    if text.trim().is_empty() {
        return Err(reject(
            StatusCode::UNPROCESSABLE_ENTITY,
            "Nenhum texto legível foi encontrado no PDF.",
        ));
    }

    match state.store.append(&text).await {
        Ok(id) => {
            info!(entry_id = %id, %filename, "PDF ingested");
            Ok(Json(MessageResponse {
                message: format!("PDF {filename} processado e adicionado ao conhecimento!"),
            }))
        }
        Err(e) => {
            warn!(error = %e, "Knowledge write failed");
            Err(reject(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Falha ao gravar o conhecimento. Tente novamente.",
            ))
        }
    }
}

/// Extract text from a PDF, page by page, concatenated with newlines.
#[cfg(feature = "pdf")]
fn extract_pdf_text(bytes: &[u8]) -> Result<String, Rejection> {
    let document = lopdf::Document::load_mem(bytes).map_err(|e| {
        reject(
            StatusCode::UNPROCESSABLE_ENTITY,
            format!("PDF inválido: {e}"),
        )
    })?;

    let mut pages_text = Vec::new();
    for (page_number, _) in document.get_pages() {
        match document.extract_text(&[page_number]) {
            Ok(text) if !text.trim().is_empty() => pages_text.push(text),
            Ok(_) => {}
            Err(e) => warn!(page = page_number, error = %e, "Skipping unreadable PDF page"),
        }
    }
    Ok(pages_text.join("\n"))
}

/// With the `pdf` feature off the route stays mounted but reports the
/// capability as disabled, keeping the wire surface stable.
#[cfg(not(feature = "pdf"))]
fn extract_pdf_text(_bytes: &[u8]) -> Result<String, Rejection> {
    Err(reject(
        StatusCode::NOT_IMPLEMENTED,
        "Ingestão de PDF desabilitada neste servidor.",
    ))
}

#[derive(Serialize, Deserialize)]
struct HealthResponse {
    status: String,
    store: String,
    entries: usize,
}

/// `GET /health` — backend name and entry count. A failing store still
/// reports ok with zero entries; degradation is the pipeline's concern.
async fn health_handler(State(state): State<SharedState>) -> Json<HealthResponse> {
    let entries = state.store.count().await.unwrap_or(0);
    Json(HealthResponse {
        status: "ok".into(),
        store: state.store.name().to_string(),
        entries,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GatewayState;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt;
    use vademecum_core::error::GenerationError;
    use vademecum_core::generation::{GenerationParams, Generator};
    use vademecum_core::reply::CANONICAL_REFUSAL;
    use vademecum_pipeline::{ChatPipeline, ContextAssembler, SelectionPolicy};
    use vademecum_store::InMemoryStore;

    struct ScriptedGenerator {
        result: Result<String, GenerationError>,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Generator for ScriptedGenerator {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn generate(
            &self,
            _prompt: &str,
            _params: &GenerationParams,
        ) -> Result<String, GenerationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone()
        }
    }

    fn app_with(
        result: Result<String, GenerationError>,
    ) -> (Router, Arc<dyn vademecum_core::KnowledgeStore>, Arc<AtomicUsize>) {
        let store: Arc<dyn vademecum_core::KnowledgeStore> = Arc::new(InMemoryStore::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let generator = Arc::new(ScriptedGenerator {
            result,
            calls: calls.clone(),
        });
        let pipeline = ChatPipeline::new(
            store.clone(),
            generator,
            ContextAssembler::new(SelectionPolicy::All, 3000),
            GenerationParams::default(),
        );
        let state = Arc::new(GatewayState {
            pipeline,
            store: store.clone(),
        });
        (api_router(state), store, calls)
    }

    fn json_request(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn chat_on_empty_base_refuses_without_generation() {
        let (app, _store, calls) = app_with(Ok("resposta".into()));

        let response = app
            .oneshot(json_request(
                "/chat",
                serde_json::json!({"message": "Qual o horário de almoço?", "user_type": "visitor"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body: ChatResponse = body_json(response).await;
        assert_eq!(body.response, CANONICAL_REFUSAL);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn chat_returns_grounded_answer() {
        let (app, store, _calls) = app_with(Ok("O almoço é das 12h às 13h.".into()));
        store.append("Horário de almoço: 12h às 13h.").await.unwrap();

        let response = app
            .oneshot(json_request(
                "/chat",
                serde_json::json!({"message": "Qual o horário de almoço?", "user_type": "visitor"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body: ChatResponse = body_json(response).await;
        assert_eq!(body.response, "O almoço é das 12h às 13h.");
    }

    #[tokio::test]
    async fn chat_stays_200_when_generation_fails() {
        let (app, store, _calls) = app_with(Err(GenerationError::Timeout("15s".into())));
        store.append("Horário de almoço: 12h às 13h.").await.unwrap();

        let response = app
            .oneshot(json_request(
                "/chat",
                serde_json::json!({"message": "Qual o horário de almoço?", "user_type": "visitor"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body: ChatResponse = body_json(response).await;
        assert_eq!(body.response, CANONICAL_REFUSAL);
    }

    #[tokio::test]
    async fn upload_text_requires_master() {
        let (app, store, _calls) = app_with(Ok("resposta".into()));

        let response = app
            .oneshot(json_request(
                "/upload-text",
                serde_json::json!({"text": "Nova regra.", "user_type": "visitor"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body: ErrorResponse = body_json(response).await;
        assert_eq!(body.error, MASTER_ONLY_MESSAGE);
        // The rejected write must not mutate the store.
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn upload_text_appends_one_entry() {
        let (app, store, _calls) = app_with(Ok("resposta".into()));

        let response = app
            .oneshot(json_request(
                "/upload-text",
                serde_json::json!({"text": "Horário de almoço: 12h às 13h.", "user_type": "master"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body: MessageResponse = body_json(response).await;
        assert_eq!(body.message, INGEST_SUCCESS_MESSAGE);

        let entries = store.all().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].content, "Horário de almoço: 12h às 13h.");
    }

    #[tokio::test]
    async fn upload_text_rejects_empty_text() {
        let (app, store, _calls) = app_with(Ok("resposta".into()));

        let response = app
            .oneshot(json_request(
                "/upload-text",
                serde_json::json!({"text": "   ", "user_type": "master"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn upload_pdf_requires_master() {
        let (app, store, _calls) = app_with(Ok("resposta".into()));

        let boundary = "test-boundary";
        let body = format!(
            "--{boundary}\r\ncontent-disposition: form-data; name=\"user_type\"\r\n\r\nvisitor\r\n--{boundary}--\r\n"
        );
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/upload-pdf")
                    .header(
                        "content-type",
                        format!("multipart/form-data; boundary={boundary}"),
                    )
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[cfg(feature = "pdf")]
    #[tokio::test]
    async fn upload_pdf_rejects_unparseable_file() {
        let (app, store, _calls) = app_with(Ok("resposta".into()));

        let boundary = "test-boundary";
        let body = format!(
            "--{boundary}\r\ncontent-disposition: form-data; name=\"file\"; filename=\"regras.pdf\"\r\ncontent-type: application/pdf\r\n\r\nnot a pdf at all\r\n--{boundary}\r\ncontent-disposition: form-data; name=\"user_type\"\r\n\r\nmaster\r\n--{boundary}--\r\n"
        );
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/upload-pdf")
                    .header(
                        "content-type",
                        format!("multipart/form-data; boundary={boundary}"),
                    )
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn health_reports_backend_and_count() {
        let (app, store, _calls) = app_with(Ok("resposta".into()));
        store.append("uma entrada").await.unwrap();

        let response = app
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body: HealthResponse = body_json(response).await;
        assert_eq!(body.status, "ok");
        assert_eq!(body.store, "memory");
        assert_eq!(body.entries, 1);
    }
}
