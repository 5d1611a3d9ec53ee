//! Hugging Face Inference API generator.
//!
//! Sends the built prompt to `POST {base_url}/models/{model}` with bearer
//! authentication and returns the raw generated text. Every failure mode is
//! mapped to a typed `GenerationError`; nothing here panics or leaks a
//! transport error past the trait boundary — downstream, any variant renders
//! as the canonical refusal.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use vademecum_config::InferenceConfig;
use vademecum_core::error::GenerationError;
use vademecum_core::generation::{GenerationParams, Generator};

/// Generator backed by the Hugging Face Inference API.
pub struct HuggingFaceGenerator {
    base_url: String,
    model: String,
    api_token: Option<String>,
    client: reqwest::Client,
}

impl HuggingFaceGenerator {
    /// Create a generator with an explicit endpoint, model, and timeout.
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_token: Option<String>,
        timeout_secs: u64,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_token,
            client,
        }
    }

    /// Create a generator from the inference configuration section.
    pub fn from_config(config: &InferenceConfig) -> Self {
        Self::new(
            &config.base_url,
            &config.model,
            config.api_token.clone(),
            config.timeout_secs,
        )
    }

    /// Override the base URL (test hook for pointing at a local server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl Generator for HuggingFaceGenerator {
    fn name(&self) -> &str {
        "huggingface"
    }

    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<String, GenerationError> {
        let url = format!("{}/models/{}", self.base_url, self.model);

        let body = ApiRequest {
            inputs: prompt,
            parameters: ApiParameters {
                temperature: params.temperature,
                max_new_tokens: params.max_new_tokens,
                return_full_text: params.return_full_text,
            },
            options: ApiOptions {
                wait_for_model: true,
            },
        };

        debug!(model = %self.model, prompt_len = prompt.len(), "Sending generation request");

        let mut request = self.client.post(&url).json(&body);
        if let Some(token) = &self.api_token {
            request = request.header("Authorization", format!("Bearer {token}"));
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                GenerationError::Timeout(e.to_string())
            } else {
                GenerationError::Network(e.to_string())
            }
        })?;

        let status = response.status().as_u16();

        if status == 429 {
            return Err(GenerationError::RateLimited);
        }

        if status == 401 || status == 403 {
            return Err(GenerationError::Unauthorized(
                "Invalid API token or insufficient permissions".into(),
            ));
        }

        if !(200..300).contains(&status) {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Inference endpoint returned error");
            return Err(GenerationError::Api {
                status_code: status,
                message: error_body,
            });
        }

        let payload: Vec<ApiGeneration> = response
            .json()
            .await
            .map_err(|e| GenerationError::MalformedResponse(format!("Failed to parse: {e}")))?;

        let generation = payload.into_iter().next().ok_or_else(|| {
            GenerationError::MalformedResponse("Empty generation array".into())
        })?;

        debug!(output_len = generation.generated_text.len(), "Generation complete");
        Ok(generation.generated_text)
    }
}

// ── Wire types ────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct ApiRequest<'a> {
    inputs: &'a str,
    parameters: ApiParameters,
    options: ApiOptions,
}

#[derive(Serialize)]
struct ApiParameters {
    temperature: f32,
    max_new_tokens: u32,
    return_full_text: bool,
}

#[derive(Serialize)]
struct ApiOptions {
    wait_for_model: bool,
}

#[derive(Deserialize)]
struct ApiGeneration {
    generated_text: String,
}
