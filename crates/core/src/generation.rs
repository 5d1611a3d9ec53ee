//! Generator trait — the abstraction over remote text-generation backends.
//!
//! A Generator takes a fully built prompt and returns raw generated text.
//! It never panics and never leaks transport errors past its typed failure:
//! any `GenerationError` is rendered downstream as the canonical refusal.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::GenerationError;

/// Sampling and shape parameters for one generation call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationParams {
    /// Temperature (fixed low value biases toward context-grounded output)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Cap on generated length
    #[serde(default = "default_max_new_tokens")]
    pub max_new_tokens: u32,

    /// Whether the echoed prompt is included in the response
    #[serde(default)]
    pub return_full_text: bool,
}

fn default_temperature() -> f32 {
    0.1
}

fn default_max_new_tokens() -> u32 {
    512
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            max_new_tokens: default_max_new_tokens(),
            return_full_text: false,
        }
    }
}

/// The core Generator trait.
///
/// The production implementation talks to a hosted inference endpoint; tests
/// script their own. The pipeline calls `generate()` without knowing which
/// backend is in use.
#[async_trait]
pub trait Generator: Send + Sync {
    /// A human-readable name for this backend (e.g., "huggingface").
    fn name(&self) -> &str;

    /// Run one bounded generation call with the built prompt.
    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> std::result::Result<String, GenerationError>;
}
