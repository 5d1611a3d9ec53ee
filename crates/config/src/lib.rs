//! Configuration loading, validation, and management for vademecum.
//!
//! Loads configuration from `~/.vademecum/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.vademecum/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// Knowledge store configuration
    #[serde(default)]
    pub store: StoreConfig,

    /// Remote inference configuration
    #[serde(default)]
    pub inference: InferenceConfig,

    /// Context retrieval configuration
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Gateway configuration
    #[serde(default)]
    pub gateway: GatewayConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Backend: "memory", "jsonl", or "sqlite"
    #[serde(default = "default_store_backend")]
    pub backend: String,

    /// JSONL file path, or a sqlite URL when backend = "sqlite"
    #[serde(default = "default_store_path")]
    pub path: String,
}

fn default_store_backend() -> String {
    "jsonl".into()
}
fn default_store_path() -> String {
    "data/knowledge.jsonl".into()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_store_backend(),
            path: default_store_path(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct InferenceConfig {
    /// Inference API base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model repository id on the inference endpoint
    #[serde(default = "default_model")]
    pub model: String,

    /// Bearer token for the inference endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Cap on generated length
    #[serde(default = "default_max_new_tokens")]
    pub max_new_tokens: u32,

    /// Per-request timeout budget in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api-inference.huggingface.co".into()
}
fn default_model() -> String {
    "HuggingFaceH4/zephyr-7b-beta".into()
}
fn default_temperature() -> f32 {
    0.1
}
fn default_max_new_tokens() -> u32 {
    512
}
fn default_timeout_secs() -> u64 {
    15
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            api_token: None,
            temperature: default_temperature(),
            max_new_tokens: default_max_new_tokens(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for InferenceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InferenceConfig")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_token", &redact(&self.api_token))
            .field("temperature", &self.temperature)
            .field("max_new_tokens", &self.max_new_tokens)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Selection policy: "all", "keyword", or "similarity"
    #[serde(default = "default_policy")]
    pub policy: String,

    /// How many entries the similarity policy keeps
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// How many recent entries the keyword policy falls back to
    #[serde(default = "default_fallback_recent")]
    pub fallback_recent: usize,

    /// Token budget for the assembled context window
    #[serde(default = "default_max_context_tokens")]
    pub max_context_tokens: usize,
}

fn default_policy() -> String {
    "similarity".into()
}
fn default_top_k() -> usize {
    3
}
fn default_fallback_recent() -> usize {
    3
}
fn default_max_context_tokens() -> usize {
    3000
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            policy: default_policy(),
            top_k: default_top_k(),
            fallback_recent: default_fallback_recent(),
            max_context_tokens: default_max_context_tokens(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    8000
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl AppConfig {
    /// Load configuration, preferring `explicit_path` over the default
    /// `~/.vademecum/config.toml`, then apply environment overrides:
    /// - `VADEMECUM_HF_TOKEN` / `HUGGINGFACEHUB_API_TOKEN` — inference token
    /// - `VADEMECUM_INFERENCE_URL` — inference base URL
    /// - `VADEMECUM_MODEL` — model repository id
    /// - `VADEMECUM_STORE` / `VADEMECUM_STORE_PATH` — store backend and path
    /// - `DATABASE_URL` — sqlite URL (implies the sqlite backend)
    /// - `VADEMECUM_PORT` — gateway port
    pub fn load(explicit_path: Option<&Path>) -> Result<Self, ConfigError> {
        let config_path = match explicit_path {
            Some(p) => p.to_path_buf(),
            None => Self::config_dir().join("config.toml"),
        };
        let mut config = Self::load_from(&config_path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path, without env overrides.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if self.inference.api_token.is_none() {
            self.inference.api_token = std::env::var("VADEMECUM_HF_TOKEN")
                .ok()
                .or_else(|| std::env::var("HUGGINGFACEHUB_API_TOKEN").ok());
        }

        if let Ok(url) = std::env::var("VADEMECUM_INFERENCE_URL") {
            self.inference.base_url = url;
        }

        if let Ok(model) = std::env::var("VADEMECUM_MODEL") {
            self.inference.model = model;
        }

        if let Ok(backend) = std::env::var("VADEMECUM_STORE") {
            self.store.backend = backend;
        }

        if let Ok(path) = std::env::var("VADEMECUM_STORE_PATH") {
            self.store.path = path;
        }

        // DATABASE_URL wins over both store overrides
        if let Ok(url) = std::env::var("DATABASE_URL") {
            self.store.backend = "sqlite".into();
            self.store.path = url;
        }

        if let Ok(port) = std::env::var("VADEMECUM_PORT") {
            if let Ok(port) = port.parse() {
                self.gateway.port = port;
            }
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".vademecum")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !matches!(self.store.backend.as_str(), "memory" | "jsonl" | "sqlite") {
            return Err(ConfigError::ValidationError(format!(
                "unknown store backend '{}' (expected memory, jsonl, or sqlite)",
                self.store.backend
            )));
        }

        if !matches!(
            self.retrieval.policy.as_str(),
            "all" | "keyword" | "similarity"
        ) {
            return Err(ConfigError::ValidationError(format!(
                "unknown retrieval policy '{}' (expected all, keyword, or similarity)",
                self.retrieval.policy
            )));
        }

        if self.retrieval.top_k == 0 {
            return Err(ConfigError::ValidationError(
                "retrieval.top_k must be at least 1".into(),
            ));
        }

        if self.inference.temperature < 0.0 || self.inference.temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "inference.temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.inference.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "inference.timeout_secs must be at least 1".into(),
            ));
        }

        Ok(())
    }

    /// Check if an inference token is available (from config or environment).
    pub fn has_api_token(&self) -> bool {
        self.inference.api_token.is_some()
    }

    /// Generate a default config TOML string (for the `init` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
