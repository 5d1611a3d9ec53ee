//! Error types for the vademecum domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant, and the propagation rules
//! differ per context: storage read failures degrade to an empty knowledge
//! base, generation failures degrade to the canonical refusal, while
//! authorization and validation failures surface to the caller.

use thiserror::Error;

/// The top-level error type for all vademecum operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Storage errors ---
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    // --- Generation errors ---
    //
    // Never surfaced to end users: callers render the canonical refusal.
    #[error("Generation unavailable: {0}")]
    GenerationUnavailable(#[from] GenerationError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Caller-facing rejections ---
    #[error("Not authorized: {0}")]
    Authorization(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Malformed stored data: {0}")]
    Malformed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),
}

/// Why a remote generation call produced no usable text.
///
/// Every variant means the same thing to the caller: generation is
/// unavailable for this request and the reply must be the canonical refusal.
#[derive(Debug, Clone, Error)]
pub enum GenerationError {
    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("API request failed: {message} (status: {status_code})")]
    Api { status_code: u16, message: String },

    #[error("Authentication rejected: {0}")]
    Unauthorized(String),

    #[error("Rate limited by inference endpoint")]
    RateLimited,

    #[error("Malformed response payload: {0}")]
    MalformedResponse(String),
}
