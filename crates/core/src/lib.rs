//! # Vademecum Core
//!
//! Domain types, traits, and error definitions for the vademecum
//! question-answering service. This crate has **zero framework dependencies**
//! — it defines the domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! The storage and generation subsystems are defined as traits here.
//! Implementations live in their respective crates. This enables:
//! - Swapping backends via configuration
//! - Easy testing with scripted implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod error;
pub mod generation;
pub mod knowledge;
pub mod query;
pub mod reply;

// Re-export key types at crate root for ergonomics
pub use error::{Error, GenerationError, Result, StorageError};
pub use generation::{GenerationParams, Generator};
pub use knowledge::{EntryId, KnowledgeEntry, KnowledgeStore};
pub use query::{CallerRole, Query};
pub use reply::{CANONICAL_REFUSAL, INGEST_SUCCESS_MESSAGE, MASTER_ONLY_MESSAGE, Reply};
