//! Knowledge store trait — append-only storage of procedure texts.
//!
//! The knowledge base is a durable, ordered list of short operational texts.
//! The service only ever appends and reads; there is no delete, no update,
//! and no compaction anywhere in the system. Durability beyond an accepted
//! `append` is the backing medium's concern.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::StorageError;

/// Opaque identifier for a stored entry.
pub type EntryId = String;

/// A single stored procedure text.
///
/// Never mutated in place and never deleted once accepted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    /// Unique ID for this entry
    pub id: EntryId,

    /// The stored text
    pub content: String,

    /// When this entry was accepted
    pub created_at: DateTime<Utc>,
}

impl KnowledgeEntry {
    /// Create a new entry with a fresh ID and the current timestamp.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            content: content.into(),
            created_at: Utc::now(),
        }
    }
}

/// The core KnowledgeStore trait.
///
/// Implementations: JSONL file, SQLite, in-memory (for testing and volatile
/// deployments). Callers pass non-empty text; input validation happens at the
/// service boundary.
#[async_trait]
pub trait KnowledgeStore: Send + Sync {
    /// The backend name (e.g., "memory", "jsonl", "sqlite").
    fn name(&self) -> &str;

    /// Persist one entry, returning its ID.
    async fn append(&self, content: &str) -> std::result::Result<EntryId, StorageError>;

    /// Every stored entry in insertion order. Order is significant: later
    /// entries are more recent and may be weighted as such during retrieval.
    async fn all(&self) -> std::result::Result<Vec<KnowledgeEntry>, StorageError>;

    /// Total number of stored entries.
    async fn count(&self) -> std::result::Result<usize, StorageError>;
}
