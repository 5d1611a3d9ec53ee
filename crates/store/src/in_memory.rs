//! In-memory backend — useful for testing and volatile deployments.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use vademecum_core::error::StorageError;
use vademecum_core::knowledge::{EntryId, KnowledgeEntry, KnowledgeStore};

/// An in-memory store holding entries in a Vec, in insertion order.
///
/// Nothing is persisted; a restart loses all entries. The store is still an
/// explicitly owned, injected instance rather than process-global state.
pub struct InMemoryStore {
    entries: Arc<RwLock<Vec<KnowledgeEntry>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(Vec::new())),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KnowledgeStore for InMemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn append(&self, content: &str) -> Result<EntryId, StorageError> {
        let entry = KnowledgeEntry::new(content);
        let id = entry.id.clone();
        self.entries.write().await.push(entry);
        Ok(id)
    }

    async fn all(&self) -> Result<Vec<KnowledgeEntry>, StorageError> {
        Ok(self.entries.read().await.clone())
    }

    async fn count(&self) -> Result<usize, StorageError> {
        Ok(self.entries.read().await.len())
    }
}
