//! File-based knowledge store — persistent JSON-lines storage.
//!
//! Each line is a JSON-encoded `KnowledgeEntry`. The store is append-only,
//! so every accepted entry becomes exactly one new line at the end of the
//! file; nothing is ever rewritten or removed.
//!
//! This backend is simple, portable, human-inspectable, and requires no
//! external services.

use async_trait::async_trait;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use vademecum_core::error::StorageError;
use vademecum_core::knowledge::{EntryId, KnowledgeEntry, KnowledgeStore};

/// A file-backed knowledge store using JSONL (one JSON object per line).
///
/// Entries are loaded into memory on creation; every `append` pushes one
/// entry and writes one line, holding the write lock across both so that
/// concurrent appends keep file order and memory order identical.
pub struct JsonlStore {
    path: PathBuf,
    entries: Arc<RwLock<Vec<KnowledgeEntry>>>,
}

impl JsonlStore {
    /// Create a new JSONL store at the given path.
    ///
    /// If the file exists, entries are loaded from it.
    /// If the file does not exist, starts empty (file created on first write).
    pub fn new(path: PathBuf) -> Self {
        let entries = Self::load_from_disk(&path);
        debug!(path = %path.display(), count = entries.len(), "JSONL knowledge store loaded");
        Self {
            path,
            entries: Arc::new(RwLock::new(entries)),
        }
    }

    /// Load entries from a JSONL file, skipping lines that fail to parse.
    fn load_from_disk(path: &PathBuf) -> Vec<KnowledgeEntry> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => return Vec::new(), // File doesn't exist yet — start empty
        };

        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| match serde_json::from_str::<KnowledgeEntry>(line) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!(error = %e, "Skipping corrupted knowledge entry");
                    None
                }
            })
            .collect()
    }

    /// Append one serialized entry as a new line at the end of the file.
    fn write_line(&self, entry: &KnowledgeEntry) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    StorageError::Io(format!("Failed to create knowledge directory: {e}"))
                })?;
            }
        }

        let line = serde_json::to_string(entry)
            .map_err(|e| StorageError::Malformed(format!("Failed to serialize entry: {e}")))?;

        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| StorageError::Io(format!("Failed to open knowledge file: {e}")))?;

        writeln!(file, "{line}")
            .map_err(|e| StorageError::Io(format!("Failed to write knowledge file: {e}")))?;

        Ok(())
    }
}

#[async_trait]
impl KnowledgeStore for JsonlStore {
    fn name(&self) -> &str {
        "jsonl"
    }

    async fn append(&self, content: &str) -> Result<EntryId, StorageError> {
        let entry = KnowledgeEntry::new(content);
        let id = entry.id.clone();

        let mut entries = self.entries.write().await;
        self.write_line(&entry)?;
        entries.push(entry);
        Ok(id)
    }

    async fn all(&self) -> Result<Vec<KnowledgeEntry>, StorageError> {
        Ok(self.entries.read().await.clone())
    }

    async fn count(&self) -> Result<usize, StorageError> {
        Ok(self.entries.read().await.len())
    }
}
