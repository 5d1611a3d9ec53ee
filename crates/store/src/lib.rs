//! Knowledge store backends for vademecum.
//!
//! All backends implement the `vademecum_core::KnowledgeStore` trait.
//! The factory selects the correct backend based on configuration.

pub mod in_memory;
pub mod jsonl;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use in_memory::InMemoryStore;
pub use jsonl::JsonlStore;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;

use std::path::PathBuf;
use std::sync::Arc;

use vademecum_config::StoreConfig;
use vademecum_core::{Error, KnowledgeStore};

/// Build a knowledge store from configuration.
pub async fn build_store(config: &StoreConfig) -> Result<Arc<dyn KnowledgeStore>, Error> {
    match config.backend.as_str() {
        "memory" => Ok(Arc::new(InMemoryStore::new())),
        "jsonl" => Ok(Arc::new(JsonlStore::new(PathBuf::from(&config.path)))),
        #[cfg(feature = "sqlite")]
        "sqlite" => Ok(Arc::new(SqliteStore::new(&config.path).await?)),
        #[cfg(not(feature = "sqlite"))]
        "sqlite" => Err(Error::Config {
            message: "store backend 'sqlite' requires the `sqlite` feature".into(),
        }),
        other => Err(Error::Config {
            message: format!("unknown store backend '{other}'"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn builds_memory_backend() {
        let config = StoreConfig {
            backend: "memory".into(),
            path: String::new(),
        };
        let store = build_store(&config).await.unwrap();
        assert_eq!(store.name(), "memory");
    }

    #[tokio::test]
    async fn builds_jsonl_backend() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig {
            backend: "jsonl".into(),
            path: dir
                .path()
                .join("knowledge.jsonl")
                .to_string_lossy()
                .into_owned(),
        };
        let store = build_store(&config).await.unwrap();
        assert_eq!(store.name(), "jsonl");
    }

    #[cfg(feature = "sqlite")]
    #[tokio::test]
    async fn builds_sqlite_backend() {
        let config = StoreConfig {
            backend: "sqlite".into(),
            path: "sqlite::memory:".into(),
        };
        let store = build_store(&config).await.unwrap();
        assert_eq!(store.name(), "sqlite");
    }

    #[tokio::test]
    async fn unknown_backend_is_rejected() {
        let config = StoreConfig {
            backend: "chroma".into(),
            path: String::new(),
        };
        let err = build_store(&config).await.err().unwrap();
        assert!(err.to_string().contains("chroma"));
    }
}
