//! The injected key-value backend behind all persisted state.
//!
//! The engine never owns storage: hosts hand it a [`KvBackend`] (browser
//! extension storage, a file, a database) and the in-crate
//! [`MemoryBackend`] serves tests and ephemeral sessions.

use crate::error::FormFillError;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// String-keyed store for JSON-encoded values
#[async_trait]
pub trait KvBackend: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, FormFillError>;
    async fn put(&self, key: &str, value: String) -> Result<(), FormFillError>;
    async fn remove(&self, key: &str) -> Result<(), FormFillError>;
    async fn clear(&self) -> Result<(), FormFillError>;
}

/// In-memory backend
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvBackend for MemoryBackend {
    async fn get(&self, key: &str) -> Result<Option<String>, FormFillError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn put(&self, key: &str, value: String) -> Result<(), FormFillError> {
        self.entries.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), FormFillError> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn clear(&self) -> Result<(), FormFillError> {
        self.entries.write().await.clear();
        Ok(())
    }
}
