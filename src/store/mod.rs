//! Persistence for user-confirmed bindings and the cached profile.
//!
//! Everything sits behind the injected [`KvBackend`] so the engine can be
//! tested against an in-memory store and run against a durable one in
//! production. Mapping writes are last-write-wins per `(domain, selector)`,
//! acceptable because binds are human-paced.

mod backend;
mod profile_cache;

pub use backend::{KvBackend, MemoryBackend};
pub use profile_cache::ProfileCache;

use crate::error::FormFillError;
use crate::fields::SemanticField;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

const MAPPING_PREFIX: &str = "mappings:";

/// A persisted selector-to-semantic-field binding for one origin.
///
/// Created by an explicit user bind or by promoting a confident match during
/// a fill; at most one is active per `(domain, selector)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mapping {
    pub origin_domain: String,
    pub selector: String,
    pub dom_id: Option<String>,
    pub dom_name: Option<String>,
    pub semantic_field: SemanticField,
    pub confidence: f32,
    pub created_at: DateTime<Utc>,
}

/// Per-origin mapping store over the injected backend
pub struct MappingStore {
    backend: Arc<dyn KvBackend>,
}

impl MappingStore {
    pub fn new(backend: Arc<dyn KvBackend>) -> Self {
        Self { backend }
    }

    /// All mappings stored for a domain.
    pub async fn get(&self, domain: &str) -> Result<Vec<Mapping>, FormFillError> {
        match self.backend.get(&Self::key(domain)).await? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    /// Upsert by `(domain, selector)`: a later write replaces an earlier one
    /// without confirmation, which is how explicit binds overwrite implicit
    /// cached matches.
    pub async fn put(&self, domain: &str, mapping: Mapping) -> Result<(), FormFillError> {
        let mut mappings = self.get(domain).await?;
        match mappings.iter_mut().find(|m| m.selector == mapping.selector) {
            Some(existing) => *existing = mapping,
            None => mappings.push(mapping),
        }
        debug!(domain, count = mappings.len(), "mapping stored");
        self.backend
            .put(&Self::key(domain), serde_json::to_string(&mappings)?)
            .await
    }

    /// Wipe all cached mappings and profile snapshots.
    pub async fn clear(&self) -> Result<(), FormFillError> {
        self.backend.clear().await
    }

    fn key(domain: &str) -> String {
        format!("{MAPPING_PREFIX}{domain}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::keys;
    use crate::profile::Profile;

    fn mapping(selector: &str, field: &str) -> Mapping {
        Mapping {
            origin_domain: "apply.example.edu".to_string(),
            selector: selector.to_string(),
            dom_id: None,
            dom_name: None,
            semantic_field: SemanticField::from(field),
            confidence: 1.0,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_put_then_get_by_domain() {
        let store = MappingStore::new(Arc::new(MemoryBackend::new()));
        store
            .put("apply.example.edu", mapping("#email", keys::EMAIL))
            .await
            .unwrap();

        let mappings = store.get("apply.example.edu").await.unwrap();
        assert_eq!(mappings.len(), 1);
        assert!(store.get("other.example.org").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upsert_replaces_same_selector() {
        let store = MappingStore::new(Arc::new(MemoryBackend::new()));
        // implicit cached match first, explicit re-bind second
        store
            .put("apply.example.edu", mapping("#f", keys::FAMILY_NAME))
            .await
            .unwrap();
        store
            .put("apply.example.edu", mapping("#f", keys::GIVEN_NAME))
            .await
            .unwrap();

        let mappings = store.get("apply.example.edu").await.unwrap();
        assert_eq!(mappings.len(), 1);
        assert_eq!(mappings[0].semantic_field, SemanticField::from(keys::GIVEN_NAME));
    }

    #[tokio::test]
    async fn test_clear_wipes_mappings_and_profile() {
        let backend = Arc::new(MemoryBackend::new());
        let store = MappingStore::new(backend.clone());
        let cache = ProfileCache::new(backend.clone());

        store
            .put("apply.example.edu", mapping("#email", keys::EMAIL))
            .await
            .unwrap();
        cache.put(&Profile::default()).await.unwrap();

        store.clear().await.unwrap();
        assert!(store.get("apply.example.edu").await.unwrap().is_empty());
        assert!(cache.any().await.unwrap().is_none());
    }
}
