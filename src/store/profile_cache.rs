//! Cached profile snapshot with a short freshness window.
//!
//! Profile data is fetched once and reused for about an hour; staleness
//! beyond that is tolerated rather than strictly enforced, so a failed
//! refresh can still fall back to the stale snapshot.

use crate::error::FormFillError;
use crate::profile::Profile;
use crate::store::backend::KvBackend;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub(crate) const PROFILE_KEY: &str = "profile";

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CachedProfile {
    profile: Profile,
    fetched_at: DateTime<Utc>,
}

/// Profile snapshot cache over the injected backend
pub struct ProfileCache {
    backend: Arc<dyn KvBackend>,
    max_age: Duration,
}

impl ProfileCache {
    pub fn new(backend: Arc<dyn KvBackend>) -> Self {
        Self {
            backend,
            max_age: Duration::hours(1),
        }
    }

    pub fn with_max_age(backend: Arc<dyn KvBackend>, max_age: Duration) -> Self {
        Self { backend, max_age }
    }

    /// The cached profile, only if still inside the freshness window.
    pub async fn fresh(&self) -> Result<Option<Profile>, FormFillError> {
        Ok(self
            .load()
            .await?
            .filter(|c| Utc::now() - c.fetched_at <= self.max_age)
            .map(|c| c.profile))
    }

    /// The cached profile regardless of age.
    pub async fn any(&self) -> Result<Option<Profile>, FormFillError> {
        Ok(self.load().await?.map(|c| c.profile))
    }

    /// Store a freshly fetched profile with the current timestamp.
    pub async fn put(&self, profile: &Profile) -> Result<(), FormFillError> {
        let cached = CachedProfile {
            profile: profile.clone(),
            fetched_at: Utc::now(),
        };
        self.backend
            .put(PROFILE_KEY, serde_json::to_string(&cached)?)
            .await
    }

    async fn load(&self) -> Result<Option<CachedProfile>, FormFillError> {
        match self.backend.get(PROFILE_KEY).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }
}
