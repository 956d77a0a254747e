//! The autofill service: scan, bind, and fill entry points over the
//! injected store, dictionary, and optional remote pattern service.
//!
//! Every operation is an explicit request/response call so the engine embeds
//! in a browser extension, a desktop automation tool, or a headless-browser
//! driver without a persistent event loop. Remote failures always degrade to
//! local-only matching; they never surface as hard errors from the matching
//! path.

use crate::error::FormFillError;
use crate::fields::{SemanticField, Vocabulary};
use crate::fill::{build_instructions, fill, ControlSurface, FillInstruction, FillReport};
use crate::matching::{match_fields, Dictionary, MatchMethod, MatchResult, ACCEPT_THRESHOLD};
use crate::profile::Profile;
use crate::remote::RemoteMatcher;
use crate::scan::{FieldDescriptor, Scanner};
use crate::store::{KvBackend, Mapping, MappingStore, ProfileCache};
use chrono::Utc;
use scraper::Html;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Orchestrates scanner, matching engine, mapping store, remote service, and
/// fill engine behind the host-facing entry points
pub struct AutofillService {
    scanner: Scanner,
    store: MappingStore,
    profile_cache: ProfileCache,
    dictionary: Dictionary,
    vocabulary: Vocabulary,
    remote: Option<Arc<dyn RemoteMatcher>>,
    user_id: String,
}

impl AutofillService {
    pub fn new(backend: Arc<dyn KvBackend>, user_id: impl Into<String>) -> Self {
        Self {
            scanner: Scanner::default(),
            store: MappingStore::new(backend.clone()),
            profile_cache: ProfileCache::new(backend),
            dictionary: Dictionary::builtin(),
            vocabulary: Vocabulary::builtin(),
            remote: None,
            user_id: user_id.into(),
        }
    }

    pub fn with_remote(mut self, remote: Arc<dyn RemoteMatcher>) -> Self {
        self.remote = Some(remote);
        self
    }

    pub fn with_dictionary(mut self, dictionary: Dictionary) -> Self {
        self.dictionary = dictionary;
        self
    }

    pub fn with_vocabulary(mut self, vocabulary: Vocabulary) -> Self {
        self.vocabulary = vocabulary;
        self
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Scan a page snapshot. Never fails; an unparseable document scans
    /// empty.
    pub fn scan(&self, html: &str) -> Vec<FieldDescriptor> {
        self.scanner.scan(&Html::parse_document(html))
    }

    /// Scan a snapshot and match every descriptor.
    #[instrument(skip(self, html))]
    pub async fn scan_and_match(
        &self,
        domain: &str,
        html: &str,
    ) -> Result<Vec<MatchResult>, FormFillError> {
        let descriptors = self.scan(html);
        self.match_descriptors(domain, &descriptors).await
    }

    /// Match descriptors: stored mappings and the local dictionary, with the
    /// remote service consulted first when nothing is stored for the domain.
    pub async fn match_descriptors(
        &self,
        domain: &str,
        descriptors: &[FieldDescriptor],
    ) -> Result<Vec<MatchResult>, FormFillError> {
        let mappings = self.store.get(domain).await?;

        if mappings.is_empty() {
            if let Some(remote) = &self.remote {
                match remote.match_fields(descriptors, &self.user_id, domain).await {
                    Ok(matched) => {
                        self.cache_matches(domain, matched.iter()).await?;
                        return Ok(matched);
                    }
                    Err(error) => {
                        warn!(%error, domain, "remote matching failed; local matching only");
                    }
                }
            }
        }

        Ok(match_fields(descriptors, &mappings, &self.dictionary))
    }

    /// Bind a control to a semantic field: persist locally, then best-effort
    /// remotely.
    #[instrument(skip(self, target), fields(selector = %target.selector))]
    pub async fn bind(
        &self,
        domain: &str,
        target: &FieldDescriptor,
        field: SemanticField,
    ) -> Result<Mapping, FormFillError> {
        let mapping = Mapping {
            origin_domain: domain.to_string(),
            selector: target.selector.clone(),
            dom_id: target.dom_id.clone(),
            dom_name: target.dom_name.clone(),
            semantic_field: field,
            confidence: 1.0,
            created_at: Utc::now(),
        };
        self.store.put(domain, mapping.clone()).await?;

        if let Some(remote) = &self.remote {
            if let Err(error) = remote.push_binding(domain, &mapping).await {
                warn!(%error, domain, "failed to persist bind remotely");
            }
        }

        Ok(mapping)
    }

    /// The user's profile: fresh cache, then remote fetch, then stale cache.
    pub async fn profile(&self) -> Result<Profile, FormFillError> {
        if let Some(profile) = self.profile_cache.fresh().await? {
            return Ok(profile);
        }

        if let Some(remote) = &self.remote {
            match remote.fetch_profile(&self.user_id).await {
                Ok(profile) => {
                    self.profile_cache.put(&profile).await?;
                    return Ok(profile);
                }
                Err(error) => warn!(%error, "profile fetch failed; trying stale snapshot"),
            }
        }

        self.profile_cache
            .any()
            .await?
            .ok_or(FormFillError::ProfileUnavailable)
    }

    /// Seed or replace the cached profile, for hosts without a remote.
    pub async fn set_profile(&self, profile: &Profile) -> Result<(), FormFillError> {
        self.profile_cache.put(profile).await
    }

    /// Apply explicit instructions against a surface.
    pub fn fill(
        &self,
        surface: &mut dyn ControlSurface,
        instructions: &[FillInstruction],
    ) -> FillReport {
        FillReport::from_outcomes(fill(surface, instructions))
    }

    /// End-to-end fill: scan, match, derive instructions from the profile,
    /// write, then promote accepted matches into the mapping store.
    #[instrument(skip(self, html, surface))]
    pub async fn fill_profile(
        &self,
        domain: &str,
        html: &str,
        surface: &mut dyn ControlSurface,
    ) -> Result<FillReport, FormFillError> {
        let descriptors = self.scan(html);
        let matches = self.match_descriptors(domain, &descriptors).await?;
        let profile = self.profile().await?;

        let instructions = build_instructions(&matches, &profile);
        let outcomes = fill(surface, &instructions);

        let accepted = matches.iter().filter(|m| {
            m.method != MatchMethod::Mapping
                && outcomes
                    .iter()
                    .any(|o| o.success && o.selector == m.descriptor.selector)
        });
        self.cache_matches(domain, accepted).await?;

        let report = FillReport::from_outcomes(outcomes);
        info!(domain, filled = report.filled, failed = report.failed, "fill complete");
        Ok(report)
    }

    /// Wipe cached mappings and the profile snapshot.
    pub async fn clear_cache(&self) -> Result<(), FormFillError> {
        self.store.clear().await
    }

    /// Cache confident matches as implicit mappings; later explicit binds
    /// overwrite them without confirmation.
    async fn cache_matches<'a, I>(&self, domain: &str, matched: I) -> Result<(), FormFillError>
    where
        I: IntoIterator<Item = &'a MatchResult>,
    {
        for m in matched {
            let Some(field) = &m.semantic_field else {
                continue;
            };
            if m.confidence <= ACCEPT_THRESHOLD {
                continue;
            }
            let mapping = Mapping {
                origin_domain: domain.to_string(),
                selector: m.descriptor.selector.clone(),
                dom_id: m.descriptor.dom_id.clone(),
                dom_name: m.descriptor.dom_name.clone(),
                semantic_field: field.clone(),
                confidence: m.confidence,
                created_at: Utc::now(),
            };
            self.store.put(domain, mapping).await?;
        }
        Ok(())
    }
}
