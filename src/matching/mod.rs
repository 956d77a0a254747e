//! Layered matching engine: descriptors + stored mappings + the pattern
//! dictionary in, match results out.
//!
//! Per descriptor, strategies apply in order and the first success wins:
//!
//! 1. Stored user mapping (selector, then id, then name) at 0.99
//! 2. Exact dictionary phrase contained in the haystack
//! 3. Fuzzy phrase match (every long word present as a token), 0.8 × base
//! 4. Contextual inference from section titles and neighboring labels
//! 5. No match at confidence 0
//!
//! The engine is pure: no clock, no randomness, no I/O. Identical inputs
//! produce identical outputs, and each descriptor is matched independently
//! of the rest of the batch.

mod dictionary;

pub use dictionary::{Dictionary, DictionaryEntry};

use crate::fields::{keys, ControlKind, SemanticField};
use crate::scan::FieldDescriptor;
use crate::store::Mapping;
use crate::text::normalize;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::trace;

/// Confidence assigned to a stored user mapping hit
pub const USER_MAPPING_CONFIDENCE: f32 = 0.99;

/// Multiplier applied when a dictionary entry expects a different control kind
pub const KIND_MISMATCH_PENALTY: f32 = 0.7;

/// Multiplier applied to fuzzy (word-containment) matches
pub const FUZZY_FACTOR: f32 = 0.8;

/// Matches above this threshold are eligible for filling and for implicit
/// promotion into the mapping store
pub const ACCEPT_THRESHOLD: f32 = 0.5;

/// How a match was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MatchMethod {
    Mapping,
    Exact,
    Fuzzy,
    Contextual,
    Remote,
    #[default]
    Unmatched,
}

impl MatchMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mapping => "mapping",
            Self::Exact => "exact",
            Self::Fuzzy => "fuzzy",
            Self::Contextual => "contextual",
            Self::Remote => "remote",
            Self::Unmatched => "unmatched",
        }
    }
}

/// A descriptor paired with the inferred semantic field and confidence.
/// Ephemeral: recomputed per scan, persisted only when promoted to a
/// [`Mapping`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub descriptor: FieldDescriptor,
    pub semantic_field: Option<SemanticField>,
    pub confidence: f32,
    #[serde(default)]
    pub method: MatchMethod,
}

/// Match every descriptor against stored mappings and the dictionary.
///
/// Order-independent and deterministic for identical inputs.
pub fn match_fields(
    descriptors: &[FieldDescriptor],
    mappings: &[Mapping],
    dictionary: &Dictionary,
) -> Vec<MatchResult> {
    descriptors
        .iter()
        .map(|d| match_one(d, mappings, dictionary))
        .collect()
}

fn match_one(
    descriptor: &FieldDescriptor,
    mappings: &[Mapping],
    dictionary: &Dictionary,
) -> MatchResult {
    if let Some(mapping) = lookup_mapping(descriptor, mappings) {
        return MatchResult {
            descriptor: descriptor.clone(),
            semantic_field: Some(mapping.semantic_field.clone()),
            confidence: USER_MAPPING_CONFIDENCE,
            method: MatchMethod::Mapping,
        };
    }

    let haystack = haystack_of(descriptor);
    trace!(selector = %descriptor.selector, haystack = %haystack, "matching");

    if !haystack.is_empty() {
        if let Some(result) = exact_match(descriptor, &haystack, dictionary) {
            return result;
        }
        if let Some(result) = fuzzy_match(descriptor, &haystack, dictionary) {
            return result;
        }
    }

    if let Some(result) = contextual_match(descriptor) {
        return result;
    }

    MatchResult {
        descriptor: descriptor.clone(),
        semantic_field: None,
        confidence: 0.0,
        method: MatchMethod::Unmatched,
    }
}

/// Stored-mapping lookup: selector, else stored id, else stored name.
fn lookup_mapping<'a>(
    descriptor: &FieldDescriptor,
    mappings: &'a [Mapping],
) -> Option<&'a Mapping> {
    mappings
        .iter()
        .find(|m| m.selector == descriptor.selector)
        .or_else(|| {
            descriptor.dom_id.as_deref().and_then(|id| {
                mappings.iter().find(|m| m.dom_id.as_deref() == Some(id))
            })
        })
        .or_else(|| {
            descriptor.dom_name.as_deref().and_then(|name| {
                mappings.iter().find(|m| m.dom_name.as_deref() == Some(name))
            })
        })
}

/// Concatenated, case-folded descriptor text used for phrase matching.
fn haystack_of(descriptor: &FieldDescriptor) -> String {
    let parts = [
        descriptor.label.as_deref(),
        descriptor.placeholder.as_deref(),
        descriptor.dom_name.as_deref(),
        descriptor.dom_id.as_deref(),
        descriptor.aria_label.as_deref(),
    ];
    let joined = parts.iter().flatten().copied().collect::<Vec<_>>().join(" ");
    normalize(&joined)
}

fn kind_adjusted(base: f32, entry: &DictionaryEntry, descriptor: &FieldDescriptor) -> f32 {
    match entry.expected_kind {
        Some(expected) if expected != descriptor.control_kind => base * KIND_MISMATCH_PENALTY,
        _ => base,
    }
}

/// First entry whose phrase is a substring of the haystack wins.
fn exact_match(
    descriptor: &FieldDescriptor,
    haystack: &str,
    dictionary: &Dictionary,
) -> Option<MatchResult> {
    for entry in dictionary.entries() {
        for phrase in &entry.phrases {
            if haystack.contains(&normalize(phrase)) {
                return Some(MatchResult {
                    descriptor: descriptor.clone(),
                    semantic_field: Some(entry.field.clone()),
                    confidence: kind_adjusted(entry.base_confidence, entry, descriptor),
                    method: MatchMethod::Exact,
                });
            }
        }
    }
    None
}

/// Word-containment match: every phrase word longer than two characters must
/// be present as a whole token in the haystack. Phrases made solely of short
/// words never fuzzy-match. Highest confidence across all entries wins;
/// strict comparison keeps declaration order on ties.
fn fuzzy_match(
    descriptor: &FieldDescriptor,
    haystack: &str,
    dictionary: &Dictionary,
) -> Option<MatchResult> {
    let hay_tokens: HashSet<&str> = haystack.split_whitespace().collect();

    let mut best: Option<(f32, &DictionaryEntry)> = None;
    for entry in dictionary.entries() {
        let hit = entry.phrases.iter().any(|phrase| {
            let words: Vec<String> = normalize(phrase)
                .split_whitespace()
                .filter(|w| w.chars().count() > 2)
                .map(|w| w.to_string())
                .collect();
            !words.is_empty() && words.iter().all(|w| hay_tokens.contains(w.as_str()))
        });
        if hit {
            let confidence =
                kind_adjusted(FUZZY_FACTOR * entry.base_confidence, entry, descriptor);
            if best.map(|(c, _)| confidence > c).unwrap_or(true) {
                best = Some((confidence, entry));
            }
        }
    }

    best.map(|(confidence, entry)| MatchResult {
        descriptor: descriptor.clone(),
        semantic_field: Some(entry.field.clone()),
        confidence,
        method: MatchMethod::Fuzzy,
    })
}

const CONTACT_CUES: &[&str] = &["contact", "contacto"];
const FAMILY_NAME_CUES: &[&str] = &["last name", "family name", "surname", "apellido"];
const BIRTH_CUES: &[&str] = &["birth", "nacimiento"];

fn contains_cue(text: &str, cues: &[&str]) -> bool {
    cues.iter().any(|cue| text.contains(cue))
}

/// Narrow, fixed-confidence heuristics keyed on section titles and
/// neighboring-label cues.
fn contextual_match(descriptor: &FieldDescriptor) -> Option<MatchResult> {
    let section = descriptor
        .context
        .section_title
        .as_deref()
        .map(normalize)
        .unwrap_or_default();

    if contains_cue(&section, CONTACT_CUES) {
        let inferred = match descriptor.control_kind {
            ControlKind::Email => Some((keys::EMAIL, 0.9)),
            ControlKind::Tel => Some((keys::PHONE, 0.85)),
            _ => None,
        };
        if let Some((field, confidence)) = inferred {
            return Some(contextual_result(descriptor, field, confidence));
        }
    }

    // An unlabeled text control next to a family-name field is, in practice,
    // the given-name half of a name pair.
    if descriptor.label.is_none() && descriptor.control_kind == ControlKind::Text {
        let neighbor_implies_family = descriptor
            .context
            .neighboring_labels
            .iter()
            .any(|l| contains_cue(&normalize(l), FAMILY_NAME_CUES));
        if neighbor_implies_family {
            return Some(contextual_result(descriptor, keys::GIVEN_NAME, 0.6));
        }
    }

    if descriptor.control_kind == ControlKind::Date && contains_cue(&section, BIRTH_CUES) {
        return Some(contextual_result(descriptor, keys::DOB, 0.7));
    }

    None
}

fn contextual_result(descriptor: &FieldDescriptor, field: &str, confidence: f32) -> MatchResult {
    MatchResult {
        descriptor: descriptor.clone(),
        semantic_field: Some(SemanticField::from(field)),
        confidence,
        method: MatchMethod::Contextual,
    }
}
