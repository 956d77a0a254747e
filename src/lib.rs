//! Form-field detection, semantic matching, and profile autofill.
//!
//! Scans arbitrary third-party web forms, infers which canonical profile
//! attribute each control represents through a layered heuristic strategy
//! with confidence scoring, persists user-confirmed bindings per origin, and
//! writes stored values back into heterogeneous control types while
//! respecting each control's reactivity contract.
//!
//! # Architecture
//!
//! ```text
//! Page snapshot (HTML)
//!       │
//!       ▼
//! ┌─────────────────────────────────────────┐
//! │  Scanner                                │
//! │  controls → FieldDescriptor per field   │
//! └─────────────────────────────────────────┘
//!       │
//!       ▼
//! ┌─────────────────────────────────────────┐
//! │  Matching Engine                        │
//! │  mapping → exact → fuzzy → contextual   │
//! │  (MappingStore hit short-circuits 0.99) │
//! └─────────────────────────────────────────┘
//!       │
//!       ├─── store empty ───► Remote Pattern Service
//!       │                     (same contract; falls back local on failure)
//!       ▼
//! ┌─────────────────────────────────────────┐
//! │  Fill Engine                            │
//! │  MatchResult × Profile → per-control    │
//! │  writes + input/change/blur events      │
//! └─────────────────────────────────────────┘
//! ```
//!
//! Matching is pure and deterministic; storage sits behind an injected
//! [`KvBackend`]; every host-facing operation is an explicit call rather
//! than a persistent event loop, so the engine embeds in a browser
//! extension, a desktop automation tool, or a headless-browser driver
//! interchangeably.

pub mod error;
pub mod fields;
pub mod fill;
pub mod matching;
pub mod profile;
pub mod remote;
pub mod scan;
pub mod service;
pub mod store;
pub mod text;

pub use error::{FillFailure, FormFillError};
pub use fields::{keys, ControlKind, SemanticField, Vocabulary, VocabularyEntry};
pub use fill::{
    build_instructions, fill, fill_profile_direct, ControlEvent, ControlSurface, FillInstruction,
    FillOutcome, FillReport, PageBuffer, RadioMember, SelectOption,
};
pub use matching::{
    match_fields, Dictionary, DictionaryEntry, MatchMethod, MatchResult, ACCEPT_THRESHOLD,
    USER_MAPPING_CONFIDENCE,
};
pub use profile::{EducationRecord, Essay, GuardianRecord, Profile};
pub use remote::{HttpRemoteMatcher, RemoteMatcher};
pub use scan::{FieldContext, FieldDescriptor, ScanConfig, Scanner};
pub use service::AutofillService;
pub use store::{KvBackend, Mapping, MappingStore, MemoryBackend, ProfileCache};
