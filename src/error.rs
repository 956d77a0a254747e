//! Error types for the autofill engine.
//!
//! Two tiers: [`FormFillError`] for operations that can legitimately fail as
//! a whole (store I/O, remote calls, config parsing), and [`FillFailure`] for
//! per-field problems that are aggregated into batch results and never abort
//! a fill.

use serde::Serialize;
use thiserror::Error;

/// Top-level error for store, network, and configuration failures
#[derive(Error, Debug)]
pub enum FormFillError {
    #[error("store error: {0}")]
    Store(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("remote service returned {status}: {message}")]
    Remote { status: u16, message: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("config parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("no profile available locally or remotely")]
    ProfileUnavailable,
}

/// Per-instruction fill failure, carried in [`crate::fill::FillOutcome`].
///
/// These are reported, never propagated: one bad instruction must not abort
/// the rest of the batch.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum FillFailure {
    /// The selector no longer resolves to a control at fill time
    #[error("selector did not resolve: {selector}")]
    Resolution { selector: String },

    /// The control cannot be written programmatically (file inputs)
    #[error("unsupported control: {reason}")]
    Unsupported { reason: String },

    /// The value could not be coerced for the control kind
    #[error("invalid value {value:?}: {reason}")]
    Validation { value: String, reason: String },
}
