//! Remote pattern service boundary.
//!
//! The service offers the same matching contract as the local engine,
//! running it against server-held per-user mappings and dictionaries. The
//! result shape is identical so callers post-process uniformly regardless of
//! where matching ran. Every call is bounded by a client-level timeout;
//! failures map to [`FormFillError`] and callers degrade to local-only
//! matching rather than surfacing a hard error.

use crate::error::FormFillError;
use crate::matching::MatchResult;
use crate::profile::Profile;
use crate::scan::FieldDescriptor;
use crate::store::Mapping;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Server-side matching and profile contract
#[async_trait]
pub trait RemoteMatcher: Send + Sync {
    /// Match descriptors against server-held mappings and dictionary.
    async fn match_fields(
        &self,
        descriptors: &[FieldDescriptor],
        user_id: &str,
        domain: &str,
    ) -> Result<Vec<MatchResult>, FormFillError>;

    /// Fetch the user's profile.
    async fn fetch_profile(&self, user_id: &str) -> Result<Profile, FormFillError>;

    /// Persist a binding server-side.
    async fn push_binding(&self, domain: &str, mapping: &Mapping) -> Result<(), FormFillError>;
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct MatchRequest<'a> {
    dom_fields: &'a [FieldDescriptor],
    domain: &'a str,
    user_id: &'a str,
}

#[derive(serde::Deserialize)]
struct MatchResponse {
    matched: Vec<MatchResult>,
}

#[derive(serde::Deserialize)]
struct ProfileResponse {
    profile: Profile,
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct BindRequest<'a> {
    domain: &'a str,
    selector: &'a str,
    semantic_field: &'a str,
    dom_id: Option<&'a str>,
    dom_name: Option<&'a str>,
}

/// HTTP client for the remote pattern service
pub struct HttpRemoteMatcher {
    http: Client,
    base_url: String,
}

impl HttpRemoteMatcher {
    pub fn new(base_url: impl Into<String>) -> Result<Self, FormFillError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, FormFillError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response
            .text()
            .await
            .unwrap_or_default()
            .chars()
            .take(200)
            .collect();
        Err(FormFillError::Remote {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl RemoteMatcher for HttpRemoteMatcher {
    async fn match_fields(
        &self,
        descriptors: &[FieldDescriptor],
        user_id: &str,
        domain: &str,
    ) -> Result<Vec<MatchResult>, FormFillError> {
        let request = MatchRequest {
            dom_fields: descriptors,
            domain,
            user_id,
        };
        let response = self
            .http
            .post(format!("{}/match", self.base_url))
            .json(&request)
            .send()
            .await?;
        let body: MatchResponse = Self::check(response).await?.json().await?;

        // Stamp provenance so downstream logging can tell where matching ran
        Ok(body
            .matched
            .into_iter()
            .map(|mut m| {
                m.method = crate::matching::MatchMethod::Remote;
                m
            })
            .collect())
    }

    async fn fetch_profile(&self, user_id: &str) -> Result<Profile, FormFillError> {
        let response = self
            .http
            .get(format!("{}/profile", self.base_url))
            .query(&[("userId", user_id)])
            .send()
            .await?;
        let body: ProfileResponse = Self::check(response).await?.json().await?;
        Ok(body.profile)
    }

    async fn push_binding(&self, domain: &str, mapping: &Mapping) -> Result<(), FormFillError> {
        let request = BindRequest {
            domain,
            selector: &mapping.selector,
            semantic_field: mapping.semantic_field.as_str(),
            dom_id: mapping.dom_id.as_deref(),
            dom_name: mapping.dom_name.as_deref(),
        };
        let response = self
            .http
            .post(format!("{}/mappings", self.base_url))
            .json(&request)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::ControlKind;
    use crate::scan::FieldContext;

    #[test]
    fn test_match_request_wire_shape() {
        let descriptor = FieldDescriptor {
            selector: "#email".to_string(),
            dom_id: Some("email".to_string()),
            dom_name: None,
            placeholder: None,
            label: Some("Email Address".to_string()),
            aria_label: None,
            control_kind: ControlKind::Email,
            required: true,
            context: FieldContext::default(),
        };
        let request = MatchRequest {
            dom_fields: std::slice::from_ref(&descriptor),
            domain: "apply.example.edu",
            user_id: "u-1",
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["domain"], "apply.example.edu");
        assert_eq!(json["domFields"][0]["domId"], "email");
        assert_eq!(json["domFields"][0]["controlKind"], "email");
        assert_eq!(json["domFields"][0]["selector"], "#email");
    }

    #[test]
    fn test_match_response_parses_without_method() {
        // the server does not send a method discriminator
        let raw = r##"{
            "matched": [{
                "descriptor": {
                    "selector": "#fn",
                    "domId": "fn",
                    "domName": null,
                    "placeholder": null,
                    "label": "First Name",
                    "ariaLabel": null,
                    "controlKind": "text",
                    "required": false
                },
                "semanticField": "given_name",
                "confidence": 0.9
            }]
        }"##;
        let parsed: MatchResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.matched.len(), 1);
        assert_eq!(parsed.matched[0].confidence, 0.9);
    }

    #[test]
    fn test_bind_request_wire_shape() {
        let request = BindRequest {
            domain: "apply.example.edu",
            selector: "#email",
            semantic_field: "email",
            dom_id: Some("email"),
            dom_name: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["semanticField"], "email");
        assert_eq!(json["domName"], serde_json::Value::Null);
    }
}
