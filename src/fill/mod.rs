//! Fill engine: converts accepted matches and profile values into
//! per-control writes.
//!
//! Failures are isolated per field: one bad instruction never aborts the
//! batch, and every outcome is reported rather than silently dropped.

mod page;
mod surface;
mod value;

pub use page::PageBuffer;
pub use surface::{ControlEvent, ControlSurface, RadioMember, SelectOption};

use crate::error::FillFailure;
use crate::fields::{ControlKind, Vocabulary};
use crate::matching::{MatchResult, ACCEPT_THRESHOLD};
use crate::profile::Profile;
use serde::{Deserialize, Serialize};
use tracing::debug;
use value::{normalize_date, parse_bool_like};

/// One write operation against one control
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FillInstruction {
    pub selector: String,
    pub value: String,
    pub control_kind: ControlKind,
}

/// Per-instruction result
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FillOutcome {
    pub selector: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<FillFailure>,
}

/// Batch summary surfaced to the host
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FillReport {
    pub filled: usize,
    pub failed: usize,
    pub results: Vec<FillOutcome>,
}

impl FillReport {
    pub fn from_outcomes(results: Vec<FillOutcome>) -> Self {
        let filled = results.iter().filter(|o| o.success).count();
        Self {
            filled,
            failed: results.len() - filled,
            results,
        }
    }
}

/// Derive instructions from accepted matches and the profile, filtered to
/// confidence above the acceptance threshold.
pub fn build_instructions(matches: &[MatchResult], profile: &Profile) -> Vec<FillInstruction> {
    matches
        .iter()
        .filter(|m| m.confidence > ACCEPT_THRESHOLD)
        .filter_map(|m| {
            let field = m.semantic_field.as_ref()?;
            let value = profile.value_of(field)?;
            Some(FillInstruction {
                selector: m.descriptor.selector.clone(),
                value,
                control_kind: m.descriptor.control_kind,
            })
        })
        .collect()
}

/// Apply every instruction, reporting per-field outcomes.
pub fn fill(surface: &mut dyn ControlSurface, instructions: &[FillInstruction]) -> Vec<FillOutcome> {
    instructions
        .iter()
        .map(|instruction| {
            let error = apply(surface, instruction).err();
            if let Some(failure) = &error {
                debug!(selector = %instruction.selector, %failure, "fill failed");
            }
            FillOutcome {
                selector: instruction.selector.clone(),
                success: error.is_none(),
                error,
            }
        })
        .collect()
}

/// Batch fill straight from a profile: per vocabulary key, try the
/// identifier, the name, then the `data-field` marker convention; apply the
/// first selector that resolves. Keys absent from the page are skipped, not
/// failed.
pub fn fill_profile_direct(
    surface: &mut dyn ControlSurface,
    profile: &Profile,
    vocabulary: &Vocabulary,
) -> FillReport {
    let mut results = Vec::new();
    for entry in vocabulary.entries() {
        let Some(value) = profile.value_of(&entry.key) else {
            continue;
        };
        let key = entry.key.as_str();
        let candidates = [
            format!("#{key}"),
            format!("[name=\"{key}\"]"),
            format!("[data-field=\"{key}\"]"),
        ];
        let Some(selector) = candidates.into_iter().find(|s| surface.resolves(s)) else {
            continue;
        };
        let Some(control_kind) = surface.control_kind(&selector) else {
            continue;
        };

        let instruction = FillInstruction {
            selector: selector.clone(),
            value,
            control_kind,
        };
        let error = apply(surface, &instruction).err();
        results.push(FillOutcome {
            selector,
            success: error.is_none(),
            error,
        });
    }
    FillReport::from_outcomes(results)
}

fn apply(surface: &mut dyn ControlSurface, instruction: &FillInstruction) -> Result<(), FillFailure> {
    let selector = instruction.selector.as_str();
    if !surface.resolves(selector) {
        return Err(FillFailure::Resolution {
            selector: selector.to_string(),
        });
    }

    match instruction.control_kind {
        kind if kind.is_textual() => {
            surface.set_value(selector, &instruction.value);
            surface.notify(selector, ControlEvent::Input);
            surface.notify(selector, ControlEvent::Change);
            surface.notify(selector, ControlEvent::Blur);
            Ok(())
        }
        ControlKind::Select => fill_select(surface, selector, &instruction.value),
        ControlKind::Checkbox => fill_checkbox(surface, selector, &instruction.value),
        ControlKind::Radio => fill_radio(surface, selector, &instruction.value),
        ControlKind::Date => fill_date(surface, selector, &instruction.value),
        ControlKind::File => {
            surface.show_hint(selector, &format!("Attach manually: {}", instruction.value));
            Err(FillFailure::Unsupported {
                reason: format!("file input; expected {}", instruction.value),
            })
        }
        // is_textual() covers the rest; unreachable arm keeps the match total
        _ => Ok(()),
    }
}

/// Option by value equality first, then case-insensitive substring between
/// option text and value in either direction; as a last resort assign the
/// raw value and still emit change.
fn fill_select(
    surface: &mut dyn ControlSurface,
    selector: &str,
    value: &str,
) -> Result<(), FillFailure> {
    let options = surface.options(selector);
    let folded = value.to_lowercase();

    let chosen = options
        .iter()
        .find(|o| o.value == value)
        .or_else(|| {
            options.iter().find(|o| {
                let text = o.text.to_lowercase();
                !text.is_empty() && (text.contains(&folded) || folded.contains(&text))
            })
        })
        .map(|o| o.value.clone());

    surface.set_value(selector, chosen.as_deref().unwrap_or(value));
    surface.notify(selector, ControlEvent::Change);
    Ok(())
}

fn fill_checkbox(
    surface: &mut dyn ControlSurface,
    selector: &str,
    value: &str,
) -> Result<(), FillFailure> {
    let desired = match parse_bool_like(value) {
        Some(flag) => flag,
        None => surface
            .value_attr(selector)
            .map(|own| own.eq_ignore_ascii_case(value))
            .unwrap_or(false),
    };
    surface.set_checked(selector, desired);
    surface.notify(selector, ControlEvent::Change);
    Ok(())
}

fn fill_radio(
    surface: &mut dyn ControlSurface,
    selector: &str,
    value: &str,
) -> Result<(), FillFailure> {
    let group = surface
        .name_of(selector)
        .map(|name| surface.radio_group(&name))
        .unwrap_or_default();

    if let Some(member) = group.iter().find(|m| m.value.eq_ignore_ascii_case(value)) {
        surface.set_checked(&member.selector, true);
        surface.notify(&member.selector, ControlEvent::Change);
        return Ok(());
    }

    // group lookup failed: accept a direct match on the targeted control
    let direct = surface
        .value_attr(selector)
        .map(|own| own.eq_ignore_ascii_case(value))
        .unwrap_or(false);
    if direct {
        surface.set_checked(selector, true);
        surface.notify(selector, ControlEvent::Change);
        return Ok(());
    }

    Err(FillFailure::Validation {
        value: value.to_string(),
        reason: "no radio option matched".to_string(),
    })
}

fn fill_date(
    surface: &mut dyn ControlSurface,
    selector: &str,
    value: &str,
) -> Result<(), FillFailure> {
    match normalize_date(value) {
        Some(canonical) => {
            surface.set_value(selector, &canonical);
            surface.notify(selector, ControlEvent::Input);
            surface.notify(selector, ControlEvent::Change);
            surface.notify(selector, ControlEvent::Blur);
            Ok(())
        }
        None => Err(FillFailure::Validation {
            value: value.to_string(),
            reason: "not a recognizable date".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instruction(selector: &str, value: &str, kind: ControlKind) -> FillInstruction {
        FillInstruction {
            selector: selector.to_string(),
            value: value.to_string(),
            control_kind: kind,
        }
    }

    #[test]
    fn test_text_fill_emits_input_change_blur() {
        let mut page = PageBuffer::from_html(r#"<input type="text" id="fn">"#);
        let outcomes = fill(&mut page, &[instruction("#fn", "Ann", ControlKind::Text)]);
        assert!(outcomes[0].success);
        assert_eq!(page.value_of("#fn"), Some("Ann".to_string()));
        let events: Vec<ControlEvent> = page.events().iter().map(|(_, e)| *e).collect();
        assert_eq!(
            events,
            vec![ControlEvent::Input, ControlEvent::Change, ControlEvent::Blur]
        );
    }

    #[test]
    fn test_fill_is_idempotent() {
        let mut page = PageBuffer::from_html(r#"<input type="text" id="fn">"#);
        let batch = [instruction("#fn", "Ann", ControlKind::Text)];
        let first = fill(&mut page, &batch);
        let second = fill(&mut page, &batch);
        assert!(first[0].success && second[0].success);
        assert_eq!(page.value_of("#fn"), Some("Ann".to_string()));
    }

    #[test]
    fn test_select_matches_value_then_text_substring() {
        let html = r#"<select id="major">
            <option value="cs">Computer Science</option>
            <option value="bio">Biology</option>
        </select>"#;

        let mut page = PageBuffer::from_html(html);
        fill(&mut page, &[instruction("#major", "bio", ControlKind::Select)]);
        assert_eq!(page.value_of("#major"), Some("bio".to_string()));

        let mut page = PageBuffer::from_html(html);
        fill(
            &mut page,
            &[instruction("#major", "computer science", ControlKind::Select)],
        );
        assert_eq!(page.value_of("#major"), Some("cs".to_string()));
    }

    #[test]
    fn test_select_falls_back_to_raw_assignment() {
        let mut page = PageBuffer::from_html(
            r#"<select id="major"><option value="cs">Computer Science</option></select>"#,
        );
        let outcomes = fill(
            &mut page,
            &[instruction("#major", "philosophy", ControlKind::Select)],
        );
        assert!(outcomes[0].success);
        assert_eq!(page.value_of("#major"), Some("philosophy".to_string()));
        assert_eq!(page.events().last().map(|(_, e)| *e), Some(ControlEvent::Change));
    }

    #[test]
    fn test_checkbox_boolean_and_value_comparison() {
        let html = r#"<input type="checkbox" id="agree" value="accepted">"#;

        let mut page = PageBuffer::from_html(html);
        fill(&mut page, &[instruction("#agree", "true", ControlKind::Checkbox)]);
        assert_eq!(page.checked_of("#agree"), Some(true));

        fill(&mut page, &[instruction("#agree", "0", ControlKind::Checkbox)]);
        assert_eq!(page.checked_of("#agree"), Some(false));

        fill(
            &mut page,
            &[instruction("#agree", "ACCEPTED", ControlKind::Checkbox)],
        );
        assert_eq!(page.checked_of("#agree"), Some(true));
    }

    #[test]
    fn test_radio_group_member_selection() {
        let mut page = PageBuffer::from_html(
            r#"<form>
                <input type="radio" id="g-f" name="gender" value="F">
                <input type="radio" id="g-m" name="gender" value="M">
            </form>"#,
        );
        let outcomes = fill(&mut page, &[instruction("#g-f", "m", ControlKind::Radio)]);
        assert!(outcomes[0].success);
        assert_eq!(page.checked_of("#g-m"), Some(true));
        assert_eq!(page.checked_of("#g-f"), Some(false));
    }

    #[test]
    fn test_radio_no_match_reports_validation_failure() {
        let mut page = PageBuffer::from_html(
            r#"<input type="radio" id="g" name="gender" value="F">"#,
        );
        let outcomes = fill(&mut page, &[instruction("#g", "X", ControlKind::Radio)]);
        assert!(!outcomes[0].success);
        assert!(matches!(
            outcomes[0].error,
            Some(FillFailure::Validation { .. })
        ));
    }

    #[test]
    fn test_date_normalization_and_rejection() {
        let html = r#"<input type="date" id="dob">"#;

        let mut page = PageBuffer::from_html(html);
        let ok = fill(
            &mut page,
            &[instruction("#dob", "2024-03-05T00:00:00Z", ControlKind::Date)],
        );
        assert!(ok[0].success);
        assert_eq!(page.value_of("#dob"), Some("2024-03-05".to_string()));

        let mut page = PageBuffer::from_html(html);
        let bad = fill(
            &mut page,
            &[instruction("#dob", "not-a-date", ControlKind::Date)],
        );
        assert!(!bad[0].success);
        // control left unset
        assert_eq!(page.value_of("#dob"), Some(String::new()));
    }

    #[test]
    fn test_file_input_reports_unsupported_with_hint() {
        let mut page = PageBuffer::from_html(r#"<input type="file" id="transcript">"#);
        let outcomes = fill(
            &mut page,
            &[instruction("#transcript", "transcript.pdf", ControlKind::File)],
        );
        assert!(!outcomes[0].success);
        assert!(matches!(
            outcomes[0].error,
            Some(FillFailure::Unsupported { .. })
        ));
        assert_eq!(page.hints().len(), 1);
        assert!(page.hints()[0].1.contains("transcript.pdf"));
    }

    #[test]
    fn test_batch_isolates_failures() {
        let mut page = PageBuffer::from_html(
            r#"<input type="text" id="a"><input type="date" id="b">"#,
        );
        let outcomes = fill(
            &mut page,
            &[
                instruction("#missing", "x", ControlKind::Text),
                instruction("#b", "junk", ControlKind::Date),
                instruction("#a", "kept", ControlKind::Text),
            ],
        );
        assert!(matches!(
            outcomes[0].error,
            Some(FillFailure::Resolution { .. })
        ));
        assert!(!outcomes[1].success);
        assert!(outcomes[2].success);
        assert_eq!(page.value_of("#a"), Some("kept".to_string()));

        let report = FillReport::from_outcomes(outcomes);
        assert_eq!((report.filled, report.failed), (1, 2));
    }

    #[test]
    fn test_fill_profile_direct_selector_conventions() {
        let mut page = PageBuffer::from_html(
            r#"<form>
                <input type="email" id="email">
                <input type="text" name="given_name">
                <input type="text" data-field="family_name">
            </form>"#,
        );
        let profile = Profile {
            given_name: Some("Ann".to_string()),
            family_name: Some("Lee".to_string()),
            email: Some("a@b.com".to_string()),
            ..Default::default()
        };
        let report = fill_profile_direct(&mut page, &profile, &Vocabulary::builtin());
        assert_eq!(report.filled, 3);
        assert_eq!(report.failed, 0);
        assert_eq!(page.value_of("#email"), Some("a@b.com".to_string()));
        assert_eq!(
            page.value_of(r#"[name="given_name"]"#),
            Some("Ann".to_string())
        );
        assert_eq!(
            page.value_of(r#"[data-field="family_name"]"#),
            Some("Lee".to_string())
        );
    }

    #[test]
    fn test_build_instructions_filters_by_confidence_and_profile() {
        use crate::fields::{keys, SemanticField};
        use crate::scan::{FieldContext, FieldDescriptor};

        let descriptor = |selector: &str, kind: ControlKind| FieldDescriptor {
            selector: selector.to_string(),
            dom_id: None,
            dom_name: None,
            placeholder: None,
            label: None,
            aria_label: None,
            control_kind: kind,
            required: false,
            context: FieldContext::default(),
        };
        let result = |selector: &str, field: Option<&str>, confidence: f32| MatchResult {
            descriptor: descriptor(selector, ControlKind::Text),
            semantic_field: field.map(SemanticField::from),
            confidence,
            method: crate::matching::MatchMethod::Exact,
        };

        let profile = Profile {
            given_name: Some("Ann".to_string()),
            email: Some("a@b.com".to_string()),
            ..Default::default()
        };
        let matches = vec![
            result("#fn", Some(keys::GIVEN_NAME), 0.9),
            result("#weak", Some(keys::EMAIL), 0.4),
            result("#none", None, 0.0),
            result("#novalue", Some(keys::PHONE), 0.9),
        ];
        let instructions = build_instructions(&matches, &profile);
        assert_eq!(instructions.len(), 1);
        assert_eq!(instructions[0].selector, "#fn");
        assert_eq!(instructions[0].value, "Ann");
    }
}
