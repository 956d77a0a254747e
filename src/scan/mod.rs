//! Field scanner: extracts a [`FieldDescriptor`] per eligible control from a
//! parsed page snapshot.
//!
//! Each call to [`Scanner::scan`] produces a fresh snapshot in document
//! order, not a live stream. The scanner never fails: an unparseable or
//! empty document yields an empty result, and unresolved labels or selectors
//! degrade to best-effort defaults.

mod selector;

pub(crate) use selector::selector_for;

use crate::fields::ControlKind;
use crate::text::clean_text;
use scraper::{ElementRef, Html};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// How far up the tree container-label and text-node heuristics look
const LABEL_ANCESTOR_DEPTH: usize = 3;

/// Everything the matcher needs to know about one form control
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    /// Selector resolving to exactly one control on the scanned page state
    pub selector: String,
    pub dom_id: Option<String>,
    pub dom_name: Option<String>,
    pub placeholder: Option<String>,
    pub label: Option<String>,
    pub aria_label: Option<String>,
    pub control_kind: ControlKind,
    pub required: bool,
    #[serde(default)]
    pub context: FieldContext,
}

/// Surrounding-page context captured for contextual inference
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldContext {
    /// Nearest heading or `<legend>` preceding the control
    pub section_title: Option<String>,
    /// Position within the enclosing form (document-wide when unenclosed)
    pub ordinal_position: usize,
    /// Labels of up to two preceding and two following controls
    pub neighboring_labels: Vec<String>,
}

/// Scanner tuning knobs
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Text nodes at or above this length are ignored as label candidates
    pub max_text_len: usize,
    /// Neighboring controls captured on each side for context
    pub neighbor_window: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_text_len: 100,
            neighbor_window: 2,
        }
    }
}

/// Extracts field descriptors from page snapshots
#[derive(Debug, Default)]
pub struct Scanner {
    config: ScanConfig,
}

impl Scanner {
    pub fn new(config: ScanConfig) -> Self {
        Self { config }
    }

    /// Scan a parsed document, returning descriptors in document order.
    pub fn scan(&self, document: &Html) -> Vec<FieldDescriptor> {
        let index = DocumentIndex::build(document);

        let labels: Vec<Option<String>> = index
            .controls
            .iter()
            .map(|el| self.resolve_label(el, &index.label_for))
            .collect();

        // Ordinal within the enclosing form; controls outside any form share
        // a document-wide sequence.
        let mut per_form: HashMap<Option<ego_tree::NodeId>, usize> = HashMap::new();
        let ordinals: Vec<usize> = index
            .controls
            .iter()
            .map(|el| {
                let form = el
                    .ancestors()
                    .filter_map(ElementRef::wrap)
                    .find(|a| a.value().name() == "form")
                    .map(|f| f.id());
                let counter = per_form.entry(form).or_insert(0);
                let ordinal = *counter;
                *counter += 1;
                ordinal
            })
            .collect();

        let descriptors: Vec<FieldDescriptor> = index
            .controls
            .iter()
            .enumerate()
            .map(|(i, el)| {
                let elem = el.value();
                let kind = control_kind_of(el).unwrap_or(ControlKind::Text);

                let section_title = index
                    .headings
                    .iter()
                    .rev()
                    .find(|(pos, _)| *pos < index.control_positions[i])
                    .map(|(_, text)| text.clone());

                let window = self.config.neighbor_window;
                let mut neighboring_labels: Vec<String> = Vec::new();
                for j in i.saturating_sub(window)..i {
                    if let Some(label) = &labels[j] {
                        neighboring_labels.push(label.clone());
                    }
                }
                for j in (i + 1)..labels.len().min(i + 1 + window) {
                    if let Some(label) = &labels[j] {
                        neighboring_labels.push(label.clone());
                    }
                }

                FieldDescriptor {
                    selector: selector_for(el, &index.id_counts),
                    dom_id: nonempty_attr(elem.attr("id")),
                    dom_name: nonempty_attr(elem.attr("name")),
                    placeholder: nonempty_attr(elem.attr("placeholder")),
                    label: labels[i].clone(),
                    aria_label: nonempty_attr(elem.attr("aria-label")),
                    control_kind: kind,
                    required: elem.attr("required").is_some(),
                    context: FieldContext {
                        section_title,
                        ordinal_position: ordinals[i],
                        neighboring_labels,
                    },
                }
            })
            .collect();

        debug!(fields = descriptors.len(), "scan complete");
        descriptors
    }

    /// Label resolution chain, first hit wins:
    /// wrapping label, `label[for]`, ancestor container's label child,
    /// ancestor's first short text node, nearest preceding sibling text.
    fn resolve_label(
        &self,
        el: &ElementRef<'_>,
        label_for: &HashMap<String, String>,
    ) -> Option<String> {
        let max = self.config.max_text_len;

        for ancestor in el.ancestors().filter_map(ElementRef::wrap) {
            if ancestor.value().name() == "label" {
                let text = clean_text(&ancestor.text().collect::<String>());
                if !text.is_empty() {
                    return Some(text);
                }
            }
        }

        if let Some(id) = el.value().attr("id") {
            if let Some(text) = label_for.get(id) {
                return Some(text.clone());
            }
        }

        for ancestor in container_ancestors(*el) {
            for child in ancestor.children().filter_map(ElementRef::wrap) {
                if child.value().name() == "label" {
                    let text = clean_text(&child.text().collect::<String>());
                    if !text.is_empty() {
                        return Some(text);
                    }
                }
            }
        }

        for ancestor in container_ancestors(*el) {
            for child in ancestor.children() {
                if let Some(text) = child.value().as_text() {
                    let text = clean_text(text);
                    if !text.is_empty() && text.len() < max {
                        return Some(text);
                    }
                }
            }
        }

        for sibling in el.prev_siblings() {
            let text = match ElementRef::wrap(sibling) {
                Some(element) => clean_text(&element.text().collect::<String>()),
                None => sibling
                    .value()
                    .as_text()
                    .map(|t| clean_text(t))
                    .unwrap_or_default(),
            };
            if !text.is_empty() && text.len() < max {
                return Some(text);
            }
        }

        None
    }
}

/// Ancestors eligible for containment label heuristics: a bounded walk that
/// stops at form-level containers, whose label children belong to other
/// controls.
fn container_ancestors<'a>(el: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    el.ancestors()
        .filter_map(ElementRef::wrap)
        .take_while(|a| !matches!(a.value().name(), "form" | "table" | "body" | "html"))
        .take(LABEL_ANCESTOR_DEPTH)
}

/// Classify an element as a fillable control, excluding button-like and
/// hidden inputs.
pub(crate) fn control_kind_of(el: &ElementRef<'_>) -> Option<ControlKind> {
    match el.value().name() {
        "input" => {
            let input_type = el.value().attr("type").unwrap_or("text");
            match input_type.to_ascii_lowercase().as_str() {
                "hidden" | "submit" | "button" | "reset" | "image" => None,
                other => Some(ControlKind::from_input_type(other)),
            }
        }
        "select" => Some(ControlKind::Select),
        "textarea" => Some(ControlKind::Textarea),
        _ => None,
    }
}

fn nonempty_attr(attr: Option<&str>) -> Option<String> {
    attr.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}

/// Single-pass index over the document: controls in order, headings with
/// their positions, id occurrence counts, and the `label[for]` table.
struct DocumentIndex<'a> {
    controls: Vec<ElementRef<'a>>,
    control_positions: Vec<usize>,
    headings: Vec<(usize, String)>,
    id_counts: HashMap<String, usize>,
    label_for: HashMap<String, String>,
}

impl<'a> DocumentIndex<'a> {
    fn build(document: &'a Html) -> Self {
        let mut index = Self {
            controls: Vec::new(),
            control_positions: Vec::new(),
            headings: Vec::new(),
            id_counts: HashMap::new(),
            label_for: HashMap::new(),
        };

        for (position, node) in document.root_element().descendants().enumerate() {
            let Some(el) = ElementRef::wrap(node) else {
                continue;
            };
            let elem = el.value();

            if let Some(id) = elem.attr("id") {
                *index.id_counts.entry(id.to_string()).or_insert(0) += 1;
            }

            match elem.name() {
                "label" => {
                    if let Some(target) = elem.attr("for") {
                        let text = clean_text(&el.text().collect::<String>());
                        if !text.is_empty() {
                            index.label_for.entry(target.to_string()).or_insert(text);
                        }
                    }
                }
                "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "legend" => {
                    let text = clean_text(&el.text().collect::<String>());
                    if !text.is_empty() {
                        index.headings.push((position, text));
                    }
                }
                _ => {}
            }

            if control_kind_of(&el).is_some() {
                index.controls.push(el);
                index.control_positions.push(position);
            }
        }

        index
    }
}
