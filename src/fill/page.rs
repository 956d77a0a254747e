//! In-crate control surface over a parsed page snapshot.
//!
//! [`PageBuffer`] parses an HTML snapshot once, tracks mutable control state
//! (values, checked flags) beside the immutable tree, and records every
//! notification it is asked to emit. It backs tests and headless embedders;
//! browser hosts implement [`ControlSurface`] against the live DOM instead.

use super::surface::{ControlEvent, ControlSurface, RadioMember, SelectOption};
use crate::fields::ControlKind;
use crate::scan::{control_kind_of, selector_for};
use crate::text::clean_text;
use ego_tree::NodeId;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashMap;

#[derive(Debug, Clone)]
struct ControlState {
    kind: ControlKind,
    name: Option<String>,
    value_attr: Option<String>,
    value: String,
    checked: bool,
    selector: String,
}

/// Mutable control state over an immutable page snapshot
pub struct PageBuffer {
    document: Html,
    states: HashMap<NodeId, ControlState>,
    order: Vec<NodeId>,
    events: Vec<(String, ControlEvent)>,
    hints: Vec<(String, String)>,
}

impl PageBuffer {
    pub fn from_html(html: &str) -> Self {
        let document = Html::parse_document(html);

        let mut id_counts: HashMap<String, usize> = HashMap::new();
        for el in document
            .root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
        {
            if let Some(id) = el.value().attr("id") {
                *id_counts.entry(id.to_string()).or_insert(0) += 1;
            }
        }

        let mut states = HashMap::new();
        let mut order = Vec::new();
        for el in document
            .root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
        {
            let Some(kind) = control_kind_of(&el) else {
                continue;
            };
            let elem = el.value();
            let state = ControlState {
                kind,
                name: elem.attr("name").map(|n| n.to_string()),
                value_attr: elem.attr("value").map(|v| v.to_string()),
                value: initial_value(&el, kind),
                checked: elem.attr("checked").is_some(),
                selector: selector_for(&el, &id_counts),
            };
            states.insert(el.id(), state);
            order.push(el.id());
        }

        Self {
            document,
            states,
            order,
            events: Vec::new(),
            hints: Vec::new(),
        }
    }

    /// The parsed snapshot, for scanning the same page state this buffer
    /// fills.
    pub fn document(&self) -> &Html {
        &self.document
    }

    /// Current value of a control, for assertions.
    pub fn value_of(&self, selector: &str) -> Option<String> {
        self.resolve(selector)
            .and_then(|id| self.states.get(&id))
            .map(|s| s.value.clone())
    }

    /// Current checked state of a control, for assertions.
    pub fn checked_of(&self, selector: &str) -> Option<bool> {
        self.resolve(selector)
            .and_then(|id| self.states.get(&id))
            .map(|s| s.checked)
    }

    /// Every notification emitted so far, in emission order.
    pub fn events(&self) -> &[(String, ControlEvent)] {
        &self.events
    }

    /// Hints surfaced for unwritable controls.
    pub fn hints(&self) -> &[(String, String)] {
        &self.hints
    }

    /// First control the selector resolves to, in document order.
    fn resolve(&self, selector: &str) -> Option<NodeId> {
        let parsed = Selector::parse(selector).ok()?;
        self.document
            .select(&parsed)
            .map(|el| el.id())
            .find(|id| self.states.contains_key(id))
    }
}

fn initial_value(el: &ElementRef<'_>, kind: ControlKind) -> String {
    match kind {
        ControlKind::Textarea => clean_text(&el.text().collect::<String>()),
        ControlKind::Select => {
            let options: Vec<ElementRef<'_>> = el
                .children()
                .filter_map(ElementRef::wrap)
                .filter(|c| c.value().name() == "option")
                .collect();
            options
                .iter()
                .find(|o| o.value().attr("selected").is_some())
                .or_else(|| options.first())
                .map(|o| option_value(o))
                .unwrap_or_default()
        }
        _ => el.value().attr("value").unwrap_or_default().to_string(),
    }
}

fn option_value(option: &ElementRef<'_>) -> String {
    option
        .value()
        .attr("value")
        .map(|v| v.to_string())
        .unwrap_or_else(|| clean_text(&option.text().collect::<String>()))
}

impl ControlSurface for PageBuffer {
    fn resolves(&self, selector: &str) -> bool {
        self.resolve(selector).is_some()
    }

    fn control_kind(&self, selector: &str) -> Option<ControlKind> {
        self.resolve(selector)
            .and_then(|id| self.states.get(&id))
            .map(|s| s.kind)
    }

    fn name_of(&self, selector: &str) -> Option<String> {
        self.resolve(selector)
            .and_then(|id| self.states.get(&id))
            .and_then(|s| s.name.clone())
    }

    fn value_attr(&self, selector: &str) -> Option<String> {
        self.resolve(selector)
            .and_then(|id| self.states.get(&id))
            .and_then(|s| s.value_attr.clone())
    }

    fn set_value(&mut self, selector: &str, value: &str) -> bool {
        let Some(id) = self.resolve(selector) else {
            return false;
        };
        if let Some(state) = self.states.get_mut(&id) {
            state.value = value.to_string();
            true
        } else {
            false
        }
    }

    fn set_checked(&mut self, selector: &str, checked: bool) -> bool {
        let Some(id) = self.resolve(selector) else {
            return false;
        };
        let (kind, name) = match self.states.get(&id) {
            Some(state) => (state.kind, state.name.clone()),
            None => return false,
        };

        // radio groups are exclusive
        if kind == ControlKind::Radio && checked {
            if let Some(name) = &name {
                for other in self.order.clone() {
                    if other == id {
                        continue;
                    }
                    if let Some(state) = self.states.get_mut(&other) {
                        if state.kind == ControlKind::Radio && state.name.as_ref() == Some(name) {
                            state.checked = false;
                        }
                    }
                }
            }
        }

        if let Some(state) = self.states.get_mut(&id) {
            state.checked = checked;
        }
        true
    }

    fn options(&self, selector: &str) -> Vec<SelectOption> {
        let Some(id) = self.resolve(selector) else {
            return Vec::new();
        };
        let Some(node) = self.document.tree.get(id) else {
            return Vec::new();
        };
        let Some(el) = ElementRef::wrap(node) else {
            return Vec::new();
        };
        el.children()
            .filter_map(ElementRef::wrap)
            .filter(|c| c.value().name() == "option")
            .map(|o| SelectOption {
                value: option_value(&o),
                text: clean_text(&o.text().collect::<String>()),
            })
            .collect()
    }

    fn radio_group(&self, name: &str) -> Vec<RadioMember> {
        self.order
            .iter()
            .filter_map(|id| self.states.get(id))
            .filter(|s| s.kind == ControlKind::Radio && s.name.as_deref() == Some(name))
            .map(|s| RadioMember {
                selector: s.selector.clone(),
                value: s.value_attr.clone().unwrap_or_default(),
            })
            .collect()
    }

    fn notify(&mut self, selector: &str, event: ControlEvent) {
        self.events.push((selector.to_string(), event));
    }

    fn show_hint(&mut self, selector: &str, message: &str) {
        self.hints.push((selector.to_string(), message.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state_capture() {
        let page = PageBuffer::from_html(
            r#"<form>
                <input type="text" id="fn" value="seed">
                <input type="checkbox" id="agree" value="yes" checked>
                <select id="major">
                    <option value="cs">Computer Science</option>
                    <option value="math" selected>Mathematics</option>
                </select>
                <textarea id="essay">draft</textarea>
            </form>"#,
        );
        assert_eq!(page.value_of("#fn"), Some("seed".to_string()));
        assert_eq!(page.checked_of("#agree"), Some(true));
        assert_eq!(page.value_of("#major"), Some("math".to_string()));
        assert_eq!(page.value_of("#essay"), Some("draft".to_string()));
    }

    #[test]
    fn test_select_defaults_to_first_option() {
        let page = PageBuffer::from_html(
            r#"<select id="c"><option value="a">A</option><option value="b">B</option></select>"#,
        );
        assert_eq!(page.value_of("#c"), Some("a".to_string()));
    }

    #[test]
    fn test_radio_exclusivity() {
        let mut page = PageBuffer::from_html(
            r#"<form>
                <input type="radio" name="g" value="a" checked>
                <input type="radio" name="g" value="b">
            </form>"#,
        );
        let a = r#"input[type="radio"][name="g"][value="a"]"#;
        let b = r#"input[type="radio"][name="g"][value="b"]"#;
        assert_eq!(page.checked_of(a), Some(true));

        assert!(page.set_checked(b, true));
        assert_eq!(page.checked_of(a), Some(false));
        assert_eq!(page.checked_of(b), Some(true));
    }

    #[test]
    fn test_unresolvable_selector() {
        let mut page = PageBuffer::from_html(r#"<input id="x">"#);
        assert!(!page.resolves("#missing"));
        assert!(!page.set_value("#missing", "v"));
        assert!(!page.resolves("not a selector ["));
    }

    #[test]
    fn test_ambiguous_selector_resolves_first_in_document_order() {
        let mut page = PageBuffer::from_html(
            r#"<div><input type="text" class="f" value="one"><input type="text" class="f" value="two"></div>"#,
        );
        assert!(page.set_value(".f", "updated"));
        // first control in document order took the write
        let values: Vec<_> = [r#"html > body:nth-of-type(1) > div:nth-of-type(1) > input:nth-of-type(1)"#]
            .iter()
            .map(|s| page.value_of(s))
            .collect();
        assert_eq!(values[0], Some("updated".to_string()));
    }

    #[test]
    fn test_event_recording() {
        let mut page = PageBuffer::from_html(r#"<input id="e">"#);
        page.notify("#e", ControlEvent::Input);
        page.notify("#e", ControlEvent::Change);
        assert_eq!(page.events().len(), 2);
        assert_eq!(page.events()[0].1, ControlEvent::Input);
    }
}
