//! Selector generation for scanned controls.
//!
//! Priority: identifier-based, then name+kind-based, then positional
//! (`nth-of-type` path up to the nearest uniquely-identified ancestor, else
//! the document root). Generated selectors are chosen to re-resolve between
//! a scan and a subsequent fill on the same page state, not to survive page
//! redesigns.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::ElementRef;
use std::collections::HashMap;

/// Identifiers safe to embed in a selector without CSS escaping
static SIMPLE_IDENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_-]*$").expect("ident pattern"));

pub(crate) fn selector_for(el: &ElementRef<'_>, id_counts: &HashMap<String, usize>) -> String {
    let elem = el.value();
    let tag = elem.name();

    if let Some(id) = elem.attr("id") {
        if SIMPLE_IDENT.is_match(id) && id_counts.get(id).copied().unwrap_or(0) == 1 {
            return format!("#{id}");
        }
    }

    if let Some(name) = elem.attr("name") {
        if !name.is_empty() && !name.contains(['"', '\\']) {
            let mut selector = match elem.attr("type") {
                Some(ty) if tag == "input" && !ty.is_empty() && !ty.contains(['"', '\\']) => {
                    format!("{tag}[type=\"{ty}\"][name=\"{name}\"]")
                }
                _ => format!("{tag}[name=\"{name}\"]"),
            };
            // Radio groups share a name; the value attribute pins the member.
            let is_radio = elem
                .attr("type")
                .map(|t| t.eq_ignore_ascii_case("radio"))
                .unwrap_or(false);
            if is_radio {
                if let Some(value) = elem.attr("value") {
                    if !value.contains(['"', '\\']) {
                        selector.push_str(&format!("[value=\"{value}\"]"));
                    }
                }
            }
            return selector;
        }
    }

    positional_selector(el, id_counts)
}

/// `tag:nth-of-type(k)` path from the control up to an anchor: the nearest
/// ancestor with a unique simple id, else the `html` root.
fn positional_selector(el: &ElementRef<'_>, id_counts: &HashMap<String, usize>) -> String {
    let mut segments: Vec<String> = Vec::new();
    let mut current = *el;

    loop {
        let tag = current.value().name().to_string();
        let nth = 1 + current
            .prev_siblings()
            .filter_map(ElementRef::wrap)
            .filter(|s| s.value().name() == tag)
            .count();
        segments.push(format!("{tag}:nth-of-type({nth})"));

        let Some(parent) = current.parent().and_then(ElementRef::wrap) else {
            break;
        };
        if let Some(id) = parent.value().attr("id") {
            if SIMPLE_IDENT.is_match(id) && id_counts.get(id).copied().unwrap_or(0) == 1 {
                segments.push(format!("#{id}"));
                break;
            }
        }
        if parent.value().name() == "html" {
            segments.push("html".to_string());
            break;
        }
        current = parent;
    }

    segments.reverse();
    segments.join(" > ")
}
