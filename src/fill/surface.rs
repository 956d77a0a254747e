//! The host boundary the fill engine writes through.
//!
//! A [`ControlSurface`] is whatever can resolve selectors against live
//! controls and apply writes: a browser-extension content script, a
//! WebDriver session, or the in-crate [`crate::fill::PageBuffer`]. Emitting
//! [`ControlEvent`]s in input → change → blur order is part of the write
//! contract so listeners bound to any of the three still fire.

use crate::fields::ControlKind;
use serde::Serialize;

/// Notification kinds emitted after a write, in this order for text-like
/// controls: input, change, blur.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlEvent {
    Input,
    Change,
    Blur,
}

/// One `<option>` of a select control
#[derive(Debug, Clone, PartialEq)]
pub struct SelectOption {
    pub value: String,
    pub text: String,
}

/// One member of a same-named radio group
#[derive(Debug, Clone, PartialEq)]
pub struct RadioMember {
    pub selector: String,
    pub value: String,
}

/// Write access to the controls of a live page
pub trait ControlSurface {
    /// Whether the selector currently resolves to a known control.
    fn resolves(&self, selector: &str) -> bool;

    /// Kind of the resolved control, if any.
    fn control_kind(&self, selector: &str) -> Option<ControlKind>;

    /// The control's `name` attribute.
    fn name_of(&self, selector: &str) -> Option<String>;

    /// The control's own `value` attribute (checkbox/radio comparisons).
    fn value_attr(&self, selector: &str) -> Option<String>;

    /// Set the current value. Returns false when the selector no longer
    /// resolves.
    fn set_value(&mut self, selector: &str, value: &str) -> bool;

    /// Set checked state on a checkbox or radio member.
    fn set_checked(&mut self, selector: &str, checked: bool) -> bool;

    /// Options of a select control, in document order.
    fn options(&self, selector: &str) -> Vec<SelectOption>;

    /// All radio controls sharing a `name`, in document order.
    fn radio_group(&self, name: &str) -> Vec<RadioMember>;

    /// Emit a reactivity notification for a control.
    fn notify(&mut self, selector: &str, event: ControlEvent);

    /// Surface a visible hint next to a control the engine cannot write
    /// (file inputs). Optional; the default drops the hint.
    fn show_hint(&mut self, _selector: &str, _message: &str) {}
}
