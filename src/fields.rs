//! Semantic field vocabulary and control kinds.
//!
//! A [`SemanticField`] is a key from a closed but extensible vocabulary
//! (`given_name`, `email`, `dob`, ...). Vocabulary entries are pure
//! configuration: adding a field means appending a `{key, label, category}`
//! entry, never touching the matching engine.

use crate::error::FormFillError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical profile attribute key, e.g. `given_name` or `email`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SemanticField(String);

impl SemanticField {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SemanticField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SemanticField {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

/// Well-known vocabulary keys
pub mod keys {
    pub const GIVEN_NAME: &str = "given_name";
    pub const FAMILY_NAME: &str = "family_name";
    pub const FULL_NAME: &str = "full_name";
    pub const EMAIL: &str = "email";
    pub const PHONE: &str = "phone";
    pub const DOB: &str = "dob";
    pub const GENDER: &str = "gender";
    pub const NATIONALITY: &str = "nationality";
    pub const ADDRESS_LINE: &str = "address_line";
    pub const CITY: &str = "city";
    pub const POSTAL_CODE: &str = "postal_code";
    pub const COUNTRY: &str = "country";
    pub const SCHOOL_NAME: &str = "school_name";
    pub const GRADUATION_YEAR: &str = "graduation_year";
    pub const GPA: &str = "gpa";
    pub const GUARDIAN_NAME: &str = "guardian_name";
    pub const GUARDIAN_EMAIL: &str = "guardian_email";
    pub const GUARDIAN_PHONE: &str = "guardian_phone";
    pub const PERSONAL_STATEMENT: &str = "personal_statement";
}

/// The kind of form control a descriptor or instruction refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlKind {
    Text,
    Email,
    Tel,
    Url,
    Number,
    Password,
    Date,
    Checkbox,
    Radio,
    Select,
    Textarea,
    File,
}

impl ControlKind {
    /// Map an `<input type="...">` value to a kind. Unknown types fall back
    /// to `Text`, matching browser behavior.
    pub fn from_input_type(input_type: &str) -> Self {
        match input_type.to_ascii_lowercase().as_str() {
            "email" => Self::Email,
            "tel" => Self::Tel,
            "url" => Self::Url,
            "number" => Self::Number,
            "password" => Self::Password,
            "date" => Self::Date,
            "checkbox" => Self::Checkbox,
            "radio" => Self::Radio,
            "file" => Self::File,
            _ => Self::Text,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Email => "email",
            Self::Tel => "tel",
            Self::Url => "url",
            Self::Number => "number",
            Self::Password => "password",
            Self::Date => "date",
            Self::Checkbox => "checkbox",
            Self::Radio => "radio",
            Self::Select => "select",
            Self::Textarea => "textarea",
            Self::File => "file",
        }
    }

    /// Free-text controls that take a value plus input/change/blur events
    pub fn is_textual(&self) -> bool {
        matches!(
            self,
            Self::Text
                | Self::Email
                | Self::Tel
                | Self::Url
                | Self::Number
                | Self::Password
                | Self::Textarea
        )
    }
}

impl fmt::Display for ControlKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One vocabulary entry: pure configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VocabularyEntry {
    pub key: SemanticField,
    pub label: String,
    pub category: String,
}

/// The semantic-field vocabulary used to populate bind menus and drive
/// profile-based batch fills
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Vocabulary {
    entries: Vec<VocabularyEntry>,
}

impl Vocabulary {
    pub fn new(entries: Vec<VocabularyEntry>) -> Self {
        Self { entries }
    }

    /// Parse a vocabulary from YAML configuration.
    pub fn from_yaml(yaml: &str) -> Result<Self, FormFillError> {
        let entries: Vec<VocabularyEntry> = serde_yaml::from_str(yaml)?;
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[VocabularyEntry] {
        &self.entries
    }

    pub fn contains(&self, key: &SemanticField) -> bool {
        self.entries.iter().any(|e| &e.key == key)
    }

    /// The compiled-in default vocabulary for school-application profiles
    pub fn builtin() -> Self {
        fn entry(key: &str, label: &str, category: &str) -> VocabularyEntry {
            VocabularyEntry {
                key: SemanticField::from(key),
                label: label.to_string(),
                category: category.to_string(),
            }
        }

        Self {
            entries: vec![
                entry(keys::GIVEN_NAME, "First name", "identity"),
                entry(keys::FAMILY_NAME, "Last name", "identity"),
                entry(keys::FULL_NAME, "Full name", "identity"),
                entry(keys::DOB, "Date of birth", "identity"),
                entry(keys::GENDER, "Gender", "identity"),
                entry(keys::NATIONALITY, "Nationality", "identity"),
                entry(keys::EMAIL, "Email address", "contact"),
                entry(keys::PHONE, "Phone number", "contact"),
                entry(keys::ADDRESS_LINE, "Street address", "address"),
                entry(keys::CITY, "City", "address"),
                entry(keys::POSTAL_CODE, "Postal code", "address"),
                entry(keys::COUNTRY, "Country", "address"),
                entry(keys::SCHOOL_NAME, "School name", "education"),
                entry(keys::GRADUATION_YEAR, "Graduation year", "education"),
                entry(keys::GPA, "GPA", "education"),
                entry(keys::GUARDIAN_NAME, "Parent/guardian name", "guardian"),
                entry(keys::GUARDIAN_EMAIL, "Parent/guardian email", "guardian"),
                entry(keys::GUARDIAN_PHONE, "Parent/guardian phone", "guardian"),
                entry(keys::PERSONAL_STATEMENT, "Personal statement", "essay"),
            ],
        }
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::builtin()
    }
}
