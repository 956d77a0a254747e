//! The pattern dictionary: ordered, closed list of phrase sets mapped to
//! semantic fields.
//!
//! Entry order is significant twice over: exact matching takes the first
//! entry whose phrase is contained in the haystack, and fuzzy ties break by
//! declaration order. The builtin dictionary therefore lists specific
//! entries (guardian contact, full name) before the generic ones whose
//! phrases they contain.

use crate::error::FormFillError;
use crate::fields::{keys, ControlKind, SemanticField};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// One dictionary entry: phrases (bilingual at minimum), target field, base
/// confidence, and optionally the control kind the field is expected on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DictionaryEntry {
    pub phrases: Vec<String>,
    pub field: SemanticField,
    pub base_confidence: f32,
    #[serde(default)]
    pub expected_kind: Option<ControlKind>,
}

/// Ordered pattern dictionary
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dictionary {
    entries: Vec<DictionaryEntry>,
}

static BUILTIN: Lazy<Dictionary> = Lazy::new(|| {
    fn entry(
        field: &str,
        base_confidence: f32,
        expected_kind: Option<ControlKind>,
        phrases: &[&str],
    ) -> DictionaryEntry {
        DictionaryEntry {
            phrases: phrases.iter().map(|p| p.to_string()).collect(),
            field: SemanticField::from(field),
            base_confidence,
            expected_kind,
        }
    }

    Dictionary {
        entries: vec![
            entry(
                keys::GUARDIAN_EMAIL,
                0.85,
                Some(ControlKind::Email),
                &["parent email", "guardian email", "correo del padre", "correo del tutor"],
            ),
            entry(
                keys::GUARDIAN_PHONE,
                0.85,
                Some(ControlKind::Tel),
                &["parent phone", "guardian phone", "teléfono del padre", "teléfono del tutor"],
            ),
            entry(
                keys::GUARDIAN_NAME,
                0.8,
                None,
                &[
                    "parent name",
                    "guardian name",
                    "parent guardian",
                    "nombre del padre",
                    "nombre del tutor",
                ],
            ),
            entry(
                keys::FULL_NAME,
                0.85,
                None,
                &["full name", "nombre completo"],
            ),
            entry(
                keys::GIVEN_NAME,
                0.9,
                Some(ControlKind::Text),
                &["first name", "given name", "forename", "primer nombre", "nombre"],
            ),
            entry(
                keys::FAMILY_NAME,
                0.9,
                Some(ControlKind::Text),
                &["last name", "family name", "surname", "apellidos", "apellido"],
            ),
            entry(
                keys::EMAIL,
                0.95,
                Some(ControlKind::Email),
                &["email address", "email", "e mail", "correo electrónico", "correo"],
            ),
            entry(
                keys::DOB,
                0.9,
                Some(ControlKind::Date),
                &["date of birth", "birth date", "birthday", "fecha de nacimiento"],
            ),
            entry(
                keys::PHONE,
                0.9,
                Some(ControlKind::Tel),
                &[
                    "phone number",
                    "phone",
                    "telephone",
                    "mobile",
                    "teléfono",
                    "celular",
                    "móvil",
                ],
            ),
            entry(
                keys::GRADUATION_YEAR,
                0.85,
                None,
                &["graduation year", "year of graduation", "año de graduación"],
            ),
            entry(
                keys::GPA,
                0.85,
                None,
                &["grade point average", "gpa", "promedio"],
            ),
            entry(
                keys::SCHOOL_NAME,
                0.85,
                None,
                &["school name", "high school", "school", "escuela", "colegio", "instituto"],
            ),
            entry(
                keys::ADDRESS_LINE,
                0.85,
                None,
                &["street address", "address", "dirección", "domicilio"],
            ),
            entry(keys::CITY, 0.85, None, &["city", "town", "ciudad"]),
            entry(
                keys::POSTAL_CODE,
                0.9,
                None,
                &["zip code", "zip", "postal code", "código postal"],
            ),
            entry(keys::COUNTRY, 0.85, None, &["country", "país"]),
            entry(
                keys::NATIONALITY,
                0.85,
                None,
                &["nationality", "nacionalidad"],
            ),
            entry(
                keys::GENDER,
                0.85,
                None,
                &["gender", "género", "sexo", "sex"],
            ),
            entry(
                keys::PERSONAL_STATEMENT,
                0.85,
                Some(ControlKind::Textarea),
                &[
                    "personal statement",
                    "statement of purpose",
                    "motivation letter",
                    "essay",
                    "declaración personal",
                    "ensayo",
                ],
            ),
        ],
    }
});

impl Dictionary {
    pub fn new(entries: Vec<DictionaryEntry>) -> Self {
        Self { entries }
    }

    /// Parse a dictionary from YAML configuration.
    pub fn from_yaml(yaml: &str) -> Result<Self, FormFillError> {
        let entries: Vec<DictionaryEntry> = serde_yaml::from_str(yaml)?;
        Ok(Self { entries })
    }

    /// The compiled-in bilingual (English/Spanish) dictionary covering the
    /// builtin vocabulary.
    pub fn builtin() -> Self {
        BUILTIN.clone()
    }

    pub fn entries(&self) -> &[DictionaryEntry] {
        &self.entries
    }
}

impl Default for Dictionary {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_lists_specific_before_generic() {
        let dict = Dictionary::builtin();
        let position = |key: &str| {
            dict.entries()
                .iter()
                .position(|e| e.field.as_str() == key)
                .unwrap_or_else(|| panic!("{key} missing from builtin dictionary"))
        };
        assert!(position(keys::GUARDIAN_EMAIL) < position(keys::EMAIL));
        assert!(position(keys::GUARDIAN_PHONE) < position(keys::PHONE));
        assert!(position(keys::FULL_NAME) < position(keys::GIVEN_NAME));
        assert!(position(keys::EMAIL) < position(keys::ADDRESS_LINE));
    }

    #[test]
    fn test_builtin_confidences_in_range() {
        for entry in Dictionary::builtin().entries() {
            assert!(entry.base_confidence > 0.0 && entry.base_confidence <= 1.0);
            assert!(!entry.phrases.is_empty());
        }
    }

    #[test]
    fn test_dictionary_from_yaml() {
        let yaml = r#"
- phrases: ["student id", "matrícula"]
  field: student_id
  base_confidence: 0.9
- phrases: ["email"]
  field: email
  base_confidence: 0.95
  expected_kind: email
"#;
        let dict = Dictionary::from_yaml(yaml).unwrap();
        assert_eq!(dict.entries().len(), 2);
        assert_eq!(dict.entries()[1].expected_kind, Some(ControlKind::Email));
    }
}
