//! The user profile: canonical values keyed by semantic field.
//!
//! Fixed groups cover the structured parts of a school application
//! (education history, guardians, essays); everything else lives in the open
//! `additional` map so the vocabulary can grow without touching this type.

use crate::fields::{keys, SemanticField};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One education history entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EducationRecord {
    pub school_name: String,
    #[serde(default)]
    pub degree: Option<String>,
    #[serde(default)]
    pub graduation_year: Option<i32>,
    #[serde(default)]
    pub gpa: Option<String>,
}

/// A parent or guardian record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuardianRecord {
    pub relation: String,
    pub given_name: String,
    pub family_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

/// A prepared essay
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Essay {
    pub topic: String,
    pub body: String,
}

/// User-owned aggregate of canonical attribute values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Profile {
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// Date of birth in canonical `YYYY-MM-DD` form
    pub dob: Option<String>,
    pub gender: Option<String>,
    pub nationality: Option<String>,
    pub address_line: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub education: Vec<EducationRecord>,
    pub guardians: Vec<GuardianRecord>,
    pub essays: Vec<Essay>,
    /// Values for vocabulary keys not covered by the fixed groups
    pub additional: HashMap<SemanticField, String>,
}

impl Profile {
    /// Resolve the value for a semantic field.
    ///
    /// Fixed fields and the first entry of each group are consulted before
    /// the open `additional` map. Group-indexed access (second guardian,
    /// earlier schools) is a host concern, not a matching concern.
    pub fn value_of(&self, field: &SemanticField) -> Option<String> {
        match field.as_str() {
            keys::GIVEN_NAME => self.given_name.clone(),
            keys::FAMILY_NAME => self.family_name.clone(),
            keys::FULL_NAME => match (&self.given_name, &self.family_name) {
                (Some(g), Some(f)) => Some(format!("{g} {f}")),
                (Some(g), None) => Some(g.clone()),
                (None, Some(f)) => Some(f.clone()),
                (None, None) => None,
            },
            keys::EMAIL => self.email.clone(),
            keys::PHONE => self.phone.clone(),
            keys::DOB => self.dob.clone(),
            keys::GENDER => self.gender.clone(),
            keys::NATIONALITY => self.nationality.clone(),
            keys::ADDRESS_LINE => self.address_line.clone(),
            keys::CITY => self.city.clone(),
            keys::POSTAL_CODE => self.postal_code.clone(),
            keys::COUNTRY => self.country.clone(),
            keys::SCHOOL_NAME => self.education.first().map(|e| e.school_name.clone()),
            keys::GRADUATION_YEAR => self
                .education
                .first()
                .and_then(|e| e.graduation_year)
                .map(|y| y.to_string()),
            keys::GPA => self.education.first().and_then(|e| e.gpa.clone()),
            keys::GUARDIAN_NAME => self
                .guardians
                .first()
                .map(|g| format!("{} {}", g.given_name, g.family_name)),
            keys::GUARDIAN_EMAIL => self.guardians.first().and_then(|g| g.email.clone()),
            keys::GUARDIAN_PHONE => self.guardians.first().and_then(|g| g.phone.clone()),
            keys::PERSONAL_STATEMENT => self.essays.first().map(|e| e.body.clone()),
            _ => self.additional.get(field).cloned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_profile() -> Profile {
        Profile {
            given_name: Some("Ann".to_string()),
            family_name: Some("Lee".to_string()),
            email: Some("ann@example.com".to_string()),
            education: vec![EducationRecord {
                school_name: "Northside High".to_string(),
                graduation_year: Some(2024),
                ..Default::default()
            }],
            guardians: vec![GuardianRecord {
                relation: "mother".to_string(),
                given_name: "May".to_string(),
                family_name: "Lee".to_string(),
                email: Some("may@example.com".to_string()),
                phone: None,
            }],
            essays: vec![Essay {
                topic: "Why this school".to_string(),
                body: "Because...".to_string(),
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_fixed_field_resolution() {
        let p = sample_profile();
        assert_eq!(p.value_of(&keys::EMAIL.into()), Some("ann@example.com".to_string()));
        assert_eq!(p.value_of(&keys::FULL_NAME.into()), Some("Ann Lee".to_string()));
    }

    #[test]
    fn test_group_field_resolution() {
        let p = sample_profile();
        assert_eq!(
            p.value_of(&keys::SCHOOL_NAME.into()),
            Some("Northside High".to_string())
        );
        assert_eq!(p.value_of(&keys::GRADUATION_YEAR.into()), Some("2024".to_string()));
        assert_eq!(p.value_of(&keys::GUARDIAN_NAME.into()), Some("May Lee".to_string()));
        assert_eq!(p.value_of(&keys::PERSONAL_STATEMENT.into()), Some("Because...".to_string()));
    }

    #[test]
    fn test_additional_map_fallback() {
        let mut p = sample_profile();
        p.additional
            .insert(SemanticField::from("visa_status"), "F-1".to_string());
        assert_eq!(p.value_of(&"visa_status".into()), Some("F-1".to_string()));
        assert_eq!(p.value_of(&"unknown_key".into()), None);
    }

    #[test]
    fn test_missing_groups_resolve_to_none() {
        let p = Profile::default();
        assert_eq!(p.value_of(&keys::SCHOOL_NAME.into()), None);
        assert_eq!(p.value_of(&keys::GUARDIAN_EMAIL.into()), None);
    }
}
