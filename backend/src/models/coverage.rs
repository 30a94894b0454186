//! Coverage record types and input validation.
//!
//! A coverage record is one row of the `sa_coverages` table: a system-assigned
//! integer key plus a fixed set of free-form text attributes.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

crate::define_id_type!(i64, CoverageKey);

/// Maximum number of characters accepted for any text attribute.
pub const MAX_TEXT_LEN: usize = 255;

const MISSING_FIELD: &str = "Missing data for required field.";

/// Names of the text attributes, in column order.
pub const COVERAGE_FIELDS: [&str; 7] = [
    "gbg",
    "country",
    "shortname",
    "motion",
    "ipsbuild",
    "tpsservice",
    "covered",
];

/// A stored coverage record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Coverage {
    /// System-assigned primary key
    #[schema(value_type = i64)]
    pub index: CoverageKey,
    pub gbg: String,
    pub country: String,
    pub shortname: String,
    pub motion: String,
    pub ipsbuild: String,
    pub tpsservice: String,
    pub covered: String,
}

/// A validated coverage record that has not been assigned a key yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCoverage {
    pub gbg: String,
    pub country: String,
    pub shortname: String,
    pub motion: String,
    pub ipsbuild: String,
    pub tpsservice: String,
    pub covered: String,
}

impl NewCoverage {
    /// Attach a key, producing the stored form.
    pub fn with_key(self, index: CoverageKey) -> Coverage {
        Coverage {
            index,
            gbg: self.gbg,
            country: self.country,
            shortname: self.shortname,
            motion: self.motion,
            ipsbuild: self.ipsbuild,
            tpsservice: self.tpsservice,
            covered: self.covered,
        }
    }
}

/// Raw request body for inserting a coverage record.
///
/// Every attribute is required and limited to [`MAX_TEXT_LEN`] characters;
/// [`CoverageDraft::validate`] enforces both and reports all offending fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CoverageDraft {
    #[schema(max_length = 255)]
    pub gbg: Option<String>,
    #[schema(max_length = 255)]
    pub country: Option<String>,
    #[schema(max_length = 255)]
    pub shortname: Option<String>,
    #[schema(max_length = 255)]
    pub motion: Option<String>,
    #[schema(max_length = 255)]
    pub ipsbuild: Option<String>,
    #[schema(max_length = 255)]
    pub tpsservice: Option<String>,
    #[schema(max_length = 255)]
    pub covered: Option<String>,
}

impl CoverageDraft {
    /// Check presence and length of every attribute.
    pub fn validate(self) -> Result<NewCoverage, FieldErrors> {
        let mut errors = FieldErrors::default();

        let gbg = required(&mut errors, "gbg", self.gbg);
        let country = required(&mut errors, "country", self.country);
        let shortname = required(&mut errors, "shortname", self.shortname);
        let motion = required(&mut errors, "motion", self.motion);
        let ipsbuild = required(&mut errors, "ipsbuild", self.ipsbuild);
        let tpsservice = required(&mut errors, "tpsservice", self.tpsservice);
        let covered = required(&mut errors, "covered", self.covered);

        match (gbg, country, shortname, motion, ipsbuild, tpsservice, covered) {
            (
                Some(gbg),
                Some(country),
                Some(shortname),
                Some(motion),
                Some(ipsbuild),
                Some(tpsservice),
                Some(covered),
            ) if errors.is_empty() => Ok(NewCoverage {
                gbg,
                country,
                shortname,
                motion,
                ipsbuild,
                tpsservice,
                covered,
            }),
            _ => Err(errors),
        }
    }
}

fn required(errors: &mut FieldErrors, field: &str, value: Option<String>) -> Option<String> {
    match value {
        None => {
            errors.add(field, MISSING_FIELD);
            None
        }
        Some(v) if v.chars().count() > MAX_TEXT_LEN => {
            errors.add(field, format!("Longer than maximum length {}.", MAX_TEXT_LEN));
            None
        }
        Some(v) => Some(v),
    }
}

/// Field-level validation messages keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message against a field.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(field, messages)| format!("{}: {}", field, messages.join(" ")))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

/// Text columns that support fuzzy lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchField {
    Gbg,
    Shortname,
}

impl SearchField {
    pub fn column(&self) -> &'static str {
        match self {
            SearchField::Gbg => "gbg",
            SearchField::Shortname => "shortname",
        }
    }

    /// Read this column from a record.
    pub fn value_of<'a>(&self, coverage: &'a Coverage) -> &'a str {
        match self {
            SearchField::Gbg => &coverage.gbg,
            SearchField::Shortname => &coverage.shortname,
        }
    }

    /// Build the `ILIKE` pattern that matches any value containing `needle`.
    ///
    /// Short names arrive from the assistant with spaces encoded as `+`; those
    /// become the single-character wildcard `_`.
    pub fn contains_pattern(&self, needle: &str) -> String {
        match self {
            SearchField::Gbg => format!("%{}%", needle),
            SearchField::Shortname => format!("%{}%", needle.replace('+', "_")),
        }
    }
}

impl fmt::Display for SearchField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// Demo rows inserted after the table is recreated.
pub fn sample_coverages() -> Vec<NewCoverage> {
    let sample = |shortname: &str| NewCoverage {
        gbg: "Sample".to_string(),
        country: "Sample".to_string(),
        shortname: shortname.to_string(),
        motion: "Sample".to_string(),
        ipsbuild: "Sample".to_string(),
        tpsservice: "Sample".to_string(),
        covered: "Sample".to_string(),
    };
    vec![sample("Sample"), sample("Sample 2")]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_draft() -> CoverageDraft {
        CoverageDraft {
            gbg: Some("GBG-1".into()),
            country: Some("Brazil".into()),
            shortname: Some("Acme Ltda".into()),
            motion: Some("Direct".into()),
            ipsbuild: Some("Yes".into()),
            tpsservice: Some("No".into()),
            covered: Some("Yes".into()),
        }
    }

    #[test]
    fn test_validate_accepts_complete_draft() {
        let new = full_draft().validate().unwrap();
        assert_eq!(new.country, "Brazil");
        assert_eq!(new.shortname, "Acme Ltda");
    }

    #[test]
    fn test_validate_reports_every_missing_field() {
        let errors = CoverageDraft::default().validate().unwrap_err();
        assert_eq!(errors.len(), COVERAGE_FIELDS.len());
        for field in COVERAGE_FIELDS {
            assert_eq!(errors.get(field).unwrap(), [MISSING_FIELD.to_string()]);
        }
    }

    #[test]
    fn test_validate_length_limit_counts_characters() {
        let mut draft = full_draft();
        draft.country = Some("é".repeat(MAX_TEXT_LEN));
        assert!(draft.clone().validate().is_ok());

        draft.country = Some("a".repeat(MAX_TEXT_LEN + 1));
        let errors = draft.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors.get("country").unwrap(),
            ["Longer than maximum length 255.".to_string()]
        );
    }

    #[test]
    fn test_empty_string_is_present() {
        let mut draft = full_draft();
        draft.motion = Some(String::new());
        assert_eq!(draft.validate().unwrap().motion, "");
    }

    #[test]
    fn test_draft_rejects_unknown_fields() {
        let result: Result<CoverageDraft, _> =
            serde_json::from_str(r#"{"gbg":"x","index":5}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_contains_pattern() {
        assert_eq!(SearchField::Gbg.contains_pattern("ab+c"), "%ab+c%");
        assert_eq!(SearchField::Shortname.contains_pattern("acme+ltda"), "%acme_ltda%");
    }

    #[test]
    fn test_coverage_serializes_index_as_integer() {
        let coverage = sample_coverages().remove(0).with_key(CoverageKey::new(3));
        let value = serde_json::to_value(&coverage).unwrap();
        assert_eq!(value["index"], 3);
        assert_eq!(value["covered"], "Sample");
    }

    #[test]
    fn test_field_errors_display() {
        let mut errors = FieldErrors::new();
        errors.add("gbg", MISSING_FIELD);
        assert_eq!(errors.to_string(), "gbg: Missing data for required field.");
    }
}
