//! Registration form schemas (college and university).
//!
//! Both forms run through the same [`validate`] engine; they differ only in
//! the [`ValidationSchema`] they supply. Shared institution fields are
//! declared once in [`institution_fields`].

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Local};
use serde_json::Value;

use crate::error::CoreError;
use crate::types::Record;
use crate::validation::{validate, FieldRule, SchemaBuilder, ValidationResult, ValidationSchema};

// ---------------------------------------------------------------------------
// Patterns
// ---------------------------------------------------------------------------

pub const EMAIL_PATTERN: &str = r"[^\s@]+@[^\s@]+\.[^\s@]+";
pub const PHONE_PATTERN: &str = r"[0-9]{10}";
pub const PINCODE_PATTERN: &str = r"[0-9]{6}";
pub const WEBSITE_PATTERN: &str = r"https?://[^\s/$.?#][^\s]*";

/// Earliest establishment year either form accepts.
pub const MIN_ESTABLISHED_YEAR: i64 = 1800;

pub const COLLEGE_TYPES: &[&str] = &["Government", "Private", "Autonomous", "Aided"];
pub const UNIVERSITY_TYPES: &[&str] = &["Central", "State", "Deemed", "Private"];
pub const ACCREDITATION_GRADES: &[&str] = &["A++", "A+", "A", "B++", "B+", "B", "C"];

// ---------------------------------------------------------------------------
// Schemas
// ---------------------------------------------------------------------------

fn current_year() -> i64 {
    i64::from(Local::now().year())
}

fn institution_fields(kind: &str, current_year: i64) -> Result<SchemaBuilder, CoreError> {
    Ok(ValidationSchema::builder()
        .field(
            "name",
            [
                FieldRule::required(format!("{kind} name is required")),
                FieldRule::min_length(3, format!("{kind} name must be at least 3 characters")),
                FieldRule::max_length(100, format!("{kind} name must be at most 100 characters")),
            ],
        )
        .field(
            "established_year",
            [
                FieldRule::required("Established year is required"),
                FieldRule::numeric_min(
                    MIN_ESTABLISHED_YEAR,
                    format!("Established year must be {MIN_ESTABLISHED_YEAR} or later"),
                ),
                FieldRule::numeric_max(
                    current_year,
                    "Established year cannot be in the future",
                ),
            ],
        )
        .field(
            "email",
            [
                FieldRule::required("Email address is required"),
                FieldRule::pattern(EMAIL_PATTERN, "Please enter a valid email address")?,
            ],
        )
        .field(
            "phone",
            [
                FieldRule::required("Phone number is required"),
                FieldRule::pattern(PHONE_PATTERN, "Phone number must be exactly 10 digits")?,
            ],
        )
        .field(
            "website",
            [FieldRule::pattern(
                WEBSITE_PATTERN,
                "Website must start with http:// or https://",
            )?],
        )
        .field(
            "address",
            [
                FieldRule::required("Address is required"),
                FieldRule::min_length(10, "Address must be at least 10 characters"),
                FieldRule::max_length(250, "Address must be at most 250 characters"),
            ],
        )
        .field("city", [FieldRule::required("City is required")])
        .field("state", [FieldRule::required("State is required")])
        .field(
            "pincode",
            [
                FieldRule::required("Pincode is required"),
                FieldRule::pattern(PINCODE_PATTERN, "Pincode must be exactly 6 digits")?,
            ],
        )
        .field(
            "description",
            [FieldRule::max_length(
                500,
                "Description must be at most 500 characters",
            )],
        ))
}

/// Schema for the "register college" form.
///
/// The established-year ceiling is the current local year, so the schema
/// changes on New Year's Day. Use [`college_registration_schema_as_of`] to
/// pin it.
pub fn college_registration_schema() -> Result<ValidationSchema, CoreError> {
    college_registration_schema_as_of(current_year())
}

/// College schema with `current_year` as the latest accepted established year.
pub fn college_registration_schema_as_of(current_year: i64) -> Result<ValidationSchema, CoreError> {
    institution_fields("College", current_year)?
        .field(
            "type",
            [
                FieldRule::required("College type is required"),
                FieldRule::one_of(
                    COLLEGE_TYPES.iter().copied(),
                    "Please select a valid college type",
                ),
            ],
        )
        .field(
            "affiliated_university",
            [
                FieldRule::required("Affiliated university is required"),
                FieldRule::min_length(3, "Affiliated university must be at least 3 characters"),
            ],
        )
        .field(
            "total_students",
            [FieldRule::numeric_min(1, "Total students must be at least 1")],
        )
        .build()
}

/// Schema for the "register university" form.
///
/// Like [`college_registration_schema`], the established-year ceiling
/// follows the local clock.
pub fn university_registration_schema() -> Result<ValidationSchema, CoreError> {
    university_registration_schema_as_of(current_year())
}

/// University schema with `current_year` as the latest accepted established year.
pub fn university_registration_schema_as_of(
    current_year: i64,
) -> Result<ValidationSchema, CoreError> {
    institution_fields("University", current_year)?
        .field(
            "type",
            [
                FieldRule::required("University type is required"),
                FieldRule::one_of(
                    UNIVERSITY_TYPES.iter().copied(),
                    "Please select a valid university type",
                ),
            ],
        )
        .field(
            "accreditation",
            [FieldRule::one_of(
                ACCREDITATION_GRADES.iter().copied(),
                "Please select a valid NAAC grade",
            )],
        )
        .field(
            "vice_chancellor",
            [
                FieldRule::required("Vice chancellor name is required"),
                FieldRule::min_length(3, "Vice chancellor name must be at least 3 characters"),
            ],
        )
        .field(
            "affiliated_colleges",
            [FieldRule::numeric_min(0, "Affiliated colleges cannot be negative")],
        )
        .field(
            "total_students",
            [FieldRule::numeric_min(1, "Total students must be at least 1")],
        )
        .build()
}

// ---------------------------------------------------------------------------
// Form selection
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationForm {
    College,
    University,
}

impl RegistrationForm {
    pub fn as_str(self) -> &'static str {
        match self {
            RegistrationForm::College => "college",
            RegistrationForm::University => "university",
        }
    }

    pub fn schema(self) -> Result<ValidationSchema, CoreError> {
        match self {
            RegistrationForm::College => college_registration_schema(),
            RegistrationForm::University => university_registration_schema(),
        }
    }

    /// Fields the form collects as numbers.
    pub fn numeric_fields(self) -> &'static [&'static str] {
        match self {
            RegistrationForm::College => &["established_year", "total_students"],
            RegistrationForm::University => {
                &["established_year", "affiliated_colleges", "total_students"]
            }
        }
    }

    /// Coerce the numeric fields of a raw submission and validate it.
    pub fn validate_submission(self, submission: &Record) -> Result<ValidationResult, CoreError> {
        let schema = self.schema()?;
        let record = coerce_numeric_fields(submission, self.numeric_fields());
        Ok(validate(&schema, &record))
    }
}

impl fmt::Display for RegistrationForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RegistrationForm {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "college" => Ok(RegistrationForm::College),
            "university" => Ok(RegistrationForm::University),
            other => Err(CoreError::Parse(format!(
                "Unknown registration form '{other}'. Must be one of: college, university"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Caller-boundary coercion
// ---------------------------------------------------------------------------

/// Copy of `record` with numeric strings in `fields` turned into integers.
///
/// Blank strings become null so optional numeric fields stay optional.
/// Strings that do not parse are left as-is for the numeric rules to reject.
pub fn coerce_numeric_fields(record: &Record, fields: &[&str]) -> Record {
    let mut coerced = record.clone();
    for field in fields {
        let Some(Value::String(raw)) = coerced.get(*field) else {
            continue;
        };
        let trimmed = raw.trim();
        let replacement = if trimmed.is_empty() {
            Some(Value::Null)
        } else {
            trimmed.parse::<i64>().ok().map(Value::from)
        };
        if let Some(value) = replacement {
            coerced.insert((*field).to_string(), value);
        }
    }
    coerced
}
