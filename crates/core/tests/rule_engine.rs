//! Integration tests for the rule engine.
//!
//! Exercises the public `validation` API end to end: schemas built in code
//! and from JSON rule definitions, evaluated against JSON records.

use assert_matches::assert_matches;
use campus_core::error::CoreError;
use campus_core::types::Record;
use campus_core::validation::{validate, FieldRule, RuleDefinition, ValidationSchema};
use serde_json::{json, Value};

const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

fn record(value: Value) -> Record {
    value.as_object().expect("record must be an object").clone()
}

fn email_schema() -> ValidationSchema {
    ValidationSchema::builder()
        .field(
            "email",
            [
                FieldRule::required("Email address is required"),
                FieldRule::pattern(EMAIL_PATTERN, "Please enter a valid email address")
                    .expect("pattern compiles"),
            ],
        )
        .build()
        .expect("schema builds")
}

// ---------------------------------------------------------------------------
// Test: empty email reports the required message
// ---------------------------------------------------------------------------

#[test]
fn empty_email_is_required() {
    let result = validate(&email_schema(), &record(json!({ "email": "" })));
    assert_eq!(result.message("email"), Some("Email address is required"));
    assert_eq!(result.len(), 1);
}

// ---------------------------------------------------------------------------
// Test: malformed email reports the pattern message
// ---------------------------------------------------------------------------

#[test]
fn malformed_email_reports_pattern_message() {
    let result = validate(&email_schema(), &record(json!({ "email": "not-an-email" })));
    assert_eq!(
        result.message("email"),
        Some("Please enter a valid email address")
    );
}

#[test]
fn well_formed_email_is_valid() {
    let result = validate(&email_schema(), &record(json!({ "email": "dean@college.edu" })));
    assert!(result.is_valid());
}

// ---------------------------------------------------------------------------
// Test: whitespace-only input always trips `required`, whatever else is declared
// ---------------------------------------------------------------------------

#[test]
fn whitespace_only_value_yields_required_message() {
    let schema = ValidationSchema::builder()
        .field(
            "name",
            [
                FieldRule::min_length(3, "Too short"),
                FieldRule::max_length(5, "Too long"),
                FieldRule::one_of(["abc"], "Not allowed"),
                FieldRule::required("Name is required"),
            ],
        )
        .build()
        .unwrap();

    for blank in ["", " ", "\t\n  "] {
        let result = validate(&schema, &record(json!({ "name": blank })));
        assert_eq!(result.message("name"), Some("Name is required"), "input {blank:?}");
    }
}

// ---------------------------------------------------------------------------
// Test: length bounds are inclusive
// ---------------------------------------------------------------------------

#[test]
fn length_boundaries_are_inclusive() {
    let schema = ValidationSchema::builder()
        .field(
            "code",
            [
                FieldRule::min_length(4, "Too short"),
                FieldRule::max_length(8, "Too long"),
            ],
        )
        .build()
        .unwrap();

    let message_for = |code: &str| {
        validate(&schema, &record(json!({ "code": code })))
            .message("code")
            .map(str::to_string)
    };

    assert_eq!(message_for("abcd"), None);
    assert_eq!(message_for("abcdefgh"), None);
    assert_eq!(message_for("abc").as_deref(), Some("Too short"));
    assert_eq!(message_for("abcdefghi").as_deref(), Some("Too long"));
}

// ---------------------------------------------------------------------------
// Test: enum membership is case-sensitive
// ---------------------------------------------------------------------------

#[test]
fn enum_differs_only_in_case_fails() {
    let schema = ValidationSchema::builder()
        .rule("type", FieldRule::one_of(["Private", "Public"], "Invalid type"))
        .build()
        .unwrap();

    assert!(validate(&schema, &record(json!({ "type": "Private" }))).is_valid());
    assert_eq!(
        validate(&schema, &record(json!({ "type": "PRIVATE" }))).message("type"),
        Some("Invalid type")
    );
}

// ---------------------------------------------------------------------------
// Test: determinism and result keys
// ---------------------------------------------------------------------------

#[test]
fn repeated_validation_is_identical() {
    let schema = email_schema();
    let input = record(json!({ "email": "x@", "ignored": 1 }));
    let first = validate(&schema, &input);
    for _ in 0..5 {
        assert_eq!(validate(&schema, &input), first);
    }
}

#[test]
fn result_keys_are_schema_fields() {
    let schema = ValidationSchema::builder()
        .rule("a", FieldRule::required("a required"))
        .rule("b", FieldRule::required("b required"))
        .build()
        .unwrap();
    let result = validate(&schema, &record(json!({ "c": "" })));
    let fields: Vec<_> = result.iter().map(|(field, _)| field).collect();
    assert_eq!(fields, ["a", "b"]);
    assert!(fields.iter().all(|f| schema.rules(f).is_some()));

    let schema_fields: Vec<_> = schema.fields().collect();
    let errors = result.into_inner();
    assert_eq!(errors.keys().map(String::as_str).collect::<Vec<_>>(), schema_fields);
    assert_eq!(errors["a"], "a required");
}

#[test]
fn result_serializes_as_plain_object() {
    let result = validate(&email_schema(), &record(json!({})));
    assert_eq!(
        serde_json::to_value(&result).unwrap(),
        json!({ "email": "Email address is required" })
    );
}

// ---------------------------------------------------------------------------
// Test: schemas loaded from JSON definitions
// ---------------------------------------------------------------------------

#[test]
fn schema_from_json_definitions_validates() {
    let definitions: Vec<RuleDefinition> = serde_json::from_value(json!([
        { "field": "year", "rule_type": "required", "message": "Year is required" },
        { "field": "year", "rule_type": "numericMin", "config": { "min": 1800 }, "message": "Too early" },
        { "field": "year", "rule_type": "numericMax", "config": { "max": 2024 }, "message": "Too late" },
        { "field": "grade", "rule_type": "enum", "config": { "values": ["A", "B"] }, "message": "Bad grade" }
    ]))
    .unwrap();
    let schema = ValidationSchema::from_definitions(&definitions).unwrap();

    let result = validate(&schema, &record(json!({ "year": "17x0", "grade": "C" })));
    assert_eq!(result.message("year"), Some("Too early"));
    assert_eq!(result.message("grade"), Some("Bad grade"));

    let result = validate(&schema, &record(json!({ "year": 1999 })));
    assert!(result.is_valid());
}

#[test]
fn unknown_rule_kind_fails_at_load_time() {
    let definitions = vec![RuleDefinition {
        field: "name".to_string(),
        rule_type: "looksHuman".to_string(),
        config: Value::Null,
        message: "nope".to_string(),
    }];
    assert_matches!(
        ValidationSchema::from_definitions(&definitions),
        Err(CoreError::Config(msg)) if msg.contains("looksHuman")
    );
}
