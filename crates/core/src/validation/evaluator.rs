//! Rule evaluator — pure logic, no I/O.

use serde_json::Value;

use super::rules::{FieldRule, RuleKind, ValidationResult};
use super::schema::ValidationSchema;
use crate::types::Record;
use crate::value;

/// Evaluate every field of `schema` against `record`.
///
/// Each field reports at most one message: the first rule it violates, in
/// declared order. Blank values only ever trip `required`.
pub fn validate(schema: &ValidationSchema, record: &Record) -> ValidationResult {
    let mut result = ValidationResult::default();

    for (field, rules) in schema.iter() {
        if let Some(message) = evaluate_field(rules, record.get(field)) {
            result.insert(field, message);
        }
    }

    tracing::debug!(
        fields = schema.len(),
        violations = result.len(),
        "Validated record"
    );
    result
}

fn evaluate_field<'a>(rules: &'a [FieldRule], value: Option<&Value>) -> Option<&'a str> {
    let value = match value {
        Some(v) if !value::is_blank(v) => v,
        // Optional blank fields skip the rest of their rules.
        _ => {
            return rules
                .iter()
                .find(|rule| matches!(rule.kind, RuleKind::Required))
                .map(|rule| rule.message.as_str());
        }
    };

    rules
        .iter()
        .find(|rule| !rule_passes(&rule.kind, value))
        .map(|rule| rule.message.as_str())
}

fn rule_passes(kind: &RuleKind, value: &Value) -> bool {
    match kind {
        RuleKind::Required => true,
        RuleKind::MinLength(min) => char_count(value).is_some_and(|len| len >= *min),
        RuleKind::MaxLength(max) => char_count(value).is_some_and(|len| len <= *max),
        RuleKind::Pattern(re) => value::as_text(value).is_some_and(|text| re.is_match(&text)),
        RuleKind::NumericMin(min) => value::as_integer(value).is_some_and(|n| n >= *min),
        RuleKind::NumericMax(max) => value::as_integer(value).is_some_and(|n| n <= *max),
        RuleKind::Enum(allowed) => value::as_text(value)
            .is_some_and(|text| allowed.iter().any(|candidate| *candidate == *text)),
    }
}

fn char_count(value: &Value) -> Option<usize> {
    value::as_text(value).map(|text| text.chars().count())
}
