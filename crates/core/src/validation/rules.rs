//! Validation rule, rule-definition and result types.

use std::collections::BTreeMap;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// The constraint a [`FieldRule`] checks, together with its parameter.
#[derive(Debug, Clone)]
pub enum RuleKind {
    Required,
    MinLength(usize),
    MaxLength(usize),
    /// Compiled with both ends anchored, so it must match the whole value.
    Pattern(Regex),
    NumericMin(i64),
    NumericMax(i64),
    Enum(Vec<String>),
}

impl RuleKind {
    /// Canonical rule type name, as used in [`RuleDefinition::rule_type`].
    pub fn name(&self) -> &'static str {
        match self {
            RuleKind::Required => "required",
            RuleKind::MinLength(_) => "min_length",
            RuleKind::MaxLength(_) => "max_length",
            RuleKind::Pattern(_) => "pattern",
            RuleKind::NumericMin(_) => "numeric_min",
            RuleKind::NumericMax(_) => "numeric_max",
            RuleKind::Enum(_) => "enum",
        }
    }
}

/// One constraint on one field, with the message shown when it is violated.
#[derive(Debug, Clone)]
pub struct FieldRule {
    pub kind: RuleKind,
    pub message: String,
}

impl FieldRule {
    pub fn new(kind: RuleKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn required(message: impl Into<String>) -> Self {
        Self::new(RuleKind::Required, message)
    }

    pub fn min_length(min: usize, message: impl Into<String>) -> Self {
        Self::new(RuleKind::MinLength(min), message)
    }

    pub fn max_length(max: usize, message: impl Into<String>) -> Self {
        Self::new(RuleKind::MaxLength(max), message)
    }

    /// Compile `pattern` as a full-match rule.
    ///
    /// Fails with [`CoreError::Config`] if the expression does not compile.
    pub fn pattern(pattern: &str, message: impl Into<String>) -> Result<Self, CoreError> {
        let anchored = format!("^(?:{pattern})$");
        let regex = Regex::new(&anchored)
            .map_err(|e| CoreError::Config(format!("Invalid pattern '{pattern}': {e}")))?;
        Ok(Self::new(RuleKind::Pattern(regex), message))
    }

    pub fn numeric_min(min: i64, message: impl Into<String>) -> Self {
        Self::new(RuleKind::NumericMin(min), message)
    }

    pub fn numeric_max(max: i64, message: impl Into<String>) -> Self {
        Self::new(RuleKind::NumericMax(max), message)
    }

    pub fn one_of<I, S>(allowed: I, message: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let allowed = allowed.into_iter().map(Into::into).collect();
        Self::new(RuleKind::Enum(allowed), message)
    }
}

/// Data form of a rule, as authored in JSON schema files.
///
/// `config` carries the rule parameter: `{"min": n}`, `{"max": n}`,
/// `{"pattern": "..."}` or `{"values": [...]}` depending on `rule_type`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleDefinition {
    pub field: String,
    pub rule_type: String,
    #[serde(default)]
    pub config: serde_json::Value,
    pub message: String,
}

/// Field name to the message of its first violated rule.
///
/// A field missing from the map is valid; an empty result means the whole
/// record is valid. Ordered by field name so output is stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationResult {
    errors: BTreeMap<String, String>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Message for `field`, if it failed a rule.
    pub fn message(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.errors.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn into_inner(self) -> BTreeMap<String, String> {
        self.errors
    }

    pub(crate) fn insert(&mut self, field: &str, message: &str) {
        self.errors.insert(field.to_string(), message.to_string());
    }
}
