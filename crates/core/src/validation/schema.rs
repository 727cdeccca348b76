//! Validation schemas: field name to an ordered list of rules.
//!
//! Schemas are static configuration. Every way of building one checks the
//! rules eagerly, so a broken schema fails when it is constructed rather
//! than the first time a user submits a form.

use std::collections::BTreeMap;

use serde_json::Value;

use super::rules::{FieldRule, RuleDefinition, RuleKind};
use crate::error::CoreError;
use crate::value;

/// Immutable mapping from field name to its ordered rules.
#[derive(Debug, Clone, Default)]
pub struct ValidationSchema {
    fields: BTreeMap<String, Vec<FieldRule>>,
}

impl ValidationSchema {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    /// Build a schema from rule definitions, keeping each field's rules in
    /// the order they appear.
    pub fn from_definitions(definitions: &[RuleDefinition]) -> Result<Self, CoreError> {
        let mut builder = Self::builder();
        for definition in definitions {
            let rule = rule_from_definition(definition)?;
            builder = builder.rule(&definition.field, rule);
        }
        builder.build()
    }

    /// Rules declared for `field`, in evaluation order.
    pub fn rules(&self, field: &str) -> Option<&[FieldRule]> {
        self.fields.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[FieldRule])> {
        self.fields
            .iter()
            .map(|(field, rules)| (field.as_str(), rules.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Accumulates rules per field; [`SchemaBuilder::build`] checks them.
#[derive(Debug, Clone, Default)]
pub struct SchemaBuilder {
    fields: Vec<(String, Vec<FieldRule>)>,
}

impl SchemaBuilder {
    /// Append `rules` to `field`, creating the field if needed.
    pub fn field<I>(mut self, field: &str, rules: I) -> Self
    where
        I: IntoIterator<Item = FieldRule>,
    {
        let slot = self.slot(field);
        slot.extend(rules);
        self
    }

    /// Append a single rule to `field`.
    pub fn rule(mut self, field: &str, rule: FieldRule) -> Self {
        self.slot(field).push(rule);
        self
    }

    pub fn build(self) -> Result<ValidationSchema, CoreError> {
        for (field, rules) in &self.fields {
            check_field_rules(field, rules)?;
        }

        let fields: BTreeMap<String, Vec<FieldRule>> = self.fields.into_iter().collect();
        tracing::debug!(fields = fields.len(), "Built validation schema");
        Ok(ValidationSchema { fields })
    }

    fn slot(&mut self, field: &str) -> &mut Vec<FieldRule> {
        let index = match self.fields.iter().position(|(name, _)| name == field) {
            Some(index) => index,
            None => {
                self.fields.push((field.to_string(), Vec::new()));
                self.fields.len() - 1
            }
        };
        &mut self.fields[index].1
    }
}

/// Reject rule lists that cannot be evaluated meaningfully.
fn check_field_rules(field: &str, rules: &[FieldRule]) -> Result<(), CoreError> {
    if field.is_empty() {
        return Err(CoreError::Config("Schema field name is empty".to_string()));
    }

    let mut seen: Vec<&'static str> = Vec::with_capacity(rules.len());
    let (mut min_len, mut max_len) = (None, None);
    let (mut min_num, mut max_num) = (None, None);

    for rule in rules {
        let name = rule.kind.name();
        if seen.contains(&name) {
            return Err(CoreError::Config(format!(
                "Field '{field}' declares rule '{name}' more than once"
            )));
        }
        seen.push(name);

        match &rule.kind {
            RuleKind::MinLength(n) => min_len = Some(*n),
            RuleKind::MaxLength(n) => max_len = Some(*n),
            RuleKind::NumericMin(n) => min_num = Some(*n),
            RuleKind::NumericMax(n) => max_num = Some(*n),
            RuleKind::Enum(allowed) if allowed.is_empty() => {
                return Err(CoreError::Config(format!(
                    "Field '{field}' has an enum rule with no allowed values"
                )));
            }
            _ => {}
        }
    }

    if let (Some(min), Some(max)) = (min_len, max_len) {
        if min > max {
            return Err(CoreError::Config(format!(
                "Field '{field}' has min_length {min} greater than max_length {max}"
            )));
        }
    }
    if let (Some(min), Some(max)) = (min_num, max_num) {
        if min > max {
            return Err(CoreError::Config(format!(
                "Field '{field}' has numeric_min {min} greater than numeric_max {max}"
            )));
        }
    }

    Ok(())
}

/// Convert the data form of a rule into a [`FieldRule`].
pub fn rule_from_definition(definition: &RuleDefinition) -> Result<FieldRule, CoreError> {
    let RuleDefinition {
        field,
        rule_type,
        config,
        message,
    } = definition;

    let kind = match rule_type.as_str() {
        "required" => RuleKind::Required,
        "min_length" | "minLength" => RuleKind::MinLength(config_length(definition, "min")?),
        "max_length" | "maxLength" => RuleKind::MaxLength(config_length(definition, "max")?),
        "pattern" | "regex_pattern" => {
            let pattern = config
                .get("pattern")
                .and_then(Value::as_str)
                .ok_or_else(|| missing_param(definition, "pattern"))?;
            return FieldRule::pattern(pattern, message.as_str());
        }
        "numeric_min" | "numericMin" => RuleKind::NumericMin(config_integer(definition, "min")?),
        "numeric_max" | "numericMax" => RuleKind::NumericMax(config_integer(definition, "max")?),
        "enum" | "enum_values" => {
            let values = config
                .get("values")
                .and_then(Value::as_array)
                .ok_or_else(|| missing_param(definition, "values"))?;
            let allowed = values
                .iter()
                .map(|v| {
                    value::as_text(v)
                        .map(|t| t.into_owned())
                        .ok_or_else(|| {
                            CoreError::Config(format!(
                                "Field '{field}' enum values must be scalars, got {v}"
                            ))
                        })
                })
                .collect::<Result<Vec<_>, _>>()?;
            RuleKind::Enum(allowed)
        }
        other => {
            return Err(CoreError::Config(format!(
                "Unknown rule type '{other}' for field '{field}'"
            )));
        }
    };

    Ok(FieldRule::new(kind, message.as_str()))
}

fn missing_param(definition: &RuleDefinition, key: &str) -> CoreError {
    CoreError::Config(format!(
        "Rule '{}' on field '{}' needs a '{key}' parameter",
        definition.rule_type, definition.field
    ))
}

fn config_length(definition: &RuleDefinition, key: &str) -> Result<usize, CoreError> {
    definition
        .config
        .get(key)
        .and_then(Value::as_u64)
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| missing_param(definition, key))
}

fn config_integer(definition: &RuleDefinition, key: &str) -> Result<i64, CoreError> {
    definition
        .config
        .get(key)
        .and_then(Value::as_i64)
        .ok_or_else(|| missing_param(definition, key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    fn def(rule_type: &str, config: Value) -> RuleDefinition {
        RuleDefinition {
            field: "name".to_string(),
            rule_type: rule_type.to_string(),
            config,
            message: format!("{rule_type} failed"),
        }
    }

    #[test]
    fn definitions_keep_rule_order() {
        let schema = ValidationSchema::from_definitions(&[
            def("required", json!({})),
            def("minLength", json!({"min": 3})),
            def("max_length", json!({"max": 10})),
        ])
        .unwrap();

        let names: Vec<_> = schema
            .rules("name")
            .unwrap()
            .iter()
            .map(|r| r.kind.name())
            .collect();
        assert_eq!(names, ["required", "min_length", "max_length"]);
    }

    #[test]
    fn unknown_rule_type_is_rejected() {
        let err = ValidationSchema::from_definitions(&[def("type_check", json!({}))]);
        assert_matches!(err, Err(CoreError::Config(msg)) if msg.contains("type_check"));
    }

    #[test]
    fn missing_parameter_is_rejected() {
        let err = ValidationSchema::from_definitions(&[def("min_length", json!({}))]);
        assert_matches!(err, Err(CoreError::Config(_)));
    }

    #[test]
    fn negative_length_is_rejected() {
        let err = ValidationSchema::from_definitions(&[def("max_length", json!({"max": -1}))]);
        assert_matches!(err, Err(CoreError::Config(_)));
    }

    #[test]
    fn invalid_regex_is_rejected() {
        let err = ValidationSchema::from_definitions(&[def("pattern", json!({"pattern": "(["}))]);
        assert_matches!(err, Err(CoreError::Config(msg)) if msg.contains("Invalid pattern"));
    }

    #[test]
    fn duplicate_rule_kind_is_rejected() {
        let err = ValidationSchema::builder()
            .field(
                "name",
                [FieldRule::min_length(2, "a"), FieldRule::min_length(3, "b")],
            )
            .build();
        assert_matches!(err, Err(CoreError::Config(msg)) if msg.contains("more than once"));
    }

    #[test]
    fn inverted_bounds_are_rejected() {
        let err = ValidationSchema::builder()
            .field(
                "name",
                [FieldRule::min_length(5, "a"), FieldRule::max_length(4, "b")],
            )
            .build();
        assert_matches!(err, Err(CoreError::Config(_)));

        let err = ValidationSchema::builder()
            .field(
                "year",
                [FieldRule::numeric_min(2000, "a"), FieldRule::numeric_max(1999, "b")],
            )
            .build();
        assert_matches!(err, Err(CoreError::Config(_)));
    }

    #[test]
    fn empty_enum_is_rejected() {
        let err = ValidationSchema::builder()
            .rule("type", FieldRule::one_of(Vec::<String>::new(), "pick one"))
            .build();
        assert_matches!(err, Err(CoreError::Config(_)));
    }

    #[test]
    fn enum_values_are_rendered_as_text() {
        let rule = rule_from_definition(&def("enum", json!({"values": ["A", 1]}))).unwrap();
        assert_matches!(rule.kind, RuleKind::Enum(values) if values == ["A", "1"]);
    }

    #[test]
    fn repeated_field_calls_append() {
        let schema = ValidationSchema::builder()
            .rule("email", FieldRule::required("required"))
            .rule("email", FieldRule::max_length(50, "too long"))
            .build()
            .unwrap();
        assert_eq!(schema.len(), 1);
        assert_eq!(schema.rules("email").unwrap().len(), 2);
    }
}
