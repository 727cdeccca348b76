//! Declarative field validation.
//!
//! Provides rule types, schema construction and a pure-logic evaluator.
//! Forms supply their own [`ValidationSchema`]; the engine is shared.

pub mod evaluator;
pub mod rules;
pub mod schema;

pub use evaluator::validate;
pub use rules::{FieldRule, RuleDefinition, RuleKind, ValidationResult};
pub use schema::{SchemaBuilder, ValidationSchema};
