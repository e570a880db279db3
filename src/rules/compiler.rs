//! Rule compiler

use serde_json::Value;
use std::fmt;

use super::coerce::coerce;
use super::query::{CompiledQuery, Operand, Predicate};
use super::rule::Rule;
use crate::domain::value_objects::{CategoryRef, Operator, RuleValue};
use crate::{CatalogError, Result};

pub const DEFAULT_REFERENCE_ATTRIBUTE: &str = "category_id";

/// Compiles collection rules into a [`CompiledQuery`].
///
/// Attributes listed as reference attributes hold typed category identifiers;
/// their values are validated and converted instead of passed through.
#[derive(Clone, Debug)]
pub struct RuleCompiler {
    reference_attributes: Vec<String>,
}

impl Default for RuleCompiler {
    fn default() -> Self { Self { reference_attributes: vec![DEFAULT_REFERENCE_ATTRIBUTE.to_string()] } }
}

impl RuleCompiler {
    pub fn new() -> Self { Self::default() }

    pub fn with_reference_attributes<I, S>(attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { reference_attributes: attributes.into_iter().map(Into::into).collect() }
    }

    pub fn reference_attributes(&self) -> &[String] { &self.reference_attributes }

    /// Compile rules in order. Malformed rules contribute nothing.
    pub fn compile(&self, rules: &[Rule]) -> CompiledQuery {
        let predicates = rules
            .iter()
            .enumerate()
            .filter_map(|(index, rule)| match self.compile_rule(rule) {
                Ok(predicate) => Some(predicate),
                Err(reason) => {
                    tracing::debug!(index, %reason, "skipping collection rule");
                    None
                }
            })
            .collect();
        CompiledQuery::new(predicates)
    }

    /// Compile a JSON rule list. Fails only when `rules` is not an array;
    /// elements that are not rule-shaped are skipped.
    pub fn compile_json(&self, rules: &Value) -> Result<CompiledQuery> {
        let items = rules
            .as_array()
            .ok_or_else(|| CatalogError::InvalidArgument(format!("rules must be an array, got {}", json_kind(rules))))?;
        let parsed: Vec<Rule> = items
            .iter()
            .enumerate()
            .filter_map(|(index, item)| match serde_json::from_value::<Rule>(item.clone()) {
                Ok(rule) => Some(rule),
                Err(e) => {
                    tracing::debug!(index, error = %e, "skipping malformed collection rule");
                    None
                }
            })
            .collect();
        Ok(self.compile(&parsed))
    }

    fn compile_rule(&self, rule: &Rule) -> std::result::Result<Predicate, SkipReason> {
        let attribute = rule.attribute.as_deref().map(str::trim).filter(|a| !a.is_empty()).ok_or(SkipReason::MissingAttribute)?;
        let raw_operator = rule.operator.as_deref().map(str::trim).filter(|o| !o.is_empty()).ok_or(SkipReason::MissingOperator)?;
        let operator: Operator = raw_operator.parse().map_err(|_| SkipReason::UnknownOperator(raw_operator.to_string()))?;
        let value = coerce(operator, &rule.value);
        let operand = if self.is_reference(attribute) { reference_operand(value)? } else { Operand::Value(value) };
        Ok(Predicate { attribute: attribute.to_string(), operator, operand })
    }

    fn is_reference(&self, attribute: &str) -> bool {
        self.reference_attributes.iter().any(|a| a == attribute)
    }
}

/// Compile with the default reference attributes.
pub fn compile(rules: &[Rule]) -> CompiledQuery { RuleCompiler::default().compile(rules) }

fn reference_operand(value: RuleValue) -> std::result::Result<Operand, SkipReason> {
    match value {
        RuleValue::List(items) => {
            let refs: Vec<CategoryRef> = items.iter().filter_map(|i| i.as_text()).filter_map(|t| CategoryRef::parse(t).ok()).collect();
            if refs.is_empty() { Err(SkipReason::NoValidReferences) } else { Ok(Operand::Refs(refs)) }
        }
        RuleValue::Text(t) => CategoryRef::parse(&t).map(Operand::Ref).map_err(|_| SkipReason::MalformedReference(t)),
        _ => Err(SkipReason::MalformedReference(value.to_json().to_string())),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

enum SkipReason {
    MissingAttribute,
    MissingOperator,
    UnknownOperator(String),
    MalformedReference(String),
    NoValidReferences,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingAttribute => write!(f, "missing attribute"),
            Self::MissingOperator => write!(f, "missing operator"),
            Self::UnknownOperator(op) => write!(f, "unknown operator `{}`", op),
            Self::MalformedReference(v) => write!(f, "malformed reference `{}`", v),
            Self::NoValidReferences => write!(f, "no well-formed references"),
        }
    }
}
