//! Operator-driven coercion of loosely-typed rule values

use serde_json::{Number, Value};

use crate::domain::value_objects::{Operator, RuleValue};

/// Coerce a raw rule value into the shape its operator expects.
pub(crate) fn coerce(operator: Operator, value: &RuleValue) -> RuleValue {
    if operator.is_set_membership() {
        return RuleValue::List(to_list(value));
    }
    let value = if operator.is_ordering() { to_number(value) } else { value.clone() };
    match value {
        RuleValue::Text(ref s) if s == "true" => RuleValue::Bool(true),
        RuleValue::Text(ref s) if s == "false" => RuleValue::Bool(false),
        other => other,
    }
}

/// Lists pass through, JSON-array text is parsed, other text is split on
/// commas with each part trimmed. Blank parts are kept.
fn to_list(value: &RuleValue) -> Vec<RuleValue> {
    match value {
        RuleValue::List(items) => items.clone(),
        RuleValue::Text(s) => match serde_json::from_str::<Value>(s) {
            Ok(Value::Array(items)) => items.into_iter().map(RuleValue::from).collect(),
            _ => s
                .split(',')
                .map(str::trim)
                .map(RuleValue::from)
                .collect(),
        },
        other => vec![other.clone()],
    }
}

fn to_number(value: &RuleValue) -> RuleValue {
    match value {
        RuleValue::Text(s) => parse_number(s).map(RuleValue::Number).unwrap_or_else(|| value.clone()),
        other => other.clone(),
    }
}

fn parse_number(text: &str) -> Option<Number> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(n) = text.parse::<i64>() {
        return Some(n.into());
    }
    text.parse::<f64>().ok().filter(|n| n.is_finite()).and_then(Number::from_f64)
}
