//! Value Objects for merchandising rules

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Typed reference to a category document
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CategoryRef(Uuid);

impl CategoryRef {
    pub fn new(id: Uuid) -> Self { Self(id) }
    pub fn parse(value: &str) -> Result<Self, CategoryRefError> {
        let value = value.trim();
        if value.is_empty() { return Err(CategoryRefError::Empty); }
        Uuid::try_parse(value).map(Self).map_err(|_| CategoryRefError::Malformed)
    }
    pub fn as_uuid(&self) -> Uuid { self.0 }
}

impl From<Uuid> for CategoryRef { fn from(id: Uuid) -> Self { Self(id) } }

impl fmt::Display for CategoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0.hyphenated()) }
}

#[derive(Debug, Clone, PartialEq, Eq)] pub enum CategoryRefError { Empty, Malformed }
impl std::error::Error for CategoryRefError {}
impl fmt::Display for CategoryRefError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self { Self::Empty => write!(f, "Category reference empty"), Self::Malformed => write!(f, "Category reference malformed") }
    }
}

/// Comparison operator of a collection rule
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operator { Eq, Ne, Gt, Gte, Lt, Lte, In, Nin }

impl Operator {
    /// Document-store operator key (`$eq`, `$in`, ...)
    pub fn query_key(&self) -> &'static str {
        match self {
            Self::Eq => "$eq", Self::Ne => "$ne", Self::Gt => "$gt", Self::Gte => "$gte",
            Self::Lt => "$lt", Self::Lte => "$lte", Self::In => "$in", Self::Nin => "$nin",
        }
    }
    pub fn is_set_membership(&self) -> bool { matches!(self, Self::In | Self::Nin) }
    pub fn is_ordering(&self) -> bool { matches!(self, Self::Gt | Self::Gte | Self::Lt | Self::Lte) }
}

impl FromStr for Operator {
    type Err = OperatorError;
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "eq" | "=" | "==" | "$eq" | "equals" => Ok(Self::Eq),
            "ne" | "!=" | "<>" | "$ne" | "not_equals" => Ok(Self::Ne),
            "gt" | ">" | "$gt" => Ok(Self::Gt),
            "gte" | ">=" | "$gte" => Ok(Self::Gte),
            "lt" | "<" | "$lt" => Ok(Self::Lt),
            "lte" | "<=" | "$lte" => Ok(Self::Lte),
            "in" | "$in" => Ok(Self::In),
            "nin" | "not_in" | "$nin" => Ok(Self::Nin),
            _ => Err(OperatorError::Unknown(raw.to_string())),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.query_key()) }
}

#[derive(Debug, Clone, PartialEq, Eq)] pub enum OperatorError { Unknown(String) }
impl std::error::Error for OperatorError {}
impl fmt::Display for OperatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self { Self::Unknown(op) => write!(f, "Unknown operator `{}`", op) }
    }
}

/// Loosely-typed rule value as it arrives from forms and query strings.
///
/// `Raw` carries JSON null and objects untouched.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum RuleValue {
    Text(String),
    Number(Number),
    Bool(bool),
    List(Vec<RuleValue>),
    Raw(Value),
}

impl RuleValue {
    pub fn as_text(&self) -> Option<&str> {
        match self { Self::Text(s) => Some(s), _ => None }
    }
    pub fn to_json(&self) -> Value {
        match self {
            Self::Text(s) => Value::String(s.clone()),
            Self::Number(n) => Value::Number(n.clone()),
            Self::Bool(b) => Value::Bool(*b),
            Self::List(items) => Value::Array(items.iter().map(RuleValue::to_json).collect()),
            Self::Raw(v) => v.clone(),
        }
    }
}

impl Default for RuleValue { fn default() -> Self { Self::Raw(Value::Null) } }

impl From<Value> for RuleValue {
    fn from(value: Value) -> Self {
        match value {
            Value::String(s) => Self::Text(s),
            Value::Number(n) => Self::Number(n),
            Value::Bool(b) => Self::Bool(b),
            Value::Array(items) => Self::List(items.into_iter().map(RuleValue::from).collect()),
            other => Self::Raw(other),
        }
    }
}

impl From<RuleValue> for Value { fn from(value: RuleValue) -> Self { value.to_json() } }
impl From<&str> for RuleValue { fn from(s: &str) -> Self { Self::Text(s.to_string()) } }
impl From<String> for RuleValue { fn from(s: String) -> Self { Self::Text(s) } }
impl From<i64> for RuleValue { fn from(n: i64) -> Self { Self::Number(n.into()) } }
impl From<bool> for RuleValue { fn from(b: bool) -> Self { Self::Bool(b) } }
impl<T: Into<RuleValue>> From<Vec<T>> for RuleValue {
    fn from(items: Vec<T>) -> Self { Self::List(items.into_iter().map(Into::into).collect()) }
}

/// URL handle derived from a display name: lowercase, words joined by `-`.
pub fn slugify(name: &str) -> String {
    name.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    #[test]
    fn test_category_ref() {
        let r = CategoryRef::parse(" 67E55044-10B1-426F-9247-BB680E5FE0C8 ").unwrap();
        assert_eq!(r.to_string(), "67e55044-10b1-426f-9247-bb680e5fe0c8");
        assert_eq!(CategoryRef::parse("not-a-valid-id"), Err(CategoryRefError::Malformed));
        assert_eq!(CategoryRef::parse("  "), Err(CategoryRefError::Empty));
    }
    #[test]
    fn test_operator_spellings() {
        assert_eq!(">=".parse::<Operator>().unwrap(), Operator::Gte);
        assert_eq!("NOT_IN".parse::<Operator>().unwrap(), Operator::Nin);
        assert_eq!("$eq".parse::<Operator>().unwrap(), Operator::Eq);
        assert!("like".parse::<Operator>().is_err());
        assert!(Operator::In.is_set_membership() && !Operator::In.is_ordering());
    }
    #[test]
    fn test_slugify() { assert_eq!(slugify("  Summer Sale: Shoes & Bags "), "summer-sale-shoes-bags"); }
    #[test]
    fn test_rule_value_from_json() {
        let v: RuleValue = serde_json::from_value(json!(["a", 1, true, null])).unwrap();
        assert_eq!(v, RuleValue::List(vec!["a".into(), 1i64.into(), true.into(), RuleValue::Raw(Value::Null)]));
        assert_eq!(serde_json::to_value(&v).unwrap(), json!(["a", 1, true, null]));
    }
}
