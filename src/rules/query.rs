//! Compiled collection query and its in-memory evaluation

use serde::{Serialize, Serializer};
use serde_json::{json, Map, Value};
use std::cmp::Ordering;

use crate::domain::value_objects::{CategoryRef, Operator, RuleValue};

/// Right-hand side of a predicate after coercion.
#[derive(Clone, Debug, PartialEq)]
pub enum Operand {
    Value(RuleValue),
    Ref(CategoryRef),
    Refs(Vec<CategoryRef>),
}

impl Operand {
    /// Document form; references use the extended-JSON `$uuid` wrapper.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Value(v) => v.to_json(),
            Self::Ref(r) => ref_json(r),
            Self::Refs(refs) => Value::Array(refs.iter().map(ref_json).collect()),
        }
    }

    fn single(&self) -> Vec<Target<'_>> {
        match self {
            Self::Value(v) => vec![Target::Json(v.to_json())],
            Self::Ref(r) => vec![Target::Ref(r)],
            Self::Refs(refs) => refs.iter().map(Target::Ref).collect(),
        }
    }

    fn members(&self) -> Vec<Target<'_>> {
        match self {
            Self::Value(RuleValue::List(items)) => items.iter().map(|i| Target::Json(i.to_json())).collect(),
            other => other.single(),
        }
    }
}

fn ref_json(r: &CategoryRef) -> Value { json!({ "$uuid": r.to_string() }) }

enum Target<'a> {
    Json(Value),
    Ref(&'a CategoryRef),
}

/// `{attribute: {operator: operand}}`
#[derive(Clone, Debug, PartialEq)]
pub struct Predicate {
    pub attribute: String,
    pub operator: Operator,
    pub operand: Operand,
}

impl Predicate {
    pub fn to_json(&self) -> Value {
        let mut condition = Map::new();
        condition.insert(self.operator.query_key().to_string(), self.operand.to_json());
        let mut predicate = Map::new();
        predicate.insert(self.attribute.clone(), Value::Object(condition));
        Value::Object(predicate)
    }

    pub fn matches(&self, document: &Value) -> bool {
        let field = resolve_path(document, &self.attribute);
        match self.operator {
            Operator::Eq => self.operand.single().iter().any(|t| field_equals(field, t)),
            Operator::Ne => !self.operand.single().iter().any(|t| field_equals(field, t)),
            Operator::In => self.operand.members().iter().any(|t| field_equals(field, t)),
            Operator::Nin => !self.operand.members().iter().any(|t| field_equals(field, t)),
            Operator::Gt => field_compares(field, &self.operand, |o| o == Ordering::Greater),
            Operator::Gte => field_compares(field, &self.operand, |o| o != Ordering::Less),
            Operator::Lt => field_compares(field, &self.operand, |o| o == Ordering::Less),
            Operator::Lte => field_compares(field, &self.operand, |o| o != Ordering::Greater),
        }
    }
}

/// Conjunction of predicates. Empty means match-all.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CompiledQuery {
    predicates: Vec<Predicate>,
}

impl CompiledQuery {
    pub fn new(predicates: Vec<Predicate>) -> Self { Self { predicates } }
    pub fn predicates(&self) -> &[Predicate] { &self.predicates }
    pub fn into_predicates(self) -> Vec<Predicate> { self.predicates }
    pub fn len(&self) -> usize { self.predicates.len() }
    pub fn is_empty(&self) -> bool { self.predicates.is_empty() }

    /// `{}` when empty, `{"$and": [...]}` otherwise.
    pub fn to_document(&self) -> Value {
        if self.predicates.is_empty() {
            return Value::Object(Map::new());
        }
        json!({ "$and": self.predicates.iter().map(Predicate::to_json).collect::<Vec<_>>() })
    }

    pub fn matches(&self, document: &Value) -> bool {
        self.predicates.iter().all(|p| p.matches(document))
    }
}

impl Serialize for CompiledQuery {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_document().serialize(serializer)
    }
}

/// Resolve a dotted path. Missing segments resolve to null.
fn resolve_path<'a>(document: &'a Value, path: &str) -> &'a Value {
    let mut current = document;
    for segment in path.split('.') {
        match current.get(segment) {
            Some(v) => current = v,
            None => return &Value::Null,
        }
    }
    current
}

fn field_equals(field: &Value, target: &Target<'_>) -> bool {
    match (field, target) {
        (Value::Array(items), _) if items.iter().any(|i| field_equals(i, target)) => true,
        (Value::String(s), Target::Ref(r)) => CategoryRef::parse(s).map(|f| f == **r).unwrap_or(false),
        (_, Target::Ref(_)) => false,
        (_, Target::Json(t)) => json_equals(field, t),
    }
}

fn json_equals(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        _ => left == right,
    }
}

fn field_compares(field: &Value, operand: &Operand, accept: impl Fn(Ordering) -> bool + Copy) -> bool {
    let target = match operand {
        Operand::Value(v) => v.to_json(),
        _ => return false,
    };
    match field {
        Value::Array(items) => items.iter().any(|i| compare_values(i, &target).is_some_and(accept)),
        other => compare_values(other, &target).is_some_and(accept),
    }
}

fn compare_values(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn predicate(attribute: &str, operator: Operator, operand: Operand) -> Predicate {
        Predicate { attribute: attribute.into(), operator, operand }
    }

    #[test]
    fn test_document_form() {
        assert_eq!(CompiledQuery::default().to_document(), json!({}));
        let q = CompiledQuery::new(vec![predicate("price", Operator::Gte, Operand::Value(10i64.into()))]);
        assert_eq!(serde_json::to_value(&q).unwrap(), json!({ "$and": [{ "price": { "$gte": 10 } }] }));
    }

    #[test]
    fn test_reference_document_form() {
        let id = CategoryRef::new(Uuid::nil());
        let p = predicate("category_id", Operator::In, Operand::Refs(vec![id]));
        assert_eq!(p.to_json(), json!({ "category_id": { "$in": [{ "$uuid": "00000000-0000-0000-0000-000000000000" }] } }));
    }

    #[test]
    fn test_matches_dotted_paths_and_numbers() {
        let doc = json!({ "pricing_availability": { "price": 12.5 }, "tags": ["sale", "new"] });
        assert!(predicate("pricing_availability.price", Operator::Gt, Operand::Value(10i64.into())).matches(&doc));
        assert!(!predicate("pricing_availability.price", Operator::Lte, Operand::Value(12i64.into())).matches(&doc));
        assert!(predicate("tags", Operator::Eq, Operand::Value("sale".into())).matches(&doc));
        assert!(predicate("tags", Operator::Nin, Operand::Value(vec!["clearance"].into())).matches(&doc));
        assert!(!predicate("price", Operator::Gt, Operand::Value(1i64.into())).matches(&doc));
        assert!(predicate("missing", Operator::Ne, Operand::Value("x".into())).matches(&doc));
    }

    #[test]
    fn test_ordering_rejects_mixed_types() {
        let doc = json!({ "price": "12" });
        assert!(!predicate("price", Operator::Gt, Operand::Value(10i64.into())).matches(&doc));
    }

    #[test]
    fn test_reference_matching_ignores_case() {
        let id = Uuid::now_v7();
        let doc = json!({ "category_id": id.hyphenated().to_string().to_uppercase() });
        assert!(predicate("category_id", Operator::Eq, Operand::Ref(id.into())).matches(&doc));
        assert!(!predicate("category_id", Operator::Eq, Operand::Ref(Uuid::nil().into())).matches(&doc));
        assert!(predicate("category_id", Operator::In, Operand::Refs(vec![Uuid::nil().into(), id.into()])).matches(&doc));
    }

    #[test]
    fn test_empty_query_matches_everything() {
        assert!(CompiledQuery::default().matches(&json!({ "anything": 1 })));
        assert!(CompiledQuery::default().matches(&Value::Null));
    }
}
