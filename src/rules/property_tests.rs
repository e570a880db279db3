//! Property tests for rule compilation

use proptest::prelude::*;
use serde_json::{json, Value};

use crate::domain::value_objects::RuleValue;
use crate::rules::{compile, Operand, Rule, RuleCompiler};

// ═══════════════════════════════════════════════════════════════════════════
// Strategy generators
// ═══════════════════════════════════════════════════════════════════════════

fn attribute_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("price".to_string()),
        Just("tags".to_string()),
        Just("category_id".to_string()),
        Just("pricing_availability.price".to_string()),
        "[a-z_]{1,12}",
    ]
}

fn operator_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("eq".to_string()),
        Just("!=".to_string()),
        Just(">".to_string()),
        Just(">=".to_string()),
        Just("lt".to_string()),
        Just("<=".to_string()),
        Just("in".to_string()),
        Just("nin".to_string()),
        "[a-z<>=!$]{0,4}",
    ]
}

fn value_strategy() -> impl Strategy<Value = RuleValue> {
    prop_oneof![
        ".*".prop_map(RuleValue::Text),
        any::<i64>().prop_map(RuleValue::from),
        any::<bool>().prop_map(RuleValue::Bool),
        prop::collection::vec("[a-z0-9,]{0,6}", 0..4).prop_map(RuleValue::from),
        Just(RuleValue::Raw(Value::Null)),
        Just(RuleValue::Raw(json!({ "nested": true }))),
    ]
}

fn rule_strategy() -> impl Strategy<Value = Rule> {
    (
        prop::option::of(attribute_strategy()),
        prop::option::of(operator_strategy()),
        value_strategy(),
    )
        .prop_map(|(attribute, operator, value)| Rule { attribute, operator, value })
}

// ═══════════════════════════════════════════════════════════════════════════
// Properties
// ═══════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn compile_never_exceeds_rule_count(rules in prop::collection::vec(rule_strategy(), 0..20)) {
        let query = compile(&rules);
        prop_assert!(query.len() <= rules.len());
        if query.is_empty() {
            prop_assert_eq!(query.to_document(), json!({}));
        } else {
            prop_assert_eq!(query.to_document()["$and"].as_array().map(Vec::len), Some(query.len()));
        }
    }

    #[test]
    fn rules_without_attribute_contribute_nothing(
        operator in prop::option::of(operator_strategy()),
        value in value_strategy(),
    ) {
        let rule = Rule { attribute: None, operator, value };
        prop_assert!(compile(&[rule]).is_empty());
    }

    #[test]
    fn rules_without_operator_contribute_nothing(attribute in attribute_strategy(), value in value_strategy()) {
        let rule = Rule { attribute: Some(attribute), operator: None, value };
        prop_assert!(compile(&[rule]).is_empty());
    }

    #[test]
    fn ordering_on_integer_text_is_numeric(n in any::<i64>()) {
        let query = compile(&[Rule::new("price", "gte", n.to_string())]);
        prop_assert_eq!(&query.predicates()[0].operand, &Operand::Value(RuleValue::from(n)));
    }

    #[test]
    fn comma_lists_split_into_members(parts in prop::collection::vec("[a-z]{1,5}", 1..6)) {
        let query = compile(&[Rule::new("tags", "in", parts.join(","))]);
        let expected = RuleValue::List(parts.iter().map(|p| RuleValue::from(p.as_str())).collect());
        prop_assert_eq!(&query.predicates()[0].operand, &Operand::Value(expected));
    }

    #[test]
    fn compile_json_matches_typed_compile(rules in prop::collection::vec(rule_strategy(), 0..10)) {
        let as_json = serde_json::to_value(&rules).unwrap();
        let compiler = RuleCompiler::new();
        prop_assert_eq!(compiler.compile_json(&as_json).unwrap(), compiler.compile(&rules));
    }
}
