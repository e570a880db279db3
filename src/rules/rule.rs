//! Collection rule as authored in the admin dashboard

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::RuleValue;

/// One filter condition of a merchandising collection.
///
/// Every field is optional on the wire; the compiler skips rules that lack an
/// attribute or an operator.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    #[serde(default, alias = "field")]
    pub attribute: Option<String>,
    #[serde(default)]
    pub operator: Option<String>,
    #[serde(default)]
    pub value: RuleValue,
}

impl Rule {
    pub fn new(attribute: impl Into<String>, operator: impl Into<String>, value: impl Into<RuleValue>) -> Self {
        Self { attribute: Some(attribute.into()), operator: Some(operator.into()), value: value.into() }
    }
}
