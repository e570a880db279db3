//! Attribute groups shown on product detail pages

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::hierarchy::Hierarchical;

/// A named block of product attributes ("Dimensions", "Materials").
/// Groups nest through `parent_id`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AttributeGroup {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub parent_id: Option<Uuid>,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Attribute { pub key: String, pub label: String, pub value: serde_json::Value }

impl AttributeGroup {
    pub fn new(name: impl Into<String>, sort_order: i32) -> Self {
        Self { id: Uuid::now_v7(), name: name.into(), parent_id: None, sort_order, attributes: vec![] }
    }
    pub fn nested_in(mut self, parent: &AttributeGroup) -> Self { self.parent_id = Some(parent.id); self }
    pub fn with_attribute(mut self, key: impl Into<String>, label: impl Into<String>, value: serde_json::Value) -> Self {
        self.attributes.push(Attribute { key: key.into(), label: label.into(), value });
        self
    }
}

impl Hierarchical for AttributeGroup {
    type Id = Uuid;
    fn id(&self) -> &Uuid { &self.id }
    fn parent_id(&self) -> Option<&Uuid> { self.parent_id.as_ref() }
    fn sort_key(&self) -> f64 { f64::from(self.sort_order) }
}
