//! Hierarchical records and tree nodes

use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::hash::Hash;

/// A flat record that can be placed in a tree.
pub trait Hierarchical {
    type Id: Clone + Eq + Hash + fmt::Display;

    fn id(&self) -> &Self::Id;
    fn parent_id(&self) -> Option<&Self::Id>;
    /// Siblings are ordered ascending by this key.
    fn sort_key(&self) -> f64;
}

/// Generic hierarchical record.
///
/// Ids may arrive as JSON strings or numbers and are kept in string form.
/// Every attribute other than the id, parent and sort key lands in `payload`
/// and is written back at the same level.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HierarchicalNode<P = Map<String, Value>> {
    #[serde(deserialize_with = "opaque_id")]
    pub id: String,
    #[serde(default, alias = "parent_id", deserialize_with = "opaque_parent_id")]
    pub parent_id: Option<String>,
    #[serde(default, alias = "sort_key", alias = "sort_order")]
    pub sort_key: f64,
    #[serde(flatten)]
    pub payload: P,
}

fn opaque_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(de::Error::custom(format!("id must be a string or number, got {}", other))),
    }
}

fn opaque_parent_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        other => Err(de::Error::custom(format!("parent id must be a string or number, got {}", other))),
    }
}

impl<P: Default> HierarchicalNode<P> {
    pub fn new(id: impl Into<String>, parent_id: Option<&str>, sort_key: f64) -> Self {
        Self { id: id.into(), parent_id: parent_id.map(str::to_string), sort_key, payload: P::default() }
    }
}

impl<P> HierarchicalNode<P> {
    pub fn with_payload(mut self, payload: P) -> Self { self.payload = payload; self }
}

impl<P> Hierarchical for HierarchicalNode<P> {
    type Id = String;
    fn id(&self) -> &String { &self.id }
    fn parent_id(&self) -> Option<&String> { self.parent_id.as_ref() }
    fn sort_key(&self) -> f64 { self.sort_key }
}

/// A record with its materialized children.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TreeNode<T> {
    #[serde(flatten)]
    pub item: T,
    pub children: Vec<TreeNode<T>>,
}

impl<T> TreeNode<T> {
    pub fn leaf(item: T) -> Self { Self { item, children: vec![] } }
    pub fn is_leaf(&self) -> bool { self.children.is_empty() }
    /// Number of nodes in this subtree, including itself.
    pub fn node_count(&self) -> usize { count(std::slice::from_ref(self)) }
}

/// Depth-first, pre-order walk over a forest.
pub fn flatten<T>(forest: &[TreeNode<T>]) -> Vec<&T> {
    let mut out = Vec::new();
    let mut stack: Vec<&TreeNode<T>> = forest.iter().rev().collect();
    while let Some(node) = stack.pop() {
        out.push(&node.item);
        stack.extend(node.children.iter().rev());
    }
    out
}

/// Total number of nodes across a forest.
pub fn count<T>(forest: &[TreeNode<T>]) -> usize {
    let mut total = 0;
    let mut stack: Vec<&TreeNode<T>> = forest.iter().collect();
    while let Some(node) = stack.pop() {
        total += 1;
        stack.extend(node.children.iter());
    }
    total
}
