//! Tree builder

use serde_json::Value;
use std::collections::{HashMap, HashSet};

use super::node::{Hierarchical, HierarchicalNode, TreeNode};
use crate::{CatalogError, Result};

/// Deepest nesting a forest may reach. `TreeNode` serialization and drop
/// recurse once per level, so deeper chains are rejected while building.
pub const MAX_TREE_DEPTH: usize = 256;

/// Build a forest from flat records.
///
/// With `parent == None` the roots are records without a parent or whose
/// parent id matches no record. With `Some(id)` the result is the subtree
/// below `id`. Siblings are ordered by `sort_key`, ties keep input order.
/// Nesting deeper than [`MAX_TREE_DEPTH`] is an `InvalidArgument`.
///
/// Children are indexed by parent id in a single pass, so construction is
/// linear apart from the per-level sorts.
pub fn build_tree<T: Hierarchical>(records: Vec<T>, parent: Option<&T::Id>) -> Result<Vec<TreeNode<T>>> {
    let total = records.len();
    let mut arena = Arena::index(records)?;

    let level = match parent {
        Some(id) => arena.children.remove(id).unwrap_or_default(),
        None => std::mem::take(&mut arena.roots),
    };
    let mut path: HashSet<T::Id> = parent.cloned().into_iter().collect();
    let forest = arena.materialize(level, &mut path)?;

    // records never reached from a root hang off a parent cycle
    if parent.is_none() {
        if let Some(index) = arena.slots.iter().position(Option::is_some) {
            return Err(CatalogError::CyclicHierarchy { id: arena.ids[index].to_string() });
        }
    }
    tracing::debug!(records = total, top_level = forest.len(), "built hierarchy");
    Ok(forest)
}

/// Build from a JSON array of [`HierarchicalNode`] objects.
///
/// Fails when `records` is not an array; elements that do not describe a
/// node are skipped.
pub fn build_json(records: &Value, parent: Option<&str>) -> Result<Vec<TreeNode<HierarchicalNode>>> {
    let items = records
        .as_array()
        .ok_or_else(|| CatalogError::InvalidArgument("records must be an array".to_string()))?;
    let nodes: Vec<HierarchicalNode> = items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value(item.clone()) {
            Ok(node) => Some(node),
            Err(e) => {
                tracing::debug!(index, error = %e, "skipping malformed hierarchy record");
                None
            }
        })
        .collect();
    let parent = parent.map(str::to_string);
    build_tree(nodes, parent.as_ref())
}

struct Arena<T: Hierarchical> {
    slots: Vec<Option<T>>,
    ids: Vec<T::Id>,
    keys: Vec<f64>,
    roots: Vec<usize>,
    children: HashMap<T::Id, Vec<usize>>,
}

impl<T: Hierarchical> Arena<T> {
    fn index(records: Vec<T>) -> Result<Self> {
        let mut known: HashSet<T::Id> = HashSet::with_capacity(records.len());
        for record in &records {
            if !known.insert(record.id().clone()) {
                return Err(CatalogError::InvalidArgument(format!("duplicate node id {}", record.id())));
            }
        }

        let mut roots = Vec::new();
        let mut children: HashMap<T::Id, Vec<usize>> = HashMap::new();
        for (index, record) in records.iter().enumerate() {
            match record.parent_id() {
                Some(p) => {
                    if !known.contains(p) {
                        roots.push(index);
                    }
                    children.entry(p.clone()).or_default().push(index);
                }
                None => roots.push(index),
            }
        }

        Ok(Self {
            ids: records.iter().map(|r| r.id().clone()).collect(),
            keys: records.iter().map(Hierarchical::sort_key).collect(),
            slots: records.into_iter().map(Some).collect(),
            roots,
            children,
        })
    }

    fn sort(&self, level: &mut [usize]) {
        level.sort_by(|a, b| self.keys[*a].total_cmp(&self.keys[*b]));
    }

    /// Walks down from `level` with an explicit stack. `path` holds the ids
    /// on the current ancestry and a repeat means a cycle.
    fn materialize(&mut self, mut level: Vec<usize>, path: &mut HashSet<T::Id>) -> Result<Vec<TreeNode<T>>> {
        self.sort(&mut level);

        let mut order = Vec::new();
        let mut kids: HashMap<usize, Vec<usize>> = HashMap::new();
        let mut stack: Vec<Step> = level.iter().rev().map(|&index| Step::Enter(index, 1)).collect();
        while let Some(step) = stack.pop() {
            match step {
                Step::Enter(index, depth) => {
                    let id = self.ids[index].clone();
                    if !path.insert(id.clone()) {
                        return Err(CatalogError::CyclicHierarchy { id: id.to_string() });
                    }
                    if depth > MAX_TREE_DEPTH {
                        return Err(CatalogError::InvalidArgument(format!("hierarchy deeper than {} levels at node {}", MAX_TREE_DEPTH, id)));
                    }
                    let mut below = self.children.remove(&id).unwrap_or_default();
                    self.sort(&mut below);
                    stack.push(Step::Exit(index));
                    stack.extend(below.iter().rev().map(|&child| Step::Enter(child, depth + 1)));
                    order.push(index);
                    kids.insert(index, below);
                }
                Step::Exit(index) => {
                    path.remove(&self.ids[index]);
                }
            }
        }

        // pre-order puts every child after its parent
        let mut built: HashMap<usize, TreeNode<T>> = HashMap::with_capacity(order.len());
        for index in order.into_iter().rev() {
            let children = kids.remove(&index).unwrap_or_default().into_iter().filter_map(|child| built.remove(&child)).collect();
            if let Some(item) = self.slots[index].take() {
                built.insert(index, TreeNode { item, children });
            }
        }
        Ok(level.into_iter().filter_map(|index| built.remove(&index)).collect())
    }
}

enum Step { Enter(usize, usize), Exit(usize) }

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::{count, flatten};
    use serde_json::json;

    type Node = HierarchicalNode;

    fn node(id: &str, parent: Option<&str>, sort_key: f64) -> Node { HierarchicalNode::new(id, parent, sort_key) }

    fn ids(forest: &[TreeNode<Node>]) -> Vec<&str> { forest.iter().map(|n| n.item.id.as_str()).collect() }

    #[test]
    fn test_children_sorted_by_key() {
        let records = vec![node("2", Some("1"), 1.0), node("1", None, 0.0), node("3", Some("1"), 0.0)];
        let forest = build_tree(records, None).unwrap();
        assert_eq!(ids(&forest), ["1"]);
        assert_eq!(ids(&forest[0].children), ["3", "2"]);
        assert!(forest[0].children.iter().all(TreeNode::is_leaf));
    }

    #[test]
    fn test_equal_keys_keep_input_order() {
        let records = vec![node("b", None, 1.0), node("a", None, 1.0), node("c", None, 0.0), node("d", None, 1.0)];
        assert_eq!(ids(&build_tree(records, None).unwrap()), ["c", "b", "a", "d"]);
    }

    #[test]
    fn test_dangling_parent_becomes_root() {
        let records = vec![node("x", Some("ghost"), 2.0), node("r", None, 1.0), node("y", Some("x"), 0.0)];
        let forest = build_tree(records, None).unwrap();
        assert_eq!(ids(&forest), ["r", "x"]);
        assert_eq!(ids(&forest[1].children), ["y"]);
    }

    #[test]
    fn test_subtree_from_parent() {
        let records = vec![node("1", None, 0.0), node("2", Some("1"), 0.0), node("3", Some("2"), 0.0), node("4", Some("ghost"), 0.0)];
        let sub = build_tree(records.clone(), Some(&"2".to_string())).unwrap();
        assert_eq!(ids(&sub), ["3"]);
        let orphans = build_tree(records.clone(), Some(&"ghost".to_string())).unwrap();
        assert_eq!(ids(&orphans), ["4"]);
        assert!(build_tree(records, Some(&"3".to_string())).unwrap().is_empty());
    }

    #[test]
    fn test_empty_input() {
        assert!(build_tree(Vec::<Node>::new(), None).unwrap().is_empty());
    }

    #[test]
    fn test_cycle_unreachable_from_roots() {
        let records = vec![node("root", None, 0.0), node("a", Some("b"), 0.0), node("b", Some("a"), 0.0)];
        let err = build_tree(records, None).unwrap_err();
        assert!(matches!(err, CatalogError::CyclicHierarchy { ref id } if id == "a"));
    }

    #[test]
    fn test_self_parent_is_cyclic() {
        assert!(matches!(build_tree(vec![node("a", Some("a"), 0.0)], None), Err(CatalogError::CyclicHierarchy { .. })));
    }

    #[test]
    fn test_cycle_reached_from_subtree() {
        let records = vec![node("a", Some("b"), 0.0), node("b", Some("a"), 0.0)];
        let err = build_tree(records, Some(&"a".to_string())).unwrap_err();
        assert_eq!(err, CatalogError::CyclicHierarchy { id: "a".into() });
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let records = vec![node("a", None, 0.0), node("a", None, 1.0)];
        assert!(matches!(build_tree(records, None), Err(CatalogError::InvalidArgument(_))));
    }

    #[test]
    fn test_build_json() {
        let records = json!([
            { "id": "2", "parentId": "1", "sortKey": 1 },
            { "id": "1", "parentId": null, "sortKey": 0, "name": "Apparel", "slug": "apparel" },
            { "id": "3", "parentId": "1", "sortKey": 0 },
            { "parentId": "1" },
            "junk"
        ]);
        let forest = build_json(&records, None).unwrap();
        assert_eq!(count(&forest), 3);
        assert_eq!(forest[0].item.payload["name"], "Apparel");
        assert_eq!(forest[0].item.payload["slug"], "apparel");
        let order: Vec<_> = flatten(&forest).iter().map(|n| n.id.as_str()).collect();
        assert_eq!(order, ["1", "3", "2"]);
    }

    #[test]
    fn test_build_json_numeric_ids() {
        let records = json!([{ "id": 1, "parentId": null }, { "id": 2, "parentId": 1 }, { "id": 3, "parentId": 2 }]);
        let forest = build_json(&records, None).unwrap();
        assert_eq!(count(&forest), 3);
        assert_eq!(ids(&forest[0].children), ["2"]);
        assert_eq!(ids(&build_json(&records, Some("2")).unwrap()), ["3"]);
    }

    fn chain(len: usize) -> Vec<Node> {
        (0..len).map(|i| {
            let parent = i.checked_sub(1).map(|p| p.to_string());
            node(&i.to_string(), parent.as_deref(), 0.0)
        }).collect()
    }

    #[test]
    fn test_chain_at_depth_limit() {
        let forest = build_tree(chain(MAX_TREE_DEPTH), None).unwrap();
        assert_eq!(count(&forest), MAX_TREE_DEPTH);
        assert_eq!(flatten(&forest).last().map(|n| n.id.as_str()), Some("255"));
        let sub = build_tree(chain(MAX_TREE_DEPTH + 1), Some(&"0".to_string())).unwrap();
        assert_eq!(sub[0].node_count(), MAX_TREE_DEPTH);
    }

    #[test]
    fn test_long_chain_rejected() {
        let err = build_tree(chain(crate::config::DEFAULT_MAX_RECORDS), None).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidArgument(ref m) if m.contains("deeper than 256")));
        assert!(build_tree(chain(MAX_TREE_DEPTH + 1), None).is_err());
    }

    #[test]
    fn test_long_cycle_reported_as_cycle() {
        let mut records = chain(MAX_TREE_DEPTH / 2);
        records[0].parent_id = Some((MAX_TREE_DEPTH / 2 - 1).to_string());
        let err = build_tree(records, Some(&"0".to_string())).unwrap_err();
        assert_eq!(err, CatalogError::CyclicHierarchy { id: "0".into() });
    }

    #[test]
    fn test_build_json_rejects_non_arrays() {
        assert!(matches!(build_json(&json!({ "id": "1" }), None), Err(CatalogError::InvalidArgument(_))));
        assert!(matches!(build_json(&Value::Null, None), Err(CatalogError::InvalidArgument(_))));
    }
}
