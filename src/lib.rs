//! OpenSASE Merchandising
//!
//! Rule-driven collections and catalog hierarchies for the OpenSASE
//! e-commerce platform.
//!
//! ## Features
//! - Collection rule compilation into document-store queries
//! - In-memory collection previews
//! - Category and attribute-group trees
//! - Stateless HTTP API over both

pub mod api;
pub mod config;
pub mod domain;
pub mod hierarchy;
pub mod rules;

pub use domain::value_objects::{CategoryRef, Operator, RuleValue};
pub use hierarchy::{build_json, build_tree, flatten, Hierarchical, HierarchicalNode, TreeNode};
pub use rules::{compile, CompiledQuery, Operand, Predicate, Rule, RuleCompiler};

use thiserror::Error;

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Cyclic hierarchy at node {id}")]
    CyclicHierarchy { id: String },
}

pub type Result<T> = std::result::Result<T, CatalogError>;
