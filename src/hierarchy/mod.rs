//! Hierarchy materialization
//!
//! Builds nested forests (category trees, product attribute groups) out of
//! flat records that carry an optional parent reference and a sibling sort key.

mod builder;
mod node;


pub use builder::*;
pub use node::*;
