//! Aggregates module
pub mod attribute_group;
pub mod category;
pub mod collection;

pub use attribute_group::{Attribute, AttributeGroup};
pub use category::{Category, CategoryError};
pub use collection::{Collection, CollectionError, CollectionStatus};
