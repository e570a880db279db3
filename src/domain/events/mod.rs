//! Domain events
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq)]
pub enum CatalogEvent {
    Collection(CollectionEvent),
    Category(CategoryEvent),
}

#[derive(Clone, Debug, PartialEq)]
pub enum CollectionEvent {
    Created { collection_id: Uuid, handle: String },
    RulesChanged { collection_id: Uuid, rule_count: usize },
    Published { collection_id: Uuid },
    Archived { collection_id: Uuid },
}

#[derive(Clone, Debug, PartialEq)]
pub enum CategoryEvent {
    Created { category_id: Uuid, parent_id: Option<Uuid> },
    Moved { category_id: Uuid, from: Option<Uuid>, to: Option<Uuid> },
}
