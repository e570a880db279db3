//! Category Aggregate

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;
use crate::domain::events::{CatalogEvent, CategoryEvent};
use crate::domain::value_objects::{slugify, CategoryRef};
use crate::hierarchy::Hierarchical;

#[derive(Clone, Debug, Serialize)]
pub struct Category {
    id: Uuid,
    name: String,
    slug: String,
    description: Option<String>,
    parent_id: Option<Uuid>,
    position: i32,
    image_url: Option<String>,
    created_at: DateTime<Utc>,
    #[serde(skip)]
    events: Vec<CatalogEvent>,
}

impl Category {
    pub fn create(name: impl Into<String>) -> Self {
        let name = name.into();
        let id = Uuid::now_v7();
        let mut category = Self {
            id, slug: slugify(&name), name, description: None, parent_id: None, position: 0,
            image_url: None, created_at: Utc::now(), events: vec![],
        };
        category.raise_event(CategoryEvent::Created { category_id: id, parent_id: None });
        category
    }

    pub fn child_of(parent: &Category, name: impl Into<String>, position: i32) -> Self {
        let mut category = Self::create(name);
        category.parent_id = Some(parent.id);
        category.position = position;
        category.events.clear();
        category.raise_event(CategoryEvent::Created { category_id: category.id, parent_id: Some(parent.id) });
        category
    }

    pub fn id(&self) -> Uuid { self.id }
    pub fn reference(&self) -> CategoryRef { CategoryRef::new(self.id) }
    pub fn name(&self) -> &str { &self.name }
    pub fn slug(&self) -> &str { &self.slug }
    pub fn parent(&self) -> Option<Uuid> { self.parent_id }
    pub fn position(&self) -> i32 { self.position }

    pub fn describe(&mut self, description: impl Into<String>) { self.description = Some(description.into()); }
    pub fn set_image(&mut self, url: impl Into<String>) { self.image_url = Some(url.into()); }

    /// Re-parent under `parent`, or to the top level with `None`.
    pub fn move_to(&mut self, parent: Option<Uuid>) -> Result<(), CategoryError> {
        if parent == Some(self.id) { return Err(CategoryError::SelfParent); }
        let from = std::mem::replace(&mut self.parent_id, parent);
        if from != parent {
            self.raise_event(CategoryEvent::Moved { category_id: self.id, from, to: parent });
        }
        Ok(())
    }

    pub fn reposition(&mut self, position: i32) { self.position = position; }

    pub fn take_events(&mut self) -> Vec<CatalogEvent> { std::mem::take(&mut self.events) }
    fn raise_event(&mut self, e: CategoryEvent) { self.events.push(CatalogEvent::Category(e)); }
}

impl Hierarchical for Category {
    type Id = Uuid;
    fn id(&self) -> &Uuid { &self.id }
    fn parent_id(&self) -> Option<&Uuid> { self.parent_id.as_ref() }
    fn sort_key(&self) -> f64 { f64::from(self.position) }
}

#[derive(Debug, Clone, PartialEq, Eq)] pub enum CategoryError { SelfParent }
impl std::error::Error for CategoryError {}
impl std::fmt::Display for CategoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "Category cannot be its own parent") }
}
