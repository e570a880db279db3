//! Collection Aggregate

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;
use crate::domain::events::{CatalogEvent, CollectionEvent};
use crate::domain::value_objects::slugify;
use crate::rules::{CompiledQuery, Rule, RuleCompiler};

/// Rule-driven merchandising collection ("Summer sale", "Shoes under 50").
#[derive(Clone, Debug, Serialize)]
pub struct Collection {
    id: Uuid,
    title: String,
    handle: String,
    rules: Vec<Rule>,
    status: CollectionStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(skip)]
    events: Vec<CatalogEvent>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)] pub enum CollectionStatus { #[default] Draft, Active, Archived }

impl Collection {
    pub fn create(title: impl Into<String>) -> Self {
        let title = title.into();
        let id = Uuid::now_v7();
        let handle = slugify(&title);
        let now = Utc::now();
        let mut collection = Self {
            id, title, handle: handle.clone(), rules: vec![], status: CollectionStatus::Draft,
            created_at: now, updated_at: now, events: vec![],
        };
        collection.raise_event(CollectionEvent::Created { collection_id: id, handle });
        collection
    }

    pub fn id(&self) -> Uuid { self.id }
    pub fn title(&self) -> &str { &self.title }
    pub fn handle(&self) -> &str { &self.handle }
    pub fn rules(&self) -> &[Rule] { &self.rules }
    pub fn status(&self) -> &CollectionStatus { &self.status }

    pub fn add_rule(&mut self, rule: Rule) {
        self.rules.push(rule);
        self.rules_changed();
    }

    pub fn replace_rules(&mut self, rules: Vec<Rule>) {
        self.rules = rules;
        self.rules_changed();
    }

    pub fn remove_rule(&mut self, index: usize) -> Result<Rule, CollectionError> {
        if index >= self.rules.len() { return Err(CollectionError::RuleNotFound(index)); }
        let rule = self.rules.remove(index);
        self.rules_changed();
        Ok(rule)
    }

    pub fn publish(&mut self) -> Result<(), CollectionError> {
        if self.title.trim().is_empty() { return Err(CollectionError::MissingTitle); }
        if self.status == CollectionStatus::Archived { return Err(CollectionError::Archived); }
        self.status = CollectionStatus::Active;
        self.touch();
        self.raise_event(CollectionEvent::Published { collection_id: self.id });
        Ok(())
    }

    pub fn archive(&mut self) {
        self.status = CollectionStatus::Archived;
        self.touch();
        self.raise_event(CollectionEvent::Archived { collection_id: self.id });
    }

    /// Product query for this collection; no usable rules means every product.
    pub fn query(&self, compiler: &RuleCompiler) -> CompiledQuery { compiler.compile(&self.rules) }

    pub fn take_events(&mut self) -> Vec<CatalogEvent> { std::mem::take(&mut self.events) }
    fn rules_changed(&mut self) {
        self.touch();
        self.raise_event(CollectionEvent::RulesChanged { collection_id: self.id, rule_count: self.rules.len() });
    }
    fn raise_event(&mut self, e: CollectionEvent) { self.events.push(CatalogEvent::Collection(e)); }
    fn touch(&mut self) { self.updated_at = Utc::now(); }
}

#[derive(Debug, Clone, PartialEq, Eq)] pub enum CollectionError { MissingTitle, Archived, RuleNotFound(usize) }
impl std::error::Error for CollectionError {}
impl std::fmt::Display for CollectionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingTitle => write!(f, "Missing title"),
            Self::Archived => write!(f, "Collection archived"),
            Self::RuleNotFound(i) => write!(f, "No rule at position {}", i),
        }
    }
}
