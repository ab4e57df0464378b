//! Trait for the document mirror store
//!
//! Documents are free-form JSON objects grouped by collection. Filters are
//! evaluated against top-level keys.

use crate::store::errors::StoreError;
use crate::store::models::Document;
use regex::Regex;
use serde_json::Value;

/// Match rule for one top-level key
#[derive(Debug, Clone)]
pub enum Condition {
    Equals(Value),
    /// String value matching a regular expression
    Matches(Regex),
}

impl Condition {
    fn matches(&self, value: Option<&Value>) -> bool {
        match self {
            Condition::Equals(expected) => value == Some(expected),
            Condition::Matches(pattern) => value
                .and_then(Value::as_str)
                .is_some_and(|text| pattern.is_match(text)),
        }
    }
}

/// Conjunction of per-key conditions; the empty filter matches everything
#[derive(Debug, Clone, Default)]
pub struct DocumentFilter {
    conditions: Vec<(String, Condition)>,
}

impl DocumentFilter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn equals(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push((key.into(), Condition::Equals(value.into())));
        self
    }

    #[must_use]
    pub fn matching(mut self, key: impl Into<String>, pattern: Regex) -> Self {
        self.conditions.push((key.into(), Condition::Matches(pattern)));
        self
    }

    /// Equality value for `key`, if the filter pins one
    #[must_use]
    pub fn equals_value(&self, key: &str) -> Option<&Value> {
        self.conditions.iter().find_map(|(k, condition)| match condition {
            Condition::Equals(value) if k == key => Some(value),
            _ => None,
        })
    }

    #[must_use]
    pub fn is_match(&self, document: &Document) -> bool {
        self.conditions
            .iter()
            .all(|(key, condition)| condition.matches(document.get(key)))
    }
}

/// Collection-oriented document store
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    async fn insert_one(&self, collection: &str, document: Document) -> Result<(), StoreError>;
    /// All documents are written or none are
    async fn insert_many(&self, collection: &str, documents: Vec<Document>) -> Result<(), StoreError>;
    async fn find_one(
        &self,
        collection: &str,
        filter: &DocumentFilter,
    ) -> Result<Option<Document>, StoreError>;
    async fn find(&self, collection: &str, filter: &DocumentFilter) -> Result<Vec<Document>, StoreError>;
    /// Set `updates` on the first matching document; returns the matched count
    async fn update_one(
        &self,
        collection: &str,
        filter: &DocumentFilter,
        updates: Document,
    ) -> Result<u64, StoreError>;
    /// Remove the first matching document; returns the removed count
    async fn delete_one(&self, collection: &str, filter: &DocumentFilter) -> Result<u64, StoreError>;
    async fn ping(&self) -> Result<(), StoreError>;
}
