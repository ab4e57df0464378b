//! In-memory store backends
//!
//! Both stores keep their state behind `Arc<RwLock<..>>` and are cheap to
//! clone. Data does not persist across restarts; used by `vnfctl --memory`
//! and throughout the tests.

use crate::store::document::{DocumentFilter, DocumentStore};
use crate::store::errors::StoreError;
use crate::store::models::{Document, FieldRecord, Instance, InstanceQuery, Page, RecordQuery};
use crate::store::relational::RelationalStore;
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Default)]
struct RelationalState {
    last_instance_id: i64,
    last_record_id: i64,
    instances: BTreeMap<i64, Instance>,
    records: BTreeMap<i64, FieldRecord>,
}

/// In-memory relational store
///
/// Ids are assigned sequentially from 1. Record inserts check the owning
/// instance exists and instance deletes cascade to records, like the
/// database schema.
#[derive(Clone, Debug, Default)]
pub struct MemoryRelationalStore {
    state: Arc<RwLock<RelationalState>>,
}

impl MemoryRelationalStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn page<T: Clone>(items: &[T], page: u64, page_size: u64, offset: u64) -> Page<T> {
    let skip = usize::try_from(offset).unwrap_or(usize::MAX);
    let take = usize::try_from(page_size).unwrap_or(usize::MAX);
    Page {
        items: items.iter().skip(skip).take(take).cloned().collect(),
        total: items.len() as u64,
        page,
        page_size,
    }
}

#[async_trait::async_trait]
impl RelationalStore for MemoryRelationalStore {
    async fn create_instance(&self, name: &str) -> Result<Instance, StoreError> {
        let mut state = self.state.write().await;
        state.last_instance_id += 1;
        let now = Utc::now();
        let instance = Instance {
            id: state.last_instance_id,
            name: name.to_string(),
            created_at: now,
            updated_at: now,
        };
        state.instances.insert(instance.id, instance.clone());
        Ok(instance)
    }

    async fn get_instance(&self, id: i64) -> Result<Option<Instance>, StoreError> {
        Ok(self.state.read().await.instances.get(&id).cloned())
    }

    async fn list_instances(&self, query: &InstanceQuery) -> Result<Page<Instance>, StoreError> {
        let state = self.state.read().await;
        let matching: Vec<Instance> = state
            .instances
            .values()
            .rev()
            .filter(|instance| {
                query
                    .keyword
                    .as_deref()
                    .map_or(true, |keyword| instance.name.contains(keyword))
            })
            .cloned()
            .collect();
        Ok(page(&matching, query.page, query.page_size, query.offset()))
    }

    async fn all_instances(&self) -> Result<Vec<Instance>, StoreError> {
        Ok(self.state.read().await.instances.values().cloned().collect())
    }

    async fn delete_instance(&self, id: i64) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        if state.instances.remove(&id).is_none() {
            return Ok(false);
        }
        let before = state.records.len();
        state.records.retain(|_, record| record.vnf_id != id);
        debug!(
            vnf_id = id,
            records = before - state.records.len(),
            "Cascaded instance delete to field records"
        );
        Ok(true)
    }

    async fn insert_records(&self, records: Vec<FieldRecord>) -> Result<Vec<FieldRecord>, StoreError> {
        let mut state = self.state.write().await;

        if let Some(orphan) = records
            .iter()
            .find(|record| !state.instances.contains_key(&record.vnf_id))
        {
            return Err(StoreError::Constraint(format!(
                "instance {} does not exist",
                orphan.vnf_id
            )));
        }

        let mut inserted = Vec::with_capacity(records.len());
        for mut record in records {
            state.last_record_id += 1;
            record.id = state.last_record_id;
            state.records.insert(record.id, record.clone());
            inserted.push(record);
        }
        Ok(inserted)
    }

    async fn get_record(&self, vnf_id: i64, id: i64) -> Result<Option<FieldRecord>, StoreError> {
        Ok(self
            .state
            .read()
            .await
            .records
            .get(&id)
            .filter(|record| record.vnf_id == vnf_id)
            .cloned())
    }

    async fn list_records(&self, query: &RecordQuery) -> Result<Page<FieldRecord>, StoreError> {
        let state = self.state.read().await;
        let matching: Vec<FieldRecord> = state
            .records
            .values()
            .filter(|record| record.vnf_id == query.vnf_id)
            .filter(|record| !query.modified_only || record.modified)
            .cloned()
            .collect();
        Ok(page(&matching, query.page, query.page_size, query.offset()))
    }

    async fn save_record(&self, record: &FieldRecord) -> Result<FieldRecord, StoreError> {
        let mut state = self.state.write().await;
        match state.records.get_mut(&record.id) {
            Some(existing) => {
                *existing = record.clone();
                Ok(record.clone())
            }
            None => Err(StoreError::not_found("field record", record.id)),
        }
    }

    async fn delete_record(&self, vnf_id: i64, id: i64) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        let owned = state
            .records
            .get(&id)
            .is_some_and(|record| record.vnf_id == vnf_id);
        if owned {
            state.records.remove(&id);
        }
        Ok(owned)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// In-memory document store
#[derive(Clone, Debug, Default)]
pub struct MemoryDocumentStore {
    collections: Arc<RwLock<HashMap<String, Vec<Document>>>>,
}

impl MemoryDocumentStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in `collection`
    pub async fn count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map_or(0, Vec::len)
    }
}

#[async_trait::async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn insert_one(&self, collection: &str, document: Document) -> Result<(), StoreError> {
        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .push(document);
        Ok(())
    }

    async fn insert_many(&self, collection: &str, documents: Vec<Document>) -> Result<(), StoreError> {
        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .extend(documents);
        Ok(())
    }

    async fn find_one(
        &self,
        collection: &str,
        filter: &DocumentFilter,
    ) -> Result<Option<Document>, StoreError> {
        Ok(self
            .collections
            .read()
            .await
            .get(collection)
            .and_then(|documents| documents.iter().find(|doc| filter.is_match(doc)))
            .cloned())
    }

    async fn find(&self, collection: &str, filter: &DocumentFilter) -> Result<Vec<Document>, StoreError> {
        Ok(self
            .collections
            .read()
            .await
            .get(collection)
            .map(|documents| {
                documents
                    .iter()
                    .filter(|doc| filter.is_match(doc))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: &DocumentFilter,
        updates: Document,
    ) -> Result<u64, StoreError> {
        let mut collections = self.collections.write().await;
        let Some(document) = collections
            .get_mut(collection)
            .and_then(|documents| documents.iter_mut().find(|doc| filter.is_match(doc)))
        else {
            return Ok(0);
        };
        document.extend(updates);
        Ok(1)
    }

    async fn delete_one(&self, collection: &str, filter: &DocumentFilter) -> Result<u64, StoreError> {
        let mut collections = self.collections.write().await;
        let Some(documents) = collections.get_mut(collection) else {
            return Ok(0);
        };
        match documents.iter().position(|doc| filter.is_match(doc)) {
            Some(index) => {
                documents.remove(index);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
