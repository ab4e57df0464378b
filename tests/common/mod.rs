//! Common test utilities: store doubles and coordinator setup

#![allow(dead_code, reason = "Each test binary uses a subset of the helpers")]

use anyhow::anyhow;
use std::sync::Arc;
use std::time::Duration;
use vnf_config::store::{
    Document, DocumentFilter, DocumentStore, DualStoreCoordinator, FieldRecord, Instance,
    InstanceQuery, MemoryDocumentStore, MemoryRelationalStore, Page, RecordQuery,
    RelationalStore, StoreError, StoreTimeouts,
};

fn unavailable(store: &str) -> StoreError {
    StoreError::Backend(anyhow!("{store} store unavailable"))
}

/// Document store whose every call fails
#[derive(Debug, Default)]
pub struct FailingDocumentStore;

#[async_trait::async_trait]
impl DocumentStore for FailingDocumentStore {
    async fn insert_one(&self, _collection: &str, _document: Document) -> Result<(), StoreError> {
        Err(unavailable("document"))
    }

    async fn insert_many(&self, _collection: &str, _documents: Vec<Document>) -> Result<(), StoreError> {
        Err(unavailable("document"))
    }

    async fn find_one(
        &self,
        _collection: &str,
        _filter: &DocumentFilter,
    ) -> Result<Option<Document>, StoreError> {
        Err(unavailable("document"))
    }

    async fn find(&self, _collection: &str, _filter: &DocumentFilter) -> Result<Vec<Document>, StoreError> {
        Err(unavailable("document"))
    }

    async fn update_one(
        &self,
        _collection: &str,
        _filter: &DocumentFilter,
        _updates: Document,
    ) -> Result<u64, StoreError> {
        Err(unavailable("document"))
    }

    async fn delete_one(&self, _collection: &str, _filter: &DocumentFilter) -> Result<u64, StoreError> {
        Err(unavailable("document"))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Err(unavailable("document"))
    }
}

/// Document store that sleeps before delegating to an in-memory store
#[derive(Debug)]
pub struct SlowDocumentStore {
    pub delay: Duration,
    pub inner: MemoryDocumentStore,
}

impl SlowDocumentStore {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            inner: MemoryDocumentStore::new(),
        }
    }
}

#[async_trait::async_trait]
impl DocumentStore for SlowDocumentStore {
    async fn insert_one(&self, collection: &str, document: Document) -> Result<(), StoreError> {
        tokio::time::sleep(self.delay).await;
        self.inner.insert_one(collection, document).await
    }

    async fn insert_many(&self, collection: &str, documents: Vec<Document>) -> Result<(), StoreError> {
        tokio::time::sleep(self.delay).await;
        self.inner.insert_many(collection, documents).await
    }

    async fn find_one(
        &self,
        collection: &str,
        filter: &DocumentFilter,
    ) -> Result<Option<Document>, StoreError> {
        tokio::time::sleep(self.delay).await;
        self.inner.find_one(collection, filter).await
    }

    async fn find(&self, collection: &str, filter: &DocumentFilter) -> Result<Vec<Document>, StoreError> {
        tokio::time::sleep(self.delay).await;
        self.inner.find(collection, filter).await
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: &DocumentFilter,
        updates: Document,
    ) -> Result<u64, StoreError> {
        tokio::time::sleep(self.delay).await;
        self.inner.update_one(collection, filter, updates).await
    }

    async fn delete_one(&self, collection: &str, filter: &DocumentFilter) -> Result<u64, StoreError> {
        tokio::time::sleep(self.delay).await;
        self.inner.delete_one(collection, filter).await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        tokio::time::sleep(self.delay).await;
        Ok(())
    }
}

/// Relational store whose every call fails
#[derive(Debug, Default)]
pub struct FailingRelationalStore;

#[async_trait::async_trait]
impl RelationalStore for FailingRelationalStore {
    async fn create_instance(&self, _name: &str) -> Result<Instance, StoreError> {
        Err(unavailable("relational"))
    }

    async fn get_instance(&self, _id: i64) -> Result<Option<Instance>, StoreError> {
        Err(unavailable("relational"))
    }

    async fn list_instances(&self, _query: &InstanceQuery) -> Result<Page<Instance>, StoreError> {
        Err(unavailable("relational"))
    }

    async fn all_instances(&self) -> Result<Vec<Instance>, StoreError> {
        Err(unavailable("relational"))
    }

    async fn delete_instance(&self, _id: i64) -> Result<bool, StoreError> {
        Err(unavailable("relational"))
    }

    async fn insert_records(&self, _records: Vec<FieldRecord>) -> Result<Vec<FieldRecord>, StoreError> {
        Err(unavailable("relational"))
    }

    async fn get_record(&self, _vnf_id: i64, _id: i64) -> Result<Option<FieldRecord>, StoreError> {
        Err(unavailable("relational"))
    }

    async fn list_records(&self, _query: &RecordQuery) -> Result<Page<FieldRecord>, StoreError> {
        Err(unavailable("relational"))
    }

    async fn save_record(&self, _record: &FieldRecord) -> Result<FieldRecord, StoreError> {
        Err(unavailable("relational"))
    }

    async fn delete_record(&self, _vnf_id: i64, _id: i64) -> Result<bool, StoreError> {
        Err(unavailable("relational"))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Err(unavailable("relational"))
    }
}

/// Coordinator over in-memory stores, returning handles to both for inspection
pub fn memory_coordinator() -> (DualStoreCoordinator, MemoryRelationalStore, MemoryDocumentStore) {
    let relational = MemoryRelationalStore::new();
    let document = MemoryDocumentStore::new();
    let coordinator = DualStoreCoordinator::new(
        Arc::new(relational.clone()),
        Arc::new(document.clone()),
        StoreTimeouts::default(),
    );
    (coordinator, relational, document)
}

pub fn coordinator_with(
    relational: Arc<dyn RelationalStore>,
    document: Arc<dyn DocumentStore>,
    timeouts: StoreTimeouts,
) -> DualStoreCoordinator {
    DualStoreCoordinator::new(relational, document, timeouts)
}
