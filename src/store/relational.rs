//! Trait for the authoritative relational store
//!
//! Implemented by the in-memory store and the SeaORM database store.

use crate::store::errors::StoreError;
use crate::store::models::{FieldRecord, Instance, InstanceQuery, Page, RecordQuery};

/// Instances and their field records, owned by foreign key
///
/// Deleting an instance removes its records. Inserting a record for an
/// unknown instance is a [`StoreError::Constraint`].
#[async_trait::async_trait]
pub trait RelationalStore: Send + Sync {
    /// Insert a new instance, assigning its id and timestamps
    async fn create_instance(&self, name: &str) -> Result<Instance, StoreError>;
    async fn get_instance(&self, id: i64) -> Result<Option<Instance>, StoreError>;
    /// Newest first, optional name substring filter
    async fn list_instances(&self, query: &InstanceQuery) -> Result<Page<Instance>, StoreError>;
    async fn all_instances(&self) -> Result<Vec<Instance>, StoreError>;
    /// Returns whether a row was removed
    async fn delete_instance(&self, id: i64) -> Result<bool, StoreError>;

    /// Bulk insert, all or nothing, returning the records with assigned ids
    async fn insert_records(&self, records: Vec<FieldRecord>) -> Result<Vec<FieldRecord>, StoreError>;
    async fn get_record(&self, vnf_id: i64, id: i64) -> Result<Option<FieldRecord>, StoreError>;
    /// Records of one instance in id order
    async fn list_records(&self, query: &RecordQuery) -> Result<Page<FieldRecord>, StoreError>;
    /// Overwrite an existing record by id
    async fn save_record(&self, record: &FieldRecord) -> Result<FieldRecord, StoreError>;
    async fn delete_record(&self, vnf_id: i64, id: i64) -> Result<bool, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}
