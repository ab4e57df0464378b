//! # Instance Service
//!
//! Listing, lookup and deletion of ingested instances.

use crate::store::{
    with_deadline, DualStoreCoordinator, Instance, InstanceMirror, InstanceQuery, Page, StoreError,
};
use serde_json::Value;
use tracing::info;

#[derive(Clone, Debug)]
pub struct InstanceService {
    coordinator: DualStoreCoordinator,
}

impl InstanceService {
    #[must_use]
    pub fn new(coordinator: DualStoreCoordinator) -> Self {
        Self { coordinator }
    }

    /// Newest first; page and size are normalized before querying
    ///
    /// # Errors
    /// Returns the relational store's error or a timeout.
    pub async fn list(&self, query: InstanceQuery) -> Result<Page<Instance>, StoreError> {
        let query = query.normalize();
        with_deadline(
            "list_instances",
            self.coordinator.timeouts().operation,
            self.coordinator.relational().list_instances(&query),
        )
        .await
    }

    /// # Errors
    /// [`StoreError::NotFound`] for an unknown id.
    pub async fn get(&self, id: i64) -> Result<Instance, StoreError> {
        with_deadline(
            "get_instance",
            self.coordinator.timeouts().operation,
            self.coordinator.relational().get_instance(id),
        )
        .await?
        .ok_or_else(|| StoreError::not_found("instance", id))
    }

    /// Delete an instance and, by cascade, its field records
    ///
    /// Mirrors in the document store are left in place.
    ///
    /// # Errors
    /// [`StoreError::NotFound`] for an unknown id.
    pub async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let deleted = with_deadline(
            "delete_instance",
            self.coordinator.timeouts().operation,
            self.coordinator.relational().delete_instance(id),
        )
        .await?;
        if !deleted {
            return Err(StoreError::not_found("instance", id));
        }
        info!(vnf_id = id, operation = "delete_instance", "Deleted instance");
        Ok(())
    }

    /// Instance mirror with the full parsed configuration
    ///
    /// # Errors
    /// [`StoreError::NotFound`] when no mirror exists for `id`.
    pub async fn mirror(&self, id: i64) -> Result<InstanceMirror, StoreError> {
        self.coordinator
            .instance_mirror(id)
            .await?
            .ok_or_else(|| StoreError::not_found("instance mirror", id))
    }

    /// Field payload captured at ingest
    ///
    /// # Errors
    /// [`StoreError::NotFound`] when no mirror exists for `id`.
    pub async fn form_fields(&self, id: i64) -> Result<Value, StoreError> {
        self.coordinator.form_fields_from_mirror(id).await
    }
}
