//! # Dual-Store Write Coordinator
//!
//! Writes every entity to the relational store first and then mirrors it into
//! the document store. The two stores share no transaction. Each side's
//! result is reported independently in a [`StoreOutcome`] and nothing is
//! rolled back or retried.
//!
//! Every store call runs under a deadline; expiry surfaces as
//! [`StoreError::Timeout`] and is handled like any other store error.

use crate::constants::{
    DEFAULT_STORE_SEARCH_TIMEOUT_SECS, DEFAULT_STORE_TIMEOUT_SECS, DEFINITION_COLLECTION,
    INSTANCE_COLLECTION,
};
use crate::parser::types::ParsedConfiguration;
use crate::store::document::{DocumentFilter, DocumentStore};
use crate::store::errors::StoreError;
use crate::store::models::{
    Document, FieldMirror, FieldRecord, Instance, InstanceMirror, ReconcileFailure,
    ReconcileReport, StorageStatus, StoreHealth, StoreOutcome, StoreResult,
};
use crate::store::relational::RelationalStore;
use chrono::Utc;
use regex::RegexBuilder;
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Deadlines applied to store calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreTimeouts {
    /// Reads and writes
    pub operation: Duration,
    /// Document-store searches
    pub search: Duration,
}

impl Default for StoreTimeouts {
    fn default() -> Self {
        Self {
            operation: Duration::from_secs(DEFAULT_STORE_TIMEOUT_SECS),
            search: Duration::from_secs(DEFAULT_STORE_SEARCH_TIMEOUT_SECS),
        }
    }
}

/// Run `future` under a deadline
///
/// The future is dropped when the deadline passes, so no work outlives the call.
///
/// # Errors
/// Returns the future's own error, or [`StoreError::Timeout`] on expiry.
pub async fn with_deadline<T, F>(operation: &'static str, after: Duration, future: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    match tokio::time::timeout(after, future).await {
        Ok(result) => result,
        Err(_elapsed) => Err(StoreError::Timeout { operation, after }),
    }
}

/// Coordinates writes across the relational store and its document mirror
#[derive(Clone)]
pub struct DualStoreCoordinator {
    relational: Arc<dyn RelationalStore>,
    document: Arc<dyn DocumentStore>,
    timeouts: StoreTimeouts,
}

impl fmt::Debug for DualStoreCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DualStoreCoordinator")
            .field("timeouts", &self.timeouts)
            .finish_non_exhaustive()
    }
}

impl DualStoreCoordinator {
    #[must_use]
    pub fn new(
        relational: Arc<dyn RelationalStore>,
        document: Arc<dyn DocumentStore>,
        timeouts: StoreTimeouts,
    ) -> Self {
        Self {
            relational,
            document,
            timeouts,
        }
    }

    /// The authoritative store
    #[must_use]
    pub fn relational(&self) -> &Arc<dyn RelationalStore> {
        &self.relational
    }

    #[must_use]
    pub fn timeouts(&self) -> StoreTimeouts {
        self.timeouts
    }

    async fn timed<T, F>(&self, operation: &'static str, future: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        with_deadline(operation, self.timeouts.operation, future).await
    }

    /// Create an instance and mirror the full parse result under its id
    ///
    /// The mirror write is attempted whatever the relational result. Without
    /// a relational id the mirror carries `vnf_id` 0, which no lookup by
    /// relational identity matches.
    pub async fn store_instance(&self, name: &str, parsed: &ParsedConfiguration) -> StoreOutcome<Instance> {
        let created = self
            .timed("create_instance", self.relational.create_instance(name))
            .await;
        if let Err(e) = &created {
            warn!(operation = "store_instance", error = %e, "Relational insert failed");
        }
        let instance = match &created {
            Ok(instance) => instance.clone(),
            Err(_) => Instance::unassigned(name),
        };

        let mirrored = match InstanceMirror::from_parsed(&instance, parsed).and_then(|m| m.to_document()) {
            Ok(document) => {
                self.timed(
                    "insert_instance_mirror",
                    self.document.insert_one(INSTANCE_COLLECTION, document),
                )
                .await
            }
            Err(e) => Err(e),
        };
        if let Err(e) = &mirrored {
            warn!(vnf_id = instance.id, operation = "store_instance", error = %e, "Instance mirror write failed");
        }

        info!(
            vnf_id = instance.id,
            operation = "store_instance",
            stored = created.is_ok(),
            mirrored = mirrored.is_ok(),
            "Stored instance"
        );
        outcome(&created, &mirrored, instance)
    }

    /// Insert field records and mirror them
    ///
    /// Mirrors carry the assigned ids when the relational insert succeeded,
    /// otherwise the records as given. An empty list is a success on both
    /// sides without I/O.
    pub async fn store_field_records(&self, records: Vec<FieldRecord>) -> StoreOutcome<Vec<FieldRecord>> {
        if records.is_empty() {
            return StoreOutcome {
                relational: StoreResult::ok(),
                document: StoreResult::ok(),
                data: Some(Vec::new()),
            };
        }

        let inserted = self
            .timed("insert_records", self.relational.insert_records(records.clone()))
            .await;
        if let Err(e) = &inserted {
            warn!(operation = "store_field_records", error = %e, "Relational insert failed");
        }
        let written = match &inserted {
            Ok(inserted) => inserted.clone(),
            Err(_) => records,
        };

        let mirrored = self.mirror_field_records(&written).await;
        if let Err(e) = &mirrored {
            warn!(operation = "store_field_records", error = %e, "Field mirror write failed");
        }

        info!(
            count = written.len(),
            operation = "store_field_records",
            stored = inserted.is_ok(),
            mirrored = mirrored.is_ok(),
            "Stored field records"
        );
        outcome(&inserted, &mirrored, written)
    }

    /// Write mirrors for records that already exist relationally
    ///
    /// # Errors
    /// Returns the document store's error or a timeout.
    pub async fn mirror_field_records(&self, records: &[FieldRecord]) -> Result<(), StoreError> {
        if records.is_empty() {
            return Ok(());
        }
        let documents = records
            .iter()
            .map(|record| FieldMirror::from(record).to_document())
            .collect::<Result<Vec<_>, _>>()?;
        self.timed(
            "insert_field_mirrors",
            self.document.insert_many(DEFINITION_COLLECTION, documents),
        )
        .await
    }

    /// # Errors
    /// Returns the document store's error, a timeout, or a malformed mirror.
    pub async fn instance_mirror(&self, vnf_id: i64) -> Result<Option<InstanceMirror>, StoreError> {
        let filter = DocumentFilter::new().equals("vnf_id", vnf_id);
        self.timed("find_instance_mirror", self.document.find_one(INSTANCE_COLLECTION, &filter))
            .await?
            .map(InstanceMirror::from_document)
            .transpose()
    }

    /// # Errors
    /// Returns the document store's error, a timeout, or a malformed mirror.
    pub async fn field_mirrors(&self, vnf_id: i64) -> Result<Vec<FieldMirror>, StoreError> {
        let filter = DocumentFilter::new().equals("vnf_id", vnf_id);
        self.timed("find_field_mirrors", self.document.find(DEFINITION_COLLECTION, &filter))
            .await?
            .into_iter()
            .map(FieldMirror::from_document)
            .collect()
    }

    /// Field payload captured when the instance was ingested
    ///
    /// # Errors
    /// [`StoreError::NotFound`] when the instance has no mirror.
    pub async fn form_fields_from_mirror(&self, vnf_id: i64) -> Result<Value, StoreError> {
        self.instance_mirror(vnf_id)
            .await?
            .map(|mirror| mirror.form_fields)
            .ok_or_else(|| StoreError::not_found("instance mirror", vnf_id))
    }

    /// Search instance mirrors
    ///
    /// `name` is matched as a case-insensitive regular expression against the
    /// mirror's name; any other key must equal the mirror's value.
    ///
    /// # Errors
    /// An invalid `name` pattern, the document store's error, or a timeout.
    pub async fn search_instance_mirrors(
        &self,
        query: &Document,
    ) -> Result<Vec<InstanceMirror>, StoreError> {
        let mut filter = DocumentFilter::new();
        for (key, value) in query {
            match (key.as_str(), value) {
                ("name", Value::String(pattern)) => {
                    let pattern = RegexBuilder::new(pattern).case_insensitive(true).build()?;
                    filter = filter.matching("name", pattern);
                }
                _ => filter = filter.equals(key.clone(), value.clone()),
            }
        }

        let documents = with_deadline(
            "search_instance_mirrors",
            self.timeouts.search,
            self.document.find(INSTANCE_COLLECTION, &filter),
        )
        .await?;
        documents.into_iter().map(InstanceMirror::from_document).collect()
    }

    /// Set `updates` on one field mirror and stamp `updated_at`
    ///
    /// # Errors
    /// Returns the document store's error or a timeout.
    pub async fn update_field_mirror(
        &self,
        vnf_id: i64,
        definition_id: i64,
        mut updates: Document,
    ) -> Result<u64, StoreError> {
        updates.insert("updated_at".to_string(), serde_json::to_value(Utc::now())?);
        let filter = DocumentFilter::new()
            .equals("vnf_id", vnf_id)
            .equals("definition_id", definition_id);
        self.timed(
            "update_field_mirror",
            self.document.update_one(DEFINITION_COLLECTION, &filter, updates),
        )
        .await
    }

    /// # Errors
    /// Returns the document store's error or a timeout.
    pub async fn delete_field_mirror(&self, vnf_id: i64, definition_id: i64) -> Result<u64, StoreError> {
        let filter = DocumentFilter::new()
            .equals("vnf_id", vnf_id)
            .equals("definition_id", definition_id);
        self.timed(
            "delete_field_mirror",
            self.document.delete_one(DEFINITION_COLLECTION, &filter),
        )
        .await
    }

    /// Create a minimal mirror for every relational instance that has none
    ///
    /// Existing mirrors are never modified. Per-instance failures are logged
    /// and recorded in the report; the sweep continues.
    ///
    /// # Errors
    /// Fails only if the relational instances cannot be listed.
    pub async fn reconcile(&self) -> Result<ReconcileReport, StoreError> {
        info!(operation = "reconcile", "Starting mirror reconciliation");
        let instances = self
            .timed("all_instances", self.relational.all_instances())
            .await?;

        let mut report = ReconcileReport {
            scanned: instances.len(),
            ..ReconcileReport::default()
        };

        for instance in &instances {
            match self.reconcile_instance(instance).await {
                Ok(true) => {
                    debug!(vnf_id = instance.id, "Created missing instance mirror");
                    report.created.push(instance.id);
                }
                Ok(false) => report.already_mirrored += 1,
                Err(e) => {
                    warn!(vnf_id = instance.id, operation = "reconcile", error = %e, "Failed to reconcile instance");
                    report.failed.push(ReconcileFailure {
                        vnf_id: instance.id,
                        error: e.to_string(),
                    });
                }
            }
        }

        info!(
            operation = "reconcile",
            scanned = report.scanned,
            created = report.created.len(),
            failed = report.failed.len(),
            "Mirror reconciliation complete"
        );
        Ok(report)
    }

    /// Returns whether a mirror was created
    async fn reconcile_instance(&self, instance: &Instance) -> Result<bool, StoreError> {
        let filter = DocumentFilter::new().equals("vnf_id", instance.id);
        let existing = self
            .timed("find_instance_mirror", self.document.find_one(INSTANCE_COLLECTION, &filter))
            .await?;
        if existing.is_some() {
            return Ok(false);
        }

        let document = InstanceMirror::minimal(instance).to_document()?;
        self.timed(
            "insert_instance_mirror",
            self.document.insert_one(INSTANCE_COLLECTION, document),
        )
        .await?;
        Ok(true)
    }

    /// Ping both stores
    pub async fn status(&self) -> StorageStatus {
        let relational = self.timed("ping", self.relational.ping()).await;
        let document = self.timed("ping", self.document.ping()).await;
        StorageStatus {
            relational: health(relational),
            document: health(document),
        }
    }
}

/// Per-store results; the payload is kept when either side accepted it
fn outcome<T, R>(
    relational: &Result<R, StoreError>,
    document: &Result<(), StoreError>,
    data: T,
) -> StoreOutcome<T> {
    let relational = StoreResult::from_result(relational);
    let document = StoreResult::from_result(document);
    let data = (relational.success || document.success).then_some(data);
    StoreOutcome {
        relational,
        document,
        data,
    }
}

fn health(result: Result<(), StoreError>) -> StoreHealth {
    match result {
        Ok(()) => StoreHealth {
            connected: true,
            error: None,
        },
        Err(e) => StoreHealth {
            connected: false,
            error: Some(e.to_string()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_document;
    use crate::store::memory::{MemoryDocumentStore, MemoryRelationalStore};
    use serde_json::json;

    fn coordinator() -> (DualStoreCoordinator, MemoryDocumentStore) {
        let document = MemoryDocumentStore::new();
        let coordinator = DualStoreCoordinator::new(
            Arc::new(MemoryRelationalStore::new()),
            Arc::new(document.clone()),
            StoreTimeouts::default(),
        );
        (coordinator, document)
    }

    #[tokio::test]
    async fn test_with_deadline_times_out() {
        let result: Result<(), StoreError> = with_deadline("sleep", Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;
        assert!(result.unwrap_err().is_timeout());
    }

    #[tokio::test]
    async fn test_store_instance_writes_both_sides() {
        let (coordinator, document) = coordinator();
        let parsed = parse_document("timeout: 30\nmetadata:\n  owner: teamA\n").unwrap();

        let outcome = coordinator.store_instance("edge", &parsed).await;
        assert!(outcome.all_success());
        let instance = outcome.data.unwrap();

        let mirror = coordinator.instance_mirror(instance.id).await.unwrap().unwrap();
        assert_eq!(mirror.name, "edge");
        assert_eq!(mirror.metadata.get("owner"), Some(&json!("teamA")));
        assert_eq!(mirror.form_fields["timeout"]["defaultValue"], 30);
        assert_eq!(document.count(INSTANCE_COLLECTION).await, 1);
    }

    #[tokio::test]
    async fn test_empty_record_list_is_success_without_io() {
        let (coordinator, document) = coordinator();
        let outcome = coordinator.store_field_records(Vec::new()).await;
        assert!(outcome.all_success());
        assert_eq!(outcome.data, Some(Vec::new()));
        assert_eq!(document.count(DEFINITION_COLLECTION).await, 0);
    }

    #[tokio::test]
    async fn test_search_name_is_case_insensitive_regex() {
        let (coordinator, _) = coordinator();
        let parsed = ParsedConfiguration::default();
        coordinator.store_instance("Core-Router", &parsed).await;
        coordinator.store_instance("edge", &parsed).await;

        let mut query = Document::new();
        query.insert("name".into(), json!("^core"));
        let found = coordinator.search_instance_mirrors(&query).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Core-Router");

        let mut query = Document::new();
        query.insert("vnf_id".into(), json!(2));
        let found = coordinator.search_instance_mirrors(&query).await.unwrap();
        assert_eq!(found[0].name, "edge");

        let mut query = Document::new();
        query.insert("name".into(), json!("("));
        assert!(coordinator.search_instance_mirrors(&query).await.is_err());
    }

    #[tokio::test]
    async fn test_form_fields_missing_mirror() {
        let (coordinator, _) = coordinator();
        let err = coordinator.form_fields_from_mirror(9).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_status_reports_both_connected() {
        let (coordinator, _) = coordinator();
        let status = coordinator.status().await;
        assert!(status.relational.connected);
        assert!(status.document.connected);
        assert_eq!(
            serde_json::to_value(&status).unwrap(),
            json!({"mysql": {"connected": true}, "mongodb": {"connected": true}})
        );
    }
}
