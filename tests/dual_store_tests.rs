//! # Dual-Store Coordinator Tests
//!
//! Partial failure reporting, deadlines, mirror maintenance and reconciliation.

mod common;

use common::{
    coordinator_with, memory_coordinator, FailingDocumentStore, FailingRelationalStore,
    SlowDocumentStore,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use vnf_config::constants::{DEFINITION_COLLECTION, INSTANCE_COLLECTION};
use vnf_config::parser::parse_document;
use vnf_config::store::{
    records_from_config, MemoryDocumentStore, MemoryRelationalStore, RelationalStore, StoreTimeouts,
};

#[tokio::test]
async fn test_document_failure_keeps_relational_result() {
    let relational = MemoryRelationalStore::new();
    let coordinator = coordinator_with(
        Arc::new(relational.clone()),
        Arc::new(FailingDocumentStore),
        StoreTimeouts::default(),
    );
    let parsed = parse_document("retries: 3\n").unwrap();

    let outcome = coordinator.store_instance("edge", &parsed).await;
    assert!(outcome.relational.success);
    assert!(!outcome.document.success);
    assert!(outcome.any_success());
    let instance = outcome.data.clone().unwrap();
    assert!(relational.get_instance(instance.id).await.unwrap().is_some());

    let rendered = serde_json::to_value(&outcome).unwrap();
    assert_eq!(rendered["mysql"]["success"], json!(true));
    assert_eq!(rendered["mongodb"]["success"], json!(false));
    assert_eq!(rendered["data"]["name"], json!("edge"));

    let records = coordinator
        .store_field_records(records_from_config(instance.id, &parsed))
        .await;
    assert!(records.relational.success);
    assert!(!records.document.success);
    assert_eq!(records.data.unwrap().len(), 1);
}

#[tokio::test]
async fn test_relational_failure_still_attempts_mirror() {
    let document = MemoryDocumentStore::new();
    let coordinator = coordinator_with(
        Arc::new(FailingRelationalStore),
        Arc::new(document.clone()),
        StoreTimeouts::default(),
    );

    let outcome = coordinator
        .store_instance("edge", &parse_document("a: 1\n").unwrap())
        .await;
    assert!(!outcome.relational.success);
    assert!(outcome.relational.error.unwrap().contains("unavailable"));
    assert!(outcome.document.success);
    let instance = outcome.data.unwrap();
    assert_eq!(instance.id, 0);
    assert_eq!(document.count(INSTANCE_COLLECTION).await, 1);

    let record = records_from_config(7, &parse_document("retries: 3\n").unwrap()).remove(0);
    let outcome = coordinator.store_field_records(vec![record]).await;
    assert!(!outcome.relational.success);
    assert!(outcome.document.success);
    assert_eq!(document.count(DEFINITION_COLLECTION).await, 1);

    let mirrors = coordinator.field_mirrors(7).await.unwrap();
    assert_eq!(mirrors.len(), 1);
    assert_eq!(mirrors[0].parameter_name, "retries");
    assert_eq!(mirrors[0].definition_id, 0);
}

#[tokio::test]
async fn test_both_stores_failing_keeps_no_payload() {
    let coordinator = coordinator_with(
        Arc::new(FailingRelationalStore),
        Arc::new(FailingDocumentStore),
        StoreTimeouts::default(),
    );

    let outcome = coordinator
        .store_instance("edge", &parse_document("a: 1\n").unwrap())
        .await;
    assert!(!outcome.any_success());
    assert!(outcome.data.is_none());
    assert!(outcome.document.error.unwrap().contains("document store unavailable"));
}

#[tokio::test]
async fn test_slow_document_store_times_out() {
    let relational = MemoryRelationalStore::new();
    let coordinator = coordinator_with(
        Arc::new(relational.clone()),
        Arc::new(SlowDocumentStore::new(Duration::from_millis(500))),
        StoreTimeouts {
            operation: Duration::from_millis(50),
            search: Duration::from_millis(50),
        },
    );

    let outcome = coordinator
        .store_instance("edge", &parse_document("a: 1\n").unwrap())
        .await;
    assert!(outcome.relational.success);
    assert!(!outcome.document.success);
    assert!(outcome.document.error.unwrap().contains("timed out"));

    let status = coordinator.status().await;
    assert!(status.relational.connected);
    assert!(!status.document.connected);
}

#[tokio::test]
async fn test_field_mirror_update_and_delete() {
    let (coordinator, _, document) = memory_coordinator();
    let parsed = parse_document("retries: 3\nname: web\n").unwrap();
    let instance = coordinator.store_instance("edge", &parsed).await.data.unwrap();
    let records = coordinator
        .store_field_records(records_from_config(instance.id, &parsed))
        .await
        .data
        .unwrap();
    assert_eq!(document.count(DEFINITION_COLLECTION).await, 2);

    let target = &records[0];
    let mut updates = serde_json::Map::new();
    updates.insert("current_value".into(), json!("5"));
    let updated = coordinator
        .update_field_mirror(instance.id, target.id, updates)
        .await
        .unwrap();
    assert_eq!(updated, 1);

    let mirrors = coordinator.field_mirrors(instance.id).await.unwrap();
    let mirror = mirrors.iter().find(|m| m.definition_id == target.id).unwrap();
    assert_eq!(mirror.current_value, "5");

    assert_eq!(coordinator.delete_field_mirror(instance.id, target.id).await.unwrap(), 1);
    assert_eq!(coordinator.delete_field_mirror(instance.id, target.id).await.unwrap(), 0);
    assert_eq!(document.count(DEFINITION_COLLECTION).await, 1);
}

#[tokio::test]
async fn test_reconcile_creates_only_missing_mirrors() {
    let relational = MemoryRelationalStore::new();
    let document = MemoryDocumentStore::new();
    let coordinator = coordinator_with(
        Arc::new(relational.clone()),
        Arc::new(document.clone()),
        StoreTimeouts::default(),
    );

    let parsed = parse_document("metadata:\n  owner: teamA\nretries: 3\n").unwrap();
    let mirrored = coordinator.store_instance("mirrored", &parsed).await.data.unwrap();
    // Written behind the coordinator's back, so it has no mirror
    let orphan = relational.create_instance("orphan").await.unwrap();

    let report = coordinator.reconcile().await.unwrap();
    assert_eq!(report.scanned, 2);
    assert_eq!(report.created, vec![orphan.id]);
    assert_eq!(report.already_mirrored, 1);
    assert!(report.failed.is_empty());

    let existing = coordinator.instance_mirror(mirrored.id).await.unwrap().unwrap();
    assert_eq!(existing.metadata.get("owner"), Some(&json!("teamA")));
    let created = coordinator.instance_mirror(orphan.id).await.unwrap().unwrap();
    assert_eq!(created.name, "orphan");
    assert!(created.yaml_config.is_null());

    let again = coordinator.reconcile().await.unwrap();
    assert!(again.created.is_empty());
    assert_eq!(document.count(INSTANCE_COLLECTION).await, 2);
}

#[tokio::test]
async fn test_reconcile_records_per_instance_failures() {
    let relational = MemoryRelationalStore::new();
    relational.create_instance("one").await.unwrap();
    relational.create_instance("two").await.unwrap();
    let coordinator = coordinator_with(
        Arc::new(relational),
        Arc::new(FailingDocumentStore),
        StoreTimeouts::default(),
    );

    let report = coordinator.reconcile().await.unwrap();
    assert_eq!(report.scanned, 2);
    assert_eq!(report.failed.len(), 2);
    assert!(report.created.is_empty());
}

#[tokio::test]
async fn test_reconcile_fails_without_relational_listing() {
    let coordinator = coordinator_with(
        Arc::new(FailingRelationalStore),
        Arc::new(MemoryDocumentStore::new()),
        StoreTimeouts::default(),
    );
    assert!(coordinator.reconcile().await.is_err());
}
