//! # Store
//!
//! Persistence for instances and field records.
//!
//! The relational store is authoritative. The document store holds
//! denormalized mirrors keyed by `vnf_id`. [`DualStoreCoordinator`] writes to
//! both and reports each side separately.

pub mod coordinator;
pub mod db_store;
pub mod document;
pub mod entities;
pub mod errors;
pub mod memory;
pub mod models;
pub mod relational;

pub use coordinator::{with_deadline, DualStoreCoordinator, StoreTimeouts};
pub use db_store::{DbDocumentStore, DbRelationalStore};
pub use document::{Condition, DocumentFilter, DocumentStore};
pub use errors::StoreError;
pub use memory::{MemoryDocumentStore, MemoryRelationalStore};
pub use models::{
    records_from_config, Document, FieldMirror, FieldRecord, Instance, InstanceMirror,
    InstanceQuery, Page, ReconcileFailure, ReconcileReport, RecordQuery, StorageStatus,
    StoreHealth, StoreOutcome, StoreResult,
};
pub use relational::RelationalStore;
