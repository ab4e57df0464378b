//! # Services
//!
//! Operations over persisted instances and field records, and the ingest
//! flow that feeds them.

pub mod definitions;
pub mod ingest;
pub mod instances;

pub use definitions::{DefinitionService, FieldRecordUpdate, NewFieldRecord, RecordError};
pub use ingest::{IngestError, IngestReport, Ingestor};
pub use instances::InstanceService;
