//! # Ingest
//!
//! Parse a configuration document, record the instance and its field records
//! relationally, and mirror both into the document store.
//!
//! Parse errors and relational failures abort the ingest. A document-store
//! failure does not; it is reported as a warning next to the advisory
//! validation warnings.

use crate::parser::{find_config_document, parse_document, parse_file, validate, ParseError, ParsedConfiguration};
use crate::store::{records_from_config, DualStoreCoordinator, FieldRecord, Instance, StoreOutcome};
use serde::Serialize;
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

/// Error type for a failed ingest
#[derive(Debug, Error)]
pub enum IngestError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("failed to store instance '{name}': {error}")]
    InstanceNotStored { name: String, error: String },
    /// The instance row exists but none of its records were written
    #[error("failed to store field records of instance {vnf_id}: {error}")]
    RecordsNotStored { vnf_id: i64, error: String },
}

/// Everything one ingest produced
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestReport {
    pub instance: Instance,
    /// Persisted records with their assigned ids
    pub records: Vec<FieldRecord>,
    pub config: ParsedConfiguration,
    /// Validation findings followed by document-store failures
    pub warnings: Vec<String>,
    /// Per-store result of the instance write
    pub storage: StoreOutcome<()>,
    /// Per-store result of the field record write
    pub definition_storage: StoreOutcome<()>,
}

#[derive(Clone, Debug)]
pub struct Ingestor {
    coordinator: DualStoreCoordinator,
}

impl Ingestor {
    #[must_use]
    pub fn new(coordinator: DualStoreCoordinator) -> Self {
        Self { coordinator }
    }

    /// Ingest configuration text under `name`
    ///
    /// # Errors
    /// Invalid YAML, or a relational store failure.
    pub async fn ingest_document(&self, name: &str, content: &str) -> Result<IngestReport, IngestError> {
        let parsed = parse_document(content)?;
        self.ingest_parsed(name, parsed).await
    }

    /// Ingest one file; the instance is named after the file stem unless `name` is given
    ///
    /// # Errors
    /// An unreadable file, invalid YAML, or a relational store failure.
    pub async fn ingest_file(&self, name: Option<&str>, path: &Path) -> Result<IngestReport, IngestError> {
        let parsed = parse_file(path).await?;
        let name = name.map_or_else(|| stem(path), str::to_string);
        self.ingest_parsed(&name, parsed).await
    }

    /// Ingest the configuration document found inside an extracted bundle
    ///
    /// The instance is named after the directory unless `name` is given.
    ///
    /// # Errors
    /// [`ParseError::NoDocument`] when the directory holds no YAML file, plus
    /// everything [`Ingestor::ingest_file`] returns.
    pub async fn ingest_bundle_dir(&self, name: Option<&str>, dir: &Path) -> Result<IngestReport, IngestError> {
        let document = find_config_document(dir).ok_or_else(|| ParseError::NoDocument(dir.to_path_buf()))?;
        info!(bundle = %dir.display(), document = %document.display(), "Found configuration document");

        let name = name.map_or_else(|| stem(dir), str::to_string);
        self.ingest_file(Some(&name), &document).await
    }

    /// Persist an already parsed configuration
    ///
    /// # Errors
    /// [`IngestError::InstanceNotStored`] or [`IngestError::RecordsNotStored`]
    /// when the relational store rejects a write.
    pub async fn ingest_parsed(&self, name: &str, parsed: ParsedConfiguration) -> Result<IngestReport, IngestError> {
        let mut warnings = validate(&parsed);
        for warning in &warnings {
            warn!(instance = name, "{warning}");
        }

        let (storage, instance) = self.coordinator.store_instance(name, &parsed).await.split();
        let instance = match instance {
            Some(instance) if storage.relational.success => instance,
            _ => {
                return Err(IngestError::InstanceNotStored {
                    name: name.to_string(),
                    error: storage.relational.error.unwrap_or_default(),
                })
            }
        };
        if let Some(error) = &storage.document.error {
            warnings.push(format!("instance mirror not stored: {error}"));
        }

        let records = records_from_config(instance.id, &parsed);
        let (definition_storage, records) = self.coordinator.store_field_records(records).await.split();
        let records = match records {
            Some(records) if definition_storage.relational.success => records,
            _ => {
                return Err(IngestError::RecordsNotStored {
                    vnf_id: instance.id,
                    error: definition_storage.relational.error.unwrap_or_default(),
                })
            }
        };
        if let Some(error) = &definition_storage.document.error {
            warnings.push(format!("field record mirrors not stored: {error}"));
        }

        info!(
            vnf_id = instance.id,
            fields = records.len(),
            warnings = warnings.len(),
            operation = "ingest",
            "Ingested configuration"
        );
        Ok(IngestReport {
            instance,
            records,
            config: parsed,
            warnings,
            storage,
            definition_storage,
        })
    }
}

fn stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
