//! # Store Models
//!
//! Persisted entities, their document-store mirrors, and the per-store
//! outcome types reported to callers.

use crate::constants::{DEFAULT_PAGE_SIZE, MAX_DEFINITION_PAGE_SIZE, MAX_INSTANCE_PAGE_SIZE};
use crate::parser::types::{FieldDescriptor, ParsedConfiguration};
use crate::store::errors::StoreError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A JSON document as held by the document store
pub type Document = Map<String, Value>;

/// One ingested configuration document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instance {
    /// Assigned by the relational store
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Instance {
    /// Instance the relational store has not assigned an id to
    #[must_use]
    pub fn unassigned(name: &str) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            name: name.to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Relational projection of one field descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldRecord {
    /// Assigned by the relational store, 0 until inserted
    pub id: i64,
    pub vnf_id: i64,
    /// Path of the originating descriptor
    pub parameter_name: String,
    pub default_value: String,
    pub description_text: String,
    #[serde(rename = "type")]
    pub field_type: String,
    pub can_be_updated: bool,
    pub hidden_condition: String,
    pub optional: bool,
    /// Validation rules rendered as YAML, empty when there are none
    pub constraints: String,
    pub current_value: String,
    /// `current_value != default_value`
    pub modified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FieldRecord {
    /// Project a descriptor onto a record for `vnf_id`
    #[must_use]
    pub fn from_descriptor(vnf_id: i64, field: &FieldDescriptor) -> Self {
        let default_value = field.default_value.as_ref().map(value_text).unwrap_or_default();
        let constraints = if field.validation_rules.is_empty() {
            String::new()
        } else {
            serde_yaml::to_string(&field.validation_rules).unwrap_or_default()
        };
        let now = Utc::now();

        Self {
            id: 0,
            vnf_id,
            parameter_name: field.path.clone(),
            current_value: default_value.clone(),
            default_value,
            description_text: field.description.clone(),
            field_type: field.field_type.to_string(),
            can_be_updated: field.metadata_bool("can_be_update").unwrap_or(true),
            hidden_condition: field.hidden_condition.clone(),
            optional: field.metadata_bool("optional").unwrap_or(!field.required),
            constraints,
            modified: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Recompute `modified` from the current and default values
    pub fn refresh_modified(&mut self) {
        self.modified = self.current_value != self.default_value;
    }
}

/// Records for every field of a parse, in extraction order
#[must_use]
pub fn records_from_config(vnf_id: i64, parsed: &ParsedConfiguration) -> Vec<FieldRecord> {
    parsed
        .fields_in_order()
        .into_iter()
        .map(|field| FieldRecord::from_descriptor(vnf_id, field))
        .collect()
}

/// Text form of a default value: strings verbatim, everything else as JSON
fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Instance mirror held in the `vnf_instances` collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceMirror {
    pub vnf_id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Full parsed configuration, null for mirrors created by reconciliation
    #[serde(default)]
    pub yaml_config: Value,
    /// Field payload keyed by path
    #[serde(default)]
    pub form_fields: Value,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl InstanceMirror {
    /// Mirror carrying the full parse result
    ///
    /// # Errors
    /// Fails only if the parsed configuration cannot be rendered as JSON.
    pub fn from_parsed(instance: &Instance, parsed: &ParsedConfiguration) -> Result<Self, StoreError> {
        Ok(Self {
            yaml_config: serde_json::to_value(parsed)?,
            form_fields: serde_json::to_value(&parsed.fields)?,
            metadata: parsed.metadata.clone(),
            ..Self::minimal(instance)
        })
    }

    /// Identity-only mirror
    #[must_use]
    pub fn minimal(instance: &Instance) -> Self {
        Self {
            vnf_id: instance.id,
            name: instance.name.clone(),
            created_at: instance.created_at,
            updated_at: instance.updated_at,
            yaml_config: Value::Null,
            form_fields: Value::Null,
            metadata: Map::new(),
        }
    }

    /// # Errors
    /// Returns a serialization error if the mirror is not a JSON object.
    pub fn to_document(&self) -> Result<Document, StoreError> {
        to_document(self)
    }

    /// # Errors
    /// Returns a serialization error if the document does not have the mirror's shape.
    pub fn from_document(document: Document) -> Result<Self, StoreError> {
        Ok(serde_json::from_value(Value::Object(document))?)
    }
}

/// Field record mirror held in the `vnf_definitions` collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldMirror {
    pub vnf_id: i64,
    /// Relational id of the mirrored record
    pub definition_id: i64,
    pub parameter_name: String,
    pub default_value: String,
    #[serde(default)]
    pub description_text: String,
    #[serde(rename = "type")]
    pub field_type: String,
    pub can_be_updated: bool,
    #[serde(default)]
    pub hidden_condition: String,
    pub optional: bool,
    #[serde(default)]
    pub constraints: String,
    pub current_value: String,
    pub modified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl From<&FieldRecord> for FieldMirror {
    fn from(record: &FieldRecord) -> Self {
        Self {
            vnf_id: record.vnf_id,
            definition_id: record.id,
            parameter_name: record.parameter_name.clone(),
            default_value: record.default_value.clone(),
            description_text: record.description_text.clone(),
            field_type: record.field_type.clone(),
            can_be_updated: record.can_be_updated,
            hidden_condition: record.hidden_condition.clone(),
            optional: record.optional,
            constraints: record.constraints.clone(),
            current_value: record.current_value.clone(),
            modified: record.modified,
            created_at: record.created_at,
            updated_at: record.updated_at,
            metadata: Map::new(),
        }
    }
}

impl FieldMirror {
    /// # Errors
    /// Returns a serialization error if the mirror is not a JSON object.
    pub fn to_document(&self) -> Result<Document, StoreError> {
        to_document(self)
    }

    /// # Errors
    /// Returns a serialization error if the document does not have the mirror's shape.
    pub fn from_document(document: Document) -> Result<Self, StoreError> {
        Ok(serde_json::from_value(Value::Object(document))?)
    }
}

fn to_document<T: Serialize>(value: &T) -> Result<Document, StoreError> {
    match serde_json::to_value(value)? {
        Value::Object(document) => Ok(document),
        other => Err(StoreError::Serialization(serde::ser::Error::custom(format!(
            "expected a JSON object, got {other}"
        )))),
    }
}

/// Result of one logical write against a single store
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreResult {
    pub success: bool,
    pub error: Option<String>,
}

impl StoreResult {
    #[must_use]
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    #[must_use]
    pub fn failed(error: impl ToString) -> Self {
        Self {
            success: false,
            error: Some(error.to_string()),
        }
    }

    /// Map a store call's result, keeping only the error text
    #[must_use]
    pub fn from_result<T>(result: &Result<T, StoreError>) -> Self {
        match result {
            Ok(_) => Self::ok(),
            Err(e) => Self::failed(e),
        }
    }
}

/// Independent outcome of a write against both stores
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreOutcome<T> {
    #[serde(rename = "mysql")]
    pub relational: StoreResult,
    #[serde(rename = "mongodb")]
    pub document: StoreResult,
    /// Present when at least one store accepted the write
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> StoreOutcome<T> {
    #[must_use]
    pub fn any_success(&self) -> bool {
        self.relational.success || self.document.success
    }

    #[must_use]
    pub fn all_success(&self) -> bool {
        self.relational.success && self.document.success
    }

    /// Separate the per-store results from the payload
    pub fn split(self) -> (StoreOutcome<()>, Option<T>) {
        let results = StoreOutcome {
            relational: self.relational,
            document: self.document,
            data: None,
        };
        (results, self.data)
    }
}

/// Reachability of one store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreHealth {
    pub connected: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Reachability of both stores
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageStatus {
    #[serde(rename = "mysql")]
    pub relational: StoreHealth,
    #[serde(rename = "mongodb")]
    pub document: StoreHealth,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileFailure {
    pub vnf_id: i64,
    pub error: String,
}

/// Summary of one mirror reconciliation sweep
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileReport {
    /// Relational instances examined
    pub scanned: usize,
    /// Instances that received a new minimal mirror
    pub created: Vec<i64>,
    /// Instances whose mirror already existed
    pub already_mirrored: usize,
    pub failed: Vec<ReconcileFailure>,
}

/// One page of a listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Matching rows across all pages
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
}

/// Instance listing query, newest first
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstanceQuery {
    pub page: u64,
    pub page_size: u64,
    /// Substring match on the instance name
    pub keyword: Option<String>,
}

impl InstanceQuery {
    /// Page numbers start at 1; an out-of-range size falls back to the default
    #[must_use]
    pub fn normalize(mut self) -> Self {
        self.page = self.page.max(1);
        if self.page_size == 0 || self.page_size > MAX_INSTANCE_PAGE_SIZE {
            self.page_size = DEFAULT_PAGE_SIZE;
        }
        self.keyword = self.keyword.filter(|k| !k.is_empty());
        self
    }

    #[must_use]
    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.page_size)
    }
}

/// Field record listing query for one instance, in id order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordQuery {
    pub vnf_id: i64,
    pub page: u64,
    pub page_size: u64,
    pub modified_only: bool,
}

impl RecordQuery {
    #[must_use]
    pub fn normalize(mut self) -> Self {
        self.page = self.page.max(1);
        if self.page_size == 0 || self.page_size > MAX_DEFINITION_PAGE_SIZE {
            self.page_size = DEFAULT_PAGE_SIZE;
        }
        self
    }

    #[must_use]
    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.page_size)
    }
}
