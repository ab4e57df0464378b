//! # Field Record Service
//!
//! CRUD over persisted field records of one instance. The relational store is
//! authoritative; mirrors are kept in step on a best-effort basis and a mirror
//! failure never fails the call.

use crate::store::{
    with_deadline, DualStoreCoordinator, FieldMirror, FieldRecord, Page, RecordQuery, StoreError,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Error type for field record operations
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("field record {id} of instance {vnf_id} not found")]
    NotFound { vnf_id: i64, id: i64 },
    /// The record is locked; nothing was written
    #[error("parameter '{parameter_name}' cannot be updated")]
    UpdateNotPermitted { id: i64, parameter_name: String },
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Request body for creating a record by hand
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFieldRecord {
    pub parameter_name: String,
    pub default_value: String,
    #[serde(default, alias = "descriptionTxt")]
    pub description_text: String,
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(default)]
    pub can_be_updated: bool,
    #[serde(default, alias = "hidenCondition")]
    pub hidden_condition: String,
    #[serde(default)]
    pub optional: Option<bool>,
    #[serde(default)]
    pub constraints: String,
    /// Defaults to `default_value`
    #[serde(default)]
    pub current_value: Option<String>,
}

/// Partial update; absent attributes are left as they are
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FieldRecordUpdate {
    pub default_value: Option<String>,
    #[serde(alias = "descriptionTxt")]
    pub description_text: Option<String>,
    #[serde(rename = "type")]
    pub field_type: Option<String>,
    pub can_be_updated: Option<bool>,
    #[serde(alias = "hidenCondition")]
    pub hidden_condition: Option<String>,
    pub optional: Option<bool>,
    pub constraints: Option<String>,
    pub current_value: Option<String>,
}

impl FieldRecordUpdate {
    fn apply(self, record: &mut FieldRecord) {
        if let Some(value) = self.default_value {
            record.default_value = value;
        }
        if let Some(value) = self.description_text {
            record.description_text = value;
        }
        if let Some(value) = self.field_type {
            record.field_type = value;
        }
        if let Some(value) = self.can_be_updated {
            record.can_be_updated = value;
        }
        if let Some(value) = self.hidden_condition {
            record.hidden_condition = value;
        }
        if let Some(value) = self.optional {
            record.optional = value;
        }
        if let Some(value) = self.constraints {
            record.constraints = value;
        }
        if let Some(value) = self.current_value {
            record.current_value = value;
        }
    }
}

#[derive(Clone, Debug)]
pub struct DefinitionService {
    coordinator: DualStoreCoordinator,
}

impl DefinitionService {
    #[must_use]
    pub fn new(coordinator: DualStoreCoordinator) -> Self {
        Self { coordinator }
    }

    /// Records of one instance in id order, optionally only modified ones
    ///
    /// # Errors
    /// Returns the relational store's error or a timeout.
    pub async fn list(&self, query: RecordQuery) -> Result<Page<FieldRecord>, RecordError> {
        let query = query.normalize();
        Ok(with_deadline(
            "list_records",
            self.coordinator.timeouts().operation,
            self.coordinator.relational().list_records(&query),
        )
        .await?)
    }

    /// # Errors
    /// [`RecordError::NotFound`] when the record does not belong to `vnf_id`.
    pub async fn get(&self, vnf_id: i64, id: i64) -> Result<FieldRecord, RecordError> {
        with_deadline(
            "get_record",
            self.coordinator.timeouts().operation,
            self.coordinator.relational().get_record(vnf_id, id),
        )
        .await?
        .ok_or(RecordError::NotFound { vnf_id, id })
    }

    /// Create a record for an existing instance
    ///
    /// # Errors
    /// Returns the relational store's error, e.g. a constraint violation for
    /// an unknown instance.
    pub async fn create(&self, vnf_id: i64, request: NewFieldRecord) -> Result<FieldRecord, RecordError> {
        let now = Utc::now();
        let mut record = FieldRecord {
            id: 0,
            vnf_id,
            parameter_name: request.parameter_name,
            current_value: request
                .current_value
                .unwrap_or_else(|| request.default_value.clone()),
            default_value: request.default_value,
            description_text: request.description_text,
            field_type: request.field_type,
            can_be_updated: request.can_be_updated,
            hidden_condition: request.hidden_condition,
            optional: request.optional.unwrap_or(false),
            constraints: request.constraints,
            modified: false,
            created_at: now,
            updated_at: now,
        };
        record.refresh_modified();

        let inserted = with_deadline(
            "insert_records",
            self.coordinator.timeouts().operation,
            self.coordinator.relational().insert_records(vec![record]),
        )
        .await?;
        let record = inserted
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::Constraint("insert returned no record".to_string()))?;

        if let Err(e) = self
            .coordinator
            .mirror_field_records(std::slice::from_ref(&record))
            .await
        {
            warn!(vnf_id, definition_id = record.id, error = %e, "Failed to mirror new field record");
        }

        info!(vnf_id, definition_id = record.id, operation = "create_record", "Created field record");
        Ok(record)
    }

    /// Apply a partial update
    ///
    /// A change of `current_value` is refused when the stored record has
    /// `can_be_updated == false`; the record is then left untouched.
    /// `modified` is recomputed on every successful update.
    ///
    /// # Errors
    /// [`RecordError::NotFound`], [`RecordError::UpdateNotPermitted`], or a store error.
    pub async fn update(
        &self,
        vnf_id: i64,
        id: i64,
        update: FieldRecordUpdate,
    ) -> Result<FieldRecord, RecordError> {
        let mut record = self.get(vnf_id, id).await?;

        let changes_value = update
            .current_value
            .as_ref()
            .is_some_and(|value| *value != record.current_value);
        if changes_value && !record.can_be_updated {
            warn!(
                vnf_id,
                definition_id = id,
                parameter = %record.parameter_name,
                "Refused update of locked parameter"
            );
            return Err(RecordError::UpdateNotPermitted {
                id,
                parameter_name: record.parameter_name,
            });
        }

        update.apply(&mut record);
        record.refresh_modified();
        record.updated_at = Utc::now();

        let saved = with_deadline(
            "save_record",
            self.coordinator.timeouts().operation,
            self.coordinator.relational().save_record(&record),
        )
        .await?;

        self.sync_mirror(&saved).await;
        info!(
            vnf_id,
            definition_id = id,
            modified = saved.modified,
            operation = "update_record",
            "Updated field record"
        );
        Ok(saved)
    }

    /// # Errors
    /// [`RecordError::NotFound`] when the record does not belong to `vnf_id`.
    pub async fn delete(&self, vnf_id: i64, id: i64) -> Result<(), RecordError> {
        let deleted = with_deadline(
            "delete_record",
            self.coordinator.timeouts().operation,
            self.coordinator.relational().delete_record(vnf_id, id),
        )
        .await?;
        if !deleted {
            return Err(RecordError::NotFound { vnf_id, id });
        }

        if let Err(e) = self.coordinator.delete_field_mirror(vnf_id, id).await {
            warn!(vnf_id, definition_id = id, error = %e, "Failed to delete field mirror");
        }
        info!(vnf_id, definition_id = id, operation = "delete_record", "Deleted field record");
        Ok(())
    }

    async fn sync_mirror(&self, record: &FieldRecord) {
        let mut updates = match FieldMirror::from(record).to_document() {
            Ok(document) => document,
            Err(e) => {
                warn!(definition_id = record.id, error = %e, "Failed to render field mirror");
                return;
            }
        };
        // Identity and creation time stay as first mirrored
        updates.remove("created_at");
        updates.remove("metadata");

        match self
            .coordinator
            .update_field_mirror(record.vnf_id, record.id, updates)
            .await
        {
            Ok(0) => debug!(definition_id = record.id, "No field mirror to update"),
            Ok(_) => {}
            Err(e) => warn!(definition_id = record.id, error = %e, "Failed to update field mirror"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::FieldDescriptor;
    use serde_json::json;

    #[test]
    fn test_update_applies_only_present_fields() {
        let mut record = FieldRecord::from_descriptor(1, &FieldDescriptor::new("mode", 0));
        record.description_text = "Mode".into();

        FieldRecordUpdate {
            current_value: Some("fast".into()),
            optional: Some(false),
            ..FieldRecordUpdate::default()
        }
        .apply(&mut record);

        assert_eq!(record.current_value, "fast");
        assert!(!record.optional);
        assert_eq!(record.description_text, "Mode");
    }

    #[test]
    fn test_update_body_uses_wire_names() {
        let update: FieldRecordUpdate =
            serde_json::from_value(json!({"currentValue": "9", "type": "number"})).unwrap();
        assert_eq!(update.current_value.as_deref(), Some("9"));
        assert_eq!(update.field_type.as_deref(), Some("number"));
        assert_eq!(update.can_be_updated, None);
    }

    #[test]
    fn test_legacy_wire_names_are_accepted() {
        let request: NewFieldRecord = serde_json::from_value(json!({
            "parameterName": "mode",
            "defaultValue": "fast",
            "descriptionTxt": "Mode",
            "type": "string",
            "hidenCondition": "advanced == false"
        }))
        .unwrap();
        assert_eq!(request.description_text, "Mode");
        assert_eq!(request.hidden_condition, "advanced == false");

        let update: FieldRecordUpdate =
            serde_json::from_value(json!({"descriptionTxt": "Speed", "hidenCondition": ""})).unwrap();
        assert_eq!(update.description_text.as_deref(), Some("Speed"));
        assert_eq!(update.hidden_condition.as_deref(), Some(""));
    }
}
