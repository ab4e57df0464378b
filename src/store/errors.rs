//! # Store Errors

use std::time::Duration;
use thiserror::Error;

/// Error type shared by both store backends
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store operation '{operation}' timed out after {}ms", .after.as_millis())]
    Timeout {
        operation: &'static str,
        after: Duration,
    },
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },
    /// A write that would break a relational constraint (e.g. unknown `vnf_id`)
    #[error("constraint violation: {0}")]
    Constraint(String),
    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),
    #[error("invalid search pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("backend error: {0:#}")]
    Backend(#[from] anyhow::Error),
}

impl StoreError {
    #[must_use]
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        StoreError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, StoreError::Timeout { .. })
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}
