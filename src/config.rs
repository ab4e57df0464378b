//! # Application Configuration
//!
//! Settings loaded from environment variables.

use crate::constants::{
    DEFAULT_DOCUMENT_DATABASE_URL, DEFAULT_LOG_FILTER, DEFAULT_RELATIONAL_DATABASE_URL,
    DEFAULT_STORE_SEARCH_TIMEOUT_SECS, DEFAULT_STORE_TIMEOUT_SECS,
};
use crate::store::StoreTimeouts;
use std::time::Duration;

/// Application configuration
///
/// Every setting has a default and can be overridden through the environment
/// (or a `.env` file loaded by the binary).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Connection URL of the authoritative relational store
    pub relational_database_url: String,
    /// Connection URL of the document mirror
    pub document_database_url: String,
    /// Deadline for each store read or write (seconds)
    pub store_timeout_secs: u64,
    /// Deadline for document-store searches (seconds)
    pub store_search_timeout_secs: u64,
    /// Tracing filter directive, e.g. `vnf_config=debug`
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            relational_database_url: DEFAULT_RELATIONAL_DATABASE_URL.to_string(),
            document_database_url: DEFAULT_DOCUMENT_DATABASE_URL.to_string(),
            store_timeout_secs: DEFAULT_STORE_TIMEOUT_SECS,
            store_search_timeout_secs: DEFAULT_STORE_SEARCH_TIMEOUT_SECS,
            log_level: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables with defaults
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            relational_database_url: env_var_or_default_str(
                "RELATIONAL_DATABASE_URL",
                DEFAULT_RELATIONAL_DATABASE_URL,
            ),
            document_database_url: env_var_or_default_str(
                "DOCUMENT_DATABASE_URL",
                DEFAULT_DOCUMENT_DATABASE_URL,
            ),
            store_timeout_secs: env_var_or_default("STORE_TIMEOUT_SECS", DEFAULT_STORE_TIMEOUT_SECS),
            store_search_timeout_secs: env_var_or_default(
                "STORE_SEARCH_TIMEOUT_SECS",
                DEFAULT_STORE_SEARCH_TIMEOUT_SECS,
            ),
            log_level: env_var_or_default_str("LOG_LEVEL", DEFAULT_LOG_FILTER),
        }
    }

    /// Store deadlines as durations
    #[must_use]
    pub fn timeouts(&self) -> StoreTimeouts {
        StoreTimeouts {
            operation: Duration::from_secs(self.store_timeout_secs),
            search: Duration::from_secs(self.store_search_timeout_secs),
        }
    }
}

/// Read environment variable or return default value
fn env_var_or_default<T: std::str::FromStr>(key: &str, default: T) -> T
where
    <T as std::str::FromStr>::Err: std::fmt::Debug,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Read environment variable as string or return default value
fn env_var_or_default_str(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
