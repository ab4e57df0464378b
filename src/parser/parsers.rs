//! # Parsers
//!
//! Turn a YAML configuration document into a [`ParsedConfiguration`].
//!
//! The document is loaded into a [`ConfigNode`] tree, then walked once from
//! the root. Each node is classified and either recorded as document metadata,
//! extracted as a field, or recursed into.

use crate::parser::classify::{classify, NodeClass};
use crate::parser::extract::{extract, simple};
use crate::parser::node::ConfigNode;
use crate::parser::path;
use crate::parser::special;
use crate::parser::types::{FieldDescriptor, ParsedConfiguration};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Error type for loading a configuration document
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("No YAML configuration document found in {}", .0.display())]
    NoDocument(PathBuf),
}

/// Parse configuration text
#[allow(
    clippy::missing_errors_doc,
    reason = "Only YAML syntax errors are returned"
)]
pub fn parse_document(content: &str) -> Result<ParsedConfiguration, ParseError> {
    if content.trim().is_empty() {
        return Ok(ParsedConfiguration::default());
    }

    let value: serde_yaml::Value = serde_yaml::from_str(content)?;
    let root = ConfigNode::from(value);

    let mut walker = FieldWalker::default();
    walker.visit("", &root);

    debug!(
        fields = walker.config.fields.len(),
        groups = walker.config.groups.len(),
        "Parsed configuration document"
    );
    Ok(walker.config)
}

/// Read and parse a configuration file
#[allow(
    clippy::missing_errors_doc,
    reason = "I/O and YAML errors are described by ParseError"
)]
pub async fn parse_file(path: &Path) -> Result<ParsedConfiguration, ParseError> {
    debug!("Parsing configuration from: {}", path.display());
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ParseError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    parse_document(&content)
}

/// Recursive walk state for one parse pass
#[derive(Default)]
struct FieldWalker {
    /// Bumped on every visit, so orders follow document position
    order: i64,
    config: ParsedConfiguration,
}

impl FieldWalker {
    fn visit(&mut self, path: &str, node: &ConfigNode) {
        let order = self.order;
        self.order += 1;

        match classify(path, node) {
            NodeClass::Special => special::apply(path, node, &mut self.config),
            NodeClass::FieldDescriptor => {
                if let ConfigNode::Mapping(entries) = node {
                    self.emit(extract(path, entries, order));
                }
            }
            NodeClass::Container => match node {
                ConfigNode::Mapping(entries) => {
                    for (key, child) in entries {
                        self.visit(&path::build(path, key), child);
                    }
                }
                ConfigNode::Sequence(items) => {
                    for (index, child) in items.iter().enumerate() {
                        self.visit(&path::element(path, index), child);
                    }
                }
                ConfigNode::Scalar(_) => {}
            },
            NodeClass::Leaf => self.emit(simple(path, node, order)),
            NodeClass::Skip => {}
        }
    }

    fn emit(&mut self, field: FieldDescriptor) {
        if field.path.is_empty() {
            debug!("Dropping field with empty path");
            return;
        }
        if let Some(previous) = self.config.fields.insert(field.path.clone(), field) {
            debug!(path = %previous.path, "Duplicate field path, keeping the later one");
        }
    }
}
