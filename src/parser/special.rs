//! # Special Config
//!
//! Best-effort extraction of document-level metadata, groups, schema and
//! version. Values with an unexpected shape are skipped without an error; this
//! pass never affects the field catalogue.

use crate::parser::node::ConfigNode;
use crate::parser::path;
use crate::parser::types::ParsedConfiguration;
use serde_json::Value;

const DISPATCH_KEYS: [&str; 4] = ["metadata", "groups", "schema", "version"];

/// Apply a node classified as special.
///
/// A node that is itself named after a dispatch key (`metadata: {...}`) is
/// consumed as that key. Any other special node (`config`, `settings`, …) has
/// each of its children dispatched by the child's key.
pub fn apply(path: &str, node: &ConfigNode, config: &mut ParsedConfiguration) {
    let own_key = path::last_segment(path).to_ascii_lowercase();
    if DISPATCH_KEYS.contains(&own_key.as_str()) {
        dispatch(&own_key, node, config);
        return;
    }

    if let ConfigNode::Mapping(entries) = node {
        for (key, value) in entries {
            dispatch(&key.to_ascii_lowercase(), value, config);
        }
    }
}

fn dispatch(key: &str, value: &ConfigNode, config: &mut ParsedConfiguration) {
    match key {
        "metadata" => {
            if let (ConfigNode::Mapping(_), Value::Object(metadata)) = (value, value.to_json()) {
                config.metadata = metadata;
            }
        }
        "groups" => {
            if let ConfigNode::Mapping(groups) = value {
                for (group_key, display) in groups {
                    if let Some(name) = display.as_str() {
                        config.groups.insert(group_key.clone(), name.to_string());
                    }
                }
            }
        }
        "schema" => {
            if let Some(schema) = value.as_str() {
                config.schema = Some(schema.to_string());
            }
        }
        "version" => {
            if let Some(version) = value.as_str() {
                config.version = Some(version.to_string());
            }
        }
        // Anything else under a special node is not part of the catalogue
        _ => {}
    }
}
