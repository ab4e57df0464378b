//! # Node Classifier
//!
//! Decides what a node at a given path is before the walker acts on it.

use crate::parser::node::{ConfigNode, Scalar};

/// Path fragments that mark a mapping as document-level metadata
pub const SPECIAL_MARKERS: [&str; 6] = ["metadata", "groups", "schema", "version", "config", "settings"];

/// Keys whose presence turns a mapping into a field descriptor
pub const FIELD_PROPERTY_KEYS: [&str; 12] = [
    "type",
    "default",
    "description",
    "required",
    "hidden",
    "validation",
    "options",
    "group",
    "order",
    "constraints",
    "can_be_update",
    "optional",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeClass {
    /// Metadata/groups/schema/version block, never a field
    Special,
    /// Mapping carrying explicit field properties
    FieldDescriptor,
    /// Mapping or sequence to recurse into
    Container,
    /// Bare scalar promoted to a field
    Leaf,
    /// Nothing to emit (null scalar, or a scalar document root)
    Skip,
}

#[must_use]
pub fn classify(path: &str, node: &ConfigNode) -> NodeClass {
    match node {
        ConfigNode::Mapping(entries) => {
            if is_special_path(path) {
                NodeClass::Special
            } else if has_field_properties(entries) {
                NodeClass::FieldDescriptor
            } else {
                NodeClass::Container
            }
        }
        ConfigNode::Sequence(_) => NodeClass::Container,
        ConfigNode::Scalar(Scalar::Null) => NodeClass::Skip,
        ConfigNode::Scalar(_) if path.is_empty() => NodeClass::Skip,
        ConfigNode::Scalar(_) => NodeClass::Leaf,
    }
}

/// Substring match, so `app_settings.db` is special as well
#[must_use]
pub fn is_special_path(path: &str) -> bool {
    let lower = path.to_ascii_lowercase();
    SPECIAL_MARKERS.iter().any(|marker| lower.contains(marker))
}

#[must_use]
pub fn has_field_properties(entries: &[(String, ConfigNode)]) -> bool {
    entries.iter().any(|(key, _)| {
        let lower = key.to_ascii_lowercase();
        FIELD_PROPERTY_KEYS.contains(&lower.as_str())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(yaml: &str) -> ConfigNode {
        ConfigNode::from(serde_yaml::from_str::<serde_yaml::Value>(yaml).unwrap())
    }

    #[test]
    fn test_special_by_path_marker() {
        let mapping = node("owner: teamA");
        assert_eq!(classify("metadata", &mapping), NodeClass::Special);
        assert_eq!(classify("app.Settings", &mapping), NodeClass::Special);
        assert_eq!(classify("deploy_config", &mapping), NodeClass::Special);
    }

    #[test]
    fn test_special_wins_over_descriptor_properties() {
        let descriptor = node("type: number\ndefault: 3");
        assert_eq!(classify("settings.retries", &descriptor), NodeClass::Special);
    }

    #[test]
    fn test_root_mapping_is_never_special() {
        assert_eq!(classify("", &node("metadata: {a: 1}")), NodeClass::Container);
    }

    #[test]
    fn test_field_descriptor_keys_case_insensitive() {
        assert_eq!(
            classify("timeout", &node("Type: number")),
            NodeClass::FieldDescriptor
        );
        assert_eq!(
            classify("flag", &node("can_be_update: false")),
            NodeClass::FieldDescriptor
        );
    }

    #[test]
    fn test_aliases_alone_do_not_make_a_descriptor() {
        // `desc` and `choices` are extraction aliases, not descriptor markers
        assert_eq!(
            classify("server", &node("desc: x\nchoices: [a]")),
            NodeClass::Container
        );
    }

    #[test]
    fn test_containers_and_leaves() {
        assert_eq!(classify("server", &node("host: a\nport: 1")), NodeClass::Container);
        assert_eq!(classify("ports", &node("[1, 2]")), NodeClass::Container);
        assert_eq!(classify("port", &node("8080")), NodeClass::Leaf);
        assert_eq!(classify("name", &node("web")), NodeClass::Leaf);
        assert_eq!(classify("debug", &node("false")), NodeClass::Leaf);
    }

    #[test]
    fn test_skipped_nodes() {
        assert_eq!(classify("missing", &node("null")), NodeClass::Skip);
        assert_eq!(classify("", &node("42")), NodeClass::Skip);
    }
}
