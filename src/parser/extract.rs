//! # Field Extractor
//!
//! Builds [`FieldDescriptor`]s from descriptor mappings and bare leaves.
//!
//! Descriptor keys are resolved through one case-insensitive alias table.
//! A recognised key whose value has the wrong shape is ignored; a key that is
//! not in the table is copied into `metadata` unchanged.

use crate::parser::infer::{infer, infer_json};
use crate::parser::node::ConfigNode;
use crate::parser::types::{FieldDescriptor, FieldType};
use serde_json::Value;

/// Descriptor attribute a key resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attribute {
    Type,
    DefaultValue,
    Description,
    Required,
    Hidden,
    HiddenCondition,
    ValidationRules,
    Options,
    Group,
    Order,
}

/// Lower-cased alias → attribute
static ALIASES: &[(&str, Attribute)] = &[
    ("type", Attribute::Type),
    ("default", Attribute::DefaultValue),
    ("default_value", Attribute::DefaultValue),
    ("description", Attribute::Description),
    ("desc", Attribute::Description),
    ("help", Attribute::Description),
    ("required", Attribute::Required),
    ("mandatory", Attribute::Required),
    // `visible` is a literal synonym, the value is not negated
    ("hidden", Attribute::Hidden),
    ("visible", Attribute::Hidden),
    ("hidden_condition", Attribute::HiddenCondition),
    ("hiden_condition", Attribute::HiddenCondition),
    ("visibility", Attribute::HiddenCondition),
    ("validation", Attribute::ValidationRules),
    ("constraints", Attribute::ValidationRules),
    ("rules", Attribute::ValidationRules),
    ("options", Attribute::Options),
    ("choices", Attribute::Options),
    ("enum", Attribute::Options),
    ("group", Attribute::Group),
    ("category", Attribute::Group),
    ("order", Attribute::Order),
    ("sort", Attribute::Order),
];

fn resolve(key: &str) -> Option<Attribute> {
    let lower = key.to_ascii_lowercase();
    ALIASES
        .iter()
        .find(|(alias, _)| *alias == lower)
        .map(|(_, attribute)| *attribute)
}

/// Build a descriptor from a mapping classified as a field descriptor
#[must_use]
pub fn extract(path: &str, entries: &[(String, ConfigNode)], order: i64) -> FieldDescriptor {
    let mut field = FieldDescriptor::new(path, order);

    for (key, value) in entries {
        let Some(attribute) = resolve(key) else {
            field.metadata.insert(key.clone(), value.to_json());
            continue;
        };

        match attribute {
            Attribute::Type => {
                if let Some(declared) = value.as_str() {
                    field.field_type = FieldType::from(declared);
                }
            }
            Attribute::DefaultValue => {
                field.default_value = default_of(value);
            }
            Attribute::Description => {
                if let Some(text) = value.as_str() {
                    field.description = text.to_string();
                }
            }
            Attribute::Required => {
                if let Some(flag) = value.as_bool() {
                    field.required = flag;
                }
            }
            Attribute::Hidden => {
                if let Some(flag) = value.as_bool() {
                    field.hidden = flag;
                }
            }
            Attribute::HiddenCondition => {
                if let Some(condition) = value.as_str() {
                    field.hidden_condition = condition.to_string();
                }
            }
            Attribute::ValidationRules => {
                if let (ConfigNode::Mapping(_), Value::Object(rules)) = (value, value.to_json()) {
                    field.validation_rules = rules;
                }
            }
            Attribute::Options => {
                if let ConfigNode::Sequence(items) = value {
                    field.options = items.iter().map(ConfigNode::to_json).collect();
                }
            }
            Attribute::Group => {
                if let Some(group) = value.as_str() {
                    field.group = group.to_string();
                }
            }
            Attribute::Order => {
                if let Some(explicit) = value.as_i64() {
                    field.order = explicit;
                }
            }
        }
    }

    // Only the default type is re-derived; any other declaration is trusted
    if field.field_type == FieldType::String {
        if let Some(default) = &field.default_value {
            field.field_type = infer_json(default);
        }
    }

    field
}

/// Build a minimal descriptor from a bare scalar leaf
#[must_use]
pub fn simple(path: &str, value: &ConfigNode, order: i64) -> FieldDescriptor {
    let mut field = FieldDescriptor::new(path, order);
    field.field_type = infer(value);
    field.default_value = default_of(value);
    field
}

/// JSON default for a node; null and non-finite floats have none
fn default_of(value: &ConfigNode) -> Option<Value> {
    Some(value.to_json()).filter(|json| !json.is_null())
}
