//! # Type Inference
//!
//! Maps a value's runtime shape to one of the five field types. Total: any
//! shape without a better match (including null) is a `string`.

use crate::parser::node::{ConfigNode, Scalar};
use crate::parser::types::FieldType;
use serde_json::Value;

#[must_use]
pub fn infer(node: &ConfigNode) -> FieldType {
    match node {
        ConfigNode::Scalar(Scalar::Bool(_)) => FieldType::Boolean,
        ConfigNode::Scalar(Scalar::Integer(_) | Scalar::Float(_)) => FieldType::Number,
        ConfigNode::Scalar(Scalar::String(_) | Scalar::Null) => FieldType::String,
        ConfigNode::Sequence(_) => FieldType::Array,
        ConfigNode::Mapping(_) => FieldType::Object,
    }
}

/// Same classification over a JSON value (descriptor defaults are stored as JSON)
#[must_use]
pub fn infer_json(value: &Value) -> FieldType {
    match value {
        Value::Bool(_) => FieldType::Boolean,
        Value::Number(_) => FieldType::Number,
        Value::String(_) | Value::Null => FieldType::String,
        Value::Array(_) => FieldType::Array,
        Value::Object(_) => FieldType::Object,
    }
}
