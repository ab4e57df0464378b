//! # Types
//!
//! Field catalogue produced by one parse pass.

use crate::constants::DEFAULT_GROUP;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Semantic type of a field
///
/// The five inferred types have their own variants. A type declared in the
/// document that is none of them is kept verbatim in `Declared`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    #[default]
    String,
    Number,
    Boolean,
    Array,
    Object,
    Declared(String),
}

impl FieldType {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::Array => "array",
            FieldType::Object => "object",
            FieldType::Declared(name) => name,
        }
    }
}

impl From<&str> for FieldType {
    fn from(value: &str) -> Self {
        match value {
            "string" => FieldType::String,
            "number" => FieldType::Number,
            "boolean" => FieldType::Boolean,
            "array" => FieldType::Array,
            "object" => FieldType::Object,
            other => FieldType::Declared(other.to_string()),
        }
    }
}

impl From<String> for FieldType {
    fn from(value: String) -> Self {
        FieldType::from(value.as_str())
    }
}

impl From<FieldType> for String {
    fn from(value: FieldType) -> Self {
        match value {
            FieldType::Declared(name) => name,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized description of one addressable configuration parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    /// Dotted address, unique within one parse
    pub path: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub default_value: Option<Value>,
    pub description: String,
    pub required: bool,
    pub hidden: bool,
    /// Free-form expression, never evaluated here
    pub hidden_condition: String,
    pub validation_rules: Map<String, Value>,
    pub options: Vec<Value>,
    /// Empty means [`DEFAULT_GROUP`]
    pub group: String,
    pub order: i64,
    /// Keys that are not descriptor properties, passed through untouched
    pub metadata: Map<String, Value>,
}

impl FieldDescriptor {
    /// Descriptor with every attribute at its default
    #[must_use]
    pub fn new(path: impl Into<String>, order: i64) -> Self {
        Self {
            path: path.into(),
            field_type: FieldType::String,
            default_value: None,
            description: String::new(),
            required: false,
            hidden: false,
            hidden_condition: String::new(),
            validation_rules: Map::new(),
            options: Vec::new(),
            group: String::new(),
            order,
            metadata: Map::new(),
        }
    }

    #[must_use]
    pub fn group_or_default(&self) -> &str {
        if self.group.is_empty() {
            DEFAULT_GROUP
        } else {
            &self.group
        }
    }

    /// Boolean passthrough key such as `can_be_update` or `optional`
    #[must_use]
    pub fn metadata_bool(&self, key: &str) -> Option<bool> {
        self.metadata.get(key).and_then(Value::as_bool)
    }
}

/// Result of one extraction pass over a configuration document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedConfiguration {
    pub fields: BTreeMap<String, FieldDescriptor>,
    pub groups: BTreeMap<String, String>,
    pub metadata: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
}

impl ParsedConfiguration {
    /// Fields in extraction order, ties broken by path
    #[must_use]
    pub fn fields_in_order(&self) -> Vec<&FieldDescriptor> {
        let mut fields: Vec<&FieldDescriptor> = self.fields.values().collect();
        fields.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.path.cmp(&b.path)));
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_type_round_trips_declared_names() {
        assert_eq!(FieldType::from("number"), FieldType::Number);
        assert_eq!(
            FieldType::from("password"),
            FieldType::Declared("password".to_string())
        );
        // Matching is exact so a capitalized declaration is kept as written
        assert_eq!(
            FieldType::from("String"),
            FieldType::Declared("String".to_string())
        );
        assert_eq!(String::from(FieldType::Declared("ip".into())), "ip");
    }

    #[test]
    fn test_descriptor_serializes_camel_case() {
        let mut field = FieldDescriptor::new("server.port", 3);
        field.field_type = FieldType::Number;
        field.default_value = Some(json!(8080));
        let value = serde_json::to_value(&field).unwrap();
        assert_eq!(value["type"], "number");
        assert_eq!(value["defaultValue"], 8080);
        assert_eq!(value["hiddenCondition"], "");
        assert_eq!(value["validationRules"], json!({}));
        assert_eq!(value["order"], 3);
    }

    #[test]
    fn test_group_or_default() {
        let mut field = FieldDescriptor::new("a", 0);
        assert_eq!(field.group_or_default(), "default");
        field.group = "network".to_string();
        assert_eq!(field.group_or_default(), "network");
    }
}
