//! # Configuration Tree
//!
//! Owned, tagged representation of a parsed YAML document.
//!
//! The YAML value tree is converted once into [`ConfigNode`] so the rest of the
//! pipeline matches exhaustively on three shapes instead of inspecting
//! `serde_yaml::Value` (which also carries tags and non-string keys).

use serde_json::{Map, Number, Value};

/// A scalar leaf of the configuration tree
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

/// One node of a configuration document
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigNode {
    /// Key/value entries in document order
    Mapping(Vec<(String, ConfigNode)>),
    Sequence(Vec<ConfigNode>),
    Scalar(Scalar),
}

impl ConfigNode {
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, ConfigNode::Scalar(Scalar::Null))
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigNode::Scalar(Scalar::String(s)) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigNode::Scalar(Scalar::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ConfigNode::Scalar(Scalar::Integer(i)) => Some(*i),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_mapping(&self) -> Option<&[(String, ConfigNode)]> {
        match self {
            ConfigNode::Mapping(entries) => Some(entries),
            _ => None,
        }
    }

    /// Convert to a JSON value for storage in descriptors and mirrors.
    ///
    /// Non-finite floats have no JSON form and become `null`.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            ConfigNode::Mapping(entries) => {
                let map: Map<String, Value> = entries
                    .iter()
                    .map(|(key, value)| (key.clone(), value.to_json()))
                    .collect();
                Value::Object(map)
            }
            ConfigNode::Sequence(items) => {
                Value::Array(items.iter().map(ConfigNode::to_json).collect())
            }
            ConfigNode::Scalar(scalar) => match scalar {
                Scalar::String(s) => Value::String(s.clone()),
                Scalar::Integer(i) => Value::Number((*i).into()),
                Scalar::Float(f) => Number::from_f64(*f).map_or(Value::Null, Value::Number),
                Scalar::Bool(b) => Value::Bool(*b),
                Scalar::Null => Value::Null,
            },
        }
    }
}

impl From<serde_yaml::Value> for ConfigNode {
    fn from(value: serde_yaml::Value) -> Self {
        match value {
            serde_yaml::Value::Null => ConfigNode::Scalar(Scalar::Null),
            serde_yaml::Value::Bool(b) => ConfigNode::Scalar(Scalar::Bool(b)),
            serde_yaml::Value::Number(n) => ConfigNode::Scalar(number_scalar(&n)),
            serde_yaml::Value::String(s) => ConfigNode::Scalar(Scalar::String(s)),
            serde_yaml::Value::Sequence(items) => {
                ConfigNode::Sequence(items.into_iter().map(ConfigNode::from).collect())
            }
            serde_yaml::Value::Mapping(map) => ConfigNode::Mapping(
                map.into_iter()
                    .map(|(key, value)| (key_text(&key), ConfigNode::from(value)))
                    .collect(),
            ),
            serde_yaml::Value::Tagged(tagged) => ConfigNode::from(tagged.value),
        }
    }
}

fn number_scalar(n: &serde_yaml::Number) -> Scalar {
    if let Some(i) = n.as_i64() {
        Scalar::Integer(i)
    } else {
        // u64 above i64::MAX and real numbers both land here
        n.as_f64().map_or(Scalar::Null, Scalar::Float)
    }
}

/// Render a mapping key as text. YAML allows any node as a key; scalars keep
/// their literal form and anything else is re-serialized inline.
fn key_text(key: &serde_yaml::Value) -> String {
    match key {
        serde_yaml::Value::String(s) => s.clone(),
        serde_yaml::Value::Number(n) => n.to_string(),
        serde_yaml::Value::Bool(b) => b.to_string(),
        serde_yaml::Value::Null => "null".to_string(),
        serde_yaml::Value::Tagged(tagged) => key_text(&tagged.value),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim().to_string())
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn node(yaml: &str) -> ConfigNode {
        ConfigNode::from(serde_yaml::from_str::<serde_yaml::Value>(yaml).unwrap())
    }

    #[test]
    fn test_mapping_preserves_document_order() {
        let tree = node("b: 1\na: 2\nc: 3\n");
        let keys: Vec<&str> = tree
            .as_mapping()
            .unwrap()
            .iter()
            .map(|(k, _)| k.as_str())
            .collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_scalar_shapes() {
        assert_eq!(node("42"), ConfigNode::Scalar(Scalar::Integer(42)));
        assert_eq!(node("1.5"), ConfigNode::Scalar(Scalar::Float(1.5)));
        assert_eq!(node("true"), ConfigNode::Scalar(Scalar::Bool(true)));
        assert_eq!(node("~"), ConfigNode::Scalar(Scalar::Null));
        assert_eq!(
            node("\"42\""),
            ConfigNode::Scalar(Scalar::String("42".to_string()))
        );
    }

    #[test]
    fn test_non_string_keys_are_rendered() {
        let tree = node("1: one\ntrue: yes\n");
        let keys: Vec<&str> = tree
            .as_mapping()
            .unwrap()
            .iter()
            .map(|(k, _)| k.as_str())
            .collect();
        assert_eq!(keys, vec!["1", "true"]);
    }

    #[test]
    fn test_tags_are_unwrapped() {
        let tree = node("!custom {a: b}");
        assert_eq!(
            tree,
            ConfigNode::Mapping(vec![(
                "a".to_string(),
                ConfigNode::Scalar(Scalar::String("b".to_string()))
            )])
        );
    }

    #[test]
    fn test_to_json() {
        let tree = node("name: web\nports: [80, 443]\ntls: {enabled: false}\nratio: 0.5\nnothing: null\n");
        assert_eq!(
            tree.to_json(),
            json!({
                "name": "web",
                "ports": [80, 443],
                "tls": {"enabled": false},
                "ratio": 0.5,
                "nothing": null
            })
        );
    }
}
