//! # Field Set Validator
//!
//! Advisory checks over a parsed catalogue. Warnings are reported alongside
//! the result and never block persistence.

use crate::parser::types::{FieldDescriptor, FieldType, ParsedConfiguration};
use std::collections::BTreeMap;

/// Collect warnings for every field, ordered by path
#[must_use]
pub fn validate(parsed: &ParsedConfiguration) -> Vec<String> {
    let mut warnings = Vec::new();

    // `fields` is a BTreeMap so iteration is already path-ordered
    for (path, field) in &parsed.fields {
        if field.required && field.default_value.is_none() {
            warnings.push(format!("field '{path}' is required but has no default value"));
        }
        if field.field_type == FieldType::Array && field.options.is_empty() {
            warnings.push(format!("field '{path}' is of array type but defines no options"));
        }
    }

    warnings
}

/// Bucket fields by group label, each bucket sorted by order then path
#[must_use]
pub fn group_fields(parsed: &ParsedConfiguration) -> BTreeMap<String, Vec<FieldDescriptor>> {
    let mut groups: BTreeMap<String, Vec<FieldDescriptor>> = BTreeMap::new();

    for field in parsed.fields_in_order() {
        groups
            .entry(field.group_or_default().to_string())
            .or_default()
            .push(field.clone());
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn field(path: &str, order: i64) -> FieldDescriptor {
        FieldDescriptor::new(path, order)
    }

    fn parsed(fields: Vec<FieldDescriptor>) -> ParsedConfiguration {
        ParsedConfiguration {
            fields: fields.into_iter().map(|f| (f.path.clone(), f)).collect(),
            ..ParsedConfiguration::default()
        }
    }

    #[test]
    fn test_required_without_default() {
        let mut token = field("auth.token", 0);
        token.required = true;
        let warnings = validate(&parsed(vec![token]));
        assert_eq!(
            warnings,
            vec!["field 'auth.token' is required but has no default value".to_string()]
        );
    }

    #[test]
    fn test_required_with_default_is_clean() {
        let mut port = field("port", 0);
        port.required = true;
        port.default_value = Some(json!(80));
        assert!(validate(&parsed(vec![port])).is_empty());
    }

    #[test]
    fn test_array_without_options() {
        let mut zones = field("zones", 0);
        zones.field_type = FieldType::Array;
        let mut modes = field("modes", 1);
        modes.field_type = FieldType::Array;
        modes.options = vec![json!("a")];

        let warnings = validate(&parsed(vec![zones, modes]));
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("'zones'"));
    }

    #[test]
    fn test_warnings_sorted_by_path() {
        let mut b = field("b", 0);
        b.required = true;
        let mut a = field("a", 1);
        a.required = true;
        a.field_type = FieldType::Array;

        let warnings = validate(&parsed(vec![b, a]));
        assert_eq!(warnings.len(), 3);
        assert!(warnings[0].starts_with("field 'a'"));
        assert!(warnings[1].starts_with("field 'a'"));
        assert!(warnings[2].starts_with("field 'b'"));
    }

    #[test]
    fn test_group_fields_uses_default_bucket() {
        let mut host = field("db.host", 2);
        host.group = "database".into();
        let mut port = field("db.port", 1);
        port.group = "database".into();
        let name = field("name", 0);

        let groups = group_fields(&parsed(vec![host, port, name]));
        assert_eq!(groups.len(), 2);
        let paths: Vec<&str> = groups["database"].iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["db.port", "db.host"]);
        assert_eq!(groups["default"][0].path, "name");
    }
}
