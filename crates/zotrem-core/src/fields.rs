//! Item field roles
//!
//! Every field of an item is classified before the attribute walk. Fields in
//! [`FIELD_ROLES`] get their listed role; anything else is generic and
//! becomes a plain attribute card.

use serde_json::Value;

/// How an item field is turned into cards
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRole {
    /// Not mirrored
    Skip,
    /// One card per creator role, referencing creator nodes
    Creators,
    /// One `Tags` card referencing tag nodes
    Tags,
    /// One `Collections` card referencing collection nodes
    Collections,
    /// One card holding the value as text
    Generic,
}

/// Fields with a fixed role
pub const FIELD_ROLES: &[(&str, FieldRole)] = &[
    ("title", FieldRole::Skip),
    ("key", FieldRole::Skip),
    ("version", FieldRole::Skip),
    ("linkMode", FieldRole::Skip),
    ("dateAdded", FieldRole::Skip),
    ("dateModified", FieldRole::Skip),
    ("accessDate", FieldRole::Skip),
    ("creators", FieldRole::Creators),
    ("tags", FieldRole::Tags),
    ("collections", FieldRole::Collections),
];

/// Role of a field, taking its value into account
///
/// Empty strings, empty arrays, nulls and nested objects are skipped
/// whatever the field.
pub fn classify(key: &str, value: &Value) -> FieldRole {
    let role = FIELD_ROLES
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, role)| *role)
        .unwrap_or(FieldRole::Generic);

    if role == FieldRole::Skip || is_blank(value) {
        return FieldRole::Skip;
    }
    role
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null | Value::Object(_) => true,
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// `itemType` -> `ItemType`
pub fn capitalize(input: &str) -> String {
    let mut chars = input.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Text of a generic field; arrays are joined with `, `
pub fn render_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(values) => {
            let parts: Vec<String> = values.iter().filter_map(render_value).collect();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join(", "))
            }
        }
        Value::Null | Value::Object(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_denylist() {
        for key in [
            "title",
            "key",
            "version",
            "linkMode",
            "dateAdded",
            "dateModified",
            "accessDate",
        ] {
            assert_eq!(classify(key, &json!("x")), FieldRole::Skip, "{}", key);
        }
    }

    #[test]
    fn test_special_fields() {
        assert_eq!(
            classify("creators", &json!([{"name": "X", "creatorType": "author"}])),
            FieldRole::Creators
        );
        assert_eq!(classify("tags", &json!([{"tag": "a"}])), FieldRole::Tags);
        assert_eq!(classify("collections", &json!(["K"])), FieldRole::Collections);
        assert_eq!(classify("publisher", &json!("Penguin")), FieldRole::Generic);
    }

    #[test]
    fn test_blank_values_skipped() {
        assert_eq!(classify("abstractNote", &json!("")), FieldRole::Skip);
        assert_eq!(classify("tags", &json!([])), FieldRole::Skip);
        assert_eq!(classify("relations", &json!({})), FieldRole::Skip);
        assert_eq!(classify("relations", &json!({"dc:replaces": "x"})), FieldRole::Skip);
        assert_eq!(classify("extra", &Value::Null), FieldRole::Skip);
        assert_eq!(classify("numPages", &json!(0)), FieldRole::Generic);
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("itemType"), "ItemType");
        assert_eq!(capitalize("author"), "Author");
        assert_eq!(capitalize("élan"), "Élan");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_render_value() {
        assert_eq!(render_value(&json!("book")).as_deref(), Some("book"));
        assert_eq!(render_value(&json!(42)).as_deref(), Some("42"));
        assert_eq!(render_value(&json!(true)).as_deref(), Some("true"));
        assert_eq!(render_value(&json!(["a", 1])).as_deref(), Some("a, 1"));
        assert_eq!(render_value(&json!([{}])), None);
        assert_eq!(render_value(&json!({"a": 1})), None);
    }
}
