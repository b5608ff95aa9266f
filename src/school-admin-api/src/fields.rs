use serde_json::{Map, Value};

/// Return the first alias whose value is present and not `null`.
///
/// Aliases are tried in the given order, so callers list the canonical key
/// first and legacy spellings after it.
pub fn first_value<'a>(record: &'a Map<String, Value>, aliases: &[&str]) -> Option<&'a Value> {
    aliases
        .iter()
        .filter_map(|key| record.get(*key))
        .find(|value| !value.is_null())
}

/// Render a scalar as comparison text.
///
/// Strings are taken verbatim (no trimming), numbers and booleans use their
/// JSON spelling so `2` and `"2"` compare equal after normalization.
pub fn text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// First matching alias rendered as text
pub fn first_text(record: &Map<String, Value>, aliases: &[&str]) -> Option<String> {
    first_value(record, aliases).map(text)
}

/// First matching alias rendered as text, or the empty string
pub fn text_or_empty(record: &Map<String, Value>, aliases: &[&str]) -> String {
    first_text(record, aliases).unwrap_or_default()
}

/// First matching alias that is also non-empty once rendered
pub fn first_non_empty(record: &Map<String, Value>, aliases: &[&str]) -> Option<String> {
    first_text(record, aliases).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn as_map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_first_value_respects_alias_order() {
        let record = as_map(json!({ "sessionYear": "2023", "session_year": "2024" }));
        let value = first_text(&record, &["session", "session_year", "sessionYear"]);
        assert_eq!(value.as_deref(), Some("2024"));
    }

    #[test]
    fn test_null_alias_is_skipped() {
        let record = as_map(json!({ "session": null, "sessionYear": "2025" }));
        let value = first_text(&record, &["session", "session_year", "sessionYear"]);
        assert_eq!(value.as_deref(), Some("2025"));
    }

    #[test]
    fn test_numbers_render_as_json_text() {
        let record = as_map(json!({ "term": 2, "ratio": 2.5, "flag": true }));
        assert_eq!(text_or_empty(&record, &["term"]), "2");
        assert_eq!(text_or_empty(&record, &["ratio"]), "2.5");
        assert_eq!(text_or_empty(&record, &["flag"]), "true");
    }

    #[test]
    fn test_missing_aliases_yield_empty() {
        let record = as_map(json!({ "other": "x" }));
        assert_eq!(text_or_empty(&record, &["week"]), "");
        assert_eq!(first_non_empty(&record, &["week"]), None);
    }

    #[test]
    fn test_empty_string_is_still_a_match() {
        let record = as_map(json!({ "class_name": "", "className": "Hifz 1" }));
        assert_eq!(text_or_empty(&record, &["class_name", "className"]), "");
    }
}
