//! Key normalization for structured pillar, grain and state-top data.
//!
//! Manifests can carry mapping keys that are not strings: numbers, booleans,
//! null, or symbol-tagged scalars such as `!ruby/symbol name`. Salt only
//! understands string keys, so every key is rewritten to its string form
//! before anything is serialized.

use serde_yaml::{Mapping, Value};

/// Structured data whose mapping keys are strings at every depth.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedData(Value);

impl NormalizedData {
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Top-level entries when the data is a mapping.
    pub fn entries(&self) -> Option<impl Iterator<Item = (&str, &Value)>> {
        let mapping = self.0.as_mapping()?;
        Some(
            mapping
                .iter()
                .filter_map(|(key, value)| key.as_str().map(|key| (key, value))),
        )
    }
}

/// Rewrite every mapping key in `data` to a string.
///
/// Values and sequence order are preserved. When two keys collapse to the
/// same string (e.g. `1` and `"1"`), the later entry wins.
pub fn normalize(data: &Value) -> NormalizedData {
    NormalizedData(normalize_value(data))
}

fn normalize_value(value: &Value) -> Value {
    match value {
        Value::Mapping(mapping) => {
            let mut normalized = Mapping::with_capacity(mapping.len());
            for (key, value) in mapping {
                normalized.insert(Value::String(key_to_string(key)), normalize_value(value));
            }
            Value::Mapping(normalized)
        }
        Value::Sequence(items) => Value::Sequence(items.iter().map(normalize_value).collect()),
        Value::Tagged(tagged) => {
            let mut tagged = tagged.clone();
            tagged.value = normalize_value(&tagged.value);
            Value::Tagged(tagged)
        }
        scalar => scalar.clone(),
    }
}

/// String representation of a mapping key.
pub fn key_to_string(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        // Symbols and other tagged keys lose their tag.
        Value::Tagged(tagged) => key_to_string(&tagged.value),
        Value::Sequence(items) => {
            let parts: Vec<String> = items.iter().map(key_to_string).collect();
            format!("[{}]", parts.join(", "))
        }
        Value::Mapping(mapping) => {
            let parts: Vec<String> = mapping
                .iter()
                .map(|(k, v)| format!("{}: {}", key_to_string(k), key_to_string(v)))
                .collect();
            format!("{{{}}}", parts.join(", "))
        }
    }
}
