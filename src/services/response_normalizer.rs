//! Coerce raw model text into a JSON object.
//!
//! The chain is: strip fences, bound the object, strict parse, then the repair
//! chain followed by exactly one more parse. Nested JSON-in-string fields are
//! unwrapped afterwards.

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use crate::domain::HyperError;
use crate::services::json_repair;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    #[error("no JSON object found in response")]
    NoJsonObject,

    #[error("response is not valid JSON after repairs: {error}")]
    Unparseable { error: String },

    #[error("top-level JSON value is not an object")]
    NotAnObject,
}

impl NormalizeError {
    /// Map into the domain error, keeping a preview of the offending text.
    pub fn into_parse_failure(self, raw: &str) -> HyperError {
        HyperError::parse_failure(self.to_string(), raw)
    }
}

/// A single text-to-text repair step.
#[derive(Debug, Clone, Copy)]
pub struct Repair {
    pub name: &'static str,
    pub apply: fn(&str) -> String,
}

/// Repairs applied, in order, when the strict parse fails.
pub const DEFAULT_REPAIRS: [Repair; 2] = [
    Repair {
        name: "single_to_double_quotes",
        apply: json_repair::single_to_double_quotes,
    },
    Repair {
        name: "escape_embedded_quotes",
        apply: json_repair::escape_embedded_quotes,
    },
];

/// Response normalizer holding its repair chain.
#[derive(Debug, Clone)]
pub struct ResponseNormalizer {
    repairs: Vec<Repair>,
}

impl Default for ResponseNormalizer {
    fn default() -> Self {
        Self {
            repairs: DEFAULT_REPAIRS.to_vec(),
        }
    }
}

impl ResponseNormalizer {
    pub fn new(repairs: Vec<Repair>) -> Self {
        Self { repairs }
    }

    /// Normalize raw model output into a JSON object.
    pub fn normalize(&self, raw: &str) -> Result<Map<String, Value>, NormalizeError> {
        let stripped = json_repair::strip_fences(raw);
        let region =
            json_repair::locate_json_region(&stripped).ok_or(NormalizeError::NoJsonObject)?;

        let mut object = self.parse_object(region)?;
        self.unwrap_nested_fields(&mut object);
        Ok(object)
    }

    /// Strict parse, then the repair chain and a single retry.
    fn parse_with_repairs(&self, text: &str) -> Result<Value, NormalizeError> {
        match serde_json::from_str::<Value>(text) {
            Ok(value) => Ok(value),
            Err(first) => {
                debug!(error = %first, "strict parse failed, applying repairs");
                let repaired = self
                    .repairs
                    .iter()
                    .fold(text.to_string(), |acc, repair| (repair.apply)(&acc));
                serde_json::from_str::<Value>(&repaired).map_err(|e| {
                    NormalizeError::Unparseable {
                        error: e.to_string(),
                    }
                })
            }
        }
    }

    fn parse_object(&self, text: &str) -> Result<Map<String, Value>, NormalizeError> {
        match self.parse_with_repairs(text)? {
            Value::Object(map) => Ok(map),
            _ => Err(NormalizeError::NotAnObject),
        }
    }

    /// Replace string fields holding a JSON object with the parsed value.
    ///
    /// When the nested object carries the same key, only that inner value is
    /// kept; otherwise the whole nested object replaces the string.
    pub fn unwrap_nested_fields(&self, object: &mut Map<String, Value>) {
        for (key, value) in object.iter_mut() {
            let Value::String(text) = value else {
                continue;
            };
            let trimmed = text.trim();
            if !trimmed.starts_with('{') {
                continue;
            }
            if let Ok(mut nested) = self.parse_object(trimmed) {
                *value = nested
                    .remove(key)
                    .unwrap_or_else(|| Value::Object(nested));
            }
        }
    }
}

/// Normalize with the default repair chain, mapping failures to `ParseFailure`.
pub fn normalize(raw: &str) -> Result<Map<String, Value>, HyperError> {
    ResponseNormalizer::default()
        .normalize(raw)
        .map_err(|e| e.into_parse_failure(raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn norm(raw: &str) -> Result<Map<String, Value>, NormalizeError> {
        ResponseNormalizer::default().normalize(raw)
    }

    #[test]
    fn test_fenced_object() {
        let map = norm("```json\n{\"a\":1}\n```").unwrap();
        assert_eq!(Value::Object(map), json!({"a": 1}));
    }

    #[test]
    fn test_single_quoted_object_in_prose() {
        let map = norm("Here's the answer: {'importance': 'x'}").unwrap();
        assert_eq!(Value::Object(map), json!({"importance": "x"}));
    }

    #[test]
    fn test_embedded_quotes_repaired() {
        let map = norm(r#"{"definition": "the so-called "step size" of SGD"}"#).unwrap();
        assert_eq!(map["definition"], "the so-called \"step size\" of SGD");
    }

    #[test]
    fn test_trailing_escaped_backslash_survives_the_repair_chain() {
        let map = norm(r#"{"a": "C:\\", 'b': 'x'}"#).unwrap();
        assert_eq!(Value::Object(map), json!({"a": "C:\\", "b": "x"}));
    }

    #[test]
    fn test_nested_field_same_key_unwrapped() {
        let raw = r#"{"importance": "{\"importance\": \"very high\"}", "other": "plain"}"#;
        let map = norm(raw).unwrap();
        assert_eq!(map["importance"], "very high");
        assert_eq!(map["other"], "plain");
    }

    #[test]
    fn test_nested_field_without_same_key_kept_whole() {
        let raw = r#"{"details": "{\"a\": 1, \"b\": 2}"}"#;
        let map = norm(raw).unwrap();
        assert_eq!(map["details"], json!({"a": 1, "b": 2}));
    }

    #[test]
    fn test_nested_field_that_does_not_parse_is_left_alone() {
        let raw = r#"{"note": "{not json at all"}"#;
        let map = norm(raw).unwrap();
        assert_eq!(map["note"], "{not json at all");
    }

    #[test]
    fn test_no_object() {
        assert_eq!(norm("I cannot help with that."), Err(NormalizeError::NoJsonObject));
        assert_eq!(norm(""), Err(NormalizeError::NoJsonObject));
    }

    #[test]
    fn test_unparseable() {
        let err = norm("{this is : not [ json").unwrap_err();
        assert!(matches!(err, NormalizeError::Unparseable { .. }), "{err:?}");
    }

    #[test]
    fn test_not_an_object() {
        let normalizer = ResponseNormalizer::default();
        assert_eq!(
            normalizer.parse_object("[1, 2, 3]"),
            Err(NormalizeError::NotAnObject)
        );
    }

    #[test]
    fn test_empty_repair_chain_fails_on_single_quotes() {
        let normalizer = ResponseNormalizer::new(Vec::new());
        let err = normalizer.normalize("{'a': 'b'}").unwrap_err();
        assert!(matches!(err, NormalizeError::Unparseable { .. }));
    }

    #[test]
    fn test_domain_mapping_keeps_preview() {
        match normalize("nothing here") {
            Err(HyperError::ParseFailure { raw, .. }) => assert_eq!(raw, "nothing here"),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
