//! Extracted hyperparameter records.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Type inferred for an extracted value from its literal shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InferredType {
    Int,
    Float,
    Bool,
    String,
}

impl InferredType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Float => "float",
            Self::Bool => "bool",
            Self::String => "string",
        }
    }

    /// Classify a bare literal (quotes already removed for strings).
    pub fn of_literal(literal: &str) -> Self {
        let trimmed = literal.trim();
        if is_integer_literal(trimmed) {
            Self::Int
        } else if is_decimal_literal(trimmed) {
            Self::Float
        } else if trimmed.eq_ignore_ascii_case("true") || trimmed.eq_ignore_ascii_case("false") {
            Self::Bool
        } else {
            Self::String
        }
    }
}

/// `-?digits`
pub fn is_integer_literal(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Decimal-shaped: `1.5`, `.5`, `1.`, `1e-4`, `-2.5E3`. Integers are not decimals.
pub fn is_decimal_literal(s: &str) -> bool {
    let body = s.strip_prefix('-').unwrap_or(s);
    let (mantissa, exponent) = match body.find(['e', 'E']) {
        Some(idx) => (&body[..idx], Some(&body[idx + 1..])),
        None => (body, None),
    };

    if let Some(exp) = exponent {
        let exp_digits = exp.strip_prefix(['+', '-']).unwrap_or(exp);
        if exp_digits.is_empty() || !exp_digits.bytes().all(|b| b.is_ascii_digit()) {
            return false;
        }
    }

    let (int_part, frac_part) = match mantissa.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (mantissa, None),
    };
    let digits_only = |p: &str| p.bytes().all(|b| b.is_ascii_digit());

    match frac_part {
        Some(frac) => {
            digits_only(int_part) && digits_only(frac) && !(int_part.is_empty() && frac.is_empty())
        }
        None => exponent.is_some() && !int_part.is_empty() && digits_only(int_part),
    }
}

/// A single extracted hyperparameter. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterRecord {
    name: String,
    raw_value: String,
    inferred_type: InferredType,
}

impl ParameterRecord {
    pub fn new(name: impl Into<String>, raw_value: impl Into<String>, inferred_type: InferredType) -> Self {
        Self {
            name: name.into(),
            raw_value: raw_value.into(),
            inferred_type,
        }
    }

    /// Build a record, inferring the type from the literal shape.
    pub fn from_literal(name: impl Into<String>, literal: impl Into<String>) -> Self {
        let literal = literal.into();
        let inferred_type = InferredType::of_literal(&literal);
        Self::new(name, literal, inferred_type)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn raw_value(&self) -> &str {
        &self.raw_value
    }

    pub const fn inferred_type(&self) -> InferredType {
        self.inferred_type
    }

    /// The value as JSON, coerced according to the inferred type.
    pub fn typed_value(&self) -> Value {
        let raw = self.raw_value.trim();
        match self.inferred_type {
            InferredType::Int => raw
                .parse::<i64>()
                .map(Value::from)
                .or_else(|_| raw.parse::<f64>().map(Value::from))
                .unwrap_or_else(|_| Value::String(self.raw_value.clone())),
            InferredType::Float => raw
                .parse::<f64>()
                .map(Value::from)
                .unwrap_or_else(|_| Value::String(self.raw_value.clone())),
            InferredType::Bool => Value::Bool(raw.eq_ignore_ascii_case("true")),
            InferredType::String => Value::String(self.raw_value.clone()),
        }
    }
}

/// Extraction result keyed by parameter name.
pub type ExtractedParameters = BTreeMap<String, ParameterRecord>;

/// Flatten extracted parameters into the caller-facing `name -> typed value` object.
pub fn to_value_map(params: &ExtractedParameters) -> serde_json::Map<String, Value> {
    params
        .iter()
        .map(|(name, record)| (name.clone(), record.typed_value()))
        .collect()
}

/// Render an arbitrary JSON value as the text form used in prompts and records.
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
