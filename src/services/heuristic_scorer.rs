//! Rule-weighted hyperparameter detection.
//!
//! Every `identifier = expression` assignment is turned into an eight-element
//! feature vector and scored with a fixed linear rule. The weights and the
//! threshold are constants, not learned parameters; changing them changes
//! which assignments are reported.

use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, trace};

use crate::domain::models::{
    parameter::{is_decimal_literal, is_integer_literal},
    ExtractedParameters, InferredType, ParameterRecord,
};

/// Weights, in feature order.
pub const FEATURE_WEIGHTS: [f64; 8] = [0.6, 0.8, 0.9, 0.7, 0.5, -0.5, -0.4, -0.2];

/// An assignment is accepted when its score is strictly greater than this.
pub const ACCEPT_THRESHOLD: f64 = 0.7;

/// Lines on each side of an assignment that form its context window.
const CONTEXT_LINES: usize = 2;

const HYPERPARAMETER_NAME_KEYWORDS: &[&str] = &[
    "learning_rate", "lr", "rate", "batch", "epoch", "dropout", "momentum", "decay",
    "weight", "hidden", "units", "layer", "filter", "kernel", "stride", "pool",
    "optimizer", "activation", "loss", "alpha", "beta", "gamma", "lambda", "epsilon",
    "patience", "step", "warmup", "size", "depth", "width", "heads", "dim", "embed",
    "seed", "iter", "neighbors", "estimators", "temperature", "regulariz", "penalty",
    "threshold", "factor",
];

const ML_CONTEXT_KEYWORDS: &[&str] = &[
    "model", "train", "fit", "compile", "optimizer", "layer", "keras", "torch",
    "tensorflow", "sklearn", "neural", "network", "epoch", "loss", "dense", "conv",
    "dataset", "gradient", "predict",
];

const HYPERPARAMETER_CONTEXT_KEYWORDS: &[&str] =
    &["hyperparameter", "hyper-parameter", "hyper parameter", "hparam"];

static LAYER_CONSTRUCTOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(Dense|Conv2D)\s*\(\s*(?:(?:units|filters)\s*=\s*)?(\d+)")
        .expect("layer constructor pattern is valid")
});

/// Feature vector for one assignment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Features {
    pub is_numeric: bool,
    pub is_sub_unit_decimal: bool,
    pub name_has_keyword: bool,
    pub context_has_ml_keyword: bool,
    pub context_mentions_hyperparameter: bool,
    pub name_is_all_caps: bool,
    pub name_starts_with_underscore: bool,
    /// Byte offset of the assignment divided by the text length, in [0, 1].
    pub position: f64,
}

impl Features {
    pub fn as_vector(&self) -> [f64; 8] {
        let flag = |b: bool| if b { 1.0 } else { 0.0 };
        [
            flag(self.is_numeric),
            flag(self.is_sub_unit_decimal),
            flag(self.name_has_keyword),
            flag(self.context_has_ml_keyword),
            flag(self.context_mentions_hyperparameter),
            flag(self.name_is_all_caps),
            flag(self.name_starts_with_underscore),
            self.position,
        ]
    }

    /// Dot product with [`FEATURE_WEIGHTS`].
    pub fn score(&self) -> f64 {
        self.as_vector()
            .iter()
            .zip(FEATURE_WEIGHTS.iter())
            .map(|(x, w)| x * w)
            .sum()
    }
}

/// An assignment together with its features and score.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredAssignment {
    pub name: String,
    pub value: String,
    pub features: Features,
    pub score: f64,
}

impl ScoredAssignment {
    pub fn accepted(&self) -> bool {
        self.score > ACCEPT_THRESHOLD
    }
}

/// Score every assignment in `code`, in source order.
pub fn score_assignments(code: &str) -> Vec<ScoredAssignment> {
    let line_starts = line_starts(code);
    let lines: Vec<&str> = code.lines().collect();
    let length = code.len().max(1) as f64;

    find_assignments(code)
        .into_iter()
        .map(|Assignment { start, name, value }| {
            let line = line_index(&line_starts, start);
            let context = context_window(&lines, line).to_lowercase();
            let lower_name = name.to_lowercase();

            let is_numeric = is_integer_literal(value) || is_decimal_literal(value);
            let is_sub_unit_decimal = is_decimal_literal(value)
                && value.parse::<f64>().is_ok_and(|v| v > 0.0 && v < 1.0);
            let features = Features {
                is_numeric,
                is_sub_unit_decimal,
                name_has_keyword: contains_any(&lower_name, HYPERPARAMETER_NAME_KEYWORDS),
                context_has_ml_keyword: contains_any(&context, ML_CONTEXT_KEYWORDS),
                context_mentions_hyperparameter: contains_any(
                    &context,
                    HYPERPARAMETER_CONTEXT_KEYWORDS,
                ),
                name_is_all_caps: name.chars().any(char::is_alphabetic)
                    && !name.chars().any(char::is_lowercase),
                name_starts_with_underscore: name.starts_with('_'),
                position: start as f64 / length,
            };
            let score = features.score();
            trace!(name, value, score, "scored assignment");

            ScoredAssignment {
                name: name.to_string(),
                value: value.to_string(),
                features,
                score,
            }
        })
        .collect()
}

/// One `identifier = expression` site; `start` is the identifier's byte offset.
struct Assignment<'a> {
    start: usize,
    name: &'a str,
    value: &'a str,
}

/// Every assignment outside string literals and comments, in source order.
///
/// Scanning resumes right after each `=`, so keyword arguments nested inside
/// an assigned call are found as assignments of their own.
fn find_assignments(code: &str) -> Vec<Assignment<'_>> {
    let bytes = code.as_bytes();
    let mut found = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'"' | b'\'' => i = skip_string(bytes, i),
            b'#' => i = line_end(bytes, i),
            b'=' => {
                found.extend(assignment_at(code, i));
                i += 1;
            }
            _ => i += 1,
        }
    }
    found
}

fn assignment_at(code: &str, eq: usize) -> Option<Assignment<'_>> {
    let bytes = code.as_bytes();
    // `==`, `<=`, `+=`, `:=` and friends are comparisons or compound assignments.
    if bytes.get(eq + 1) == Some(&b'=') {
        return None;
    }
    if eq > 0
        && matches!(
            bytes[eq - 1],
            b'=' | b'!' | b'<' | b'>' | b'+' | b'-' | b'*' | b'/' | b'%' | b'&' | b'|' | b'^'
                | b':' | b'@'
        )
    {
        return None;
    }

    let before = code[..eq].trim_end_matches(|c: char| c == ' ' || c == '\t');
    let name_len = before
        .bytes()
        .rev()
        .take_while(|b| b.is_ascii_alphanumeric() || *b == b'_')
        .count();
    let start = before.len() - name_len;
    let name = &before[start..];
    if name.is_empty() || name.as_bytes()[0].is_ascii_digit() {
        return None;
    }

    let value = expression_at(code, eq + 1).trim();
    if value.is_empty() {
        return None;
    }
    Some(Assignment { start, name, value })
}

/// The expression starting at `from`.
///
/// It ends at a newline or `#`, or at a `,`, `;` or unbalanced closing bracket
/// outside any nesting. Quoted strings are taken whole.
fn expression_at(code: &str, from: usize) -> &str {
    let bytes = code.as_bytes();
    let mut depth = 0usize;
    let mut i = from;
    while i < bytes.len() {
        match bytes[i] {
            b'\n' | b'#' => break,
            b',' | b';' if depth == 0 => break,
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' => {
                if depth == 0 {
                    break;
                }
                depth -= 1;
            }
            b'"' | b'\'' => {
                i = skip_string(bytes, i);
                continue;
            }
            _ => {}
        }
        i += 1;
    }
    &code[from..i.min(bytes.len())]
}

/// Offset just past the string literal opening at `open`.
///
/// Triple-quoted strings may span lines; an unterminated single-line string
/// stops at the newline.
fn skip_string(bytes: &[u8], open: usize) -> usize {
    let quote = bytes[open];
    let tripled = |at: usize| {
        bytes
            .get(at..at + 3)
            .is_some_and(|run| run.iter().all(|&b| b == quote))
    };
    let triple = tripled(open);
    let mut i = open + if triple { 3 } else { 1 };
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'\n' if !triple => return i,
            b if b == quote && !triple => return i + 1,
            b if b == quote && tripled(i) => return i + 3,
            _ => i += 1,
        }
    }
    bytes.len()
}

fn line_end(bytes: &[u8], from: usize) -> usize {
    bytes[from..]
        .iter()
        .position(|&b| b == b'\n')
        .map_or(bytes.len(), |offset| from + offset)
}

/// Type-coerce an accepted value.
///
/// Quoted values become strings with the quotes removed; otherwise the
/// literal shape decides between int, float, bool and string.
pub fn coerce(name: &str, value: &str) -> ParameterRecord {
    let trimmed = value.trim();
    let bytes = trimmed.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if first == last && (first == b'"' || first == b'\'') {
            let inner = &trimmed[1..trimmed.len() - 1];
            return ParameterRecord::new(name, inner, InferredType::String);
        }
    }
    ParameterRecord::from_literal(name, trimmed)
}

/// Heuristic extraction: accepted assignments plus layer-constructor defaults.
pub fn extract(code: &str) -> ExtractedParameters {
    let mut params = ExtractedParameters::new();

    for assignment in score_assignments(code) {
        if assignment.accepted() {
            let record = coerce(&assignment.name, &assignment.value);
            params.insert(assignment.name, record);
        } else {
            debug!(
                name = %assignment.name,
                score = assignment.score,
                "assignment below hyperparameter threshold"
            );
        }
    }

    inject_layer_defaults(code, &mut params);
    params
}

/// `Dense(n)` → `hidden_units`, `Conv2D(n)` → `filters`, first call of each kind.
fn inject_layer_defaults(code: &str, params: &mut ExtractedParameters) {
    for caps in LAYER_CONSTRUCTOR.captures_iter(code) {
        let key = match &caps[1] {
            "Dense" => "hidden_units",
            _ => "filters",
        };
        if !params.contains_key(key) {
            debug!(key, value = &caps[2], "injecting layer constructor default");
            params.insert(
                key.to_string(),
                ParameterRecord::new(key, &caps[2], InferredType::Int),
            );
        }
    }
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

fn line_starts(code: &str) -> Vec<usize> {
    std::iter::once(0)
        .chain(code.match_indices('\n').map(|(i, _)| i + 1))
        .collect()
}

fn line_index(line_starts: &[usize], offset: usize) -> usize {
    match line_starts.binary_search(&offset) {
        Ok(idx) => idx,
        Err(idx) => idx.saturating_sub(1),
    }
}

fn context_window(lines: &[&str], line: usize) -> String {
    if lines.is_empty() {
        return String::new();
    }
    let start = line.saturating_sub(CONTEXT_LINES);
    let end = (line + CONTEXT_LINES + 1).min(lines.len());
    lines[start.min(end)..end].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_weights_are_fixed() {
        assert_eq!(FEATURE_WEIGHTS, [0.6, 0.8, 0.9, 0.7, 0.5, -0.5, -0.4, -0.2]);
        assert!((ACCEPT_THRESHOLD - 0.7).abs() < f64::EPSILON);
    }

    #[test]
    fn test_score_is_dot_product() {
        let features = Features {
            is_numeric: true,
            is_sub_unit_decimal: true,
            name_has_keyword: true,
            context_has_ml_keyword: false,
            context_mentions_hyperparameter: false,
            name_is_all_caps: false,
            name_starts_with_underscore: false,
            position: 0.5,
        };
        assert!((features.score() - (0.6 + 0.8 + 0.9 - 0.1)).abs() < 1e-9);
    }

    #[test]
    fn test_accepts_typical_hyperparameters() {
        let code = "batch_size = 32\nlearning_rate = 0.001";
        let params = extract(code);
        assert_eq!(params["batch_size"].typed_value(), Value::from(32));
        assert_eq!(params["learning_rate"].typed_value(), Value::from(0.001));
    }

    #[test]
    fn test_rejects_plain_variables() {
        let code = "x = 5\ncounter = 0\nname = 'report'\n";
        let params = extract(code);
        assert!(params.is_empty(), "unexpected: {params:?}");
    }

    #[test]
    fn test_threshold_is_strict() {
        // Numeric (0.6) with an ML context (0.7) at position 0 scores 1.3;
        // a non-numeric value with only ML context scores exactly 0.7 at
        // position 0 and must be rejected.
        let scored = score_assignments("model = build()\n");
        assert_eq!(scored.len(), 1);
        assert!((scored[0].score - 0.7).abs() < 1e-9);
        assert!(!scored[0].accepted());
    }

    #[test]
    fn test_penalties_for_constants_and_private_names() {
        let scored = score_assignments("_cache = 10\nMAX = 3");
        let private = scored.iter().find(|s| s.name == "_cache").unwrap();
        assert!(private.features.name_starts_with_underscore);
        assert!(!private.accepted());
        let constant = scored.iter().find(|s| s.name == "MAX").unwrap();
        assert!(constant.features.name_is_all_caps);
        assert!(!constant.accepted());
    }

    #[test]
    fn test_type_coercion() {
        let code = "# hyperparameters\noptimizer = \"adam\"\nuse_bias_dropout = True\nlr = 3e-4\nepochs = 10\n";
        let params = extract(code);
        assert_eq!(params["optimizer"].raw_value(), "adam");
        assert_eq!(params["optimizer"].inferred_type(), InferredType::String);
        assert_eq!(params["use_bias_dropout"].typed_value(), Value::Bool(true));
        assert_eq!(params["lr"].inferred_type(), InferredType::Float);
        assert_eq!(params["epochs"].inferred_type(), InferredType::Int);
    }

    #[test]
    fn test_keyword_arguments_nested_in_calls() {
        let code = "model.compile(optimizer=Adam(learning_rate=0.001), loss='mse')\nmodel.fit(x, y, epochs=10, batch_size=32)";
        let params = extract(code);
        assert_eq!(params["learning_rate"].typed_value(), Value::from(0.001));
        assert_eq!(params["optimizer"].raw_value(), "Adam(learning_rate=0.001)");
        assert_eq!(params["loss"].raw_value(), "mse");
        assert_eq!(params["epochs"].typed_value(), Value::from(10));
        assert_eq!(params["batch_size"].typed_value(), Value::from(32));

        let scored = score_assignments("optimizer = Adam(lr=0.01)");
        let pairs: Vec<(&str, &str)> = scored
            .iter()
            .map(|s| (s.name.as_str(), s.value.as_str()))
            .collect();
        assert_eq!(pairs, vec![("optimizer", "Adam(lr=0.01)"), ("lr", "0.01")]);
    }

    #[test]
    fn test_quoted_values_are_taken_whole() {
        let params = extract("# hyperparameters\nmodel_name = \"resnet, v2\"");
        assert_eq!(params["model_name"].raw_value(), "resnet, v2");
        assert_eq!(params["model_name"].inferred_type(), InferredType::String);

        let scored = score_assignments("tag = 'a#b) c; d', other = 1");
        assert_eq!(scored[0].value, "'a#b) c; d'");
        assert_eq!(scored[1].name, "other");
    }

    #[test]
    fn test_strings_comments_and_operators_are_not_assignments() {
        let code = "label = \"lr=0.5\"  # dropout=0.3\nx += 1\nif a == b: pass\nwalrus := 2\n";
        let names: Vec<String> = score_assignments(code).into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["label".to_string()]);
    }

    #[test]
    fn test_layer_constructor_defaults() {
        let code = "model.add(Dense(128, activation='relu'))\nmodel.add(Conv2D(filters=32, kernel_size=3))";
        let params = extract(code);
        assert_eq!(params["hidden_units"].typed_value(), Value::from(128));
        assert_eq!(params["filters"].typed_value(), Value::from(32));
    }

    #[test]
    fn test_layer_default_does_not_override_explicit_value() {
        let code = "hidden_units = 256\nmodel.add(Dense(64))";
        let params = extract(code);
        assert_eq!(params["hidden_units"].raw_value(), "256");
    }

    #[test]
    fn test_deterministic() {
        let code = "import torch\nlr = 0.01\nmomentum = 0.9\n_seed = 4\nBATCH = 16\n";
        assert_eq!(extract(code), extract(code));
        assert_eq!(score_assignments(code), score_assignments(code));
    }

    #[test]
    fn test_context_window_bounds() {
        let lines = vec!["a", "b", "c", "d", "e", "f"];
        assert_eq!(context_window(&lines, 0), "a\nb\nc");
        assert_eq!(context_window(&lines, 5), "d\ne\nf");
        assert_eq!(context_window(&[], 0), "");
    }
}
