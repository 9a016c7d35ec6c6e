//! Regex scan for `identifier = numeric-literal` assignments.

use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

use crate::domain::models::{ExtractedParameters, ParameterRecord};

static NUMERIC_ASSIGNMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([A-Za-z_][A-Za-z0-9_]*)\s*=\s*(-?\d+(?:\.\d+)?(?:[eE][-+]?\d+)?)")
        .expect("numeric assignment pattern is valid")
});

/// Map every `name = number` assignment to its literal text.
///
/// Later assignments to the same name overwrite earlier ones. String and
/// boolean literals are ignored. Never fails; no match yields an empty map.
pub fn extract_numeric_assignments(code: &str) -> BTreeMap<String, String> {
    let mut found = BTreeMap::new();
    for caps in NUMERIC_ASSIGNMENT.captures_iter(code) {
        // `a == 1` would otherwise match through the second `=`.
        let start = caps.get(0).map_or(0, |m| m.start());
        let eq_pos = caps.get(1).map_or(start, |m| m.end());
        let preceded_by_operator = code[..start]
            .chars()
            .next_back()
            .is_some_and(|c| matches!(c, '=' | '!' | '<' | '>'));
        let doubled = code[eq_pos..].trim_start().starts_with("==");
        // The literal must end the token: `5abc` and `1.5.2` are not numbers.
        let end = caps.get(0).map_or(start, |m| m.end());
        let runs_on = code[end..]
            .chars()
            .next()
            .is_some_and(|c| c.is_alphanumeric() || c == '_' || c == '.');
        if preceded_by_operator || doubled || runs_on {
            continue;
        }
        found.insert(caps[1].to_string(), caps[2].to_string());
    }
    found
}

/// Pattern extraction wrapped as typed records.
pub fn extract(code: &str) -> ExtractedParameters {
    extract_numeric_assignments(code)
        .into_iter()
        .map(|(name, literal)| {
            let record = ParameterRecord::from_literal(name.clone(), literal);
            (name, record)
        })
        .collect()
}
