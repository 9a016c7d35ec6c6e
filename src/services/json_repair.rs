//! Pure text repairs for model output that is supposed to be JSON.
//!
//! Each function takes text and returns text; none of them parse. They are
//! composed by [`crate::services::response_normalizer`].

/// Remove a leading fence (optionally followed by a language tag) and a trailing fence.
pub fn strip_fences(text: &str) -> String {
    let trimmed = text.trim();

    let without_open = match trimmed.strip_prefix("```") {
        Some(rest) => {
            let tag_len = rest
                .chars()
                .take_while(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
                .map(char::len_utf8)
                .sum::<usize>();
            &rest[tag_len..]
        }
        None => trimmed,
    };

    let without_close = without_open
        .trim_end()
        .strip_suffix("```")
        .unwrap_or(without_open);

    without_close.trim().to_string()
}

/// Bound the JSON object inside free text.
///
/// With a fence present, the region runs from the first `{` after the opening
/// fence to the closing fence. Otherwise the first balanced object starting at
/// the first `{` is returned, or everything from the first `{` to the last `}`
/// when braces never balance. `None` when there is no `{` at all.
pub fn locate_json_region(text: &str) -> Option<&str> {
    if let Some(fence) = text.find("```") {
        let after_fence = fence + 3;
        if let Some(rel_open) = text[after_fence..].find('{') {
            let open = after_fence + rel_open;
            if let Some(rel_close) = text[open..].find("```") {
                return Some(text[open..open + rel_close].trim());
            }
            return Some(bounded_object(text, open));
        }
    }

    let open = text.find('{')?;
    Some(bounded_object(text, open))
}

fn bounded_object(text: &str, open: usize) -> &str {
    match matching_brace(&text[open..]) {
        Some(end) => &text[open..=open + end],
        None => match text.rfind('}') {
            Some(last) if last > open => &text[open..=last],
            _ => &text[open..],
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Structure,
    DoubleQuoted,
    SingleQuoted,
}

/// Byte offset of the `}` closing the object that starts at offset 0.
///
/// Braces inside single- or double-quoted strings are ignored, as are escaped
/// quote characters.
fn matching_brace(text: &str) -> Option<usize> {
    let mut state = ScanState::Structure;
    let mut depth = 0usize;
    let mut escaped = false;
    let mut prev_significant: Option<char> = None;

    for (idx, c) in text.char_indices() {
        match state {
            ScanState::Structure => match c {
                '{' => depth += 1,
                '}' => {
                    depth = depth.checked_sub(1)?;
                    if depth == 0 {
                        return Some(idx);
                    }
                }
                '"' => state = ScanState::DoubleQuoted,
                '\'' if opens_single_quoted(prev_significant) => state = ScanState::SingleQuoted,
                _ => {}
            },
            ScanState::DoubleQuoted | ScanState::SingleQuoted => {
                let quote = if state == ScanState::DoubleQuoted { '"' } else { '\'' };
                if escaped {
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c == quote {
                    state = ScanState::Structure;
                }
            }
        }
        if !c.is_whitespace() {
            prev_significant = Some(c);
        }
    }
    None
}

/// A `'` in structural position opens a string when it follows a delimiter.
fn opens_single_quoted(prev_significant: Option<char>) -> bool {
    matches!(prev_significant, None | Some('{' | '[' | ',' | ':'))
}

/// A quote closes a string when the next significant character is a delimiter.
fn closes_string(rest: &str) -> bool {
    match rest.chars().find(|c| !c.is_whitespace()) {
        None => true,
        Some(c) => matches!(c, ',' | '}' | ']' | ':'),
    }
}

/// Re-delimit single-quoted strings with double quotes.
///
/// Embedded double quotes in a single-quoted string are escaped, `\'` is
/// unescaped, and apostrophes that are not followed by a delimiter stay inside
/// the string. Double-quoted strings are left untouched.
pub fn single_to_double_quotes(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    let mut state = ScanState::Structure;
    let mut prev_significant: Option<char> = None;
    let mut chars = text.char_indices().peekable();

    while let Some((idx, c)) = chars.next() {
        match state {
            ScanState::Structure => match c {
                '"' => {
                    out.push('"');
                    state = ScanState::DoubleQuoted;
                }
                '\'' if opens_single_quoted(prev_significant) => {
                    out.push('"');
                    state = ScanState::SingleQuoted;
                }
                _ => out.push(c),
            },
            ScanState::DoubleQuoted => match c {
                '\\' => {
                    out.push('\\');
                    if let Some((_, next)) = chars.next() {
                        out.push(next);
                    }
                }
                '"' => {
                    out.push('"');
                    state = ScanState::Structure;
                }
                _ => out.push(c),
            },
            ScanState::SingleQuoted => match c {
                '\\' => match chars.next() {
                    Some((_, '\'')) => out.push('\''),
                    Some((_, next)) => {
                        out.push('\\');
                        out.push(next);
                    }
                    None => out.push('\\'),
                },
                '"' => out.push_str("\\\""),
                '\'' if closes_string(&text[idx + 1..]) => {
                    out.push('"');
                    state = ScanState::Structure;
                }
                _ => out.push(c),
            },
        }
        if !c.is_whitespace() {
            prev_significant = Some(c);
        }
    }
    out
}

/// Escape quotes that sit inside a string value without being escaped.
///
/// A backslash always consumes the character after it, so `\\"` ends a
/// string while `\"` stays an escaped quote. An unescaped quote closes the
/// string only when a delimiter follows it; any other quote is escaped.
pub fn escape_embedded_quotes(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    let mut in_string = false;
    let mut chars = text.char_indices();

    while let Some((idx, c)) = chars.next() {
        if !in_string {
            if c == '"' {
                in_string = true;
            }
            out.push(c);
            continue;
        }
        match c {
            '\\' => {
                out.push('\\');
                if let Some((_, next)) = chars.next() {
                    out.push(next);
                }
            }
            '"' if closes_string(&text[idx + 1..]) => {
                out.push('"');
                in_string = false;
            }
            '"' => out.push_str("\\\""),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_fences_with_language_tag() {
        assert_eq!(strip_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_fences("  ```\n{\"a\":1}\n```  "), "{\"a\":1}");
        assert_eq!(strip_fences("```json{\"a\":1}```"), "{\"a\":1}");
    }

    #[test]
    fn test_strip_fences_leaves_unfenced_text() {
        assert_eq!(strip_fences("{\"a\": 1}"), "{\"a\": 1}");
        assert_eq!(strip_fences("Here: {\"a\": 1}"), "Here: {\"a\": 1}");
    }

    #[test]
    fn test_locate_region_in_prose() {
        let text = "Here's the answer: {'importance': 'x'} hope it helps";
        assert_eq!(locate_json_region(text), Some("{'importance': 'x'}"));
    }

    #[test]
    fn test_locate_region_between_fences() {
        let text = "Sure!\n```json\n{\"a\": {\"b\": 2}}\n```\nAnything else?";
        assert_eq!(locate_json_region(text), Some("{\"a\": {\"b\": 2}}"));
    }

    #[test]
    fn test_locate_region_ignores_braces_in_strings() {
        let text = r#"prefix {"a": "}{", "b": 'x}'} suffix }"#;
        assert_eq!(locate_json_region(text), Some(r#"{"a": "}{", "b": 'x}'}"#));
    }

    #[test]
    fn test_locate_region_unbalanced_falls_back_to_last_brace() {
        let text = "{\"a\": {\"b\": 1} trailing }";
        assert_eq!(locate_json_region(text), Some("{\"a\": {\"b\": 1} trailing }"));
        assert_eq!(locate_json_region("{\"a\": {"), Some("{\"a\": {"));
    }

    #[test]
    fn test_locate_region_none_without_brace() {
        assert_eq!(locate_json_region("no json here"), None);
    }

    #[test]
    fn test_single_to_double_quotes() {
        assert_eq!(
            single_to_double_quotes("{'importance': 'x'}"),
            "{\"importance\": \"x\"}"
        );
    }

    #[test]
    fn test_single_to_double_keeps_apostrophes_and_escapes_quotes() {
        let repaired = single_to_double_quotes("{'a': 'it's a \"big\" deal', 'b': [1, 'two']}");
        assert_eq!(
            repaired,
            "{\"a\": \"it's a \\\"big\\\" deal\", \"b\": [1, \"two\"]}"
        );
        let value: serde_json::Value = serde_json::from_str(&repaired).unwrap();
        assert_eq!(value["a"], "it's a \"big\" deal");
    }

    #[test]
    fn test_single_to_double_leaves_double_quoted_strings() {
        let text = "{\"a\": \"don't\"}";
        assert_eq!(single_to_double_quotes(text), text);
    }

    #[test]
    fn test_escape_embedded_quotes() {
        let text = r#"{"a": "say "hi" now", "b": 1}"#;
        let repaired = escape_embedded_quotes(text);
        assert_eq!(repaired, r#"{"a": "say \"hi\" now", "b": 1}"#);
    }

    #[test]
    fn test_escape_embedded_quotes_preserves_existing_escapes() {
        let text = r#"{"a": "mixed \"ok\" and "raw" quotes"}"#;
        let repaired = escape_embedded_quotes(text);
        assert_eq!(repaired, r#"{"a": "mixed \"ok\" and \"raw\" quotes"}"#);
        assert!(serde_json::from_str::<serde_json::Value>(&repaired).is_ok());
    }

    #[test]
    fn test_single_to_double_keeps_escaped_backslash_before_quote() {
        let repaired = single_to_double_quotes(r#"{"a": "C:\\", 'b': 'x\\'}"#);
        assert_eq!(repaired, r#"{"a": "C:\\", "b": "x\\"}"#);
        let value: serde_json::Value = serde_json::from_str(&repaired).unwrap();
        assert_eq!(value["a"], "C:\\");
        assert_eq!(value["b"], "x\\");
    }

    #[test]
    fn test_escape_embedded_quotes_keeps_escaped_backslash_before_quote() {
        let text = r#"{"a": "C:\\", "b": "x"}"#;
        assert_eq!(escape_embedded_quotes(text), text);

        let text = r#"{"a": "dir \\"tmp\\" and \"q\"", "b": 1}"#;
        let repaired = escape_embedded_quotes(text);
        assert_eq!(repaired, r#"{"a": "dir \\\"tmp\\\" and \"q\"", "b": 1}"#);
        assert!(serde_json::from_str::<serde_json::Value>(&repaired).is_ok());
    }

    #[test]
    fn test_escape_embedded_quotes_is_identity_on_valid_json() {
        let text = r#"{"a": "x", "b": ["y", "z"], "c": {"d": "e\n"}}"#;
        assert_eq!(escape_embedded_quotes(text), text);
    }
}
