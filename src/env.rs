// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/veilcore

//! Env-block parsing and identifier sanitization.
//!
//! This is the collaborator side of the codec boundary: turning a
//! human-authored `key=value` block into clean entries before the codec sees
//! them. Lines are trimmed; blanks and `#` comments are skipped; the split is
//! on the **first** `=`, so values may contain further `=` characters
//! untouched. Malformed lines (no `=`, empty key) are collected rather than
//! dropped silently, so the caller can report them.

use crate::codec::charset::is_valid_identifier;

/// The result of parsing an env block: raw `(key, value)` pairs in source
/// order, plus the lines that were skipped as malformed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedEnv {
    pub entries: Vec<(String, String)>,
    pub invalid_lines: Vec<String>,
}

/// Parse a `key=value` env block.
pub fn parse_env_block(text: &str) -> ParsedEnv {
    let mut parsed = ParsedEnv::default();

    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let Some(eq_index) = trimmed.find('=') else {
            parsed.invalid_lines.push(trimmed.to_string());
            continue;
        };

        let key = trimmed[..eq_index].trim();
        if key.is_empty() {
            parsed.invalid_lines.push(trimmed.to_string());
            continue;
        }

        let value = trimmed[eq_index + 1..].trim();
        parsed.entries.push((key.to_string(), value.to_string()));
    }

    parsed
}

/// Map a raw env key onto a legal identifier, replacing illegal characters
/// with `_`. Returns `None` when nothing salvageable remains (empty key, or a
/// result that is still not a valid identifier such as the bare wildcard).
pub fn sanitize_identifier(key: &str) -> Option<String> {
    if key.is_empty() {
        return None;
    }

    let mut identifier = String::with_capacity(key.len());
    for (i, c) in key.chars().enumerate() {
        let legal = if i == 0 {
            c.is_ascii_alphabetic() || c == '_'
        } else {
            c.is_ascii_alphanumeric() || c == '_'
        };
        identifier.push(if legal { c } else { '_' });
    }

    if is_valid_identifier(&identifier) {
        Some(identifier)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_basic_block() {
        let parsed = parse_env_block("A=1\nB = two \n# note\n\nC=");
        assert_eq!(
            parsed.entries,
            vec![
                ("A".into(), "1".into()),
                ("B".into(), "two".into()),
                ("C".into(), "".into()),
            ]
        );
        assert!(parsed.invalid_lines.is_empty());
    }

    #[test]
    fn splits_on_first_equals_only() {
        let parsed = parse_env_block("K===value=with=equals");
        assert_eq!(parsed.entries, vec![("K".into(), "==value=with=equals".into())]);
    }

    #[test]
    fn collects_malformed_lines() {
        let parsed = parse_env_block("no equals here\n=empty key\nOK=1");
        assert_eq!(parsed.entries.len(), 1);
        assert_eq!(
            parsed.invalid_lines,
            vec!["no equals here".to_string(), "=empty key".to_string()]
        );
    }

    #[test]
    fn hash_only_comments_at_line_start() {
        // '#' inside a value is content, not a comment.
        let parsed = parse_env_block("COLOR=#ff00aa");
        assert_eq!(parsed.entries, vec![("COLOR".into(), "#ff00aa".into())]);
    }

    #[test]
    fn sanitizes_keys() {
        assert_eq!(sanitize_identifier("API_KEY"), Some("API_KEY".into()));
        assert_eq!(sanitize_identifier("my-key.v2"), Some("my_key_v2".into()));
        assert_eq!(sanitize_identifier("9lives"), Some("_lives".into()));
        assert_eq!(sanitize_identifier("--x"), Some("__x".into()));
        assert_eq!(sanitize_identifier(""), None);
        assert_eq!(sanitize_identifier("_"), None);
        assert_eq!(sanitize_identifier("-"), None);
    }
}
