//! `KEY=value` environment file parser.
//!
//! Accepted syntax, one assignment per line:
//!
//! ```text
//! # comment
//! DOMAIN=example.com
//! export LETSENCRYPT_EMAIL=ops@example.com
//! TURN_PASSWORD="has spaces # and a hash"
//! REPLICA_COUNT=2   # trailing comment
//! ```
//!
//! Later assignments override earlier ones.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::path::Path;

use stackup_utils::error::ConfigError;

static KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("static regex"));

/// Parse environment file `content`; `path` is used for error messages only.
pub fn parse_env_file(content: &str, path: &Path) -> Result<BTreeMap<String, String>, ConfigError> {
    let mut values = BTreeMap::new();

    for (idx, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let line = line
            .strip_prefix("export ")
            .map(str::trim_start)
            .unwrap_or(line);

        let invalid = || ConfigError::InvalidLine {
            path: path.to_path_buf(),
            line_number: idx + 1,
            line: raw.to_string(),
        };

        let (key, value) = line.split_once('=').ok_or_else(invalid)?;
        let key = key.trim();
        if !KEY_RE.is_match(key) {
            return Err(invalid());
        }

        values.insert(key.to_string(), unquote(value.trim()));
    }

    Ok(values)
}

fn unquote(value: &str) -> String {
    for quote in ['"', '\''] {
        if let Some(rest) = value.strip_prefix(quote) {
            if let Some(end) = rest.find(quote) {
                // Only a trailing comment may follow the closing quote
                let tail = rest[end + 1..].trim_start();
                if tail.is_empty() || tail.starts_with('#') {
                    return rest[..end].to_string();
                }
            }
        }
    }

    // Unquoted: a " #" starts a trailing comment
    match value.find(" #") {
        Some(pos) => value[..pos].trim_end().to_string(),
        None => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::path::PathBuf;

    fn parse(content: &str) -> Result<BTreeMap<String, String>, ConfigError> {
        parse_env_file(content, &PathBuf::from(".env"))
    }

    #[test]
    fn test_basic_assignments() {
        let values = parse("DOMAIN=example.com\nREPLICA_COUNT=3\n").unwrap();
        assert_eq!(values.get("DOMAIN").map(String::as_str), Some("example.com"));
        assert_eq!(values.get("REPLICA_COUNT").map(String::as_str), Some("3"));
    }

    #[test]
    fn test_comments_blank_lines_and_export() {
        let values = parse(
            "# platform settings\n\n   \nexport DOMAIN=example.com\n  # indented comment\n",
        )
        .unwrap();
        assert_eq!(values.len(), 1);
        assert_eq!(values["DOMAIN"], "example.com");
    }

    #[test]
    fn test_quoted_values_keep_hash_and_spaces() {
        let values = parse("A=\"has spaces # hash\"\nB='single'\nC=plain # trailing\n").unwrap();
        assert_eq!(values["A"], "has spaces # hash");
        assert_eq!(values["B"], "single");
        assert_eq!(values["C"], "plain");
    }

    #[test]
    fn test_quoted_value_with_trailing_comment() {
        let values = parse("A=\"x y\" # note\nB='z'   #note\nC=\"\"\n").unwrap();
        assert_eq!(values["A"], "x y");
        assert_eq!(values["B"], "z");
        assert_eq!(values["C"], "");
    }

    #[test]
    fn test_value_may_contain_equals() {
        let values = parse("TOKEN=abc==def\n").unwrap();
        assert_eq!(values["TOKEN"], "abc==def");
    }

    #[test]
    fn test_empty_value_is_kept_as_empty() {
        let values = parse("DOMAIN=\n").unwrap();
        assert_eq!(values["DOMAIN"], "");
    }

    #[test]
    fn test_later_assignment_wins() {
        let values = parse("DOMAIN=a.example\nDOMAIN=b.example\n").unwrap();
        assert_eq!(values["DOMAIN"], "b.example");
    }

    #[test]
    fn test_missing_equals_reports_line_number() {
        let err = parse("DOMAIN=example.com\nnot an assignment\n").unwrap_err();
        match err {
            ConfigError::InvalidLine { line_number, line, .. } => {
                assert_eq!(line_number, 2);
                assert_eq!(line, "not an assignment");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_invalid_key_rejected() {
        assert!(parse("1DOMAIN=x\n").is_err());
        assert!(parse("MY-KEY=x\n").is_err());
    }

    proptest! {
        #[test]
        fn prop_simple_assignment_round_trips(
            key in "[A-Z_][A-Z0-9_]{0,16}",
            value in "[a-zA-Z0-9./:@-]{0,24}",
        ) {
            let values = parse(&format!("{key}={value}\n")).unwrap();
            prop_assert_eq!(values.get(&key), Some(&value));
        }
    }
}
