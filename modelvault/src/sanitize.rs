//! Filesystem-safe names for catalog-derived titles.
//!
//! Model and version names come straight from user-entered catalog text and
//! routinely contain separators, reserved characters, and decorative
//! whitespace. Collaborators run them through [`sanitize_name`] before
//! deriving a descriptor's target directory.

use std::sync::OnceLock;

use regex::Regex;

/// Maximum length of a sanitized path component.
const MAX_NAME_LENGTH: usize = 200;

fn reserved_chars() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"[\\:*?"<>]"#).expect("valid regex"))
}

fn underscore_runs() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"__+").expect("valid regex"))
}

fn whitespace_runs() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("valid regex"))
}

/// Sanitize a catalog name for use as a file or directory name.
///
/// Non-ASCII and control characters are dropped, `|` and `/` become `-`,
/// characters Windows rejects become `_`, runs of underscores and
/// whitespace collapse to one, and the result is trimmed and capped at 200
/// characters.
pub fn sanitize_name(value: &str) -> String {
    let printable: String = value
        .chars()
        .filter(|c| c.is_ascii() && (!c.is_ascii_control() || c.is_ascii_whitespace()))
        .collect();

    // Typically dividers in catalog titles.
    let value = printable.replace(['|', '/'], "-");

    let value = reserved_chars().replace_all(&value, "_");
    let value = underscore_runs().replace_all(&value, "_");
    let value = value.trim_matches(['_', '.']);
    let value = whitespace_runs().replace_all(value, " ");

    let value = value.strip_suffix('-').unwrap_or(&value);

    value.trim().chars().take(MAX_NAME_LENGTH).collect()
}

/// Sanitize a user-supplied output directory (trailing whitespace only; the
/// rest is the caller's own path).
pub fn sanitize_directory_name(name: &str) -> String {
    name.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_name_unchanged() {
        assert_eq!(sanitize_name("My Model v2"), "My Model v2");
    }

    #[test]
    fn test_dividers_become_dashes() {
        assert_eq!(sanitize_name("anime|realistic"), "anime-realistic");
        assert_eq!(sanitize_name("sd/xl"), "sd-xl");
    }

    #[test]
    fn test_reserved_characters_become_underscores() {
        assert_eq!(sanitize_name("what?"), "what");
        assert_eq!(sanitize_name(r#"a:b*c"d"#), "a_b_c_d");
    }

    #[test]
    fn test_underscore_runs_collapse() {
        assert_eq!(sanitize_name("a??b"), "a_b");
    }

    #[test]
    fn test_leading_trailing_underscores_and_dots_trimmed() {
        assert_eq!(sanitize_name("..name_"), "name");
    }

    #[test]
    fn test_whitespace_collapses() {
        assert_eq!(sanitize_name("a   b\t\tc"), "a b c");
    }

    #[test]
    fn test_non_ascii_dropped() {
        assert_eq!(sanitize_name("mödel häße"), "mdel he");
    }

    #[test]
    fn test_trailing_dash_removed() {
        assert_eq!(sanitize_name("name -"), "name");
    }

    #[test]
    fn test_length_capped() {
        let long = "x".repeat(500);
        assert_eq!(sanitize_name(&long).len(), MAX_NAME_LENGTH);
    }

    #[test]
    fn test_directory_name_trailing_whitespace() {
        assert_eq!(sanitize_directory_name("/archive/models  "), "/archive/models");
    }
}
