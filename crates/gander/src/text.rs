//! Small text utilities shared by the cleaner, extractors and formatter.

use aho_corasick::AhoCorasick;
use once_cell::sync::Lazy;
use regex::Regex;

/// Named HTML entities worth decoding in byline/meta strings. Raw attribute
/// values reach the extractors without going through the HTML parser's own
/// entity handling, so the common ones are handled here.
const ENTITIES: &[(&str, &str)] = &[
    ("&amp;", "&"),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&apos;", "'"),
    ("&#39;", "'"),
    ("&nbsp;", " "),
    ("&ndash;", "\u{2013}"),
    ("&mdash;", "\u{2014}"),
    ("&lsquo;", "\u{2018}"),
    ("&rsquo;", "\u{2019}"),
    ("&ldquo;", "\u{201C}"),
    ("&rdquo;", "\u{201D}"),
    ("&hellip;", "\u{2026}"),
];

static ENTITY_MATCHER: Lazy<AhoCorasick> = Lazy::new(|| {
    AhoCorasick::new(ENTITIES.iter().map(|(from, _)| *from)).unwrap()
});

static WORD_SPLIT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w']+").unwrap());

/// Collapse runs of whitespace into single spaces and trim.
pub fn normalize_spaces(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Decode the common named HTML entities in a single pass.
pub fn decode_entities(s: &str) -> String {
    let replacements: Vec<&str> = ENTITIES.iter().map(|(_, to)| *to).collect();
    ENTITY_MATCHER.replace_all(s, &replacements)
}

/// Strip HTML tags from a string, returning plain text with entities decoded
/// and whitespace collapsed.
pub fn strip_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut in_tag = false;

    for c in s.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => result.push(c),
            _ => {}
        }
    }

    normalize_spaces(&decode_entities(&result))
}

/// Split text into lowercased word tokens on non-word boundaries.
/// Embedded apostrophes survive so contractions match the stopword lists.
pub fn word_tokens(text: &str) -> Vec<String> {
    WORD_SPLIT_RE
        .split(&text.to_lowercase())
        .map(|w| w.trim_matches('\''))
        .filter(|w| !w.is_empty())
        .map(|w| w.to_string())
        .collect()
}

/// Count whitespace-separated words.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Reduce a string to its comparison form: alphanumeric characters only
/// (which keeps CJK ideographs), lowercased. Used to compare titles that
/// differ only in punctuation, spacing or casing.
pub fn comparison_form(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(|c| c.to_lowercase())
        .collect()
}

/// Title-case a display name: first letter of each whitespace-separated word
/// uppercased, the rest lowercased.
pub fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Truncate a string to at most `max` characters, on a char boundary.
pub fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_spaces_collapses_runs() {
        assert_eq!(normalize_spaces("  a \t b\n\nc  "), "a b c");
    }

    #[test]
    fn decode_entities_single_pass() {
        assert_eq!(decode_entities("Tom &amp; Jerry&nbsp;&rsquo;24"), "Tom & Jerry \u{2019}24");
    }

    #[test]
    fn strip_html_removes_tags_and_decodes() {
        assert_eq!(
            strip_html("<span class=\"byline\">By <b>Jane</b> &amp; Co</span>"),
            "By Jane & Co"
        );
    }

    #[test]
    fn word_tokens_splits_on_non_word() {
        assert_eq!(
            word_tokens("Hello, World-wide web!"),
            vec!["hello", "world", "wide", "web"]
        );
    }

    #[test]
    fn comparison_form_keeps_alnum_only() {
        assert_eq!(comparison_form("The Big Story!"), "thebigstory");
        assert_eq!(comparison_form("  Té st 42 "), "tést42");
    }

    #[test]
    fn title_case_names() {
        assert_eq!(title_case("john RONALD smith"), "John Ronald Smith");
    }

    #[test]
    fn truncate_chars_respects_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("ab", 10), "ab");
    }
}
