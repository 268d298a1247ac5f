//! Byline and author-name extraction.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Html;

use crate::config::Config;
use crate::dom::query::{collapsed_text, select_all};
use crate::text::{strip_html, title_case};

/// Attribute/value cross-product searched for byline carriers.
const AUTHOR_ATTRS: &[&str] = &["name", "rel", "itemprop", "class", "id"];
const AUTHOR_VALS: &[&str] = &["author", "byline", "dc.creator", "byl"];

/// Leading "By:" / "From:" markers.
static BY_MARKER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?i)(?:by|from)[:\s]+").unwrap());

/// Name tokens may keep apostrophes, hyphens and periods; every other
/// single character splits, so a comma-plus-space yields the empty token
/// that separates name candidates.
static NAME_SPLIT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w'\-.]").unwrap());

fn contains_digits(token: &str) -> bool {
    token.chars().any(|c| c.is_ascii_digit())
}

/// Parse one raw byline string into display names.
///
/// Tokens group into candidates split on literal `"and"`, `","` or an empty
/// token; tokens with digits are discarded and a candidate needs at least
/// two name tokens to survive.
pub fn parse_byline(raw: &str) -> Vec<String> {
    let stripped = strip_html(raw);
    let without_marker = BY_MARKER_RE.replace(stripped.trim(), "");

    let mut authors: Vec<String> = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    let mut flush = |current: &mut Vec<&str>, authors: &mut Vec<String>| {
        if current.len() >= 2 {
            authors.push(current.join(" "));
        }
        current.clear();
    };

    for token in NAME_SPLIT_RE.split(&without_marker) {
        let token = token.trim();
        if token.is_empty() || token == "and" || token == "," {
            flush(&mut current, &mut authors);
        } else if !contains_digits(token) {
            current.push(token);
        }
    }
    flush(&mut current, &mut authors);

    authors
}

/// Search the byline cross-product, parse every hit, and return unique
/// display-cased names in first-seen order.
pub fn extract_authors(doc: &Html, config: &Config) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    let mut seen: Vec<String> = Vec::new();

    for attr in AUTHOR_ATTRS {
        for val in AUTHOR_VALS {
            let css = format!("[{}='{}']", attr, val);
            for el in select_all(doc, &css) {
                let raw = if el.value().name().eq_ignore_ascii_case("meta") {
                    el.value().attr("content").unwrap_or("").to_string()
                } else {
                    collapsed_text(&el)
                };
                if raw.is_empty() {
                    continue;
                }
                for name in parse_byline(&raw) {
                    let key = name.to_lowercase();
                    if !seen.contains(&key) {
                        seen.push(key);
                        found.push(title_case(&name));
                    }
                }
            }
        }
    }

    found.truncate(config.max_authors);
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn byline_splits_on_comma_and_and() {
        assert_eq!(
            parse_byline("By: John Smith, Jane Doe"),
            vec!["John Smith", "Jane Doe"]
        );
        assert_eq!(
            parse_byline("By Alice Cooper and Bob Dylan"),
            vec!["Alice Cooper", "Bob Dylan"]
        );
    }

    #[test]
    fn digit_tokens_are_discarded() {
        assert_eq!(parse_byline("By: X1"), Vec::<String>::new());
        assert_eq!(parse_byline("Jane Doe 2024"), vec!["Jane Doe"]);
    }

    #[test]
    fn single_token_names_fail_the_two_token_rule() {
        assert_eq!(parse_byline("By: Admin"), Vec::<String>::new());
    }

    #[test]
    fn html_and_markers_are_stripped() {
        assert_eq!(
            parse_byline("<span>By: <b>Mary Jo O'Neil</b></span>"),
            vec!["Mary Jo O'Neil"]
        );
        assert_eq!(parse_byline("From: Hans Gruber"), vec!["Hans Gruber"]);
    }

    #[test]
    fn extraction_searches_meta_and_elements() {
        let doc = Html::parse_document(
            "<head><meta name='author' content='jane doe'></head>\
             <body><span class='byline'>By John Smith</span></body>",
        );
        let authors = extract_authors(&doc, &Config::default());
        assert_eq!(authors, vec!["Jane Doe", "John Smith"]);
    }

    #[test]
    fn duplicates_collapse_case_insensitively() {
        let doc = Html::parse_document(
            "<head><meta name='author' content='JANE DOE'></head>\
             <body><span class='byline'>By Jane Doe</span></body>",
        );
        let authors = extract_authors(&doc, &Config::default());
        assert_eq!(authors, vec!["Jane Doe"]);
    }

    #[test]
    fn itemprop_and_rel_carriers_are_found() {
        let doc = Html::parse_document(
            "<body><a rel='author' href='/a'>Sam Spade</a>\
             <span itemprop='author'>Nora Charles</span></body>",
        );
        let authors = extract_authors(&doc, &Config::default());
        assert!(authors.contains(&"Sam Spade".to_string()));
        assert!(authors.contains(&"Nora Charles".to_string()));
    }

    #[test]
    fn author_count_is_bounded() {
        let config = Config::builder().max_authors(1).build();
        let doc = Html::parse_document(
            "<body><span class='byline'>Ann Bee, Cee Dee, Eff Gee</span></body>",
        );
        assert_eq!(extract_authors(&doc, &config), vec!["Ann Bee"]);
    }
}
