//! Injectable parsing seam for the DOM adapter.
//!
//! Both implementations sit on html5ever, which never fails: malformed input
//! produces a best-effort tree and empty input produces an empty document,
//! so downstream stages short-circuit on missing content instead of handling
//! parse errors.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Html;

/// IE conditional comments, which html5ever keeps as comment nodes but some
/// feeds leave unbalanced.
static CONDITIONAL_COMMENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<!--\[if[^\]]*\]>.*?<!\[endif\]-->").unwrap());

/// Parses raw HTML into a document tree.
pub trait DomParser: Send + Sync {
    /// Parse a full document. Must not fail: damaged markup yields a
    /// best-effort tree.
    fn parse_document(&self, html: &str) -> Html;

    /// Parse a fragment (no implied `<html>`/`<body>` wrapper).
    fn parse_fragment(&self, html: &str) -> Html;
}

/// Straight html5ever parse.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectParser;

impl DomParser for DirectParser {
    fn parse_document(&self, html: &str) -> Html {
        Html::parse_document(html)
    }

    fn parse_fragment(&self, html: &str) -> Html {
        Html::parse_fragment(html)
    }
}

/// Parse with a pre-scrub for damaged input: strips a UTF-8 BOM, C0 control
/// characters (except tab/newline/carriage return) and IE conditional
/// comment blocks.
#[derive(Debug, Clone, Copy, Default)]
pub struct RepairingParser;

impl RepairingParser {
    fn scrub(html: &str) -> String {
        let without_bom = html.strip_prefix('\u{feff}').unwrap_or(html);
        let without_conditionals = CONDITIONAL_COMMENT_RE.replace_all(without_bom, "");
        without_conditionals
            .chars()
            .filter(|&c| c == '\t' || c == '\n' || c == '\r' || !c.is_control())
            .collect()
    }
}

impl DomParser for RepairingParser {
    fn parse_document(&self, html: &str) -> Html {
        Html::parse_document(&Self::scrub(html))
    }

    fn parse_fragment(&self, html: &str) -> Html {
        Html::parse_fragment(&Self::scrub(html))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Selector;

    #[test]
    fn direct_parse_never_fails() {
        let doc = DirectParser.parse_document("<p>unclosed <div>< broken");
        let sel = Selector::parse("p").unwrap();
        assert!(doc.select(&sel).next().is_some());
    }

    #[test]
    fn empty_input_yields_empty_document() {
        let doc = DirectParser.parse_document("");
        let sel = Selector::parse("p, div, span").unwrap();
        assert!(doc.select(&sel).next().is_none());
    }

    #[test]
    fn repairing_strips_control_chars() {
        let doc = RepairingParser.parse_document("<p>he\u{0}llo\u{7} world</p>");
        let sel = Selector::parse("p").unwrap();
        let text: String = doc.select(&sel).next().unwrap().text().collect();
        assert_eq!(text, "hello world");
    }

    #[test]
    fn repairing_drops_conditional_comments() {
        let html = "<!--[if IE 9]><div id=\"ie\">old</div><![endif]--><p>kept</p>";
        let doc = RepairingParser.parse_document(html);
        let ie = Selector::parse("#ie").unwrap();
        assert!(doc.select(&ie).next().is_none());
        let p = Selector::parse("p").unwrap();
        assert!(doc.select(&p).next().is_some());
    }
}
