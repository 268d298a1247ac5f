//! Output formatting: turn the chosen article node into clean body text,
//! and optionally a sanitized HTML fragment reconciled against that text.

use std::collections::HashSet;

use ego_tree::NodeId;
use regex::Regex;
use scraper::{ElementRef, Node};

use crate::config::Config;
use crate::dom::query::{child_elements, subtree_depth};
use crate::dom::serialize::{element_html, EditSet};
use crate::extract::content::BestNode;
use crate::stopwords::count_stopwords;
use crate::text::normalize_spaces;

/// Classes that exempt a deep trailing child from the widget drop.
const TRAILING_KEEP_CLASSES: &[&str] = &["entry-content-asset", "instapaper_body"];

/// Tags whose presence keeps a text-less element alive.
const MEDIA_KEEP_TAGS: &[&str] = &["object", "embed"];

/// Inline tags flattened to their text during rendering; the few-stopwords
/// sweep must not see them as standalone elements.
const INLINE_TAGS: &[&str] = &["a", "b", "strong", "i", "em", "sup", "span"];

/// Elements below this many stopword hits read as labels and leftovers, not
/// prose, and are dropped from the text.
const MIN_ELEMENT_STOPWORDS: usize = 3;

/// Tags allowed to survive in retained article HTML.
const HTML_ALLOW_TAGS: &[&str] = &["a", "span", "p", "br", "strong", "b", "em"];

/// How the text/HTML reconciliation went. The alignment is best-effort by
/// design: a run that cannot be located in the sanitized markup is appended
/// in order instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Every text run was located in the sanitized HTML.
    Aligned,
    /// This many runs were missing and appended as plain paragraphs.
    Appended(usize),
}

/// The formatter's result for one article.
#[derive(Debug, Clone)]
pub struct FormattedOutput {
    /// Paragraph runs joined by blank lines.
    pub text: String,
    /// Sanitized article HTML, only with `keep_article_html`.
    pub html: Option<String>,
    pub reconcile: ReconcileOutcome,
}

/// Nodes inside the top node whose accumulated gravity score fell below 1.
/// A pure function of the score table, so applying it twice removes exactly
/// what applying it once does.
pub fn negative_scored_nodes(best: &BestNode) -> HashSet<NodeId> {
    best.node
        .descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .filter(|el| best.scores.get(&el.id()).is_some_and(|g| g.score < 1))
        .map(|el| el.id())
        .collect()
}

fn has_keep_class(el: &ElementRef) -> bool {
    el.value()
        .classes()
        .any(|c| TRAILING_KEEP_CLASSES.iter().any(|k| c.eq_ignore_ascii_case(k)))
}

/// Text of a subtree, honoring the removal set.
fn visible_text(el: &ElementRef, removed: &HashSet<NodeId>) -> String {
    let mut out = String::new();
    collect_visible_text(el, removed, &mut out);
    normalize_spaces(&out)
}

fn collect_visible_text(el: &ElementRef, removed: &HashSet<NodeId>, out: &mut String) {
    if removed.contains(&el.id()) {
        return;
    }
    for child in el.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child) {
                    collect_visible_text(&child_el, removed, out);
                }
            }
            _ => {}
        }
    }
}

fn has_visible_descendant(el: &ElementRef, removed: &HashSet<NodeId>, tags: &[&str]) -> bool {
    fn walk(el: &ElementRef, removed: &HashSet<NodeId>, tags: &[&str]) -> bool {
        if removed.contains(&el.id()) {
            return false;
        }
        for child in el.children().filter_map(ElementRef::wrap) {
            if tags
                .iter()
                .any(|t| child.value().name().eq_ignore_ascii_case(t))
            {
                if !removed.contains(&child.id()) {
                    return true;
                }
            } else if walk(&child, removed, tags) {
                return true;
            }
        }
        false
    }
    walk(el, removed, tags)
}

/// Removals shared by both output modes: weak gravity scores, the caller's
/// link-dense children, and the deep trailing widget.
fn structural_removals(best: &BestNode, link_dense: &HashSet<NodeId>) -> HashSet<NodeId> {
    let mut removed = negative_scored_nodes(best);
    removed.extend(link_dense.iter().copied());

    let surviving: Vec<ElementRef> = child_elements(&best.node)
        .into_iter()
        .filter(|c| !removed.contains(&c.id()))
        .collect();
    if surviving.len() >= 3 {
        if let Some(last) = surviving.last() {
            if subtree_depth(last) >= 2 && !has_keep_class(last) {
                removed.insert(last.id());
            }
        }
    }

    removed
}

/// Text-mode removals on top of the structural set: elements whose visible
/// text carries almost no stopwords (labels, leftovers, empties), children
/// decided before their parents so emptied parents fall too.
fn text_removals(
    best: &BestNode,
    structural: &HashSet<NodeId>,
    config: &Config,
) -> HashSet<NodeId> {
    let mut removed = structural.clone();

    let descendants: Vec<ElementRef> = best
        .node
        .descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .collect();
    for el in descendants.iter().rev() {
        if removed.contains(&el.id()) {
            continue;
        }
        let tag = el.value().name().to_lowercase();
        if tag == "br" || INLINE_TAGS.contains(&tag.as_str()) {
            continue;
        }
        if has_visible_descendant(el, &removed, MEDIA_KEEP_TAGS) {
            continue;
        }
        let text = visible_text(el, &removed);
        if count_stopwords(&text, &config.language).stopword_count < MIN_ELEMENT_STOPWORDS {
            removed.insert(el.id());
        }
    }

    removed
}

/// Render one element to text: anchors and formatting tags flatten to their
/// inner text, `<br>` becomes a paragraph break, list items break between
/// entries.
fn render_text(el: &ElementRef, removed: &HashSet<NodeId>, out: &mut String) {
    if removed.contains(&el.id()) {
        return;
    }
    let tag = el.value().name().to_lowercase();

    if tag == "br" {
        out.push_str("\n\n");
        return;
    }
    if tag == "ul" || tag == "ol" {
        let items: Vec<ElementRef> = child_elements(el)
            .into_iter()
            .filter(|li| li.value().name().eq_ignore_ascii_case("li"))
            .filter(|li| !removed.contains(&li.id()))
            .collect();
        for (i, li) in items.iter().enumerate() {
            let mut item = String::new();
            render_children_text(li, removed, &mut item);
            out.push_str(&item);
            if i + 1 < items.len() {
                out.push_str("\n\n");
            }
        }
        return;
    }

    render_children_text(el, removed, out);
}

fn render_children_text(el: &ElementRef, removed: &HashSet<NodeId>, out: &mut String) {
    for child in el.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child) {
                    render_text(&child_el, removed, out);
                }
            }
            _ => {}
        }
    }
}

/// Split rendered text on paragraph-break markers into normalized runs.
fn runs_of(raw: &str) -> Vec<String> {
    raw.split("\n\n")
        .map(normalize_spaces)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Sanitize a serialized fragment down to the retained-HTML allow-list.
fn sanitize_article_html(html: &str) -> String {
    let mut builder = ammonia::Builder::new();
    builder.tags(HTML_ALLOW_TAGS.iter().copied().collect());
    builder.add_tag_attributes("a", &["href"]);
    builder
        .url_schemes(["http", "https", "mailto"].iter().copied().collect())
        .clean(html)
        .to_string()
}

/// Best-effort alignment of text runs back into the sanitized HTML: every
/// run is searched for with whitespace- and markup-tolerant matching;
/// misses are appended as plain paragraphs and reported in the outcome.
fn reconcile_html(html: &str, runs: &[String]) -> (String, ReconcileOutcome) {
    let mut out = html.to_string();
    let mut appended = 0_usize;

    for run in runs {
        let words: Vec<String> = run.split_whitespace().map(regex::escape).collect();
        if words.is_empty() {
            continue;
        }
        // Tags may sit between any two words of the run.
        let pattern = words.join(r"(?:\s|<[^>]*>)+");
        let found = Regex::new(&pattern)
            .map(|re| re.is_match(&out))
            .unwrap_or(false);
        if !found {
            out.push_str("<p>");
            out.push_str(&crate::dom::serialize::escape_text(run));
            out.push_str("</p>");
            appended += 1;
        }
    }

    let outcome = if appended == 0 {
        ReconcileOutcome::Aligned
    } else {
        ReconcileOutcome::Appended(appended)
    };
    (out, outcome)
}

/// Format the chosen article node into final output.
///
/// `leads` are recovered sibling paragraphs, already plain text, prepended
/// to the body. `link_dense` is the set of top-level children flagged by
/// the content extractor.
pub fn get_formatted(
    best: &BestNode,
    leads: &[String],
    link_dense: &HashSet<NodeId>,
    config: &Config,
) -> FormattedOutput {
    let structural = structural_removals(best, link_dense);
    let removed = text_removals(best, &structural, config);

    let mut runs: Vec<String> = leads.iter().map(|l| normalize_spaces(l)).collect();
    for child in child_elements(&best.node) {
        let mut raw = String::new();
        render_text(&child, &removed, &mut raw);
        runs.extend(runs_of(&raw));
    }

    let text = runs.join("\n\n");

    if !config.keep_article_html {
        return FormattedOutput {
            text,
            html: None,
            reconcile: ReconcileOutcome::Aligned,
        };
    }

    // The HTML snapshot keeps everything structurally alive; the text-only
    // sweeps above are what the reconciliation pass papers over.
    let edits = EditSet {
        remove: structural,
        ..Default::default()
    };
    let mut html = String::new();
    for lead in leads {
        html.push_str("<p>");
        html.push_str(&crate::dom::serialize::escape_text(lead));
        html.push_str("</p>");
    }
    html.push_str(&sanitize_article_html(&element_html(best.node, &edits)));

    let (html, reconcile) = reconcile_html(&html, &runs);
    FormattedOutput {
        text,
        html: Some(html),
        reconcile,
    }
}

/// Convert an HTML fragment to Markdown. On conversion failure the input is
/// returned unchanged.
pub fn html_to_markdown(html: &str) -> String {
    let converter = htmd::HtmlToMarkdown::builder()
        .skip_tags(vec!["script", "style", "noscript"])
        .build();
    converter.convert(html).unwrap_or_else(|_| html.to_string())
}
