//! Query primitives over the parsed tree.

use ego_tree::NodeRef;
use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};

use crate::text::normalize_spaces;

/// Select all elements matching a CSS selector, in document order.
/// An invalid selector yields no matches rather than an error.
pub fn select_all<'a>(doc: &'a Html, css: &str) -> Vec<ElementRef<'a>> {
    match Selector::parse(css) {
        Ok(sel) => doc.select(&sel).collect(),
        Err(_) => Vec::new(),
    }
}

/// First element matching a CSS selector.
pub fn select_first<'a>(doc: &'a Html, css: &str) -> Option<ElementRef<'a>> {
    match Selector::parse(css) {
        Ok(sel) => doc.select(&sel).next(),
        Err(_) => None,
    }
}

/// All descendant elements of `doc` whose `attr` value matches `re`,
/// optionally restricted to one tag name.
pub fn elements_by_attr_regex<'a>(
    doc: &'a Html,
    tag: Option<&str>,
    attr: &str,
    re: &Regex,
) -> Vec<ElementRef<'a>> {
    doc.tree
        .root()
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|el| tag.map_or(true, |t| el.value().name().eq_ignore_ascii_case(t)))
        .filter(|el| {
            el.value()
                .attr(attr)
                .is_some_and(|value| re.is_match(value))
        })
        .collect()
}

/// Descendant elements (of the whole document) with one of the given tag
/// names, in document order.
pub fn elements_by_tags<'a>(doc: &'a Html, tags: &[&str]) -> Vec<ElementRef<'a>> {
    doc.tree
        .root()
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|el| {
            tags.iter()
                .any(|t| el.value().name().eq_ignore_ascii_case(t))
        })
        .collect()
}

/// Descendant elements of one element with one of the given tag names.
pub fn descendants_by_tags<'a>(el: &ElementRef<'a>, tags: &[&str]) -> Vec<ElementRef<'a>> {
    el.descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .filter(|child| {
            tags.iter()
                .any(|t| child.value().name().eq_ignore_ascii_case(t))
        })
        .collect()
}

/// Concatenated inner text of a subtree, whitespace-collapsed and trimmed.
pub fn collapsed_text(el: &ElementRef) -> String {
    normalize_spaces(&el.text().collect::<Vec<_>>().join(" "))
}

/// Immediate child elements, in order.
pub fn child_elements<'a>(el: &ElementRef<'a>) -> Vec<ElementRef<'a>> {
    el.children().filter_map(ElementRef::wrap).collect()
}

/// Preceding sibling elements, nearest first.
pub fn prev_sibling_elements<'a>(el: &ElementRef<'a>) -> Vec<ElementRef<'a>> {
    el.prev_siblings().filter_map(ElementRef::wrap).collect()
}

/// The next sibling element within the parent, if any.
pub fn next_sibling_element<'a>(el: &ElementRef<'a>) -> Option<ElementRef<'a>> {
    el.next_siblings().find_map(ElementRef::wrap)
}

/// True if the subtree contains a descendant with one of the given tags.
pub fn has_descendant_tag(el: &ElementRef, tags: &[&str]) -> bool {
    !descendants_by_tags(el, tags).is_empty()
}

/// Maximum element depth below `el` (0 for a leaf element).
pub fn subtree_depth(el: &ElementRef) -> usize {
    fn depth_of(node: NodeRef<Node>) -> usize {
        node.children()
            .filter_map(ElementRef::wrap)
            .map(|child| 1 + depth_of(*child))
            .max()
            .unwrap_or(0)
    }
    depth_of(**el)
}

/// True for an element carrying no text and none of the given tags below it.
pub fn is_empty_of(el: &ElementRef, keep_tags: &[&str]) -> bool {
    if !collapsed_text(el).is_empty() {
        return false;
    }
    !has_descendant_tag(el, keep_tags)
}
