//! Serialization with structural edits.
//!
//! The tree itself is immutable; removal, tag replacement and tag stripping
//! are expressed as node-id sets applied while re-serializing, after which
//! the result is re-parsed. Trailing text is a sibling node in this DOM, so
//! skipping an element never loses the text that followed it.

use std::collections::{HashMap, HashSet};

use ego_tree::{NodeId, NodeRef};
use scraper::{ElementRef, Html, Node};

/// Structural edits to apply during serialization.
#[derive(Debug, Default)]
pub struct EditSet {
    /// Drop the node and its whole subtree.
    pub remove: HashSet<NodeId>,
    /// Drop the element's tag, splicing its children into the parent.
    pub unwrap: HashSet<NodeId>,
    /// Replace the element's tag name, structure preserved.
    pub rename: HashMap<NodeId, &'static str>,
    /// Delete the named attributes from the element.
    pub drop_attrs: HashMap<NodeId, Vec<&'static str>>,
    /// Set attributes on the element, overriding existing values.
    pub set_attrs: HashMap<NodeId, Vec<(String, String)>>,
    /// Drop all comment nodes.
    pub strip_comments: bool,
}

impl EditSet {
    pub fn is_empty(&self) -> bool {
        self.remove.is_empty()
            && self.unwrap.is_empty()
            && self.rename.is_empty()
            && self.drop_attrs.is_empty()
            && self.set_attrs.is_empty()
            && !self.strip_comments
    }
}

/// Serialize an element (tag included) with edits applied.
pub fn element_html(el: ElementRef, edits: &EditSet) -> String {
    let mut out = String::new();
    write_node(*el, edits, &mut out);
    out
}

/// Serialize an element's children with edits applied.
pub fn inner_html(el: ElementRef, edits: &EditSet) -> String {
    let mut out = String::new();
    for child in el.children() {
        write_node(child, edits, &mut out);
    }
    out
}

/// Serialize the whole document with edits applied and parse the result
/// back into a fresh tree.
pub fn apply_edits(doc: &Html, edits: &EditSet) -> Html {
    let html = match doc.select(&scraper::Selector::parse("html").unwrap()).next() {
        Some(root) => element_html(root, edits),
        None => inner_html(doc.root_element(), edits),
    };
    Html::parse_document(&html)
}

pub(crate) fn write_node(node: NodeRef<Node>, edits: &EditSet, out: &mut String) {
    if edits.remove.contains(&node.id()) {
        return;
    }
    match node.value() {
        Node::Text(text) => out.push_str(&escape_text(text)),
        Node::Comment(comment) => {
            if !edits.strip_comments {
                out.push_str("<!--");
                out.push_str(comment);
                out.push_str("-->");
            }
        }
        Node::Element(el) => {
            if edits.unwrap.contains(&node.id()) {
                for child in node.children() {
                    write_node(child, edits, out);
                }
                return;
            }

            let tag = edits
                .rename
                .get(&node.id())
                .copied()
                .unwrap_or_else(|| el.name());
            let dropped = edits.drop_attrs.get(&node.id());
            let set = edits.set_attrs.get(&node.id());

            out.push('<');
            out.push_str(tag);
            for (name, value) in el.attrs() {
                if dropped.is_some_and(|d| d.iter().any(|a| a.eq_ignore_ascii_case(name))) {
                    continue;
                }
                if set.is_some_and(|s| s.iter().any(|(k, _)| k.eq_ignore_ascii_case(name))) {
                    continue;
                }
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                out.push_str(&escape_attr(value));
                out.push('"');
            }
            if let Some(set) = set {
                for (name, value) in set {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    out.push_str(&escape_attr(value));
                    out.push('"');
                }
            }

            if is_void_element(tag) {
                out.push_str(" />");
                return;
            }

            out.push('>');
            for child in node.children() {
                write_node(child, edits, out);
            }
            out.push_str("</");
            out.push_str(tag);
            out.push('>');
        }
        _ => {}
    }
}

pub(crate) fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

pub(crate) fn escape_attr(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

pub(crate) fn is_void_element(tag: &str) -> bool {
    matches!(
        tag.to_lowercase().as_str(),
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::query::{collapsed_text, select_all, select_first};

    #[test]
    fn remove_drops_subtree_keeps_following_text() {
        let doc = Html::parse_document("<div><span id='x'>gone</span> stays</div>");
        let target = select_first(&doc, "#x").unwrap();
        let mut edits = EditSet::default();
        edits.remove.insert(target.id());

        let rebuilt = apply_edits(&doc, &edits);
        let div = select_first(&rebuilt, "div").unwrap();
        assert_eq!(collapsed_text(&div), "stays");
        assert!(select_first(&rebuilt, "span").is_none());
    }

    #[test]
    fn unwrap_splices_children_in_place() {
        let doc = Html::parse_document("<p>a <em>b <b>c</b></em> d</p>");
        let em = select_first(&doc, "em").unwrap();
        let mut edits = EditSet::default();
        edits.unwrap.insert(em.id());

        let rebuilt = apply_edits(&doc, &edits);
        let p = select_first(&rebuilt, "p").unwrap();
        assert_eq!(collapsed_text(&p), "a b c d");
        assert!(select_first(&rebuilt, "em").is_none());
        assert!(select_first(&rebuilt, "b").is_some());
    }

    #[test]
    fn rename_preserves_structure() {
        let doc = Html::parse_document("<div class='k'><i>x</i></div>");
        let div = select_first(&doc, "div").unwrap();
        let mut edits = EditSet::default();
        edits.rename.insert(div.id(), "p");

        let rebuilt = apply_edits(&doc, &edits);
        let p = select_first(&rebuilt, "p").unwrap();
        assert_eq!(p.value().attr("class"), Some("k"));
        assert!(select_first(&rebuilt, "i").is_some());
        assert!(select_all(&rebuilt, "div").is_empty());
    }

    #[test]
    fn drop_attrs_removes_named_attribute() {
        let doc = Html::parse_document("<body class='bad' id='keep'><p>x</p></body>");
        let body = select_first(&doc, "body").unwrap();
        let mut edits = EditSet::default();
        edits.drop_attrs.insert(body.id(), vec!["class"]);

        let rebuilt = apply_edits(&doc, &edits);
        let body = select_first(&rebuilt, "body").unwrap();
        assert_eq!(body.value().attr("class"), None);
        assert_eq!(body.value().attr("id"), Some("keep"));
    }

    #[test]
    fn set_attrs_overrides_and_appends() {
        let doc = Html::parse_document("<img src='old.jpg' alt='x'>");
        let img = select_first(&doc, "img").unwrap();
        let mut edits = EditSet::default();
        edits.set_attrs.insert(
            img.id(),
            vec![
                ("src".to_string(), "new.jpg".to_string()),
                ("width".to_string(), "640".to_string()),
            ],
        );

        let rebuilt = apply_edits(&doc, &edits);
        let img = select_first(&rebuilt, "img").unwrap();
        assert_eq!(img.value().attr("src"), Some("new.jpg"));
        assert_eq!(img.value().attr("width"), Some("640"));
        assert_eq!(img.value().attr("alt"), Some("x"));
    }

    #[test]
    fn strip_comments_removes_comment_nodes() {
        let doc = Html::parse_document("<div>a<!-- hidden -->b</div>");
        let edits = EditSet {
            strip_comments: true,
            ..Default::default()
        };
        let rebuilt = apply_edits(&doc, &edits);
        let div = select_first(&rebuilt, "div").unwrap();
        assert_eq!(div.inner_html(), "ab");
    }

    #[test]
    fn text_is_escaped_on_round_trip() {
        let doc = Html::parse_document("<p>1 &lt; 2 &amp; 3</p>");
        let rebuilt = apply_edits(&doc, &EditSet::default());
        let p = select_first(&rebuilt, "p").unwrap();
        assert_eq!(collapsed_text(&p), "1 < 2 & 3");
    }
}
