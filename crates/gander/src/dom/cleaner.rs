//! Document cleaner: strips boilerplate subtrees and normalizes block
//! structure before scoring.
//!
//! Every pass marks nodes into an [`EditSet`] and re-serializes; a pattern
//! that fails to compile or a fragment that resists a rule leaves the node
//! as-is rather than aborting the clean.

use ego_tree::NodeRef;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Node};

use crate::config::Config;
use crate::dom::serialize::{escape_text, is_void_element, write_node, EditSet};

/// One named group of boilerplate id/class/name patterns. The deny-list is
/// data: categories are joined into a single alternation and callers may
/// append their own fragment via `Config::extra_boilerplate`.
#[derive(Debug, Clone, Copy)]
pub struct BoilerplateCategory {
    pub name: &'static str,
    pub patterns: &'static str,
}

pub const BOILERPLATE_CATEGORIES: &[BoilerplateCategory] = &[
    BoilerplateCategory {
        name: "navigation",
        patterns: "^side$|sidebar|combx|navbar|menucontainer|breadcrumbs|pagetools|utility-bar|storytopbar-bucket|pagination",
    },
    BoilerplateCategory {
        name: "related",
        patterns: "mediaarticlerelated|related-content|relatedposts|popularquestions|communitypromo|runaroundleft",
    },
    BoilerplateCategory {
        name: "social",
        patterns: "retweet|inline-share-tools|socialnetworking|socialtools|sharetools|share-tools|addthis|facebook-broadcasting|[^-]facebook$|[^-]twitter$",
    },
    BoilerplateCategory {
        name: "footer",
        patterns: "^fn$|foot|footer|footnote",
    },
    BoilerplateCategory {
        name: "comments",
        patterns: "comment|shoutbox|disqus|js_replies|the_answers",
    },
    BoilerplateCategory {
        name: "ads",
        patterns: "sponsor|adbox|ad-break|advert|konafilter|taboola|outbrain|welcome_form|subscribe|popup",
    },
    BoilerplateCategory {
        name: "byline",
        patterns: "byline|author-dropdown|^date$|timestamp|meta$|vcard|articleheadings|post-attributes",
    },
    BoilerplateCategory {
        name: "widgets",
        patterns: "^links$|^tags$|^inset$|^print$|^tools$|contact|^caption$|wp-caption-text|legende|contenttools2",
    },
];

/// Tags whose presence as a descendant keeps a container a block container.
pub const BLOCK_TAGS: &[&str] = &[
    "a",
    "blockquote",
    "dl",
    "div",
    "img",
    "ol",
    "p",
    "pre",
    "table",
    "ul",
];

const CONVERTIBLE_TAGS: &[&str] = &["div", "span", "section"];

static BOILERPLATE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(&combined_pattern(None)).unwrap());

fn combined_pattern(extra: Option<&str>) -> String {
    let mut joined = BOILERPLATE_CATEGORIES
        .iter()
        .map(|c| c.patterns)
        .collect::<Vec<_>>()
        .join("|");
    if let Some(extra) = extra {
        if !extra.trim().is_empty() {
            joined.push('|');
            joined.push_str(extra.trim());
        }
    }
    format!("(?i){}", joined)
}

/// Compile the deny-list with caller extensions; a broken extension falls
/// back to the built-in list.
fn deny_list(config: &Config) -> Regex {
    if config.extra_boilerplate.trim().is_empty() {
        return BOILERPLATE_RE.clone();
    }
    Regex::new(&combined_pattern(Some(&config.extra_boilerplate)))
        .unwrap_or_else(|_| BOILERPLATE_RE.clone())
}

/// True if the subtree (self included) carries a "clearly article" landmark:
/// an `<article>` element, `id="article"`, or `itemprop` naming the article
/// body. A deny-list hit on such a container is ignored.
fn contains_article_landmark(el: &ElementRef) -> bool {
    el.descendants().filter_map(ElementRef::wrap).any(|e| {
        if e.value().name().eq_ignore_ascii_case("article") {
            return true;
        }
        if e.value()
            .attr("id")
            .is_some_and(|id| id.eq_ignore_ascii_case("article"))
        {
            return true;
        }
        e.value()
            .attr("itemprop")
            .is_some_and(|p| p.to_lowercase().contains("articlebody"))
    })
}

fn is_dropcap_span(el: &ElementRef) -> bool {
    el.value().name().eq_ignore_ascii_case("span")
        && el
            .value()
            .classes()
            .any(|c| c.eq_ignore_ascii_case("dropcap") || c.eq_ignore_ascii_case("drop_cap"))
}

fn has_ancestor_tag(el: &ElementRef, tag: &str) -> bool {
    el.ancestors()
        .filter_map(ElementRef::wrap)
        .any(|a| a.value().name().eq_ignore_ascii_case(tag))
}

/// Run the full cleaning pipeline over a parsed document, returning a fresh
/// cleaned tree. The input document is left untouched.
pub fn clean(doc: &Html, config: &Config) -> Html {
    let stripped = strip_pass(doc, config);
    block_normalize_pass(&stripped)
}

/// First pass: scripts/styles/comments, the `<body>` class, deny-listed
/// subtrees, `<em>` wrappers, drop caps and spans inside paragraphs.
fn strip_pass(doc: &Html, config: &Config) -> Html {
    let deny = deny_list(config);
    let mut edits = EditSet {
        strip_comments: true,
        ..Default::default()
    };

    for node in doc.tree.root().descendants() {
        let Some(el) = ElementRef::wrap(node) else {
            continue;
        };
        let tag = el.value().name().to_lowercase();

        match tag.as_str() {
            "script" | "style" => {
                edits.remove.insert(el.id());
                continue;
            }
            // One bad class match on <body> would zero out the whole page.
            "body" => {
                if el.value().attr("class").is_some() {
                    edits.drop_attrs.insert(el.id(), vec!["class"]);
                }
                continue;
            }
            "html" => continue,
            "em" => {
                if !crate::dom::query::has_descendant_tag(&el, &["img"]) {
                    edits.unwrap.insert(el.id());
                }
                continue;
            }
            _ => {}
        }

        if is_dropcap_span(&el) {
            edits.unwrap.insert(el.id());
            continue;
        }
        if tag == "span" && has_ancestor_tag(&el, "p") {
            edits.unwrap.insert(el.id());
            continue;
        }

        let denied = ["id", "class", "name"].iter().any(|attr| {
            el.value()
                .attr(attr)
                .is_some_and(|value| deny.is_match(value))
        });
        if denied && !contains_article_landmark(&el) {
            edits.remove.insert(el.id());
        }
    }

    crate::dom::serialize::apply_edits(doc, &edits)
}

/// Second pass: `div`/`span`/`section` without block descendants become
/// `<p>`; block-bearing containers get their loose inline runs (text plus
/// adjacent anchors) wrapped into synthesized paragraphs. Inside an emitted
/// paragraph a convertible wrapper is spliced away instead, never nested.
fn block_normalize_pass(doc: &Html) -> Html {
    let mut out = String::new();
    if let Some(root) = crate::dom::query::select_first(doc, "html") {
        write_normalized(*root, false, &mut out);
    }
    Html::parse_document(&out)
}

fn write_normalized(node: NodeRef<Node>, in_paragraph: bool, out: &mut String) {
    match node.value() {
        Node::Text(text) => out.push_str(&escape_text(text)),
        Node::Element(el) => {
            let name = el.name().to_lowercase();
            let element = ElementRef::wrap(node).unwrap_or_else(|| unreachable!());

            if CONVERTIBLE_TAGS.contains(&name.as_str()) {
                if in_paragraph {
                    for child in node.children() {
                        write_normalized(child, true, out);
                    }
                } else if crate::dom::query::has_descendant_tag(&element, BLOCK_TAGS) {
                    write_open_tag(el, el.name(), out);
                    write_inline_runs(node, out);
                    out.push_str("</");
                    out.push_str(el.name());
                    out.push('>');
                } else {
                    write_open_tag(el, "p", out);
                    for child in node.children() {
                        write_normalized(child, true, out);
                    }
                    out.push_str("</p>");
                }
                return;
            }

            write_open_tag(el, el.name(), out);
            if is_void_element(el.name()) {
                return;
            }
            let child_in_paragraph = in_paragraph || name == "p";
            for child in node.children() {
                write_normalized(child, child_in_paragraph, out);
            }
            out.push_str("</");
            out.push_str(el.name());
            out.push('>');
        }
        _ => {}
    }
}

/// Walk a block container's children, buffering runs of text and anchors;
/// a run with visible text becomes a synthesized `<p>`.
fn write_inline_runs(node: NodeRef<Node>, out: &mut String) {
    let mut run = String::new();

    fn flush(run: &mut String, out: &mut String) {
        if run.trim().is_empty() {
            out.push_str(run);
        } else {
            out.push_str("<p>");
            out.push_str(run.trim());
            out.push_str("</p>");
        }
        run.clear();
    }

    for child in node.children() {
        match child.value() {
            Node::Text(text) => run.push_str(&escape_text(text)),
            Node::Element(el) if el.name().eq_ignore_ascii_case("a") => {
                write_node(child, &EditSet::default(), &mut run);
            }
            Node::Element(_) => {
                flush(&mut run, out);
                write_normalized(child, false, out);
            }
            _ => {}
        }
    }
    flush(&mut run, out);
}

fn write_open_tag(el: &scraper::node::Element, tag: &str, out: &mut String) {
    out.push('<');
    out.push_str(tag);
    for (name, value) in el.attrs() {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        out.push_str(&crate::dom::serialize::escape_attr(value));
        out.push('"');
    }
    if is_void_element(tag) {
        out.push_str(" />");
    } else {
        out.push('>');
    }
}
