//! Page-level metadata: title, meta description/keywords/language, canonical
//! link, the nested meta-tag map and tag links.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Html;
use url::Url;

use crate::config::Config;
use crate::dom::query::{collapsed_text, select_all, select_first};
use crate::text::{comparison_form, normalize_spaces, truncate_chars};

/// Title delimiters, tried in order; the first one present wins.
const TITLE_DELIMITERS: &[&str] = &["|", " - ", "_", "/", " \u{bb} "];

static TAG_HREF_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/tags?/|/topic/|\?keyword=").unwrap());

/// `content` of the first matching meta tag, by `property` then `name`.
pub fn meta_content(doc: &Html, key: &str) -> Option<String> {
    for attr in ["property", "name"] {
        let css = format!("meta[{}='{}']", attr, key);
        if let Some(el) = select_first(doc, &css) {
            if let Some(content) = el.value().attr("content") {
                let trimmed = content.trim();
                if !trimmed.is_empty() {
                    return Some(trimmed.to_string());
                }
            }
        }
    }
    None
}

fn raw_title(doc: &Html) -> String {
    select_first(doc, "title")
        .map(|el| collapsed_text(&el))
        .unwrap_or_default()
}

/// Longest `<h1>` with at least 3 words.
fn best_h1(doc: &Html) -> String {
    select_all(doc, "h1")
        .iter()
        .map(collapsed_text)
        .filter(|t| t.split_whitespace().count() >= 3)
        .max_by_key(|t| t.len())
        .unwrap_or_default()
}

/// Split a raw `<title>` on the first delimiter found and keep the best
/// segment: with an h1 hint, the first segment containing the hint's
/// normalized form; otherwise the longest segment. Deterministic for a
/// fixed title and hint.
pub fn split_title(title: &str, h1_hint: Option<&str>) -> String {
    let delimiter = TITLE_DELIMITERS.iter().find(|d| title.contains(**d));
    let Some(delimiter) = delimiter else {
        return title.to_string();
    };

    let segments: Vec<&str> = title.split(delimiter).collect();
    if let Some(hint) = h1_hint {
        let hint_form = comparison_form(hint);
        if !hint_form.is_empty() {
            if let Some(seg) = segments
                .iter()
                .find(|s| comparison_form(s).contains(&hint_form))
            {
                return seg.trim().to_string();
            }
        }
    }

    segments
        .iter()
        .max_by_key(|s| s.trim().len())
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

/// Pick the article title from `<title>`, the best `<h1>` and `og:title`.
pub fn extract_title(doc: &Html, config: &Config) -> String {
    let title = raw_title(doc);
    let h1 = best_h1(doc);
    let og_title = meta_content(doc, "og:title").unwrap_or_default();

    let title_form = comparison_form(&title);
    let h1_form = comparison_form(&h1);
    let og_form = comparison_form(&og_title);

    let chosen = if !title.is_empty() && title == h1 {
        title.clone()
    } else if !h1_form.is_empty() && h1_form == og_form {
        h1.clone()
    } else if !h1_form.is_empty()
        && !og_form.is_empty()
        && title_form.contains(&h1_form)
        && title_form.contains(&og_form)
        && h1.len() > og_title.len()
    {
        h1.clone()
    } else if !og_form.is_empty() && og_form != title_form && title_form.starts_with(&og_form) {
        og_title.clone()
    } else {
        let hint = if h1.is_empty() { None } else { Some(h1.as_str()) };
        split_title(&title, hint)
    };

    // Casing and truncation drift in <title> loses to the literal heading.
    let chosen = if !h1.is_empty() && comparison_form(&chosen) == h1_form {
        h1
    } else {
        chosen
    };

    truncate_chars(&normalize_spaces(&chosen), config.max_title_chars)
}

/// Canonical link: `<link rel=canonical>`, else `og:url`; host-less values
/// are resolved against the article's own URL, stripping a redundant
/// embedded copy of the article's hostname from the path first.
pub fn extract_canonical_link(doc: &Html, article_url: Option<&str>) -> String {
    let href = select_first(doc, "link[rel='canonical']")
        .and_then(|el| el.value().attr("href").map(|h| h.trim().to_string()))
        .filter(|h| !h.is_empty())
        .or_else(|| meta_content(doc, "og:url"))
        .unwrap_or_default();

    if href.is_empty() {
        return href;
    }
    if Url::parse(&href).map(|u| u.host_str().is_some()).unwrap_or(false) {
        return href;
    }

    let Some(base) = article_url.and_then(|u| Url::parse(u).ok()) else {
        return href;
    };
    let path = match base.host_str() {
        Some(host) => {
            let pattern = format!(
                r"^(?:https?:)?(?://)?(?:www\.)?{}(/.*)$",
                regex::escape(host.trim_start_matches("www."))
            );
            match Regex::new(&pattern).ok().and_then(|re| {
                re.captures(&href)
                    .and_then(|c| c.get(1).map(|m| m.as_str().to_string()))
            }) {
                Some(stripped) => stripped,
                None => href.clone(),
            }
        }
        None => href.clone(),
    };

    base.join(&path).map(|u| u.to_string()).unwrap_or(href)
}

pub fn extract_meta_description(doc: &Html) -> String {
    meta_content(doc, "description")
        .or_else(|| meta_content(doc, "og:description"))
        .unwrap_or_default()
}

pub fn extract_meta_keywords(doc: &Html) -> Vec<String> {
    meta_content(doc, "keywords")
        .map(|kw| {
            kw.split(',')
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

pub fn extract_meta_lang(doc: &Html) -> String {
    if let Some(html) = select_first(doc, "html") {
        if let Some(lang) = html.value().attr("lang") {
            let normalized = crate::stopwords::normalize_lang(lang);
            if !normalized.is_empty() {
                return normalized;
            }
        }
    }
    meta_content(doc, "og:locale")
        .or_else(|| meta_content(doc, "content-language"))
        .map(|l| crate::stopwords::normalize_lang(&l))
        .unwrap_or_default()
}

/// Build the nested meta-tag map: colon-namespaced keys become nested
/// objects (`og:image:width` -> `{"og": {"image": {"width": ...}}}`). When a
/// leaf and a namespace collide, the leaf value moves under `"content"`.
pub fn extract_meta_data(doc: &Html) -> serde_json::Value {
    let mut root = serde_json::Map::new();

    for el in select_all(doc, "meta") {
        let key = el
            .value()
            .attr("property")
            .or_else(|| el.value().attr("name"))
            .map(str::trim)
            .unwrap_or("");
        let content = el.value().attr("content").map(str::trim).unwrap_or("");
        if key.is_empty() || content.is_empty() {
            continue;
        }
        insert_nested(&mut root, &key.split(':').collect::<Vec<_>>(), content);
    }

    serde_json::Value::Object(root)
}

fn insert_nested(map: &mut serde_json::Map<String, serde_json::Value>, path: &[&str], value: &str) {
    let Some((head, rest)) = path.split_first() else {
        return;
    };
    let key = head.to_string();

    if rest.is_empty() {
        match map.get_mut(&key) {
            Some(serde_json::Value::Object(existing)) => {
                existing.insert("content".to_string(), serde_json::Value::String(value.into()));
            }
            _ => {
                map.insert(key, serde_json::Value::String(value.into()));
            }
        }
        return;
    }

    let entry = map
        .entry(key)
        .or_insert_with(|| serde_json::Value::Object(serde_json::Map::new()));
    if !entry.is_object() {
        let old = entry.take();
        let mut inner = serde_json::Map::new();
        inner.insert("content".to_string(), old);
        *entry = serde_json::Value::Object(inner);
    }
    if let serde_json::Value::Object(inner) = entry {
        insert_nested(inner, rest, value);
    }
}

/// Tags: `a[rel=tag]` first, then tag-shaped hrefs.
pub fn extract_tags(doc: &Html) -> std::collections::BTreeSet<String> {
    let mut tags = std::collections::BTreeSet::new();

    for el in select_all(doc, "a[rel='tag']") {
        let text = collapsed_text(&el);
        if !text.is_empty() {
            tags.insert(text);
        }
    }
    if tags.is_empty() {
        for el in select_all(doc, "a[href]") {
            let href = el.value().attr("href").unwrap_or("");
            if TAG_HREF_RE.is_match(href) {
                let text = collapsed_text(&el);
                if !text.is_empty() {
                    tags.insert(text);
                }
            }
        }
    }
    tags
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn doc(html: &str) -> Html {
        Html::parse_document(html)
    }

    fn title_of(html: &str) -> String {
        extract_title(&doc(html), &Config::default())
    }

    #[test]
    fn title_equal_to_h1_is_used_unsplit() {
        let t = title_of(
            "<head><title>Big News Today | Site</title></head>\
             <body><h1>Big News Today | Site</h1></body>",
        );
        assert_eq!(t, "Big News Today | Site");
    }

    #[test]
    fn h1_matching_og_title_wins() {
        let t = title_of(
            "<head><title>Big News Today - The Daily Site</title>\
             <meta property='og:title' content='Big news today'></head>\
             <body><h1>Big News Today</h1></body>",
        );
        assert_eq!(t, "Big News Today");
    }

    #[test]
    fn longer_h1_inside_title_beats_og() {
        let t = title_of(
            "<head><title>Council votes to approve the budget - News</title>\
             <meta property='og:title' content='Council votes'></head>\
             <body><h1>Council votes to approve the budget</h1></body>",
        );
        assert_eq!(t, "Council votes to approve the budget");
    }

    #[test]
    fn og_title_prefix_of_title_wins() {
        let t = title_of(
            "<head><title>The Mayor Resigns: full coverage and reaction</title>\
             <meta property='og:title' content='The Mayor Resigns'></head><body></body>",
        );
        assert_eq!(t, "The Mayor Resigns");
    }

    #[test]
    fn fallback_splits_on_first_delimiter() {
        let t = title_of("<head><title>Short | A much longer segment kept here</title></head>");
        assert_eq!(t, "A much longer segment kept here");
    }

    #[test]
    fn split_title_is_deterministic_and_hint_driven() {
        let title = "Site News | Storm hits the northern coast";
        assert_eq!(
            split_title(title, Some("Storm hits the northern coast")),
            "Storm hits the northern coast"
        );
        assert_eq!(split_title(title, None), "Storm hits the northern coast");
        assert_eq!(split_title("No delimiters here", None), "No delimiters here");
        // Same inputs, same output.
        assert_eq!(
            split_title(title, Some("storm HITS the northern coast")),
            split_title(title, Some("storm HITS the northern coast"))
        );
    }

    #[test]
    fn final_form_prefers_literal_h1_casing() {
        let t = title_of(
            "<head><title>BIG NEWS TODAY | Site</title></head>\
             <body><h1>Big News Today</h1></body>",
        );
        assert_eq!(t, "Big News Today");
    }

    #[test]
    fn short_h1_is_ignored() {
        let t = title_of(
            "<head><title>A long and proper page title</title></head><body><h1>Hi there</h1></body>",
        );
        assert_eq!(t, "A long and proper page title");
    }

    #[test]
    fn title_is_truncated_to_config() {
        let config = Config::builder().max_title_chars(10).build();
        let d = doc("<head><title>abcdefghijklmnopqrstuvwxyz</title></head>");
        assert_eq!(extract_title(&d, &config), "abcdefghij");
    }

    #[test]
    fn canonical_prefers_link_rel() {
        let d = doc(
            "<head><link rel='canonical' href='https://example.com/a'>\
             <meta property='og:url' content='https://example.com/b'></head>",
        );
        assert_eq!(extract_canonical_link(&d, None), "https://example.com/a");
    }

    #[test]
    fn canonical_falls_back_to_og_url() {
        let d = doc("<head><meta property='og:url' content='https://example.com/b'></head>");
        assert_eq!(extract_canonical_link(&d, None), "https://example.com/b");
    }

    #[test]
    fn hostless_canonical_resolves_against_article_url() {
        let d = doc("<head><link rel='canonical' href='/stories/1'></head>");
        assert_eq!(
            extract_canonical_link(&d, Some("https://news.example.com/x/y")),
            "https://news.example.com/stories/1"
        );
    }

    #[test]
    fn embedded_own_hostname_is_stripped_from_path() {
        let d = doc("<head><link rel='canonical' href='news.example.com/stories/1'></head>");
        assert_eq!(
            extract_canonical_link(&d, Some("https://news.example.com/x")),
            "https://news.example.com/stories/1"
        );
    }

    #[test]
    fn meta_fields_extract() {
        let d = doc(
            "<html lang='en-US'><head>\
             <meta name='description' content='A short description'>\
             <meta name='keywords' content='alpha, beta , ,gamma'>\
             </head></html>",
        );
        assert_eq!(extract_meta_description(&d), "A short description");
        assert_eq!(extract_meta_keywords(&d), vec!["alpha", "beta", "gamma"]);
        assert_eq!(extract_meta_lang(&d), "en");
    }

    #[test]
    fn meta_data_nests_on_colons() {
        let d = doc(
            "<head>\
             <meta property='og:image' content='https://example.com/i.jpg'>\
             <meta property='og:image:width' content='640'>\
             <meta name='author' content='X'>\
             </head>",
        );
        let data = extract_meta_data(&d);
        assert_eq!(data["og"]["image"]["content"], "https://example.com/i.jpg");
        assert_eq!(data["og"]["image"]["width"], "640");
        assert_eq!(data["author"], "X");
    }

    #[test]
    fn tags_from_rel_tag_then_href_patterns() {
        let d = doc(
            "<body><a rel='tag' href='/t/rust'>Rust</a><a rel='tag' href='/t/web'>Web</a></body>",
        );
        let tags: Vec<String> = extract_tags(&d).into_iter().collect();
        assert_eq!(tags, vec!["Rust", "Web"]);

        let d = doc("<body><a href='/tags/economy'>Economy</a><a href='/about'>About</a></body>");
        let tags: Vec<String> = extract_tags(&d).into_iter().collect();
        assert_eq!(tags, vec!["Economy"]);
    }
}
