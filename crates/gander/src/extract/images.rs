//! Top image and body image collection. Meta tags decide the top image;
//! byte-level probing is a collaborator concern and never happens here.

use std::collections::BTreeSet;

use scraper::{ElementRef, Html};
use url::Url;

use crate::dom::query::{descendants_by_tags, select_first};
use crate::extract::metadata::meta_content;

fn resolve(base: Option<&Url>, raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() || raw.starts_with("data:") {
        return None;
    }
    match base {
        Some(base) => base.join(raw).ok().map(|u| u.to_string()),
        None => Some(raw.to_string()),
    }
}

/// The representative page image: `og:image`, then `twitter:image`, then
/// `<link rel="image_src">`.
pub fn extract_top_image(doc: &Html, article_url: Option<&str>) -> Option<String> {
    let base = article_url.and_then(|u| Url::parse(u).ok());

    let raw = meta_content(doc, "og:image")
        .or_else(|| meta_content(doc, "twitter:image"))
        .or_else(|| {
            select_first(doc, "link[rel='image_src']")
                .and_then(|el| el.value().attr("href").map(|h| h.to_string()))
        })?;

    resolve(base.as_ref(), &raw)
}

/// All `<img>` URLs under the chosen article node, resolved absolute.
pub fn collect_images(top_node: &ElementRef, article_url: Option<&str>) -> BTreeSet<String> {
    let base = article_url.and_then(|u| Url::parse(u).ok());
    let mut images = BTreeSet::new();

    for img in descendants_by_tags(top_node, &["img"]) {
        if let Some(src) = img.value().attr("src") {
            if let Some(resolved) = resolve(base.as_ref(), src) {
                images.insert(resolved);
            }
        }
    }
    images
}
