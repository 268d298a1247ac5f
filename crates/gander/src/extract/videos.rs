//! Embedded-video harvesting from the chosen article node.

use scraper::ElementRef;
use serde::{Deserialize, Serialize};

use crate::dom::query::descendants_by_tags;

const VIDEO_TAGS: &[&str] = &["iframe", "embed", "object", "video"];

/// Hosts recognized as video providers.
const PROVIDERS: &[&str] = &["youtube-nocookie", "youtube", "vimeo", "dailymotion"];

/// One embedded video found in the article body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Video {
    /// Embed element tag name (`iframe`, `embed`, `object`, `video`).
    pub embed_type: String,
    /// Source URL of the embed.
    pub src: String,
    /// Provider name when the host is recognized.
    pub provider: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

fn provider_of(src: &str) -> Option<String> {
    let host = url::Url::parse(src).ok()?.host_str()?.to_lowercase();
    PROVIDERS
        .iter()
        .find(|p| host.contains(*p))
        .map(|p| p.to_string())
}

fn parse_dimension(el: &ElementRef, attr: &str) -> Option<u32> {
    el.value().attr(attr).and_then(|v| v.trim().parse().ok())
}

/// Collect embedded videos under the article node, in document order.
pub fn extract_videos(top_node: &ElementRef) -> Vec<Video> {
    let mut videos = Vec::new();

    for el in descendants_by_tags(top_node, VIDEO_TAGS) {
        let tag = el.value().name().to_lowercase();
        let src = el
            .value()
            .attr("src")
            .or_else(|| el.value().attr("data"))
            .map(str::trim)
            .unwrap_or("");
        if src.is_empty() {
            continue;
        }

        videos.push(Video {
            embed_type: tag,
            src: src.to_string(),
            provider: provider_of(src),
            width: parse_dimension(&el, "width"),
            height: parse_dimension(&el, "height"),
        });
    }
    videos
}
