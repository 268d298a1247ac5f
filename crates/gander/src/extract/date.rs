//! Publish-date extraction: a date pattern in the URL wins, then an ordered
//! list of known meta tags.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Html;

use crate::dom::query::select_all;

/// Known publish-date carriers, highest priority first:
/// (attribute, value, attribute holding the date).
const PUBLISH_DATE_TAGS: &[(&str, &str, &str)] = &[
    ("property", "rnews:datePublished", "content"),
    ("property", "article:published_time", "content"),
    ("name", "OriginalPublicationDate", "content"),
    ("itemprop", "datePublished", "datetime"),
    ("property", "og:published_time", "content"),
    ("name", "article_date_original", "content"),
    ("name", "publication_date", "content"),
    ("name", "sailthru.date", "content"),
    ("name", "PublishDate", "content"),
    ("pubdate", "pubdate", "datetime"),
];

/// Strict YYYY/MM/DD-like segment inside a URL path.
static URL_DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"/((?:19|20)\d{2})[/\-_](0?[1-9]|1[0-2])[/\-_](0?[1-9]|[12]\d|3[01])(?:[/\-_]|$)")
        .unwrap()
});

/// Parse a date string leniently; `None` when nothing sensible comes out.
fn parse_date_str(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    dateparser::parse(trimmed).ok()
}

/// Date embedded in the URL path, at midnight UTC.
pub fn date_from_url(url: &str) -> Option<DateTime<Utc>> {
    let caps = URL_DATE_RE.captures(url)?;
    let year: i32 = caps.get(1)?.as_str().parse().ok()?;
    let month: u32 = caps.get(2)?.as_str().parse().ok()?;
    let day: u32 = caps.get(3)?.as_str().parse().ok()?;
    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    let midnight = date.and_hms_opt(0, 0, 0)?;
    Utc.from_utc_datetime(&midnight).into()
}

/// Extract the publish date: URL pattern first, then the meta-tag priority
/// list. Unparsable values are treated as absent and the scan continues.
pub fn extract_publish_date(doc: &Html, url: Option<&str>) -> Option<DateTime<Utc>> {
    if let Some(url) = url {
        if let Some(date) = date_from_url(url) {
            return Some(date);
        }
    }

    for (attr, value, content_attr) in PUBLISH_DATE_TAGS {
        let css = format!("[{}='{}']", attr, value);
        for el in select_all(doc, &css) {
            if let Some(raw) = el.value().attr(content_attr) {
                if let Some(date) = parse_date_str(raw) {
                    return Some(date);
                }
            }
        }
    }
    None
}
