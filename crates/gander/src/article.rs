use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::extract::videos::Video;

/// The result of one extraction: every field is populated best-effort and
/// stays at its default when the page carries no matching data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    /// URL the article was extracted from (empty for raw-HTML input).
    pub url: String,
    /// Hostname of `url`.
    pub domain: String,
    pub title: String,
    pub authors: Vec<String>,
    pub publish_date: Option<DateTime<Utc>>,
    /// The page's self-declared preferred permanent URL.
    pub canonical_link: String,
    pub meta_description: String,
    pub meta_keywords: Vec<String>,
    pub meta_lang: String,
    /// Nested map of colon-namespaced meta tags
    /// (`og:image:width` becomes `{"og": {"image": {"width": ...}}}`).
    pub meta_data: serde_json::Value,
    pub tags: BTreeSet<String>,
    pub top_image: Option<String>,
    pub images: BTreeSet<String>,
    pub videos: Vec<Video>,
    /// Extracted keywords with normalized frequency scores.
    pub keywords: BTreeMap<String, f64>,
    pub summary: String,
    /// The cleaned article body text, paragraphs joined by blank lines.
    pub body_text: String,
    /// Sanitized article HTML, present only with `keep_article_html`.
    pub body_html: Option<String>,
}

impl Default for Article {
    fn default() -> Self {
        Self {
            url: String::new(),
            domain: String::new(),
            title: String::new(),
            authors: Vec::new(),
            publish_date: None,
            canonical_link: String::new(),
            meta_description: String::new(),
            meta_keywords: Vec::new(),
            meta_lang: String::new(),
            meta_data: serde_json::Value::Object(serde_json::Map::new()),
            tags: BTreeSet::new(),
            top_image: None,
            images: BTreeSet::new(),
            videos: Vec::new(),
            keywords: BTreeMap::new(),
            summary: String::new(),
            body_text: String::new(),
            body_html: None,
        }
    }
}

impl Article {
    /// A fresh article for the given source URL.
    pub fn new(url: impl Into<String>) -> Self {
        let url = url.into();
        let domain = url::Url::parse(&url)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.to_string()))
            .unwrap_or_default();
        Self {
            url,
            domain,
            ..Self::default()
        }
    }

    /// Words in the body text.
    pub fn word_count(&self) -> usize {
        crate::text::word_count(&self.body_text)
    }

    /// Whether the body passed the configured word and sentence minimums.
    pub fn has_valid_body(&self, config: &Config) -> bool {
        if self.word_count() < config.min_body_words {
            return false;
        }
        crate::nlp::split_sentences(&self.body_text).len() >= config.min_body_sentences
    }

    /// Returns true if nothing meaningful was extracted.
    pub fn is_empty(&self) -> bool {
        self.title.is_empty() && self.body_text.is_empty()
    }

    pub fn has_top_image(&self) -> bool {
        self.top_image.as_ref().is_some_and(|u| !u.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn new_fills_domain_from_url() {
        let article = Article::new("https://news.example.com/story/1");
        assert_eq!(article.domain, "news.example.com");
        assert!(article.is_empty());
    }

    #[test]
    fn new_tolerates_bad_url() {
        let article = Article::new("not a url");
        assert_eq!(article.domain, "");
    }

    #[test]
    fn valid_body_needs_words_and_sentences() {
        let config = Config::builder()
            .min_body_words(5)
            .min_body_sentences(2)
            .build();
        let mut article = Article::default();
        article.body_text = "Too short.".to_string();
        assert!(!article.has_valid_body(&config));

        article.body_text = "One full sentence with words. And then another one here.".to_string();
        assert!(article.has_valid_body(&config));
    }

    #[test]
    fn serializes_to_json() {
        let mut article = Article::new("https://example.com/a");
        article.title = "Hello".to_string();
        let json = serde_json::to_value(&article).unwrap();
        assert_eq!(json["title"], "Hello");
        assert_eq!(json["domain"], "example.com");
        assert!(json["meta_data"].is_object());
    }
}
