//! The staged extraction pipeline (`Page`) and the one-shot client
//! (`Gander`).
//!
//! A `Page` moves through `download()` (or `set_html()`) then `parse()` then
//! `nlp()`; calling a stage before its predecessor is a programmer error and
//! fails with `ErrorCode::NotReady` naming the missing step. Unparseable or
//! empty input is not an error: `parse()` yields an article whose fields
//! stay at their defaults.

use crate::article::Article;
use crate::config::Config;
use crate::dom::cleaner;
use crate::error::ExtractError;
use crate::extract::authors::extract_authors;
use crate::extract::content::{calculate_best_node, lead_sibling_paragraphs, link_dense_children};
use crate::extract::date::extract_publish_date;
use crate::extract::images::{collect_images, extract_top_image};
use crate::extract::metadata::{
    extract_canonical_link, extract_meta_data, extract_meta_description, extract_meta_keywords,
    extract_meta_lang, extract_tags, extract_title,
};
use crate::extract::videos::extract_videos;
use crate::format::get_formatted;
use crate::resource::{fetch, FetchOptions};

/// One article page moving through the staged pipeline.
#[derive(Debug)]
pub struct Page {
    url: Option<String>,
    config: Config,
    html: Option<String>,
    article: Option<Article>,
}

impl Page {
    /// A page that will be downloaded from `url`.
    pub fn new(url: impl Into<String>, config: Config) -> Self {
        Self {
            url: Some(url.into()),
            config,
            html: None,
            article: None,
        }
    }

    /// A page built directly from pre-fetched HTML.
    pub fn from_html(html: impl Into<String>, config: Config) -> Self {
        Self {
            url: None,
            config,
            html: Some(html.into()),
            article: None,
        }
    }

    /// Fetch the page body over HTTP.
    pub fn download(&mut self) -> Result<&mut Self, ExtractError> {
        let Some(url) = self.url.clone() else {
            return Err(ExtractError::invalid_url(
                "",
                "Download",
                Some(anyhow::anyhow!("page has no URL to download")),
            ));
        };
        let result = fetch(&url, &self.config, &FetchOptions::from_config(&self.config))?;
        self.html = Some(result.text());
        Ok(self)
    }

    /// Supply a pre-fetched body instead of downloading.
    pub fn set_html(&mut self, html: impl Into<String>) -> &mut Self {
        self.html = Some(html.into());
        self
    }

    /// Run the extraction pipeline. Requires a body from `download()` or
    /// `set_html()`.
    pub fn parse(&mut self) -> Result<&Article, ExtractError> {
        let Some(html) = self.html.as_deref() else {
            return Err(ExtractError::not_ready("Parse", "download"));
        };
        let article = run_extraction(self.url.as_deref(), html, &self.config);
        self.article = Some(article);
        Ok(self.article.as_ref().unwrap_or_else(|| unreachable!()))
    }

    /// Compute keywords and a summary over the parsed body. Requires
    /// `parse()`.
    pub fn nlp(&mut self) -> Result<&Article, ExtractError> {
        let Some(article) = self.article.as_mut() else {
            return Err(ExtractError::not_ready("Nlp", "parse"));
        };
        let lang = if article.meta_lang.is_empty() {
            self.config.language.clone()
        } else {
            article.meta_lang.clone()
        };
        let corpus = format!("{}. {}", article.title, article.body_text);
        article.keywords = crate::nlp::keywords(&corpus, &lang);
        article.summary = crate::nlp::summarize(
            &article.title,
            &article.body_text,
            &lang,
            crate::nlp::SUMMARY_SENTENCES,
        );
        Ok(article)
    }

    /// The extracted article, once `parse()` has run.
    pub fn article(&self) -> Option<&Article> {
        self.article.as_ref()
    }
}

/// The full per-document pipeline: metadata off the raw tree, then clean,
/// score, and format. Single-threaded and allocation-local; callers may run
/// any number of these concurrently over distinct documents.
fn run_extraction(url: Option<&str>, html: &str, config: &Config) -> Article {
    let mut article = match url {
        Some(url) => Article::new(url),
        None => Article::default(),
    };
    if html.trim().is_empty() {
        return article;
    }

    let parser = config.parser_kind.parser();
    let doc = parser.parse_document(html);

    article.title = extract_title(&doc, config);
    article.authors = extract_authors(&doc, config);
    article.publish_date = extract_publish_date(&doc, url);
    article.canonical_link = extract_canonical_link(&doc, url);
    article.meta_description = extract_meta_description(&doc);
    article.meta_keywords = extract_meta_keywords(&doc);
    article.meta_lang = extract_meta_lang(&doc);
    article.meta_data = extract_meta_data(&doc);
    article.tags = extract_tags(&doc);
    article.top_image = extract_top_image(&doc, url);

    let cleaned = cleaner::clean(&doc, config);
    if let Some(best) = calculate_best_node(&cleaned, config) {
        let leads = lead_sibling_paragraphs(&best, config);
        let drop = link_dense_children(&best, config);

        if config.fetch_images {
            article.images = collect_images(&best.node, url);
        }
        article.videos = extract_videos(&best.node);

        let formatted = get_formatted(&best, &leads, &drop, config);
        article.body_text = formatted.text;
        article.body_html = formatted.html;
    }

    article
}

/// One-shot convenience client over the staged pipeline.
#[derive(Debug, Clone, Default)]
pub struct Gander {
    config: Config,
}

impl Gander {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Download, parse and run NLP over one URL.
    pub fn extract_url(&self, url: &str) -> Result<Article, ExtractError> {
        let mut page = Page::new(url, self.config.clone());
        page.download()?;
        page.parse()?;
        page.nlp()?;
        Ok(page.article.unwrap_or_default())
    }

    /// Parse pre-fetched HTML, with an optional source URL for link and
    /// date resolution.
    pub fn extract_html(&self, url: Option<&str>, html: &str) -> Result<Article, ExtractError> {
        let mut page = match url {
            Some(url) => Page::new(url, self.config.clone()),
            None => Page::from_html(html, self.config.clone()),
        };
        if url.is_some() {
            page.set_html(html);
        }
        page.parse()?;
        page.nlp()?;
        Ok(page.article.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROSE: &str = "It was then that the committee said it would be necessary for all of \
        them to act together, because there was no other way to be sure of what could happen \
        when they were done with it.";

    #[test]
    fn parse_before_download_is_not_ready() {
        let mut page = Page::new("https://example.com/a", Config::default());
        let err = page.parse().expect_err("must not parse");
        assert!(err.is_not_ready());
        assert!(err.to_string().contains("download"));
    }

    #[test]
    fn nlp_before_parse_is_not_ready() {
        let mut page = Page::from_html("<html></html>", Config::default());
        let err = page.nlp().expect_err("must not nlp");
        assert!(err.is_not_ready());
        assert!(err.to_string().contains("parse"));
    }

    #[test]
    fn empty_html_parses_to_empty_article() {
        let mut page = Page::from_html("", Config::default());
        let article = page.parse().expect("empty input is not an error");
        assert!(article.is_empty());
    }

    #[test]
    fn garbage_html_parses_to_article_without_crash() {
        let gander = Gander::default();
        let article = gander
            .extract_html(None, "<<<>>> not really <html <body")
            .expect("garbage must not error");
        assert!(article.authors.is_empty());
        assert!(article.publish_date.is_none());
    }

    #[test]
    fn full_pipeline_extracts_body_and_metadata() {
        let html = format!(
            "<html lang='en'><head>\
             <title>Committee acts | Example News</title>\
             <meta name='author' content='Jane Doe'>\
             <meta property='article:published_time' content='2021-05-04T10:00:00Z'>\
             <meta property='og:image' content='https://example.com/lead.jpg'>\
             </head><body>\
             <div class='sidebar'><a href='/a'>Home</a></div>\
             <div id='story'><p>{prose}</p><p>{prose}</p></div>\
             </body></html>",
            prose = PROSE
        );
        let gander = Gander::default();
        let article = gander
            .extract_html(Some("https://example.com/2021/05/04/story"), &html)
            .expect("pipeline runs");

        assert!(article.body_text.contains("It was then"));
        assert_eq!(article.authors, vec!["Jane Doe"]);
        assert!(article.publish_date.is_some());
        assert_eq!(article.top_image.as_deref(), Some("https://example.com/lead.jpg"));
        assert!(!article.keywords.is_empty());
        assert!(!article.summary.is_empty());
        assert_eq!(article.domain, "example.com");
    }

    #[test]
    fn download_without_url_is_invalid() {
        let mut page = Page::from_html("<p>x</p>", Config::default());
        let err = page.download().expect_err("no url to download");
        assert!(err.is_invalid_url());
    }
}
