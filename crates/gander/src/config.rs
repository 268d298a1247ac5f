use std::time::Duration;

use crate::dom::parse::{DirectParser, DomParser, RepairingParser};

/// Which DOM parser implementation to use.
///
/// Both are html5ever-backed; `Repairing` additionally scrubs control
/// characters and IE conditional comments before parsing, for feeds that
/// deliver damaged markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParserKind {
    #[default]
    Direct,
    Repairing,
}

impl ParserKind {
    /// Construct the parser implementation for this kind.
    pub fn parser(self) -> Box<dyn DomParser> {
        match self {
            ParserKind::Direct => Box::new(DirectParser),
            ParserKind::Repairing => Box::new(RepairingParser),
        }
    }
}

/// Immutable per-run configuration, passed by reference into every stage.
#[derive(Debug, Clone)]
pub struct Config {
    /// 2-letter language code driving stopword selection.
    pub language: String,
    /// Maximum characters kept in the extracted title.
    pub max_title_chars: usize,
    /// Maximum number of author names kept.
    pub max_authors: usize,
    /// Minimum words for a body to count as a valid article body.
    pub min_body_words: usize,
    /// Minimum sentences for a body to count as a valid article body.
    pub min_body_sentences: usize,
    /// Link-density score at or above which a node counts as link-dense.
    pub link_density_threshold: f64,
    /// Numerator of the decaying cluster boost applied to early boosted
    /// paragraphs.
    pub boost_decay_base: f64,
    /// Collect `<img>` URLs from the article body.
    pub fetch_images: bool,
    /// Also produce sanitized article HTML alongside the text.
    pub keep_article_html: bool,
    /// Extra boilerplate id/class patterns appended to the deny-list
    /// (regex alternation fragment, e.g. `"promo-box|mysite-widget"`).
    pub extra_boilerplate: String,
    /// Parser implementation selected for this run.
    pub parser_kind: ParserKind,
    /// HTTP request timeout for the resource fetcher.
    pub http_timeout: Duration,
    /// User-Agent header for the resource fetcher.
    pub user_agent: String,
    /// Allow fetching from private/loopback networks.
    pub allow_private_networks: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            max_title_chars: 200,
            max_authors: 10,
            min_body_words: 300,
            min_body_sentences: 7,
            link_density_threshold: 1.0,
            boost_decay_base: 50.0,
            fetch_images: true,
            keep_article_html: false,
            extra_boilerplate: String::new(),
            parser_kind: ParserKind::Direct,
            http_timeout: Duration::from_secs(30),
            user_agent: "gander/0.1".to_string(),
            allow_private_networks: false,
        }
    }
}

impl Config {
    /// Start building a configuration.
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }
}

/// Fluent builder for [`Config`].
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Set the target language (2-letter code or locale).
    pub fn language(mut self, lang: impl Into<String>) -> Self {
        self.config.language = crate::stopwords::normalize_lang(&lang.into());
        self
    }

    pub fn max_title_chars(mut self, n: usize) -> Self {
        self.config.max_title_chars = n;
        self
    }

    pub fn max_authors(mut self, n: usize) -> Self {
        self.config.max_authors = n;
        self
    }

    pub fn min_body_words(mut self, n: usize) -> Self {
        self.config.min_body_words = n;
        self
    }

    pub fn min_body_sentences(mut self, n: usize) -> Self {
        self.config.min_body_sentences = n;
        self
    }

    pub fn link_density_threshold(mut self, v: f64) -> Self {
        self.config.link_density_threshold = v;
        self
    }

    pub fn fetch_images(mut self, v: bool) -> Self {
        self.config.fetch_images = v;
        self
    }

    pub fn keep_article_html(mut self, v: bool) -> Self {
        self.config.keep_article_html = v;
        self
    }

    /// Append caller patterns to the boilerplate deny-list.
    pub fn extra_boilerplate(mut self, patterns: impl Into<String>) -> Self {
        self.config.extra_boilerplate = patterns.into();
        self
    }

    /// Choose the DOM parser implementation.
    pub fn parser(mut self, kind: ParserKind) -> Self {
        self.config.parser_kind = kind;
        self
    }

    pub fn http_timeout(mut self, timeout: Duration) -> Self {
        self.config.http_timeout = timeout;
        self
    }

    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.config.user_agent = ua.into();
        self
    }

    pub fn allow_private_networks(mut self, allow: bool) -> Self {
        self.config.allow_private_networks = allow;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = Config::default();
        assert_eq!(config.language, "en");
        assert_eq!(config.link_density_threshold, 1.0);
        assert!(!config.keep_article_html);
        assert_eq!(config.parser_kind, ParserKind::Direct);
    }

    #[test]
    fn builder_normalizes_language() {
        let config = Config::builder().language("PT-BR").build();
        assert_eq!(config.language, "pt");
    }

    #[test]
    fn builder_sets_fields() {
        let config = Config::builder()
            .keep_article_html(true)
            .parser(ParserKind::Repairing)
            .max_title_chars(80)
            .extra_boilerplate("promo-box")
            .build();
        assert!(config.keep_article_html);
        assert_eq!(config.parser_kind, ParserKind::Repairing);
        assert_eq!(config.max_title_chars, 80);
        assert_eq!(config.extra_boilerplate, "promo-box");
    }
}
