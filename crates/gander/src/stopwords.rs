//! Language-specific stopword sets and stopword counting.
//!
//! Stopword density is the core content signal: paragraphs dense in common
//! words are prose, paragraphs without them are navigation and labels. Sets
//! are embedded at compile time and keyed by 2-letter language code; unknown
//! codes fall back to English.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;

use crate::text::word_tokens;

static ENGLISH: Lazy<HashSet<&'static str>> =
    Lazy::new(|| parse_list(include_str!("../data/stopwords/en.txt")));

static LANGUAGES: Lazy<HashMap<&'static str, HashSet<&'static str>>> = Lazy::new(|| {
    let mut m = HashMap::new();
    m.insert("en", parse_list(include_str!("../data/stopwords/en.txt")));
    m.insert("de", parse_list(include_str!("../data/stopwords/de.txt")));
    m.insert("fr", parse_list(include_str!("../data/stopwords/fr.txt")));
    m.insert("es", parse_list(include_str!("../data/stopwords/es.txt")));
    m.insert("it", parse_list(include_str!("../data/stopwords/it.txt")));
    m.insert("pt", parse_list(include_str!("../data/stopwords/pt.txt")));
    m.insert("nl", parse_list(include_str!("../data/stopwords/nl.txt")));
    m.insert("sv", parse_list(include_str!("../data/stopwords/sv.txt")));
    m.insert("da", parse_list(include_str!("../data/stopwords/da.txt")));
    m.insert("no", parse_list(include_str!("../data/stopwords/no.txt")));
    m
});

fn parse_list(data: &'static str) -> HashSet<&'static str> {
    data.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .collect()
}

/// Normalize a language/locale code to its primary 2-letter tag
/// ("en_US" -> "en", "PT-BR" -> "pt").
pub fn normalize_lang(value: &str) -> String {
    value
        .trim()
        .to_lowercase()
        .split(|c| c == '-' || c == '_')
        .next()
        .unwrap_or("")
        .to_string()
}

/// Look up the stopword set for a language code, falling back to English.
pub fn stopword_set(lang: &str) -> &'static HashSet<&'static str> {
    let key = normalize_lang(lang);
    LANGUAGES.get(key.as_str()).unwrap_or(&ENGLISH)
}

/// Language codes with an embedded stopword list.
pub fn available_languages() -> Vec<&'static str> {
    let mut langs: Vec<&'static str> = LANGUAGES.keys().copied().collect();
    langs.sort_unstable();
    langs
}

/// Word statistics for one run of text.
#[derive(Debug, Clone, Default)]
pub struct WordStats {
    /// Total word tokens in the text.
    pub word_count: usize,
    /// How many tokens matched the stopword set.
    pub stopword_count: usize,
}

/// Count stopword hits in `text` against the set for `lang`.
pub fn count_stopwords(text: &str, lang: &str) -> WordStats {
    let set = stopword_set(lang);
    let tokens = word_tokens(text);
    let stopword_count = tokens.iter().filter(|t| set.contains(t.as_str())).count();
    WordStats {
        word_count: tokens.len(),
        stopword_count,
    }
}
