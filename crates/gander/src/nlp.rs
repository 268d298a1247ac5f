//! Keyword and summary scoring: a small statistical module over the
//! extracted body text, separate from the extraction engine itself.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::stopwords::stopword_set;
use crate::text::word_tokens;

/// How many keywords to keep.
const KEYWORD_COUNT: usize = 10;

/// Default summary length in sentences.
pub const SUMMARY_SENTENCES: usize = 5;

static SENTENCE_SPLIT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]+(?:\s+|$)").unwrap());

/// Split text into sentences on terminal punctuation. Simple and
/// deterministic; not grammar-aware.
pub fn split_sentences(text: &str) -> Vec<String> {
    SENTENCE_SPLIT_RE
        .split(text)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

/// Frequency-scored keywords: stopwords and single letters excluded, counts
/// normalized against the most frequent term.
pub fn keywords(text: &str, lang: &str) -> BTreeMap<String, f64> {
    let stops = stopword_set(lang);
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();

    for token in word_tokens(text) {
        if token.len() < 2 || stops.contains(token.as_str()) {
            continue;
        }
        if token.chars().all(|c| c.is_ascii_digit()) {
            continue;
        }
        *counts.entry(token).or_insert(0) += 1;
    }

    let mut ranked: Vec<(String, usize)> = counts.into_iter().collect();
    // Highest count first; ties resolve alphabetically for determinism.
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(KEYWORD_COUNT);

    let max = ranked.first().map(|(_, c)| *c).unwrap_or(1) as f64;
    ranked
        .into_iter()
        .map(|(word, count)| (word, count as f64 / max))
        .collect()
}

/// Score sentences by title overlap, keyword weight and position, and keep
/// the best ones in document order.
pub fn summarize(title: &str, text: &str, lang: &str, max_sentences: usize) -> String {
    let sentences = split_sentences(text);
    if sentences.is_empty() || max_sentences == 0 {
        return String::new();
    }

    let title_words = word_tokens(title);
    let keyword_scores = keywords(text, lang);
    let total = sentences.len() as f64;

    let mut scored: Vec<(usize, f64)> = sentences
        .iter()
        .enumerate()
        .map(|(i, sentence)| {
            let tokens = word_tokens(sentence);
            let title_overlap = tokens
                .iter()
                .filter(|t| title_words.contains(*t))
                .count() as f64;
            let keyword_weight: f64 = tokens
                .iter()
                .filter_map(|t| keyword_scores.get(t))
                .sum();
            // Earlier sentences carry more of the story.
            let position_bonus = (total - i as f64) / total;
            (i, title_overlap + keyword_weight + position_bonus)
        })
        .collect();

    scored.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    let mut picked: Vec<usize> = scored
        .into_iter()
        .take(max_sentences)
        .map(|(i, _)| i)
        .collect();
    picked.sort_unstable();

    picked
        .into_iter()
        .map(|i| sentences[i].clone())
        .collect::<Vec<_>>()
        .join(". ")
}
