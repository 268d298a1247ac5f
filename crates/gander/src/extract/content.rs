//! Best-node selection: stopword-based gravity scoring over candidate
//! paragraphs, propagated to their containers.
//!
//! Scores live in an external side table keyed by node id, created and
//! dropped inside one extraction call. Nothing is written into the tree, so
//! any number of extractions over distinct documents can run in parallel.
//!
//! The numeric constants here are empirically tuned against real article
//! pages; do not adjust them without re-validating on a corpus.

use std::collections::{HashMap, HashSet};

use ego_tree::NodeId;
use scraper::{ElementRef, Html};

use crate::config::Config;
use crate::dom::query::{child_elements, collapsed_text, descendants_by_tags, elements_by_tags};
use crate::stopwords::count_stopwords;

/// Candidate tags considered as text-bearing units.
const CANDIDATE_TAGS: &[&str] = &["p", "pre", "td"];

/// Candidates need more stopword hits than this to count as prose.
const MIN_STOPWORD_HITS: usize = 2;

/// Sibling-walk limit for the boost test.
const BOOST_MAX_STEPS: usize = 3;

/// Stopword hits a nearby sibling needs to qualify a node for boost.
const BOOST_MIN_STOPWORDS: usize = 5;

/// Above this many candidates the tail of the document is penalized.
const MANY_CANDIDATES: usize = 15;

/// Fraction of candidates (by document order, from the end) in the
/// negative-score zone.
const NEGATIVE_ZONE_RATIO: f64 = 0.25;

/// Accumulated penalty cap; past it a candidate's delta resets to the bonus.
const NEGATIVE_CAP: f64 = 40.0;
const NEGATIVE_RESET_BONUS: f64 = 5.0;

/// Sibling paragraphs must beat this fraction of the baseline to be
/// re-attached.
const SIBLING_BASELINE_FACTOR: f64 = 0.30;

/// Baseline when the top node has no scored paragraphs at all.
const SIBLING_DEFAULT_BASELINE: f64 = 100_000.0;

/// Accumulated relevance for one container node.
#[derive(Debug, Clone, Copy, Default)]
pub struct GravityScore {
    /// Additive score propagated from candidate children.
    pub score: i32,
    /// How many candidates contributed.
    pub nodes: u32,
}

/// Per-extraction score side table.
pub type NodeScores = HashMap<NodeId, GravityScore>;

/// The selected article container plus the score table that chose it.
pub struct BestNode<'a> {
    pub node: ElementRef<'a>,
    pub scores: NodeScores,
}

fn add_score(scores: &mut NodeScores, id: NodeId, amount: i32) {
    let entry = scores.entry(id).or_default();
    entry.score += amount;
    entry.nodes += 1;
}

fn stopword_hits(el: &ElementRef, lang: &str) -> usize {
    count_stopwords(&collapsed_text(el), lang).stopword_count
}

/// The high-link-density gate: many short links, or a few links covering
/// most of the text, mark a node as navigation rather than prose.
pub fn is_high_link_density(el: &ElementRef, threshold: f64) -> bool {
    let links = descendants_by_tags(el, &["a"]);
    if links.is_empty() {
        return false;
    }

    let text = collapsed_text(el);
    let words: Vec<&str> = text
        .split_whitespace()
        .filter(|w| !w.is_empty() && w.chars().all(char::is_alphanumeric))
        .collect();
    if words.is_empty() {
        // Pure-link node: punctuation and markup only.
        return true;
    }

    let link_text: String = links.iter().map(collapsed_text).collect::<Vec<_>>().concat();
    let link_words = link_text.split_whitespace().count();
    let score = (link_words as f64 / words.len() as f64) * links.len() as f64;
    score >= threshold
}

/// A node is boostable when a `<p>` sibling within three backward steps is
/// itself substantial (> 5 stopword hits): clusters of consecutive real
/// paragraphs reinforce each other.
pub fn is_boostable(el: &ElementRef, lang: &str) -> bool {
    let mut steps = 0;
    for sibling in el.prev_siblings().filter_map(ElementRef::wrap) {
        if sibling.value().name().eq_ignore_ascii_case("p") {
            if steps >= BOOST_MAX_STEPS {
                return false;
            }
            if stopword_hits(&sibling, lang) > BOOST_MIN_STOPWORDS {
                return true;
            }
            steps += 1;
        }
    }
    false
}

/// Score every qualifying candidate and pick the container with the highest
/// accumulated gravity score.
///
/// Returns `None` only when no candidate at all survives the stopword and
/// link-density gates; with at least one scored candidate the first
/// collected parent is the deterministic fallback.
pub fn calculate_best_node<'a>(doc: &'a Html, config: &Config) -> Option<BestNode<'a>> {
    let lang = &config.language;

    let mut nodes_with_text: Vec<(ElementRef<'a>, usize)> = Vec::new();
    for candidate in elements_by_tags(doc, CANDIDATE_TAGS) {
        let hits = stopword_hits(&candidate, lang);
        if hits > MIN_STOPWORD_HITS
            && !is_high_link_density(&candidate, config.link_density_threshold)
        {
            nodes_with_text.push((candidate, hits));
        }
    }

    let nodes_number = nodes_with_text.len();
    let bottom_zone = nodes_number as f64 * NEGATIVE_ZONE_RATIO;

    let mut scores: NodeScores = HashMap::new();
    let mut parent_nodes: Vec<ElementRef<'a>> = Vec::new();
    let mut seen: HashSet<NodeId> = HashSet::new();
    let mut starting_boost = 1.0_f64;
    let mut negative_scoring = 0.0_f64;

    for (i, (node, hits)) in nodes_with_text.iter().enumerate() {
        let mut boost_score = 0.0_f64;

        if is_boostable(node, lang) {
            boost_score = config.boost_decay_base / starting_boost;
            starting_boost += 1.0;
        }

        if nodes_number > MANY_CANDIDATES && (nodes_number - i) as f64 <= bottom_zone {
            let booster = bottom_zone - (nodes_number - i) as f64;
            boost_score = -(booster * booster);
            negative_scoring += boost_score.abs();
            if negative_scoring > NEGATIVE_CAP {
                boost_score = NEGATIVE_RESET_BONUS;
            }
        }

        let upscore = (*hits as f64 + boost_score) as i32;

        if let Some(parent) = node.parent().and_then(ElementRef::wrap) {
            add_score(&mut scores, parent.id(), upscore);
            if seen.insert(parent.id()) {
                parent_nodes.push(parent);
            }
            if let Some(grandparent) = parent.parent().and_then(ElementRef::wrap) {
                add_score(&mut scores, grandparent.id(), upscore / 2);
                if seen.insert(grandparent.id()) {
                    parent_nodes.push(grandparent);
                }
            }
        }
    }

    let mut top: Option<ElementRef<'a>> = None;
    let mut top_score = 0_i32;
    for el in &parent_nodes {
        let score = scores.get(&el.id()).map(|g| g.score).unwrap_or(0);
        if score > top_score {
            top = Some(*el);
            top_score = score;
        }
        if top.is_none() {
            top = Some(*el);
        }
    }

    top.map(|node| BestNode { node, scores })
}

/// Average stopword score of the top node's qualifying paragraphs, used as
/// the baseline for sibling re-attachment.
fn siblings_baseline(best: &BestNode, config: &Config) -> f64 {
    let mut count = 0_usize;
    let mut sum = 0_usize;
    for p in descendants_by_tags(&best.node, &["p"]) {
        let hits = stopword_hits(&p, &config.language);
        if hits > MIN_STOPWORD_HITS && !is_high_link_density(&p, config.link_density_threshold) {
            count += 1;
            sum += hits;
        }
    }
    if count > 0 {
        sum as f64 / count as f64
    } else {
        SIBLING_DEFAULT_BASELINE
    }
}

/// Recover lead paragraphs that scored outside the chosen container: walk
/// the top node's preceding siblings and collect paragraph texts beating
/// `baseline * 0.30`, each prepended at position 0 (so the final order is
/// the reverse of the walk).
pub fn lead_sibling_paragraphs(best: &BestNode, config: &Config) -> Vec<String> {
    let baseline = siblings_baseline(best, config);
    let mut leads: Vec<String> = Vec::new();

    for sibling in best.node.prev_siblings().filter_map(ElementRef::wrap) {
        for text in sibling_paragraph_texts(&sibling, baseline, config) {
            leads.insert(0, text);
        }
    }
    leads
}

fn sibling_paragraph_texts(sibling: &ElementRef, baseline: f64, config: &Config) -> Vec<String> {
    if sibling.value().name().eq_ignore_ascii_case("p") {
        let text = collapsed_text(sibling);
        if !text.is_empty() {
            return vec![text];
        }
        return Vec::new();
    }

    let mut texts = Vec::new();
    for p in descendants_by_tags(sibling, &["p"]) {
        let text = collapsed_text(&p);
        if text.is_empty() {
            continue;
        }
        let hits = count_stopwords(&text, &config.language).stopword_count;
        if baseline * SIBLING_BASELINE_FACTOR < hits as f64
            && !is_high_link_density(&p, config.link_density_threshold)
        {
            texts.push(text);
        }
    }
    texts
}

/// Direct children of the top node that are not paragraphs and read as
/// link farms; the formatter drops them.
pub fn link_dense_children(best: &BestNode, config: &Config) -> HashSet<NodeId> {
    let mut drop = HashSet::new();
    for child in child_elements(&best.node) {
        if !child.value().name().eq_ignore_ascii_case("p")
            && is_high_link_density(&child, config.link_density_threshold)
        {
            drop.insert(child.id());
        }
    }
    drop
}
