//! Keyword signal extraction from item text
//!
//! Tokenizes titles, descriptions and tags across a batch, filters
//! stop-words and short tokens, and ranks surviving terms by a
//! tf–idf style score so distinguishing terms outrank ubiquitous ones.
//! Bigrams come from adjacent token pairs within a single field and are
//! ranked independently of the single-token list.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;

use crate::models::RawItemRecord;

/// Frequency and rank data for one term
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordStat {
    /// Single token, or a space-joined adjacent pair
    pub term: String,

    /// Total occurrences across the batch
    pub frequency: u64,

    /// Distinct items containing the term
    pub doc_frequency: u64,

    /// frequency × ln(items / doc_frequency)
    pub score: f64,
}

/// Ranked keyword lists for one batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordOutput {
    /// Single tokens, score descending, ties lexicographic
    pub keywords: Vec<KeywordStat>,

    /// Adjacent-pair terms, ranked independently
    pub bigrams: Vec<KeywordStat>,

    /// Distinct items that contributed text
    pub documents: usize,
}

impl KeywordOutput {
    /// True when no term survived tokenization and filtering
    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty() && self.bigrams.is_empty()
    }
}

fn token_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\w+").expect("literal pattern compiles"))
}

/// Extract and rank keywords from a batch of items.
///
/// Each identifier counts as one document regardless of how many snapshots
/// of it the batch holds; the later-arriving record's text wins, matching
/// the normalizer's duplicate policy.
pub fn extract_keywords(
    items: &[RawItemRecord],
    stop_words: &BTreeSet<String>,
    min_token_len: usize,
    limit: Option<usize>,
) -> KeywordOutput {
    let mut documents: BTreeMap<&str, &RawItemRecord> = BTreeMap::new();
    for item in items {
        documents.insert(item.id.as_str(), item);
    }
    let n_docs = documents.len();

    let mut term_freq: BTreeMap<String, u64> = BTreeMap::new();
    let mut term_docs: BTreeMap<String, BTreeSet<&str>> = BTreeMap::new();
    let mut bigram_freq: BTreeMap<String, u64> = BTreeMap::new();
    let mut bigram_docs: BTreeMap<String, BTreeSet<&str>> = BTreeMap::new();

    for (&id, item) in &documents {
        let mut fields: Vec<&str> = vec![&item.title, &item.description];
        fields.extend(item.tags.iter().map(String::as_str));

        for field in fields {
            // Filter decisions are made per raw position so that bigram
            // adjacency reflects the original text, not the filtered stream.
            let tokens: Vec<Option<String>> = token_regex()
                .find_iter(field)
                .map(|m| {
                    let token = m.as_str().to_lowercase();
                    (token.chars().count() >= min_token_len && !stop_words.contains(&token))
                        .then_some(token)
                })
                .collect();

            for token in tokens.iter().flatten() {
                *term_freq.entry(token.clone()).or_insert(0) += 1;
                term_docs.entry(token.clone()).or_default().insert(id);
            }

            for pair in tokens.windows(2) {
                if let (Some(a), Some(b)) = (&pair[0], &pair[1]) {
                    let bigram = format!("{a} {b}");
                    *bigram_freq.entry(bigram.clone()).or_insert(0) += 1;
                    bigram_docs.entry(bigram).or_default().insert(id);
                }
            }
        }
    }

    let output = KeywordOutput {
        keywords: rank(term_freq, &term_docs, n_docs, limit),
        bigrams: rank(bigram_freq, &bigram_docs, n_docs, limit),
        documents: n_docs,
    };

    tracing::debug!(
        documents = n_docs,
        keywords = output.keywords.len(),
        bigrams = output.bigrams.len(),
        "keyword extraction complete"
    );

    output
}

fn rank(
    frequencies: BTreeMap<String, u64>,
    doc_sets: &BTreeMap<String, BTreeSet<&str>>,
    n_docs: usize,
    limit: Option<usize>,
) -> Vec<KeywordStat> {
    let mut stats: Vec<KeywordStat> = frequencies
        .into_iter()
        .map(|(term, frequency)| {
            let doc_frequency = doc_sets.get(&term).map_or(0, BTreeSet::len) as u64;
            let idf = if doc_frequency == 0 {
                0.0
            } else {
                (n_docs as f64 / doc_frequency as f64).ln()
            };
            KeywordStat {
                score: frequency as f64 * idf,
                term,
                frequency,
                doc_frequency,
            }
        })
        .collect();

    stats.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.term.cmp(&b.term))
    });
    if let Some(limit) = limit {
        stats.truncate(limit);
    }
    stats
}
