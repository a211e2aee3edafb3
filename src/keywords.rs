//! TF-IDF keyword extraction over a fitted sentence corpus.
//!
//! The extractor is fitted on a small corpus (typically the sentences of a
//! single document) and then scores query text against that vocabulary. Terms
//! that concentrate in few corpus entries outrank terms spread across all of
//! them.

use serde::Serialize;
use std::collections::HashMap;

/// Default vocabulary cap applied when fitting on a document's sentences.
pub const DEFAULT_MAX_FEATURES: usize = 5000;

/// Default number of terms returned when the caller does not ask for a count.
pub const DEFAULT_TOP_TERMS: usize = 5;

/// Tokens shorter than this many characters are ignored.
const MIN_TOKEN_CHARS: usize = 2;

/// A ranked vocabulary term with its normalized TF-IDF score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TermScore {
    /// Lowercased vocabulary term.
    pub term: String,
    /// L2-normalized TF-IDF weight, always greater than zero.
    pub score: f64,
}

/// TF-IDF vocabulary fitted over a corpus of text entries.
///
/// Uses smoothed inverse document frequency, `ln((1 + n) / (1 + df)) + 1`,
/// so terms present in every corpus entry still carry a nonzero weight.
#[derive(Debug, Default)]
pub struct KeywordExtractor {
    max_features: usize,
    idf: HashMap<String, f64>,
}

impl KeywordExtractor {
    /// Create an unfitted extractor whose vocabulary holds at most
    /// `max_features` terms.
    pub fn new(max_features: usize) -> Self {
        Self {
            max_features,
            idf: HashMap::new(),
        }
    }

    /// Fit the vocabulary and inverse document frequencies on `corpus`.
    ///
    /// When the corpus holds more distinct terms than `max_features`, the
    /// most frequent terms across the corpus are kept, with alphabetical
    /// order deciding between equally frequent terms. Refitting replaces
    /// the previous vocabulary.
    pub fn fit(&mut self, corpus: &[String]) {
        let mut document_frequency: HashMap<String, usize> = HashMap::new();
        let mut corpus_frequency: HashMap<String, usize> = HashMap::new();
        for entry in corpus {
            for (term, count) in term_counts(entry) {
                *corpus_frequency.entry(term.clone()).or_insert(0) += count;
                *document_frequency.entry(term).or_insert(0) += 1;
            }
        }

        let mut terms: Vec<(String, usize)> = corpus_frequency.into_iter().collect();
        terms.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        terms.truncate(self.max_features);

        let total_entries = corpus.len();
        self.idf = terms
            .into_iter()
            .map(|(term, _)| {
                let df = document_frequency.get(&term).copied().unwrap_or(0);
                let idf = ((1 + total_entries) as f64 / (1 + df) as f64).ln() + 1.0;
                (term, idf)
            })
            .collect();
    }

    /// Score `text` against the fitted vocabulary and return the top `limit`
    /// terms.
    ///
    /// Scores are term frequency times inverse document frequency,
    /// L2-normalized over the query. Terms outside the vocabulary are
    /// dropped, so the result may hold fewer than `limit` entries. Equal
    /// scores are ordered alphabetically.
    pub fn top_terms(&self, text: &str, limit: usize) -> Vec<TermScore> {
        if self.idf.is_empty() || limit == 0 {
            return Vec::new();
        }

        let mut weighted: Vec<TermScore> = term_counts(text)
            .into_iter()
            .filter_map(|(term, count)| {
                self.idf.get(&term).map(|idf| TermScore {
                    score: count as f64 * idf,
                    term,
                })
            })
            .collect();

        let norm = weighted
            .iter()
            .map(|entry| entry.score * entry.score)
            .sum::<f64>()
            .sqrt();
        if norm == 0.0 {
            return Vec::new();
        }
        for entry in &mut weighted {
            entry.score /= norm;
        }

        weighted.retain(|entry| entry.score > 0.0);
        weighted.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.term.cmp(&b.term)));
        weighted.truncate(limit);
        weighted
    }
}

/// Count lowercased alphanumeric tokens of at least [`MIN_TOKEN_CHARS`] characters.
fn term_counts(text: &str) -> HashMap<String, usize> {
    let lowered = text.to_lowercase();
    let mut counts = HashMap::new();
    for token in lowered.split(|c: char| !c.is_alphanumeric()) {
        if token.chars().count() >= MIN_TOKEN_CHARS {
            *counts.entry(token.to_string()).or_insert(0) += 1;
        }
    }
    counts
}
