//! Field-weighted BM25 index.
//!
//! Documents are accumulated in an [`IndexBuilder`] and frozen into a
//! query-only [`TextIndex`] by [`IndexBuilder::finalize`]. The builder is
//! consumed, so documents cannot be added to a finalized index and a
//! builder cannot be queried.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::TextSearchError;
use crate::tokenizer::analyze;

/// Position of a document in insertion order.
pub type DocId = usize;

/// BM25 tuning parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Bm25Params {
    /// Term-frequency saturation.
    pub k1: f64,
    /// Length normalization strength in `[0, 1]`.
    pub b: f64,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Self { k1: 1.2, b: 0.75 }
    }
}

/// Relative importance of each indexed field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FieldWeights {
    /// Weight of the formatted address.
    pub address: f64,
    /// Weight of the free-text description.
    pub description: f64,
}

impl Default for FieldWeights {
    fn default() -> Self {
        Self {
            address: 1.0,
            description: 2.0,
        }
    }
}

/// A scored document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchHit {
    /// Document position.
    pub id: DocId,
    /// BM25 relevance, `0` when no query term matched.
    pub score: f64,
}

#[derive(Debug, Clone, Default)]
struct DocStats {
    length: f64,
}

/// Accumulates documents for a [`TextIndex`].
#[derive(Debug, Clone, Default)]
pub struct IndexBuilder {
    params: Bm25Params,
    fields: FieldWeights,
    docs: Vec<DocStats>,
    postings: BTreeMap<String, Vec<(DocId, f64)>>,
}

impl IndexBuilder {
    /// A builder with default BM25 parameters and field weights.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the BM25 parameters.
    #[must_use]
    pub const fn with_params(mut self, params: Bm25Params) -> Self {
        self.params = params;
        self
    }

    /// Overrides the field weights.
    #[must_use]
    pub const fn with_field_weights(mut self, fields: FieldWeights) -> Self {
        self.fields = fields;
        self
    }

    /// Number of documents added so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.docs.len()
    }

    /// Whether no documents have been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// Adds one document and returns its id.
    pub fn add(&mut self, address: &str, description: &str) -> DocId {
        let id = self.docs.len();
        let mut weighted_tf: HashMap<String, f64> = HashMap::new();
        let mut length = 0.0;

        for (text, weight) in [
            (address, self.fields.address),
            (description, self.fields.description),
        ] {
            for term in analyze(text) {
                *weighted_tf.entry(term).or_insert(0.0) += weight;
                length += weight;
            }
        }

        // Terms seen only in zero-weight fields do not count toward df.
        for (term, tf) in weighted_tf.into_iter().filter(|(_, tf)| *tf > 0.0) {
            self.postings.entry(term).or_default().push((id, tf));
        }
        self.docs.push(DocStats { length });

        id
    }

    /// Freezes the corpus into a queryable index.
    ///
    /// # Errors
    ///
    /// * [`TextSearchError::EmptyCorpus`] if no documents were added
    /// * [`TextSearchError::InvalidParams`] if `k1` is negative or `b` is
    ///   outside `[0, 1]`
    /// * [`TextSearchError::InvalidFieldWeights`] if a field weight is
    ///   negative or non-finite, or both are zero
    pub fn finalize(self) -> Result<TextIndex, TextSearchError> {
        if self.docs.is_empty() {
            return Err(TextSearchError::EmptyCorpus);
        }

        let Bm25Params { k1, b } = self.params;
        if !(k1.is_finite() && k1 >= 0.0 && (0.0..=1.0).contains(&b)) {
            return Err(TextSearchError::InvalidParams { k1, b });
        }

        let FieldWeights {
            address,
            description,
        } = self.fields;
        let valid = |w: f64| w.is_finite() && w >= 0.0;
        if !(valid(address) && valid(description) && address + description > 0.0) {
            return Err(TextSearchError::InvalidFieldWeights {
                address,
                description,
            });
        }

        #[allow(clippy::cast_precision_loss)]
        let avg_doc_length =
            self.docs.iter().map(|d| d.length).sum::<f64>() / self.docs.len() as f64;

        log::debug!(
            "Finalized text index: {} documents, {} terms, avg length {avg_doc_length:.2}",
            self.docs.len(),
            self.postings.len()
        );

        Ok(TextIndex {
            params: self.params,
            docs: self.docs,
            postings: self.postings,
            avg_doc_length,
        })
    }
}

/// An immutable, query-only BM25 index.
#[derive(Debug, Clone)]
pub struct TextIndex {
    params: Bm25Params,
    docs: Vec<DocStats>,
    postings: BTreeMap<String, Vec<(DocId, f64)>>,
    avg_doc_length: f64,
}

impl TextIndex {
    /// Number of indexed documents; never zero.
    #[must_use]
    pub fn len(&self) -> usize {
        self.docs.len()
    }

    /// Always `false`; finalizing an empty corpus is rejected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// Mean weighted document length.
    #[must_use]
    pub const fn avg_doc_length(&self) -> f64 {
        self.avg_doc_length
    }

    /// Number of documents containing `term` (an analyzed term).
    #[must_use]
    pub fn document_frequency(&self, term: &str) -> usize {
        self.postings.get(term).map_or(0, Vec::len)
    }

    /// Per-document relevance for `query`, indexed by [`DocId`].
    #[must_use]
    pub fn scores(&self, query: &str) -> Vec<f64> {
        let mut scores = vec![0.0; self.docs.len()];
        let Bm25Params { k1, b } = self.params;

        #[allow(clippy::cast_precision_loss)]
        let n = self.docs.len() as f64;

        for term in analyze(query) {
            let Some(postings) = self.postings.get(&term) else {
                continue;
            };

            #[allow(clippy::cast_precision_loss)]
            let df = postings.len() as f64;
            let idf = ((n - df + 0.5) / (df + 0.5) + 1.0).ln();

            for &(id, tf) in postings {
                let dl = self.docs[id].length;
                let tf_norm =
                    (tf * (k1 + 1.0)) / (tf + k1 * (1.0 - b + b * dl / self.avg_doc_length));
                scores[id] += idf * tf_norm;
            }
        }

        scores
    }

    /// Every document with its relevance, best first; ties by id.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<SearchHit> {
        let mut hits: Vec<SearchHit> = self
            .scores(query)
            .into_iter()
            .enumerate()
            .map(|(id, score)| SearchHit { id, score })
            .collect();

        hits.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.id.cmp(&b.id)));
        hits
    }

    /// Documents with a positive relevance, best first; ties by id.
    #[must_use]
    pub fn matches(&self, query: &str) -> Vec<SearchHit> {
        let mut hits = self.search(query);
        hits.retain(|hit| hit.score > 0.0);
        hits
    }
}
