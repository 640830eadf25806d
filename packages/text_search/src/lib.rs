#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Keyword relevance over listing addresses and descriptions.
//!
//! Each listing is indexed as one document with two weighted fields. See
//! [`index`] for the scoring model and [`tokenizer`] for text analysis.

pub mod index;
pub mod tokenizer;

use thiserror::Error;

pub use index::{Bm25Params, DocId, FieldWeights, IndexBuilder, SearchHit, TextIndex};

/// Errors that can occur while building a text index.
#[derive(Debug, Error)]
pub enum TextSearchError {
    /// No documents were added before finalizing.
    #[error("Cannot build a text index from an empty corpus")]
    EmptyCorpus,

    /// BM25 parameters are out of range.
    #[error("Invalid BM25 parameters: k1={k1}, b={b} (expected k1 >= 0 and 0 <= b <= 1)")]
    InvalidParams {
        /// Term-frequency saturation.
        k1: f64,
        /// Length normalization.
        b: f64,
    },

    /// Field weights are negative, non-finite, or all zero.
    #[error(
        "Invalid field weights: address={address}, description={description} (expected finite, non-negative, not both zero)"
    )]
    InvalidFieldWeights {
        /// Address weight.
        address: f64,
        /// Description weight.
        description: f64,
    },
}
