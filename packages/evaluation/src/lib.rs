#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Retrieval evaluation for ranked property lists.
//!
//! [`metrics`] holds the pure metric functions (Precision@K, MRR, NDCG@K);
//! [`runner`] evaluates a weight profile against a file of test queries.

pub mod metrics;
pub mod runner;

use std::path::PathBuf;

use estate_rank_catalog::CatalogError;
use thiserror::Error;

pub use metrics::{GradedRelevance, mean_reciprocal_rank, ndcg_at_k, precision_at_k};
pub use runner::{
    EvaluationPaths, EvaluationQuery, EvaluationReport, QueryEvaluation, QueryMetrics,
    RankedSummary, evaluate, run_evaluation, try_run_evaluation,
};

/// Errors that can occur during a batch evaluation.
#[derive(Debug, Error)]
pub enum EvaluationError {
    /// The catalog could not be loaded.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// A query or output file could not be read or written.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A query file could not be parsed, or results could not be encoded.
    #[error("JSON error in {path}: {source}")]
    Json {
        /// File path.
        path: PathBuf,
        /// Underlying serde error.
        #[source]
        source: serde_json::Error,
    },
}
