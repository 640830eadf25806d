#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Case study definitions and benchmark comparison results.
//!
//! A case study names a search scenario (free-text query, location filter,
//! and weight profile) together with listings known to be desirable for
//! it. Comparing the system ranking against those benchmarks yields a
//! [`ComparisonResult`].

use std::fmt;

use estate_rank_ranking_models::{RankedProperty, Weights};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// A listing known to be desirable for a case study.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkProperty {
    /// Catalog id.
    pub id: String,
    /// Why the listing is considered desirable.
    #[serde(default)]
    pub desirability_reason: String,
    /// Where the judgement came from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// A comparable listing from a public platform, shown for reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicListing {
    /// Platform name.
    pub platform: String,
    /// Listing URL.
    #[serde(default)]
    pub url: String,
    /// Position on the platform's own results page.
    pub rank: u32,
    /// Highlighted features.
    #[serde(default)]
    pub key_features: Vec<String>,
}

/// A named search scenario with its benchmark listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseStudy {
    /// Display name.
    pub name: String,
    /// Free-text description of the search.
    #[serde(default)]
    pub query: String,
    /// Case-insensitive city, state, or postal code filter; empty matches
    /// everything.
    #[serde(default)]
    pub location: String,
    /// Weight profile used to rank the filtered catalog.
    #[serde(default)]
    pub weights: Weights,
    /// Listings known to be desirable.
    #[serde(default)]
    pub benchmark_properties: Vec<BenchmarkProperty>,
    /// Comparable public listings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_listings: Option<Vec<PublicListing>>,
}

impl CaseStudy {
    /// The benchmark entry for `id`, if any.
    #[must_use]
    pub fn benchmark(&self, id: &str) -> Option<&BenchmarkProperty> {
        self.benchmark_properties.iter().find(|b| b.id == id)
    }

    /// Whether `id` is one of this study's benchmarks.
    #[must_use]
    pub fn is_benchmark(&self, id: &str) -> bool {
        self.benchmark(id).is_some()
    }
}

/// Summary statistics of where benchmark listings landed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkComparison {
    /// Benchmarks ranked 1 through 5.
    pub benchmark_in_top5: usize,
    /// Benchmarks ranked 1 through 10.
    pub benchmark_in_top10: usize,
    /// Median 1-indexed rank of the benchmarks that were found.
    pub benchmark_median_rank: Option<f64>,
    /// Mean composite score of benchmark listings.
    pub benchmark_average_score: f64,
    /// Mean composite score of all other listings.
    pub non_benchmark_average_score: f64,
}

/// Where one benchmark landed in the full ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenchmarkRank {
    /// Benchmark id.
    pub id: String,
    /// 1-indexed rank, `None` when the id is not in the filtered catalog.
    pub rank: Option<usize>,
}

/// Tone of an analysis note.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NoteSeverity {
    /// The ranking behaved as hoped.
    Good,
    /// The ranking missed an expectation.
    Warning,
}

impl NoteSeverity {
    /// Marker printed ahead of the note text.
    #[must_use]
    pub const fn marker(self) -> &'static str {
        match self {
            Self::Good => "✅",
            Self::Warning => "⚠️",
        }
    }
}

/// One human-readable observation about a comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisNote {
    /// Tone.
    pub severity: NoteSeverity,
    /// Observation text.
    pub message: String,
}

impl AnalysisNote {
    /// A positive observation.
    #[must_use]
    pub fn good(message: impl Into<String>) -> Self {
        Self {
            severity: NoteSeverity::Good,
            message: message.into(),
        }
    }

    /// A missed expectation.
    #[must_use]
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: NoteSeverity::Warning,
            message: message.into(),
        }
    }
}

impl fmt::Display for AnalysisNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.severity.marker(), self.message)
    }
}

/// Outcome of one case study.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResult {
    /// The case study that was run.
    pub case_study: CaseStudy,
    /// The top 10 ranked listings.
    pub system_results: Vec<RankedProperty>,
    /// Benchmark statistics.
    pub benchmark_comparison: BenchmarkComparison,
    /// Rank of every benchmark, in case-study order.
    #[serde(default)]
    pub benchmark_ranks: Vec<BenchmarkRank>,
    /// Observations in display order.
    pub analysis_notes: Vec<AnalysisNote>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_case_study_file_entry() {
        let study: CaseStudy = serde_json::from_str(
            r#"{
                "name": "Family homes",
                "query": "quiet family home near schools",
                "location": "austin",
                "weights": {"school": 0.5, "crimeRate": 0.5},
                "benchmarkProperties": [
                    {"id": "p1", "desirabilityReason": "Top-rated school district"}
                ],
                "publicListings": [
                    {"platform": "Zillow", "url": "https://example.com/1", "rank": 2,
                     "key_features": ["pool", "garage"]}
                ]
            }"#,
        )
        .unwrap();

        assert!((study.weights.school - 0.5).abs() < f64::EPSILON);
        assert!(study.is_benchmark("p1"));
        assert!(!study.is_benchmark("p2"));
        assert_eq!(study.benchmark_properties[0].source, None);
        assert_eq!(
            study.public_listings.as_ref().map(|l| l[0].key_features.len()),
            Some(2)
        );
    }

    #[test]
    fn unknown_weight_keys_fail_the_case_study() {
        let result = serde_json::from_str::<CaseStudy>(r#"{"name": "x", "weights": {"view": 1}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn notes_render_with_markers() {
        assert_eq!(AnalysisNote::good("fine").to_string(), "✅ fine");
        assert_eq!(AnalysisNote::warning("off").to_string(), "⚠️ off");
    }

    #[test]
    fn comparison_serializes_camel_case() {
        let json = serde_json::to_value(BenchmarkComparison {
            benchmark_in_top5: 1,
            ..BenchmarkComparison::default()
        })
        .unwrap();
        assert_eq!(json["benchmarkInTop5"], 1);
        assert!(json["benchmarkMedianRank"].is_null());
    }
}
