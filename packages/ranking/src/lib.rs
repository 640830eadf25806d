#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Weighted multi-factor property ranking.
//!
//! Every property is scored on a closed set of factors (see
//! [`estate_rank_ranking_models::Factor`]), each normalized into `[0, 1]`.
//! The composite `rankingScore` is the weighted sum of those factor scores,
//! so a property that maxes out every factor scores exactly
//! [`Weights::total`].
//!
//! Scoring fans out across the rayon pool. Results are collected in input
//! order and then stable-sorted, so ties keep catalog order and the output
//! never depends on thread scheduling.

pub mod factors;

use estate_rank_geo_enrichment::GeoEnrichmentIndex;
use estate_rank_property_models::Property;
use estate_rank_ranking_models::{FactorScores, RankedProperty, Weights};
use rayon::prelude::*;

pub use factors::{crime_safety, factor_scores};

/// Scores one property against the enrichment index.
#[must_use]
pub fn explain(property: &Property, geo: &GeoEnrichmentIndex) -> FactorScores {
    factor_scores(property, &geo.lookup(property.postal_code_key()))
}

/// Computes the composite score for one property.
#[must_use]
pub fn score(property: &Property, weights: &Weights, geo: &GeoEnrichmentIndex) -> f64 {
    explain(property, geo).weighted_sum(weights)
}

/// Ranks `properties` by composite score, best first.
///
/// The input is left untouched; each result carries a copy of its listing.
/// Properties with equal scores keep their relative input order.
#[must_use]
pub fn rank(
    properties: &[Property],
    weights: &Weights,
    geo: &GeoEnrichmentIndex,
) -> Vec<RankedProperty> {
    let mut ranked: Vec<RankedProperty> = properties
        .par_iter()
        .map(|property| RankedProperty {
            property: property.clone(),
            ranking_score: score(property, weights, geo),
        })
        .collect();

    ranked.sort_by(|a, b| b.ranking_score.total_cmp(&a.ranking_score));

    log::debug!(
        "Ranked {} properties (top score {:.4})",
        ranked.len(),
        ranked.first().map_or(0.0, |r| r.ranking_score)
    );

    ranked
}
