#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Property catalog loading and browsing.
//!
//! The catalog is a flat JSON array of listing records. Records are
//! flattened into [`Property`] values once at load time. Browsing applies
//! [`CatalogFilter`] bounds, optionally narrows the set to listings that
//! match a free-text query, scores what is left with the ranking engine,
//! and orders it by the requested [`SortBy`] mode.

pub mod filter;

use std::path::{Path, PathBuf};

use estate_rank_geo_enrichment::GeoEnrichmentIndex;
use estate_rank_property_models::{HasId, Property, RawListing};
use estate_rank_ranking_models::{RankedProperty, Weights};
use estate_rank_text_search::{Bm25Params, FieldWeights, IndexBuilder, TextSearchError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use filter::{CatalogFilter, SortBy};

/// Errors that can occur while loading or browsing the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog file could not be read.
    #[error("Failed to read catalog {path}: {source}")]
    Io {
        /// Catalog path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The catalog file is not a JSON array of listing records.
    #[error("Invalid catalog JSON in {path}: {source}")]
    Json {
        /// Catalog path.
        path: PathBuf,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// The text index could not be built for a query.
    #[error(transparent)]
    TextSearch(#[from] TextSearchError),
}

/// Parses a catalog JSON document.
///
/// Records with neither an id nor an address are skipped with a warning.
///
/// # Errors
///
/// Returns [`serde_json::Error`] if `json` is not an array of listing
/// records.
pub fn parse_catalog(json: &str) -> Result<Vec<Property>, serde_json::Error> {
    let raw: Vec<RawListing> = serde_json::from_str(json)?;
    let total = raw.len();

    let properties: Vec<Property> = raw.into_iter().filter_map(RawListing::flatten).collect();

    if properties.len() < total {
        log::warn!(
            "Skipped {} catalog records without an id or address",
            total - properties.len()
        );
    }

    Ok(properties)
}

/// Loads and flattens the catalog at `path`.
///
/// # Errors
///
/// Returns [`CatalogError`] if the file cannot be read or parsed.
pub fn load_catalog(path: &Path) -> Result<Vec<Property>, CatalogError> {
    let json = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let properties = parse_catalog(&json).map_err(|source| CatalogError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    log::info!("Loaded {} properties from {}", properties.len(), path.display());

    Ok(properties)
}

/// Everything a catalog view needs to produce its result list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BrowseRequest {
    /// Free-text query; blank means no text filtering.
    pub query: Option<String>,
    /// Attribute bounds.
    pub filter: CatalogFilter,
    /// Result ordering.
    pub sort_by: SortBy,
    /// Ranking weight profile.
    pub weights: Weights,
    /// BM25 parameters for the query.
    pub bm25: Bm25Params,
    /// Field weights for the query.
    pub field_weights: FieldWeights,
    /// Maximum number of results.
    pub limit: Option<usize>,
}

impl BrowseRequest {
    /// The trimmed query, or `None` when it is absent or blank.
    #[must_use]
    pub fn active_query(&self) -> Option<&str> {
        self.query.as_deref().map(str::trim).filter(|q| !q.is_empty())
    }
}

/// One row of a catalog view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowseResult {
    /// The listing with its composite score.
    #[serde(flatten)]
    pub ranked: RankedProperty,
    /// Text relevance, present only when a query was given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_score: Option<f64>,
}

impl HasId for BrowseResult {
    fn id(&self) -> &str {
        self.ranked.id()
    }
}

/// Filters, optionally text-matches, scores, and orders the catalog.
///
/// With an active query only listings with a positive text score are kept.
///
/// # Errors
///
/// Returns [`CatalogError::TextSearch`] if the request's BM25 parameters
/// are invalid.
pub fn browse(
    properties: &[Property],
    request: &BrowseRequest,
    geo: &GeoEnrichmentIndex,
) -> Result<Vec<BrowseResult>, CatalogError> {
    let filtered: Vec<&Property> = properties
        .iter()
        .filter(|p| request.filter.matches(p))
        .collect();

    if request.filter.is_active() {
        log::debug!(
            "{} of {} properties pass the browse filter",
            filtered.len(),
            properties.len()
        );
    }

    let candidates: Vec<(&Property, Option<f64>)> = match request.active_query() {
        Some(_) if filtered.is_empty() => Vec::new(),
        Some(query) => {
            let mut builder = IndexBuilder::new()
                .with_params(request.bm25)
                .with_field_weights(request.field_weights);
            for property in &filtered {
                builder.add(
                    &property.formatted_address,
                    property.description.as_deref().unwrap_or_default(),
                );
            }
            let scores = builder.finalize()?.scores(query);

            filtered
                .into_iter()
                .zip(scores)
                .filter(|(_, score)| *score > 0.0)
                .map(|(property, score)| (property, Some(score)))
                .collect()
        }
        None => filtered.into_iter().map(|p| (p, None)).collect(),
    };

    let mut results: Vec<BrowseResult> = candidates
        .into_iter()
        .map(|(property, text_score)| BrowseResult {
            ranked: RankedProperty {
                property: property.clone(),
                ranking_score: estate_rank_ranking::score(property, &request.weights, geo),
            },
            text_score,
        })
        .collect();

    sort_results(&mut results, request.sort_by);

    if let Some(limit) = request.limit {
        results.truncate(limit);
    }

    Ok(results)
}

fn sort_results(results: &mut [BrowseResult], sort_by: SortBy) {
    let by_ranking = |a: &BrowseResult, b: &BrowseResult| {
        b.ranked.ranking_score.total_cmp(&a.ranked.ranking_score)
    };

    match sort_by {
        SortBy::Price => results.sort_by(|a, b| {
            filter::missing_last(a.ranked.property.price, b.ranked.property.price, |a, b| {
                a.total_cmp(&b)
            })
        }),
        SortBy::RentalYield => results.sort_by(|a, b| {
            filter::missing_last(
                a.ranked.property.rental_yield,
                b.ranked.property.rental_yield,
                |a, b| b.total_cmp(&a),
            )
        }),
        SortBy::InvestmentScore => results.sort_by(|a, b| {
            filter::missing_last(
                a.ranked.property.investment_score,
                b.ranked.property.investment_score,
                |a, b| b.total_cmp(&a),
            )
        }),
        SortBy::TextRelevance if results.iter().any(|r| r.text_score.is_some()) => results
            .sort_by(|a, b| {
                filter::missing_last(a.text_score, b.text_score, |a, b| b.total_cmp(&a))
            }),
        SortBy::Ranking | SortBy::TextRelevance => results.sort_by(by_ranking),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use estate_rank_ranking_models::Factor;

    fn listing(id: &str, price: f64, rental_yield: Option<f64>, description: &str) -> Property {
        Property {
            id: id.to_string(),
            formatted_address: format!("{id} Main St"),
            price: Some(price),
            bedrooms: 3.0,
            bathrooms: 2.0,
            rental_yield,
            description: Some(description.to_string()),
            ..Property::default()
        }
    }

    fn catalog() -> Vec<Property> {
        vec![
            listing("a", 300_000.0, Some(6.0), "Updated kitchen and large backyard"),
            listing("b", 150_000.0, None, "Cozy condo near the park"),
            listing("c", 900_000.0, Some(4.5), "Backyard pool with outdoor kitchen"),
        ]
    }

    fn ids(results: &[BrowseResult]) -> Vec<&str> {
        results.iter().map(HasId::id).collect()
    }

    #[test]
    fn parses_nested_records_and_skips_anonymous_ones() {
        let properties = parse_catalog(
            r#"[
                {"id": "x1", "formattedAddress": "1 Elm St", "saleInfo": {"price": 200000},
                 "rentInfo": {"price": 1500}},
                {"description": "no id or address"}
            ]"#,
        )
        .unwrap();

        assert_eq!(properties.len(), 1);
        assert_eq!(properties[0].price, Some(200_000.0));
        assert_eq!(properties[0].rent, Some(1500.0));
        assert_eq!(properties[0].rental_yield, Some(9.0));
    }

    #[test]
    fn load_reports_missing_file() {
        let err = load_catalog(Path::new("/nonexistent/catalog.json")).unwrap_err();
        assert!(matches!(err, CatalogError::Io { .. }));
    }

    #[test]
    fn loads_catalog_from_disk() {
        let tmp = std::env::temp_dir().join("estate_rank_catalog_load_test");
        let _ = std::fs::remove_dir_all(&tmp);
        std::fs::create_dir_all(&tmp).unwrap();
        let path = tmp.join("properties.json");
        std::fs::write(&path, r#"[{"id": "p1", "formattedAddress": "9 Oak Ave"}]"#).unwrap();

        let properties = load_catalog(&path).unwrap();
        assert_eq!(properties[0].id, "p1");

        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            load_catalog(&path),
            Err(CatalogError::Json { .. })
        ));

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn sorts_by_price_ascending() {
        let request = BrowseRequest {
            sort_by: SortBy::Price,
            ..BrowseRequest::default()
        };
        let results = browse(&catalog(), &request, &GeoEnrichmentIndex::empty()).unwrap();
        assert_eq!(ids(&results), vec!["b", "a", "c"]);
        assert!(results.iter().all(|r| r.text_score.is_none()));
    }

    #[test]
    fn sorts_by_yield_with_missing_last() {
        let request = BrowseRequest {
            sort_by: SortBy::RentalYield,
            ..BrowseRequest::default()
        };
        let results = browse(&catalog(), &request, &GeoEnrichmentIndex::empty()).unwrap();
        assert_eq!(ids(&results), vec!["a", "c", "b"]);
    }

    #[test]
    fn query_keeps_only_text_matches() {
        let request = BrowseRequest {
            query: Some("backyard".to_string()),
            sort_by: SortBy::TextRelevance,
            ..BrowseRequest::default()
        };
        let results = browse(&catalog(), &request, &GeoEnrichmentIndex::empty()).unwrap();
        let mut found = ids(&results);
        found.sort_unstable();
        assert_eq!(found, vec!["a", "c"]);
        assert!(results.iter().all(|r| r.text_score.is_some_and(|s| s > 0.0)));
    }

    #[test]
    fn text_relevance_orders_by_bm25_score() {
        let request = BrowseRequest {
            query: Some("backyard pool".to_string()),
            sort_by: SortBy::TextRelevance,
            weights: Weights::default().with(Factor::Price, 1.0),
            ..BrowseRequest::default()
        };
        let results = browse(&catalog(), &request, &GeoEnrichmentIndex::empty()).unwrap();
        assert_eq!(ids(&results), vec!["c", "a"]);

        let scores: Vec<f64> = results.iter().filter_map(|r| r.text_score).collect();
        assert_eq!(scores.len(), 2);
        assert!(scores[0] > scores[1]);
        assert!(results[1].ranked.ranking_score > results[0].ranked.ranking_score);
    }

    #[test]
    fn text_relevance_without_query_falls_back_to_ranking() {
        let request = BrowseRequest {
            query: Some("   ".to_string()),
            sort_by: SortBy::TextRelevance,
            weights: Weights::default().with(Factor::Price, 1.0),
            ..BrowseRequest::default()
        };
        let results = browse(&catalog(), &request, &GeoEnrichmentIndex::empty()).unwrap();
        assert_eq!(ids(&results), vec!["b", "a", "c"]);
    }

    #[test]
    fn filters_and_limits() {
        let request = BrowseRequest {
            filter: CatalogFilter {
                max_price: Some(500_000.0),
                ..CatalogFilter::default()
            },
            weights: Weights::default().with(Factor::Price, 1.0),
            limit: Some(1),
            ..BrowseRequest::default()
        };
        let results = browse(&catalog(), &request, &GeoEnrichmentIndex::empty()).unwrap();
        assert_eq!(ids(&results), vec!["b"]);
        assert!((results[0].ranked.ranking_score - 0.925).abs() < 1e-12);
    }

    #[test]
    fn query_over_empty_selection_is_empty() {
        let request = BrowseRequest {
            query: Some("pool".to_string()),
            filter: CatalogFilter {
                min_price: Some(5_000_000.0),
                ..CatalogFilter::default()
            },
            ..BrowseRequest::default()
        };
        assert!(
            browse(&catalog(), &request, &GeoEnrichmentIndex::empty())
                .unwrap()
                .is_empty()
        );
    }
}
