//! Batch evaluation of a ranking profile against a set of test queries.
//!
//! Every query ranks the full catalog with its own weights, or the default
//! profile when it has none. Precision is reported when the query lists
//! relevant ids and NDCG when it carries graded ground truth. MRR is
//! computed across all queries.

use std::path::{Path, PathBuf};

use estate_rank_catalog::load_catalog;
use estate_rank_geo_enrichment::GeoEnrichmentIndex;
use estate_rank_property_models::Property;
use estate_rank_ranking_models::{RankedProperty, Weights};
use serde::{Deserialize, Serialize};

use crate::EvaluationError;
use crate::metrics::{GradedRelevance, mean_reciprocal_rank, ndcg_at_k, precision_at_k};

/// One test query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationQuery {
    /// Free-text description of the information need.
    pub query: String,
    /// Ids judged relevant (binary relevance).
    #[serde(default)]
    pub relevant_ids: Vec<String>,
    /// Graded relevance judgements for NDCG.
    #[serde(default)]
    pub ground_truth: Option<Vec<GradedRelevance>>,
    /// Weight profile for this query; the default profile when absent.
    #[serde(default)]
    pub weights: Option<Weights>,
}

/// Per-query metric values; a metric is absent when its judgements are.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryMetrics {
    /// Precision in the top 5.
    #[serde(rename = "precisionAt5", skip_serializing_if = "Option::is_none")]
    pub precision_at_5: Option<f64>,
    /// Precision in the top 10.
    #[serde(rename = "precisionAt10", skip_serializing_if = "Option::is_none")]
    pub precision_at_10: Option<f64>,
    /// NDCG in the top 10.
    #[serde(rename = "ndcgAt10", skip_serializing_if = "Option::is_none")]
    pub ndcg_at_10: Option<f64>,
}

/// The fields of a ranked listing kept in evaluation output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedSummary {
    /// Listing id.
    pub id: String,
    /// Composite score.
    pub ranking_score: f64,
    /// Monthly rent estimate.
    pub rent: Option<f64>,
    /// Rental yield, in percent.
    pub rental_yield: Option<f64>,
    /// Investment score.
    pub investment_score: Option<f64>,
}

impl From<&RankedProperty> for RankedSummary {
    fn from(ranked: &RankedProperty) -> Self {
        Self {
            id: ranked.property.id.clone(),
            ranking_score: ranked.ranking_score,
            rent: ranked.property.rent,
            rental_yield: ranked.property.rental_yield,
            investment_score: ranked.property.investment_score,
        }
    }
}

/// Evaluation output for one query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryEvaluation {
    /// The query text.
    pub query: String,
    /// Metric values.
    pub metrics: QueryMetrics,
    /// The full ranking, best first.
    pub ranked_properties: Vec<RankedSummary>,
}

/// Evaluation output for a whole query set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvaluationReport {
    /// Per-query results in input order.
    pub queries: Vec<QueryEvaluation>,
    /// Mean reciprocal rank across all queries.
    pub mean_reciprocal_rank: f64,
}

/// File locations for [`run_evaluation`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationPaths {
    /// Catalog JSON.
    pub catalog: PathBuf,
    /// Test query JSON.
    pub queries: PathBuf,
    /// Where the per-query ranked output is written.
    pub output: PathBuf,
}

/// Ranks the catalog for every query and computes its metrics.
#[must_use]
pub fn evaluate(
    properties: &[Property],
    queries: &[EvaluationQuery],
    default_weights: &Weights,
    geo: &GeoEnrichmentIndex,
) -> EvaluationReport {
    let mut rankings: Vec<Vec<RankedProperty>> = Vec::with_capacity(queries.len());
    let mut evaluations = Vec::with_capacity(queries.len());

    for query in queries {
        let weights = query.weights.as_ref().unwrap_or(default_weights);
        let ranked = estate_rank_ranking::rank(properties, weights, geo);

        log::info!("Query: {}, Results: {} properties", query.query, ranked.len());

        let mut metrics = QueryMetrics::default();
        if !query.relevant_ids.is_empty() {
            let p5 = precision_at_k(&ranked, &query.relevant_ids, 5);
            let p10 = precision_at_k(&ranked, &query.relevant_ids, 10);
            log::info!("  Precision@5: {p5:.3}");
            log::info!("  Precision@10: {p10:.3}");
            metrics.precision_at_5 = Some(p5);
            metrics.precision_at_10 = Some(p10);
        }
        if let Some(truth) = &query.ground_truth {
            let ndcg = ndcg_at_k(&ranked, truth, 10);
            log::info!("  NDCG@10: {ndcg:.3}");
            metrics.ndcg_at_10 = Some(ndcg);
        }

        evaluations.push(QueryEvaluation {
            query: query.query.clone(),
            metrics,
            ranked_properties: ranked.iter().map(RankedSummary::from).collect(),
        });
        rankings.push(ranked);
    }

    let relevant: Vec<Vec<String>> = queries.iter().map(|q| q.relevant_ids.clone()).collect();
    let mrr = mean_reciprocal_rank(&rankings, &relevant);
    if !queries.is_empty() {
        log::info!("Overall MRR: {mrr:.3}");
    }

    EvaluationReport {
        queries: evaluations,
        mean_reciprocal_rank: mrr,
    }
}

fn read_queries(path: &Path) -> Result<Vec<EvaluationQuery>, EvaluationError> {
    let json = std::fs::read_to_string(path).map_err(|source| EvaluationError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&json).map_err(|source| EvaluationError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes the per-query results as a pretty-printed JSON array, creating
/// the parent directory if needed.
///
/// # Errors
///
/// Returns [`EvaluationError`] if the directory or file cannot be written.
pub fn write_results(path: &Path, results: &[QueryEvaluation]) -> Result<(), EvaluationError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| EvaluationError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let json = serde_json::to_string_pretty(results).map_err(|source| EvaluationError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    std::fs::write(path, json).map_err(|source| EvaluationError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    log::info!("Ranked results saved to {}", path.display());
    Ok(())
}

/// Loads the catalog and query set, evaluates, and writes the results.
///
/// # Errors
///
/// Returns [`EvaluationError`] if any input cannot be loaded or the output
/// cannot be written.
pub fn try_run_evaluation(
    paths: &EvaluationPaths,
    default_weights: &Weights,
    geo: &GeoEnrichmentIndex,
) -> Result<EvaluationReport, EvaluationError> {
    let properties = load_catalog(&paths.catalog)?;
    let queries = read_queries(&paths.queries)?;

    log::info!(
        "Evaluating {} queries over {} properties",
        queries.len(),
        properties.len()
    );

    let report = evaluate(&properties, &queries, default_weights, geo);
    write_results(&paths.output, &report.queries)?;

    Ok(report)
}

/// Runs [`try_run_evaluation`], logging any failure and returning an empty
/// report in its place.
#[must_use]
pub fn run_evaluation(
    paths: &EvaluationPaths,
    default_weights: &Weights,
    geo: &GeoEnrichmentIndex,
) -> EvaluationReport {
    try_run_evaluation(paths, default_weights, geo).unwrap_or_else(|e| {
        log::error!("Error running evaluation: {e}");
        EvaluationReport::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use estate_rank_ranking_models::Factor;

    fn listing(id: &str, price: f64) -> Property {
        Property {
            id: id.to_string(),
            formatted_address: format!("{id} Main St"),
            price: Some(price),
            rent: Some(2000.0),
            ..Property::default()
        }
    }

    fn price_weights() -> Weights {
        Weights::default().with(Factor::Price, 1.0)
    }

    #[test]
    fn computes_metrics_per_query() {
        let properties = vec![
            listing("expensive", 1_500_000.0),
            listing("cheap", 100_000.0),
            listing("mid", 600_000.0),
        ];
        let queries = vec![
            EvaluationQuery {
                query: "affordable".to_string(),
                relevant_ids: vec!["cheap".to_string()],
                ground_truth: Some(vec![GradedRelevance {
                    id: "cheap".to_string(),
                    relevance: 2.0,
                }]),
                weights: None,
            },
            EvaluationQuery {
                query: "luxury".to_string(),
                relevant_ids: vec!["expensive".to_string()],
                ground_truth: None,
                weights: Some(Weights::default()),
            },
        ];

        let report = evaluate(&properties, &queries, &price_weights(), &GeoEnrichmentIndex::empty());

        let first = &report.queries[0];
        assert_eq!(first.ranked_properties[0].id, "cheap");
        assert_eq!(first.ranked_properties[0].rent, Some(2000.0));
        assert!((first.metrics.precision_at_5.unwrap() - 0.2).abs() < 1e-12);
        assert!((first.metrics.ndcg_at_10.unwrap() - 1.0).abs() < 1e-12);

        // all-zero weights tie everything, so catalog order stands
        let second = &report.queries[1];
        assert_eq!(second.ranked_properties[0].id, "expensive");
        assert!(second.metrics.ndcg_at_10.is_none());

        assert!((report.mean_reciprocal_rank - 1.0).abs() < 1e-12);
    }

    #[test]
    fn queries_without_judgements_have_no_metrics() {
        let queries: Vec<EvaluationQuery> =
            serde_json::from_str(r#"[{"query": "anything"}]"#).unwrap();
        let report = evaluate(
            &[listing("a", 1.0)],
            &queries,
            &price_weights(),
            &GeoEnrichmentIndex::empty(),
        );
        assert_eq!(report.queries[0].metrics, QueryMetrics::default());
        assert!(report.mean_reciprocal_rank.abs() < f64::EPSILON);
    }

    #[test]
    fn run_writes_ranked_output() {
        let tmp = std::env::temp_dir().join("estate_rank_evaluation_run_test");
        let _ = std::fs::remove_dir_all(&tmp);
        std::fs::create_dir_all(&tmp).unwrap();

        std::fs::write(
            tmp.join("properties.json"),
            r#"[{"id": "a", "formattedAddress": "1 A St", "price": 300000},
                {"id": "b", "formattedAddress": "2 B St", "price": 200000}]"#,
        )
        .unwrap();
        std::fs::write(
            tmp.join("queries.json"),
            r#"[{"query": "cheap", "relevantIds": ["b"]}]"#,
        )
        .unwrap();

        let paths = EvaluationPaths {
            catalog: tmp.join("properties.json"),
            queries: tmp.join("queries.json"),
            output: tmp.join("out").join("ranked_results.json"),
        };
        let report = run_evaluation(&paths, &price_weights(), &GeoEnrichmentIndex::empty());
        assert_eq!(report.queries.len(), 1);

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&paths.output).unwrap()).unwrap();
        assert_eq!(written[0]["query"], "cheap");
        assert_eq!(written[0]["rankedProperties"][0]["id"], "b");
        assert!(written[0]["metrics"]["precisionAt5"].is_number());

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn run_failure_yields_empty_report() {
        let paths = EvaluationPaths {
            catalog: PathBuf::from("/nonexistent/properties.json"),
            queries: PathBuf::from("/nonexistent/queries.json"),
            output: PathBuf::from("/nonexistent/out.json"),
        };
        let report = run_evaluation(&paths, &price_weights(), &GeoEnrichmentIndex::empty());
        assert!(report.queries.is_empty());
    }
}
