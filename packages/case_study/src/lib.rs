#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Benchmark case study comparison.
//!
//! Each [`CaseStudy`] restricts the catalog to its location, ranks what is
//! left with its own weights, and measures where its benchmark listings
//! landed. Batch runs persist the results as JSON and render an HTML
//! report (see [`report`]).

pub mod progress;
pub mod report;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use estate_rank_case_study_models::{
    AnalysisNote, BenchmarkComparison, BenchmarkRank, CaseStudy, ComparisonResult,
};
use estate_rank_catalog::{CatalogError, load_catalog};
use estate_rank_geo_enrichment::GeoEnrichmentIndex;
use estate_rank_property_models::Property;
use estate_rank_ranking_models::RankedProperty;
use thiserror::Error;

use crate::progress::ProgressCallback;

/// Number of top-ranked listings kept in a [`ComparisonResult`].
pub const TOP_RESULTS: usize = 10;

/// Median rank at or below which benchmark placement counts as good.
pub const GOOD_MEDIAN_RANK: f64 = 20.0;

/// Errors that can occur during a batch case study run.
#[derive(Debug, Error)]
pub enum CaseStudyError {
    /// The catalog could not be loaded.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// A case study, result, or report file could not be read or written.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The case study file could not be parsed, or results could not be
    /// encoded.
    #[error("JSON error in {path}: {source}")]
    Json {
        /// File path.
        path: PathBuf,
        /// Underlying serde error.
        #[source]
        source: serde_json::Error,
    },
}

/// File locations for [`run_case_studies`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseStudyPaths {
    /// Case study definitions (JSON array).
    pub case_studies: PathBuf,
    /// Catalog JSON.
    pub catalog: PathBuf,
    /// Where comparison results are written.
    pub results: PathBuf,
    /// Where the HTML report is written.
    pub report: PathBuf,
}

/// Median of `ranks`, averaging the two middle values for even counts.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn median_rank(ranks: &[usize]) -> Option<f64> {
    let mut sorted = ranks.to_vec();
    sorted.sort_unstable();

    let mid = sorted.len() / 2;
    match sorted.len() {
        0 => None,
        n if n % 2 == 0 => Some((sorted[mid - 1] + sorted[mid]) as f64 / 2.0),
        _ => Some(sorted[mid] as f64),
    }
}

fn average(scores: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = scores.fold((0.0, 0_u32), |(sum, count), s| (sum + s, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / f64::from(count)
    }
}

fn analysis_notes(comparison: &BenchmarkComparison) -> Vec<AnalysisNote> {
    let mut notes = Vec::new();

    if comparison.benchmark_in_top10 == 0 {
        notes.push(AnalysisNote::warning(
            "No benchmark properties found in top 10 results",
        ));
    } else if comparison.benchmark_in_top5 > 0 {
        notes.push(AnalysisNote::good(format!(
            "{} benchmark properties found in top 5 results",
            comparison.benchmark_in_top5
        )));
    }

    if comparison.benchmark_average_score > comparison.non_benchmark_average_score {
        notes.push(AnalysisNote::good(
            "Benchmark properties score higher on average than non-benchmark properties",
        ));
    } else {
        notes.push(AnalysisNote::warning(
            "Benchmark properties score lower on average than non-benchmark properties",
        ));
    }

    match comparison.benchmark_median_rank {
        Some(median) if median <= GOOD_MEDIAN_RANK => notes.push(AnalysisNote::good(format!(
            "Median rank of benchmark properties is {median}"
        ))),
        Some(median) => notes.push(AnalysisNote::warning(format!(
            "Median rank of benchmark properties is {median} (> {GOOD_MEDIAN_RANK})"
        ))),
        None => {}
    }

    notes
}

/// Runs one case study against the catalog.
#[must_use]
pub fn compare(
    properties: &[Property],
    case_study: &CaseStudy,
    geo: &GeoEnrichmentIndex,
) -> ComparisonResult {
    let local: Vec<Property> = properties
        .iter()
        .filter(|p| p.matches_location(&case_study.location))
        .cloned()
        .collect();

    log::info!(
        "Running case study \"{}\": {} properties in \"{}\"",
        case_study.name,
        local.len(),
        case_study.location
    );

    let ranked = estate_rank_ranking::rank(&local, &case_study.weights, geo);

    let benchmark_ranks: Vec<BenchmarkRank> = case_study
        .benchmark_properties
        .iter()
        .map(|benchmark| BenchmarkRank {
            id: benchmark.id.clone(),
            rank: ranked
                .iter()
                .position(|r| r.property.id == benchmark.id)
                .map(|index| index + 1),
        })
        .collect();

    let found: Vec<usize> = benchmark_ranks.iter().filter_map(|b| b.rank).collect();

    let (benchmarks, others): (Vec<&RankedProperty>, Vec<&RankedProperty>) = ranked
        .iter()
        .partition(|r| case_study.is_benchmark(&r.property.id));

    let comparison = BenchmarkComparison {
        benchmark_in_top5: found.iter().filter(|&&rank| rank <= 5).count(),
        benchmark_in_top10: found.iter().filter(|&&rank| rank <= TOP_RESULTS).count(),
        benchmark_median_rank: median_rank(&found),
        benchmark_average_score: average(benchmarks.iter().map(|r| r.ranking_score)),
        non_benchmark_average_score: average(others.iter().map(|r| r.ranking_score)),
    };

    if found.len() < case_study.benchmark_properties.len() {
        log::warn!(
            "{} of {} benchmark properties for \"{}\" are not in the filtered catalog",
            case_study.benchmark_properties.len() - found.len(),
            case_study.benchmark_properties.len(),
            case_study.name
        );
    }

    let analysis_notes = analysis_notes(&comparison);

    ComparisonResult {
        case_study: case_study.clone(),
        system_results: ranked.into_iter().take(TOP_RESULTS).collect(),
        benchmark_comparison: comparison,
        benchmark_ranks,
        analysis_notes,
    }
}

fn read_case_studies(path: &Path) -> Result<Vec<CaseStudy>, CaseStudyError> {
    let json = std::fs::read_to_string(path).map_err(|source| CaseStudyError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&json).map_err(|source| CaseStudyError::Json {
        path: path.to_path_buf(),
        source,
    })
}

pub(crate) fn write_file(path: &Path, contents: &str) -> Result<(), CaseStudyError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| CaseStudyError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    std::fs::write(path, contents).map_err(|source| CaseStudyError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Runs every case study in the file, then writes the JSON results and
/// the HTML report.
///
/// # Errors
///
/// Returns [`CaseStudyError`] if an input cannot be loaded or an output
/// cannot be written.
pub fn try_run_case_studies(
    paths: &CaseStudyPaths,
    geo: &GeoEnrichmentIndex,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<Vec<ComparisonResult>, CaseStudyError> {
    let case_studies = read_case_studies(&paths.case_studies)?;
    let properties = load_catalog(&paths.catalog)?;

    log::info!(
        "Loaded {} case studies and {} properties",
        case_studies.len(),
        properties.len()
    );

    progress.set_total(case_studies.len() as u64);

    let mut results = Vec::with_capacity(case_studies.len());
    for case_study in &case_studies {
        progress.set_message(case_study.name.clone());
        results.push(compare(&properties, case_study, geo));
        progress.inc(1);
    }

    let json = serde_json::to_string_pretty(&results).map_err(|source| CaseStudyError::Json {
        path: paths.results.clone(),
        source,
    })?;
    write_file(&paths.results, &json)?;
    log::info!("Case study results saved to {}", paths.results.display());

    report::write_html_report(&paths.report, &results)?;

    progress.finish(format!("{} case studies complete", results.len()));

    Ok(results)
}

/// Runs [`try_run_case_studies`], logging any failure and returning no
/// results in its place.
#[must_use]
pub fn run_case_studies(
    paths: &CaseStudyPaths,
    geo: &GeoEnrichmentIndex,
    progress: &Arc<dyn ProgressCallback>,
) -> Vec<ComparisonResult> {
    try_run_case_studies(paths, geo, progress).unwrap_or_else(|e| {
        log::error!("Error running case studies: {e}");
        Vec::new()
    })
}
