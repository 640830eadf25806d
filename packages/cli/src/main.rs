#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line entry point for ranking, searching, and evaluating a
//! property catalog.
//!
//! Every subcommand loads the settings file, the catalog, and the
//! enrichment datasets it names. Listing output goes to stdout as JSON;
//! evaluation and case study output is written under the configured
//! output directory.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use estate_rank_case_study::CaseStudyPaths;
use estate_rank_catalog::{BrowseRequest, CatalogFilter, SortBy, load_catalog};
use estate_rank_cli_utils::{IndicatifProgress, MultiProgress};
use estate_rank_config::{DEFAULT_PROFILE, Settings};
use estate_rank_evaluation::EvaluationPaths;
use estate_rank_geo_enrichment::GeoEnrichmentIndex;
use estate_rank_text_search::IndexBuilder;

type CliResult = Result<(), Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(
    name = "estate_rank",
    about = "Property ranking and retrieval evaluation"
)]
struct Cli {
    /// Settings file (defaults to `$ESTATE_RANK_CONFIG`, then the built-in
    /// settings)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank the whole catalog with a weight profile
    Rank {
        /// Weight profile name
        #[arg(long, default_value = DEFAULT_PROFILE)]
        profile: String,
        /// Maximum number of listings to print
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Rank listings by BM25 text relevance alone
    Search {
        /// Free-text query
        query: String,
        /// Maximum number of hits to print
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Filter, text-match, and sort the catalog
    Browse {
        /// Free-text query
        #[arg(long)]
        query: Option<String>,
        /// Inclusive minimum price
        #[arg(long)]
        min_price: Option<f64>,
        /// Inclusive maximum price
        #[arg(long)]
        max_price: Option<f64>,
        /// Minimum bedroom count
        #[arg(long)]
        min_bedrooms: Option<f64>,
        /// Minimum bathroom count
        #[arg(long)]
        min_bathrooms: Option<f64>,
        /// Minimum rental yield, in percent
        #[arg(long)]
        min_yield: Option<f64>,
        /// price, rental_yield, investment_score, ranking, or text_relevance
        #[arg(long, default_value_t = SortBy::Ranking)]
        sort_by: SortBy,
        /// Weight profile name
        #[arg(long, default_value = DEFAULT_PROFILE)]
        profile: String,
        /// Maximum number of listings to print
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Score the test queries and write per-query rankings
    Evaluate {
        /// Weight profile for queries that carry no weights
        #[arg(long, default_value = DEFAULT_PROFILE)]
        profile: String,
    },
    /// Compare rankings against benchmark listings and write the report
    CaseStudies,
}

fn load_geo(settings: &Settings) -> Result<GeoEnrichmentIndex, Box<dyn std::error::Error>> {
    let geo =
        GeoEnrichmentIndex::load(&settings.paths.dataset_paths(), settings.duplicate_policy)?;
    let (crime, hospital, school) = geo.coverage();
    log::info!(
        "Enrichment coverage: {crime} crime, {hospital} hospital, {school} school postal codes"
    );
    Ok(geo)
}

fn print_json(value: &impl serde::Serialize) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn rank(settings: &Settings, profile: &str, limit: Option<usize>) -> CliResult {
    let weights = settings.profile(profile)?;
    let properties = load_catalog(&settings.paths.catalog_path())?;
    let geo = load_geo(settings)?;

    let mut ranked = estate_rank_ranking::rank(&properties, weights, &geo);
    if let Some(limit) = limit {
        ranked.truncate(limit);
    }
    print_json(&ranked)
}

fn search(settings: &Settings, query: &str, limit: Option<usize>) -> CliResult {
    let properties = load_catalog(&settings.paths.catalog_path())?;

    let mut builder = IndexBuilder::new()
        .with_params(settings.bm25)
        .with_field_weights(settings.field_weights);
    for property in &properties {
        builder.add(
            &property.formatted_address,
            property.description.as_deref().unwrap_or_default(),
        );
    }
    let index = builder.finalize()?;

    let hits: Vec<serde_json::Value> = index
        .matches(query)
        .into_iter()
        .take(limit.unwrap_or(usize::MAX))
        .map(|hit| {
            serde_json::json!({
                "id": properties[hit.id].id,
                "score": hit.score,
            })
        })
        .collect();
    log::info!("{} listings match {query:?}", hits.len());
    print_json(&hits)
}

fn browse(settings: &Settings, request: &BrowseRequest) -> CliResult {
    let properties = load_catalog(&settings.paths.catalog_path())?;
    let geo = load_geo(settings)?;

    let results = estate_rank_catalog::browse(&properties, request, &geo)?;
    print_json(&results)
}

fn evaluate(settings: &Settings, profile: &str) -> CliResult {
    let weights = settings.profile(profile)?;
    let geo = load_geo(settings)?;
    let paths = EvaluationPaths {
        catalog: settings.paths.catalog_path(),
        queries: settings.paths.test_queries_path(),
        output: settings.paths.ranked_results_path(),
    };

    let report = estate_rank_evaluation::try_run_evaluation(&paths, weights, &geo)?;
    println!(
        "Evaluated {} queries, MRR {:.3}",
        report.queries.len(),
        report.mean_reciprocal_rank
    );
    Ok(())
}

fn case_studies(settings: &Settings, multi: &MultiProgress) -> CliResult {
    let geo = load_geo(settings)?;
    let paths = CaseStudyPaths {
        case_studies: settings.paths.case_studies_path(),
        catalog: settings.paths.catalog_path(),
        results: settings.paths.case_study_results_path(),
        report: settings.paths.case_study_report_path(),
    };

    let progress = IndicatifProgress::steps_bar(multi, "Case studies", 0);
    let results = estate_rank_case_study::try_run_case_studies(&paths, &geo, &progress)?;
    for result in &results {
        println!(
            "{}: {}/{} benchmarks in top 10",
            result.case_study.name,
            result.benchmark_comparison.benchmark_in_top10,
            result.case_study.benchmark_properties.len()
        );
    }
    Ok(())
}

fn main() -> CliResult {
    let multi = estate_rank_cli_utils::init_logger();
    let cli = Cli::parse();

    let settings = Settings::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Rank { profile, limit } => rank(&settings, &profile, limit),
        Commands::Search { query, limit } => search(&settings, &query, limit),
        Commands::Browse {
            query,
            min_price,
            max_price,
            min_bedrooms,
            min_bathrooms,
            min_yield,
            sort_by,
            profile,
            limit,
        } => {
            let request = BrowseRequest {
                query,
                filter: CatalogFilter {
                    min_price,
                    max_price,
                    min_bedrooms,
                    min_bathrooms,
                    min_rental_yield: min_yield,
                },
                sort_by,
                weights: *settings.profile(&profile)?,
                bm25: settings.bm25,
                field_weights: settings.field_weights,
                limit,
            };
            browse(&settings, &request)
        }
        Commands::Evaluate { profile } => evaluate(&settings, &profile),
        Commands::CaseStudies => case_studies(&settings, &multi),
    }
}
