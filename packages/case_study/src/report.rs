//! HTML rendering of case study results.
//!
//! The report is a single self-contained page: one section per case study
//! with its metrics, analysis notes, top results (benchmark matches
//! highlighted), benchmark placements, and any comparable public listings.

use std::fmt::Write as _;
use std::path::Path;

use estate_rank_case_study_models::{ComparisonResult, NoteSeverity};

use crate::{CaseStudyError, write_file};

const STYLE: &str = "
    body { font-family: Arial, sans-serif; line-height: 1.6; margin: 0; padding: 20px; color: #333; }
    h1, h2, h3 { color: #2c3e50; }
    .case-study { background: #f9f9f9; border-radius: 5px; padding: 20px; margin-bottom: 30px; }
    .metrics { display: flex; flex-wrap: wrap; gap: 20px; margin: 20px 0; }
    .metric { background: #fff; border-radius: 5px; padding: 15px; flex: 1; min-width: 200px; }
    .metric h4 { margin-top: 0; color: #7f8c8d; }
    .metric .value { font-size: 24px; font-weight: bold; color: #2980b9; }
    table { width: 100%; border-collapse: collapse; margin: 20px 0; }
    th, td { text-align: left; padding: 12px; border-bottom: 1px solid #ddd; }
    th { background-color: #f2f2f2; }
    .benchmark { background-color: #e8f4f8; }
    .notes { background: #fff8dc; padding: 15px; border-left: 4px solid #f1c40f; margin: 20px 0; }
    .good { color: #27ae60; }
    .warning { color: #e67e22; }
";

/// Escapes text for inclusion in HTML content or attribute values.
#[must_use]
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Formats a dollar amount with thousands separators, rounded to whole
/// dollars.
#[must_use]
pub fn format_price(price: f64) -> String {
    #[allow(clippy::cast_possible_truncation)]
    let whole = price.round() as i64;
    let digits = whole.unsigned_abs().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    if whole < 0 {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}

fn or_na(value: Option<String>) -> String {
    value.unwrap_or_else(|| "N/A".to_string())
}

fn write_metric(html: &mut String, label: &str, value: &str) {
    let _ = write!(
        html,
        "<div class=\"metric\"><h4>{label}</h4><div class=\"value\">{value}</div></div>"
    );
}

fn write_case_study(html: &mut String, result: &ComparisonResult) {
    let study = &result.case_study;
    let comparison = &result.benchmark_comparison;
    let benchmark_total = study.benchmark_properties.len();

    let _ = write!(
        html,
        "<div class=\"case-study\"><h2>{}</h2>\
         <p><strong>Query:</strong> {}</p>\
         <p><strong>Location:</strong> {}</p>",
        escape(&study.name),
        escape(&study.query),
        escape(&study.location),
    );

    html.push_str("<h3>Metrics</h3><div class=\"metrics\">");
    write_metric(
        html,
        "Benchmark in Top 5",
        &format!("{}/{benchmark_total}", comparison.benchmark_in_top5),
    );
    write_metric(
        html,
        "Benchmark in Top 10",
        &format!("{}/{benchmark_total}", comparison.benchmark_in_top10),
    );
    write_metric(
        html,
        "Median Rank",
        &or_na(comparison.benchmark_median_rank.map(|m| format!("{m:.1}"))),
    );
    write_metric(
        html,
        "Avg Score (Benchmark)",
        &format!("{:.3}", comparison.benchmark_average_score),
    );
    write_metric(
        html,
        "Avg Score (Others)",
        &format!("{:.3}", comparison.non_benchmark_average_score),
    );
    html.push_str("</div>");

    html.push_str("<h3>Analysis Notes</h3><div class=\"notes\">");
    for note in &result.analysis_notes {
        let class = match note.severity {
            NoteSeverity::Good => "good",
            NoteSeverity::Warning => "warning",
        };
        let _ = write!(
            html,
            "<div class=\"note {class}\">{}</div>",
            escape(&note.to_string())
        );
    }
    html.push_str("</div>");

    html.push_str(
        "<h3>Top 10 Results</h3><table><thead><tr><th>Rank</th><th>Property ID</th>\
         <th>Score</th><th>Price</th><th>Rental Yield</th><th>Investment Score</th>\
         <th>Benchmark</th></tr></thead><tbody>",
    );
    for (index, ranked) in result.system_results.iter().enumerate() {
        let property = &ranked.property;
        let benchmark = study.benchmark(&property.id);
        let (row_class, benchmark_cell) = benchmark.map_or_else(
            || ("", String::new()),
            |b| {
                let reason = if b.desirability_reason.is_empty() {
                    "Yes"
                } else {
                    &b.desirability_reason
                };
                ("benchmark", format!("✅ {}", escape(reason)))
            },
        );

        let _ = write!(
            html,
            "<tr class=\"{row_class}\"><td>{}</td><td>{}</td><td>{:.3}</td><td>{}</td>\
             <td>{}</td><td>{}</td><td>{benchmark_cell}</td></tr>",
            index + 1,
            escape(&property.id),
            ranked.ranking_score,
            or_na(property.price.map(format_price)),
            or_na(property.rental_yield.map(|y| format!("{y:.1}%"))),
            or_na(property.investment_score.map(|s| format!("{s:.1}"))),
        );
    }
    html.push_str("</tbody></table>");

    html.push_str(
        "<h3>Benchmark Properties</h3><table><thead><tr><th>Property ID</th>\
         <th>Reason for Desirability</th><th>Source</th><th>System Rank</th></tr></thead><tbody>",
    );
    for benchmark in &study.benchmark_properties {
        let rank = result
            .benchmark_ranks
            .iter()
            .find(|r| r.id == benchmark.id)
            .and_then(|r| r.rank)
            .map_or_else(|| "Not found".to_string(), |r| r.to_string());

        let _ = write!(
            html,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{rank}</td></tr>",
            escape(&benchmark.id),
            escape(&benchmark.desirability_reason),
            or_na(benchmark.source.as_deref().map(escape)),
        );
    }
    html.push_str("</tbody></table>");

    if let Some(listings) = &study.public_listings {
        html.push_str(
            "<h3>Comparable Public Listings</h3><table><thead><tr><th>Platform</th>\
             <th>Rank</th><th>Key Features</th></tr></thead><tbody>",
        );
        for listing in listings {
            let platform = if listing.url.is_empty() {
                escape(&listing.platform)
            } else {
                format!(
                    "<a href=\"{}\">{}</a>",
                    escape(&listing.url),
                    escape(&listing.platform)
                )
            };
            let _ = write!(
                html,
                "<tr><td>{platform}</td><td>{}</td><td>{}</td></tr>",
                listing.rank,
                escape(&listing.key_features.join(", ")),
            );
        }
        html.push_str("</tbody></table>");
    }

    html.push_str("</div>");
}

/// Renders all case study results as one HTML page.
#[must_use]
pub fn render_html(results: &[ComparisonResult]) -> String {
    let mut html = String::new();

    let _ = write!(
        html,
        "<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"UTF-8\">\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\
         <title>Property Ranking Case Study Comparison</title><style>{STYLE}</style></head><body>\
         <h1>Property Ranking System: Case Study Comparison</h1>\
         <p>This report compares the property ranking system against known desirable \
         properties across {} case studies.</p>",
        results.len()
    );

    for result in results {
        write_case_study(&mut html, result);
    }

    html.push_str("</body></html>\n");
    html
}

/// Renders and writes the HTML report, creating the parent directory if
/// needed.
///
/// # Errors
///
/// Returns [`CaseStudyError::Io`] if the report cannot be written.
pub fn write_html_report(path: &Path, results: &[ComparisonResult]) -> Result<(), CaseStudyError> {
    write_file(path, &render_html(results))?;
    log::info!("Case study report saved to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use estate_rank_case_study_models::{
        AnalysisNote, BenchmarkComparison, BenchmarkProperty, BenchmarkRank, CaseStudy,
        PublicListing,
    };
    use estate_rank_property_models::Property;
    use estate_rank_ranking_models::{RankedProperty, Weights};

    fn result() -> ComparisonResult {
        ComparisonResult {
            case_study: CaseStudy {
                name: "Schools & safety".to_string(),
                query: "family <home>".to_string(),
                location: "Austin".to_string(),
                weights: Weights::default(),
                benchmark_properties: vec![
                    BenchmarkProperty {
                        id: "p1".to_string(),
                        desirability_reason: "Top district".to_string(),
                        source: Some("Realtor".to_string()),
                    },
                    BenchmarkProperty {
                        id: "p9".to_string(),
                        desirability_reason: "Big lot".to_string(),
                        source: None,
                    },
                ],
                public_listings: Some(vec![PublicListing {
                    platform: "Zillow".to_string(),
                    url: "https://example.com/p1".to_string(),
                    rank: 3,
                    key_features: vec!["pool".to_string(), "garage".to_string()],
                }]),
            },
            system_results: vec![RankedProperty {
                property: Property {
                    id: "p1".to_string(),
                    price: Some(1_234_567.0),
                    rental_yield: Some(6.25),
                    ..Property::default()
                },
                ranking_score: 0.8123,
            }],
            benchmark_comparison: BenchmarkComparison {
                benchmark_in_top5: 1,
                benchmark_in_top10: 1,
                benchmark_median_rank: Some(1.0),
                benchmark_average_score: 0.8123,
                non_benchmark_average_score: 0.0,
            },
            benchmark_ranks: vec![
                BenchmarkRank {
                    id: "p1".to_string(),
                    rank: Some(1),
                },
                BenchmarkRank {
                    id: "p9".to_string(),
                    rank: None,
                },
            ],
            analysis_notes: vec![AnalysisNote::good("1 benchmark properties found in top 5 results")],
        }
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(escape(r#"<a href="x">&'"#), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
    }

    #[test]
    fn formats_prices_with_separators() {
        assert_eq!(format_price(1_234_567.4), "$1,234,567");
        assert_eq!(format_price(999.0), "$999");
        assert_eq!(format_price(1000.0), "$1,000");
        assert_eq!(format_price(0.0), "$0");
    }

    #[test]
    fn renders_every_section() {
        let html = render_html(&[result()]);

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("Schools &amp; safety"));
        assert!(html.contains("family &lt;home&gt;"));
        assert!(html.contains("<div class=\"value\">1/2</div>"));
        assert!(html.contains("<tr class=\"benchmark\">"));
        assert!(html.contains("✅ Top district"));
        assert!(html.contains("$1,234,567"));
        assert!(html.contains("6.2%") || html.contains("6.3%"));
        assert!(html.contains("Not found"));
        assert!(html.contains("Comparable Public Listings"));
        assert!(html.contains("pool, garage"));
        assert!(html.contains("note good"));
    }

    #[test]
    fn omits_public_listings_when_absent() {
        let mut result = result();
        result.case_study.public_listings = None;
        assert!(!render_html(&[result]).contains("Comparable Public Listings"));
    }
}
