//! Ranked-list quality metrics.
//!
//! All metrics accept any ranked item that exposes an id through
//! [`HasId`], so they work on bare id lists as well as ranked listings.
//! Every metric lies in `[0, 1]` for non-negative relevance grades.

use estate_rank_property_models::HasId;
use serde::{Deserialize, Serialize};

/// A graded relevance judgement for one item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradedRelevance {
    /// Item id.
    pub id: String,
    /// Relevance grade; higher is more relevant.
    pub relevance: f64,
}

#[allow(clippy::cast_precision_loss)]
fn ratio(numerator: f64, denominator: usize) -> f64 {
    numerator / denominator as f64
}

fn is_relevant<R: AsRef<str>>(id: &str, relevant_ids: &[R]) -> bool {
    relevant_ids.iter().any(|r| r.as_ref() == id)
}

/// Fraction of the top `k` results that are relevant.
///
/// The denominator is always `k`, so a list shorter than `k` cannot reach
/// `1.0`. Returns `0` for `k == 0`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn precision_at_k<T: HasId, R: AsRef<str>>(
    ranked: &[T],
    relevant_ids: &[R],
    k: usize,
) -> f64 {
    if k == 0 {
        return 0.0;
    }

    let hits = ranked
        .iter()
        .take(k)
        .filter(|item| is_relevant(item.id(), relevant_ids))
        .count();

    ratio(hits as f64, k)
}

/// Reciprocal of the 1-indexed rank of the first relevant result, or `0`
/// when none is relevant.
#[must_use]
pub fn reciprocal_rank<T: HasId, R: AsRef<str>>(ranked: &[T], relevant_ids: &[R]) -> f64 {
    ranked
        .iter()
        .position(|item| is_relevant(item.id(), relevant_ids))
        .map_or(0.0, |index| ratio(1.0, index + 1))
}

/// Mean of [`reciprocal_rank`] across queries.
///
/// `all_relevant[i]` holds the relevant ids for `all_ranked[i]`; a query
/// with no entry counts as having no relevant ids. Returns `0` when there
/// are no queries.
#[must_use]
pub fn mean_reciprocal_rank<T: HasId, R: AsRef<str>>(
    all_ranked: &[Vec<T>],
    all_relevant: &[Vec<R>],
) -> f64 {
    if all_ranked.is_empty() {
        return 0.0;
    }

    let total: f64 = all_ranked
        .iter()
        .enumerate()
        .map(|(i, ranked)| {
            all_relevant
                .get(i)
                .map_or(0.0, |relevant| reciprocal_rank(ranked, relevant))
        })
        .sum();

    ratio(total, all_ranked.len())
}

#[allow(clippy::cast_precision_loss)]
fn discount(position: usize) -> f64 {
    ((position + 2) as f64).log2()
}

fn relevance_of(id: &str, ground_truth: &[GradedRelevance]) -> f64 {
    ground_truth
        .iter()
        .find(|truth| truth.id == id)
        .map_or(0.0, |truth| truth.relevance)
}

/// Discounted cumulative gain of the top `k` results.
#[must_use]
pub fn dcg_at_k<T: HasId>(ranked: &[T], ground_truth: &[GradedRelevance], k: usize) -> f64 {
    ranked
        .iter()
        .take(k)
        .enumerate()
        .map(|(i, item)| relevance_of(item.id(), ground_truth) / discount(i))
        .sum()
}

/// Best achievable DCG at `k` for `ground_truth`.
#[must_use]
pub fn ideal_dcg_at_k(ground_truth: &[GradedRelevance], k: usize) -> f64 {
    let mut grades: Vec<f64> = ground_truth.iter().map(|t| t.relevance).collect();
    grades.sort_by(|a, b| b.total_cmp(a));

    grades
        .into_iter()
        .take(k)
        .enumerate()
        .map(|(i, grade)| grade / discount(i))
        .sum()
}

/// Normalized DCG at `k`; `0` when the ideal DCG is `0`.
#[must_use]
pub fn ndcg_at_k<T: HasId>(ranked: &[T], ground_truth: &[GradedRelevance], k: usize) -> f64 {
    let ideal = ideal_dcg_at_k(ground_truth, k);
    if ideal <= 0.0 {
        return 0.0;
    }
    dcg_at_k(ranked, ground_truth, k) / ideal
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graded(pairs: &[(&str, f64)]) -> Vec<GradedRelevance> {
        pairs
            .iter()
            .map(|(id, relevance)| GradedRelevance {
                id: (*id).to_string(),
                relevance: *relevance,
            })
            .collect()
    }

    #[test]
    fn precision_counts_hits_in_top_k() {
        let ranked = ["A", "B", "C", "D", "E"];
        assert!((precision_at_k(&ranked, &["B", "D"], 5) - 0.4).abs() < 1e-12);
        assert!((precision_at_k(&ranked, &["B", "D"], 2) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn precision_divides_by_k_for_short_lists() {
        assert!((precision_at_k(&["A"], &["A"], 10) - 0.1).abs() < 1e-12);
    }

    #[test]
    fn precision_at_zero_is_zero() {
        assert!(precision_at_k(&["A"], &["A"], 0).abs() < f64::EPSILON);
    }

    #[test]
    fn mrr_averages_first_hit_ranks() {
        let ranked = vec![vec!["A", "B"], vec!["C", "D"]];
        let relevant = vec![vec!["A"], vec!["X"]];
        assert!((mean_reciprocal_rank(&ranked, &relevant) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn mrr_uses_first_relevant_position() {
        let ranked = vec![vec!["A", "B", "C"]];
        let relevant = vec![vec!["C", "B"]];
        assert!((mean_reciprocal_rank(&ranked, &relevant) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn mrr_edge_cases() {
        let none: Vec<Vec<&str>> = Vec::new();
        assert!(mean_reciprocal_rank(&none, &none).abs() < f64::EPSILON);

        // second query has no relevance list at all
        let ranked = vec![vec!["A"], vec!["B"]];
        let relevant = vec![vec!["A"]];
        assert!((mean_reciprocal_rank(&ranked, &relevant) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn ndcg_is_one_for_ideal_order() {
        let truth = graded(&[("A", 3.0), ("B", 2.0), ("C", 1.0)]);
        assert!((ndcg_at_k(&["A", "B", "C"], &truth, 3) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn ndcg_penalizes_misordering() {
        let truth = graded(&[("A", 3.0), ("B", 0.0)]);
        let ndcg = ndcg_at_k(&["B", "A"], &truth, 2);
        // 3 / log2(3) over 3 / log2(2)
        assert!((ndcg - 1.0 / 3f64.log2()).abs() < 1e-12);
        assert!(ndcg > 0.0);
    }

    #[test]
    fn ndcg_without_positive_truth_is_zero() {
        assert!(ndcg_at_k(&["A"], &[], 10).abs() < f64::EPSILON);
        assert!(ndcg_at_k(&["A"], &graded(&[("A", 0.0)]), 10).abs() < f64::EPSILON);
    }

    #[test]
    fn metrics_stay_in_unit_interval() {
        let ranked = ["A", "B", "C", "D"];
        let truth = graded(&[("D", 1.0), ("Z", 5.0), ("A", 2.0)]);
        for k in 0..6 {
            let p = precision_at_k(&ranked, &["A", "D"], k);
            let n = ndcg_at_k(&ranked, &truth, k);
            assert!((0.0..=1.0).contains(&p), "precision {p} at k={k}");
            assert!((0.0..=1.0).contains(&n), "ndcg {n} at k={k}");
        }
    }
}
