//! Per-factor scoring.
//!
//! Each factor maps one raw listing or enrichment attribute into `[0, 1]`
//! with a fixed normalization window. Missing inputs take the documented
//! fallback for their factor rather than failing.

use estate_rank_geo_enrichment::Enrichment;
use estate_rank_geo_enrichment_models::{CrimeGrade, CrimeRecord};
use estate_rank_property_models::{
    DAYS_ON_MARKET_RANGE, FALLBACK_PRICE, PRICE_RANGE, Property, RENTAL_YIELD_RANGE,
    STALE_DAYS_ON_MARKET,
};
use estate_rank_ranking_models::FactorScores;
use estate_rank_scoring::NormRange;

/// Schools per postal code.
pub const SCHOOL_RANGE: NormRange = NormRange::new(0.0, 15.0);

/// Hospitals per postal code.
pub const HOSPITAL_RANGE: NormRange = NormRange::new(0.0, 5.0);

/// Property crime incidents per postal code (fewer is better).
pub const PROPERTY_CRIME_RANGE: NormRange = NormRange::inverted(0.0, 500.0);

/// Violent crime incidents per postal code (fewer is better).
pub const VIOLENT_CRIME_RANGE: NormRange = NormRange::inverted(0.0, 100.0);

/// Interior square footage.
pub const SIZE_RANGE: NormRange = NormRange::new(0.0, 3000.0);

/// Precomputed investment score.
pub const INVESTMENT_SCORE_RANGE: NormRange = NormRange::new(0.0, 10.0);

/// Window for the combined crime sum: two grade penalties in `[-4, 0]` plus
/// two inverted incident scores in `[0, 1]`.
const CRIME_COMPOSITE_RANGE: NormRange = NormRange::new(-8.0, 2.0);

/// Scores every factor for one property.
#[must_use]
pub fn factor_scores(property: &Property, enrichment: &Enrichment<'_>) -> FactorScores {
    let price = property
        .price
        .filter(|p| p.is_finite() && *p != 0.0)
        .unwrap_or(FALLBACK_PRICE);

    FactorScores {
        school: SCHOOL_RANGE.apply(Some(f64::from(enrichment.school_count))),
        crime_rate: crime_safety(enrichment.crime),
        hospital: HOSPITAL_RANGE.apply(Some(f64::from(enrichment.hospital_count))),
        price: PRICE_RANGE.apply(Some(price)),
        size: SIZE_RANGE.apply(Some(property.square_footage.unwrap_or(0.0))),
        investment_score: INVESTMENT_SCORE_RANGE.apply(Some(property.investment_score.unwrap_or(0.0))),
        rental_yield: RENTAL_YIELD_RANGE.apply(Some(property.rental_yield.unwrap_or(0.0))),
        days_on_market: DAYS_ON_MARKET_RANGE
            .apply(Some(property.days_on_market.unwrap_or(STALE_DAYS_ON_MARKET))),
    }
}

/// Safety score in `[0, 1]`, higher is safer.
///
/// A postal code without a crime record contributes `0`. Within a record, a
/// blank or unrecognized grade carries no penalty and a blank incident total
/// scores `0`.
#[must_use]
pub fn crime_safety(record: Option<&CrimeRecord>) -> f64 {
    let Some(record) = record else {
        return 0.0;
    };

    let grade_penalty = |grade: Option<CrimeGrade>| grade.map_or(0.0, CrimeGrade::penalty);

    let combined = grade_penalty(record.property_crime_grade)
        + grade_penalty(record.violent_crime_grade)
        + PROPERTY_CRIME_RANGE.apply(record.total_property_crime)
        + VIOLENT_CRIME_RANGE.apply(record.total_violent_crime);

    CRIME_COMPOSITE_RANGE.apply(Some(combined))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crime(grade: CrimeGrade, property_total: f64, violent_total: f64) -> CrimeRecord {
        CrimeRecord {
            zipcode: 1,
            property_crime_grade: Some(grade),
            total_property_crime: Some(property_total),
            violent_crime_grade: Some(grade),
            total_violent_crime: Some(violent_total),
        }
    }

    #[test]
    fn crime_safety_spans_unit_interval() {
        assert!((crime_safety(Some(&crime(CrimeGrade::A, 0.0, 0.0))) - 1.0).abs() < 1e-12);
        assert!(crime_safety(Some(&crime(CrimeGrade::F, 500.0, 100.0))).abs() < 1e-12);
        assert!((crime_safety(Some(&crime(CrimeGrade::C, 250.0, 50.0))) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn crime_safety_without_record_is_zero() {
        assert!(crime_safety(None).abs() < f64::EPSILON);
    }

    #[test]
    fn worse_grades_score_lower() {
        let scores: Vec<f64> = CrimeGrade::all()
            .iter()
            .map(|g| crime_safety(Some(&crime(*g, 100.0, 10.0))))
            .collect();
        for pair in scores.windows(2) {
            assert!(pair[0] > pair[1], "{scores:?} not strictly decreasing");
        }
    }

    #[test]
    fn missing_listing_values_use_fallbacks() {
        let scores = factor_scores(&Property::default(), &Enrichment::default());
        // 1M of a 2M window
        assert!((scores.price - 0.5).abs() < 1e-12);
        // stale listing
        assert!(scores.days_on_market.abs() < 1e-12);
        assert!(scores.size.abs() < 1e-12);
        assert!(scores.investment_score.abs() < 1e-12);
        assert!(scores.rental_yield.abs() < 1e-12);
        assert!(scores.school.abs() < 1e-12);
        assert!(scores.hospital.abs() < 1e-12);
        assert!(scores.crime_rate.abs() < 1e-12);
    }

    #[test]
    fn zero_price_falls_back() {
        let property = Property {
            price: Some(0.0),
            ..Property::default()
        };
        let scores = factor_scores(&property, &Enrichment::default());
        assert!((scores.price - 0.5).abs() < 1e-12);
    }

    #[test]
    fn scores_enrichment_counts() {
        let record = crime(CrimeGrade::B, 100.0, 20.0);
        let enrichment = Enrichment {
            crime: Some(&record),
            hospital_count: 10,
            school_count: 3,
        };
        let scores = factor_scores(&Property::default(), &enrichment);
        assert!((scores.hospital - 1.0).abs() < 1e-12);
        assert!((scores.school - 0.2).abs() < 1e-12);
        // -1 - 1 + 0.8 + 0.8 = -0.4 over [-8, 2]
        assert!((scores.crime_rate - 0.76).abs() < 1e-12);
    }
}
