#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Postal-code enrichment record types.
//!
//! Three external datasets are joined onto listings by postal code: crime
//! grades and incident totals, hospital counts, and school counts. Field
//! names follow the column headers of the published datasets.

use serde::{Deserialize, Deserializer, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Letter grade assigned to a postal code for one crime category.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum CrimeGrade {
    /// Safest.
    A = 1,
    /// Better than average.
    B = 2,
    /// Average.
    C = 3,
    /// Worse than average.
    D = 4,
    /// Least safe.
    F = 5,
}

impl CrimeGrade {
    /// The best grade a postal code can receive.
    pub const BEST: Self = Self::A;
    /// The worst grade a postal code can receive.
    pub const WORST: Self = Self::F;

    /// Returns the numeric value of this grade (`A = 1` through `F = 5`).
    #[must_use]
    pub const fn value(self) -> u8 {
        self as u8
    }

    /// Distance below the best grade, as a non-positive number.
    ///
    /// `A` scores `0`, `F` scores `-4`.
    #[must_use]
    pub fn penalty(self) -> f64 {
        f64::from(Self::BEST.value()) - f64::from(self.value())
    }

    /// Returns all grades from best to worst.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::A, Self::B, Self::C, Self::D, Self::F]
    }
}

/// Crime statistics for one postal code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrimeRecord {
    /// Postal code key.
    #[serde(rename = "Zipcode", deserialize_with = "deserialize_postal_key")]
    pub zipcode: u32,
    /// Property crime grade; `None` when the source value is blank or not a
    /// recognized letter.
    #[serde(
        rename = "Property Crime Grade",
        default,
        deserialize_with = "deserialize_grade"
    )]
    pub property_crime_grade: Option<CrimeGrade>,
    /// Raw property crime incident count.
    #[serde(rename = "Total Property Crime", default)]
    pub total_property_crime: Option<f64>,
    /// Violent crime grade.
    #[serde(
        rename = "Violent Crime Grade",
        default,
        deserialize_with = "deserialize_grade"
    )]
    pub violent_crime_grade: Option<CrimeGrade>,
    /// Raw violent crime incident count.
    #[serde(rename = "Total Violent Crime", default)]
    pub total_violent_crime: Option<f64>,
}

/// Number of hospitals in one postal code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HospitalRecord {
    /// Postal code key.
    #[serde(rename = "Zipcode", deserialize_with = "deserialize_postal_key")]
    pub zipcode: u32,
    /// Hospital facility count.
    #[serde(rename = "HospitalCount")]
    pub hospital_count: u32,
}

/// Number of schools in one postal code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchoolRecord {
    /// Postal code key.
    #[serde(rename = "Zipcode", deserialize_with = "deserialize_postal_key")]
    pub zipcode: u32,
    /// School facility count.
    #[serde(rename = "SchoolCount")]
    pub school_count: u32,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PostalKeyRepr {
    Number(u32),
    Text(String),
}

fn deserialize_postal_key<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    match PostalKeyRepr::deserialize(deserializer)? {
        PostalKeyRepr::Number(n) => Ok(n),
        PostalKeyRepr::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid postal code: {s:?}"))),
    }
}

fn deserialize_grade<'de, D>(deserializer: D) -> Result<Option<CrimeGrade>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| s.trim().parse().ok()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grade_values_span_one_to_five() {
        let values: Vec<u8> = CrimeGrade::all().iter().map(|g| g.value()).collect();
        assert_eq!(values, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn penalty_is_zero_for_best_grade() {
        assert!(CrimeGrade::A.penalty().abs() < f64::EPSILON);
        assert!((CrimeGrade::F.penalty() - -4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn parses_grades_case_insensitively() {
        assert_eq!("b".parse::<CrimeGrade>().unwrap(), CrimeGrade::B);
        assert_eq!("F".parse::<CrimeGrade>().unwrap(), CrimeGrade::F);
        assert!("E".parse::<CrimeGrade>().is_err());
    }

    #[test]
    fn deserializes_crime_record_with_dataset_headers() {
        let record: CrimeRecord = serde_json::from_str(
            r#"{
                "Zipcode": 78701,
                "Property Crime Grade": "c",
                "Total Property Crime": 250,
                "Violent Crime Grade": "X",
                "Total Violent Crime": 40
            }"#,
        )
        .unwrap();

        assert_eq!(record.zipcode, 78701);
        assert_eq!(record.property_crime_grade, Some(CrimeGrade::C));
        assert_eq!(record.violent_crime_grade, None);
        assert_eq!(record.total_property_crime, Some(250.0));
    }

    #[test]
    fn accepts_string_postal_codes() {
        let record: SchoolRecord =
            serde_json::from_str(r#"{"Zipcode": "02134", "SchoolCount": 4}"#).unwrap();
        assert_eq!(record.zipcode, 2134);
        assert_eq!(record.school_count, 4);
    }
}
