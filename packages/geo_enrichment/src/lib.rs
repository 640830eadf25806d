#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Read-only postal-code lookup tables for listing enrichment.
//!
//! Crime, hospital, and school datasets are indexed once by postal code
//! into a [`GeoEnrichmentIndex`], which is then passed by reference into
//! the ranking engine for the lifetime of the process. A postal code with
//! no record is a valid state and simply yields no data.

pub mod loader;

use std::collections::BTreeMap;
use std::path::PathBuf;

use estate_rank_geo_enrichment_models::{CrimeRecord, HospitalRecord, SchoolRecord};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use thiserror::Error;

pub use loader::DatasetPaths;

/// Which enrichment dataset a record or error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum Dataset {
    /// Crime grades and incident totals.
    Crime,
    /// Hospital counts.
    Hospital,
    /// School counts.
    School,
}

/// How to treat a postal code that appears more than once in a dataset.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DuplicatePolicy {
    /// The record processed last replaces earlier ones (logged at `warn`).
    #[default]
    LastWins,
    /// Building the index fails on the first duplicate.
    Reject,
}

/// Errors that can occur while loading or indexing enrichment data.
#[derive(Debug, Error)]
pub enum GeoEnrichmentError {
    /// A dataset file could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        /// Path of the dataset file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A JSON dataset could not be parsed.
    #[error("Invalid JSON in {path}: {source}")]
    Json {
        /// Path of the dataset file.
        path: PathBuf,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// A CSV dataset could not be parsed.
    #[error("Invalid CSV in {path}: {source}")]
    Csv {
        /// Path of the dataset file.
        path: PathBuf,
        /// Underlying parse error.
        #[source]
        source: csv::Error,
    },

    /// The dataset file extension is neither `.json` nor `.csv`.
    #[error("Unsupported dataset format for {path} (expected .json or .csv)")]
    UnsupportedFormat {
        /// Path of the dataset file.
        path: PathBuf,
    },

    /// A postal code appeared twice under [`DuplicatePolicy::Reject`].
    #[error("Duplicate postal code {zipcode} in {dataset} dataset")]
    DuplicatePostalCode {
        /// Dataset containing the duplicate.
        dataset: Dataset,
        /// The repeated postal code.
        zipcode: u32,
    },
}

/// Enrichment data resolved for a single postal code.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Enrichment<'a> {
    /// Crime record, if the crime dataset covers this postal code.
    pub crime: Option<&'a CrimeRecord>,
    /// Hospitals in the postal code (`0` when not covered).
    pub hospital_count: u32,
    /// Schools in the postal code (`0` when not covered).
    pub school_count: u32,
}

/// Immutable postal-code lookup tables.
#[derive(Debug, Clone, Default)]
pub struct GeoEnrichmentIndex {
    crime: BTreeMap<u32, CrimeRecord>,
    hospitals: BTreeMap<u32, u32>,
    schools: BTreeMap<u32, u32>,
}

impl GeoEnrichmentIndex {
    /// An index with no data; every lookup returns "no data".
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Indexes the three datasets by postal code.
    ///
    /// # Errors
    ///
    /// Returns [`GeoEnrichmentError::DuplicatePostalCode`] if a postal code
    /// repeats within one dataset and `policy` is [`DuplicatePolicy::Reject`].
    pub fn build(
        crime: Vec<CrimeRecord>,
        hospitals: Vec<HospitalRecord>,
        schools: Vec<SchoolRecord>,
        policy: DuplicatePolicy,
    ) -> Result<Self, GeoEnrichmentError> {
        let crime = index_by_postal_code(
            Dataset::Crime,
            crime.into_iter().map(|r| (r.zipcode, r)),
            policy,
        )?;
        let hospitals = index_by_postal_code(
            Dataset::Hospital,
            hospitals.into_iter().map(|r| (r.zipcode, r.hospital_count)),
            policy,
        )?;
        let schools = index_by_postal_code(
            Dataset::School,
            schools.into_iter().map(|r| (r.zipcode, r.school_count)),
            policy,
        )?;

        log::info!(
            "Built enrichment index: {} crime, {} hospital, {} school postal codes",
            crime.len(),
            hospitals.len(),
            schools.len()
        );

        Ok(Self {
            crime,
            hospitals,
            schools,
        })
    }

    /// Crime record for a postal code.
    #[must_use]
    pub fn crime(&self, zipcode: u32) -> Option<&CrimeRecord> {
        self.crime.get(&zipcode)
    }

    /// Hospital count for a postal code, `0` when not covered.
    #[must_use]
    pub fn hospital_count(&self, zipcode: u32) -> u32 {
        self.hospitals.get(&zipcode).copied().unwrap_or(0)
    }

    /// School count for a postal code, `0` when not covered.
    #[must_use]
    pub fn school_count(&self, zipcode: u32) -> u32 {
        self.schools.get(&zipcode).copied().unwrap_or(0)
    }

    /// Resolves all three datasets at once. A missing postal code (for
    /// example a listing without one) yields the "no data" sentinel.
    #[must_use]
    pub fn lookup(&self, zipcode: Option<u32>) -> Enrichment<'_> {
        zipcode.map_or_else(Enrichment::default, |zip| Enrichment {
            crime: self.crime(zip),
            hospital_count: self.hospital_count(zip),
            school_count: self.school_count(zip),
        })
    }

    /// Number of postal codes covered by each dataset, as
    /// `(crime, hospital, school)`.
    #[must_use]
    pub fn coverage(&self) -> (usize, usize, usize) {
        (self.crime.len(), self.hospitals.len(), self.schools.len())
    }
}

fn index_by_postal_code<V>(
    dataset: Dataset,
    entries: impl IntoIterator<Item = (u32, V)>,
    policy: DuplicatePolicy,
) -> Result<BTreeMap<u32, V>, GeoEnrichmentError> {
    let mut map = BTreeMap::new();

    for (zipcode, value) in entries {
        if map.insert(zipcode, value).is_some() {
            match policy {
                DuplicatePolicy::LastWins => {
                    log::warn!(
                        "Duplicate postal code {zipcode} in {dataset} dataset; keeping the later record"
                    );
                }
                DuplicatePolicy::Reject => {
                    return Err(GeoEnrichmentError::DuplicatePostalCode { dataset, zipcode });
                }
            }
        }
    }

    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use estate_rank_geo_enrichment_models::CrimeGrade;

    fn crime(zipcode: u32, grade: CrimeGrade) -> CrimeRecord {
        CrimeRecord {
            zipcode,
            property_crime_grade: Some(grade),
            total_property_crime: Some(10.0),
            violent_crime_grade: Some(grade),
            total_violent_crime: Some(1.0),
        }
    }

    #[test]
    fn looks_up_each_dataset() {
        let index = GeoEnrichmentIndex::build(
            vec![crime(78701, CrimeGrade::B)],
            vec![HospitalRecord {
                zipcode: 78701,
                hospital_count: 3,
            }],
            vec![SchoolRecord {
                zipcode: 78702,
                school_count: 7,
            }],
            DuplicatePolicy::LastWins,
        )
        .unwrap();

        let hit = index.lookup(Some(78701));
        assert_eq!(
            hit.crime.and_then(|c| c.property_crime_grade),
            Some(CrimeGrade::B)
        );
        assert_eq!(hit.hospital_count, 3);
        assert_eq!(hit.school_count, 0);
        assert_eq!(index.school_count(78702), 7);
        assert_eq!(index.coverage(), (1, 1, 1));
    }

    #[test]
    fn missing_postal_code_is_no_data() {
        let index = GeoEnrichmentIndex::empty();
        assert_eq!(index.lookup(Some(12345)), Enrichment::default());
        assert_eq!(index.lookup(None), Enrichment::default());
        assert!(index.crime(12345).is_none());
    }

    #[test]
    fn last_wins_keeps_later_record() {
        let index = GeoEnrichmentIndex::build(
            vec![crime(1, CrimeGrade::A), crime(1, CrimeGrade::F)],
            vec![
                HospitalRecord {
                    zipcode: 1,
                    hospital_count: 2,
                },
                HospitalRecord {
                    zipcode: 1,
                    hospital_count: 9,
                },
            ],
            vec![],
            DuplicatePolicy::LastWins,
        )
        .unwrap();

        assert_eq!(
            index.crime(1).and_then(|c| c.violent_crime_grade),
            Some(CrimeGrade::F)
        );
        assert_eq!(index.hospital_count(1), 9);
    }

    #[test]
    fn reject_policy_fails_on_duplicates() {
        let err = GeoEnrichmentIndex::build(
            vec![],
            vec![],
            vec![
                SchoolRecord {
                    zipcode: 42,
                    school_count: 1,
                },
                SchoolRecord {
                    zipcode: 42,
                    school_count: 2,
                },
            ],
            DuplicatePolicy::Reject,
        )
        .unwrap_err();

        match err {
            GeoEnrichmentError::DuplicatePostalCode { dataset, zipcode } => {
                assert_eq!(dataset, Dataset::School);
                assert_eq!(zipcode, 42);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn duplicate_policy_parses_from_config_strings() {
        assert_eq!(
            "reject".parse::<DuplicatePolicy>().unwrap(),
            DuplicatePolicy::Reject
        );
        assert_eq!(DuplicatePolicy::default().to_string(), "last_wins");
    }
}
