//! Dataset file loading.
//!
//! Each enrichment dataset is a flat record collection stored either as a
//! JSON array or as a CSV file with the same column headers. The format is
//! chosen from the file extension.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

use crate::{DuplicatePolicy, GeoEnrichmentError, GeoEnrichmentIndex};

/// Locations of the three enrichment datasets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetPaths {
    /// Crime grades and totals.
    pub crime: PathBuf,
    /// Hospital counts.
    pub hospital: PathBuf,
    /// School counts.
    pub school: PathBuf,
}

impl GeoEnrichmentIndex {
    /// Reads all three datasets and builds the index.
    ///
    /// # Errors
    ///
    /// Returns an error if any file cannot be read or parsed, or if a
    /// duplicate postal code is found under [`DuplicatePolicy::Reject`].
    pub fn load(paths: &DatasetPaths, policy: DuplicatePolicy) -> Result<Self, GeoEnrichmentError> {
        let crime = load_records(&paths.crime)?;
        let hospitals = load_records(&paths.hospital)?;
        let schools = load_records(&paths.school)?;

        Self::build(crime, hospitals, schools, policy)
    }
}

/// Loads a record collection from a `.json` or `.csv` file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, fails to parse, or has an
/// unsupported extension.
pub fn load_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, GeoEnrichmentError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    let records = match extension.as_deref() {
        Some("json") => {
            let text = std::fs::read_to_string(path).map_err(|source| GeoEnrichmentError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            serde_json::from_str(&text).map_err(|source| GeoEnrichmentError::Json {
                path: path.to_path_buf(),
                source,
            })?
        }
        Some("csv") => {
            let mut reader = csv::ReaderBuilder::new()
                .trim(csv::Trim::All)
                .from_path(path)
                .map_err(|source| GeoEnrichmentError::Csv {
                    path: path.to_path_buf(),
                    source,
                })?;
            reader
                .deserialize()
                .collect::<Result<Vec<T>, _>>()
                .map_err(|source| GeoEnrichmentError::Csv {
                    path: path.to_path_buf(),
                    source,
                })?
        }
        _ => {
            return Err(GeoEnrichmentError::UnsupportedFormat {
                path: path.to_path_buf(),
            });
        }
    };

    log::debug!("Loaded {} records from {}", records.len(), path.display());
    Ok(records)
}
