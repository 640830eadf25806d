//! Input and output file locations.
//!
//! Dataset and catalog file names are resolved against `data_dir`; reports
//! are written under `output_dir`. Relative directories resolve against
//! the working directory.

use std::path::PathBuf;

use estate_rank_geo_enrichment::DatasetPaths;
use serde::Deserialize;

/// File name of the evaluation output.
pub const RANKED_RESULTS_FILE: &str = "ranked_results.json";

/// File name of the case study JSON output.
pub const CASE_STUDY_RESULTS_FILE: &str = "case_study_results.json";

/// File name of the case study HTML report.
pub const CASE_STUDY_REPORT_FILE: &str = "case_study_report.html";

/// Directory and file name settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathSettings {
    /// Directory holding the catalog and enrichment datasets.
    pub data_dir: PathBuf,
    /// Directory that receives evaluation and case study output.
    pub output_dir: PathBuf,
    /// Catalog file name.
    pub catalog: String,
    /// Crime dataset file name (`.json` or `.csv`).
    pub crime: String,
    /// Hospital dataset file name.
    pub hospital: String,
    /// School dataset file name.
    pub school: String,
    /// Case study definitions file name.
    pub case_studies: String,
    /// Evaluation query file name.
    pub test_queries: String,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            output_dir: PathBuf::from("output"),
            catalog: "properties.json".to_string(),
            crime: "crime_data.csv".to_string(),
            hospital: "hospital_counts.csv".to_string(),
            school: "school_counts.csv".to_string(),
            case_studies: "case_studies.json".to_string(),
            test_queries: "test_queries.json".to_string(),
        }
    }
}

impl PathSettings {
    /// Catalog JSON path.
    #[must_use]
    pub fn catalog_path(&self) -> PathBuf {
        self.data_dir.join(&self.catalog)
    }

    /// Enrichment dataset paths.
    #[must_use]
    pub fn dataset_paths(&self) -> DatasetPaths {
        DatasetPaths {
            crime: self.data_dir.join(&self.crime),
            hospital: self.data_dir.join(&self.hospital),
            school: self.data_dir.join(&self.school),
        }
    }

    /// Case study definitions path.
    #[must_use]
    pub fn case_studies_path(&self) -> PathBuf {
        self.data_dir.join(&self.case_studies)
    }

    /// Evaluation query path.
    #[must_use]
    pub fn test_queries_path(&self) -> PathBuf {
        self.data_dir.join(&self.test_queries)
    }

    /// Evaluation output path.
    #[must_use]
    pub fn ranked_results_path(&self) -> PathBuf {
        self.output_dir.join(RANKED_RESULTS_FILE)
    }

    /// Case study JSON output path.
    #[must_use]
    pub fn case_study_results_path(&self) -> PathBuf {
        self.output_dir.join(CASE_STUDY_RESULTS_FILE)
    }

    /// Case study HTML report path.
    #[must_use]
    pub fn case_study_report_path(&self) -> PathBuf {
        self.output_dir.join(CASE_STUDY_REPORT_FILE)
    }
}
