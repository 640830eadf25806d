#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Toolchain settings.
//!
//! Settings come from a TOML file given on the command line or through the
//! [`CONFIG_ENV_VAR`] environment variable. Without either, the
//! `config/default.toml` embedded at compile time is used. Every settings
//! file must define a `default` weight profile.

pub mod paths;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use estate_rank_geo_enrichment::DuplicatePolicy;
use estate_rank_ranking_models::Weights;
use estate_rank_text_search::{Bm25Params, FieldWeights};
use serde::Deserialize;
use thiserror::Error;

pub use paths::PathSettings;

/// Environment variable naming a settings file.
pub const CONFIG_ENV_VAR: &str = "ESTATE_RANK_CONFIG";

/// Name of the profile used when none is requested.
pub const DEFAULT_PROFILE: &str = "default";

const EMBEDDED_DEFAULT: &str = include_str!("../config/default.toml");

/// Errors that can occur while loading settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The settings file could not be read.
    #[error("Failed to read settings file {path}: {source}")]
    Io {
        /// Settings file path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The settings file is not valid TOML or has unknown keys.
    #[error("Invalid settings in {origin}: {source}")]
    Parse {
        /// Where the settings came from.
        origin: String,
        /// Underlying parse error.
        #[source]
        source: toml::de::Error,
    },

    /// The settings define no `default` weight profile.
    #[error("Settings must define a [profiles.default] weight profile")]
    MissingDefaultProfile,

    /// A requested weight profile does not exist.
    #[error("Unknown weight profile {name:?} (available: {available})")]
    UnknownProfile {
        /// Requested name.
        name: String,
        /// Comma-separated defined names.
        available: String,
    },
}

/// Complete toolchain settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Input and output locations.
    pub paths: PathSettings,
    /// Treatment of repeated postal codes in enrichment datasets.
    #[serde(default)]
    pub duplicate_policy: DuplicatePolicy,
    /// BM25 parameters for text queries.
    #[serde(default)]
    pub bm25: Bm25Params,
    /// Field weights for text queries.
    #[serde(default)]
    pub field_weights: FieldWeights,
    /// Named weight profiles.
    pub profiles: BTreeMap<String, Weights>,
}

impl Settings {
    /// Parses settings from TOML text.
    ///
    /// # Errors
    ///
    /// * [`ConfigError::Parse`] if the text is not valid settings TOML
    /// * [`ConfigError::MissingDefaultProfile`] if no `default` profile is
    ///   defined
    pub fn from_toml(text: &str, origin: &str) -> Result<Self, ConfigError> {
        let settings: Self = toml::de::from_str(text).map_err(|source| ConfigError::Parse {
            origin: origin.to_string(),
            source,
        })?;

        if !settings.profiles.contains_key(DEFAULT_PROFILE) {
            return Err(ConfigError::MissingDefaultProfile);
        }

        Ok(settings)
    }

    /// The settings embedded at compile time.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] only if the embedded file is malformed.
    pub fn embedded() -> Result<Self, ConfigError> {
        Self::from_toml(EMBEDDED_DEFAULT, "embedded default settings")
    }

    /// Reads settings from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text, &path.display().to_string())
    }

    /// Loads settings from `explicit`, else from the file named by
    /// [`CONFIG_ENV_VAR`], else from the embedded default.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the chosen source cannot be read or
    /// parsed.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let from_env = std::env::var_os(CONFIG_ENV_VAR)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);

        match explicit.map(Path::to_path_buf).or(from_env) {
            Some(path) => {
                log::info!("Loading settings from {}", path.display());
                Self::from_file(&path)
            }
            None => {
                log::debug!("Using embedded default settings");
                Self::embedded()
            }
        }
    }

    /// The weight profile called `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownProfile`] if no such profile exists.
    pub fn profile(&self, name: &str) -> Result<&Weights, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::UnknownProfile {
                name: name.to_string(),
                available: self.profile_names().join(", "),
            })
    }

    /// The `default` weight profile.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownProfile`] if the settings were built
    /// without going through validation and lack a default.
    pub fn default_profile(&self) -> Result<&Weights, ConfigError> {
        self.profile(DEFAULT_PROFILE)
    }

    /// Names of all defined profiles, sorted.
    #[must_use]
    pub fn profile_names(&self) -> Vec<&str> {
        self.profiles.keys().map(String::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use estate_rank_ranking_models::Factor;

    #[test]
    fn embedded_settings_are_valid() {
        let settings = Settings::embedded().unwrap();
        assert_eq!(settings.duplicate_policy, DuplicatePolicy::LastWins);
        assert_eq!(settings.bm25, Bm25Params::default());
        assert_eq!(settings.field_weights, FieldWeights::default());
        assert_eq!(settings.profile_names(), vec!["default", "family", "investor"]);
    }

    #[test]
    fn default_profile_sums_to_one() {
        let settings = Settings::embedded().unwrap();
        let weights = settings.default_profile().unwrap();
        assert!((weights.total() - 1.0).abs() < 1e-9);
        assert!((weights.get(Factor::DaysOnMarket) - 0.05).abs() < f64::EPSILON);
    }

    #[test]
    fn missing_default_profile_is_rejected() {
        let err = Settings::from_toml(
            "[paths]\n[profiles.investor]\nprice = 1.0\n",
            "test",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::MissingDefaultProfile));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = Settings::from_toml(
            "[paths]\n[profiles.default]\nprize = 1.0\n",
            "test",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn unknown_profile_lists_available_names() {
        let settings = Settings::embedded().unwrap();
        let err = settings.profile("retiree").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unknown weight profile \"retiree\" (available: default, family, investor)"
        );
    }

    #[test]
    fn loads_settings_file() {
        let tmp = std::env::temp_dir().join("estate_rank_config_load_test");
        let _ = std::fs::remove_dir_all(&tmp);
        std::fs::create_dir_all(&tmp).unwrap();
        let path = tmp.join("settings.toml");
        std::fs::write(
            &path,
            "duplicate_policy = \"reject\"\n\
             [paths]\ndata_dir = \"/srv/listings\"\n\
             [bm25]\nk1 = 1.5\n\
             [profiles.default]\nprice = 1.0\n",
        )
        .unwrap();

        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings.duplicate_policy, DuplicatePolicy::Reject);
        assert!((settings.bm25.k1 - 1.5).abs() < f64::EPSILON);
        assert!((settings.bm25.b - 0.75).abs() < f64::EPSILON);
        assert_eq!(
            settings.paths.catalog_path(),
            PathBuf::from("/srv/listings/properties.json")
        );

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn reports_missing_file() {
        let err = Settings::from_file(Path::new("/nonexistent/settings.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
