#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Ranking factor taxonomy, weight profiles, and ranked property types.
//!
//! The set of scoring factors is closed: [`Factor`] enumerates every input
//! the ranking engine knows how to score, and [`Weights`] carries exactly
//! one weight per factor. Deserializing a weight profile with an unknown
//! key is an error rather than a silently ignored typo.

use estate_rank_property_models::{HasId, Property};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// A single scoring input of the composite ranking score.
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
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum Factor {
    /// Number of schools in the postal code.
    School,
    /// Safety derived from crime grades and incident totals.
    CrimeRate,
    /// Number of hospitals in the postal code.
    Hospital,
    /// Affordability (cheaper scores higher).
    Price,
    /// Interior square footage.
    Size,
    /// Precomputed investment score.
    InvestmentScore,
    /// Annual rent as a percentage of price.
    RentalYield,
    /// Listing freshness (fewer days scores higher).
    DaysOnMarket,
}

impl Factor {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::School,
            Self::CrimeRate,
            Self::Hospital,
            Self::Price,
            Self::Size,
            Self::InvestmentScore,
            Self::RentalYield,
            Self::DaysOnMarket,
        ]
    }
}

macro_rules! factor_record {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
        #[serde(rename_all = "camelCase", default, deny_unknown_fields)]
        pub struct $name {
            /// School access.
            pub school: f64,
            /// Safety.
            pub crime_rate: f64,
            /// Hospital access.
            pub hospital: f64,
            /// Affordability.
            pub price: f64,
            /// Interior size.
            pub size: f64,
            /// Investment score.
            pub investment_score: f64,
            /// Rental yield.
            pub rental_yield: f64,
            /// Listing freshness.
            pub days_on_market: f64,
        }

        impl $name {
            /// Returns the value stored for `factor`.
            #[must_use]
            pub const fn get(&self, factor: Factor) -> f64 {
                match factor {
                    Factor::School => self.school,
                    Factor::CrimeRate => self.crime_rate,
                    Factor::Hospital => self.hospital,
                    Factor::Price => self.price,
                    Factor::Size => self.size,
                    Factor::InvestmentScore => self.investment_score,
                    Factor::RentalYield => self.rental_yield,
                    Factor::DaysOnMarket => self.days_on_market,
                }
            }

            /// Returns a copy with the value for `factor` replaced.
            #[must_use]
            pub const fn with(mut self, factor: Factor, value: f64) -> Self {
                match factor {
                    Factor::School => self.school = value,
                    Factor::CrimeRate => self.crime_rate = value,
                    Factor::Hospital => self.hospital = value,
                    Factor::Price => self.price = value,
                    Factor::Size => self.size = value,
                    Factor::InvestmentScore => self.investment_score = value,
                    Factor::RentalYield => self.rental_yield = value,
                    Factor::DaysOnMarket => self.days_on_market = value,
                }
                self
            }
        }
    };
}

factor_record!(
    /// One weight per ranking factor. Missing factors default to zero and
    /// weights need not sum to one.
    Weights
);

factor_record!(
    /// Normalized per-factor scores for one property, each in `[0, 1]`.
    FactorScores
);

impl Weights {
    /// Sum of all weights; the upper bound of any composite score.
    #[must_use]
    pub fn total(&self) -> f64 {
        Factor::all().iter().map(|f| self.get(*f)).sum()
    }
}

impl FactorScores {
    /// Every factor at its best possible value.
    pub const MAX: Self = Self {
        school: 1.0,
        crime_rate: 1.0,
        hospital: 1.0,
        price: 1.0,
        size: 1.0,
        investment_score: 1.0,
        rental_yield: 1.0,
        days_on_market: 1.0,
    };

    /// Composite score: the dot product of scores and weights.
    #[must_use]
    pub fn weighted_sum(&self, weights: &Weights) -> f64 {
        Factor::all()
            .iter()
            .map(|f| self.get(*f) * weights.get(*f))
            .sum()
    }
}

/// A property together with its composite ranking score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedProperty {
    /// The unmodified input listing.
    #[serde(flatten)]
    pub property: Property,
    /// Weighted sum of normalized factor scores.
    pub ranking_score: f64,
}

impl HasId for RankedProperty {
    fn id(&self) -> &str {
        &self.property.id
    }
}
