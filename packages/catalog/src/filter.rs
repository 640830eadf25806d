//! Browse filters and sort modes.

use std::cmp::Ordering;

use estate_rank_property_models::Property;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Optional lower/upper bounds applied before ranking.
///
/// A property missing the attribute a bound applies to is excluded while
/// that bound is set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct CatalogFilter {
    /// Inclusive minimum sale price.
    pub min_price: Option<f64>,
    /// Inclusive maximum sale price.
    pub max_price: Option<f64>,
    /// Minimum bedroom count.
    pub min_bedrooms: Option<f64>,
    /// Minimum bathroom count.
    pub min_bathrooms: Option<f64>,
    /// Minimum rental yield, in percent.
    pub min_rental_yield: Option<f64>,
}

fn at_least(value: Option<f64>, bound: Option<f64>) -> bool {
    bound.is_none_or(|bound| value.is_some_and(|v| v >= bound))
}

fn at_most(value: Option<f64>, bound: Option<f64>) -> bool {
    bound.is_none_or(|bound| value.is_some_and(|v| v <= bound))
}

impl CatalogFilter {
    /// Whether `property` passes every bound that is set.
    #[must_use]
    pub fn matches(&self, property: &Property) -> bool {
        at_least(property.price, self.min_price)
            && at_most(property.price, self.max_price)
            && at_least(Some(property.bedrooms), self.min_bedrooms)
            && at_least(Some(property.bathrooms), self.min_bathrooms)
            && at_least(property.rental_yield, self.min_rental_yield)
    }

    /// Whether any bound is set.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.min_price.is_some()
            || self.max_price.is_some()
            || self.min_bedrooms.is_some()
            || self.min_bathrooms.is_some()
            || self.min_rental_yield.is_some()
    }
}

/// Result ordering for [`crate::browse`].
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SortBy {
    /// Cheapest first.
    Price,
    /// Highest rental yield first.
    RentalYield,
    /// Highest investment score first.
    InvestmentScore,
    /// Highest composite ranking score first.
    #[default]
    Ranking,
    /// Highest text relevance first; [`SortBy::Ranking`] without a query.
    TextRelevance,
}

/// Orders present values by `cmp` and puts missing or non-finite values
/// last.
pub(crate) fn missing_last(
    a: Option<f64>,
    b: Option<f64>,
    cmp: impl Fn(f64, f64) -> Ordering,
) -> Ordering {
    match (a.filter(|v| v.is_finite()), b.filter(|v| v.is_finite())) {
        (Some(a), Some(b)) => cmp(a, b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
