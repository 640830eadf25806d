#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Property listing types and catalog record flattening.
//!
//! The on-disk catalog stores each listing as a [`RawListing`]: a handful of
//! top-level attributes plus optional `saleInfo` / `rentInfo` sub-objects
//! collected from separate sale and rental feeds. [`RawListing::flatten`]
//! collapses those into the single immutable [`Property`] shape that every
//! scoring component consumes.

use estate_rank_scoring::{NormRange, round2};
use serde::{Deserialize, Deserializer, Serialize};

/// Price assumed when a listing has no usable asking price.
pub const FALLBACK_PRICE: f64 = 1_000_000.0;

/// Days on market assumed when a listing does not report it.
pub const STALE_DAYS_ON_MARKET: f64 = 365.0;

/// Price normalization window shared by ranking and investment scoring.
pub const PRICE_RANGE: NormRange = NormRange::inverted(0.0, 2_000_000.0);

/// Days-on-market normalization window.
pub const DAYS_ON_MARKET_RANGE: NormRange = NormRange::inverted(0.0, 365.0);

/// Rental yield (percent) normalization window.
pub const RENTAL_YIELD_RANGE: NormRange = NormRange::new(0.0, 10.0);

/// Anything that carries a stable listing identifier.
///
/// Evaluation metrics and benchmark lookups only care about identity, so
/// they accept any ranked sequence of these.
pub trait HasId {
    /// The listing identifier.
    fn id(&self) -> &str;
}

impl HasId for String {
    fn id(&self) -> &str {
        self
    }
}

impl HasId for str {
    fn id(&self) -> &str {
        self
    }
}

impl<T: HasId + ?Sized> HasId for &T {
    fn id(&self) -> &str {
        (**self).id()
    }
}

/// A single catalog listing after flattening.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Property {
    /// Unique listing identifier.
    pub id: String,
    /// Full street address as displayed.
    pub formatted_address: String,
    /// City name.
    pub city: Option<String>,
    /// State abbreviation.
    pub state: Option<String>,
    /// Postal code. Numeric codes in the source are stored as strings.
    #[serde(deserialize_with = "deserialize_postal_code")]
    pub zip_code: Option<String>,
    /// Latitude (WGS84).
    pub latitude: Option<f64>,
    /// Longitude (WGS84).
    pub longitude: Option<f64>,
    /// Bedroom count.
    pub bedrooms: f64,
    /// Bathroom count (half baths allowed).
    pub bathrooms: f64,
    /// Interior square footage.
    pub square_footage: Option<f64>,
    /// Lot size in square feet.
    pub lot_size: Option<f64>,
    /// Year of construction.
    pub year_built: Option<u32>,
    /// Property type (e.g. "Single Family").
    pub property_type: Option<String>,
    /// Listing status (e.g. "Active").
    pub status: Option<String>,
    /// Asking sale price.
    pub price: Option<f64>,
    /// Monthly rent estimate.
    pub rent: Option<f64>,
    /// Days the listing has been on the market.
    pub days_on_market: Option<f64>,
    /// Annual rent as a percentage of price.
    pub rental_yield: Option<f64>,
    /// Precomputed investment score on a `0..=10` scale.
    pub investment_score: Option<f64>,
    /// Free-text listing description.
    pub description: Option<String>,
}

impl HasId for Property {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Property {
    /// Returns the postal code as the integer key used by the enrichment
    /// datasets, or `None` if it is absent or not numeric.
    #[must_use]
    pub fn postal_code_key(&self) -> Option<u32> {
        self.zip_code.as_deref().and_then(|z| z.trim().parse().ok())
    }

    /// Returns `true` if the city, state, or postal code contains `location`
    /// (case-insensitive). An empty location matches every property.
    #[must_use]
    pub fn matches_location(&self, location: &str) -> bool {
        let needle = location.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }

        [&self.city, &self.state, &self.zip_code]
            .into_iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(&needle))
    }
}

/// Sale- or rent-side details attached to a raw catalog record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListingInfo {
    /// City name.
    pub city: Option<String>,
    /// State abbreviation.
    pub state: Option<String>,
    /// Postal code.
    #[serde(deserialize_with = "deserialize_postal_code")]
    pub zip_code: Option<String>,
    /// Latitude (WGS84).
    pub latitude: Option<f64>,
    /// Longitude (WGS84).
    pub longitude: Option<f64>,
    /// Bedroom count.
    pub bedrooms: Option<f64>,
    /// Bathroom count.
    pub bathrooms: Option<f64>,
    /// Interior square footage.
    pub square_footage: Option<f64>,
    /// Lot size in square feet.
    pub lot_size: Option<f64>,
    /// Year of construction.
    pub year_built: Option<u32>,
    /// Property type.
    pub property_type: Option<String>,
    /// Listing status.
    pub status: Option<String>,
    /// Sale price on the sale side, monthly rent on the rent side.
    pub price: Option<f64>,
    /// Days on market for this side of the listing.
    pub days_on_market: Option<f64>,
}

/// A catalog record as stored on disk, before flattening.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawListing {
    /// Listing identifier; falls back to the formatted address when absent.
    pub id: Option<String>,
    /// Full street address.
    pub formatted_address: Option<String>,
    /// City name.
    pub city: Option<String>,
    /// State abbreviation.
    pub state: Option<String>,
    /// Postal code.
    #[serde(deserialize_with = "deserialize_postal_code")]
    pub zip_code: Option<String>,
    /// Latitude (WGS84).
    pub latitude: Option<f64>,
    /// Longitude (WGS84).
    pub longitude: Option<f64>,
    /// Bedroom count.
    pub bedrooms: Option<f64>,
    /// Bathroom count.
    pub bathrooms: Option<f64>,
    /// Interior square footage.
    pub square_footage: Option<f64>,
    /// Lot size in square feet.
    pub lot_size: Option<f64>,
    /// Year of construction.
    pub year_built: Option<u32>,
    /// Property type.
    pub property_type: Option<String>,
    /// Already-flattened price, if the record carries one.
    pub price: Option<f64>,
    /// Already-flattened rent, if the record carries one.
    pub rent: Option<f64>,
    /// Already-flattened days on market.
    pub days_on_market: Option<f64>,
    /// Precomputed rental yield.
    pub rental_yield: Option<f64>,
    /// Precomputed investment score.
    pub investment_score: Option<f64>,
    /// Free-text description.
    pub description: Option<String>,
    /// Sale-side details.
    pub sale_info: Option<ListingInfo>,
    /// Rent-side details.
    pub rent_info: Option<ListingInfo>,
}

impl RawListing {
    /// Collapses the record into a [`Property`].
    ///
    /// Top-level attributes win over sale-side values, which win over
    /// rent-side values. `rentalYield` and `investmentScore` are derived
    /// when the record does not already carry them.
    ///
    /// Returns `None` when the record has neither an id nor an address to
    /// identify it by.
    #[must_use]
    pub fn flatten(self) -> Option<Property> {
        let sale = self.sale_info.unwrap_or_default();
        let rent = self.rent_info.unwrap_or_default();

        let formatted_address = self.formatted_address.unwrap_or_default();
        let id = self
            .id
            .filter(|id| !id.is_empty())
            .or_else(|| (!formatted_address.is_empty()).then(|| formatted_address.clone()))?;

        let price = self.price.or(sale.price);
        let monthly_rent = self.rent.or(rent.price);
        let days_on_market = self
            .days_on_market
            .or(sale.days_on_market)
            .or(rent.days_on_market);

        let rental_yield = self
            .rental_yield
            .or_else(|| derive_rental_yield(price, monthly_rent));
        let investment_score = self
            .investment_score
            .or_else(|| derive_investment_score(rental_yield, price, days_on_market));

        Some(Property {
            id,
            formatted_address,
            city: self.city.or(sale.city).or(rent.city),
            state: self.state.or(sale.state).or(rent.state),
            zip_code: self.zip_code.or(sale.zip_code).or(rent.zip_code),
            latitude: self.latitude.or(sale.latitude).or(rent.latitude),
            longitude: self.longitude.or(sale.longitude).or(rent.longitude),
            bedrooms: self.bedrooms.or(sale.bedrooms).or(rent.bedrooms).unwrap_or(0.0),
            bathrooms: self
                .bathrooms
                .or(sale.bathrooms)
                .or(rent.bathrooms)
                .unwrap_or(0.0),
            square_footage: self
                .square_footage
                .or(sale.square_footage)
                .or(rent.square_footage),
            lot_size: self.lot_size.or(sale.lot_size),
            year_built: self.year_built.or(sale.year_built),
            property_type: self
                .property_type
                .or(sale.property_type)
                .or(rent.property_type),
            status: sale.status.or(rent.status),
            price,
            rent: monthly_rent,
            days_on_market,
            rental_yield,
            investment_score,
            description: self.description.filter(|d| !d.trim().is_empty()),
        })
    }
}

/// Annual rent as a percentage of price, rounded to two decimals.
#[must_use]
pub fn derive_rental_yield(price: Option<f64>, monthly_rent: Option<f64>) -> Option<f64> {
    match (price, monthly_rent) {
        (Some(price), Some(rent)) if price > 0.0 && rent > 0.0 => {
            Some(round2(rent * 12.0 / price * 100.0))
        }
        _ => None,
    }
}

/// Investment score on a `0..=10` scale: half rental yield, a quarter
/// affordability, a quarter listing freshness.
///
/// Requires a rental yield and a positive price.
#[must_use]
pub fn derive_investment_score(
    rental_yield: Option<f64>,
    price: Option<f64>,
    days_on_market: Option<f64>,
) -> Option<f64> {
    let rental_yield = rental_yield?;
    let price = price.filter(|p| *p > 0.0)?;

    let blended = RENTAL_YIELD_RANGE.apply(Some(rental_yield)) * 0.5
        + PRICE_RANGE.apply(Some(price)) * 0.25
        + DAYS_ON_MARKET_RANGE.apply(Some(days_on_market.unwrap_or(STALE_DAYS_ON_MARKET))) * 0.25;

    Some(round2(blended) * 10.0)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PostalCodeRepr {
    Text(String),
    Number(u64),
}

fn deserialize_postal_code<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let repr = Option::<PostalCodeRepr>::deserialize(deserializer)?;
    Ok(repr.and_then(|r| match r {
        PostalCodeRepr::Text(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        PostalCodeRepr::Number(n) => Some(format!("{n:05}")),
    }))
}
