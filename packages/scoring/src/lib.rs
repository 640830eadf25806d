#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Normalization primitives shared by every property scoring component.
//!
//! Raw attribute values (prices, facility counts, incident totals) live on
//! wildly different scales. Everything that feeds the composite ranking
//! score is first squashed into `[0, 1]` with [`normalize`] so that weights
//! can be compared across factors.

/// Maps `value` into `[0, 1]` relative to `[min, max]`.
///
/// * A missing or `NaN` value scores `0`.
/// * The linear interpolation is clamped before the optional inversion, so
///   out-of-range inputs saturate at the edges.
/// * A degenerate range (`min == max`) returns `1`, or `0` when inverted.
#[must_use]
#[allow(clippy::float_cmp)]
pub const fn normalize(value: Option<f64>, min: f64, max: f64, inverse: bool) -> f64 {
    let Some(value) = value else {
        return 0.0;
    };
    if value.is_nan() {
        return 0.0;
    }

    if min == max {
        return if inverse { 0.0 } else { 1.0 };
    }

    let scaled = ((value - min) / (max - min)).clamp(0.0, 1.0);
    if inverse { 1.0 - scaled } else { scaled }
}

/// A fixed normalization window for one scoring input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormRange {
    /// Value that maps to `0` (or `1` when inverted).
    pub min: f64,
    /// Value that maps to `1` (or `0` when inverted).
    pub max: f64,
    /// Whether smaller raw values are better.
    pub inverse: bool,
}

impl NormRange {
    /// A range where larger raw values score higher.
    #[must_use]
    pub const fn new(min: f64, max: f64) -> Self {
        Self {
            min,
            max,
            inverse: false,
        }
    }

    /// A range where smaller raw values score higher.
    #[must_use]
    pub const fn inverted(min: f64, max: f64) -> Self {
        Self {
            min,
            max,
            inverse: true,
        }
    }

    /// Applies [`normalize`] with this window.
    #[must_use]
    pub const fn apply(self, value: Option<f64>) -> f64 {
        normalize(value, self.min, self.max, self.inverse)
    }
}

/// Rounds to two decimal places, the precision derived listing metrics are
/// stored with.
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
