//! # Change Calculator
//!
//! Year-over-year first differences, plus the render-time rounding rule for
//! near-zero changes.

use crate::types::Series;

/// Magnitude at or below which a change is displayed as exactly zero.
///
/// Expressed in the display unit of the series being charted. The stored
/// change series keeps full precision; only presentation applies this.
pub const ZERO_DISPLAY_THRESHOLD: f64 = 0.5;

/// Compute `series[y] − series[y−1]` for every year with both `y` and
/// `y−1` present in the input.
///
/// The earliest year of the input never appears in the output — there is no
/// prior-year value to diff against. Years following a gap produce no entry
/// either, since the prior year is missing.
#[must_use]
pub fn change(series: &Series) -> Series {
    series
        .iter()
        .filter_map(|(year, value)| {
            series
                .get(year - 1)
                .map(|previous| (year, value - previous))
        })
        .collect()
}

/// Render-time rounding: changes with magnitude `<=` the threshold are shown
/// as exactly zero.
///
/// Applied by chart preparation only, never baked into a stored series, so
/// the undisplayed precise value remains available.
#[must_use]
pub fn display_value(value: f64) -> f64 {
    if value.abs() <= ZERO_DISPLAY_THRESHOLD {
        0.0
    } else {
        value
    }
}

// =============================================================================
// TESTS
// =============================================================================
