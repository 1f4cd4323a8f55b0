//! # Unit Converter
//!
//! Pure scalar conversions between the units the source datasets report in
//! and the units charts display in.
//!
//! The named constants below are the single source of truth for conversion
//! factors across the whole system. No other module may define its own.

use crate::types::{EmberError, Series};

// =============================================================================
// CONVERSION FACTORS (Exact, Authoritative)
// =============================================================================

/// Thousand to million (e.g. kt to Mt).
pub const THOUSAND_TO_MILLION: f64 = 0.001;

/// Petajoule to exajoule.
pub const PETAJOULE_TO_EXAJOULE: f64 = 0.001;

/// Thousand barrels/day to million barrels/day.
pub const KBD_TO_MBPD: f64 = 0.001;

/// Megatonne to gigatonne.
pub const MEGATONNE_TO_GIGATONNE: f64 = 0.001;

/// Tonne of oil equivalent to gigajoule. Converts mass-based oil figures to
/// energy units.
pub const TOE_TO_GIGAJOULE: f64 = 41.868;

// =============================================================================
// CONVERSION
// =============================================================================

/// Multiply every value of a series by a fixed positive factor.
///
/// Returns a new series with identical year keys; the input is never
/// mutated. Conversions in this domain are always positive scalar
/// multiplications, so zero, negative, and non-finite factors are rejected
/// with [`EmberError::InvalidFactor`].
pub fn convert(series: &Series, factor: f64) -> Result<Series, EmberError> {
    if !factor.is_finite() || factor <= 0.0 {
        return Err(EmberError::InvalidFactor { factor });
    }
    Ok(series.iter().map(|(y, v)| (y, v * factor)).collect())
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn kbd_to_mbpd_is_exact() {
        let s = Series::from_pairs([(2020, 1000.0)]);
        let converted = convert(&s, KBD_TO_MBPD).expect("convert");
        assert_eq!(converted.get(2020), Some(1.0));
    }

    #[test]
    fn convert_keeps_year_keys_and_input() {
        let s = Series::from_pairs([(1990, 2.0), (1995, 4.0)]);
        let converted = convert(&s, PETAJOULE_TO_EXAJOULE).expect("convert");
        let years: Vec<_> = converted.years().collect();
        assert_eq!(years, vec![1990, 1995]);
        // Referential transparency: input untouched
        assert_eq!(s.get(1990), Some(2.0));
    }

    #[test]
    fn convert_rejects_zero_factor() {
        let s = Series::from_pairs([(2020, 1.0)]);
        assert!(matches!(
            convert(&s, 0.0),
            Err(EmberError::InvalidFactor { .. })
        ));
    }

    #[test]
    fn convert_rejects_negative_factor() {
        let s = Series::from_pairs([(2020, 1.0)]);
        assert!(matches!(
            convert(&s, -0.5),
            Err(EmberError::InvalidFactor { .. })
        ));
    }

    #[test]
    fn convert_rejects_non_finite_factor() {
        let s = Series::from_pairs([(2020, 1.0)]);
        assert!(convert(&s, f64::NAN).is_err());
        assert!(convert(&s, f64::INFINITY).is_err());
    }

    #[test]
    fn convert_empty_series_stays_empty() {
        let converted = convert(&Series::new(), TOE_TO_GIGAJOULE).expect("convert");
        assert!(converted.is_empty());
    }

    proptest! {
        // convert(convert(s, f), 1/f) == s within floating-point tolerance
        #[test]
        fn round_trip_recovers_input(
            values in proptest::collection::vec((1900i32..2100, -1.0e6f64..1.0e6), 0..40),
            factor in 1.0e-6f64..1.0e6,
        ) {
            let s = Series::from_pairs(values);
            let there = convert(&s, factor).expect("forward");
            let back = convert(&there, 1.0 / factor).expect("inverse");
            prop_assert_eq!(back.len(), s.len());
            for (y, v) in s.iter() {
                let recovered = back.get(y).expect("year preserved");
                prop_assert!((recovered - v).abs() <= v.abs() * 1e-9 + 1e-9);
            }
        }
    }
}
