//! # Share Calculator
//!
//! Category-over-total percentage series.
//!
//! A set of shares partitioning a total can sum to slightly off 100%
//! (99.8–100.2%) after rounding. That drift is accepted and surfaced as a
//! chart-footer caveat, never corrected.

use crate::types::{EmberError, Series};

/// Compute `100 × part[y] / total[y]` for each year present in **both**
/// inputs.
///
/// Years present in only one input are excluded from the result — no forward
/// or backward fill. Fails with [`EmberError::DivisionByZero`] when the total
/// is zero for an otherwise eligible year; callers either pre-filter such
/// years or accept the error.
pub fn share(part: &Series, total: &Series) -> Result<Series, EmberError> {
    let mut result = Series::new();
    for (year, part_value) in part.iter() {
        let Some(total_value) = total.get(year) else {
            continue;
        };
        if total_value == 0.0 {
            return Err(EmberError::DivisionByZero { year });
        }
        result.insert(year, 100.0 * part_value / total_value);
    }
    Ok(result)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const TOL: f64 = 1e-9;

    #[test]
    fn coal_share_of_primary_matches_hand_computation() {
        let primary = Series::from_pairs([(2020, 500.0), (2021, 510.0)]);
        let coal = Series::from_pairs([(2020, 100.0), (2021, 105.0)]);
        let shares = share(&coal, &primary).expect("share");
        assert!((shares.get(2020).expect("2020") - 20.0).abs() < TOL);
        assert!((shares.get(2021).expect("2021") - 100.0 * 105.0 / 510.0).abs() < TOL);
    }

    #[test]
    fn years_missing_from_either_side_are_excluded() {
        let part = Series::from_pairs([(2000, 10.0), (2001, 10.0)]);
        let total = Series::from_pairs([(2001, 40.0), (2002, 40.0)]);
        let shares = share(&part, &total).expect("share");
        let years: Vec<_> = shares.years().collect();
        assert_eq!(years, vec![2001]);
        assert_eq!(shares.get(2001), Some(25.0));
    }

    #[test]
    fn zero_total_on_eligible_year_is_an_error() {
        let part = Series::from_pairs([(2000, 10.0)]);
        let total = Series::from_pairs([(2000, 0.0)]);
        assert!(matches!(
            share(&part, &total),
            Err(EmberError::DivisionByZero { year: 2000 })
        ));
    }

    #[test]
    fn zero_total_on_ineligible_year_is_ignored() {
        // The zero year is absent from `part`, so it never divides.
        let part = Series::from_pairs([(2001, 10.0)]);
        let total = Series::from_pairs([(2000, 0.0), (2001, 40.0)]);
        let shares = share(&part, &total).expect("share");
        assert_eq!(shares.get(2001), Some(25.0));
    }

    #[test]
    fn empty_part_yields_empty_share() {
        let total = Series::from_pairs([(2000, 40.0)]);
        let shares = share(&Series::new(), &total).expect("share");
        assert!(shares.is_empty());
    }

    proptest! {
        // Shares of a partition sum to 100 within the documented tolerance,
        // and each share of a part <= total lies in [0, 100].
        #[test]
        fn partition_shares_sum_to_hundred(
            parts in proptest::collection::vec(0.1f64..1.0e4, 2..6),
        ) {
            let year = 2020;
            let total_value: f64 = parts.iter().sum();
            let total = Series::from_pairs([(year, total_value)]);

            let mut sum = 0.0;
            for p in &parts {
                let part = Series::from_pairs([(year, *p)]);
                let s = share(&part, &total).expect("share");
                let v = s.get(year).expect("year");
                prop_assert!((0.0..=100.0 + TOL).contains(&v));
                sum += v;
            }
            prop_assert!((sum - 100.0).abs() <= 0.5);
        }
    }
}
