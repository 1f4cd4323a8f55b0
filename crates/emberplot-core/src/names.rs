//! # Canonical Entity Names
//!
//! The energy dataset, the country-shares dataset, and chart titles do not
//! agree on country naming. Every special case lives in the one table below
//! and every join boundary consults it — a mismatch is a detected error
//! (`JoinMismatch`), never a silent empty result.

use crate::types::EmberError;
use std::collections::BTreeSet;

/// Entity name the world aggregate is keyed by in the source data.
pub const TOTAL_WORLD: &str = "Total World";

/// Display name for the world aggregate.
pub const WORLD: &str = "World";

/// Alias table mapping dataset spellings to the canonical spelling used on
/// both sides of any join or lookup.
const ALIASES: &[(&str, &str)] = &[
    ("US", "United States"),
    ("USA", "United States"),
    ("United Kingdom", "UK"),
    ("Russian Federation", "Russia"),
    ("Total World", "World"),
    ("Korea, Rep.", "South Korea"),
    ("Iran, Islamic Rep.", "Iran"),
    ("Turkiye", "Turkey"),
];

/// Canonical spelling for an entity name.
///
/// Names without an alias entry are already canonical and pass through
/// unchanged.
#[must_use]
pub fn canonical(name: &str) -> &str {
    ALIASES
        .iter()
        .find(|(alias, _)| *alias == name)
        .map_or(name, |(_, canon)| canon)
}

/// Display name for an entity.
///
/// "Total World" is canonicalized to "World" for display purposes only; the
/// underlying category filter still matches source data keyed "Total World".
#[must_use]
pub fn display_name(source_name: &str) -> &str {
    if source_name == TOTAL_WORLD {
        WORLD
    } else {
        source_name
    }
}

/// Post-join coverage check.
///
/// After canonical mapping, every required entity must have a counterpart in
/// the available set; otherwise the join silently produced empty series
/// somewhere. Returns [`EmberError::JoinMismatch`] naming every uncovered
/// entity.
pub fn check_coverage<'a>(
    required: impl IntoIterator<Item = &'a str>,
    available: impl IntoIterator<Item = &'a str>,
) -> Result<(), EmberError> {
    let available: BTreeSet<&str> = available.into_iter().map(canonical).collect();
    let missing: Vec<String> = required
        .into_iter()
        .map(canonical)
        .filter(|name| !available.contains(name))
        .map(str::to_string)
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(EmberError::JoinMismatch { missing })
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_maps_known_aliases() {
        assert_eq!(canonical("US"), "United States");
        assert_eq!(canonical("United Kingdom"), "UK");
        assert_eq!(canonical("Russian Federation"), "Russia");
    }

    #[test]
    fn canonical_passes_unknown_names_through() {
        assert_eq!(canonical("Germany"), "Germany");
    }

    #[test]
    fn display_name_rewrites_total_world_only() {
        assert_eq!(display_name("Total World"), "World");
        assert_eq!(display_name("France"), "France");
    }

    #[test]
    fn coverage_succeeds_after_mapping_both_sides() {
        // Energy side says "US", shares side says "United States"
        let required = ["US", "Germany"];
        let available = ["United States", "Germany", "France"];
        assert!(check_coverage(required, available).is_ok());
    }

    #[test]
    fn coverage_fails_when_mapping_is_incomplete() {
        let required = ["US", "Ruritania"];
        let available = ["United States"];
        let err = check_coverage(required, available).expect_err("must fail");
        assert!(matches!(
            err,
            EmberError::JoinMismatch { missing } if missing == vec!["Ruritania".to_string()]
        ));
    }

    #[test]
    fn coverage_applies_aliases_on_the_available_side_too() {
        let required = ["United States"];
        let available = ["US"];
        assert!(check_coverage(required, available).is_ok());
    }
}
