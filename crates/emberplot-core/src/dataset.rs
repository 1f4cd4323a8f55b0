//! # Observation Set
//!
//! Bulk container for the long-format source table and the Category
//! Extractor that pivots it into per-entity series.
//!
//! - Loaded wholesale at process start, never mutated afterwards
//! - Indexed by `(entity, category)` for extraction
//! - Extraction of an absent category yields an empty `Series`, not an error

use crate::types::{Observation, Series};
use std::collections::{BTreeMap, BTreeSet};

/// The immutable, bulk-loaded observation collection.
///
/// The index is a `BTreeMap` keyed by `(entity, category)` so that entity
/// and category listings iterate in a deterministic order.
#[derive(Debug, Clone, Default)]
pub struct ObservationSet {
    index: BTreeMap<(String, String), Series>,
    row_count: usize,
}

impl ObservationSet {
    /// Create an empty observation set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the set from raw observations.
    ///
    /// Source row order is irrelevant; series come out ascending by year.
    /// Duplicate `(entity, year, category)` rows keep the last value seen.
    #[must_use]
    pub fn from_observations(observations: impl IntoIterator<Item = Observation>) -> Self {
        let mut index: BTreeMap<(String, String), Series> = BTreeMap::new();
        let mut row_count = 0;
        for obs in observations {
            index
                .entry((obs.entity, obs.category))
                .or_default()
                .insert(obs.year, obs.value);
            row_count += 1;
        }
        Self { index, row_count }
    }

    /// Extract the series for one entity and category tag.
    ///
    /// Returns an empty `Series` when no rows match — absence of a fuel or
    /// category for an entity is an expected, common condition the caller
    /// checks via `Series::is_empty` before use.
    #[must_use]
    pub fn extract(&self, entity: &str, category: &str) -> Series {
        self.index
            .get(&(entity.to_string(), category.to_string()))
            .cloned()
            .unwrap_or_default()
    }

    /// All distinct entities, sorted.
    #[must_use]
    pub fn entities(&self) -> Vec<&str> {
        let set: BTreeSet<&str> = self.index.keys().map(|(e, _)| e.as_str()).collect();
        set.into_iter().collect()
    }

    /// All distinct category tags, sorted.
    #[must_use]
    pub fn categories(&self) -> Vec<&str> {
        let set: BTreeSet<&str> = self.index.keys().map(|(_, c)| c.as_str()).collect();
        set.into_iter().collect()
    }

    /// True when the entity has at least one observation in any category.
    #[must_use]
    pub fn has_entity(&self, entity: &str) -> bool {
        self.index.keys().any(|(e, _)| e == entity)
    }

    /// Number of source rows ingested (before deduplication).
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Number of distinct `(entity, category)` series.
    #[must_use]
    pub fn series_count(&self) -> usize {
        self.index.len()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(entity: &str, year: i32, category: &str, value: f64) -> Observation {
        Observation::new(entity, year, category, value)
    }

    #[test]
    fn extract_returns_ascending_year_order() {
        // Deliberately shuffled source rows
        let set = ObservationSet::from_observations([
            obs("World", 2001, "coalprod_mt", 4700.0),
            obs("World", 1999, "coalprod_mt", 4300.0),
            obs("World", 2000, "coalprod_mt", 4500.0),
        ]);
        let s = set.extract("World", "coalprod_mt");
        let years: Vec<_> = s.years().collect();
        assert_eq!(years, vec![1999, 2000, 2001]);
    }

    #[test]
    fn extract_full_span_length() {
        let rows = (1981..=2023).map(|y| obs("World", y, "coalprod_mt", f64::from(y)));
        let set = ObservationSet::from_observations(rows);
        let s = set.extract("World", "coalprod_mt");
        assert_eq!(s.len(), 43);
        assert_eq!(s.first_year(), Some(1981));
        assert_eq!(s.last_year(), Some(2023));
    }

    #[test]
    fn extract_unknown_category_is_empty_not_error() {
        let set = ObservationSet::from_observations([obs("World", 2000, "coalprod_mt", 1.0)]);
        let s = set.extract("World", "no_such_tag");
        assert!(s.is_empty());
    }

    #[test]
    fn extract_filters_on_both_entity_and_category() {
        let set = ObservationSet::from_observations([
            obs("World", 2000, "coalprod_mt", 1.0),
            obs("Germany", 2000, "coalprod_mt", 2.0),
            obs("World", 2000, "oilprod_kbd", 3.0),
        ]);
        let s = set.extract("Germany", "coalprod_mt");
        assert_eq!(s.get(2000), Some(2.0));
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn entities_and_categories_are_sorted_and_distinct() {
        let set = ObservationSet::from_observations([
            obs("World", 2000, "b_tag", 1.0),
            obs("Australia", 2000, "a_tag", 1.0),
            obs("World", 2001, "b_tag", 1.0),
        ]);
        assert_eq!(set.entities(), vec!["Australia", "World"]);
        assert_eq!(set.categories(), vec!["a_tag", "b_tag"]);
        assert_eq!(set.row_count(), 3);
        assert_eq!(set.series_count(), 2);
    }

    #[test]
    fn has_entity() {
        let set = ObservationSet::from_observations([obs("World", 2000, "t", 1.0)]);
        assert!(set.has_entity("World"));
        assert!(!set.has_entity("Atlantis"));
    }
}
