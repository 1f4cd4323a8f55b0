//! # Core Type Definitions
//!
//! This module contains the data model every other module builds on:
//! - Source granularity (`Observation`)
//! - Per-entity time series (`Series`) and grouped columns (`Table`)
//! - Error types (`EmberError`)
//!
//! ## Determinism Guarantees
//!
//! All types in this module:
//! - Are backed by `BTreeMap` so iteration order is always ascending by year
//! - Preserve gaps in sparse series; nothing is ever interpolated
//! - Are immutable after assembly; derived quantities are recomputed, not cached

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

// =============================================================================
// OBSERVATION
// =============================================================================

/// One row of the long-format source dataset.
///
/// Observations are the source granularity: `(entity, year, category, value)`.
/// They are immutable once ingested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Country name or the aggregate "Total World".
    pub entity: String,
    /// Calendar year of the measurement.
    pub year: i32,
    /// Category tag identifying the measured quantity (e.g. "coalprod_mt").
    pub category: String,
    /// Measured value in the unit implied by the category tag.
    pub value: f64,
}

impl Observation {
    /// Create a new observation.
    #[must_use]
    pub fn new(
        entity: impl Into<String>,
        year: i32,
        category: impl Into<String>,
        value: f64,
    ) -> Self {
        Self {
            entity: entity.into(),
            year,
            category: category.into(),
            value,
        }
    }
}

// =============================================================================
// SERIES
// =============================================================================

/// An ordered-by-year mapping from year to value for one entity and one
/// quantity.
///
/// Invariants:
/// - Years are unique (structural: `BTreeMap` keys)
/// - Iteration is always ascending by year
/// - Gaps are permitted and preserved; absence of a year means "no data",
///   never zero
///
/// An empty `Series` is the routine representation of "category not available
/// for this entity" — it is not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Series {
    points: BTreeMap<i32, f64>,
}

impl Series {
    /// Create a new empty series.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a series from `(year, value)` pairs.
    ///
    /// Input order is irrelevant; the result iterates ascending by year.
    /// On duplicate years the last pair wins.
    #[must_use]
    pub fn from_pairs(pairs: impl IntoIterator<Item = (i32, f64)>) -> Self {
        Self {
            points: pairs.into_iter().collect(),
        }
    }

    /// Insert or replace the value for a year.
    pub fn insert(&mut self, year: i32, value: f64) {
        self.points.insert(year, value);
    }

    /// Value for a year, if present.
    #[must_use]
    pub fn get(&self, year: i32) -> Option<f64> {
        self.points.get(&year).copied()
    }

    /// Number of years with data.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True when the series holds no data at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Earliest year with data.
    #[must_use]
    pub fn first_year(&self) -> Option<i32> {
        self.points.keys().next().copied()
    }

    /// Latest year with data.
    #[must_use]
    pub fn last_year(&self) -> Option<i32> {
        self.points.keys().next_back().copied()
    }

    /// Latest `(year, value)` pair.
    #[must_use]
    pub fn latest(&self) -> Option<(i32, f64)> {
        self.points.iter().next_back().map(|(y, v)| (*y, *v))
    }

    /// Iterate `(year, value)` pairs in ascending year order.
    pub fn iter(&self) -> impl Iterator<Item = (i32, f64)> + '_ {
        self.points.iter().map(|(y, v)| (*y, *v))
    }

    /// Iterate the years in ascending order.
    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.points.keys().copied()
    }

    /// Restrict the series to years `>= start`.
    ///
    /// Used when a chart declares a start year; the underlying record is
    /// untouched.
    #[must_use]
    pub fn from_year(&self, start: i32) -> Self {
        Self {
            points: self.points.range(start..).map(|(y, v)| (*y, *v)).collect(),
        }
    }

    /// Minimum and maximum value over the series, if non-empty.
    #[must_use]
    pub fn value_bounds(&self) -> Option<(f64, f64)> {
        let mut bounds: Option<(f64, f64)> = None;
        for v in self.points.values() {
            bounds = Some(match bounds {
                None => (*v, *v),
                Some((lo, hi)) => (lo.min(*v), hi.max(*v)),
            });
        }
        bounds
    }
}

impl FromIterator<(i32, f64)> for Series {
    fn from_iter<I: IntoIterator<Item = (i32, f64)>>(iter: I) -> Self {
        Self::from_pairs(iter)
    }
}

// =============================================================================
// TABLE
// =============================================================================

/// A set of named series sharing one entity.
///
/// Column order is presentation order (Coal, Oil, Gas, ...) and is preserved
/// exactly as assembled — downstream charts rely on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Table {
    columns: Vec<(String, Series)>,
}

impl Table {
    /// Create a new empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a named column, preserving insertion order.
    pub fn push(&mut self, name: impl Into<String>, series: Series) {
        self.columns.push((name.into(), series));
    }

    /// Column by name, if present.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Series> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, s)| s)
    }

    /// Number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// True when the table has no columns, or every column is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.iter().all(|(_, s)| s.is_empty())
    }

    /// Iterate `(name, series)` columns in presentation order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Series)> + '_ {
        self.columns.iter().map(|(n, s)| (n.as_str(), s))
    }

    /// Latest year present in every non-empty column, if any.
    ///
    /// Snapshot charts (treemaps) use this so that every slice comes from the
    /// same year.
    #[must_use]
    pub fn latest_common_year(&self) -> Option<i32> {
        self.columns
            .iter()
            .filter(|(_, s)| !s.is_empty())
            .map(|(_, s)| s.last_year())
            .min()
            .flatten()
    }
}

impl FromIterator<(String, Series)> for Table {
    fn from_iter<I: IntoIterator<Item = (String, Series)>>(iter: I) -> Self {
        Self {
            columns: iter.into_iter().collect(),
        }
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the emberplot system.
///
/// Absence of a category for an entity is NOT an error — it is an empty
/// `Series` the caller pattern-matches on. Errors are reserved for arithmetic
/// misuse, join mismatches, and the app-side I/O boundary.
#[derive(Debug, Error)]
pub enum EmberError {
    /// Unit conversions are positive scalar multiplications; anything else
    /// is a programming error at the call site.
    #[error("Invalid conversion factor: {factor} (must be a positive finite number)")]
    InvalidFactor {
        /// The rejected factor.
        factor: f64,
    },

    /// A share denominator was zero for an otherwise eligible year.
    #[error("Division by zero: total is 0 for year {year}")]
    DivisionByZero {
        /// The year whose total was zero.
        year: i32,
    },

    /// A join between datasets left entities without a match after canonical
    /// name mapping.
    #[error("Join mismatch: no counterpart for {missing:?}")]
    JoinMismatch {
        /// Entities with no row on the other side of the join.
        missing: Vec<String>,
    },

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(String),

    /// The source CSV could not be read or is structurally invalid.
    #[error("CSV error: {0}")]
    Csv(String),

    /// The chart renderer failed to produce an artifact.
    #[error("Render error: {0}")]
    Render(String),

    /// The profile configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(String),
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn series_orders_unordered_input_by_year() {
        let s = Series::from_pairs([(2021, 3.0), (1990, 1.0), (2005, 2.0)]);
        let years: Vec<_> = s.years().collect();
        assert_eq!(years, vec![1990, 2005, 2021]);
    }

    #[test]
    fn series_duplicate_year_last_wins() {
        let s = Series::from_pairs([(2000, 1.0), (2000, 2.0)]);
        assert_eq!(s.len(), 1);
        assert_eq!(s.get(2000), Some(2.0));
    }

    #[test]
    fn series_preserves_gaps() {
        let s = Series::from_pairs([(2000, 1.0), (2003, 2.0)]);
        assert_eq!(s.len(), 2);
        assert_eq!(s.get(2001), None);
        assert_eq!(s.get(2002), None);
    }

    #[test]
    fn series_from_year_restricts() {
        let s = Series::from_pairs([(1990, 1.0), (2000, 2.0), (2010, 3.0)]);
        let restricted = s.from_year(2000);
        assert_eq!(restricted.first_year(), Some(2000));
        assert_eq!(restricted.len(), 2);
        // Original untouched
        assert_eq!(s.len(), 3);
    }

    #[test]
    fn series_latest_and_bounds() {
        let s = Series::from_pairs([(2000, 5.0), (2001, -1.0), (2002, 3.0)]);
        assert_eq!(s.latest(), Some((2002, 3.0)));
        assert_eq!(s.value_bounds(), Some((-1.0, 5.0)));
    }

    #[test]
    fn table_preserves_column_order() {
        let mut t = Table::new();
        t.push("Coal", Series::from_pairs([(2000, 1.0)]));
        t.push("Oil", Series::from_pairs([(2000, 2.0)]));
        t.push("Gas", Series::from_pairs([(2000, 3.0)]));
        let names: Vec<_> = t.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["Coal", "Oil", "Gas"]);
    }

    #[test]
    fn table_latest_common_year_ignores_empty_columns() {
        let mut t = Table::new();
        t.push("Coal", Series::from_pairs([(2000, 1.0), (2022, 1.0)]));
        t.push("Oil", Series::from_pairs([(2000, 2.0), (2023, 2.0)]));
        t.push("Gas", Series::new());
        assert_eq!(t.latest_common_year(), Some(2022));
    }

    #[test]
    fn table_is_empty_when_all_columns_empty() {
        let mut t = Table::new();
        t.push("Coal", Series::new());
        assert!(t.is_empty());
        t.push("Oil", Series::from_pairs([(2000, 1.0)]));
        assert!(!t.is_empty());
    }
}
