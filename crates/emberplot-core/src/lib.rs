//! # emberplot-core
//!
//! The deterministic reshaping and derivation engine for emberplot - THE LOGIC.
//!
//! This crate pivots long-format energy/carbon observations into per-entity
//! time series and computes every derived metric behind the chart catalogue:
//! unit conversions, percentage shares, and year-over-year changes.
//!
//! ## Architectural Constraints
//!
//! The CORE:
//! - Performs no I/O and no rendering; the app feeds it observations and
//!   hands prepared charts to a [`catalog::ChartSink`]
//! - Is deterministic: `BTreeMap` everywhere, ascending-year iteration is
//!   structural, no randomness
//! - Assembles each record once per run and never mutates it
//! - Treats absence as data: an empty `Series` or a `None` group is the
//!   routine "not available for this entity" state, never an error

// =============================================================================
// MODULES
// =============================================================================

pub mod assemble;
pub mod carbon;
pub mod catalog;
pub mod change;
pub mod config;
pub mod dataset;
pub mod names;
pub mod share;
pub mod types;
pub mod units;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{EmberError, Observation, Series, Table};

// =============================================================================
// RE-EXPORTS: Reshaping & Derivation
// =============================================================================

pub use assemble::{
    ElectricityGroup, EmissionsGroup, EnergySystem, FinalGroup, PrimaryGroup, ProductionGroup,
    assemble,
};
pub use carbon::{GlobalCarbonRecord, ShareSnapshot, assemble_carbon, snapshot_shares};
pub use change::{ZERO_DISPLAY_THRESHOLD, change, display_value};
pub use dataset::ObservationSet;
pub use names::{canonical, check_coverage, display_name};
pub use share::share;
pub use units::convert;

// =============================================================================
// RE-EXPORTS: Chart Preparation
// =============================================================================

pub use catalog::{
    Chart, ChartData, ChartKind, ChartOptions, ChartSink, ChartSpec, LabeledSeries, Subplot,
    carbon_catalog, country_treemap, entity_catalog,
};
pub use config::{ProfileConfig, Rgb};
