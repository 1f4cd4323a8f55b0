//! # Global Carbon Record
//!
//! World-level counterpart to the energy system record: atmospheric CO2
//! concentration, latest-year emission share snapshots by source and by
//! category, and multi-scenario cumulative carbon-budget pathways.
//!
//! The carbon-budget dataset carries its own category vocabulary but the
//! same long format, so it loads into a separate `ObservationSet` and is
//! assembled here with the same extract/share machinery.

use crate::dataset::ObservationSet;
use crate::names::TOTAL_WORLD;
use crate::types::{EmberError, Series, Table};
use serde::{Deserialize, Serialize};

// =============================================================================
// CATEGORY TAGS (carbon-budget dataset vocabulary)
// =============================================================================

/// Category tags of the global carbon-budget dataset.
pub mod tags {
    /// Atmospheric CO2 concentration, parts per million.
    pub const CO2_CONCENTRATION_PPM: &str = "co2_ppm";

    /// Emissions from coal, megatonnes CO2.
    pub const SOURCE_COAL_MT: &str = "esrc_coal_mt";
    /// Emissions from oil, megatonnes CO2.
    pub const SOURCE_OIL_MT: &str = "esrc_oil_mt";
    /// Emissions from gas, megatonnes CO2.
    pub const SOURCE_GAS_MT: &str = "esrc_gas_mt";
    /// Emissions from flaring, megatonnes CO2.
    pub const SOURCE_FLARING_MT: &str = "esrc_flaring_mt";
    /// Emissions from cement, megatonnes CO2.
    pub const SOURCE_CEMENT_MT: &str = "esrc_cement_mt";
    /// Emissions from land use change, megatonnes CO2.
    pub const SOURCE_LAND_USE_MT: &str = "esrc_landuse_mt";

    /// Emissions from fossil fuels and industry, megatonnes CO2.
    pub const CATEGORY_FOSSIL_MT: &str = "ecat_fossil_mt";
    /// Emissions from land use change, megatonnes CO2 (category view).
    pub const CATEGORY_LAND_USE_MT: &str = "ecat_landuse_mt";

    /// Cumulative budget pathway, 1.5°C scenario, gigatonnes CO2.
    pub const BUDGET_15C_GT: &str = "budget_15c_gt";
    /// Cumulative budget pathway, 1.7°C scenario, gigatonnes CO2.
    pub const BUDGET_17C_GT: &str = "budget_17c_gt";
    /// Cumulative budget pathway, 2.0°C scenario, gigatonnes CO2.
    pub const BUDGET_20C_GT: &str = "budget_20c_gt";
}

/// Emission sources in presentation order.
const EMISSION_SOURCES: &[(&str, &str)] = &[
    ("Coal", tags::SOURCE_COAL_MT),
    ("Oil", tags::SOURCE_OIL_MT),
    ("Gas", tags::SOURCE_GAS_MT),
    ("Flaring", tags::SOURCE_FLARING_MT),
    ("Cement", tags::SOURCE_CEMENT_MT),
    ("Land Use Change", tags::SOURCE_LAND_USE_MT),
];

/// Emission categories in presentation order.
const EMISSION_CATEGORIES: &[(&str, &str)] = &[
    ("Fossil Fuels & Industry", tags::CATEGORY_FOSSIL_MT),
    ("Land Use Change", tags::CATEGORY_LAND_USE_MT),
];

/// Budget pathway scenarios in presentation order.
const BUDGET_SCENARIOS: &[(&str, &str)] = &[
    ("1.5°C", tags::BUDGET_15C_GT),
    ("1.7°C", tags::BUDGET_17C_GT),
    ("2.0°C", tags::BUDGET_20C_GT),
];

// =============================================================================
// SNAPSHOT
// =============================================================================

/// Percentage shares of a set of labeled quantities in one year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShareSnapshot {
    /// The year every slice comes from.
    pub year: i32,
    /// `(label, percent)` slices in presentation order.
    pub slices: Vec<(String, f64)>,
}

/// Latest-year share snapshot over the non-empty columns of a table.
///
/// The snapshot year is the latest year present in every non-empty column.
/// `None` when nothing is available; [`EmberError::DivisionByZero`] when the
/// snapshot year sums to zero.
pub fn snapshot_shares(table: &Table) -> Result<Option<ShareSnapshot>, EmberError> {
    let Some(year) = table.latest_common_year() else {
        return Ok(None);
    };

    let quantities: Vec<(String, f64)> = table
        .iter()
        .filter_map(|(name, series)| series.get(year).map(|v| (name.to_string(), v)))
        .collect();

    let sum: f64 = quantities.iter().map(|(_, v)| v).sum();
    if sum == 0.0 {
        return Err(EmberError::DivisionByZero { year });
    }

    let slices = quantities
        .into_iter()
        .map(|(name, v)| (name, 100.0 * v / sum))
        .collect();

    Ok(Some(ShareSnapshot { year, slices }))
}

// =============================================================================
// ASSEMBLED RECORD
// =============================================================================

/// The world-level carbon record.
///
/// Same lifecycle as [`crate::assemble::EnergySystem`]: assembled once from
/// the freshly loaded budget dataset, immutable, discarded at exit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalCarbonRecord {
    /// Atmospheric CO2 concentration, ppm. Empty when not reported.
    pub concentration_ppm: Series,
    /// Latest-year emission shares by source (coal, oil, gas, flaring,
    /// cement, land use change).
    pub source_shares: Option<ShareSnapshot>,
    /// Latest-year emission shares by category (fossil fuels & industry vs
    /// land use change).
    pub category_shares: Option<ShareSnapshot>,
    /// Cumulative budget pathway per scenario, gigatonnes CO2.
    pub pathways: Table,
}

impl GlobalCarbonRecord {
    /// True when the budget dataset contributed nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.concentration_ppm.is_empty()
            && self.source_shares.is_none()
            && self.category_shares.is_none()
            && self.pathways.is_empty()
    }
}

/// Assemble the world-level carbon record from the budget dataset.
pub fn assemble_carbon(set: &ObservationSet) -> Result<GlobalCarbonRecord, EmberError> {
    let concentration_ppm = set.extract(TOTAL_WORLD, tags::CO2_CONCENTRATION_PPM);

    let sources: Table = EMISSION_SOURCES
        .iter()
        .map(|(label, tag)| ((*label).to_string(), set.extract(TOTAL_WORLD, tag)))
        .collect();
    let categories: Table = EMISSION_CATEGORIES
        .iter()
        .map(|(label, tag)| ((*label).to_string(), set.extract(TOTAL_WORLD, tag)))
        .collect();
    let pathways: Table = BUDGET_SCENARIOS
        .iter()
        .map(|(label, tag)| ((*label).to_string(), set.extract(TOTAL_WORLD, tag)))
        .filter(|(_, series)| !series.is_empty())
        .collect();

    Ok(GlobalCarbonRecord {
        concentration_ppm,
        source_shares: snapshot_shares(&sources)?,
        category_shares: snapshot_shares(&categories)?,
        pathways,
    })
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Observation;

    fn budget_observations() -> Vec<Observation> {
        let mut rows = vec![
            Observation::new(TOTAL_WORLD, 2021, tags::CO2_CONCENTRATION_PPM, 416.4),
            Observation::new(TOTAL_WORLD, 2022, tags::CO2_CONCENTRATION_PPM, 418.5),
        ];
        for (tag, v2021, v2022) in [
            (tags::SOURCE_COAL_MT, 14_500.0, 14_800.0),
            (tags::SOURCE_OIL_MT, 11_000.0, 11_200.0),
            (tags::SOURCE_GAS_MT, 7_500.0, 7_400.0),
            (tags::SOURCE_LAND_USE_MT, 3_900.0, 3_700.0),
        ] {
            rows.push(Observation::new(TOTAL_WORLD, 2021, tag, v2021));
            rows.push(Observation::new(TOTAL_WORLD, 2022, tag, v2022));
        }
        for year in 2020..=2050 {
            rows.push(Observation::new(
                TOTAL_WORLD,
                year,
                tags::BUDGET_15C_GT,
                f64::from(year - 2020) * 10.0,
            ));
        }
        rows
    }

    #[test]
    fn assemble_carbon_builds_concentration_and_pathways() {
        let set = ObservationSet::from_observations(budget_observations());
        let record = assemble_carbon(&set).expect("assemble");
        assert_eq!(record.concentration_ppm.latest(), Some((2022, 418.5)));
        // Only scenarios with data survive
        assert_eq!(record.pathways.len(), 1);
        assert!(record.pathways.get("1.5°C").is_some());
    }

    #[test]
    fn source_snapshot_uses_latest_common_year_and_sums_to_hundred() {
        let set = ObservationSet::from_observations(budget_observations());
        let record = assemble_carbon(&set).expect("assemble");
        let snapshot = record.source_shares.expect("snapshot");
        assert_eq!(snapshot.year, 2022);
        let sum: f64 = snapshot.slices.iter().map(|(_, v)| v).sum();
        assert!((sum - 100.0).abs() < 0.5);
        // Unreported sources (flaring, cement) contribute no slice
        assert_eq!(snapshot.slices.len(), 4);
    }

    #[test]
    fn missing_categories_yield_none_snapshot() {
        let set = ObservationSet::from_observations([Observation::new(
            TOTAL_WORLD,
            2022,
            tags::CO2_CONCENTRATION_PPM,
            418.5,
        )]);
        let record = assemble_carbon(&set).expect("assemble");
        assert!(record.category_shares.is_none());
        assert!(record.source_shares.is_none());
        assert!(!record.is_empty());
    }

    #[test]
    fn zero_sum_snapshot_year_is_an_error() {
        let set = ObservationSet::from_observations([
            Observation::new(TOTAL_WORLD, 2022, tags::SOURCE_COAL_MT, 0.0),
            Observation::new(TOTAL_WORLD, 2022, tags::SOURCE_OIL_MT, 0.0),
        ]);
        assert!(matches!(
            assemble_carbon(&set),
            Err(EmberError::DivisionByZero { year: 2022 })
        ));
    }

    #[test]
    fn empty_dataset_is_empty_record() {
        let record = assemble_carbon(&ObservationSet::new()).expect("assemble");
        assert!(record.is_empty());
    }
}
