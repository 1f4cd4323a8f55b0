//! # Energy System Assembler
//!
//! Composes the extractor, unit converter, share calculator, and change
//! calculator into one per-entity record: extract each raw category series,
//! normalize units, compute fuel shares against the relevant totals, and
//! derive year-over-year changes for every quantity surfaced with a Change
//! variant.
//!
//! Absence is first-class: a whole group is `None` when the entity reports
//! none of its categories, and share tables are `None` when the total series
//! required as denominator is absent — the rest of the record stays usable.

use crate::change::change;
use crate::dataset::ObservationSet;
use crate::names::display_name;
use crate::share::share;
use crate::types::{EmberError, Series, Table};
use crate::units::{self, convert};
use serde::{Deserialize, Serialize};

// =============================================================================
// CATEGORY TAGS (fixed source vocabulary)
// =============================================================================

/// Category tags of the long-format energy dataset.
pub mod tags {
    /// Coal production, megatonnes.
    pub const COAL_PRODUCTION_MT: &str = "coalprod_mt";
    /// Oil production, thousand barrels/day.
    pub const OIL_PRODUCTION_KBD: &str = "oilprod_kbd";
    /// Gas production, exajoules.
    pub const GAS_PRODUCTION_EJ: &str = "gasprod_ej";

    /// Primary energy consumption total, exajoules.
    pub const PRIMARY_TOTAL_EJ: &str = "primary_ej";
    /// Coal consumption, exajoules.
    pub const COAL_CONSUMPTION_EJ: &str = "coalcons_ej";
    /// Oil consumption, exajoules.
    pub const OIL_CONSUMPTION_EJ: &str = "oilcons_ej";
    /// Gas consumption, exajoules.
    pub const GAS_CONSUMPTION_EJ: &str = "gascons_ej";
    /// Nuclear primary energy, exajoules.
    pub const NUCLEAR_EJ: &str = "nuclear_ej";
    /// Hydro primary energy, exajoules.
    pub const HYDRO_EJ: &str = "hydro_ej";
    /// Wind primary energy, exajoules.
    pub const WIND_EJ: &str = "wind_ej";
    /// Solar primary energy, exajoules.
    pub const SOLAR_EJ: &str = "solar_ej";
    /// Biomass, geothermal and other renewables, exajoules.
    pub const BIO_GEO_OTHER_EJ: &str = "biogeo_ej";

    /// Total final consumption, petajoules.
    pub const FINAL_TOTAL_PJ: &str = "finalcons_pj";
    /// Final consumption of coal, petajoules.
    pub const FINAL_COAL_PJ: &str = "coalfinal_pj";
    /// Final consumption of oil, petajoules.
    pub const FINAL_OIL_PJ: &str = "oilfinal_pj";
    /// Final consumption of gas, petajoules.
    pub const FINAL_GAS_PJ: &str = "gasfinal_pj";
    /// Final consumption of electricity, petajoules.
    pub const FINAL_ELECTRICITY_PJ: &str = "elecfinal_pj";
    /// Final consumption of heat, petajoules.
    pub const FINAL_HEAT_PJ: &str = "heatfinal_pj";
    /// Final consumption of renewables, petajoules.
    pub const FINAL_RENEWABLES_PJ: &str = "renewfinal_pj";

    /// Electricity generation total, terawatt-hours.
    pub const ELEC_TOTAL_TWH: &str = "elecgen_twh";
    /// Electricity from coal, terawatt-hours.
    pub const ELEC_COAL_TWH: &str = "coalelec_twh";
    /// Electricity from oil, terawatt-hours.
    pub const ELEC_OIL_TWH: &str = "oilelec_twh";
    /// Electricity from gas, terawatt-hours.
    pub const ELEC_GAS_TWH: &str = "gaselec_twh";
    /// Electricity from nuclear, terawatt-hours.
    pub const ELEC_NUCLEAR_TWH: &str = "nuclearelec_twh";
    /// Electricity from hydro, terawatt-hours.
    pub const ELEC_HYDRO_TWH: &str = "hydroelec_twh";
    /// Electricity from wind, terawatt-hours.
    pub const ELEC_WIND_TWH: &str = "windelec_twh";
    /// Electricity from solar, terawatt-hours.
    pub const ELEC_SOLAR_TWH: &str = "solarelec_twh";
    /// Electricity from other sources, terawatt-hours.
    pub const ELEC_OTHER_TWH: &str = "otherelec_twh";

    /// CO2 emissions from energy, megatonnes.
    pub const CO2_MT: &str = "co2_mt";
}

/// Primary energy fuels in presentation order.
const PRIMARY_FUELS: &[(&str, &str)] = &[
    ("Coal", tags::COAL_CONSUMPTION_EJ),
    ("Oil", tags::OIL_CONSUMPTION_EJ),
    ("Gas", tags::GAS_CONSUMPTION_EJ),
    ("Nuclear", tags::NUCLEAR_EJ),
    ("Hydro", tags::HYDRO_EJ),
    ("Wind", tags::WIND_EJ),
    ("Solar", tags::SOLAR_EJ),
    ("Bio Geo Other", tags::BIO_GEO_OTHER_EJ),
];

/// Final consumption carriers in presentation order.
const FINAL_CARRIERS: &[(&str, &str)] = &[
    ("Coal", tags::FINAL_COAL_PJ),
    ("Oil", tags::FINAL_OIL_PJ),
    ("Gas", tags::FINAL_GAS_PJ),
    ("Electricity", tags::FINAL_ELECTRICITY_PJ),
    ("Heat", tags::FINAL_HEAT_PJ),
    ("Renewables", tags::FINAL_RENEWABLES_PJ),
];

/// Electricity generation sources in presentation order.
const ELECTRICITY_SOURCES: &[(&str, &str)] = &[
    ("Coal", tags::ELEC_COAL_TWH),
    ("Oil", tags::ELEC_OIL_TWH),
    ("Gas", tags::ELEC_GAS_TWH),
    ("Nuclear", tags::ELEC_NUCLEAR_TWH),
    ("Hydro", tags::ELEC_HYDRO_TWH),
    ("Wind", tags::ELEC_WIND_TWH),
    ("Solar", tags::ELEC_SOLAR_TWH),
    ("Bio Geo Other", tags::ELEC_OTHER_TWH),
];

// =============================================================================
// ASSEMBLED RECORD
// =============================================================================

/// Fossil fuel production series, normalized for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionGroup {
    /// Coal production, megatonnes.
    pub coal_mt: Series,
    /// Oil production, million barrels/day (converted from kbd).
    pub oil_mbpd: Series,
    /// Gas production, exajoules.
    pub gas_ej: Series,
}

/// Primary energy consumption: total, per-fuel quantities, shares, change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimaryGroup {
    /// Total primary energy, exajoules.
    pub total_ej: Series,
    /// Per-fuel quantities, exajoules.
    pub by_fuel: Table,
    /// Per-fuel percentage shares of the total. `None` when the total series
    /// is unavailable for this entity.
    pub shares: Option<Table>,
    /// Year-over-year change of the total, exajoules.
    pub change_ej: Series,
}

/// Final energy consumption by carrier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalGroup {
    /// Total final consumption, exajoules (converted from PJ).
    pub total_ej: Series,
    /// Per-carrier quantities, exajoules (converted from PJ).
    pub by_carrier: Table,
    /// Per-carrier percentage shares. `None` when the total is unavailable.
    pub shares: Option<Table>,
}

/// Electricity generation by source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElectricityGroup {
    /// Total generation, terawatt-hours.
    pub total_twh: Series,
    /// Per-source quantities, terawatt-hours.
    pub by_source: Table,
    /// Per-source percentage shares. `None` when the total is unavailable.
    pub shares: Option<Table>,
    /// Year-over-year change of total generation, terawatt-hours.
    pub change_twh: Series,
}

/// CO2 emissions from energy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmissionsGroup {
    /// Emissions, megatonnes.
    pub co2_mt: Series,
    /// Emissions, gigatonnes (display variant).
    pub co2_gt: Series,
    /// Year-over-year change, megatonnes.
    pub change_mt: Series,
}

/// The assembled per-entity record — one per profiled country, or one for
/// the world aggregate.
///
/// Constructed once per run from the freshly loaded observation set, never
/// mutated after construction, discarded at process exit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergySystem {
    /// Entity name as keyed in the source data (e.g. "Total World").
    pub source_name: String,
    /// Entity name for titles and output directories (e.g. "World").
    pub display_name: String,
    /// Fossil fuel production, when reported.
    pub production: Option<ProductionGroup>,
    /// Primary energy consumption, when reported.
    pub primary: Option<PrimaryGroup>,
    /// Final energy consumption, when reported.
    pub final_energy: Option<FinalGroup>,
    /// Electricity generation, when reported.
    pub electricity: Option<ElectricityGroup>,
    /// CO2 emissions, when reported.
    pub emissions: Option<EmissionsGroup>,
}

impl EnergySystem {
    /// True when the entity reported nothing at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.production.is_none()
            && self.primary.is_none()
            && self.final_energy.is_none()
            && self.electricity.is_none()
            && self.emissions.is_none()
    }
}

// =============================================================================
// ASSEMBLY
// =============================================================================

/// Assemble the full record for one entity.
///
/// Extraction absence is recovered locally (`None` groups, `None` share
/// tables); arithmetic errors (zero denominators, bad factors) propagate so
/// the caller's per-entity boundary can isolate them.
pub fn assemble(set: &ObservationSet, entity: &str) -> Result<EnergySystem, EmberError> {
    Ok(EnergySystem {
        source_name: entity.to_string(),
        display_name: display_name(entity).to_string(),
        production: assemble_production(set, entity)?,
        primary: assemble_primary(set, entity)?,
        final_energy: assemble_final(set, entity)?,
        electricity: assemble_electricity(set, entity)?,
        emissions: assemble_emissions(set, entity)?,
    })
}

fn assemble_production(
    set: &ObservationSet,
    entity: &str,
) -> Result<Option<ProductionGroup>, EmberError> {
    let coal_mt = set.extract(entity, tags::COAL_PRODUCTION_MT);
    let oil_kbd = set.extract(entity, tags::OIL_PRODUCTION_KBD);
    let gas_ej = set.extract(entity, tags::GAS_PRODUCTION_EJ);

    if coal_mt.is_empty() && oil_kbd.is_empty() && gas_ej.is_empty() {
        return Ok(None);
    }

    Ok(Some(ProductionGroup {
        coal_mt,
        oil_mbpd: convert(&oil_kbd, units::KBD_TO_MBPD)?,
        gas_ej,
    }))
}

fn assemble_primary(
    set: &ObservationSet,
    entity: &str,
) -> Result<Option<PrimaryGroup>, EmberError> {
    let total_ej = set.extract(entity, tags::PRIMARY_TOTAL_EJ);
    let by_fuel = extract_table(set, entity, PRIMARY_FUELS);

    if total_ej.is_empty() && by_fuel.is_empty() {
        return Ok(None);
    }

    let shares = share_table(&by_fuel, &total_ej)?;
    let change_ej = change(&total_ej);

    Ok(Some(PrimaryGroup {
        total_ej,
        by_fuel,
        shares,
        change_ej,
    }))
}

fn assemble_final(set: &ObservationSet, entity: &str) -> Result<Option<FinalGroup>, EmberError> {
    let total_pj = set.extract(entity, tags::FINAL_TOTAL_PJ);
    let by_carrier_pj = extract_table(set, entity, FINAL_CARRIERS);

    if total_pj.is_empty() && by_carrier_pj.is_empty() {
        return Ok(None);
    }

    // Shares are unit-independent, so PJ inputs are fine as numerators and
    // denominator alike.
    let shares = share_table(&by_carrier_pj, &total_pj)?;

    let total_ej = convert(&total_pj, units::PETAJOULE_TO_EXAJOULE)?;
    let mut by_carrier = Table::new();
    for (name, series) in by_carrier_pj.iter() {
        by_carrier.push(name, convert(series, units::PETAJOULE_TO_EXAJOULE)?);
    }

    Ok(Some(FinalGroup {
        total_ej,
        by_carrier,
        shares,
    }))
}

fn assemble_electricity(
    set: &ObservationSet,
    entity: &str,
) -> Result<Option<ElectricityGroup>, EmberError> {
    let total_twh = set.extract(entity, tags::ELEC_TOTAL_TWH);
    let by_source = extract_table(set, entity, ELECTRICITY_SOURCES);

    if total_twh.is_empty() && by_source.is_empty() {
        return Ok(None);
    }

    let shares = share_table(&by_source, &total_twh)?;
    let change_twh = change(&total_twh);

    Ok(Some(ElectricityGroup {
        total_twh,
        by_source,
        shares,
        change_twh,
    }))
}

fn assemble_emissions(
    set: &ObservationSet,
    entity: &str,
) -> Result<Option<EmissionsGroup>, EmberError> {
    let co2_mt = set.extract(entity, tags::CO2_MT);
    if co2_mt.is_empty() {
        return Ok(None);
    }

    Ok(Some(EmissionsGroup {
        co2_gt: convert(&co2_mt, units::MEGATONNE_TO_GIGATONNE)?,
        change_mt: change(&co2_mt),
        co2_mt,
    }))
}

/// Extract a named table of categories in declared presentation order.
///
/// Empty member series are kept as columns so that a fuel missing for one
/// entity still occupies its slot; `Table::is_empty` treats an all-empty
/// table as absent.
fn extract_table(set: &ObservationSet, entity: &str, members: &[(&str, &str)]) -> Table {
    members
        .iter()
        .map(|(label, tag)| ((*label).to_string(), set.extract(entity, tag)))
        .collect()
}

/// Share table of every non-empty column against a total series.
///
/// `None` when the total is unavailable — the share fields are then
/// "unavailable" rather than an error, and the rest of the record remains
/// usable.
fn share_table(table: &Table, total: &Series) -> Result<Option<Table>, EmberError> {
    if total.is_empty() {
        return Ok(None);
    }
    let mut shares = Table::new();
    for (name, series) in table.iter() {
        if series.is_empty() {
            continue;
        }
        shares.push(name, share(series, total)?);
    }
    Ok(Some(shares))
}

// =============================================================================
// TESTS
// =============================================================================
