//! # Chart Catalogue
//!
//! Turns assembled records into the fixed, ordered catalogue of prepared
//! charts. Everything presentation-rule-shaped happens here — start-year
//! restriction, render-time rounding of near-zero changes, the <1% treemap
//! label policy — so the renderer only draws what it is handed.
//!
//! The renderer itself is an external collaborator behind [`ChartSink`]:
//! it consumes a prepared spec plus a target path and produces an image
//! artifact, returning nothing to the core.

use crate::assemble::EnergySystem;
use crate::carbon::{GlobalCarbonRecord, ShareSnapshot};
use crate::change::display_value;
use crate::config::{ProfileConfig, Rgb};
use crate::types::{EmberError, Series, Table};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

// =============================================================================
// CHART SPECIFICATION
// =============================================================================

/// The fixed catalogue of chart types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChartKind {
    /// One or more year-indexed lines.
    Line,
    /// Single-quantity vertical columns (used for change charts).
    Column,
    /// Side-by-side columns per category per year.
    GroupedColumn,
    /// Grid of small charts sharing one canvas.
    SubplotGrid,
    /// Area-proportional tiles of a one-year share snapshot.
    Treemap,
}

/// A named series prepared for drawing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledSeries {
    /// Legend label and palette key.
    pub label: String,
    /// The prepared data.
    pub series: Series,
}

/// One panel of a subplot grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subplot {
    /// Panel title.
    pub title: String,
    /// Panel y-axis label.
    pub y_label: String,
    /// Palette key for the panel's single series.
    pub label: String,
    /// The prepared data.
    pub series: Series,
}

/// The data payload of a prepared chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ChartData {
    /// Line chart payload.
    Lines(Vec<LabeledSeries>),
    /// Column chart payload.
    Columns(LabeledSeries),
    /// Grouped-column payload.
    Grouped(Table),
    /// Subplot-grid payload.
    Subplots(Vec<Subplot>),
    /// Treemap payload.
    Treemap(ShareSnapshot),
}

/// Presentation options recognized by the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartOptions {
    /// Chart title.
    pub title: String,
    /// Y-axis label.
    pub y_label: String,
    /// Footer/caption text below the chart.
    pub footer: String,
    /// X-axis tick interval in years.
    pub tick_interval: i32,
    /// Per-category colors.
    pub colors: BTreeMap<String, Rgb>,
    /// Treemap tiles below this share (percent) omit their text label.
    pub min_label_share: f64,
    /// Canvas width in pixels.
    pub width: u32,
    /// Canvas height in pixels.
    pub height: u32,
}

/// A fully prepared chart: kind, payload, and presentation options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    /// Which of the fixed chart types to draw.
    pub kind: ChartKind,
    /// The prepared data payload.
    pub data: ChartData,
    /// Presentation options.
    pub options: ChartOptions,
}

/// A catalogue entry: a chart plus its fixed presentation position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chart {
    /// Position in the catalogue; becomes the numeric file prefix.
    pub order: u8,
    /// File-name slug.
    pub slug: String,
    /// The prepared chart.
    pub spec: ChartSpec,
}

impl Chart {
    /// Artifact file name, numeric prefix first so directory listings show
    /// the fixed presentation order.
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("{:02}_{}.svg", self.order, self.slug)
    }
}

// =============================================================================
// RENDERER BOUNDARY
// =============================================================================

/// The chart-renderer boundary.
///
/// # Extension Point
///
/// This trait is intentionally defined without an in-crate implementation.
/// The core hands a sink one prepared chart at a time, fire-and-forget; a
/// sink failure is the caller's to handle and never feeds back into
/// assembly.
pub trait ChartSink {
    /// Produce the image artifact for one prepared chart at `path`.
    fn render(&self, spec: &ChartSpec, path: &Path) -> Result<(), EmberError>;
}

// =============================================================================
// CATALOGUE ASSEMBLY
// =============================================================================

/// Footer appended to every share chart.
const SHARE_FOOTER: &str = "Shares may not sum to exactly 100% due to rounding.";

/// Builder tracking catalogue order and shared presentation options.
struct Catalogue<'a> {
    config: &'a ProfileConfig,
    entity: &'a str,
    charts: Vec<Chart>,
}

impl<'a> Catalogue<'a> {
    fn new(config: &'a ProfileConfig, entity: &'a str) -> Self {
        Self {
            config,
            entity,
            charts: Vec::new(),
        }
    }

    fn options(&self, title: &str, y_label: &str, footer: &str, labels: &[&str]) -> ChartOptions {
        ChartOptions {
            title: format!("{}: {}", self.entity, title),
            y_label: y_label.to_string(),
            footer: footer.to_string(),
            tick_interval: self.config.tick_interval,
            colors: labels
                .iter()
                .map(|l| ((*l).to_string(), self.config.color_for(l)))
                .collect(),
            min_label_share: self.config.min_label_share,
            width: self.config.chart_width,
            height: self.config.chart_height,
        }
    }

    fn push(&mut self, slug: &str, kind: ChartKind, data: ChartData, options: ChartOptions) {
        let order = self.charts.len() as u8 + 1;
        self.charts.push(Chart {
            order,
            slug: slug.to_string(),
            spec: ChartSpec {
                kind,
                data,
                options,
            },
        });
    }

    /// Apply the configured start year to a series.
    fn clip(&self, series: &Series) -> Series {
        match self.config.start_year {
            Some(start) => series.from_year(start),
            None => series.clone(),
        }
    }

    fn clip_table(&self, table: &Table) -> Table {
        table
            .iter()
            .map(|(name, series)| (name.to_string(), self.clip(series)))
            .collect()
    }

    fn lines(&self, table: &Table) -> ChartData {
        ChartData::Lines(
            table
                .iter()
                .filter(|(_, s)| !s.is_empty())
                .map(|(name, series)| LabeledSeries {
                    label: name.to_string(),
                    series: self.clip(series),
                })
                .collect(),
        )
    }

    /// Change columns get the render-time rounding: magnitudes at or below
    /// the display threshold become exactly zero. The stored change series
    /// keeps full precision.
    fn change_columns(&self, label: &str, series: &Series) -> ChartData {
        ChartData::Columns(LabeledSeries {
            label: label.to_string(),
            series: self
                .clip(series)
                .iter()
                .map(|(y, v)| (y, display_value(v)))
                .collect(),
        })
    }
}

/// Build the fixed chart catalogue for one assembled entity.
///
/// Groups absent from the record contribute no charts; the numeric order of
/// the remaining charts stays contiguous.
#[must_use]
pub fn entity_catalog(system: &EnergySystem, config: &ProfileConfig) -> Vec<Chart> {
    let mut cat = Catalogue::new(config, &system.display_name);

    if let Some(production) = &system.production {
        let panels: Vec<Subplot> = [
            ("Coal", "Mt", &production.coal_mt),
            ("Oil", "Mb/d", &production.oil_mbpd),
            ("Gas", "EJ", &production.gas_ej),
        ]
        .into_iter()
        .filter(|(_, _, s)| !s.is_empty())
        .map(|(fuel, unit, series)| Subplot {
            title: format!("{fuel} Production"),
            y_label: unit.to_string(),
            label: fuel.to_string(),
            series: cat.clip(series),
        })
        .collect();

        if !panels.is_empty() {
            let labels: Vec<&str> = panels.iter().map(|p| p.label.as_str()).collect();
            let options = cat.options(
                "Fossil Fuel Production",
                "",
                "Oil converted from thousand barrels/day.",
                &labels,
            );
            cat.push(
                "fossil_production",
                ChartKind::SubplotGrid,
                ChartData::Subplots(panels),
                options,
            );
        }
    }

    if let Some(primary) = &system.primary {
        let labels: Vec<&str> = primary.by_fuel.iter().map(|(n, _)| n).collect();

        if !primary.by_fuel.is_empty() {
            let options = cat.options(
                "Primary Energy Consumption by Fuel",
                "EJ",
                "Primary energy before conversion losses.",
                &labels,
            );
            cat.push(
                "primary_energy_by_fuel",
                ChartKind::Line,
                cat.lines(&primary.by_fuel),
                options,
            );
        }

        if let Some(shares) = &primary.shares {
            let options = cat.options(
                "Primary Energy Fuel Shares",
                "% of primary energy",
                SHARE_FOOTER,
                &labels,
            );
            cat.push(
                "primary_energy_shares",
                ChartKind::Line,
                cat.lines(shares),
                options,
            );
        }

        if !primary.change_ej.is_empty() {
            let options = cat.options(
                "Primary Energy Annual Change",
                "EJ/yr",
                "Changes within ±0.5 EJ are shown as zero.",
                &["Primary Energy"],
            );
            let data = cat.change_columns("Primary Energy", &primary.change_ej);
            cat.push("primary_energy_change", ChartKind::Column, data, options);
        }
    }

    if let Some(final_energy) = &system.final_energy {
        let labels: Vec<&str> = final_energy.by_carrier.iter().map(|(n, _)| n).collect();

        if !final_energy.by_carrier.is_empty() {
            let options = cat.options(
                "Final Energy Consumption by Carrier",
                "EJ",
                "Energy in the form ultimately consumed by end users.",
                &labels,
            );
            let data = ChartData::Grouped(cat.clip_table(&final_energy.by_carrier));
            cat.push(
                "final_energy_by_carrier",
                ChartKind::GroupedColumn,
                data,
                options,
            );
        }

        if let Some(shares) = &final_energy.shares {
            if let Some(snapshot) = latest_snapshot(shares) {
                let options = cat.options(
                    &format!("Final Energy Carrier Shares, {}", snapshot.year),
                    "",
                    SHARE_FOOTER,
                    &labels,
                );
                cat.push(
                    "final_energy_shares",
                    ChartKind::Treemap,
                    ChartData::Treemap(snapshot),
                    options,
                );
            }
        }
    }

    if let Some(electricity) = &system.electricity {
        let labels: Vec<&str> = electricity.by_source.iter().map(|(n, _)| n).collect();

        if !electricity.by_source.is_empty() {
            let options = cat.options(
                "Electricity Generation by Source",
                "TWh",
                "",
                &labels,
            );
            cat.push(
                "electricity_by_source",
                ChartKind::Line,
                cat.lines(&electricity.by_source),
                options,
            );
        }

        if let Some(shares) = &electricity.shares {
            let options = cat.options(
                "Electricity Generation Shares",
                "% of generation",
                SHARE_FOOTER,
                &labels,
            );
            cat.push(
                "electricity_shares",
                ChartKind::Line,
                cat.lines(shares),
                options,
            );
        }

        if !electricity.change_twh.is_empty() {
            let options = cat.options(
                "Electricity Generation Annual Change",
                "TWh/yr",
                "Changes within ±0.5 TWh are shown as zero.",
                &["Electricity"],
            );
            let data = cat.change_columns("Electricity", &electricity.change_twh);
            cat.push("electricity_change", ChartKind::Column, data, options);
        }
    }

    if let Some(emissions) = &system.emissions {
        let options = cat.options("CO2 Emissions from Energy", "Gt CO2", "", &["CO2"]);
        let data = ChartData::Lines(vec![LabeledSeries {
            label: "CO2".to_string(),
            series: cat.clip(&emissions.co2_gt),
        }]);
        cat.push("co2_emissions", ChartKind::Line, data, options);

        if !emissions.change_mt.is_empty() {
            let options = cat.options(
                "CO2 Emissions Annual Change",
                "Mt CO2/yr",
                "Changes within ±0.5 Mt are shown as zero.",
                &["CO2"],
            );
            let data = cat.change_columns("CO2", &emissions.change_mt);
            cat.push("co2_change", ChartKind::Column, data, options);
        }
    }

    cat.charts
}

/// Build the fixed chart catalogue for the global carbon record.
#[must_use]
pub fn carbon_catalog(record: &GlobalCarbonRecord, config: &ProfileConfig) -> Vec<Chart> {
    let mut cat = Catalogue::new(config, "World");

    if !record.concentration_ppm.is_empty() {
        let options = cat.options(
            "Atmospheric CO2 Concentration",
            "ppm",
            "Annual mean atmospheric concentration.",
            &[],
        );
        let data = ChartData::Lines(vec![LabeledSeries {
            label: "CO2".to_string(),
            series: cat.clip(&record.concentration_ppm),
        }]);
        cat.push("co2_concentration", ChartKind::Line, data, options);
    }

    if let Some(snapshot) = &record.source_shares {
        let labels: Vec<&str> = snapshot.slices.iter().map(|(n, _)| n.as_str()).collect();
        let options = cat.options(
            &format!("CO2 Emissions by Source, {}", snapshot.year),
            "",
            SHARE_FOOTER,
            &labels,
        );
        cat.push(
            "emissions_by_source",
            ChartKind::Treemap,
            ChartData::Treemap(snapshot.clone()),
            options,
        );
    }

    if let Some(snapshot) = &record.category_shares {
        let labels: Vec<&str> = snapshot.slices.iter().map(|(n, _)| n.as_str()).collect();
        let options = cat.options(
            &format!("CO2 Emissions by Category, {}", snapshot.year),
            "",
            SHARE_FOOTER,
            &labels,
        );
        cat.push(
            "emissions_by_category",
            ChartKind::Treemap,
            ChartData::Treemap(snapshot.clone()),
            options,
        );
    }

    if !record.pathways.is_empty() {
        let labels: Vec<&str> = record.pathways.iter().map(|(n, _)| n).collect();
        let options = cat.options(
            "Cumulative Carbon Budget Pathways",
            "Gt CO2",
            "Remaining-budget pathways by warming scenario.",
            &labels,
        );
        cat.push(
            "carbon_budget_pathways",
            ChartKind::Line,
            cat.lines(&record.pathways),
            options,
        );
    }

    cat.charts
}

/// Build the country-breakdown treemap from the secondary shares dataset.
///
/// `slices` are `(canonical country name, quantity)` pairs; quantities are
/// normalized to percent of their sum here. Callers run the canonical-name
/// mapping and coverage check before this point. `year` is the data vintage
/// for the title; `None` leaves the title year-free.
pub fn country_treemap(
    title: &str,
    slices: &[(String, f64)],
    config: &ProfileConfig,
    year: Option<i32>,
) -> Result<Chart, EmberError> {
    let sum: f64 = slices.iter().map(|(_, v)| v).sum();
    if sum == 0.0 {
        return Err(EmberError::DivisionByZero {
            year: year.unwrap_or_default(),
        });
    }

    let snapshot = ShareSnapshot {
        year: year.unwrap_or_default(),
        slices: slices
            .iter()
            .map(|(name, v)| (name.clone(), 100.0 * v / sum))
            .collect(),
    };
    let labels: Vec<&str> = snapshot.slices.iter().map(|(n, _)| n.as_str()).collect();

    let titled = match year {
        Some(year) => format!("{title}, {year}"),
        None => title.to_string(),
    };
    let cat = Catalogue::new(config, "World");
    let options = cat.options(&titled, "", SHARE_FOOTER, &labels);

    Ok(Chart {
        order: 1,
        slug: "energy_share_by_country".to_string(),
        spec: ChartSpec {
            kind: ChartKind::Treemap,
            data: ChartData::Treemap(snapshot),
            options,
        },
    })
}

/// Latest-common-year snapshot of a share table.
fn latest_snapshot(shares: &Table) -> Option<ShareSnapshot> {
    let year = shares.latest_common_year()?;
    let slices: Vec<(String, f64)> = shares
        .iter()
        .filter_map(|(name, series)| series.get(year).map(|v| (name.to_string(), v)))
        .collect();
    if slices.is_empty() {
        None
    } else {
        Some(ShareSnapshot { year, slices })
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assemble::{assemble, tags};
    use crate::dataset::ObservationSet;
    use crate::types::Observation;

    fn sample_system() -> EnergySystem {
        let mut rows = Vec::new();
        for year in 2018..=2022 {
            let y = f64::from(year - 2018);
            rows.push(Observation::new("Total World", year, tags::PRIMARY_TOTAL_EJ, 500.0 + y));
            rows.push(Observation::new("Total World", year, tags::COAL_CONSUMPTION_EJ, 100.0 + y));
            rows.push(Observation::new("Total World", year, tags::CO2_MT, 34_000.0 + 100.0 * y));
            rows.push(Observation::new("Total World", year, tags::OIL_PRODUCTION_KBD, 88_000.0));
        }
        let set = ObservationSet::from_observations(rows);
        assemble(&set, "Total World").expect("assemble")
    }

    #[test]
    fn catalogue_is_contiguously_numbered_in_fixed_order() {
        let system = sample_system();
        let charts = entity_catalog(&system, &ProfileConfig::default());
        assert!(!charts.is_empty());
        for (i, chart) in charts.iter().enumerate() {
            assert_eq!(chart.order as usize, i + 1);
        }
        // Production leads the catalogue
        assert_eq!(charts[0].slug, "fossil_production");
        assert_eq!(charts[0].file_name(), "01_fossil_production.svg");
    }

    #[test]
    fn titles_use_the_display_name() {
        let system = sample_system();
        let charts = entity_catalog(&system, &ProfileConfig::default());
        assert!(charts.iter().all(|c| c.spec.options.title.starts_with("World: ")));
    }

    #[test]
    fn change_chart_values_are_display_rounded() {
        // 0.4 EJ change rounds to zero at render time
        let rows = vec![
            Observation::new("X", 2020, tags::PRIMARY_TOTAL_EJ, 100.0),
            Observation::new("X", 2021, tags::PRIMARY_TOTAL_EJ, 100.4),
            Observation::new("X", 2022, tags::PRIMARY_TOTAL_EJ, 103.0),
        ];
        let set = ObservationSet::from_observations(rows);
        let system = assemble(&set, "X").expect("assemble");

        // Stored series keeps precision
        let primary = system.primary.as_ref().expect("primary");
        let stored = primary.change_ej.get(2021).expect("stored");
        assert!(stored > 0.0);

        let charts = entity_catalog(&system, &ProfileConfig::default());
        let change_chart = charts
            .iter()
            .find(|c| c.slug == "primary_energy_change")
            .expect("change chart");
        let ChartData::Columns(columns) = &change_chart.spec.data else {
            unreachable!("change chart is columns");
        };
        assert_eq!(columns.series.get(2021), Some(0.0));
        assert!((columns.series.get(2022).expect("2022") - 2.6).abs() < 1e-9);
    }

    #[test]
    fn start_year_clips_chart_data_not_the_record() {
        let system = sample_system();
        let config = ProfileConfig {
            start_year: Some(2020),
            ..ProfileConfig::default()
        };
        let charts = entity_catalog(&system, &config);
        let lines_chart = charts
            .iter()
            .find(|c| c.slug == "primary_energy_by_fuel")
            .expect("lines chart");
        let ChartData::Lines(lines) = &lines_chart.spec.data else {
            unreachable!("lines payload");
        };
        assert!(lines.iter().all(|l| l.series.first_year() == Some(2020)));
        // Record untouched
        assert_eq!(
            system.primary.as_ref().expect("primary").total_ej.first_year(),
            Some(2018)
        );
    }

    #[test]
    fn empty_record_yields_empty_catalogue() {
        let set = ObservationSet::new();
        let system = assemble(&set, "Nowhere").expect("assemble");
        assert!(entity_catalog(&system, &ProfileConfig::default()).is_empty());
    }

    #[test]
    fn country_treemap_normalizes_to_percent() {
        let slices = vec![
            ("United States".to_string(), 30.0),
            ("China".to_string(), 60.0),
            ("UK".to_string(), 10.0),
        ];
        let chart = country_treemap(
            "Share of World Energy by Country",
            &slices,
            &ProfileConfig::default(),
            Some(2023),
        )
        .expect("treemap");
        assert!(chart.spec.options.title.ends_with(", 2023"));
        let ChartData::Treemap(snapshot) = &chart.spec.data else {
            unreachable!("treemap payload");
        };
        assert_eq!(snapshot.slices[1], ("China".to_string(), 60.0));
        let sum: f64 = snapshot.slices.iter().map(|(_, v)| v).sum();
        assert!((sum - 100.0).abs() < 1e-9);
    }

    #[test]
    fn country_treemap_without_vintage_omits_year_from_title() {
        let slices = vec![("Germany".to_string(), 100.0)];
        let chart = country_treemap(
            "Share of World Energy by Country",
            &slices,
            &ProfileConfig::default(),
            None,
        )
        .expect("treemap");
        assert_eq!(
            chart.spec.options.title,
            "World: Share of World Energy by Country"
        );
    }

    #[test]
    fn country_treemap_zero_sum_is_an_error() {
        let slices = vec![("A".to_string(), 0.0)];
        assert!(matches!(
            country_treemap("T", &slices, &ProfileConfig::default(), Some(2023)),
            Err(EmberError::DivisionByZero { year: 2023 })
        ));
    }
}
