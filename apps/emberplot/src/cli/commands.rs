//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use crate::config::load_config;
use crate::load::{LoadedDataset, load_country_shares, load_observations};
use crate::render::SvgSink;
use emberplot_core::{
    Chart, ChartSink, EmberError, ObservationSet, ProfileConfig, assemble, assemble_carbon,
    carbon_catalog, country_treemap, entity_catalog,
    names::{TOTAL_WORLD, canonical, check_coverage},
};
use std::path::Path;

// =============================================================================
// PROFILE COMMAND
// =============================================================================

/// Outcome of one entity's assemble-and-render unit.
struct EntityOutcome {
    entity: String,
    charts: usize,
    error: Option<String>,
}

/// Assemble and render the chart catalogue for the given entities.
///
/// Each entity runs as a recoverable unit: a failure is logged and reported
/// in the summary, and the batch continues. The command itself fails only
/// when no entity succeeded.
pub fn cmd_profile(
    data: &Path,
    out: &Path,
    config_path: Option<&Path>,
    json_mode: bool,
    entities: &[String],
    shares: Option<&Path>,
) -> Result<(), EmberError> {
    let config = load_config(config_path)?;
    let loaded = load_dataset(data)?;

    let targets: Vec<String> = if entities.is_empty() {
        loaded
            .observations
            .entities()
            .iter()
            .map(|e| (*e).to_string())
            .collect()
    } else {
        entities.to_vec()
    };

    let sink = SvgSink::new();
    let mut outcomes = Vec::with_capacity(targets.len());

    for entity in &targets {
        let outcome = profile_entity(&loaded.observations, &config, entity, out, &sink);
        if let Some(error) = &outcome.error {
            tracing::warn!(entity = %entity, error = %error, "Entity profiling failed");
        }
        outcomes.push(outcome);
    }

    if let Some(shares_path) = shares {
        match render_country_treemap(&loaded.observations, &config, shares_path, out, &sink) {
            Ok(()) => tracing::info!("World country-share treemap rendered"),
            Err(e) => tracing::warn!(error = %e, "Country-share treemap failed"),
        }
    }

    report_profile(&outcomes, json_mode);

    let succeeded = outcomes.iter().filter(|o| o.error.is_none()).count();
    if succeeded == 0 && !outcomes.is_empty() {
        return Err(EmberError::Render(
            "Every entity failed to profile".to_string(),
        ));
    }
    Ok(())
}

/// One entity's recoverable assemble-and-render unit.
fn profile_entity(
    observations: &ObservationSet,
    config: &ProfileConfig,
    entity: &str,
    out: &Path,
    sink: &SvgSink,
) -> EntityOutcome {
    let result = (|| -> Result<usize, EmberError> {
        let system = assemble(observations, entity)?;
        if system.is_empty() {
            tracing::debug!(entity = %entity, "No observations; skipping");
            return Ok(0);
        }
        let charts = entity_catalog(&system, config);
        render_charts(&charts, &out.join(&system.display_name), sink)
    })();

    match result {
        Ok(charts) => EntityOutcome {
            entity: entity.to_string(),
            charts,
            error: None,
        },
        Err(e) => EntityOutcome {
            entity: entity.to_string(),
            charts: 0,
            error: Some(e.to_string()),
        },
    }
}

fn report_profile(outcomes: &[EntityOutcome], json_mode: bool) {
    let succeeded = outcomes.iter().filter(|o| o.error.is_none()).count();
    let chart_total: usize = outcomes.iter().map(|o| o.charts).sum();

    if json_mode {
        let output = serde_json::json!({
            "entities": outcomes.len(),
            "succeeded": succeeded,
            "failed": outcomes.len() - succeeded,
            "charts": chart_total,
            "failures": outcomes
                .iter()
                .filter_map(|o| o.error.as_ref().map(|e| {
                    serde_json::json!({ "entity": o.entity, "error": e })
                }))
                .collect::<Vec<_>>(),
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
        return;
    }

    println!("Profile Summary");
    println!("===============");
    println!("Entities:  {}", outcomes.len());
    println!("Succeeded: {}", succeeded);
    println!("Failed:    {}", outcomes.len() - succeeded);
    println!("Charts:    {}", chart_total);
    for outcome in outcomes {
        if let Some(error) = &outcome.error {
            println!("  {} FAILED: {}", outcome.entity, error);
        }
    }
}

// =============================================================================
// WORLD COMMAND
// =============================================================================

/// Render the world profile, global carbon charts, and the country treemap.
pub fn cmd_world(
    data: &Path,
    out: &Path,
    config_path: Option<&Path>,
    json_mode: bool,
    carbon: Option<&Path>,
    shares: Option<&Path>,
) -> Result<(), EmberError> {
    let config = load_config(config_path)?;
    let loaded = load_dataset(data)?;
    let sink = SvgSink::new();

    let system = assemble(&loaded.observations, TOTAL_WORLD)?;
    let mut charts = entity_catalog(&system, &config);

    if let Some(carbon_path) = carbon {
        let carbon_loaded = load_dataset(carbon_path)?;
        let record = assemble_carbon(&carbon_loaded.observations)?;
        if record.is_empty() {
            tracing::warn!("Carbon-budget dataset contributed no data");
        } else {
            charts.extend(carbon_catalog(&record, &config));
        }
    }

    if let Some(shares_path) = shares {
        charts.push(world_share_chart(
            &loaded.observations,
            &config,
            shares_path,
        )?);
    }

    // Renumber so the combined catalogue keeps one contiguous order
    for (i, chart) in charts.iter_mut().enumerate() {
        chart.order = i as u8 + 1;
    }

    let world_dir = out.join(&system.display_name);
    let rendered = render_charts(&charts, &world_dir, &sink)?;

    if json_mode {
        let output = serde_json::json!({
            "entity": system.display_name,
            "charts": rendered,
            "directory": world_dir.to_string_lossy(),
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
    } else {
        println!("World Profile");
        println!("=============");
        println!("Charts:    {}", rendered);
        println!("Directory: {}", world_dir.display());
    }
    Ok(())
}

// =============================================================================
// LIST COMMAND
// =============================================================================

/// List entities and category tags present in the dataset.
pub fn cmd_list(data: &Path, json_mode: bool) -> Result<(), EmberError> {
    let loaded = load_dataset(data)?;
    let entities = loaded.observations.entities();
    let categories = loaded.observations.categories();

    if json_mode {
        let output = serde_json::json!({
            "rows": loaded.observations.row_count(),
            "series": loaded.observations.series_count(),
            "entities": entities,
            "categories": categories,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
        return Ok(());
    }

    println!("Dataset Contents");
    println!("================");
    println!("Rows:   {}", loaded.observations.row_count());
    println!("Series: {}", loaded.observations.series_count());
    println!();
    println!("Entities ({}):", entities.len());
    for entity in entities {
        println!("  {entity}");
    }
    println!();
    println!("Categories ({}):", categories.len());
    for category in categories {
        println!("  {category}");
    }
    Ok(())
}

// =============================================================================
// CHECK COMMAND
// =============================================================================

/// Coverage check: every dataset country must have a counterpart in the
/// shares dataset after canonical name mapping.
///
/// The world aggregate is excluded, same as at the treemap join itself —
/// a per-country shares dataset never carries a world row.
pub fn cmd_check(data: &Path, shares: &Path, json_mode: bool) -> Result<(), EmberError> {
    let loaded = load_dataset(data)?;
    let share_rows = load_country_shares(shares)?;

    let required: Vec<&str> = loaded
        .observations
        .entities()
        .into_iter()
        .filter(|e| *e != TOTAL_WORLD)
        .collect();
    let available: Vec<&str> = share_rows.iter().map(|(name, _)| name.as_str()).collect();

    match check_coverage(required.iter().copied(), available.iter().copied()) {
        Ok(()) => {
            if json_mode {
                let output = serde_json::json!({
                    "covered": true,
                    "entities": required.len(),
                });
                println!(
                    "{}",
                    serde_json::to_string_pretty(&output).unwrap_or_default()
                );
            } else {
                println!("Coverage OK: all {} entities matched", required.len());
            }
            Ok(())
        }
        Err(EmberError::JoinMismatch { missing }) => {
            if json_mode {
                let output = serde_json::json!({
                    "covered": false,
                    "missing": missing,
                });
                println!(
                    "{}",
                    serde_json::to_string_pretty(&output).unwrap_or_default()
                );
            } else {
                println!("Coverage FAILED; no counterpart for:");
                for name in &missing {
                    println!("  {name}");
                }
            }
            Err(EmberError::JoinMismatch { missing })
        }
        Err(other) => Err(other),
    }
}

// =============================================================================
// SHARED HELPERS
// =============================================================================

/// Load a long-format dataset, logging any skipped rows.
fn load_dataset(path: &Path) -> Result<LoadedDataset, EmberError> {
    let loaded = load_observations(path)?;
    if !loaded.row_errors.is_empty() {
        tracing::warn!(
            path = %path.display(),
            skipped = loaded.row_errors.len(),
            "Some source rows were skipped"
        );
        for row_error in &loaded.row_errors {
            tracing::debug!(line = row_error.line, message = %row_error.message, "Skipped row");
        }
    }
    tracing::info!(
        path = %path.display(),
        rows = loaded.rows_read,
        series = loaded.observations.series_count(),
        "Dataset loaded"
    );
    Ok(loaded)
}

/// Render a catalogue into an entity directory; returns the chart count.
fn render_charts(charts: &[Chart], dir: &Path, sink: &SvgSink) -> Result<usize, EmberError> {
    if charts.is_empty() {
        return Ok(0);
    }
    std::fs::create_dir_all(dir)
        .map_err(|e| EmberError::Io(format!("Cannot create '{}': {e}", dir.display())))?;

    for chart in charts {
        let path = dir.join(chart.file_name());
        sink.render(&chart.spec, &path)?;
        tracing::debug!(path = %path.display(), "Chart rendered");
    }
    Ok(charts.len())
}

/// Build the world country-share treemap chart from the shares dataset.
///
/// Applies the canonical name mapping to the shares side and runs the
/// coverage check for every share country present in the energy dataset.
fn world_share_chart(
    observations: &ObservationSet,
    config: &ProfileConfig,
    shares_path: &Path,
) -> Result<Chart, EmberError> {
    let share_rows = load_country_shares(shares_path)?;

    let canonical_rows: Vec<(String, f64)> = share_rows
        .iter()
        .map(|(name, value)| (canonical(name).to_string(), *value))
        .collect();

    // Entities the energy data knows about must all be covered, or the
    // treemap would silently drop countries.
    let countries: Vec<&str> = observations
        .entities()
        .into_iter()
        .filter(|e| *e != TOTAL_WORLD)
        .collect();
    let available: Vec<&str> = canonical_rows.iter().map(|(n, _)| n.as_str()).collect();
    check_coverage(countries.iter().copied(), available.iter().copied())?;

    // Title vintage: the latest world primary-energy year, when present
    let year = observations
        .extract(TOTAL_WORLD, emberplot_core::assemble::tags::PRIMARY_TOTAL_EJ)
        .last_year();

    country_treemap(
        "Share of World Primary Energy by Country",
        &canonical_rows,
        config,
        year,
    )
}

/// Render only the country treemap (profile command path).
fn render_country_treemap(
    observations: &ObservationSet,
    config: &ProfileConfig,
    shares_path: &Path,
    out: &Path,
    sink: &SvgSink,
) -> Result<(), EmberError> {
    let chart = world_share_chart(observations, config, shares_path)?;
    let dir = out.join("World");
    std::fs::create_dir_all(&dir)
        .map_err(|e| EmberError::Io(format!("Cannot create '{}': {e}", dir.display())))?;
    sink.render(&chart.spec, &dir.join(chart.file_name()))
}
