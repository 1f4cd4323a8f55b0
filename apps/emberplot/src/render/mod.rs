//! # SVG Chart Rendering
//!
//! The plotters-backed [`ChartSink`] implementation. The core hands over a
//! fully prepared [`ChartSpec`]; this module only draws — every derivation
//! and presentation rule (display rounding, start years, label omission)
//! has already been applied upstream.

mod treemap;

use emberplot_core::{
    ChartData, ChartKind, ChartOptions, ChartSink, ChartSpec, EmberError, LabeledSeries, Rgb,
    Series, Subplot, Table,
};
use plotters::prelude::*;
use std::path::Path;

/// Map any drawing error into the core error taxonomy.
fn rerr(e: impl std::fmt::Display) -> EmberError {
    EmberError::Render(e.to_string())
}

/// Convert a core palette color to a plotters color.
fn color_of(options: &ChartOptions, label: &str) -> RGBColor {
    let Rgb(r, g, b) = options
        .colors
        .get(label)
        .copied()
        .unwrap_or(emberplot_core::config::FALLBACK_COLOR);
    RGBColor(r, g, b)
}

/// Pixel area reserved below the plot for the footer line.
const FOOTER_AREA: u32 = 24;

/// The SVG chart sink.
///
/// One SVG artifact per prepared chart; rendering never reports anything
/// back to assembly.
#[derive(Debug, Default, Clone, Copy)]
pub struct SvgSink;

impl SvgSink {
    /// Create a new sink.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ChartSink for SvgSink {
    fn render(&self, spec: &ChartSpec, path: &Path) -> Result<(), EmberError> {
        let size = (spec.options.width, spec.options.height);
        let root = SVGBackend::new(path, size).into_drawing_area();
        root.fill(&WHITE).map_err(rerr)?;

        let (plot, footer) = split_footer(&root, &spec.options);

        match (&spec.kind, &spec.data) {
            (ChartKind::Line, ChartData::Lines(lines)) => {
                draw_lines(&plot, &spec.options, lines)?;
            }
            (ChartKind::Column, ChartData::Columns(columns)) => {
                draw_columns(&plot, &spec.options, columns)?;
            }
            (ChartKind::GroupedColumn, ChartData::Grouped(table)) => {
                draw_grouped(&plot, &spec.options, table)?;
            }
            (ChartKind::SubplotGrid, ChartData::Subplots(panels)) => {
                draw_subplots(&plot, &spec.options, panels)?;
            }
            (ChartKind::Treemap, ChartData::Treemap(snapshot)) => {
                treemap::draw(&plot, &spec.options, snapshot)?;
            }
            (kind, _) => {
                return Err(EmberError::Render(format!(
                    "Chart kind {kind:?} does not match its data payload"
                )));
            }
        }

        if let Some(footer) = footer {
            draw_footer(&footer, &spec.options)?;
        }

        root.present().map_err(rerr)?;
        Ok(())
    }
}

type Area<'a> = DrawingArea<SVGBackend<'a>, plotters::coord::Shift>;

/// Split off the footer strip when footer text is present.
fn split_footer<'a>(root: &Area<'a>, options: &ChartOptions) -> (Area<'a>, Option<Area<'a>>) {
    if options.footer.is_empty() {
        (root.clone(), None)
    } else {
        let (plot, footer) = root.split_vertically(options.height.saturating_sub(FOOTER_AREA) as i32);
        (plot, Some(footer))
    }
}

fn draw_footer(area: &Area<'_>, options: &ChartOptions) -> Result<(), EmberError> {
    area.draw(&Text::new(
        options.footer.clone(),
        (10, 4),
        ("sans-serif", 13).into_font().color(&BLACK.mix(0.6)),
    ))
    .map_err(rerr)
}

/// Year span and padded value range over a set of series.
fn ranges(series: &[&Series], include_zero: bool) -> Option<((i32, i32), (f64, f64))> {
    let first = series.iter().filter_map(|s| s.first_year()).min()?;
    let last = series.iter().filter_map(|s| s.last_year()).max()?;

    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for s in series {
        if let Some((min, max)) = s.value_bounds() {
            lo = lo.min(min);
            hi = hi.max(max);
        }
    }
    if !lo.is_finite() || !hi.is_finite() {
        return None;
    }
    if include_zero {
        lo = lo.min(0.0);
        hi = hi.max(0.0);
    }
    let pad = ((hi - lo).abs()).max(1e-9) * 0.05;
    Some(((first, last), (lo - pad, hi + pad)))
}

/// Number of x labels implied by the tick interval.
fn x_label_count(first: i32, last: i32, interval: i32) -> usize {
    let span = (last - first).max(1);
    (span / interval.max(1) + 1).max(2) as usize
}

fn draw_lines(
    area: &Area<'_>,
    options: &ChartOptions,
    lines: &[LabeledSeries],
) -> Result<(), EmberError> {
    let refs: Vec<&Series> = lines.iter().map(|l| &l.series).collect();
    let Some(((first, last), (lo, hi))) = ranges(&refs, false) else {
        return Err(EmberError::Render("No data to draw".to_string()));
    };

    let mut chart = ChartBuilder::on(area)
        .caption(&options.title, ("sans-serif", 22))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(first..last, lo..hi)
        .map_err(rerr)?;

    chart
        .configure_mesh()
        .x_labels(x_label_count(first, last, options.tick_interval))
        .x_label_formatter(&|year| year.to_string())
        .y_desc(options.y_label.clone())
        .draw()
        .map_err(rerr)?;

    for line in lines {
        let color = color_of(options, &line.label);
        chart
            .draw_series(LineSeries::new(line.series.iter(), color.stroke_width(2)))
            .map_err(rerr)?
            .label(line.label.clone())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 18, y)], color));
    }

    if lines.len() > 1 {
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.85))
            .border_style(BLACK.mix(0.4))
            .draw()
            .map_err(rerr)?;
    }
    Ok(())
}

fn draw_columns(
    area: &Area<'_>,
    options: &ChartOptions,
    columns: &LabeledSeries,
) -> Result<(), EmberError> {
    let Some(((first, last), (lo, hi))) = ranges(&[&columns.series], true) else {
        return Err(EmberError::Render("No data to draw".to_string()));
    };

    let x_lo = f64::from(first) - 0.5;
    let x_hi = f64::from(last) + 0.5;

    let mut chart = ChartBuilder::on(area)
        .caption(&options.title, ("sans-serif", 22))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_lo..x_hi, lo..hi)
        .map_err(rerr)?;

    chart
        .configure_mesh()
        .x_labels(x_label_count(first, last, options.tick_interval))
        .x_label_formatter(&|year| format!("{}", year.round() as i32))
        .y_desc(options.y_label.clone())
        .draw()
        .map_err(rerr)?;

    let color = color_of(options, &columns.label);
    chart
        .draw_series(columns.series.iter().map(|(year, value)| {
            let x = f64::from(year);
            Rectangle::new([(x - 0.4, 0.0), (x + 0.4, value)], color.filled())
        }))
        .map_err(rerr)?;
    Ok(())
}

fn draw_grouped(area: &Area<'_>, options: &ChartOptions, table: &Table) -> Result<(), EmberError> {
    let refs: Vec<&Series> = table.iter().map(|(_, s)| s).collect();
    let Some(((first, last), (lo, hi))) = ranges(&refs, true) else {
        return Err(EmberError::Render("No data to draw".to_string()));
    };

    let group_count = table.iter().filter(|(_, s)| !s.is_empty()).count().max(1);
    // Each year's group occupies 0.8 of the axis unit
    let column_width = 0.8 / group_count as f64;

    let mut chart = ChartBuilder::on(area)
        .caption(&options.title, ("sans-serif", 22))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(f64::from(first) - 0.5..f64::from(last) + 0.5, lo..hi)
        .map_err(rerr)?;

    chart
        .configure_mesh()
        .x_labels(x_label_count(first, last, options.tick_interval))
        .x_label_formatter(&|year| format!("{}", year.round() as i32))
        .y_desc(options.y_label.clone())
        .draw()
        .map_err(rerr)?;

    for (slot, (name, series)) in table.iter().filter(|(_, s)| !s.is_empty()).enumerate() {
        let color = color_of(options, name);
        let offset = -0.4 + slot as f64 * column_width;
        chart
            .draw_series(series.iter().map(|(year, value)| {
                let x = f64::from(year) + offset;
                Rectangle::new([(x, 0.0), (x + column_width, value)], color.filled())
            }))
            .map_err(rerr)?
            .label(name.to_string())
            .legend(move |(x, y)| {
                Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled())
            });
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.85))
        .border_style(BLACK.mix(0.4))
        .draw()
        .map_err(rerr)?;
    Ok(())
}

fn draw_subplots(
    area: &Area<'_>,
    options: &ChartOptions,
    panels: &[Subplot],
) -> Result<(), EmberError> {
    if panels.is_empty() {
        return Err(EmberError::Render("No data to draw".to_string()));
    }

    area.draw(&Text::new(
        options.title.clone(),
        (10, 4),
        ("sans-serif", 22),
    ))
    .map_err(rerr)?;

    let (_, grid) = area.split_vertically(34);
    let cells = grid.split_evenly((1, panels.len()));

    for (panel, cell) in panels.iter().zip(cells.iter()) {
        let Some(((first, last), (lo, hi))) = ranges(&[&panel.series], true) else {
            continue;
        };

        let mut chart = ChartBuilder::on(cell)
            .caption(&panel.title, ("sans-serif", 16))
            .margin(8)
            .x_label_area_size(30)
            .y_label_area_size(50)
            .build_cartesian_2d(first..last, lo..hi)
            .map_err(rerr)?;

        chart
            .configure_mesh()
            .x_labels(x_label_count(first, last, options.tick_interval))
            .x_label_formatter(&|year| year.to_string())
            .y_desc(panel.y_label.clone())
            .draw()
            .map_err(rerr)?;

        let color = color_of(options, &panel.label);
        chart
            .draw_series(LineSeries::new(panel.series.iter(), color.stroke_width(2)))
            .map_err(rerr)?;
    }
    Ok(())
}
