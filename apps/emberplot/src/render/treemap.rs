//! Treemap layout and drawing.
//!
//! Slice-and-dice layout: slices are placed largest-first, each cutting a
//! strip off the remaining rectangle, alternating between vertical and
//! horizontal cuts. Tiles below the configured minimum share keep their
//! tile but drop the text label.

use super::{Area, color_of, rerr};
use emberplot_core::{ChartOptions, EmberError, ShareSnapshot};
use plotters::prelude::*;

/// A laid-out tile in pixel coordinates.
struct Tile {
    label: String,
    percent: f64,
    x0: i32,
    y0: i32,
    x1: i32,
    y1: i32,
}

/// Draw the treemap for a one-year share snapshot.
pub(super) fn draw(
    area: &Area<'_>,
    options: &ChartOptions,
    snapshot: &ShareSnapshot,
) -> Result<(), EmberError> {
    area.draw(&Text::new(
        options.title.clone(),
        (10, 4),
        ("sans-serif", 22),
    ))
    .map_err(rerr)?;

    let (width, height) = area.dim_in_pixel();
    // Reserve the title strip
    let tiles = layout(snapshot, 10, 36, width as i32 - 10, height as i32 - 10);

    for tile in &tiles {
        let color = color_of(options, &tile.label);
        area.draw(&Rectangle::new(
            [(tile.x0, tile.y0), (tile.x1, tile.y1)],
            color.filled(),
        ))
        .map_err(rerr)?;
        area.draw(&Rectangle::new(
            [(tile.x0, tile.y0), (tile.x1, tile.y1)],
            WHITE.stroke_width(2),
        ))
        .map_err(rerr)?;

        // Label policy: tiny tiles stay visible but unlabeled
        if tile.percent < options.min_label_share {
            continue;
        }
        area.draw(&Text::new(
            format!("{} {:.1}%", tile.label, tile.percent),
            (tile.x0 + 6, tile.y0 + 6),
            ("sans-serif", 14).into_font().color(&WHITE),
        ))
        .map_err(rerr)?;
    }
    Ok(())
}

/// Slice-and-dice layout over the pixel rectangle `(x0, y0)..(x1, y1)`.
fn layout(snapshot: &ShareSnapshot, x0: i32, y0: i32, x1: i32, y1: i32) -> Vec<Tile> {
    let mut slices: Vec<(&str, f64)> = snapshot
        .slices
        .iter()
        .filter(|(_, percent)| *percent > 0.0)
        .map(|(name, percent)| (name.as_str(), *percent))
        .collect();
    slices.sort_by(|a, b| b.1.total_cmp(&a.1));

    let mut tiles = Vec::with_capacity(slices.len());
    let (mut rx0, mut ry0, rx1, ry1) = (x0, y0, x1, y1);
    let mut remaining: f64 = slices.iter().map(|(_, p)| p).sum();

    for (i, (label, percent)) in slices.iter().enumerate() {
        let fraction = if remaining > 0.0 {
            percent / remaining
        } else {
            1.0
        };
        let is_last = i == slices.len() - 1;
        let rect_width = rx1 - rx0;
        let rect_height = ry1 - ry0;

        let (tx0, ty0, tx1, ty1) = if is_last {
            (rx0, ry0, rx1, ry1)
        } else if rect_width >= rect_height {
            // Vertical cut: strip off the left
            let cut = rx0 + (f64::from(rect_width) * fraction).round() as i32;
            let tile = (rx0, ry0, cut, ry1);
            rx0 = cut;
            tile
        } else {
            // Horizontal cut: strip off the top
            let cut = ry0 + (f64::from(rect_height) * fraction).round() as i32;
            let tile = (rx0, ry0, rx1, cut);
            ry0 = cut;
            tile
        };

        tiles.push(Tile {
            label: (*label).to_string(),
            percent: *percent,
            x0: tx0,
            y0: ty0,
            x1: tx1,
            y1: ty1,
        });
        remaining -= percent;
    }
    tiles
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(slices: &[(&str, f64)]) -> ShareSnapshot {
        ShareSnapshot {
            year: 2023,
            slices: slices
                .iter()
                .map(|(n, v)| ((*n).to_string(), *v))
                .collect(),
        }
    }

    fn tile_area(tile: &Tile) -> i64 {
        i64::from(tile.x1 - tile.x0) * i64::from(tile.y1 - tile.y0)
    }

    #[test]
    fn layout_covers_the_rectangle() {
        let snap = snapshot(&[("A", 50.0), ("B", 30.0), ("C", 20.0)]);
        let tiles = layout(&snap, 0, 0, 200, 100);
        let total: i64 = tiles.iter().map(tile_area).sum();
        assert_eq!(total, 200 * 100);
    }

    #[test]
    fn layout_areas_are_roughly_proportional() {
        let snap = snapshot(&[("A", 75.0), ("B", 25.0)]);
        let tiles = layout(&snap, 0, 0, 400, 100);
        let a = tile_area(&tiles[0]) as f64;
        let b = tile_area(&tiles[1]) as f64;
        assert!((a / (a + b) - 0.75).abs() < 0.02);
    }

    #[test]
    fn layout_drops_zero_slices_and_sorts_descending() {
        let snap = snapshot(&[("Small", 10.0), ("Zero", 0.0), ("Big", 90.0)]);
        let tiles = layout(&snap, 0, 0, 100, 100);
        assert_eq!(tiles.len(), 2);
        assert_eq!(tiles[0].label, "Big");
    }
}
