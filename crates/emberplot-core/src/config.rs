//! # Profile Configuration
//!
//! The explicit, immutable configuration object passed into the assembler
//! and chart preparation. Constructed once at startup (defaults, optionally
//! overridden from a TOML file by the app), never mutated afterwards —
//! there is no module-level mutable state anywhere in the system.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An RGB color, serializable from config as `[r, g, b]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// Fallback color for categories without a palette entry.
pub const FALLBACK_COLOR: Rgb = Rgb(128, 128, 128);

/// Immutable presentation and derivation settings for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileConfig {
    /// First year charts display, when the data reaches further back.
    pub start_year: Option<i32>,
    /// X-axis tick interval in years.
    pub tick_interval: i32,
    /// Chart canvas width in pixels.
    pub chart_width: u32,
    /// Chart canvas height in pixels.
    pub chart_height: u32,
    /// Treemap tiles below this share (percent) keep their tile but drop
    /// their text label.
    pub min_label_share: f64,
    /// Per-category color overrides, merged over the built-in palette.
    pub palette: BTreeMap<String, Rgb>,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            start_year: None,
            tick_interval: 10,
            chart_width: 960,
            chart_height: 600,
            min_label_share: 1.0,
            palette: BTreeMap::new(),
        }
    }
}

impl ProfileConfig {
    /// Color for a category label: config override first, then the built-in
    /// palette, then the gray fallback.
    #[must_use]
    pub fn color_for(&self, label: &str) -> Rgb {
        if let Some(color) = self.palette.get(label) {
            return *color;
        }
        builtin_color(label).unwrap_or(FALLBACK_COLOR)
    }
}

/// Built-in palette for the fixed fuel/carrier/source vocabulary.
fn builtin_color(label: &str) -> Option<Rgb> {
    let color = match label {
        "Coal" => Rgb(90, 90, 90),
        "Oil" => Rgb(139, 69, 19),
        "Gas" => Rgb(255, 165, 0),
        "Nuclear" => Rgb(148, 103, 189),
        "Hydro" => Rgb(31, 119, 180),
        "Wind" => Rgb(23, 190, 207),
        "Solar" => Rgb(255, 215, 0),
        "Bio Geo Other" | "Renewables" => Rgb(44, 160, 44),
        "Electricity" => Rgb(214, 39, 40),
        "Heat" => Rgb(227, 119, 194),
        "Flaring" => Rgb(188, 128, 21),
        "Cement" => Rgb(140, 140, 160),
        "Land Use Change" => Rgb(85, 107, 47),
        "Fossil Fuels & Industry" => Rgb(70, 70, 70),
        _ => return None,
    };
    Some(color)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_thresholds_match_presentation_rules() {
        let config = ProfileConfig::default();
        assert_eq!(config.tick_interval, 10);
        assert_eq!(config.min_label_share, 1.0);
        assert_eq!(config.start_year, None);
    }

    #[test]
    fn color_lookup_prefers_override_then_builtin_then_fallback() {
        let mut config = ProfileConfig::default();
        assert_eq!(config.color_for("Coal"), Rgb(90, 90, 90));
        assert_eq!(config.color_for("Mystery Fuel"), FALLBACK_COLOR);

        config
            .palette
            .insert("Coal".to_string(), Rgb(1, 2, 3));
        assert_eq!(config.color_for("Coal"), Rgb(1, 2, 3));
    }
}
