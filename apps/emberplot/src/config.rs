//! # Profile Config Loading
//!
//! Reads the optional TOML profile configuration into the core's immutable
//! `ProfileConfig`. Absent file, absent keys: defaults apply.

use emberplot_core::{EmberError, ProfileConfig};
use std::path::Path;

/// Load the profile configuration.
///
/// `None` means no config file was requested; defaults apply. The loaded
/// value is constructed once here and passed by reference everywhere —
/// nothing mutates it afterwards.
pub fn load_config(path: Option<&Path>) -> Result<ProfileConfig, EmberError> {
    let Some(path) = path else {
        return Ok(ProfileConfig::default());
    };

    let raw = std::fs::read_to_string(path)
        .map_err(|e| EmberError::Config(format!("Cannot read '{}': {e}", path.display())))?;

    toml::from_str(&raw)
        .map_err(|e| EmberError::Config(format!("Invalid config '{}': {e}", path.display())))
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use emberplot_core::Rgb;
    use std::io::Write;

    #[test]
    fn no_path_yields_defaults() {
        let config = load_config(None).expect("defaults");
        assert_eq!(config, ProfileConfig::default());
    }

    #[test]
    fn partial_toml_overrides_merge_with_defaults() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(
            b"start_year = 1990\n\
              tick_interval = 5\n\n\
              [palette]\n\
              Coal = [10, 20, 30]\n",
        )
        .expect("write");

        let config = load_config(Some(file.path())).expect("load");
        assert_eq!(config.start_year, Some(1990));
        assert_eq!(config.tick_interval, 5);
        assert_eq!(config.color_for("Coal"), Rgb(10, 20, 30));
        // Untouched keys keep their defaults
        assert_eq!(config.chart_width, ProfileConfig::default().chart_width);
    }

    #[test]
    fn invalid_toml_is_a_config_error() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(b"tick_interval = \"ten\"\n").expect("write");
        assert!(matches!(
            load_config(Some(file.path())),
            Err(EmberError::Config(_))
        ));
    }
}
