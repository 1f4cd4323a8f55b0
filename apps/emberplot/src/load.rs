//! # CSV Dataset Loading
//!
//! Turns the long-format source CSVs into core observation sets.
//!
//! Design goals:
//! - **Strict schema** for required columns (clear, early errors)
//! - **Row-level validation**: bad rows are skipped but reported, a single
//!   malformed line never aborts the bulk load
//! - **Deterministic behavior**: no inference beyond header normalization

use csv::StringRecord;
use emberplot_core::{EmberError, Observation, ObservationSet};
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

/// A row-level error encountered during loading.
#[derive(Debug, Clone)]
pub struct RowError {
    /// 1-based CSV line number.
    pub line: usize,
    /// What went wrong.
    pub message: String,
}

/// Load output: the observation set plus what happened along the way.
#[derive(Debug)]
pub struct LoadedDataset {
    /// The bulk-loaded observations.
    pub observations: ObservationSet,
    /// Rows that were skipped, with reasons.
    pub row_errors: Vec<RowError>,
    /// Total data rows read.
    pub rows_read: usize,
}

/// Required columns of the long-format datasets.
const REQUIRED_COLUMNS: [&str; 4] = ["entity", "year", "category", "value"];

/// Load a long-format CSV (entity, year, category, value) into an
/// observation set.
///
/// Works for the energy dataset and the carbon-budget dataset alike; they
/// share the format and differ only in category vocabulary.
pub fn load_observations(path: &Path) -> Result<LoadedDataset, EmberError> {
    let file = File::open(path)
        .map_err(|e| EmberError::Io(format!("Failed to open '{}': {e}", path.display())))?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| EmberError::Csv(format!("Failed to read CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    for column in REQUIRED_COLUMNS {
        if !header_map.contains_key(column) {
            return Err(EmberError::Csv(format!(
                "Missing required column `{column}` in '{}'",
                path.display()
            )));
        }
    }

    let mut observations = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // records() starts after the header line; CSV lines are 1-based
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_row(&record, &header_map) {
            Ok(obs) => observations.push(obs),
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }

    Ok(LoadedDataset {
        observations: ObservationSet::from_observations(observations),
        row_errors,
        rows_read,
    })
}

/// Load the secondary country-shares CSV (country, value) used for the
/// treemap breakdown. Returns `(country, value)` pairs in file order.
pub fn load_country_shares(path: &Path) -> Result<Vec<(String, f64)>, EmberError> {
    let file = File::open(path)
        .map_err(|e| EmberError::Io(format!("Failed to open '{}': {e}", path.display())))?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| EmberError::Csv(format!("Failed to read CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    for column in ["country", "value"] {
        if !header_map.contains_key(column) {
            return Err(EmberError::Csv(format!(
                "Missing required column `{column}` in '{}'",
                path.display()
            )));
        }
    }

    let mut shares = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| EmberError::Csv(format!("CSV parse error: {e}")))?;
        let Some(country) = get_field(&record, &header_map, "country") else {
            continue;
        };
        let Some(value) = get_field(&record, &header_map, "value").and_then(parse_f64) else {
            continue;
        };
        shares.push((country.to_string(), value));
    }
    Ok(shares)
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a UTF-8
    // BOM; without stripping it the schema check reports a missing column.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn parse_row(record: &StringRecord, header_map: &HashMap<String, usize>) -> Result<Observation, String> {
    let entity = get_field(record, header_map, "entity")
        .ok_or_else(|| "Missing `entity` value".to_string())?;
    let category = get_field(record, header_map, "category")
        .ok_or_else(|| "Missing `category` value".to_string())?;

    let year_raw = get_field(record, header_map, "year")
        .ok_or_else(|| "Missing `year` value".to_string())?;
    let year: i32 = year_raw
        .parse()
        .map_err(|_| format!("Invalid year '{year_raw}'"))?;

    let value_raw = get_field(record, header_map, "value")
        .ok_or_else(|| "Missing `value` value".to_string())?;
    let value =
        parse_f64(value_raw).ok_or_else(|| format!("Invalid value '{value_raw}'"))?;

    Ok(Observation::new(entity, year, category, value))
}

fn get_field<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Option<&'a str> {
    let idx = header_map.get(name)?;
    record.get(*idx).map(str::trim).filter(|s| !s.is_empty())
}

fn parse_f64(s: &str) -> Option<f64> {
    let v = s.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(content.as_bytes()).expect("write");
        file
    }

    #[test]
    fn loads_well_formed_rows() {
        let file = write_csv(
            "entity,year,category,value\n\
             Total World,2020,primary_ej,500.0\n\
             Total World,2021,primary_ej,510.0\n",
        );
        let loaded = load_observations(file.path()).expect("load");
        assert_eq!(loaded.rows_read, 2);
        assert!(loaded.row_errors.is_empty());
        let series = loaded.observations.extract("Total World", "primary_ej");
        assert_eq!(series.get(2021), Some(510.0));
    }

    #[test]
    fn skips_and_reports_bad_rows() {
        let file = write_csv(
            "entity,year,category,value\n\
             Total World,2020,primary_ej,500.0\n\
             Total World,not_a_year,primary_ej,510.0\n\
             Total World,2022,primary_ej,not_a_number\n",
        );
        let loaded = load_observations(file.path()).expect("load");
        assert_eq!(loaded.rows_read, 3);
        assert_eq!(loaded.row_errors.len(), 2);
        assert_eq!(loaded.row_errors[0].line, 3);
        assert_eq!(loaded.observations.row_count(), 1);
    }

    #[test]
    fn tolerates_bom_and_header_case() {
        let file = write_csv(
            "\u{feff}Entity,Year,Category,Value\n\
             Total World,2020,primary_ej,500.0\n",
        );
        let loaded = load_observations(file.path()).expect("load");
        assert_eq!(loaded.observations.row_count(), 1);
    }

    #[test]
    fn missing_required_column_is_a_hard_error() {
        let file = write_csv("entity,year,value\nX,2020,1.0\n");
        assert!(matches!(
            load_observations(file.path()),
            Err(EmberError::Csv(_))
        ));
    }

    #[test]
    fn loads_country_shares() {
        let file = write_csv(
            "country,value\n\
             United States,95.0\n\
             China,160.0\n",
        );
        let shares = load_country_shares(file.path()).expect("load");
        assert_eq!(shares.len(), 2);
        assert_eq!(shares[1], ("China".to_string(), 160.0));
    }

    #[test]
    fn missing_file_is_io_error() {
        assert!(matches!(
            load_observations(Path::new("/no/such/file.csv")),
            Err(EmberError::Io(_))
        ));
    }
}
