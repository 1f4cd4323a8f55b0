//! # emberplot - Energy & Carbon Statistics Profiler
//!
//! The main binary for the emberplot pipeline.
//!
//! This application:
//! - Bulk-loads the long-format energy/carbon datasets once at startup
//! - Assembles per-entity records sequentially with emberplot-core
//! - Renders the fixed chart catalogue to SVG, one directory per entity
//!
//! ## Usage
//!
//! ```bash
//! # Profile every entity in the dataset
//! emberplot profile -D data/energy.csv -O charts
//!
//! # World profile with carbon-budget and country-share charts
//! emberplot world -b data/carbon_budget.csv -s data/country_shares.csv
//!
//! # Inspect the dataset
//! emberplot list
//! emberplot check -s data/country_shares.csv
//! ```

use clap::Parser;
use emberplot::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

fn main() {
    // Initialize tracing — EMBERPLOT_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("EMBERPLOT_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "emberplot=info".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    // Parse CLI arguments
    let cli = cli::Cli::parse();

    // Display startup banner
    if !cli.quiet {
        print_banner();
    }

    // Execute command
    if let Err(e) = cli::execute(cli) {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the emberplot startup banner.
fn print_banner() {
    println!(
        r#"
  emberplot v{}

  Reshape • Derive • Render
"#,
        env!("CARGO_PKG_VERSION")
    );
}
