//! # Emberplot CLI Module
//!
//! This module implements the CLI interface for emberplot.
//!
//! ## Available Commands
//!
//! - `profile` - Assemble and render the chart catalogue for entities
//! - `world` - Render the world profile plus global carbon charts
//! - `list` - List entities and category tags in the dataset
//! - `check` - Run the post-join coverage check against a shares dataset

mod commands;

use clap::{Parser, Subcommand};
use emberplot_core::EmberError;
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// emberplot - energy and carbon statistics profiler
///
/// Ingests long-format energy/carbon datasets, assembles per-entity
/// records, and renders the fixed chart catalogue to SVG.
#[derive(Parser, Debug)]
#[command(name = "emberplot")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the long-format energy dataset CSV
    #[arg(short = 'D', long, global = true, default_value = "data/energy.csv")]
    pub data: PathBuf,

    /// Output directory for chart artifacts
    #[arg(short = 'O', long, global = true, default_value = "charts")]
    pub out: PathBuf,

    /// Optional TOML profile configuration
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Assemble and render the chart catalogue for one or more entities
    Profile {
        /// Entities to profile (source-data names); all when omitted
        #[arg(short, long)]
        entity: Vec<String>,

        /// Country-shares CSV for the world treemap breakdown
        #[arg(short, long)]
        shares: Option<PathBuf>,
    },

    /// Render the world profile plus global carbon charts
    World {
        /// Global carbon-budget CSV
        #[arg(short = 'b', long)]
        carbon: Option<PathBuf>,

        /// Country-shares CSV for the world treemap breakdown
        #[arg(short, long)]
        shares: Option<PathBuf>,
    },

    /// List entities and category tags present in the dataset
    List,

    /// Check shares-dataset coverage of every profiled entity
    Check {
        /// Country-shares CSV to check against
        #[arg(short, long)]
        shares: PathBuf,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub fn execute(cli: Cli) -> Result<(), EmberError> {
    let json_mode = cli.json_mode;

    match cli.command {
        Some(Commands::Profile { entity, shares }) => cmd_profile(
            &cli.data,
            &cli.out,
            cli.config.as_deref(),
            json_mode,
            &entity,
            shares.as_deref(),
        ),
        Some(Commands::World { carbon, shares }) => cmd_world(
            &cli.data,
            &cli.out,
            cli.config.as_deref(),
            json_mode,
            carbon.as_deref(),
            shares.as_deref(),
        ),
        Some(Commands::List) | None => cmd_list(&cli.data, json_mode),
        Some(Commands::Check { shares }) => cmd_check(&cli.data, &shares, json_mode),
    }
}
