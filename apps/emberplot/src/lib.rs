//! # emberplot (THE BINARY)
//!
//! Application library: CSV loading, TOML config, the clap CLI, and the
//! plotters-backed SVG chart sink. All derivation logic lives in
//! `emberplot-core`; this crate only feeds it observations and draws what
//! it prepares.

pub mod cli;
pub mod config;
pub mod load;
pub mod render;
