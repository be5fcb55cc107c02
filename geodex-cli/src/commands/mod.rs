//! CLI command implementations.
//!
//! Each subcommand has its own module with argument definitions and
//! handlers.
//!
//! # Command Modules
//!
//! - [`info`] - Shapefile metadata and record samples
//! - [`query`] - Spatial queries (bbox, point, nearest, within)
//! - [`geocode`] - Forward/reverse/batch geocoding and statistics

pub mod geocode;
pub mod info;
pub mod query;
