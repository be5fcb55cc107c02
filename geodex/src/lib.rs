//! Geodex - Shapefile reading, spatial indexing, and geocoding
//!
//! This library reads ESRI shapefiles, indexes their geometries in an
//! R-tree, and resolves free-text place strings to coordinates (and back)
//! with a fuzzy-matching geocoder.
//!
//! # High-Level API
//!
//! ```ignore
//! use geodex::geocode::Geocoder;
//! use geodex::geometry::Point;
//!
//! let geocoder = Geocoder::load("data/addresses")?;
//! let hit = geocoder.geocode("123 Main St, Anytown, CA 12345");
//! println!("{} -> {}", hit.matched_address, hit.coordinate);
//!
//! let nearby = geocoder.reverse_geocode(Point::new(-122.0, 37.5), 100.0);
//! ```
//!
//! For raw record access use [`shapefile::ShapefileReader`]; for spatial
//! queries over records you own, [`spatial::SpatialIndex`].

pub mod config;
pub mod geocode;
pub mod geometry;
pub mod logging;
pub mod shapefile;
pub mod spatial;

/// Version of the geodex library and CLI.
///
/// This is synchronized across all components in the workspace.
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
