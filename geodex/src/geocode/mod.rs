//! Geocoding
//!
//! Resolves free-text place strings to coordinates and back. The
//! [`Geocoder`] owns the shapefile records it is loaded from, builds
//! inverted text indexes (street, city, zip) over their parsed addresses,
//! and keeps an R-tree over the same records for reverse lookups.

mod geocoder;
mod parser;
mod similarity;

pub use geocoder::{Geocoder, GeocodeResult, GeocoderStats, MatchType, DEFAULT_ADDRESS_FIELD};
pub use parser::{AddressParser, ParsedAddress};
pub use similarity::{jaro_winkler_similarity, levenshtein_distance};

use thiserror::Error;

/// Errors raised while loading geocoding data.
///
/// Queries never error: unrecognized or empty input yields an empty
/// [`GeocodeResult`] instead.
#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error(transparent)]
    Shapefile(#[from] crate::shapefile::ShapefileError),
    #[error("shapefile contains no usable records")]
    NoRecords,
}
