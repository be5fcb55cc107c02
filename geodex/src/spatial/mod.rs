//! Spatial indexing
//!
//! A dynamic R-tree over axis-aligned bounding boxes plus a facade that
//! binds it to shapefile records. The tree works purely in terms of bboxes
//! and opaque data indices; resolving indices back to records is the
//! facade's job (or the geocoder's, which keeps its own tree).

mod index;
mod rtree;

pub use index::SpatialIndex;
pub use rtree::{RTree, RTreeStats, DEFAULT_MAX_ENTRIES};

use thiserror::Error;

use crate::geometry::{BoundingBox, Point};
use crate::shapefile::ShapeRecord;

/// Half-extent of the probe box used to gather point-in-polygon candidates.
pub(crate) const POINT_PROBE_HALF_EXTENT: f64 = 1e-4;

/// Errors for syntactically invalid query inputs.
#[derive(Debug, Error, PartialEq)]
pub enum QueryError {
    #[error("nearest-neighbor queries require k >= 1")]
    InvalidK,
    #[error("negative query distance {0}")]
    NegativeDistance(f64),
}

/// Find a polygon record containing `point`, given a tree built over the
/// records' geometry bounds with the record positions as payloads.
///
/// Runs a tiny range query around the point, then the real ray-cast against
/// each candidate. Non-polygon candidates are skipped. Returns the first
/// hit's record index; candidate order is unspecified.
pub(crate) fn find_containing_polygon(
    rtree: &RTree,
    records: &[ShapeRecord],
    point: Point,
) -> Option<usize> {
    let probe = BoundingBox::new(
        point.x - POINT_PROBE_HALF_EXTENT,
        point.y - POINT_PROBE_HALF_EXTENT,
        point.x + POINT_PROBE_HALF_EXTENT,
        point.y + POINT_PROBE_HALF_EXTENT,
    );
    rtree
        .range_query(&probe)
        .into_iter()
        .find(|&idx| records[idx].geometry.contains(point))
}
