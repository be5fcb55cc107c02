//! Geometry primitives
//!
//! 2D points, bounding boxes, and the geometry variants that occur in
//! shapefiles. Coordinates are consumed as-is: no projection or datum
//! handling, and all distances are planar Euclidean.

mod types;

pub use types::{BoundingBox, Point, ShapeType, POINT_EPSILON};

/// A decoded shapefile geometry.
///
/// Polylines are sequences of *parts* (each a connected run of vertices);
/// polygons are sequences of *rings* (each closed, first vertex == last).
/// Ring 0 is the outer boundary and subsequent rings are holes; ring
/// orientation is not inspected.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Null,
    Point(Point),
    Polyline(Vec<Vec<Point>>),
    Polygon(Vec<Vec<Point>>),
}

impl Geometry {
    /// The shape type this geometry decodes to.
    pub fn shape_type(&self) -> ShapeType {
        match self {
            Geometry::Null => ShapeType::NullShape,
            Geometry::Point(_) => ShapeType::Point,
            Geometry::Polyline(_) => ShapeType::PolyLine,
            Geometry::Polygon(_) => ShapeType::Polygon,
        }
    }

    /// Tight bounding box over all vertices.
    ///
    /// Null and vertex-free geometries yield [`BoundingBox::empty`].
    pub fn bounds(&self) -> BoundingBox {
        match self {
            Geometry::Null => BoundingBox::empty(),
            Geometry::Point(p) => BoundingBox::new(p.x, p.y, p.x, p.y),
            Geometry::Polyline(parts) | Geometry::Polygon(parts) => {
                let mut bounds = BoundingBox::empty();
                for part in parts {
                    for point in part {
                        bounds.expand(*point);
                    }
                }
                bounds
            }
        }
    }

    /// Point-in-polygon test by even-odd ray casting.
    ///
    /// A point is contained when it falls inside the outer ring (ring 0)
    /// and inside none of the hole rings. Non-polygon geometries never
    /// contain a point.
    pub fn contains(&self, point: Point) -> bool {
        let rings = match self {
            Geometry::Polygon(rings) if !rings.is_empty() => rings,
            _ => return false,
        };

        if !point_in_ring(&rings[0], point) {
            return false;
        }
        // Inside the outer ring; a hit on any hole excludes the point.
        !rings[1..].iter().any(|hole| point_in_ring(hole, point))
    }
}

/// Even-odd ray cast against a single ring.
fn point_in_ring(ring: &[Point], point: Point) -> bool {
    let mut inside = false;
    let mut j = ring.len().wrapping_sub(1);
    for i in 0..ring.len() {
        let pi = ring[i];
        let pj = ring[j];
        if ((pi.y > point.y) != (pj.y > point.y))
            && (point.x < (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y) + pi.x)
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}
