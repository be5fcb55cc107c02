//! Geometry type definitions

use std::fmt;

/// Absolute tolerance used for point equality comparisons.
pub const POINT_EPSILON: f64 = 1e-9;

/// A 2D point with planar coordinates.
///
/// Equality is tolerance-based: two points compare equal when both
/// coordinates differ by less than [`POINT_EPSILON`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    #[inline]
    pub fn distance_to(&self, other: Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

impl PartialEq for Point {
    fn eq(&self, other: &Self) -> bool {
        (self.x - other.x).abs() < POINT_EPSILON && (self.y - other.y).abs() < POINT_EPSILON
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Shape type codes as stored in `.shp` files.
///
/// Only `NullShape`, `Point`, `PolyLine` and `Polygon` decode to real
/// geometry; the Z, M, MultiPoint and MultiPatch variants are recognized
/// but their record bodies decode to null geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeType {
    NullShape,
    Point,
    PolyLine,
    Polygon,
    MultiPoint,
    PointZ,
    PolyLineZ,
    PolygonZ,
    MultiPointZ,
    PointM,
    PolyLineM,
    PolygonM,
    MultiPointM,
    MultiPatch,
}

impl ShapeType {
    /// Decode an on-disk shape type code.
    ///
    /// Returns `None` for codes the shapefile format does not define.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(ShapeType::NullShape),
            1 => Some(ShapeType::Point),
            3 => Some(ShapeType::PolyLine),
            5 => Some(ShapeType::Polygon),
            8 => Some(ShapeType::MultiPoint),
            11 => Some(ShapeType::PointZ),
            13 => Some(ShapeType::PolyLineZ),
            15 => Some(ShapeType::PolygonZ),
            18 => Some(ShapeType::MultiPointZ),
            21 => Some(ShapeType::PointM),
            23 => Some(ShapeType::PolyLineM),
            25 => Some(ShapeType::PolygonM),
            28 => Some(ShapeType::MultiPointM),
            31 => Some(ShapeType::MultiPatch),
            _ => None,
        }
    }

    /// The on-disk code for this shape type.
    pub fn code(&self) -> i32 {
        match self {
            ShapeType::NullShape => 0,
            ShapeType::Point => 1,
            ShapeType::PolyLine => 3,
            ShapeType::Polygon => 5,
            ShapeType::MultiPoint => 8,
            ShapeType::PointZ => 11,
            ShapeType::PolyLineZ => 13,
            ShapeType::PolygonZ => 15,
            ShapeType::MultiPointZ => 18,
            ShapeType::PointM => 21,
            ShapeType::PolyLineM => 23,
            ShapeType::PolygonM => 25,
            ShapeType::MultiPointM => 28,
            ShapeType::MultiPatch => 31,
        }
    }
}

impl fmt::Display for ShapeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ShapeType::NullShape => "Null",
            ShapeType::Point => "Point",
            ShapeType::PolyLine => "Polyline",
            ShapeType::Polygon => "Polygon",
            ShapeType::MultiPoint => "MultiPoint",
            ShapeType::PointZ => "PointZ",
            ShapeType::PolyLineZ => "PolylineZ",
            ShapeType::PolygonZ => "PolygonZ",
            ShapeType::MultiPointZ => "MultiPointZ",
            ShapeType::PointM => "PointM",
            ShapeType::PolyLineM => "PolylineM",
            ShapeType::PolygonM => "PolygonM",
            ShapeType::MultiPointM => "MultiPointM",
            ShapeType::MultiPatch => "MultiPatch",
        };
        f.write_str(name)
    }
}

/// Axis-aligned bounding box.
///
/// The empty box (no points) is a distinguished sentinel with inverted
/// infinite extents; it is the identity for [`union`](BoundingBox::union)
/// and never contains or intersects anything. A zero-area box around a
/// single point is *not* empty.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    #[inline]
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// The empty sentinel box.
    #[inline]
    pub fn empty() -> Self {
        Self {
            min_x: f64::INFINITY,
            min_y: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            max_y: f64::NEG_INFINITY,
        }
    }

    /// True for the empty sentinel (and any box with inverted extents).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.min_x > self.max_x || self.min_y > self.max_y
    }

    /// Inclusive point containment.
    #[inline]
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.min_x && point.x <= self.max_x && point.y >= self.min_y && point.y <= self.max_y
    }

    /// Inclusive overlap test: boxes touching along an edge intersect.
    #[inline]
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        !(other.min_x > self.max_x
            || other.max_x < self.min_x
            || other.min_y > self.max_y
            || other.max_y < self.min_y)
    }

    /// Box area. Zero for degenerate point/line boxes and for the empty box.
    #[inline]
    pub fn area(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        (self.max_x - self.min_x) * (self.max_y - self.min_y)
    }

    /// Smallest box covering both boxes. The empty box is the identity.
    #[inline]
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// Grow the box to cover a point.
    #[inline]
    pub fn expand(&mut self, point: Point) {
        self.min_x = self.min_x.min(point.x);
        self.min_y = self.min_y.min(point.y);
        self.max_x = self.max_x.max(point.x);
        self.max_y = self.max_y.max(point.y);
    }

    /// Arithmetic midpoint of the min/max corners.
    #[inline]
    pub fn center(&self) -> Point {
        Point::new((self.min_x + self.max_x) / 2.0, (self.min_y + self.max_y) / 2.0)
    }

    /// Euclidean distance from a point to the closest point on the box.
    ///
    /// Zero when the point lies inside the box.
    #[inline]
    pub fn distance_to(&self, point: Point) -> f64 {
        let dx = (self.min_x - point.x).max(0.0).max(point.x - self.max_x);
        let dy = (self.min_y - point.y).max(0.0).max(point.y - self.max_y);
        (dx * dx + dy * dy).sqrt()
    }

    /// Area growth required to cover `other`.
    #[inline]
    pub fn enlargement(&self, other: &BoundingBox) -> f64 {
        self.union(other).area() - self.area()
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}) to ({}, {})",
            self.min_x, self.min_y, self.max_x, self.max_y
        )
    }
}
