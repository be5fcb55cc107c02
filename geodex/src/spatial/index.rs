//! Record-level facade over the R-tree.

use crate::geometry::{BoundingBox, Point};
use crate::shapefile::ShapeRecord;

use super::rtree::{RTree, RTreeStats};
use super::QueryError;

/// Spatial index over a borrowed slice of shapefile records.
///
/// The borrow pins the slice for the index's lifetime, which is exactly the
/// stability the R-tree's payload indices rely on. Query methods resolve
/// those indices back to record references in the order the tree returns
/// them.
#[derive(Debug)]
pub struct SpatialIndex<'a> {
    records: &'a [ShapeRecord],
    rtree: RTree,
}

impl<'a> SpatialIndex<'a> {
    /// Index every record's geometry bounds.
    ///
    /// Records with empty bounds (null geometry) are not indexed.
    pub fn build(records: &'a [ShapeRecord]) -> Self {
        let mut rtree = RTree::new();
        for (i, record) in records.iter().enumerate() {
            let bounds = record.bounds();
            if !bounds.is_empty() {
                rtree.insert(bounds, i);
            }
        }
        tracing::debug!(records = records.len(), indexed = rtree.len(), "built spatial index");
        Self { records, rtree }
    }

    /// Records whose geometry bounds intersect `bounds`.
    pub fn query_intersects(&self, bounds: &BoundingBox) -> Vec<&'a ShapeRecord> {
        self.resolve(self.rtree.range_query(bounds))
    }

    /// The `k` records nearest to `point`, ascending by distance.
    pub fn query_nearest(&self, point: Point, k: usize) -> Result<Vec<&'a ShapeRecord>, QueryError> {
        Ok(self.resolve(self.rtree.nearest_neighbors(point, k)?))
    }

    /// Records within `distance` of `point`.
    pub fn query_within_distance(
        &self,
        point: Point,
        distance: f64,
    ) -> Result<Vec<&'a ShapeRecord>, QueryError> {
        Ok(self.resolve(self.rtree.within_distance(point, distance)?))
    }

    /// Find a polygon record containing `point`.
    ///
    /// Candidates come from a small probe-box range query; each is then
    /// tested with the ray cast. Returns the first hit (order unspecified).
    pub fn point_in_polygon(&self, point: Point) -> Option<&'a ShapeRecord> {
        super::find_containing_polygon(&self.rtree, self.records, point).map(|i| &self.records[i])
    }

    /// Statistics for the underlying tree.
    pub fn stats(&self) -> RTreeStats {
        self.rtree.stats()
    }

    fn resolve(&self, indices: Vec<usize>) -> Vec<&'a ShapeRecord> {
        indices.into_iter().map(|i| &self.records[i]).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Geometry;
    use std::collections::HashMap;

    fn polygon_record(number: i32, ring: Vec<Point>) -> ShapeRecord {
        ShapeRecord {
            record_number: number,
            geometry: Geometry::Polygon(vec![ring]),
            attributes: HashMap::new(),
        }
    }

    fn square(x: f64, y: f64, size: f64) -> Vec<Point> {
        vec![
            Point::new(x, y),
            Point::new(x + size, y),
            Point::new(x + size, y + size),
            Point::new(x, y + size),
            Point::new(x, y),
        ]
    }

    fn sample_records() -> Vec<ShapeRecord> {
        vec![
            polygon_record(1, square(0.0, 0.0, 10.0)),
            polygon_record(2, square(20.0, 0.0, 10.0)),
            ShapeRecord {
                record_number: 3,
                geometry: Geometry::Point(Point::new(50.0, 50.0)),
                attributes: HashMap::new(),
            },
            ShapeRecord {
                record_number: 4,
                geometry: Geometry::Null,
                attributes: HashMap::new(),
            },
        ]
    }

    #[test]
    fn test_build_skips_null_geometry() {
        let records = sample_records();
        let index = SpatialIndex::build(&records);
        assert_eq!(index.stats().len, 3);
    }

    #[test]
    fn test_query_intersects_returns_records() {
        let records = sample_records();
        let index = SpatialIndex::build(&records);
        let hits = index.query_intersects(&BoundingBox::new(5.0, 5.0, 25.0, 8.0));
        let mut numbers: Vec<i32> = hits.iter().map(|r| r.record_number).collect();
        numbers.sort_unstable();
        assert_eq!(numbers, vec![1, 2]);
    }

    #[test]
    fn test_query_nearest_orders_by_distance() {
        let records = sample_records();
        let index = SpatialIndex::build(&records);
        let hits = index.query_nearest(Point::new(21.0, 5.0), 3).unwrap();
        assert_eq!(hits[0].record_number, 2); // inside
        assert_eq!(hits[1].record_number, 1); // 11 units left
        assert_eq!(hits[2].record_number, 3);
    }

    #[test]
    fn test_point_in_polygon_runs_ray_cast() {
        let records = vec![
            // Bounding boxes overlap but only the second contains the point:
            // a thin L-shaped polygon vs. the full square.
            polygon_record(
                1,
                vec![
                    Point::new(0.0, 0.0),
                    Point::new(10.0, 0.0),
                    Point::new(10.0, 1.0),
                    Point::new(1.0, 1.0),
                    Point::new(1.0, 10.0),
                    Point::new(0.0, 10.0),
                    Point::new(0.0, 0.0),
                ],
            ),
            polygon_record(2, square(0.0, 0.0, 10.0)),
        ];
        let index = SpatialIndex::build(&records);
        let hit = index.point_in_polygon(Point::new(5.0, 5.0)).unwrap();
        assert_eq!(hit.record_number, 2);
    }

    #[test]
    fn test_point_in_polygon_outside_everything() {
        let records = sample_records();
        let index = SpatialIndex::build(&records);
        assert!(index.point_in_polygon(Point::new(-5.0, -5.0)).is_none());
    }

    #[test]
    fn test_point_in_polygon_skips_non_polygons() {
        let records = vec![ShapeRecord {
            record_number: 1,
            geometry: Geometry::Point(Point::new(3.0, 3.0)),
            attributes: HashMap::new(),
        }];
        let index = SpatialIndex::build(&records);
        assert!(index.point_in_polygon(Point::new(3.0, 3.0)).is_none());
    }
}
