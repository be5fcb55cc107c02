//! End-to-end shapefile reading against real files on disk.

mod common;

use common::{square_ring, write_shapefile, TestField, TestShape};
use geodex::geometry::{BoundingBox, Geometry, Point, ShapeType};
use geodex::shapefile::{FieldValue, ShapefileError, ShapefileReader};

#[test]
fn test_minimal_point_shapefile() {
    let dir = tempfile::tempdir().unwrap();
    let base = write_shapefile(
        dir.path(),
        "single",
        &[TestShape::Point(10.5, -20.25)],
        &[TestField {
            name: "NAME",
            type_char: b'C',
            length: 8,
        }],
        Some(&[vec!["abc"]]),
    );

    let mut reader = ShapefileReader::open(&base).unwrap();
    assert_eq!(reader.record_count(), 1);
    assert_eq!(reader.shape_type(), ShapeType::Point);
    assert_eq!(reader.field_definitions().len(), 1);
    assert_eq!(reader.field_definitions()[0].name, "NAME");

    let record = reader.read_record(0).unwrap().unwrap();
    assert_eq!(record.record_number, 1);
    assert_eq!(record.geometry, Geometry::Point(Point::new(10.5, -20.25)));
    assert_eq!(
        record.attributes["NAME"],
        FieldValue::Text("abc".to_string())
    );
}

#[test]
fn test_open_without_dbf_uses_shx_count() {
    let dir = tempfile::tempdir().unwrap();
    let base = write_shapefile(
        dir.path(),
        "nodbf",
        &[
            TestShape::Point(1.0, 1.0),
            TestShape::Point(2.0, 2.0),
            TestShape::Point(3.0, 3.0),
        ],
        &[],
        None,
    );

    let mut reader = ShapefileReader::open(&base).unwrap();
    assert_eq!(reader.record_count(), 3);
    assert!(reader.field_definitions().is_empty());

    let record = reader.read_record(2).unwrap().unwrap();
    assert!(record.attributes.is_empty());
    assert_eq!(record.geometry, Geometry::Point(Point::new(3.0, 3.0)));
}

#[test]
fn test_open_missing_shx_fails() {
    let dir = tempfile::tempdir().unwrap();
    let base = write_shapefile(
        dir.path(),
        "noshx",
        &[TestShape::Point(0.0, 0.0)],
        &[],
        None,
    );
    std::fs::remove_file(base.with_extension("shx")).unwrap();

    assert!(matches!(
        ShapefileReader::open(&base).unwrap_err(),
        ShapefileError::Io(_)
    ));
}

#[test]
fn test_out_of_range_record_index() {
    let dir = tempfile::tempdir().unwrap();
    let base = write_shapefile(
        dir.path(),
        "small",
        &[TestShape::Point(0.0, 0.0)],
        &[],
        None,
    );

    let mut reader = ShapefileReader::open(&base).unwrap();
    assert!(matches!(
        reader.read_record(1).unwrap_err(),
        ShapefileError::OutOfRange { index: 1, count: 1 }
    ));
}

#[test]
fn test_polygon_with_hole_containment() {
    let dir = tempfile::tempdir().unwrap();
    let base = write_shapefile(
        dir.path(),
        "donut",
        &[TestShape::Polygon(vec![
            square_ring(5.0, 5.0, 5.0),
            square_ring(5.0, 5.0, 1.0),
        ])],
        &[],
        None,
    );

    let mut reader = ShapefileReader::open(&base).unwrap();
    let record = reader.read_record(0).unwrap().unwrap();

    match &record.geometry {
        Geometry::Polygon(rings) => assert_eq!(rings.len(), 2),
        other => panic!("expected polygon, got {:?}", other),
    }
    // In the annulus, in the hole, outside entirely
    assert!(record.geometry.contains(Point::new(2.0, 5.0)));
    assert!(!record.geometry.contains(Point::new(5.0, 5.0)));
    assert!(!record.geometry.contains(Point::new(20.0, 5.0)));
}

#[test]
fn test_read_records_in_bounds_filters() {
    let dir = tempfile::tempdir().unwrap();
    let base = write_shapefile(
        dir.path(),
        "scatter",
        &[
            TestShape::Point(0.0, 0.0),
            TestShape::Point(10.0, 10.0),
            TestShape::Point(50.0, 50.0),
        ],
        &[],
        None,
    );

    let mut reader = ShapefileReader::open(&base).unwrap();
    let hits = reader.read_records_in_bounds(&BoundingBox::new(-1.0, -1.0, 11.0, 11.0));
    let mut numbers: Vec<i32> = hits.iter().map(|r| r.record_number).collect();
    numbers.sort_unstable();
    assert_eq!(numbers, vec![1, 2]);
}

#[test]
fn test_header_bounds_come_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let base = write_shapefile(
        dir.path(),
        "bounds",
        &[
            TestShape::Point(-10.0, -5.0),
            TestShape::Point(20.0, 30.0),
        ],
        &[],
        None,
    );

    let reader = ShapefileReader::open(&base).unwrap();
    assert_eq!(reader.bounds(), BoundingBox::new(-10.0, -5.0, 20.0, 30.0));
    let rendered = reader.info().to_string();
    assert!(rendered.contains("Record Count: 2"));
    assert!(rendered.contains("Shape Type: Point"));
}
