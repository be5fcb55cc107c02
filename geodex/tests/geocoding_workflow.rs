//! End-to-end geocoding over shapefiles on disk.

mod common;

use common::{square_ring, write_shapefile, TestField, TestShape};
use geodex::geocode::{Geocoder, MatchType};
use geodex::geometry::Point;
use geodex::shapefile::ShapefileReader;
use geodex::spatial::SpatialIndex;

fn address_fields() -> Vec<TestField> {
    vec![TestField {
        name: "ADDRESS",
        type_char: b'C',
        length: 40,
    }]
}

#[test]
fn test_forward_geocode_exact_match() {
    let dir = tempfile::tempdir().unwrap();
    let base = write_shapefile(
        dir.path(),
        "addresses",
        &[
            TestShape::Point(-122.0, 37.5),
            TestShape::Point(-122.3, 37.9),
        ],
        &address_fields(),
        Some(&[
            vec!["123 MAIN STREET ANYTOWN CA 12345"],
            vec!["77 OAK AVENUE ELSEWHERE CA 94000"],
        ]),
    );

    let geocoder = Geocoder::load(&base).unwrap();
    let result = geocoder.geocode("123 Main St, Anytown, CA 12345");

    assert_eq!(result.match_type, MatchType::Exact);
    assert!(result.confidence >= 0.95, "confidence {}", result.confidence);
    assert_eq!(result.coordinate, Point::new(-122.0, 37.5));
    assert_eq!(result.matched_address.street_name, "MAIN");
}

#[test]
fn test_forward_geocode_miss_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let base = write_shapefile(
        dir.path(),
        "addresses",
        &[TestShape::Point(-122.0, 37.5)],
        &address_fields(),
        Some(&[vec!["123 MAIN STREET ANYTOWN CA 12345"]]),
    );

    let geocoder = Geocoder::load(&base).unwrap();
    let result = geocoder.geocode("1 Unknown Rd, Nowhere, NV 89000");
    assert!(!result.is_match());
    assert_eq!(result.confidence, 0.0);
}

#[test]
fn test_reverse_geocode_admin_polygon() {
    let dir = tempfile::tempdir().unwrap();
    let base = write_shapefile(
        dir.path(),
        "admin",
        &[TestShape::Polygon(vec![square_ring(0.5, 0.5, 0.5)])],
        &[
            TestField {
                name: "NAME_0",
                type_char: b'C',
                length: 20,
            },
            TestField {
                name: "NAME_1",
                type_char: b'C',
                length: 20,
            },
        ],
        Some(&[vec!["Exampleland", "Example"]]),
    );

    let geocoder = Geocoder::load(&base).unwrap();
    let result = geocoder.reverse_geocode(Point::new(0.5, 0.5), 100.0);

    assert_eq!(result.match_type, MatchType::Reverse);
    assert_eq!(result.confidence, 1.0);
    assert!(result.matched_address.state.contains("Example"));
    assert_eq!(result.coordinate, Point::new(0.5, 0.5));
}

#[test]
fn test_reverse_geocode_nearest_point_fallback() {
    let dir = tempfile::tempdir().unwrap();
    let base = write_shapefile(
        dir.path(),
        "addresses",
        &[
            TestShape::Point(10.0, 10.0),
            TestShape::Point(20.0, 20.0),
        ],
        &address_fields(),
        Some(&[
            vec!["1 FIRST STREET TOWNVILLE CA"],
            vec!["2 SECOND STREET TOWNVILLE CA"],
        ]),
    );

    let geocoder = Geocoder::load(&base).unwrap();
    let result = geocoder.reverse_geocode(Point::new(10.0, 11.0), 5.0);

    assert_eq!(result.match_type, MatchType::Reverse);
    assert_eq!(result.matched_address.house_number, "1");
    assert!((result.confidence - 0.8).abs() < 1e-9);
}

#[test]
fn test_batch_geocode_from_files() {
    let dir = tempfile::tempdir().unwrap();
    let base = write_shapefile(
        dir.path(),
        "addresses",
        &[TestShape::Point(-122.0, 37.5)],
        &address_fields(),
        Some(&[vec!["123 MAIN STREET ANYTOWN CA 12345"]]),
    );

    let geocoder = Geocoder::load(&base).unwrap();
    let results = geocoder.geocode_batch(&["123 Main St Anytown CA 12345", "gibberish"]);
    assert_eq!(results.len(), 2);
    assert!(results[0].is_match());
    assert!(!results[1].is_match());
}

#[test]
fn test_spatial_index_over_loaded_records() {
    let dir = tempfile::tempdir().unwrap();
    let base = write_shapefile(
        dir.path(),
        "grid",
        &(0..25)
            .map(|i| TestShape::Point((i % 5) as f64, (i / 5) as f64))
            .collect::<Vec<_>>(),
        &[],
        None,
    );

    let mut reader = ShapefileReader::open(&base).unwrap();
    let records = reader.read_all_records();
    assert_eq!(records.len(), 25);

    let index = SpatialIndex::build(&records);
    let nearest = index.query_nearest(Point::new(2.1, 2.1), 1).unwrap();
    // Grid point (2, 2) is record index 12, record number 13
    assert_eq!(nearest[0].record_number, 13);

    let within = index
        .query_within_distance(Point::new(0.0, 0.0), 1.0)
        .unwrap();
    let mut numbers: Vec<i32> = within.iter().map(|r| r.record_number).collect();
    numbers.sort_unstable();
    assert_eq!(numbers, vec![1, 2, 6]);
}
