//! `query` command: spatial queries over an indexed shapefile.

use std::path::Path;

use clap::Subcommand;
use geodex::geometry::{BoundingBox, Point};
use geodex::shapefile::{ShapeRecord, ShapefileReader};
use geodex::spatial::SpatialIndex;

use crate::error::CliError;

/// At most this many records are printed per query.
const MAX_PRINTED: usize = 5;

/// Spatial query subcommands.
#[derive(Debug, Subcommand)]
pub enum QueryAction {
    /// Records intersecting a bounding box
    Bbox {
        min_x: f64,
        min_y: f64,
        max_x: f64,
        max_y: f64,
    },
    /// Polygon records containing a point
    Point { x: f64, y: f64 },
    /// The k records nearest to a point
    Nearest {
        x: f64,
        y: f64,
        /// Number of neighbors to find
        #[arg(short, long, default_value_t = 5)]
        k: usize,
    },
    /// Records within a distance of a point
    Within { x: f64, y: f64, distance: f64 },
}

/// Load the shapefile, build the index, and run one query.
pub fn run(base: &Path, action: QueryAction) -> Result<(), CliError> {
    let mut reader = ShapefileReader::open(base)?;
    let records = reader.read_all_records();
    let index = SpatialIndex::build(&records);

    match action {
        QueryAction::Bbox {
            min_x,
            min_y,
            max_x,
            max_y,
        } => {
            let query = BoundingBox::new(min_x, min_y, max_x, max_y);
            println!("Querying bounding box: {}", query);
            let hits = index.query_intersects(&query);
            println!("Found {} intersecting record(s)", hits.len());
            print_records(&hits);
        }
        QueryAction::Point { x, y } => {
            let point = Point::new(x, y);
            println!("Searching for polygons containing {}", point);
            match index.point_in_polygon(point) {
                Some(record) => print_records(&[record]),
                None => println!("Point not found in any polygon"),
            }
        }
        QueryAction::Nearest { x, y, k } => {
            let point = Point::new(x, y);
            println!("Finding {} record(s) nearest to {}", k, point);
            let hits = index.query_nearest(point, k)?;
            print_records(&hits);
        }
        QueryAction::Within { x, y, distance } => {
            let point = Point::new(x, y);
            println!("Finding records within {} of {}", distance, point);
            let hits = index.query_within_distance(point, distance)?;
            println!("Found {} record(s)", hits.len());
            print_records(&hits);
        }
    }

    Ok(())
}

fn print_records(records: &[&ShapeRecord]) {
    for record in records.iter().take(MAX_PRINTED) {
        let bounds = record.bounds();
        println!(
            "  Record {}: {} bounds {}",
            record.record_number,
            record.geometry.shape_type(),
            bounds
        );
    }
    if records.len() > MAX_PRINTED {
        println!("  ... and {} more", records.len() - MAX_PRINTED);
    }
}
