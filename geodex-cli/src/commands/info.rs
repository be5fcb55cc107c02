//! `info` command: shapefile metadata and record samples.

use std::path::Path;

use geodex::shapefile::{ShapeRecord, ShapefileReader};

use crate::error::CliError;

/// Print header information, optionally followed by sample records.
pub fn run(base: &Path, sample_records: Option<u32>) -> Result<(), CliError> {
    let mut reader = ShapefileReader::open(base)?;

    println!("=== Shapefile Information Tool ===");
    println!();
    println!("{}", reader.info());

    if let Some(count) = sample_records {
        let count = count.min(reader.record_count());
        println!("First {} record(s):", count);
        for index in 0..count {
            match reader.read_record(index) {
                Ok(Some(record)) => print_record(index, &record),
                Ok(None) => println!("  Record {}: deleted", index),
                Err(e) => println!("  Record {}: unreadable ({})", index, e),
            }
        }
    }

    Ok(())
}

fn print_record(index: u32, record: &ShapeRecord) {
    println!("  Record {} (#{}):", index, record.record_number);
    println!("    Geometry: {}", record.geometry.shape_type());
    let bounds = record.bounds();
    if !bounds.is_empty() {
        println!("    Bounds: {}", bounds);
    }
    if record.attributes.is_empty() {
        println!("    Attributes: None");
    } else {
        println!("    Attributes:");
        let mut names: Vec<&String> = record.attributes.keys().collect();
        names.sort();
        for name in names {
            println!("      {}: {}", name, record.attributes[name]);
        }
    }
}
