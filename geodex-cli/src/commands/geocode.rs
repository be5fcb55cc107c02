//! Geocoding commands: forward, reverse, batch, and statistics.

use std::fs;
use std::path::Path;

use geodex::geocode::{GeocodeResult, Geocoder};
use geodex::geometry::Point;

use crate::error::CliError;

/// Geocode one address.
pub fn geocode(base: &Path, address: &str, field: &str) -> Result<(), CliError> {
    let geocoder = Geocoder::load_with_field(base, field)?;
    print_result(&geocoder.geocode(address));
    Ok(())
}

/// Reverse geocode a coordinate.
pub fn reverse(base: &Path, x: f64, y: f64, max_distance: f64, field: &str) -> Result<(), CliError> {
    let geocoder = Geocoder::load_with_field(base, field)?;
    print_result(&geocoder.reverse_geocode(Point::new(x, y), max_distance));
    Ok(())
}

/// Geocode every non-empty line of a file.
pub fn batch(base: &Path, input: &Path, field: &str) -> Result<(), CliError> {
    let content = fs::read_to_string(input).map_err(|error| CliError::FileRead {
        path: input.display().to_string(),
        error,
    })?;
    let addresses: Vec<&str> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    let geocoder = Geocoder::load_with_field(base, field)?;
    let results = geocoder.geocode_batch(&addresses);

    let mut matched = 0usize;
    for (address, result) in addresses.iter().zip(&results) {
        println!("{}", address);
        print_result(result);
        println!();
        if result.is_match() {
            matched += 1;
        }
    }
    println!("Matched {} of {} address(es)", matched, addresses.len());
    Ok(())
}

/// Print geocoder index statistics.
pub fn stats(base: &Path, field: &str) -> Result<(), CliError> {
    let geocoder = Geocoder::load_with_field(base, field)?;
    print!("{}", geocoder.stats());
    Ok(())
}

fn print_result(result: &GeocodeResult) {
    if !result.is_match() {
        println!("No match found.");
        return;
    }

    println!("Match Found:");
    println!(
        "  Coordinates: {:.6}, {:.6}",
        result.coordinate.x, result.coordinate.y
    );
    println!("  Address: {}", result.matched_address);
    println!("  Confidence: {:.2}%", result.confidence * 100.0);
    println!("  Match Type: {}", result.match_type);
}
