//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use std::fmt;
use std::process;

use geodex::geocode::GeocodeError;
use geodex::shapefile::ShapefileError;
use geodex::spatial::QueryError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Failed to load the settings file
    Settings(String),
    /// Failed to open or read a shapefile
    Shapefile(ShapefileError),
    /// Failed to load geocoding data
    Geocode(GeocodeError),
    /// Invalid spatial query parameters
    Query(QueryError),
    /// Failed to read an input file
    FileRead { path: String, error: std::io::Error },
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        // Print additional help for specific errors
        if let CliError::Shapefile(ShapefileError::Io(_)) = self {
            eprintln!();
            eprintln!("A shapefile needs its .shp and .shx files next to each other;");
            eprintln!("pass the base path without an extension, e.g. data/cities");
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Settings(msg) => write!(f, "Settings error: {}", msg),
            CliError::Shapefile(e) => write!(f, "Shapefile error: {}", e),
            CliError::Geocode(e) => write!(f, "Geocoding error: {}", e),
            CliError::Query(e) => write!(f, "Invalid query: {}", e),
            CliError::FileRead { path, error } => {
                write!(f, "Failed to read file '{}': {}", path, error)
            }
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Shapefile(e) => Some(e),
            CliError::Geocode(e) => Some(e),
            CliError::Query(e) => Some(e),
            CliError::FileRead { error, .. } => Some(error),
            _ => None,
        }
    }
}

impl From<ShapefileError> for CliError {
    fn from(e: ShapefileError) -> Self {
        CliError::Shapefile(e)
    }
}

impl From<GeocodeError> for CliError {
    fn from(e: GeocodeError) -> Self {
        CliError::Geocode(e)
    }
}

impl From<QueryError> for CliError {
    fn from(e: QueryError) -> Self {
        CliError::Query(e)
    }
}
