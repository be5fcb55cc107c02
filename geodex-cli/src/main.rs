//! Geodex CLI - Command-line interface
//!
//! This binary provides a command-line interface to the geodex library.
//!
//! # Architecture
//!
//! - `Cli` / `Commands`: Argument parsing (clap)
//! - `commands`: One module per subcommand
//! - `CliError`: Centralized error handling with user-friendly messages
//!
//! # Configuration
//!
//! Settings are loaded from `~/.geodex/config.ini` on startup. CLI
//! arguments override config file values when specified.

mod commands;
mod error;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use geodex::config::Settings;

use commands::query::QueryAction;
use error::CliError;

#[derive(Debug, Parser)]
#[command(name = "geodex", version, about = "Shapefile inspection, spatial queries, and geocoding")]
struct Cli {
    /// Directory for log files (overrides the settings file)
    #[arg(long, global = true)]
    log_dir: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Show shapefile metadata
    Info {
        /// Shapefile base path (without extension)
        base: PathBuf,
        /// Also print the first N records
        #[arg(short, long)]
        records: Option<u32>,
    },
    /// Run a spatial query against a shapefile
    Query {
        /// Shapefile base path (without extension)
        base: PathBuf,
        #[command(subcommand)]
        action: QueryAction,
    },
    /// Geocode an address
    Geocode {
        /// Shapefile base path (without extension)
        base: PathBuf,
        /// Address to geocode
        address: String,
        /// Attribute field containing addresses
        #[arg(long)]
        field: Option<String>,
    },
    /// Reverse geocode a coordinate
    Reverse {
        /// Shapefile base path (without extension)
        base: PathBuf,
        x: f64,
        y: f64,
        /// Maximum search distance in coordinate units
        #[arg(long)]
        max_distance: Option<f64>,
        /// Attribute field containing addresses
        #[arg(long)]
        field: Option<String>,
    },
    /// Geocode addresses from a file, one per line
    Batch {
        /// Shapefile base path (without extension)
        base: PathBuf,
        /// File of addresses, one per line
        file: PathBuf,
        /// Attribute field containing addresses
        #[arg(long)]
        field: Option<String>,
    },
    /// Show geocoder index statistics
    Stats {
        /// Shapefile base path (without extension)
        base: PathBuf,
        /// Attribute field containing addresses
        #[arg(long)]
        field: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => CliError::Settings(e.to_string()).exit(),
    };

    let log_dir = cli.log_dir.as_ref().unwrap_or(&settings.log_directory);
    let _guard = match geodex::logging::init_logging(log_dir, &settings.log_file) {
        Ok(guard) => guard,
        Err(e) => CliError::LoggingInit(e.to_string()).exit(),
    };

    let field = |flag: Option<String>| flag.unwrap_or_else(|| settings.address_field.clone());

    let result = match cli.command {
        Commands::Info { base, records } => commands::info::run(&base, records),
        Commands::Query { base, action } => commands::query::run(&base, action),
        Commands::Geocode {
            base,
            address,
            field: f,
        } => commands::geocode::geocode(&base, &address, &field(f)),
        Commands::Reverse {
            base,
            x,
            y,
            max_distance,
            field: f,
        } => commands::geocode::reverse(
            &base,
            x,
            y,
            max_distance.unwrap_or(settings.reverse_max_distance),
            &field(f),
        ),
        Commands::Batch {
            base,
            file,
            field: f,
        } => commands::geocode::batch(&base, &file, &field(f)),
        Commands::Stats { base, field: f } => commands::geocode::stats(&base, &field(f)),
    };

    if let Err(e) = result {
        e.exit();
    }
}
