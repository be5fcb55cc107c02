//! Settings file handling for `~/.geodex/config.ini`.
//!
//! Loads user configuration with sensible defaults: a missing file means
//! defaults, a present file overlays only the keys it sets. CLI arguments
//! override both.

use std::path::{Path, PathBuf};

use ini::Ini;
use thiserror::Error;

use crate::geocode::DEFAULT_ADDRESS_FIELD;

/// Default reverse-geocoding search radius, in coordinate units.
const DEFAULT_REVERSE_MAX_DISTANCE: f64 = 100.0;
const DEFAULT_LOG_DIRECTORY: &str = "logs";
const DEFAULT_LOG_FILE: &str = "geodex.log";

/// Settings file errors.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Failed to read or parse the settings file
    #[error("Failed to read settings file: {0}")]
    ReadError(#[from] ini::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {section}.{key} = '{value}' - {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },
}

/// User-tunable settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Attribute field the geocoder reads addresses from.
    pub address_field: String,
    /// Default reverse-geocoding search radius.
    pub reverse_max_distance: f64,
    /// Directory log files are written to.
    pub log_directory: String,
    /// Log file name within the log directory.
    pub log_file: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            address_field: DEFAULT_ADDRESS_FIELD.to_string(),
            reverse_max_distance: DEFAULT_REVERSE_MAX_DISTANCE,
            log_directory: DEFAULT_LOG_DIRECTORY.to_string(),
            log_file: DEFAULT_LOG_FILE.to_string(),
        }
    }
}

impl Settings {
    /// Load settings from the default path (`~/.geodex/config.ini`).
    ///
    /// A missing file yields defaults.
    pub fn load() -> Result<Self, SettingsError> {
        Self::load_from(&settings_file_path())
    }

    /// Load settings from a specific path; a missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let ini = Ini::load_from_file(path)?;
        parse_ini(&ini)
    }
}

/// Overlay INI values onto defaults.
fn parse_ini(ini: &Ini) -> Result<Settings, SettingsError> {
    let mut settings = Settings::default();

    if let Some(section) = ini.section(Some("geocoder")) {
        if let Some(v) = section.get("address_field") {
            let v = v.trim();
            if !v.is_empty() {
                settings.address_field = v.to_string();
            }
        }
        if let Some(v) = section.get("reverse_max_distance") {
            let parsed: f64 = v.parse().map_err(|_| SettingsError::InvalidValue {
                section: "geocoder".to_string(),
                key: "reverse_max_distance".to_string(),
                value: v.to_string(),
                reason: "must be a number".to_string(),
            })?;
            if parsed <= 0.0 {
                return Err(SettingsError::InvalidValue {
                    section: "geocoder".to_string(),
                    key: "reverse_max_distance".to_string(),
                    value: v.to_string(),
                    reason: "must be positive".to_string(),
                });
            }
            settings.reverse_max_distance = parsed;
        }
    }

    if let Some(section) = ini.section(Some("log")) {
        if let Some(v) = section.get("directory") {
            settings.log_directory = v.to_string();
        }
        if let Some(v) = section.get("file") {
            settings.log_file = v.to_string();
        }
    }

    Ok(settings)
}

/// Path to the settings directory (`~/.geodex`).
pub fn settings_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".geodex")
}

/// Path to the settings file (`~/.geodex/config.ini`).
pub fn settings_file_path() -> PathBuf {
    settings_directory().join("config.ini")
}
