//! Configuration management.
//!
//! Provides configuration structures for the parser (sentinel sets) and
//! for station extraction runs (download server, concurrency, time
//! windows and CSV output conventions).

use crate::error::{IgraError, Result};
use crate::schema::{HEADER_SENTINELS, LEVEL_SENTINELS};
use serde::{Deserialize, Serialize};

/// Default location of the per-station derived-parameter archives
pub const DEFAULT_SERVER_URL: &str = "https://www1.ncdc.noaa.gov/pub/data/igra/derived/derived-por";

/// Sentinel sets applied to the parsed tables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParserConfig {
    /// Values replaced with null in the header table
    pub header_sentinels: Vec<f64>,

    /// Values replaced with null in the level table
    pub level_sentinels: Vec<f64>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            header_sentinels: HEADER_SENTINELS.to_vec(),
            level_sentinels: LEVEL_SENTINELS.to_vec(),
        }
    }
}

/// Global configuration for station extraction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IgraConfig {
    /// Base URL the `<ID>-drvd.txt.zip` archives are downloaded from
    pub server_url: String,

    /// Maximum stations processed concurrently
    pub max_concurrent_stations: usize,

    /// Level rows within this many minutes of a sounding belong to its profile
    pub profile_tolerance_minutes: i64,

    /// Hours added to the last day of a window so its late soundings are kept
    pub window_padding_hours: i64,

    /// Sounding hours that get their own derived-parameter CSV
    pub synoptic_hours: Vec<u32>,

    /// Download archives even when a local copy exists
    pub force_download: bool,

    /// Text written for missing values in CSV output
    pub missing_value: String,

    /// Parser sentinel configuration
    pub parser: ParserConfig,
}

impl Default for IgraConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            max_concurrent_stations: num_cpus::get(),
            profile_tolerance_minutes: 5,
            window_padding_hours: 23,
            synoptic_hours: vec![0, 12],
            force_download: false,
            missing_value: "NaN".to_string(),
            parser: ParserConfig::default(),
        }
    }
}

impl IgraConfig {
    /// Use a different download server
    pub fn with_server_url(mut self, server_url: impl Into<String>) -> Self {
        self.server_url = server_url.into();
        self
    }

    /// Set maximum concurrent stations
    pub fn with_max_concurrent_stations(mut self, max_stations: usize) -> Self {
        self.max_concurrent_stations = max_stations;
        self
    }

    /// Set the level/sounding matching tolerance
    pub fn with_profile_tolerance_minutes(mut self, minutes: i64) -> Self {
        self.profile_tolerance_minutes = minutes;
        self
    }

    /// Set the hours written as separate derived-parameter files
    pub fn with_synoptic_hours(mut self, hours: Vec<u32>) -> Self {
        self.synoptic_hours = hours;
        self
    }

    /// Enable force downloading
    pub fn with_force_download(mut self) -> Self {
        self.force_download = true;
        self
    }

    /// Validate settings before a run
    pub fn validate(&self) -> Result<()> {
        if self.max_concurrent_stations == 0 {
            return Err(IgraError::Configuration {
                message: "max_concurrent_stations must be at least 1".to_string(),
            });
        }
        if self.profile_tolerance_minutes < 0 || self.window_padding_hours < 0 {
            return Err(IgraError::Configuration {
                message: "tolerance and window padding must not be negative".to_string(),
            });
        }
        if let Some(hour) = self.synoptic_hours.iter().find(|h| **h > 23) {
            return Err(IgraError::Configuration {
                message: format!("synoptic hour {} is not a valid hour", hour),
            });
        }
        Ok(())
    }
}
