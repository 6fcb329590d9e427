//! Core data structures for IGRA processing.
//!
//! Defines archive container types, parse results and statistics, and the
//! station/time-window requests consumed by the extraction pipeline.

use crate::error::{IgraError, Result};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Container wrapping the archive text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArchiveFormat {
    Zip,
    Gzip,
    PlainText,
}

impl ArchiveFormat {
    /// Detect the container from the path (substring match, `.zip` wins)
    pub fn from_path(path: &Path) -> Self {
        let path_str = path.to_string_lossy();

        if path_str.contains(".zip") {
            ArchiveFormat::Zip
        } else if path_str.contains(".gz") {
            ArchiveFormat::Gzip
        } else {
            ArchiveFormat::PlainText
        }
    }
}

/// Counters collected during one parse pass
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseStats {
    pub header_records: usize,
    pub level_records: usize,
    /// Level lines passed over because levels were not requested
    pub skipped_level_records: usize,
    /// Soundings whose NUMLEV disagrees with the level lines that follow
    pub level_count_mismatches: usize,
}

/// Tables decoded from one archive
#[derive(Debug, Clone)]
pub struct ParsedArchive {
    /// One row per sounding, keyed by `date`
    pub headers: DataFrame,
    /// One row per level, keyed by the owning sounding's `date`
    pub levels: Option<DataFrame>,
    /// Identifier from the first header record
    pub station_id: Option<String>,
    pub stats: ParseStats,
}

/// A station to extract: output directory name plus IGRA identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StationRequest {
    pub name: String,
    pub id: String,
}

impl StationRequest {
    pub fn new(name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
        }
    }
}

impl FromStr for StationRequest {
    type Err = String;

    /// Parse `NAME=ID`, or a bare `ID` used as its own name
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (name, id) = match s.split_once('=') {
            Some((name, id)) => (name.trim(), id.trim()),
            None => (s.trim(), s.trim()),
        };

        if name.is_empty() || id.is_empty() {
            return Err(format!("expected NAME=ID, got '{}'", s));
        }
        Ok(Self::new(name, id))
    }
}

/// Inclusive range of sounding dates to extract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl TimeWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if end < start {
            return Err(IgraError::Configuration {
                message: format!("window end {} is before start {}", end, start),
            });
        }
        Ok(Self { start, end })
    }

    /// Earliest sounding time inside the window
    pub fn first_instant(&self) -> NaiveDateTime {
        self.start.and_time(chrono::NaiveTime::MIN)
    }

    /// Latest sounding time inside the window
    pub fn last_instant(&self, padding_hours: i64) -> NaiveDateTime {
        self.end.and_time(chrono::NaiveTime::MIN) + Duration::hours(padding_hours)
    }

    /// Label used in output file names, e.g. `20200101to20201231`
    pub fn label(&self) -> String {
        format!(
            "{}to{}",
            self.start.format("%Y%m%d"),
            self.end.format("%Y%m%d")
        )
    }
}

/// Summary of one extraction run
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ProcessingStats {
    pub stations_processed: usize,
    pub stations_failed: usize,
    pub soundings_written: usize,
    pub files_written: usize,
    pub output_path: PathBuf,
    pub processing_time_ms: u128,
}
