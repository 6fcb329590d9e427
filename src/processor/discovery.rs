//! Locating station archives in the derived-data directory.

use crate::error::{IgraError, Result};
use glob::{Pattern, glob};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Newest archive for a station: last match of `<dir>/<ID>*.zip` in sorted order
pub fn find_station_archive(derived_dir: &Path, station_id: &str) -> Result<Option<PathBuf>> {
    let pattern = format!(
        "{}/{}*.zip",
        Pattern::escape(&derived_dir.to_string_lossy()),
        Pattern::escape(station_id)
    );

    let entries = glob(&pattern).map_err(|e| IgraError::Configuration {
        message: format!("invalid archive pattern '{}': {}", pattern, e),
    })?;

    let mut matches: Vec<PathBuf> = entries.filter_map(|entry| entry.ok()).collect();
    matches.sort();

    debug!(
        "Found {} archive(s) for {} in {}",
        matches.len(),
        station_id,
        derived_dir.display()
    );
    Ok(matches.pop())
}
