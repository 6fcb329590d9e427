//! Fetching per-station archives from the NOAA server.

use crate::error::{IgraError, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// File name of a station's derived-parameter archive
pub fn archive_file_name(station_id: &str) -> String {
    format!("{}-drvd.txt.zip", station_id)
}

/// Download URL of a station's archive
pub fn derived_url(server: &str, station_id: &str) -> String {
    format!(
        "{}/{}",
        server.trim_end_matches('/'),
        archive_file_name(station_id)
    )
}

/// Download `<server>/<ID>-drvd.txt.zip` into `directory`
///
/// The directory is created up front when missing. Returns the path of the
/// saved archive. On a failed request no archive file is written.
pub async fn download_derived(station_id: &str, directory: &Path, server: &str) -> Result<PathBuf> {
    tokio::fs::create_dir_all(directory).await?;

    let url = derived_url(server, station_id);
    debug!("Downloading {}", url);

    let response = reqwest::get(&url).await.map_err(|e| IgraError::Download {
        url: url.clone(),
        reason: e.to_string(),
    })?;

    if !response.status().is_success() {
        return Err(IgraError::Download {
            url,
            reason: format!("server responded {}", response.status()),
        });
    }

    let bytes = response.bytes().await.map_err(|e| IgraError::Download {
        url: url.clone(),
        reason: e.to_string(),
    })?;

    let path = directory.join(archive_file_name(station_id));
    tokio::fs::write(&path, &bytes).await?;

    info!("Saved {} ({} bytes)", path.display(), bytes.len());
    Ok(path)
}
