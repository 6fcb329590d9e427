//! Output writing for extracted station data
//!
//! Handles CSV output for derived parameters and sounding profiles, plus
//! Parquet output for whole parsed tables.

use crate::error::{IgraError, Result};
use crate::models::StationRequest;
use crate::processor::frames;

use polars::prelude::{
    CsvWriter, DataFrame, ParquetCompression, ParquetWriter as PolarsParquetWriter, SerWriter,
    StatisticsOptions,
};
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Output format for whole parsed tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum TableFormat {
    #[default]
    Csv,
    Parquet,
}

impl TableFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            TableFormat::Csv => "csv",
            TableFormat::Parquet => "parquet",
        }
    }
}

/// Writer for one station's output directory
#[derive(Debug, Clone)]
pub struct StationWriter {
    station_dir: PathBuf,
    missing_value: String,
}

impl StationWriter {
    /// Create the writer, creating `<output>/<name>` if needed
    pub fn create(output_dir: &Path, station: &StationRequest, missing_value: &str) -> Result<Self> {
        let station_dir = output_dir.join(&station.name);
        fs::create_dir_all(&station_dir)?;

        Ok(Self {
            station_dir,
            missing_value: missing_value.to_string(),
        })
    }

    pub fn station_dir(&self) -> &Path {
        &self.station_dir
    }

    /// Write one `Derived_<ID>_<window>_<HH>Z.csv` per synoptic hour
    ///
    /// `daily` must already carry the `hour` column. Returns the paths
    /// written and the number of soundings they hold.
    pub fn write_derived_split(
        &self,
        daily: &DataFrame,
        station_id: &str,
        window_label: &str,
        hours: &[u32],
    ) -> Result<(Vec<PathBuf>, usize)> {
        let mut written = Vec::with_capacity(hours.len());
        let mut soundings = 0;

        for &hour in hours {
            let mut subset = frames::filter_hour(daily, hour)?;
            let path = self.station_dir.join(format!(
                "Derived_{}_{}_{:02}Z.csv",
                station_id, window_label, hour
            ));

            write_csv(&mut subset, &path, &self.missing_value)?;
            soundings += subset.height();
            written.push(path);
        }

        Ok((written, soundings))
    }

    /// Write one sounding profile file
    ///
    /// The file holds a `name,ID` line, the header parameters as
    /// `column,value` lines, then the level table with its own header row.
    pub fn write_profile(
        &self,
        station: &StationRequest,
        time_label: &str,
        header: &[(String, String)],
        levels: &mut DataFrame,
    ) -> Result<PathBuf> {
        let path = self
            .station_dir
            .join(format!("{}_{}Z.csv", station.id, time_label));
        let mut writer = BufWriter::new(File::create(&path)?);

        writeln!(writer, "{},{}", station.name, station.id)?;
        for (column, value) in header {
            writeln!(writer, "{},{}", column, value)?;
        }

        CsvWriter::new(&mut writer)
            .include_header(true)
            .with_null_value(self.missing_value.clone())
            .finish(levels)
            .map_err(|e| IgraError::ProcessingFailed {
                path: path.clone(),
                reason: format!("Failed to write profile levels: {}", e),
            })?;
        writer.flush()?;

        Ok(path)
    }

    /// Append one entry to this station's `ExtractedProfiles_<run>.csv`
    pub fn append_profile_log(&self, run_label: &str, entry: &str) -> Result<()> {
        let path = self
            .station_dir
            .join(format!("ExtractedProfiles_{}.csv", run_label));
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{}", entry)?;
        Ok(())
    }
}

/// Write a table as CSV with a header row
pub fn write_csv(frame: &mut DataFrame, path: &Path, missing_value: &str) -> Result<()> {
    let file = File::create(path)?;

    CsvWriter::new(BufWriter::new(file))
        .include_header(true)
        .with_null_value(missing_value.to_string())
        .finish(frame)
        .map_err(|e| IgraError::ProcessingFailed {
            path: path.to_path_buf(),
            reason: format!("Failed to write CSV: {}", e),
        })?;

    debug!("Wrote {} rows to {}", frame.height(), path.display());
    Ok(())
}

/// Write a table as Snappy-compressed Parquet with column statistics
pub fn write_parquet(frame: &mut DataFrame, path: &Path) -> Result<()> {
    let file = File::create(path)?;

    PolarsParquetWriter::new(file)
        .with_compression(ParquetCompression::Snappy)
        .with_statistics(StatisticsOptions::full())
        .finish(frame)
        .map_err(|e| IgraError::ProcessingFailed {
            path: path.to_path_buf(),
            reason: format!("Failed to write parquet: {}", e),
        })?;

    debug!("Wrote {} rows to {}", frame.height(), path.display());
    Ok(())
}

/// Write a table in `format` as `<dir>/<stem>.<ext>`
pub fn write_table(
    frame: &mut DataFrame,
    dir: &Path,
    stem: &str,
    format: TableFormat,
    missing_value: &str,
) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("{}.{}", stem, format.extension()));

    match format {
        TableFormat::Csv => write_csv(frame, &path, missing_value)?,
        TableFormat::Parquet => write_parquet(frame, &path)?,
    }
    Ok(path)
}
