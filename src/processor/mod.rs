//! Station extraction engine.
//!
//! Orchestrates the per-station workflow: locate or download the archive,
//! parse it, cut the requested time window and write either the
//! derived-parameter tables or one profile file per sounding. Stations run
//! concurrently; a failing station is logged and counted without stopping
//! the others.

pub mod discovery;
pub mod frames;
pub mod writer;

#[cfg(test)]
pub mod tests;

use self::discovery::find_station_archive;
use self::writer::StationWriter;

use crate::config::IgraConfig;
use crate::download::download_derived;
use crate::error::{IgraError, Result};
use crate::models::{ProcessingStats, StationRequest, TimeWindow};
use crate::parser::{SoundingParser, timestamps};

use colored::*;
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::task;
use tracing::{debug, warn};

/// What an extraction run writes for each station
#[derive(Debug, Clone, PartialEq, Eq)]
enum Extraction {
    /// Derived-parameter tables split by synoptic hour
    Derived,
    /// One profile file per sounding, logged under this run label
    Profiles { run_label: String },
}

/// Counts produced by one station
#[derive(Debug, Default)]
struct StationOutcome {
    soundings: usize,
    files: usize,
}

/// Extracts station data from derived-parameter archives
#[derive(Debug, Clone)]
pub struct StationExtractor {
    derived_dir: PathBuf,
    output_dir: PathBuf,
    config: IgraConfig,
}

impl StationExtractor {
    /// Create an extractor reading archives from `derived_dir`
    pub fn new(derived_dir: PathBuf, output_dir: PathBuf) -> Self {
        Self {
            derived_dir,
            output_dir,
            config: IgraConfig::default(),
        }
    }

    /// Configure the extractor
    pub fn with_config(mut self, config: IgraConfig) -> Self {
        self.config = config;
        self
    }

    /// Write `Derived_<ID>_<window>_<HH>Z.csv` files for every station
    pub async fn save_derived(
        &self,
        stations: &[StationRequest],
        window: TimeWindow,
    ) -> Result<ProcessingStats> {
        self.run(stations, window, Extraction::Derived).await
    }

    /// Write one `<ID>_<YYYYmmdd_HH>Z.csv` profile per sounding for every station
    pub async fn save_profiles(
        &self,
        stations: &[StationRequest],
        window: TimeWindow,
    ) -> Result<ProcessingStats> {
        let run_label = chrono::Utc::now().format("%Y%m%d_%H%M%S").to_string();
        self.run(stations, window, Extraction::Profiles { run_label })
            .await
    }

    async fn run(
        &self,
        stations: &[StationRequest],
        window: TimeWindow,
        extraction: Extraction,
    ) -> Result<ProcessingStats> {
        self.config.validate()?;
        let start_time = Instant::now();

        println!(
            "{}",
            format!("Extracting {} station(s)", stations.len())
                .bright_green()
                .bold()
        );
        println!("  {} {}", "Archives:".bright_cyan(), self.derived_dir.display());
        println!("  {} {}", "Output:".bright_cyan(), self.output_dir.display());
        println!("  {} {}", "Window:".bright_cyan(), window.label());

        tokio::fs::create_dir_all(&self.output_dir).await?;

        let progress_bar = ProgressBar::new(stations.len() as u64);
        progress_bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .map_err(|e| IgraError::Configuration {
                    message: format!("Invalid progress template: {}", e),
                })?
                .progress_chars("#>-"),
        );

        let extractor = self;
        let extraction = Arc::new(extraction);
        let bar = progress_bar.clone();
        let (processed, failed, soundings, files) = stream::iter(stations.iter().cloned())
            .map(move |station| {
                let extraction = Arc::clone(&extraction);
                let pb = bar.clone();
                async move {
                    pb.set_message(station.name.clone());
                    let result = extractor
                        .process_station(&station, window, &extraction)
                        .await;
                    pb.inc(1);
                    (station, result)
                }
            })
            .buffer_unordered(self.config.max_concurrent_stations)
            .fold(
                (0usize, 0usize, 0usize, 0usize),
                |(processed, failed, soundings, files), (station, result)| async move {
                    match result {
                        Ok(outcome) => (
                            processed + 1,
                            failed,
                            soundings + outcome.soundings,
                            files + outcome.files,
                        ),
                        Err(e) => {
                            warn!("Station {} ({}) failed: {}", station.name, station.id, e);
                            (processed, failed + 1, soundings, files)
                        }
                    }
                },
            )
            .await;

        progress_bar.finish_with_message("done");

        let stats = ProcessingStats {
            stations_processed: processed,
            stations_failed: failed,
            soundings_written: soundings,
            files_written: files,
            output_path: self.output_dir.clone(),
            processing_time_ms: start_time.elapsed().as_millis(),
        };
        print_summary(&stats);
        Ok(stats)
    }

    async fn process_station(
        &self,
        station: &StationRequest,
        window: TimeWindow,
        extraction: &Extraction,
    ) -> Result<StationOutcome> {
        let archive = self.locate_archive(station).await?;
        debug!("Processing {} from {}", station.id, archive.display());

        let this = self.clone();
        let station = station.clone();
        let extraction = extraction.clone();

        task::spawn_blocking(move || match extraction {
            Extraction::Derived => this.extract_derived(&station, &archive, &window),
            Extraction::Profiles { run_label } => {
                this.extract_profiles(&station, &archive, &window, &run_label)
            }
        })
        .await
        .map_err(|e| IgraError::ProcessingFailed {
            path: self.derived_dir.clone(),
            reason: format!("Station task failed: {}", e),
        })?
    }

    /// Local archive for a station, downloading it when missing or forced
    async fn locate_archive(&self, station: &StationRequest) -> Result<PathBuf> {
        if !self.config.force_download {
            if let Some(path) = find_station_archive(&self.derived_dir, &station.id)? {
                return Ok(path);
            }
        }

        download_derived(&station.id, &self.derived_dir, &self.config.server_url).await
    }

    fn extract_derived(
        &self,
        station: &StationRequest,
        archive: &Path,
        window: &TimeWindow,
    ) -> Result<StationOutcome> {
        let parsed = SoundingParser::new(self.config.parser.clone()).parse(archive, false)?;

        let subset =
            frames::subset_window(parsed.headers, window, self.config.window_padding_hours)?;
        let daily = frames::with_daily_index(subset)?;

        let writer = StationWriter::create(&self.output_dir, station, &self.config.missing_value)?;
        let (paths, soundings) = writer.write_derived_split(
            &daily,
            &station.id,
            &window.label(),
            &self.config.synoptic_hours,
        )?;

        Ok(StationOutcome {
            soundings,
            files: paths.len(),
        })
    }

    fn extract_profiles(
        &self,
        station: &StationRequest,
        archive: &Path,
        window: &TimeWindow,
        run_label: &str,
    ) -> Result<StationOutcome> {
        let parsed = SoundingParser::new(self.config.parser.clone()).parse(archive, true)?;
        let levels = parsed.levels.ok_or_else(|| IgraError::ProcessingFailed {
            path: archive.to_path_buf(),
            reason: "level table was not produced".to_string(),
        })?;

        let headers =
            frames::subset_window(parsed.headers, window, self.config.window_padding_hours)?;
        let levels = frames::subset_window(
            levels,
            window,
            self.config.window_padding_hours,
        )?;

        let writer = StationWriter::create(&self.output_dir, station, &self.config.missing_value)?;
        let mut outcome = StationOutcome::default();
        let mut written = HashSet::new();

        for (row, sounding) in timestamps(&headers)?.into_iter().enumerate() {
            let time_label = sounding.format("%Y%m%d_%H").to_string();
            // Profiles are named by hour; the first sounding of an hour wins
            if !written.insert(time_label.clone()) {
                debug!(
                    "Skipping duplicate sounding {} {} at {}",
                    station.id, time_label, sounding
                );
                continue;
            }

            let header = frames::header_row(&headers, row, &self.config.missing_value)?;
            let mut profile =
                frames::profile_levels(&levels, sounding, self.config.profile_tolerance_minutes)?;

            writer.write_profile(station, &time_label, &header, &mut profile)?;
            writer.append_profile_log(run_label, &format!("{}_{}", station.name, time_label))?;

            outcome.soundings += 1;
            outcome.files += 1;
        }

        Ok(outcome)
    }
}

fn print_summary(stats: &ProcessingStats) {
    println!("\n{}", "Extraction Summary".bright_green().bold());
    println!(
        "  {} {}ms",
        "Time elapsed:".bright_cyan(),
        stats.processing_time_ms.to_string().bright_white()
    );
    println!(
        "  {} {}",
        "Stations processed:".bright_cyan(),
        stats.stations_processed.to_string().bright_white()
    );
    if stats.stations_failed > 0 {
        println!(
            "  {} {}",
            "Stations failed:".bright_red(),
            stats.stations_failed.to_string().bright_red().bold()
        );
    }
    println!(
        "  {} {}",
        "Soundings written:".bright_cyan(),
        stats.soundings_written.to_string().bright_white().bold()
    );
    println!(
        "  {} {}",
        "Files written:".bright_cyan(),
        stats.files_written.to_string().bright_white()
    );
}
