//! Command-line interface components.

use crate::config::{DEFAULT_SERVER_URL, IgraConfig};
use crate::download::download_derived;
use crate::models::{StationRequest, TimeWindow};
use crate::parser::SoundingParser;
use crate::processor::StationExtractor;
use crate::processor::writer::{TableFormat, write_table};
use crate::schema::{HEADER_PARAMETERS, LEVEL_FIELDS, RecordLayout};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use colored::*;
use futures::stream::{self, StreamExt};
use std::path::PathBuf;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "igra")]
#[command(about = "Parse and extract NOAA IGRA v2 derived radiosonde parameters")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Parse one archive and print a summary, optionally writing its tables
    Parse {
        /// Archive path (.zip, .gz or plain text)
        #[arg(value_name = "PATH")]
        path: PathBuf,

        /// Also decode the level records
        #[arg(long)]
        levels: bool,

        /// Directory to write headers/levels tables into
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Table format used with --output
        #[arg(long, value_enum, default_value_t = TableFormat::Csv)]
        format: TableFormat,
    },

    /// Write derived parameters per station, split by synoptic hour
    Extract {
        #[command(flatten)]
        selection: StationSelection,
    },

    /// Write one profile file per sounding for each station
    Profiles {
        #[command(flatten)]
        selection: StationSelection,

        /// Level rows within this many minutes of a sounding belong to it
        #[arg(long, default_value_t = 5)]
        tolerance_minutes: i64,
    },

    /// Download station archives from the NOAA server
    Download {
        /// IGRA station identifiers, e.g. USM00072201
        #[arg(required = true, value_name = "ID")]
        ids: Vec<String>,

        /// Directory archives are saved into
        #[arg(short, long)]
        derived_dir: Option<PathBuf>,

        /// Server the archives are fetched from
        #[arg(long, default_value = DEFAULT_SERVER_URL)]
        server: String,
    },
}

/// Stations and dates shared by `extract` and `profiles`
#[derive(clap::Args, Debug)]
pub struct StationSelection {
    /// Stations as NAME=ID (or a bare ID), repeatable
    #[arg(short, long = "station", required = true, value_name = "NAME=ID")]
    pub stations: Vec<StationRequest>,

    /// First day of the window (YYYY-MM-DD or YYYYMMDD)
    #[arg(long, value_parser = parse_date)]
    pub start: NaiveDate,

    /// Last day of the window (YYYY-MM-DD or YYYYMMDD)
    #[arg(long, value_parser = parse_date)]
    pub end: NaiveDate,

    /// Directory holding <ID>-drvd.txt.zip archives
    #[arg(short, long)]
    pub derived_dir: Option<PathBuf>,

    /// Output directory, one subdirectory per station
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,

    /// Download archives even when a local copy exists
    #[arg(long)]
    pub force_download: bool,

    /// Server the archives are fetched from
    #[arg(long, default_value = DEFAULT_SERVER_URL)]
    pub server: String,

    /// Maximum stations processed at once
    #[arg(long)]
    pub concurrency: Option<usize>,
}

impl StationSelection {
    fn window(&self) -> Result<TimeWindow> {
        Ok(TimeWindow::new(self.start, self.end)?)
    }

    fn config(&self) -> IgraConfig {
        let mut config = IgraConfig::default().with_server_url(self.server.clone());
        if let Some(concurrency) = self.concurrency {
            config = config.with_max_concurrent_stations(concurrency);
        }
        if self.force_download {
            config = config.with_force_download();
        }
        config
    }

    fn extractor(&self, config: IgraConfig) -> Result<StationExtractor> {
        let derived_dir = resolve_derived_dir(self.derived_dir.clone())?;
        Ok(StationExtractor::new(derived_dir, self.output.clone()).with_config(config))
    }
}

fn parse_date(s: &str) -> std::result::Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y%m%d"))
        .map_err(|_| format!("'{}' is not a date (expected YYYY-MM-DD or YYYYMMDD)", s))
}

/// Archive directory, defaulting to `<user data dir>/igra/derived`
pub fn resolve_derived_dir(derived_dir: Option<PathBuf>) -> Result<PathBuf> {
    match derived_dir {
        Some(dir) => Ok(dir),
        None => {
            let data_dir = dirs::data_dir().context("Could not determine user data directory")?;
            Ok(data_dir.join("igra").join("derived"))
        }
    }
}

/// Set up structured logging on stderr
pub fn setup_logging(verbose: bool) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("igra_processor={}", log_level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();

    debug!("Logging initialized at level: {}", log_level);
}

/// Execute the parsed command
pub async fn run(args: Args) -> Result<()> {
    match args.command {
        Command::Parse {
            path,
            levels,
            output,
            format,
        } => run_parse(path, levels, output, format).await,
        Command::Extract { selection } => {
            let stats = selection
                .extractor(selection.config())?
                .save_derived(&selection.stations, selection.window()?)
                .await?;
            debug!("Extraction finished: {:?}", stats);
            Ok(())
        }
        Command::Profiles {
            selection,
            tolerance_minutes,
        } => {
            let config = selection
                .config()
                .with_profile_tolerance_minutes(tolerance_minutes);
            let stats = selection
                .extractor(config)?
                .save_profiles(&selection.stations, selection.window()?)
                .await?;
            debug!("Profile extraction finished: {:?}", stats);
            Ok(())
        }
        Command::Download {
            ids,
            derived_dir,
            server,
        } => run_download(ids, resolve_derived_dir(derived_dir)?, server).await,
    }
}

async fn run_parse(
    path: PathBuf,
    levels: bool,
    output: Option<PathBuf>,
    format: TableFormat,
) -> Result<()> {
    let parse_path = path.clone();
    let parsed = tokio::task::spawn_blocking(move || {
        SoundingParser::default().parse(&parse_path, levels)
    })
    .await
    .context("Parser task failed")?
    .with_context(|| format!("Failed to parse {}", path.display()))?;

    println!("{}", "Archive Summary".bright_green().bold());
    println!("  {} {}", "File:".bright_cyan(), path.display());
    println!(
        "  {} {}",
        "Station:".bright_cyan(),
        parsed.station_id.as_deref().unwrap_or("-").bright_white()
    );
    println!(
        "  {} {}",
        "Soundings:".bright_cyan(),
        parsed.stats.header_records.to_string().bright_white().bold()
    );
    if let Some(levels) = &parsed.levels {
        println!(
            "  {} {}",
            "Levels:".bright_cyan(),
            levels.height().to_string().bright_white().bold()
        );
    }
    if parsed.stats.level_count_mismatches > 0 {
        println!(
            "  {} {}",
            "Level count mismatches:".bright_yellow(),
            parsed.stats.level_count_mismatches
        );
    }
    println!("  {} {}", "Header units:".bright_cyan(), unit_listing(&HEADER_PARAMETERS));
    if parsed.levels.is_some() {
        println!("  {} {}", "Level units:".bright_cyan(), unit_listing(&LEVEL_FIELDS));
    }

    if let Some(dir) = output {
        let missing_value = IgraConfig::default().missing_value;
        let mut headers = parsed.headers;
        let written = write_table(&mut headers, &dir, "headers", format, &missing_value)?;
        println!("  {} {}", "Wrote".bright_green(), written.display());

        if let Some(mut levels) = parsed.levels {
            let written = write_table(&mut levels, &dir, "levels", format, &missing_value)?;
            println!("  {} {}", "Wrote".bright_green(), written.display());
        }
    }

    Ok(())
}

/// `column [unit]` list of a layout's output columns
fn unit_listing(layout: &RecordLayout) -> String {
    layout
        .units()
        .map(|(column, unit)| format!("{} [{}]", column, unit))
        .collect::<Vec<_>>()
        .join(", ")
}

async fn run_download(ids: Vec<String>, derived_dir: PathBuf, server: String) -> Result<()> {
    let concurrency = IgraConfig::default().max_concurrent_stations;

    let results: Vec<_> = stream::iter(ids)
        .map(|id| {
            let derived_dir = derived_dir.clone();
            let server = server.clone();
            async move {
                let result = download_derived(&id, &derived_dir, &server).await;
                (id, result)
            }
        })
        .buffer_unordered(concurrency)
        .collect()
        .await;

    let mut failed = 0;
    for (id, result) in results {
        match result {
            Ok(path) => println!("  {} {} -> {}", "Downloaded".bright_green(), id, path.display()),
            Err(e) => {
                failed += 1;
                println!("  {} {}: {}", "Failed".bright_red(), id, e);
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{} download(s) failed", failed);
    }
    Ok(())
}
