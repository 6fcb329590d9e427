//! IGRA Processor Library
//!
//! A Rust library for reading NOAA Integrated Global Radiosonde Archive
//! (IGRA v2) derived-parameter files into Polars tables.
//!
//! This library provides tools for:
//! - Parsing the fixed-width header and level records of zip, gzip or plain archives
//! - Replacing missing-value sentinels with nulls and rescaling stored units
//! - Downloading per-station archives from the NOAA server
//! - Extracting station time windows as per-hour CSV tables or per-sounding profiles

pub mod archive;
pub mod cli;
pub mod config;
pub mod download;
pub mod error;
pub mod models;
pub mod parser;
pub mod processor;
pub mod schema;

pub use config::{IgraConfig, ParserConfig};
pub use download::download_derived;
pub use error::{IgraError, Result};
pub use models::{ParseStats, ParsedArchive, ProcessingStats, StationRequest, TimeWindow};
pub use parser::{SoundingParser, ascii_to_dataframe};
pub use processor::StationExtractor;
