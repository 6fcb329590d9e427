//! Fixed-width sounding parser.
//!
//! Decodes an IGRA v2 derived-parameter archive into a header table (one
//! row per sounding) and optionally a level table (one row per pressure
//! level), both keyed by the sounding timestamp in the `date` column.
//!
//! The scan is a single sequential pass. A level record belongs to the most
//! recently seen header record, which the loop tracks in an explicit
//! [`CurrentSounding`] accumulator.

use crate::archive::read_archive_text;
use crate::config::ParserConfig;
use crate::error::{IgraError, Result};
use crate::models::{ParseStats, ParsedArchive};
use crate::schema::{
    self, DATE_COLUMN, DAY, HEADER_MARKER, HEADER_PARAMETERS, HEADER_WIDTH, HOUR, LEVEL_FIELDS,
    LEVEL_WIDTH, MISSING_HOUR, MISSING_RELEASE_TIME, MONTH, RecordLayout, STATION_ID, YEAR,
};
use chrono::{DateTime, NaiveDateTime};
use polars::prelude::*;
use std::path::Path;
use tracing::debug;

/// Parse an archive with the default sentinel sets
///
/// Returns the header table and, when `include_levels` is set, the level
/// table.
pub fn ascii_to_dataframe(path: &Path, include_levels: bool) -> Result<ParsedArchive> {
    SoundingParser::default().parse(path, include_levels)
}

/// Parser for derived-parameter archives
#[derive(Debug, Clone, Default)]
pub struct SoundingParser {
    config: ParserConfig,
}

impl SoundingParser {
    pub fn new(config: ParserConfig) -> Self {
        Self { config }
    }

    /// Parse the archive at `path` (zip, gzip or plain text)
    pub fn parse(&self, path: &Path, include_levels: bool) -> Result<ParsedArchive> {
        let text = read_archive_text(path)?;
        let parsed = self.parse_text(&text, include_levels)?;

        debug!(
            "Parsed {}: {} soundings, {} levels, {} level count mismatches",
            path.display(),
            parsed.stats.header_records,
            parsed.stats.level_records,
            parsed.stats.level_count_mismatches
        );
        Ok(parsed)
    }

    /// Parse already decompressed archive text
    pub fn parse_text(&self, text: &str, include_levels: bool) -> Result<ParsedArchive> {
        let mut headers = TableBuffer::new(&HEADER_PARAMETERS);
        let mut levels = include_levels.then(|| TableBuffer::new(&LEVEL_FIELDS));
        let mut current: Option<CurrentSounding> = None;
        let mut stats = ParseStats::default();
        let mut station_id = None;

        for (index, line) in text.lines().enumerate() {
            let line_number = index + 1;

            if line.starts_with(HEADER_MARKER) {
                if let Some(previous) = current.take() {
                    previous.check_level_count(&mut stats);
                }

                let record = HeaderRecord::decode(line, line_number)?;
                let timestamp = record.timestamp(line_number)?;

                headers.push(timestamp, &record.parameters);
                stats.header_records += 1;
                current = Some(CurrentSounding {
                    timestamp,
                    declared_levels: record.declared_levels(),
                    seen_levels: 0,
                    line_number,
                });
                station_id.get_or_insert(record.station_id);
                continue;
            }

            match levels.as_mut() {
                Some(levels) => {
                    let sounding = current.as_mut().ok_or_else(|| {
                        IgraError::malformed(
                            line_number,
                            "press",
                            "level record appears before any header record",
                        )
                    })?;

                    let record = LevelRecord::decode(line, line_number)?;
                    levels.push(sounding.timestamp, &record.values);
                    sounding.seen_levels += 1;
                    stats.level_records += 1;
                }
                None => {
                    if let Some(sounding) = current.as_mut() {
                        sounding.seen_levels += 1;
                    }
                    stats.skipped_level_records += 1;
                }
            }
        }

        if let Some(last) = current {
            last.check_level_count(&mut stats);
        }

        let headers = finish_header_table(headers.into_frame()?, &self.config)?;
        let levels = levels
            .map(|buffer| {
                buffer
                    .into_frame()
                    .and_then(|frame| schema::mask_sentinels(frame, &self.config.level_sentinels))
            })
            .transpose()?;

        Ok(ParsedArchive {
            headers,
            levels,
            station_id,
            stats,
        })
    }
}

/// Sentinel masking, release-time masking and unit conversion of the header table
fn finish_header_table(frame: DataFrame, config: &ParserConfig) -> PolarsResult<DataFrame> {
    let masked = schema::mask_sentinels(frame, &config.header_sentinels)?;

    masked
        .lazy()
        .with_column(schema::sentinel_expr("reltime", &[MISSING_RELEASE_TIME]))
        .select(HEADER_PARAMETERS.output_exprs())
        .collect()
}

/// Scan state for the sounding whose levels are being read
#[derive(Debug)]
struct CurrentSounding {
    timestamp: NaiveDateTime,
    declared_levels: i64,
    seen_levels: i64,
    line_number: usize,
}

impl CurrentSounding {
    fn check_level_count(&self, stats: &mut ParseStats) {
        if self.declared_levels != self.seen_levels {
            debug!(
                "Sounding {} (line {}) declares {} levels but {} follow",
                self.timestamp, self.line_number, self.declared_levels, self.seen_levels
            );
            stats.level_count_mismatches += 1;
        }
    }
}

/// Column-major accumulator for one output table
struct TableBuffer {
    layout: &'static RecordLayout,
    dates: Vec<NaiveDateTime>,
    columns: Vec<Vec<f64>>,
}

impl TableBuffer {
    fn new(layout: &'static RecordLayout) -> Self {
        Self {
            layout,
            dates: Vec::new(),
            columns: vec![Vec::new(); layout.len()],
        }
    }

    fn push(&mut self, timestamp: NaiveDateTime, values: &[i64]) {
        self.dates.push(timestamp);
        for (column, value) in self.columns.iter_mut().zip(values) {
            column.push(*value as f64);
        }
    }

    fn into_frame(self) -> PolarsResult<DataFrame> {
        let mut columns = Vec::with_capacity(self.columns.len() + 1);
        columns.push(Column::new(DATE_COLUMN.into(), self.dates));
        for (name, values) in self.layout.raw_names().zip(self.columns) {
            columns.push(Column::new(name.into(), values));
        }
        DataFrame::new(columns)
    }
}

/// Raw contents of one header record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderRecord {
    pub station_id: String,
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    /// Raw values in [`HEADER_PARAMETERS`] order, starting with `reltime`
    pub parameters: Vec<i64>,
}

impl HeaderRecord {
    /// Decode a `#`-prefixed header line
    pub fn decode(line: &str, line_number: usize) -> Result<Self> {
        if line.len() < HEADER_WIDTH {
            return Err(IgraError::malformed(
                line_number,
                "header",
                format!(
                    "record is {} characters, expected {}",
                    line.len(),
                    HEADER_WIDTH
                ),
            ));
        }

        let station_id = STATION_ID
            .slice(line)
            .ok_or_else(|| IgraError::malformed(line_number, STATION_ID.name, "not ASCII text"))?
            .trim()
            .to_string();

        Ok(Self {
            station_id,
            year: narrow(YEAR.parse(line, line_number)?, YEAR.name, line_number)?,
            month: narrow(MONTH.parse(line, line_number)?, MONTH.name, line_number)?,
            day: narrow(DAY.parse(line, line_number)?, DAY.name, line_number)?,
            hour: narrow(HOUR.parse(line, line_number)?, HOUR.name, line_number)?,
            parameters: HEADER_PARAMETERS.decode(line, line_number)?,
        })
    }

    /// Render the record back into its 157-column layout
    pub fn encode(&self) -> Result<String> {
        let mut buffer = vec![b' '; HEADER_WIDTH];
        buffer[0] = HEADER_MARKER as u8;

        let id = format!("{:<width$}", self.station_id, width = STATION_ID.width());
        if id.len() != STATION_ID.width() || !id.is_ascii() {
            return Err(IgraError::malformed(
                0,
                STATION_ID.name,
                format!("'{}' is not an 11-character ASCII identifier", self.station_id),
            ));
        }
        buffer[STATION_ID.range()].copy_from_slice(id.as_bytes());

        for (field, value) in [
            (YEAR, i64::from(self.year)),
            (MONTH, i64::from(self.month)),
            (DAY, i64::from(self.day)),
            (HOUR, i64::from(self.hour)),
        ] {
            buffer[field.range()].copy_from_slice(field.render(value)?.as_bytes());
        }
        HEADER_PARAMETERS.render_into(&mut buffer, &self.parameters)?;

        // Only ASCII was written into an ASCII buffer
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }

    /// Release time as stored (HHMM)
    pub fn release_time(&self) -> i64 {
        self.parameters[0]
    }

    /// NUMLEV as stored
    pub fn declared_levels(&self) -> i64 {
        self.parameters[1]
    }

    /// The `HHMMSS` string the sounding timestamp is built from
    ///
    /// An unknown hour (99) is replaced by the release time. Any "99" left
    /// in the result comes from an irregular release time and is zeroed.
    pub fn time_string(&self) -> String {
        let time = if self.hour == MISSING_HOUR {
            format!("{:04}00", self.release_time())
        } else {
            format!("{:02}0000", self.hour)
        };

        if time.contains("99") {
            time.replace("99", "00")
        } else {
            time
        }
    }

    /// Sounding timestamp, the join key between headers and levels
    pub fn timestamp(&self, line_number: usize) -> Result<NaiveDateTime> {
        let value = format!(
            "{:04}{:02}{:02}{}",
            self.year,
            self.month,
            self.day,
            self.time_string()
        );

        NaiveDateTime::parse_from_str(&value, "%Y%m%d%H%M%S").map_err(|source| {
            IgraError::InvalidTimestamp {
                line: line_number,
                value,
                source,
            }
        })
    }
}

/// Raw contents of one level record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelRecord {
    /// Raw values in [`LEVEL_FIELDS`] order
    pub values: Vec<i64>,
}

impl LevelRecord {
    pub fn decode(line: &str, line_number: usize) -> Result<Self> {
        if line.len() < LEVEL_WIDTH {
            return Err(IgraError::malformed(
                line_number,
                "level",
                format!(
                    "record is {} characters, expected {}",
                    line.len(),
                    LEVEL_WIDTH
                ),
            ));
        }

        Ok(Self {
            values: LEVEL_FIELDS.decode(line, line_number)?,
        })
    }

    /// Render the record back into its 151-column layout
    pub fn encode(&self) -> Result<String> {
        let mut buffer = vec![b' '; LEVEL_WIDTH];
        LEVEL_FIELDS.render_into(&mut buffer, &self.values)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

fn narrow<T: TryFrom<i64>>(value: i64, field: &'static str, line_number: usize) -> Result<T> {
    T::try_from(value)
        .map_err(|_| IgraError::malformed(line_number, field, format!("{} is out of range", value)))
}

/// Sounding timestamps of a parsed table's `date` column, in row order
pub fn timestamps(frame: &DataFrame) -> Result<Vec<NaiveDateTime>> {
    let column = frame.column(DATE_COLUMN)?;
    let unit = match column.dtype() {
        DataType::Datetime(unit, _) => *unit,
        other => {
            return Err(IgraError::Configuration {
                message: format!("column '{}' has type {}, expected a datetime", DATE_COLUMN, other),
            });
        }
    };

    let raw = column.cast(&DataType::Int64)?;
    raw.as_materialized_series()
        .i64()?
        .into_iter()
        .map(|value| {
            let converted = value.and_then(|v| match unit {
                TimeUnit::Nanoseconds => Some(DateTime::from_timestamp_nanos(v)),
                TimeUnit::Microseconds => DateTime::from_timestamp_micros(v),
                TimeUnit::Milliseconds => DateTime::from_timestamp_millis(v),
            });
            converted
                .map(|dt| dt.naive_utc())
                .ok_or_else(|| IgraError::Configuration {
                    message: format!("column '{}' contains a missing timestamp", DATE_COLUMN),
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const STATION: &str = "USM00072201";

    fn sentinel_header_parameters(reltime: i64, numlev: i64, pw: i64) -> Vec<i64> {
        let mut parameters = vec![-99999; HEADER_PARAMETERS.len()];
        parameters[0] = reltime;
        parameters[1] = numlev;
        parameters[2] = pw;
        parameters
    }

    fn header(year: i32, month: u32, day: u32, hour: u32, parameters: Vec<i64>) -> HeaderRecord {
        HeaderRecord {
            station_id: STATION.to_string(),
            year,
            month,
            day,
            hour,
            parameters,
        }
    }

    fn level(press: i64) -> LevelRecord {
        let mut values = vec![-9999; LEVEL_FIELDS.len()];
        values[0] = press;
        LevelRecord { values }
    }

    fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn archive(lines: &[String]) -> String {
        let mut text = lines.join("\n");
        text.push('\n');
        text
    }

    // A header line as it appears in the NOAA files
    const REAL_HEADER: &str = "#USM00072201 2008 01 01 00 2302   61   2016 97810   292    24 92800   792 62290  3934 95710   493-99999-99999-99999-99999    -2     0    29    47   285     0";

    #[test]
    fn test_decode_real_header_line() {
        assert_eq!(REAL_HEADER.len(), HEADER_WIDTH);

        let record = HeaderRecord::decode(REAL_HEADER, 1).unwrap();
        assert_eq!(record.station_id, STATION);
        assert_eq!((record.year, record.month, record.day, record.hour), (2008, 1, 1, 0));
        assert_eq!(record.release_time(), 2302);
        assert_eq!(record.declared_levels(), 61);
        assert_eq!(record.parameters[2], 2016);
        assert_eq!(record.parameters[HEADER_PARAMETERS.len() - 2], 285);
    }

    #[test]
    fn test_header_round_trip_reproduces_line() {
        let record = HeaderRecord::decode(REAL_HEADER, 1).unwrap();
        assert_eq!(record.encode().unwrap(), REAL_HEADER);
    }

    #[test]
    fn test_level_round_trip_reproduces_line() {
        let line = level(101300).encode().unwrap();
        assert_eq!(line.len(), LEVEL_WIDTH);
        assert_eq!(&line[0..7], " 101300");

        let decoded = LevelRecord::decode(&line, 1).unwrap();
        assert_eq!(decoded, level(101300));
        assert_eq!(decoded.encode().unwrap(), line);
    }

    #[test]
    fn test_time_string_hour_substitution() {
        let missing_hour = header(2020, 1, 1, 99, sentinel_header_parameters(530, 0, 0));
        assert_eq!(missing_hour.time_string(), "053000");

        let known_hour = header(2020, 1, 1, 12, sentinel_header_parameters(530, 0, 0));
        assert_eq!(known_hour.time_string(), "120000");

        let both_missing = header(2020, 1, 1, 99, sentinel_header_parameters(9999, 0, 0));
        assert_eq!(both_missing.time_string(), "000000");

        // Irregular minutes are zeroed
        let odd_minutes = header(2020, 1, 1, 99, sentinel_header_parameters(1199, 0, 0));
        assert_eq!(odd_minutes.time_string(), "110000");
    }

    #[test]
    fn test_timestamp() {
        let record = header(2020, 1, 1, 99, sentinel_header_parameters(530, 0, 0));
        assert_eq!(record.timestamp(1).unwrap(), at(2020, 1, 1, 5, 30));

        let bad_date = header(2020, 2, 30, 0, sentinel_header_parameters(0, 0, 0));
        assert!(matches!(
            bad_date.timestamp(7),
            Err(IgraError::InvalidTimestamp { line: 7, .. })
        ));
    }

    #[test]
    fn test_round_trip_scenario() {
        let lines = [
            header(2020, 1, 1, 0, sentinel_header_parameters(0, -9999, 150))
                .encode()
                .unwrap(),
            level(101300).encode().unwrap(),
        ];

        let parsed = SoundingParser::default()
            .parse_text(&archive(&lines), true)
            .unwrap();

        let headers = &parsed.headers;
        assert_eq!(headers.height(), 1);
        assert_eq!(timestamps(headers).unwrap(), vec![at(2020, 1, 1, 0, 0)]);
        assert_eq!(
            headers.column("pw_mm").unwrap().get(0).unwrap(),
            AnyValue::Float64(1.5)
        );
        assert_eq!(
            headers.column("reltime").unwrap().get(0).unwrap(),
            AnyValue::Float64(0.0)
        );
        for name in HEADER_PARAMETERS.column_names() {
            if name == "pw_mm" || name == "reltime" {
                continue;
            }
            assert_eq!(
                headers.column(name).unwrap().null_count(),
                1,
                "{} should be missing",
                name
            );
        }

        let levels = parsed.levels.unwrap();
        assert_eq!(levels.height(), 1);
        assert_eq!(timestamps(&levels).unwrap(), vec![at(2020, 1, 1, 0, 0)]);
        assert_eq!(
            levels.column("press").unwrap().get(0).unwrap(),
            AnyValue::Float64(101300.0)
        );
        for name in LEVEL_FIELDS.column_names().skip(1) {
            assert_eq!(levels.column(name).unwrap().null_count(), 1);
        }
    }

    #[test]
    fn test_header_table_columns() {
        let lines = [header(2020, 1, 1, 0, sentinel_header_parameters(0, 0, 150))
            .encode()
            .unwrap()];
        let parsed = SoundingParser::default()
            .parse_text(&archive(&lines), false)
            .unwrap();

        let names: Vec<String> = parsed
            .headers
            .get_column_names()
            .iter()
            .map(|n| n.to_string())
            .collect();

        assert_eq!(names[0], DATE_COLUMN);
        assert_eq!(names[1..], HEADER_PARAMETERS.column_names().collect::<Vec<_>>()[..]);
        assert!(names.contains(&"invtempdif_dC".to_string()));
        assert!(!names.contains(&"pw".to_string()));
        assert!(!names.contains(&"ID".to_string()));
    }

    #[test]
    fn test_unit_rescaling() {
        let mut parameters = sentinel_header_parameters(1130, 0, 2016);
        parameters[5] = 24; // invtempdif, K*10
        let lines = [
            header(2008, 1, 1, 12, parameters).encode().unwrap(),
            // PW missing, invtempdif left at -99999
            header(2008, 1, 2, 0, sentinel_header_parameters(2302, 0, -9999))
                .encode()
                .unwrap(),
        ];

        let parsed = SoundingParser::default()
            .parse_text(&archive(&lines), false)
            .unwrap();

        assert_eq!(
            parsed.headers.column("pw_mm").unwrap().get(0).unwrap(),
            AnyValue::Float64(2016.0 / 100.0)
        );
        assert_eq!(
            parsed.headers.column("invtempdif_dC").unwrap().get(0).unwrap(),
            AnyValue::Float64(24.0 / 10.0)
        );
        assert_eq!(
            parsed.headers.column("reltime").unwrap().get(0).unwrap(),
            AnyValue::Float64(1130.0)
        );

        assert_eq!(
            parsed.headers.column("pw_mm").unwrap().get(1).unwrap(),
            AnyValue::Null
        );
        assert_eq!(
            parsed.headers.column("invtempdif_dC").unwrap().get(1).unwrap(),
            AnyValue::Null
        );
        assert_eq!(parsed.headers.column("pw_mm").unwrap().null_count(), 1);
    }

    #[test]
    fn test_missing_release_time_is_masked() {
        let lines = [header(2008, 1, 1, 12, sentinel_header_parameters(9999, 0, 0))
            .encode()
            .unwrap()];
        let parsed = SoundingParser::default()
            .parse_text(&archive(&lines), false)
            .unwrap();

        assert_eq!(
            parsed.headers.column("reltime").unwrap().get(0).unwrap(),
            AnyValue::Null
        );
        // numlev and pw are 0, not sentinels
        assert_eq!(
            parsed.headers.column("numlev").unwrap().get(0).unwrap(),
            AnyValue::Float64(0.0)
        );
    }

    #[test]
    fn test_levels_attach_to_preceding_header() {
        let lines = [
            header(2020, 1, 1, 0, sentinel_header_parameters(0, 2, 0))
                .encode()
                .unwrap(),
            level(100000).encode().unwrap(),
            level(85000).encode().unwrap(),
            header(2020, 1, 1, 12, sentinel_header_parameters(1100, 1, 0))
                .encode()
                .unwrap(),
            level(99000).encode().unwrap(),
        ];

        let parsed = SoundingParser::default()
            .parse_text(&archive(&lines), true)
            .unwrap();

        let a = at(2020, 1, 1, 0, 0);
        let b = at(2020, 1, 1, 12, 0);
        assert_eq!(timestamps(&parsed.headers).unwrap(), vec![a, b]);

        let levels = parsed.levels.unwrap();
        assert_eq!(timestamps(&levels).unwrap(), vec![a, a, b]);
        assert_eq!(
            levels.column("press").unwrap().get(2).unwrap(),
            AnyValue::Float64(99000.0)
        );
        assert_eq!(parsed.stats.level_records, 3);
        assert_eq!(parsed.stats.level_count_mismatches, 0);
        assert_eq!(parsed.station_id.as_deref(), Some(STATION));
    }

    #[test]
    fn test_duplicate_timestamps_are_preserved() {
        let line = header(2020, 1, 1, 0, sentinel_header_parameters(0, 0, 0))
            .encode()
            .unwrap();
        let parsed = SoundingParser::default()
            .parse_text(&archive(&[line.clone(), line]), false)
            .unwrap();

        assert_eq!(parsed.headers.height(), 2);
    }

    #[test]
    fn test_levels_skipped_when_not_requested() {
        let lines = [
            header(2020, 1, 1, 0, sentinel_header_parameters(0, 1, 0))
                .encode()
                .unwrap(),
            // Not decoded, so not an error
            "garbage".to_string(),
        ];

        let parsed = SoundingParser::default()
            .parse_text(&archive(&lines), false)
            .unwrap();

        assert!(parsed.levels.is_none());
        assert_eq!(parsed.stats.skipped_level_records, 1);
        assert_eq!(parsed.stats.level_count_mismatches, 0);
    }

    #[test]
    fn test_level_count_mismatch_is_counted_not_fatal() {
        let lines = [
            header(2020, 1, 1, 0, sentinel_header_parameters(0, 5, 0))
                .encode()
                .unwrap(),
            level(100000).encode().unwrap(),
        ];

        let parsed = SoundingParser::default()
            .parse_text(&archive(&lines), true)
            .unwrap();
        assert_eq!(parsed.stats.level_count_mismatches, 1);
    }

    #[test]
    fn test_malformed_level_line_reports_line_number() {
        let mut bad_level = level(100000).encode().unwrap();
        bad_level.replace_range(8..15, "  12x45");
        let lines = [
            header(2020, 1, 1, 0, sentinel_header_parameters(0, 1, 0))
                .encode()
                .unwrap(),
            bad_level,
        ];

        match SoundingParser::default()
            .parse_text(&archive(&lines), true)
            .unwrap_err()
        {
            IgraError::MalformedRecord { line, field, .. } => {
                assert_eq!(line, 2);
                assert_eq!(field, "repgph");
            }
            other => panic!("Expected MalformedRecord error, got {:?}", other),
        }
    }

    #[test]
    fn test_short_header_line_is_malformed() {
        let truncated = &REAL_HEADER[..100];
        assert!(matches!(
            SoundingParser::default().parse_text(truncated, false),
            Err(IgraError::MalformedRecord { line: 1, .. })
        ));
    }

    #[test]
    fn test_level_before_header_is_malformed() {
        let lines = [level(100000).encode().unwrap()];
        assert!(matches!(
            SoundingParser::default().parse_text(&archive(&lines), true),
            Err(IgraError::MalformedRecord { line: 1, .. })
        ));
    }

    #[test]
    fn test_custom_sentinels() {
        let config = ParserConfig {
            header_sentinels: vec![],
            level_sentinels: vec![100000.0],
        };
        let lines = [
            header(2020, 1, 1, 0, sentinel_header_parameters(0, 1, 0))
                .encode()
                .unwrap(),
            level(100000).encode().unwrap(),
        ];

        let parsed = SoundingParser::new(config)
            .parse_text(&archive(&lines), true)
            .unwrap();

        // Header sentinels disabled: -99999 survives
        assert_eq!(
            parsed.headers.column("cape").unwrap().get(0).unwrap(),
            AnyValue::Float64(-99999.0)
        );
        let levels = parsed.levels.unwrap();
        assert_eq!(levels.column("press").unwrap().null_count(), 1);
        assert_eq!(
            levels.column("temp").unwrap().get(0).unwrap(),
            AnyValue::Float64(-9999.0)
        );
    }

    #[test]
    fn test_empty_archive() {
        let parsed = SoundingParser::default().parse_text("", true).unwrap();
        assert_eq!(parsed.headers.height(), 0);
        assert_eq!(parsed.levels.unwrap().height(), 0);
        assert!(parsed.station_id.is_none());
    }
}
