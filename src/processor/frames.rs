//! Table transforms applied between parsing and writing.
//!
//! All functions take and return eager frames and keep row order, so
//! soundings stay in file order and duplicate timestamps survive.

use crate::models::TimeWindow;
use crate::schema::DATE_COLUMN;
use chrono::{Duration, NaiveDateTime};
use polars::prelude::*;

/// Name of the synoptic hour column added to derived-parameter output
pub const HOUR_COLUMN: &str = "hour";

/// Rows whose `date` falls inside the window, the last day padded by `padding_hours`
pub fn subset_window(
    frame: DataFrame,
    window: &TimeWindow,
    padding_hours: i64,
) -> PolarsResult<DataFrame> {
    let first = window.first_instant();
    let last = window.last_instant(padding_hours);

    frame
        .lazy()
        .filter(
            col(DATE_COLUMN)
                .gt_eq(lit(first))
                .and(col(DATE_COLUMN).lt_eq(lit(last))),
        )
        .collect()
}

/// Insert the sounding hour after `date` and floor `date` to the calendar day
pub fn with_daily_index(frame: DataFrame) -> PolarsResult<DataFrame> {
    let mut exprs = vec![
        col(DATE_COLUMN).dt().date().alias(DATE_COLUMN),
        col(DATE_COLUMN)
            .dt()
            .hour()
            .cast(DataType::Int32)
            .alias(HOUR_COLUMN),
    ];
    exprs.extend(
        frame
            .get_column_names()
            .into_iter()
            .filter(|name| name.as_str() != DATE_COLUMN)
            .map(|name| col(name.clone())),
    );

    frame.lazy().select(exprs).collect()
}

/// Rows of a daily-indexed frame launched at `hour`
pub fn filter_hour(frame: &DataFrame, hour: u32) -> PolarsResult<DataFrame> {
    frame
        .clone()
        .lazy()
        .filter(col(HOUR_COLUMN).eq(lit(hour as i32)))
        .collect()
}

/// Level rows strictly within `tolerance_minutes` of `sounding`, without `date`
pub fn profile_levels(
    levels: &DataFrame,
    sounding: NaiveDateTime,
    tolerance_minutes: i64,
) -> PolarsResult<DataFrame> {
    let tolerance = Duration::minutes(tolerance_minutes);

    levels
        .clone()
        .lazy()
        .filter(
            col(DATE_COLUMN)
                .gt(lit(sounding - tolerance))
                .and(col(DATE_COLUMN).lt(lit(sounding + tolerance))),
        )
        .collect()?
        .drop(DATE_COLUMN)
}

/// `(column, value)` pairs of one header row, `date` excluded
///
/// Missing values are rendered as `missing_value`.
pub fn header_row(
    headers: &DataFrame,
    row: usize,
    missing_value: &str,
) -> PolarsResult<Vec<(String, String)>> {
    headers
        .get_columns()
        .iter()
        .filter(|column| column.name().as_str() != DATE_COLUMN)
        .map(|column| {
            let value = match column.get(row)? {
                AnyValue::Null => missing_value.to_string(),
                AnyValue::Float64(v) if v.is_nan() => missing_value.to_string(),
                AnyValue::Float64(v) => v.to_string(),
                other => other.to_string(),
            };
            Ok((column.name().to_string(), value))
        })
        .collect()
}
