//! Fixed-width record layouts for IGRA v2 derived-parameter files.
//!
//! Every column of both record kinds is described once, in a declarative
//! [`FieldSpec`] table. A single slice-and-convert routine
//! ([`FieldSpec::parse`]) decodes any field, and the same tables drive
//! rendering records back into their column layout, the output column
//! names, and the unit rescaling applied to the finished header table.
//!
//! Column positions are 1-based and inclusive, exactly as printed in the
//! NOAA format description.

use crate::error::{IgraError, Result};
use polars::prelude::*;
use std::ops::Range;

/// First character of every header record
pub const HEADER_MARKER: char = '#';

/// Name of the sounding timestamp column in both output tables
pub const DATE_COLUMN: &str = "date";

/// Hour value meaning "hour unknown, use the release time"
pub const MISSING_HOUR: u32 = 99;

/// Release time value meaning "release time unknown"
pub const MISSING_RELEASE_TIME: f64 = 9999.0;

/// Sentinels that mark a missing level value
pub const LEVEL_SENTINELS: [f64; 4] = [-999.9, -9999.0, -8888.0, -888.8];

/// Sentinels that mark a missing header value
pub const HEADER_SENTINELS: [f64; 6] = [-999.9, -9999.0, -8888.0, -888.8, -99999.0, -999999.0];

/// One fixed-width column of a record
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    /// Field name as stored in the file (also used for errors)
    pub name: &'static str,
    /// Column name in the output table
    pub column: &'static str,
    /// First column, 1-based
    pub start: usize,
    /// Last column, 1-based and inclusive
    pub end: usize,
    /// Divisor applied to the raw integer to reach `unit`
    pub scale: f64,
    /// Unit of the output column
    pub unit: &'static str,
    /// Rendered with leading zeros instead of leading blanks
    pub zero_padded: bool,
}

impl FieldSpec {
    const fn new(name: &'static str, start: usize, end: usize, unit: &'static str) -> Self {
        Self {
            name,
            column: name,
            start,
            end,
            scale: 1.0,
            unit,
            zero_padded: false,
        }
    }

    const fn scaled(
        name: &'static str,
        column: &'static str,
        start: usize,
        end: usize,
        scale: f64,
        unit: &'static str,
    ) -> Self {
        Self {
            name,
            column,
            start,
            end,
            scale,
            unit,
            zero_padded: false,
        }
    }

    const fn zero_padded(mut self) -> Self {
        self.zero_padded = true;
        self
    }

    /// Number of characters the field occupies
    pub fn width(&self) -> usize {
        self.end - self.start + 1
    }

    /// 0-based byte range of the field within a line
    pub fn range(&self) -> Range<usize> {
        self.start - 1..self.end
    }

    /// Whether the output column is a rescaled/renamed version of the raw field
    pub fn is_rescaled(&self) -> bool {
        self.scale != 1.0 || self.column != self.name
    }

    /// Exact column slice of this field, if the line is long enough
    pub fn slice<'a>(&self, line: &'a str) -> Option<&'a str> {
        line.get(self.range())
    }

    /// Decode this field from a line as an integer
    ///
    /// Blanks inside the slice are padding; anything else that is not an
    /// integer is a malformed record.
    pub fn parse(&self, line: &str, line_number: usize) -> Result<i64> {
        let slice = self.slice(line).ok_or_else(|| {
            IgraError::malformed(
                line_number,
                self.name,
                format!(
                    "columns {}-{} are not available in a {}-character line",
                    self.start,
                    self.end,
                    line.len()
                ),
            )
        })?;

        slice.trim().parse::<i64>().map_err(|e| {
            IgraError::malformed(
                line_number,
                self.name,
                format!("'{}' is not an integer ({})", slice, e),
            )
        })
    }

    /// Render a raw value right-aligned in this field's width
    pub fn render(&self, value: i64) -> Result<String> {
        let width = self.width();
        let text = if self.zero_padded {
            format!("{:0width$}", value)
        } else {
            format!("{:>width$}", value)
        };

        if text.len() > width {
            return Err(IgraError::FieldOverflow {
                field: self.name,
                value,
                width,
            });
        }
        Ok(text)
    }

    /// Expression turning the raw column into the output column
    fn output_expr(&self) -> Expr {
        if self.scale != 1.0 {
            (col(self.name) / lit(self.scale)).alias(self.column)
        } else {
            col(self.name).alias(self.column)
        }
    }
}

/// Ordered set of numeric fields making up one record kind
#[derive(Debug)]
pub struct RecordLayout {
    pub fields: &'static [FieldSpec],
}

impl RecordLayout {
    /// Number of fields in the layout
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Last column used by any field
    pub fn width(&self) -> usize {
        self.fields.iter().map(|f| f.end).max().unwrap_or(0)
    }

    /// Field names as stored in the file
    pub fn raw_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|f| f.name)
    }

    /// Column names of the finished table, in layout order
    pub fn column_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|f| f.column)
    }

    /// `(column, unit)` pairs of the finished table, skipping unitless fields
    pub fn units(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        self.fields
            .iter()
            .filter(|f| !f.unit.is_empty())
            .map(|f| (f.column, f.unit))
    }

    /// Look up a field by its stored name
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Decode every field of a line
    pub fn decode(&self, line: &str, line_number: usize) -> Result<Vec<i64>> {
        self.fields
            .iter()
            .map(|field| field.parse(line, line_number))
            .collect()
    }

    /// Write rendered values into their columns of `buffer`
    ///
    /// `buffer` must already be at least [`RecordLayout::width`] bytes of ASCII.
    pub fn render_into(&self, buffer: &mut [u8], values: &[i64]) -> Result<()> {
        for (field, value) in self.fields.iter().zip(values) {
            let text = field.render(*value)?;
            buffer[field.range()].copy_from_slice(text.as_bytes());
        }
        Ok(())
    }

    /// Expressions selecting the date column followed by every output column
    pub fn output_exprs(&self) -> Vec<Expr> {
        std::iter::once(col(DATE_COLUMN))
            .chain(self.fields.iter().map(FieldSpec::output_expr))
            .collect()
    }
}

/// Station identifier of a header record (text, not numeric)
pub const STATION_ID: FieldSpec = FieldSpec::new("ID", 2, 12, "");
pub const YEAR: FieldSpec = FieldSpec::new("YEAR", 14, 17, "").zero_padded();
pub const MONTH: FieldSpec = FieldSpec::new("MONTH", 19, 20, "").zero_padded();
pub const DAY: FieldSpec = FieldSpec::new("DAY", 22, 23, "").zero_padded();
pub const HOUR: FieldSpec = FieldSpec::new("HOUR", 25, 26, "UTC hour").zero_padded();

/// Width of a complete header record
pub const HEADER_WIDTH: usize = 157;

/// Width of a complete level record
pub const LEVEL_WIDTH: usize = 151;

/// Numeric header fields that become columns of the header table
pub static HEADER_PARAMETERS: RecordLayout = RecordLayout {
    fields: &[
        FieldSpec::new("reltime", 28, 31, "HHMM UTC").zero_padded(),
        FieldSpec::new("numlev", 32, 36, "count"),
        FieldSpec::scaled("pw", "pw_mm", 38, 43, 100.0, "mm"),
        FieldSpec::new("invpress", 44, 49, "Pa"),
        FieldSpec::new("invhgt", 50, 55, "m"),
        FieldSpec::scaled("invtempdif", "invtempdif_dC", 56, 61, 10.0, "degC"),
        FieldSpec::new("mixpress", 62, 67, "Pa"),
        FieldSpec::new("mixhgt", 68, 73, "m"),
        FieldSpec::new("frzpress", 74, 79, "Pa"),
        FieldSpec::new("frzhgt", 80, 85, "m"),
        FieldSpec::new("lclpress", 86, 91, "Pa"),
        FieldSpec::new("lclhgt", 92, 97, "m"),
        FieldSpec::new("lfcpress", 98, 103, "Pa"),
        FieldSpec::new("lfchgt", 104, 109, "m"),
        FieldSpec::new("lnbp", 110, 115, "Pa"),
        FieldSpec::new("lnbhgt", 116, 121, "m"),
        FieldSpec::new("li", 122, 127, "degC"),
        FieldSpec::new("si", 128, 133, "degC"),
        FieldSpec::new("ki", 134, 139, "degC"),
        FieldSpec::new("tti", 140, 145, "degC"),
        FieldSpec::new("cape", 146, 151, "J/kg"),
        FieldSpec::new("cin", 152, 157, "J/kg"),
    ],
};

/// Fields of a level record
pub static LEVEL_FIELDS: RecordLayout = RecordLayout {
    fields: &[
        FieldSpec::new("press", 1, 7, "Pa"),
        FieldSpec::new("repgph", 9, 15, "m"),
        FieldSpec::new("calcgph", 17, 23, "m"),
        FieldSpec::new("temp", 25, 31, "K*10"),
        FieldSpec::new("tempgrad", 33, 39, "K/km*10"),
        FieldSpec::new("ptemp", 41, 47, "K*10"),
        FieldSpec::new("ptempgrad", 49, 55, "K/km*10"),
        FieldSpec::new("vtemp", 57, 63, "K*10"),
        FieldSpec::new("vptemp", 65, 71, "K*10"),
        FieldSpec::new("vappress", 73, 79, "mb*1000"),
        FieldSpec::new("satvp", 81, 87, "mb*1000"),
        FieldSpec::new("reprh", 89, 95, "%*10"),
        FieldSpec::new("calcrh", 97, 103, "%*10"),
        FieldSpec::new("rhgrad", 105, 111, "%/km*10"),
        FieldSpec::new("uwnd", 113, 119, "m/s*10"),
        FieldSpec::new("uwndgrad", 121, 127, "m/s/km*10"),
        FieldSpec::new("vwnd", 129, 135, "m/s*10"),
        FieldSpec::new("vwndgrad", 137, 143, "m/s/km*10"),
        FieldSpec::new("n", 145, 151, ""),
    ],
};

/// Expression replacing any of `sentinels` in column `name` with null
pub fn sentinel_expr(name: &str, sentinels: &[f64]) -> Expr {
    let is_sentinel = sentinels
        .iter()
        .fold(lit(false), |acc, sentinel| acc.or(col(name).eq(lit(*sentinel))));

    when(is_sentinel)
        .then(lit(NULL))
        .otherwise(col(name))
        .alias(name)
}

/// Replace sentinel values with null in every floating point column
///
/// Non-float columns (the timestamp) pass through untouched, as does every
/// value not in `sentinels`.
pub fn mask_sentinels(frame: DataFrame, sentinels: &[f64]) -> PolarsResult<DataFrame> {
    let exprs: Vec<Expr> = frame
        .get_columns()
        .iter()
        .filter(|column| column.dtype().is_float())
        .map(|column| sentinel_expr(column.name().as_str(), sentinels))
        .collect();

    if exprs.is_empty() {
        return Ok(frame);
    }

    frame.lazy().with_columns(exprs).collect()
}
