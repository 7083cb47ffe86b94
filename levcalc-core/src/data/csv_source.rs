//! CSV series parser.
//!
//! Reads row-oriented price or rate exports: a header row, the date in
//! column 0 and the value in column 1. Remaining columns are ignored. Both
//! fields may be quoted, and values may carry thousands separators or a
//! trailing percent sign (`"3,257.85"`, `"1.52%"`).

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::domain::{CalendarDate, CalendarSeries, SeriesBuilder, SeriesError};

pub const DEFAULT_DATE_FORMAT: &str = "%m/%d/%Y";

#[derive(Debug, Error)]
pub enum DataError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("line {line}: expected a date and a value column")]
    MissingColumn { line: u64 },

    #[error("line {line}: invalid date '{value}'")]
    InvalidDate { line: u64, value: String },

    #[error("line {line}: invalid value '{value}'")]
    InvalidValue { line: u64, value: String },

    #[error("line {line}: {source}")]
    Series {
        line: u64,
        #[source]
        source: SeriesError,
    },
}

/// Parser options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsvOptions {
    /// chrono format string for column 0.
    pub date_format: String,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            date_format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }
}

impl CsvOptions {
    pub fn with_date_format(date_format: impl Into<String>) -> Self {
        Self {
            date_format: date_format.into(),
        }
    }
}

/// What the parser saw.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseReport {
    /// Data rows read (header excluded).
    pub rows: usize,
    /// Rows whose date had already been seen; the later row wins.
    pub duplicates: usize,
    pub first: Option<CalendarDate>,
    pub last: Option<CalendarDate>,
}

#[derive(Debug, Clone)]
pub struct ParsedSeries {
    pub series: CalendarSeries,
    pub report: ParseReport,
}

/// Open `path` and parse it.
pub fn load_calendar_csv(path: &Path, options: &CsvOptions) -> Result<ParsedSeries, DataError> {
    let file = File::open(path).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed = parse_calendar_csv(BufReader::new(file), options)?;
    debug!(
        path = %path.display(),
        rows = parsed.report.rows,
        duplicates = parsed.report.duplicates,
        "series loaded"
    );
    Ok(parsed)
}

/// Parse CSV from any reader. The first row is treated as a header.
pub fn parse_calendar_csv<R: Read>(reader: R, options: &CsvOptions) -> Result<ParsedSeries, DataError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut builder = SeriesBuilder::new();
    let mut rows = 0usize;

    for record in rdr.records() {
        let record = record?;
        let line = record.position().map_or(0, |p| p.line());

        let (Some(raw_date), Some(raw_value)) = (record.get(0), record.get(1)) else {
            return Err(DataError::MissingColumn { line });
        };

        let date = NaiveDate::parse_from_str(raw_date, &options.date_format).map_err(|_| {
            DataError::InvalidDate {
                line,
                value: raw_date.to_string(),
            }
        })?;
        let value = parse_value(raw_value).ok_or_else(|| DataError::InvalidValue {
            line,
            value: raw_value.to_string(),
        })?;

        builder
            .insert_close(date, value)
            .map_err(|source| DataError::Series { line, source })?;
        rows += 1;
    }

    let duplicates = builder.duplicates();
    let series = builder.build();
    let report = ParseReport {
        rows,
        duplicates,
        first: series.first_date(),
        last: series.last_date(),
    };
    Ok(ParsedSeries { series, report })
}

/// Strip thousands separators and a trailing `%`, keep the sign.
fn parse_value(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_suffix('%').unwrap_or(trimmed).trim_end();
    if trimmed.is_empty() {
        return None;
    }
    let cleaned: String = trimmed.chars().filter(|&c| c != ',').collect();
    cleaned.parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRICE_EXPORT: &str = "\
\"Date\",\"Price\",\"Open\",\"High\",\"Low\",\"Vol.\",\"Change %\"
\"01/03/2020\",\"3,234.85\",\"3,226.36\",\"3,246.15\",\"3,222.34\",\"-\",\"-0.71%\"
\"01/02/2020\",\"3,257.85\",\"3,244.67\",\"3,258.14\",\"3,235.53\",\"-\",\"0.84%\"
\"12/31/2019\",\"3,230.78\",\"3,215.18\",\"3,231.72\",\"3,212.03\",\"-\",\"0.29%\"
";

    fn parse(text: &str) -> Result<ParsedSeries, DataError> {
        parse_calendar_csv(text.as_bytes(), &CsvOptions::default())
    }

    #[test]
    fn parses_quoted_export_with_thousands_separators() {
        let parsed = parse(PRICE_EXPORT).unwrap();
        assert_eq!(parsed.report.rows, 3);
        assert_eq!(parsed.report.duplicates, 0);

        let d = CalendarDate::new(2020, 0, 2).unwrap();
        assert_eq!(parsed.series.get(d).unwrap().close, 3257.85);
        assert!(parsed.series.has_year(2019));
        assert_eq!(parsed.report.first, CalendarDate::new(2019, 11, 31).ok());
        assert_eq!(parsed.report.last, CalendarDate::new(2020, 0, 3).ok());
    }

    #[test]
    fn header_only_yields_empty_series() {
        let parsed = parse("Date,Price\n").unwrap();
        assert!(parsed.series.is_empty());
        assert_eq!(parsed.report.first, None);
    }

    #[test]
    fn percent_suffix_and_sign_are_handled() {
        let parsed = parse("Date,Rate\n01/02/2020,1.52%\n01/03/2020,-0.25\n").unwrap();
        let get = |d| parsed.series.get(CalendarDate::new(2020, 0, d).unwrap()).unwrap().close;
        assert_eq!(get(2), 1.52);
        assert_eq!(get(3), -0.25);
    }

    #[test]
    fn later_duplicate_wins() {
        let parsed = parse("Date,Price\n01/02/2020,1.0\n01/02/2020,2.0\n").unwrap();
        assert_eq!(parsed.report.rows, 2);
        assert_eq!(parsed.report.duplicates, 1);
        assert_eq!(parsed.series.len(), 1);
        let d = CalendarDate::new(2020, 0, 2).unwrap();
        assert_eq!(parsed.series.get(d).unwrap().close, 2.0);
    }

    #[test]
    fn custom_date_format() {
        let options = CsvOptions::with_date_format("%Y-%m-%d");
        let parsed = parse_calendar_csv("date,close\n2020-01-02,10\n".as_bytes(), &options).unwrap();
        assert!(parsed.series.contains(CalendarDate::new(2020, 0, 2).unwrap()));
    }

    #[test]
    fn bad_date_reports_line() {
        let err = parse("Date,Price\n01/02/2020,1\n2020-01-03,2\n").unwrap_err();
        match err {
            DataError::InvalidDate { line, value } => {
                assert_eq!(line, 3);
                assert_eq!(value, "2020-01-03");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn bad_value_is_rejected() {
        let err = parse("Date,Price\n01/02/2020,n/a\n").unwrap_err();
        assert!(matches!(err, DataError::InvalidValue { line: 2, .. }));

        let err = parse("Date,Price\n01/02/2020,\n").unwrap_err();
        assert!(matches!(err, DataError::InvalidValue { .. }));
    }

    #[test]
    fn non_finite_value_is_rejected() {
        let err = parse("Date,Price\n01/02/2020,inf\n").unwrap_err();
        assert!(matches!(err, DataError::Series { line: 2, .. }));
    }

    #[test]
    fn single_column_row_is_rejected() {
        let err = parse("Date,Price\n01/02/2020\n").unwrap_err();
        assert!(matches!(err, DataError::MissingColumn { line: 2 }));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_calendar_csv(Path::new("/definitely/not/here.csv"), &CsvOptions::default())
            .unwrap_err();
        assert!(matches!(err, DataError::Io { .. }));
    }

    #[test]
    fn parse_value_cleaning() {
        assert_eq!(parse_value(" 1,234.5 "), Some(1234.5));
        assert_eq!(parse_value("2.5 %"), Some(2.5));
        assert_eq!(parse_value("+3"), Some(3.0));
        assert_eq!(parse_value("%"), None);
        assert_eq!(parse_value("-"), None);
    }
}
