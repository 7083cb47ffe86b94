//! Input data loading

pub mod csv_source;

pub use csv_source::{
    load_calendar_csv, parse_calendar_csv, CsvOptions, DataError, ParseReport, ParsedSeries,
};
