//! Tabular output of accepted items.
//!
//! Rows always carry the full [`OUTPUT_COLUMNS`](crate::models::OUTPUT_COLUMNS)
//! set in a fixed order so downstream readers can rely on it.

mod csv;

pub use self::csv::{CsvRowSink, write_rows_to_path};
