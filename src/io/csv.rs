//! CSV writer for output rows.

use crate::models::{OUTPUT_COLUMNS, OutputRow};
use crate::{Error, Result};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// CSV sink for [`OutputRow`]s.
///
/// The header row is written before the first data row, or by
/// [`finish`](Self::finish) when no rows were written.
pub struct CsvRowSink<W: Write> {
    writer: csv::Writer<W>,
    /// Whether headers have been written.
    headers_written: bool,
    rows: usize,
}

impl<W: Write> CsvRowSink<W> {
    /// Creates a new CSV sink.
    #[must_use]
    pub fn new(writer: W) -> Self {
        let writer = csv::WriterBuilder::new()
            .has_headers(false) // We write headers manually
            .from_writer(writer);

        Self {
            writer,
            headers_written: false,
            rows: 0,
        }
    }

    fn ensure_headers(&mut self) -> Result<()> {
        if !self.headers_written {
            self.writer
                .write_record(OUTPUT_COLUMNS)
                .map_err(|e| Error::operation("write_csv_headers", e))?;
            self.headers_written = true;
        }
        Ok(())
    }

    /// Writes one row.
    ///
    /// # Errors
    ///
    /// Returns an error if the row cannot be serialized or written.
    pub fn write_row(&mut self, row: &OutputRow) -> Result<()> {
        self.ensure_headers()?;
        self.writer
            .serialize(row)
            .map_err(|e| Error::operation("write_csv", e))?;
        self.rows += 1;
        Ok(())
    }

    /// Number of data rows written so far.
    #[must_use]
    pub const fn rows_written(&self) -> usize {
        self.rows
    }

    /// Flushes the sink and returns the underlying writer.
    ///
    /// # Errors
    ///
    /// Returns an error if buffered data cannot be flushed.
    pub fn finish(mut self) -> Result<W> {
        self.ensure_headers()?;
        self.writer
            .into_inner()
            .map_err(|e| Error::operation("flush_csv", e.error()))
    }
}

/// Writes `rows` to `path`, replacing any existing file.
///
/// Parent directories are created as needed. Rows go to a sibling temporary
/// file first, which is then renamed over `path`, so readers never see a
/// partial file.
///
/// # Errors
///
/// Returns an error if the directory, temporary file, or rename fails.
pub fn write_rows_to_path(path: &Path, rows: &[OutputRow]) -> Result<usize> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| Error::OperationFailed {
            operation: "create_output_dir".to_string(),
            cause: format!("{}: {e}", parent.display()),
        })?;
    }

    let tmp_path = temp_path_for(path);
    let written = write_file(&tmp_path, rows).inspect_err(|_| {
        let _ = fs::remove_file(&tmp_path);
    })?;

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        Error::OperationFailed {
            operation: "rename_output".to_string(),
            cause: format!("{}: {e}", path.display()),
        }
    })?;

    tracing::info!(path = %path.display(), rows = written, "Wrote output file");
    Ok(written)
}

fn write_file(path: &Path, rows: &[OutputRow]) -> Result<usize> {
    let file = File::create(path).map_err(|e| Error::OperationFailed {
        operation: "create_output".to_string(),
        cause: format!("{}: {e}", path.display()),
    })?;

    let mut sink = CsvRowSink::new(BufWriter::new(file));
    for row in rows {
        sink.write_row(row)?;
    }
    let written = sink.rows_written();
    sink.finish()?
        .flush()
        .map_err(|e| Error::operation("flush_output", e))?;
    Ok(written)
}

fn temp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map_or_else(|| "output".into(), |n| n.to_string_lossy().into_owned());
    path.with_file_name(format!(".{name}.tmp"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RawItem, Sentiment};
    use tempfile::TempDir;

    fn row(id: &str, title: &str, body: &str) -> OutputRow {
        let item = RawItem::new(id, title, body, "Bitcoin")
            .with_score(150)
            .with_created_at(1_640_995_200)
            .with_url("https://reddit.com/dummy1")
            .with_num_comments(25);
        OutputRow::new(item, Sentiment::neutral(), "20240101_120000")
    }

    #[test]
    fn test_sink_writes_header_then_rows() {
        let mut sink = CsvRowSink::new(Vec::new());
        sink.write_row(&row("p1", "Bitcoin rises", "BTC up, 5%")).unwrap();
        let out = String::from_utf8(sink.finish().unwrap()).unwrap();

        let mut lines = out.lines();
        assert_eq!(lines.next().unwrap(), OUTPUT_COLUMNS.join(","));
        let data = lines.next().unwrap();
        assert!(data.starts_with("p1,Bitcoin rises,\"BTC up, 5%\",150,1640995200,Bitcoin,"));
        assert!(data.ends_with(",neutral,0.5,0.33,0.33,0.34,0.5,20240101_120000"));
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_sink_header_only_when_empty() {
        let out = CsvRowSink::new(Vec::new()).finish().unwrap();
        assert_eq!(String::from_utf8(out).unwrap().trim_end(), OUTPUT_COLUMNS.join(","));
    }

    #[test]
    fn test_write_rows_to_path_creates_dirs_and_replaces() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("out.csv");

        assert_eq!(write_rows_to_path(&path, &[row("a", "t", "b"), row("b", "u", "c")]).unwrap(), 2);
        assert_eq!(write_rows_to_path(&path, &[row("c", "v", "d")]).unwrap(), 1);

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let ids: Vec<String> = reader
            .records()
            .map(|r| r.unwrap()[0].to_string())
            .collect();
        assert_eq!(ids, vec!["c"]);
        assert!(!temp_path_for(&path).exists());
    }

    #[test]
    fn test_write_rows_to_directory_path_fails() {
        let dir = TempDir::new().unwrap();
        assert!(write_rows_to_path(dir.path(), &[row("a", "t", "b")]).is_err());
    }
}
