//! Directory of newline-delimited JSON files, one per channel.

use super::ItemSource;
use crate::models::RawItem;
use crate::{Error, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Reads `<dir>/<channel>.jsonl`.
///
/// Each non-blank line is one [`RawItem`] object. The item's `channel` is
/// overwritten with the requested channel. A line that does not decode fails
/// the whole channel, so a half-read file never reaches deduplication.
#[derive(Debug, Clone)]
pub struct JsonlDirectorySource {
    dir: PathBuf,
}

impl JsonlDirectorySource {
    /// Creates a source rooted at `dir`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the root directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `channel`.
    #[must_use]
    pub fn channel_path(&self, channel: &str) -> PathBuf {
        self.dir.join(format!("{channel}.jsonl"))
    }
}

impl ItemSource for JsonlDirectorySource {
    fn name(&self) -> &'static str {
        "jsonl"
    }

    fn fetch(&self, channel: &str, limit: usize) -> Result<Vec<RawItem>> {
        let path = self.channel_path(channel);
        let file = File::open(&path).map_err(|e| Error::OperationFailed {
            operation: "open_source_file".to_string(),
            cause: format!("{}: {e}", path.display()),
        })?;

        let mut items = Vec::new();
        for (index, line) in BufReader::new(file).lines().enumerate() {
            if items.len() >= limit {
                break;
            }
            let line = line.map_err(|e| Error::operation("read_source_file", e))?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let mut item: RawItem = serde_json::from_str(trimmed).map_err(|e| {
                Error::InvalidInput(format!(
                    "{} line {}: failed to parse item: {e}",
                    path.display(),
                    index + 1
                ))
            })?;
            item.channel = channel.to_string();
            items.push(item);
        }

        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_channel(dir: &TempDir, channel: &str, contents: &str) {
        fs::write(dir.path().join(format!("{channel}.jsonl")), contents).unwrap();
    }

    #[test]
    fn test_fetch_reads_lines_and_forces_channel() {
        let dir = TempDir::new().unwrap();
        write_channel(
            &dir,
            "Bitcoin",
            concat!(
                r#"{"id":"p1","title":"Bitcoin rises","body":"BTC up 5%","channel":"other"}"#,
                "\n\n",
                r#"{"post_id":"p2","title":"Halving","content":null,"score":12}"#,
                "\n",
            ),
        );

        let source = JsonlDirectorySource::new(dir.path());
        let items = source.fetch("Bitcoin", 10).unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, "p1");
        assert_eq!(items[0].channel, "Bitcoin");
        assert_eq!(items[1].id, "p2");
        assert_eq!(items[1].body, "");
        assert_eq!(items[1].score, 12);
        assert_eq!(items[1].channel, "Bitcoin");
    }

    #[test]
    fn test_fetch_respects_limit() {
        let dir = TempDir::new().unwrap();
        let lines: String = (0..5)
            .map(|i| format!("{{\"id\":\"p{i}\",\"title\":\"t{i}\"}}\n"))
            .collect();
        write_channel(&dir, "ethereum", &lines);

        let items = JsonlDirectorySource::new(dir.path()).fetch("ethereum", 3).unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[2].id, "p2");
    }

    #[test]
    fn test_malformed_line_fails_channel() {
        let dir = TempDir::new().unwrap();
        write_channel(&dir, "Bitcoin", "{\"id\":\"ok\"}\nnot json\n");

        let err = JsonlDirectorySource::new(dir.path())
            .fetch("Bitcoin", 10)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(ref msg) if msg.contains("line 2")));
    }

    #[test]
    fn test_missing_channel_file_is_error() {
        let dir = TempDir::new().unwrap();
        let result = JsonlDirectorySource::new(dir.path()).fetch("absent", 10);
        assert!(matches!(result, Err(Error::OperationFailed { .. })));
    }
}
