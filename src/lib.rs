//! # Feedsift
//!
//! Periodic forum post collector with two-tier content deduplication.
//!
//! Feedsift pulls posts from a set of discussion channels, drops content it
//! has already seen, optionally scores sentiment, and writes the survivors to
//! a CSV file.
//!
//! ## Features
//!
//! - SHA-256 content fingerprints over title and body
//! - In-memory Bloom filter in front of an authoritative `SQLite` store
//! - Filter rehydration from the store on every cold start
//! - Fail-open lookups: storage faults never drop real content
//! - Pluggable item sources and sentiment scorers
//!
//! ## Example
//!
//! ```rust
//! use feedsift::services::deduplication::{DeduplicationConfig, DeduplicationService};
//! use feedsift::storage::MemoryRecordStore;
//! use feedsift::RawItem;
//! use std::sync::Arc;
//!
//! let store = Arc::new(MemoryRecordStore::new());
//! let service = DeduplicationService::open(store, DeduplicationConfig::default())?;
//!
//! let items = vec![
//!     RawItem::new("p1", "Bitcoin rises", "BTC up 5%", "Bitcoin"),
//!     RawItem::new("p2", "Ethereum news", "ETH news", "ethereum"),
//!     RawItem::new("p3", "Bitcoin rises", "BTC up 5%", "Bitcoin"),
//! ];
//! let outcome = service.filter_batch(items);
//! assert_eq!(outcome.survivors.len(), 2);
//! assert_eq!(outcome.duplicates_removed, 1);
//! # Ok::<(), feedsift::Error>(())
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![allow(clippy::multiple_crate_versions)]

use thiserror::Error as ThisError;

pub mod config;
pub mod io;
pub mod models;
pub mod observability;
pub mod sentiment;
pub mod services;
pub mod sources;
pub mod storage;

pub use config::FeedsiftConfig;
pub use models::{
    BatchOutcome, DedupStats, Fingerprint, OutputRow, PostRecord, RawItem, Sentiment,
    SentimentLabel,
};
pub use services::{CollectorService, DeduplicationService, RunSummary};
pub use storage::{MemoryRecordStore, RecordStore, SqliteRecordStore};

/// Error type for feedsift operations.
///
/// # Error Variant Triggers
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `InvalidInput` | Bad configuration values, malformed source lines |
/// | `OperationFailed` | `SQLite`, filesystem, CSV or metrics failures |
#[derive(Debug, ThisError)]
pub enum Error {
    /// Invalid input was provided.
    ///
    /// Raised when:
    /// - Filter capacity is zero or the error rate is outside `(0, 1)`
    /// - A JSONL source line cannot be decoded into an item
    /// - A configuration value cannot be parsed
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An operation failed.
    ///
    /// Raised when:
    /// - The `SQLite` store cannot be opened, queried or written
    /// - Source files or the output file cannot be read or written
    /// - The metrics recorder cannot be installed
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },
}

impl Error {
    /// Builds an [`Error::OperationFailed`] from an operation tag and any displayable cause.
    pub fn operation(operation: &str, cause: impl std::fmt::Display) -> Self {
        Self::OperationFailed {
            operation: operation.to_string(),
            cause: cause.to_string(),
        }
    }
}

/// Result type alias for feedsift operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Returns the current Unix timestamp in seconds.
///
/// Falls back to 0 if the system clock is before the Unix epoch.
///
/// ```rust
/// let ts = feedsift::current_timestamp();
/// assert!(ts > 0);
/// ```
#[must_use]
pub fn current_timestamp() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidInput("capacity must be > 0".to_string());
        assert_eq!(err.to_string(), "invalid input: capacity must be > 0");

        let err = Error::operation("open_sqlite", "disk I/O error");
        assert_eq!(
            err.to_string(),
            "operation 'open_sqlite' failed: disk I/O error"
        );
    }

    #[test]
    fn test_current_timestamp_is_after_2020() {
        assert!(current_timestamp() > 1_577_836_800);
    }
}
