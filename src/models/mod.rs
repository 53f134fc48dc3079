//! Data models for feedsift.
//!
//! This module contains the core data structures used throughout the system.

mod fingerprint;
mod item;
mod output;
mod record;
mod sentiment;

pub use fingerprint::Fingerprint;
pub use item::RawItem;
pub use output::{OUTPUT_COLUMNS, OutputRow};
pub use record::{BatchOutcome, DedupStats, PostRecord, StoreStats};
pub use sentiment::{Sentiment, SentimentLabel};
