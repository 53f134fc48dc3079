//! Item sources.
//!
//! An [`ItemSource`] yields the newest items of one channel at a time.
//! [`collect_all`] walks every configured channel and keeps going past
//! per-channel failures.
//!
//! | Source | Reads from |
//! |--------|------------|
//! | [`JsonlDirectorySource`] | `<dir>/<channel>.jsonl`, one item per line |
//! | [`SampleSource`] | Two built-in sample posts |

mod jsonl;
mod sample;

pub use jsonl::JsonlDirectorySource;
pub use sample::SampleSource;

use crate::Result;
use crate::models::RawItem;

/// A producer of raw items, one channel at a time.
pub trait ItemSource: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Fetches up to `limit` items from `channel`.
    ///
    /// # Errors
    ///
    /// Returns an error if the channel cannot be read. Callers treat this as
    /// a failure of that channel only.
    fn fetch(&self, channel: &str, limit: usize) -> Result<Vec<RawItem>>;
}

/// Items gathered across channels, plus the channels that failed.
#[derive(Debug, Clone, Default)]
pub struct FetchReport {
    /// Items in channel order, then source order.
    pub items: Vec<RawItem>,
    /// Channels whose fetch returned an error.
    pub failed_channels: Vec<String>,
}

/// Fetches every channel from `source`, skipping channels that fail.
pub fn collect_all(source: &dyn ItemSource, channels: &[String], limit: usize) -> FetchReport {
    let mut report = FetchReport::default();

    for channel in channels {
        match source.fetch(channel, limit) {
            Ok(items) => {
                tracing::info!(
                    source = source.name(),
                    channel = %channel,
                    count = items.len(),
                    "Fetched items"
                );
                metrics::counter!("posts_fetched_total", "channel" => channel.clone())
                    .increment(items.len() as u64);
                report.items.extend(items);
            },
            Err(e) => {
                tracing::error!(
                    source = source.name(),
                    channel = %channel,
                    error = %e,
                    "Failed to fetch channel, skipping"
                );
                metrics::counter!("source_errors_total", "channel" => channel.clone())
                    .increment(1);
                report.failed_channels.push(channel.clone());
            },
        }
    }

    report
}
