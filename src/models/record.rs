//! Durable records and deduplication results.

use super::{Fingerprint, RawItem};
use serde::Serialize;
use std::collections::BTreeMap;

/// One row of the durable store: the first accepted item for a fingerprint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostRecord {
    /// Content fingerprint (primary key).
    pub fingerprint: Fingerprint,
    /// Identifier of the first item accepted with this content.
    pub item_id: String,
    /// Title of that item.
    pub title: String,
    /// Channel of that item.
    pub channel: String,
    /// Item creation time (Unix epoch seconds).
    pub created_at: i64,
    /// When the fingerprint was first accepted (Unix epoch seconds).
    pub first_seen_at: i64,
}

impl PostRecord {
    /// Builds the record for an accepted item.
    #[must_use]
    pub fn from_item(fingerprint: Fingerprint, item: &RawItem, first_seen_at: i64) -> Self {
        Self {
            fingerprint,
            item_id: item.id.clone(),
            title: item.title.clone(),
            channel: item.channel.clone(),
            created_at: item.created_at,
            first_seen_at,
        }
    }
}

/// Aggregates computed by the durable store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// Total number of records.
    pub total: u64,
    /// Record count per channel.
    pub by_channel: BTreeMap<String, u64>,
    /// Smallest `first_seen_at`, if any record exists.
    pub oldest_first_seen: Option<i64>,
    /// Largest `first_seen_at`, if any record exists.
    pub newest_first_seen: Option<i64>,
}

/// Statistics reported by the deduplication service.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DedupStats {
    /// Total number of distinct fingerprints recorded.
    pub total_posts: u64,
    /// Record count per channel.
    pub by_channel: BTreeMap<String, u64>,
    /// Oldest first-seen timestamp.
    pub oldest_first_seen: Option<i64>,
    /// Newest first-seen timestamp.
    pub newest_first_seen: Option<i64>,
    /// Configured membership filter capacity.
    pub filter_capacity: usize,
    /// Configured membership filter false-positive rate.
    pub filter_error_rate: f64,
}

/// Result of filtering one batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    /// Items that passed deduplication, in input order.
    pub survivors: Vec<RawItem>,
    /// Number of items dropped as confirmed duplicates.
    pub duplicates_removed: usize,
    /// Items accepted on the filter's definite-absent fast path.
    pub definitely_new: usize,
    /// Durable store lookups performed on possible hits.
    pub store_lookups: usize,
    /// Possible hits the store showed to be new content.
    pub false_positives: usize,
    /// Store lookups that failed and were treated as "not a duplicate".
    pub lookup_faults: usize,
    /// Accepted items whose durable insert failed.
    pub insert_faults: usize,
}

impl BatchOutcome {
    /// Number of items examined.
    #[must_use]
    pub const fn examined(&self) -> usize {
        self.survivors.len() + self.duplicates_removed
    }
}
