//! In-memory record store.

use super::traits::RecordStore;
use crate::Result;
use crate::models::{Fingerprint, PostRecord, StoreStats};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// Record store backed by a `HashMap`.
///
/// Nothing survives the process. Useful for tests and for dry runs that must
/// not touch the real store.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    records: RwLock<HashMap<Fingerprint, PostRecord>>,
}

impl MemoryRecordStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the record stored for a fingerprint.
    #[must_use]
    pub fn get(&self, fingerprint: &Fingerprint) -> Option<PostRecord> {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(fingerprint)
            .cloned()
    }
}

impl RecordStore for MemoryRecordStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    fn exists(&self, fingerprint: &Fingerprint) -> Result<bool> {
        Ok(self
            .records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(fingerprint))
    }

    fn insert(&self, record: &PostRecord) -> Result<bool> {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        if records.contains_key(&record.fingerprint) {
            return Ok(false);
        }
        records.insert(record.fingerprint.clone(), record.clone());
        Ok(true)
    }

    fn load_all_fingerprints(&self) -> Result<Vec<Fingerprint>> {
        Ok(self
            .records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect())
    }

    fn stats(&self) -> Result<StoreStats> {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        let mut stats = StoreStats {
            total: records.len() as u64,
            ..StoreStats::default()
        };
        for record in records.values() {
            *stats.by_channel.entry(record.channel.clone()).or_insert(0) += 1;
            stats.oldest_first_seen = Some(
                stats
                    .oldest_first_seen
                    .map_or(record.first_seen_at, |v| v.min(record.first_seen_at)),
            );
            stats.newest_first_seen = Some(
                stats
                    .newest_first_seen
                    .map_or(record.first_seen_at, |v| v.max(record.first_seen_at)),
            );
        }
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(fp: &str, channel: &str, first_seen_at: i64) -> PostRecord {
        PostRecord {
            fingerprint: Fingerprint::new(fp),
            item_id: format!("id-{fp}"),
            title: "title".to_string(),
            channel: channel.to_string(),
            created_at: 0,
            first_seen_at,
        }
    }

    #[test]
    fn test_insert_is_idempotent() {
        let store = MemoryRecordStore::new();
        assert!(store.insert(&record("aa", "Bitcoin", 10)).unwrap());
        assert!(!store.insert(&record("aa", "ethereum", 20)).unwrap());

        let kept = store.get(&Fingerprint::new("aa")).unwrap();
        assert_eq!(kept.channel, "Bitcoin");
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_stats() {
        let store = MemoryRecordStore::new();
        store.insert(&record("aa", "Bitcoin", 30)).unwrap();
        store.insert(&record("bb", "Bitcoin", 10)).unwrap();
        store.insert(&record("cc", "ethereum", 20)).unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.by_channel.get("Bitcoin"), Some(&2));
        assert_eq!(stats.by_channel.get("ethereum"), Some(&1));
        assert_eq!(stats.oldest_first_seen, Some(10));
        assert_eq!(stats.newest_first_seen, Some(30));
    }

    #[test]
    fn test_empty_stats() {
        let stats = MemoryRecordStore::new().stats().unwrap();
        assert_eq!(stats.total, 0);
        assert!(stats.by_channel.is_empty());
        assert!(stats.oldest_first_seen.is_none());
    }
}
