//! Deduplication coordinator.
//!
//! Runs every item of a batch through the two-tier check:
//! 1. **Membership filter**: in-memory, answers "definitely new" for most
//!    fresh content without touching storage
//! 2. **Record store**: consulted only on a possible hit, decides for real
//!
//! Accepted items go into both tiers and are returned in input order.

use crate::models::{BatchOutcome, DedupStats, Fingerprint, PostRecord, RawItem};
use crate::storage::RecordStore;
use crate::{Result, current_timestamp};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Instant;
use tracing::instrument;

use super::bloom::MembershipFilter;
use super::config::DeduplicationConfig;
use super::hasher::ContentHasher;
use super::types::{InsertOrdering, Verdict};

/// Two-tier deduplication over a membership filter and a record store.
///
/// The filter is always a superset of the store's fingerprints (modulo a
/// failed rehydration, see [`DeduplicationService::open`]); it never decides
/// that an item is a duplicate on its own.
///
/// # Thread Safety
///
/// All operations take `&self`. Batches are serialized by an internal lock
/// so two concurrent callers cannot both accept the same content.
/// [`stats`](Self::stats) does not take that lock.
///
/// # Example
///
/// ```rust
/// use feedsift::services::deduplication::{DeduplicationConfig, DeduplicationService};
/// use feedsift::storage::SqliteRecordStore;
/// use feedsift::RawItem;
/// use std::sync::Arc;
///
/// let store = Arc::new(SqliteRecordStore::in_memory()?);
/// let service = DeduplicationService::open(store, DeduplicationConfig::default())?;
///
/// let first = service.filter_batch(vec![RawItem::new("p1", "t", "b", "Bitcoin")]);
/// let again = service.filter_batch(vec![RawItem::new("p2", "t", "b", "ethereum")]);
/// assert_eq!(first.survivors.len(), 1);
/// assert_eq!(again.duplicates_removed, 1);
/// # Ok::<(), feedsift::Error>(())
/// ```
pub struct DeduplicationService {
    store: Arc<dyn RecordStore>,
    filter: RwLock<MembershipFilter>,
    batch_lock: Mutex<()>,
    config: DeduplicationConfig,
}

impl DeduplicationService {
    /// Creates the service and rehydrates the filter from the store.
    ///
    /// A store that cannot list its fingerprints is not fatal: the filter
    /// starts empty and a warning is logged. Content seen before the restart
    /// may then be accepted again until it is re-recorded.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidInput`] if the configuration is invalid.
    pub fn open(store: Arc<dyn RecordStore>, config: DeduplicationConfig) -> Result<Self> {
        config.validate()?;
        let mut filter = MembershipFilter::new(config.capacity, config.error_rate);
        Self::rehydrate(store.as_ref(), &mut filter);

        tracing::info!(
            backend = store.backend_name(),
            capacity = config.capacity,
            error_rate = config.error_rate,
            bits = filter.bit_len(),
            hashes = filter.hash_count(),
            loaded = filter.len(),
            ordering = config.insert_ordering.as_str(),
            "Deduplication service initialized"
        );

        Ok(Self {
            store,
            filter: RwLock::new(filter),
            batch_lock: Mutex::new(()),
            config,
        })
    }

    fn rehydrate(store: &dyn RecordStore, filter: &mut MembershipFilter) {
        match store.load_all_fingerprints() {
            Ok(fingerprints) => {
                for fingerprint in &fingerprints {
                    filter.add(fingerprint);
                }
                tracing::info!(count = fingerprints.len(), "Loaded existing fingerprints into filter");
                if fingerprints.len() > filter.capacity() {
                    tracing::warn!(
                        count = fingerprints.len(),
                        capacity = filter.capacity(),
                        "Stored fingerprints exceed filter capacity; false-positive rate will rise"
                    );
                }
            },
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load existing fingerprints, starting with empty filter");
                Self::record_fault("rehydrate");
            },
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &DeduplicationConfig {
        &self.config
    }

    /// Returns the record store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    /// Filters a batch, keeping unseen content in input order.
    ///
    /// Never fails: store lookup faults count as "not a duplicate" and insert
    /// faults still return the item as a survivor. Both are logged.
    #[allow(clippy::cast_precision_loss)]
    #[instrument(skip(self, items), fields(operation = "filter_batch", batch_size = items.len()))]
    pub fn filter_batch(&self, items: Vec<RawItem>) -> BatchOutcome {
        let start = Instant::now();
        let _batch = self.batch_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut outcome = BatchOutcome {
            survivors: Vec::with_capacity(items.len()),
            ..BatchOutcome::default()
        };
        // Accepted in this batch but not durably recorded
        let mut unpersisted: HashSet<Fingerprint> = HashSet::new();

        for item in items {
            let fingerprint = ContentHasher::fingerprint_item(&item);

            if unpersisted.contains(&fingerprint) {
                tracing::debug!(item_id = %item.id, fingerprint = %fingerprint.short(), "Duplicate of unpersisted item in batch");
                outcome.duplicates_removed += 1;
                metrics::counter!("dedup_duplicates_total").increment(1);
                continue;
            }

            let verdict = self.classify(&fingerprint);
            match verdict {
                Verdict::Duplicate => {
                    tracing::debug!(item_id = %item.id, fingerprint = %fingerprint.short(), "Duplicate dropped");
                    outcome.store_lookups += 1;
                    outcome.duplicates_removed += 1;
                    metrics::counter!("dedup_duplicates_total").increment(1);
                    continue;
                },
                Verdict::DefinitelyNew => outcome.definitely_new += 1,
                Verdict::FalsePositive => {
                    outcome.store_lookups += 1;
                    outcome.false_positives += 1;
                },
                Verdict::LookupFault => {
                    outcome.store_lookups += 1;
                    outcome.lookup_faults += 1;
                },
            }

            if !self.accept(&fingerprint, &item) {
                outcome.insert_faults += 1;
                unpersisted.insert(fingerprint);
            }
            outcome.survivors.push(item);
        }

        metrics::histogram!("dedup_batch_duration_ms")
            .record(start.elapsed().as_secs_f64() * 1000.0);
        tracing::info!(
            unique = outcome.survivors.len(),
            duplicates = outcome.duplicates_removed,
            definitely_new = outcome.definitely_new,
            false_positives = outcome.false_positives,
            lookup_faults = outcome.lookup_faults,
            insert_faults = outcome.insert_faults,
            "Deduplication complete"
        );
        outcome
    }

    /// Returns `true` if the item's content is already recorded.
    ///
    /// Read-only: nothing is inserted. Lookup faults answer `false`.
    pub fn is_duplicate(&self, item: &RawItem) -> bool {
        self.is_known(&item.title, &item.body)
    }

    /// Returns `true` if the given title/body content is already recorded.
    pub fn is_known(&self, title: &str, body: &str) -> bool {
        let fingerprint = ContentHasher::fingerprint(title, body);
        self.classify(&fingerprint).is_duplicate()
    }

    /// Records an item as seen without checking it first.
    ///
    /// Returns `false` if the durable insert failed.
    pub fn record(&self, item: &RawItem) -> bool {
        let _batch = self.batch_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let fingerprint = ContentHasher::fingerprint_item(item);
        self.accept(&fingerprint, item)
    }

    /// Returns `true` if the filter reports the fingerprint as possibly present.
    #[must_use]
    pub fn filter_might_contain(&self, fingerprint: &Fingerprint) -> bool {
        self.filter
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .might_contain(fingerprint)
    }

    /// Number of fingerprints added to the filter since it was built.
    #[must_use]
    pub fn filter_len(&self) -> usize {
        self.filter.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Aggregate statistics over the record store.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be queried.
    pub fn stats(&self) -> Result<DedupStats> {
        let stats = self.store.stats()?;
        Ok(DedupStats {
            total_posts: stats.total,
            by_channel: stats.by_channel,
            oldest_first_seen: stats.oldest_first_seen,
            newest_first_seen: stats.newest_first_seen,
            filter_capacity: self.config.capacity,
            filter_error_rate: self.config.error_rate,
        })
    }

    /// Rebuilds the filter from scratch out of the record store.
    ///
    /// A maintenance operation: it drops false members left behind by failed
    /// inserts and must follow any external purge of the store. The old filter
    /// stays in place if the store cannot be read.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot list its fingerprints.
    #[instrument(skip(self), fields(operation = "rebuild_filter"))]
    pub fn rebuild_filter(&self) -> Result<usize> {
        let _batch = self.batch_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let fingerprints = self.store.load_all_fingerprints()?;

        let mut filter = self.filter.write().unwrap_or_else(PoisonError::into_inner);
        filter.clear();
        for fingerprint in &fingerprints {
            filter.add(fingerprint);
        }
        drop(filter);

        tracing::info!(count = fingerprints.len(), "Membership filter rebuilt");
        Ok(fingerprints.len())
    }

    fn classify(&self, fingerprint: &Fingerprint) -> Verdict {
        if !self.filter_might_contain(fingerprint) {
            metrics::counter!("dedup_filter_checks_total", "result" => "absent").increment(1);
            return Verdict::DefinitelyNew;
        }
        metrics::counter!("dedup_filter_checks_total", "result" => "possible").increment(1);

        let verdict = match self.store.exists(fingerprint) {
            Ok(true) => Verdict::Duplicate,
            Ok(false) => Verdict::FalsePositive,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    fingerprint = %fingerprint.short(),
                    "Store lookup failed, treating item as new"
                );
                Self::record_fault("lookup");
                Verdict::LookupFault
            },
        };
        metrics::counter!("dedup_store_lookups_total", "result" => verdict.as_str()).increment(1);
        verdict
    }

    /// Writes an accepted fingerprint to both tiers. Returns `false` if the
    /// durable insert failed.
    fn accept(&self, fingerprint: &Fingerprint, item: &RawItem) -> bool {
        let first_seen_at = i64::try_from(current_timestamp()).unwrap_or(i64::MAX);
        let record = PostRecord::from_item(fingerprint.clone(), item, first_seen_at);

        match self.config.insert_ordering {
            InsertOrdering::FilterFirst => {
                self.filter_add(fingerprint);
                self.insert_record(&record)
            },
            InsertOrdering::StoreFirst => {
                let stored = self.insert_record(&record);
                if stored {
                    self.filter_add(fingerprint);
                }
                stored
            },
        }
    }

    fn filter_add(&self, fingerprint: &Fingerprint) {
        self.filter
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .add(fingerprint);
    }

    fn insert_record(&self, record: &PostRecord) -> bool {
        match self.store.insert(record) {
            Ok(_) => true,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    item_id = %record.item_id,
                    fingerprint = %record.fingerprint.short(),
                    "Failed to record item, keeping it as a survivor"
                );
                Self::record_fault("insert");
                false
            },
        }
    }

    fn record_fault(kind: &'static str) {
        metrics::counter!("dedup_faults_total", "kind" => kind).increment(1);
    }
}
