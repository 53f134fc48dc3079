//! Record store trait.

use crate::Result;
use crate::models::{Fingerprint, PostRecord, StoreStats};

/// Trait for durable record stores.
///
/// Implementations must be safe to share across threads; all methods take
/// `&self` and use interior locking.
pub trait RecordStore: Send + Sync {
    /// Short backend name used in metrics labels.
    fn backend_name(&self) -> &'static str;

    /// Authoritative existence check for a fingerprint.
    fn exists(&self, fingerprint: &Fingerprint) -> Result<bool>;

    /// Inserts a record.
    ///
    /// Returns `true` if a row was written and `false` if the fingerprint was
    /// already present. An existing fingerprint is never an error.
    fn insert(&self, record: &PostRecord) -> Result<bool>;

    /// Returns every stored fingerprint, in no particular order.
    fn load_all_fingerprints(&self) -> Result<Vec<Fingerprint>>;

    /// Read-only aggregation over all records.
    fn stats(&self) -> Result<StoreStats>;

    /// Returns the number of stored records.
    fn count(&self) -> Result<u64> {
        Ok(self.stats()?.total)
    }
}
