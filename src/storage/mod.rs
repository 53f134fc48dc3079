//! Durable record storage.
//!
//! The record store is the authoritative answer to "has this content been
//! seen before?". The in-memory membership filter in
//! [`crate::services::deduplication`] is only a cache derived from it.
//!
//! - [`SqliteRecordStore`]: persistent `SQLite` table keyed by fingerprint
//! - [`MemoryRecordStore`]: process-local map for tests and dry runs

// Allow significant_drop_tightening - dropping database connections slightly early
// provides no meaningful benefit.
#![allow(clippy::significant_drop_tightening)]

mod memory;
pub mod sqlite;
mod traits;

pub use memory::MemoryRecordStore;
pub use sqlite::SqliteRecordStore;
pub use traits::RecordStore;

