//! Two-tier content deduplication.
//!
//! Every item is reduced to a SHA-256 [`Fingerprint`](crate::Fingerprint) of
//! its title and body, then checked in two steps:
//! 1. **Membership filter**: in-memory Bloom filter, never a false negative
//! 2. **Record store**: authoritative, consulted only on a possible hit
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    DeduplicationService                      │
//! │  ┌───────────────┐   ┌──────────────────┐   ┌─────────────┐  │
//! │  │ ContentHasher │──▶│ MembershipFilter │──▶│ RecordStore │  │
//! │  │ SHA-256 hex   │   │ absent => new    │   │ exists?     │  │
//! │  └───────────────┘   └──────────────────┘   └─────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The filter is rebuilt from the store on every start.

mod bloom;
mod config;
mod hasher;
mod service;
mod types;

pub use bloom::{MAX_FILTER_BITS, MembershipFilter};
pub use config::{DEFAULT_CAPACITY, DEFAULT_ERROR_RATE, DeduplicationConfig};
pub use hasher::ContentHasher;
pub use service::DeduplicationService;
pub use types::{InsertOrdering, Verdict};
