//! Business logic services.
//!
//! Services orchestrate storage, sources and scorers into high-level operations.

mod collector;
pub mod deduplication;

pub use collector::{CollectorService, RunSummary};
pub use deduplication::DeduplicationService;
