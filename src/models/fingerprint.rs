//! Content fingerprint identifier.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Deterministic digest of an item's title and body.
///
/// Always the 64-character lowercase hex encoding of a SHA-256 digest when
/// produced by [`ContentHasher`](crate::services::deduplication::ContentHasher).
/// Values read back from the store are wrapped as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Length of a hex-encoded SHA-256 fingerprint.
    pub const HEX_LEN: usize = 64;

    /// Wraps an already computed hex digest.
    #[must_use]
    pub fn new(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    /// Returns the fingerprint as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns a short prefix for log output.
    #[must_use]
    pub fn short(&self) -> &str {
        let end = self.0.len().min(12);
        self.0.get(..end).unwrap_or(&self.0)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Fingerprint {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for Fingerprint {
    fn from(s: String) -> Self {
        Self(s)
    }
}
