//! Types shared by the deduplication components.

use serde::{Deserialize, Serialize};

/// Order in which an accepted fingerprint is written to the filter and the store.
///
/// `FilterFirst` adds to the filter before the durable insert. If the insert
/// then fails, the filter holds a member the store does not know about, which
/// costs one extra store lookup per later sighting until the next rebuild.
///
/// `StoreFirst` adds to the filter only after the insert succeeded, keeping
/// the filter an exact superset of the store at the cost of a definite-absent
/// answer for content whose insert failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsertOrdering {
    /// Filter add, then store insert.
    #[default]
    FilterFirst,
    /// Store insert, then filter add on success.
    StoreFirst,
}

impl InsertOrdering {
    /// Parses an ordering name. Accepts `filter_first` / `store_first` and
    /// their kebab-case forms.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "filter_first" => Some(Self::FilterFirst),
            "store_first" => Some(Self::StoreFirst),
            _ => None,
        }
    }

    /// Returns the snake-case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FilterFirst => "filter_first",
            Self::StoreFirst => "store_first",
        }
    }
}

/// How a single fingerprint was classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The filter ruled the fingerprint out without a store lookup.
    DefinitelyNew,
    /// The filter matched but the store has no record.
    FalsePositive,
    /// The store lookup failed; treated as new.
    LookupFault,
    /// The store confirmed a previous record.
    Duplicate,
}

impl Verdict {
    /// Returns `true` only for confirmed duplicates.
    #[must_use]
    pub const fn is_duplicate(self) -> bool {
        matches!(self, Self::Duplicate)
    }

    /// Metrics label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DefinitelyNew => "definitely_new",
            Self::FalsePositive => "false_positive",
            Self::LookupFault => "lookup_fault",
            Self::Duplicate => "duplicate",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_ordering_parse() {
        assert_eq!(InsertOrdering::parse("filter_first"), Some(InsertOrdering::FilterFirst));
        assert_eq!(InsertOrdering::parse("Store-First"), Some(InsertOrdering::StoreFirst));
        assert_eq!(InsertOrdering::parse("sometimes"), None);
        assert_eq!(InsertOrdering::default(), InsertOrdering::FilterFirst);
    }

    #[test]
    fn test_verdict_is_duplicate() {
        assert!(Verdict::Duplicate.is_duplicate());
        assert!(!Verdict::FalsePositive.is_duplicate());
        assert!(!Verdict::LookupFault.is_duplicate());
        assert!(!Verdict::DefinitelyNew.is_duplicate());
    }
}
