//! Content fingerprinting.
//!
//! Fingerprints are SHA-256 digests over an item's title and body joined by a
//! newline. No case or whitespace normalization is applied: two posts are the
//! same content only if their text is byte-identical.

use crate::models::{Fingerprint, RawItem};
use sha2::{Digest, Sha256};

/// Content hasher for deduplication.
///
/// Identifiers and channels do not take part in the digest, so cross-posts of
/// the same text collapse to one fingerprint.
///
/// # Example
///
/// ```rust
/// use feedsift::services::deduplication::ContentHasher;
///
/// let a = ContentHasher::fingerprint("Bitcoin rises", "BTC up 5%");
/// let b = ContentHasher::fingerprint("Bitcoin rises", "BTC up 5%");
/// assert_eq!(a, b);
/// assert_eq!(a.as_str().len(), 64);
/// ```
pub struct ContentHasher;

impl ContentHasher {
    /// Separator placed between title and body before hashing.
    pub const SEPARATOR: &'static str = "\n";

    /// Computes the fingerprint of a title/body pair.
    ///
    /// Total function: empty title and body yield the "empty content" fingerprint.
    #[must_use]
    pub fn fingerprint(title: &str, body: &str) -> Fingerprint {
        let mut hasher = Sha256::new();
        hasher.update(title.as_bytes());
        hasher.update(Self::SEPARATOR.as_bytes());
        hasher.update(body.as_bytes());
        Fingerprint::new(hex::encode(hasher.finalize()))
    }

    /// Computes the fingerprint of an item's content.
    #[must_use]
    pub fn fingerprint_item(item: &RawItem) -> Fingerprint {
        Self::fingerprint(&item.title, &item.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_known_digest() {
        let fp = ContentHasher::fingerprint("Bitcoin rises", "BTC up 5%");
        assert_eq!(
            fp.as_str(),
            "e539fc13fd98500cee4ffa163b1ee0c126e72cc5dea058b72909b8daf7c824d7"
        );
    }

    #[test]
    fn test_empty_content_fingerprint() {
        // SHA-256 of a lone newline
        let fp = ContentHasher::fingerprint("", "");
        assert_eq!(
            fp.as_str(),
            "01ba4719c80b6fe911b091a7c05124b64eeece964e09c058ef8f9805daca546b"
        );
    }

    #[test_case("", "body only" ; "empty title")]
    #[test_case("title only", "" ; "empty body")]
    #[test_case("", "" ; "both empty")]
    #[test_case("Use 数据库", "ünïcödé body" ; "unicode")]
    fn test_fixed_width_lowercase_hex(title: &str, body: &str) {
        let fp = ContentHasher::fingerprint(title, body);
        assert_eq!(fp.as_str().len(), 64);
        assert!(
            fp.as_str()
                .chars()
                .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
        );
        assert_eq!(fp, ContentHasher::fingerprint(title, body));
    }

    #[test]
    fn test_separator_distinguishes_split_point() {
        let a = ContentHasher::fingerprint("ab", "c");
        let b = ContentHasher::fingerprint("a", "bc");
        assert_ne!(a, b);
    }

    #[test]
    fn test_case_and_whitespace_are_significant() {
        let a = ContentHasher::fingerprint("Bitcoin rises", "BTC up 5%");
        assert_ne!(a, ContentHasher::fingerprint("bitcoin rises", "BTC up 5%"));
        assert_ne!(a, ContentHasher::fingerprint("Bitcoin  rises", "BTC up 5%"));
    }

    #[test]
    fn test_identifier_and_channel_ignored() {
        let a = RawItem::new("p1", "Same", "text", "Bitcoin");
        let b = RawItem::new("p9", "Same", "text", "ethereum");
        assert_eq!(
            ContentHasher::fingerprint_item(&a),
            ContentHasher::fingerprint_item(&b)
        );
    }

    #[test]
    fn test_hashes_title_newline_body() {
        let direct = hex::encode(Sha256::digest(b"t\nb"));
        assert_eq!(ContentHasher::fingerprint("t", "b").as_str(), direct);
    }
}
