//! Built-in sample posts for runs without an upstream feed.

use super::ItemSource;
use crate::Result;
use crate::models::RawItem;

/// Yields the two built-in sample posts, each under its own channel.
///
/// A fetch returns only the posts whose channel matches the request, so
/// walking `Bitcoin` and `ethereum` yields each post once. The content never
/// changes: every run after the first is fully deduplicated.
#[derive(Debug, Clone, Copy, Default)]
pub struct SampleSource;

impl SampleSource {
    /// The sample posts.
    #[must_use]
    pub fn posts() -> Vec<RawItem> {
        vec![
            RawItem::new(
                "dummy_1",
                "Bitcoin price rising!",
                "Great news for crypto investors",
                "Bitcoin",
            )
            .with_score(150)
            .with_created_at(1_640_995_200)
            .with_url("https://reddit.com/dummy1")
            .with_num_comments(25),
            RawItem::new(
                "dummy_2",
                "Ethereum looks bearish",
                "Market sentiment is uncertain",
                "ethereum",
            )
            .with_score(75)
            .with_created_at(1_640_995_260)
            .with_url("https://reddit.com/dummy2")
            .with_num_comments(12),
        ]
    }
}

impl ItemSource for SampleSource {
    fn name(&self) -> &'static str {
        "sample"
    }

    fn fetch(&self, channel: &str, limit: usize) -> Result<Vec<RawItem>> {
        Ok(Self::posts()
            .into_iter()
            .filter(|post| post.channel == channel)
            .take(limit)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_posts_by_channel() {
        let bitcoin = SampleSource.fetch("Bitcoin", 10).unwrap();
        assert_eq!(bitcoin.len(), 1);
        assert_eq!(bitcoin[0].id, "dummy_1");
        assert_eq!(bitcoin[0].score, 150);

        let ethereum = SampleSource.fetch("ethereum", 10).unwrap();
        assert_eq!(ethereum.len(), 1);
        assert_eq!(ethereum[0].num_comments, Some(12));

        assert!(SampleSource.fetch("CryptoCurrency", 10).unwrap().is_empty());
    }

    #[test]
    fn test_sample_respects_limit() {
        assert!(SampleSource.fetch("Bitcoin", 0).unwrap().is_empty());
    }
}
