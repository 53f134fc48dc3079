//! Raw items handed over by item sources.

use serde::{Deserialize, Deserializer, Serialize};

/// A single post as produced by an item source.
///
/// `title` and `body` are always present in the internal model; missing or
/// `null` values in source data decode to the empty string.
///
/// Field aliases accept the column names of the legacy collector output
/// (`post_id`, `content`, `subreddit`, `created_utc`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawItem {
    /// Source-assigned identifier.
    #[serde(alias = "post_id")]
    pub id: String,
    /// Post title.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    /// Post body text.
    #[serde(default, alias = "content", deserialize_with = "null_as_empty")]
    pub body: String,
    /// Numeric score (upvotes) at fetch time.
    #[serde(default)]
    pub score: i64,
    /// Channel (forum/subreddit) the item was fetched from.
    #[serde(default, alias = "subreddit", deserialize_with = "null_as_empty")]
    pub channel: String,
    /// Creation time (Unix epoch seconds).
    #[serde(default, alias = "created_utc")]
    pub created_at: i64,
    /// Permalink, when the source provides one.
    #[serde(default)]
    pub url: Option<String>,
    /// Comment count, when the source provides one.
    #[serde(default)]
    pub num_comments: Option<u64>,
}

impl RawItem {
    /// Creates an item with zero score and timestamp.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        body: impl Into<String>,
        channel: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            body: body.into(),
            score: 0,
            channel: channel.into(),
            created_at: 0,
            url: None,
            num_comments: None,
        }
    }

    /// Sets the score.
    #[must_use]
    pub const fn with_score(mut self, score: i64) -> Self {
        self.score = score;
        self
    }

    /// Sets the creation timestamp.
    #[must_use]
    pub const fn with_created_at(mut self, created_at: i64) -> Self {
        self.created_at = created_at;
        self
    }

    /// Sets the permalink.
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Sets the comment count.
    #[must_use]
    pub const fn with_num_comments(mut self, num_comments: u64) -> Self {
        self.num_comments = Some(num_comments);
        self
    }

    /// Text submitted to the sentiment scorer.
    ///
    /// `"{title}. {body}"` when the body is non-empty, otherwise the title.
    #[must_use]
    pub fn sentiment_text(&self) -> String {
        if self.body.is_empty() {
            self.title.clone()
        } else {
            format!("{}. {}", self.title, self.body).trim().to_string()
        }
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_null_and_missing_fields() {
        let item: RawItem =
            serde_json::from_str(r#"{"id":"p1","title":null,"channel":"Bitcoin"}"#).unwrap();
        assert_eq!(item.title, "");
        assert_eq!(item.body, "");
        assert_eq!(item.score, 0);
        assert_eq!(item.created_at, 0);
        assert!(item.url.is_none());
    }

    #[test]
    fn test_deserialize_legacy_aliases() {
        let item: RawItem = serde_json::from_str(
            r#"{"post_id":"abc","title":"t","content":"c","subreddit":"ethereum","created_utc":1640995200,"score":7}"#,
        )
        .unwrap();
        assert_eq!(item.id, "abc");
        assert_eq!(item.body, "c");
        assert_eq!(item.channel, "ethereum");
        assert_eq!(item.created_at, 1_640_995_200);
        assert_eq!(item.score, 7);
    }

    #[test]
    fn test_sentiment_text() {
        let item = RawItem::new("p1", "Bitcoin rises", "BTC up 5%", "Bitcoin");
        assert_eq!(item.sentiment_text(), "Bitcoin rises. BTC up 5%");

        let title_only = RawItem::new("p2", "Ethereum news", "", "ethereum");
        assert_eq!(title_only.sentiment_text(), "Ethereum news");
    }

    #[test]
    fn test_builders() {
        let item = RawItem::new("p1", "t", "b", "c")
            .with_score(150)
            .with_created_at(42)
            .with_url("https://example.com/p1")
            .with_num_comments(3);
        assert_eq!(item.score, 150);
        assert_eq!(item.created_at, 42);
        assert_eq!(item.url.as_deref(), Some("https://example.com/p1"));
        assert_eq!(item.num_comments, Some(3));
    }
}
