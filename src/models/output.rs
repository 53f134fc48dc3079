//! Output rows written by the tabular writer.

use super::{RawItem, Sentiment};
use serde::Serialize;

/// Column order of the output file.
///
/// Names match the legacy collector output so downstream consumers keep working.
pub const OUTPUT_COLUMNS: [&str; 15] = [
    "post_id",
    "title",
    "content",
    "score",
    "created_utc",
    "subreddit",
    "url",
    "num_comments",
    "sentiment_label",
    "sentiment_confidence",
    "sentiment_positive",
    "sentiment_negative",
    "sentiment_neutral",
    "sentiment_score",
    "run_id",
];

/// One accepted item joined with its sentiment and run identifier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputRow {
    /// Item identifier.
    pub post_id: String,
    /// Title.
    pub title: String,
    /// Body text.
    pub content: String,
    /// Score at fetch time.
    pub score: i64,
    /// Creation time (Unix epoch seconds).
    pub created_utc: i64,
    /// Channel.
    pub subreddit: String,
    /// Permalink, empty when unknown.
    pub url: String,
    /// Comment count, empty when unknown.
    pub num_comments: Option<u64>,
    /// Dominant sentiment label.
    pub sentiment_label: String,
    /// Dominant class score.
    pub sentiment_confidence: f64,
    /// Positive class score.
    pub sentiment_positive: f64,
    /// Negative class score.
    pub sentiment_negative: f64,
    /// Neutral class score.
    pub sentiment_neutral: f64,
    /// Same as `sentiment_confidence`; kept for older dashboards.
    pub sentiment_score: f64,
    /// Collection run identifier.
    pub run_id: String,
}

impl OutputRow {
    /// Joins an item with its sentiment.
    #[must_use]
    pub fn new(item: RawItem, sentiment: Sentiment, run_id: &str) -> Self {
        Self {
            post_id: item.id,
            title: item.title,
            content: item.body,
            score: item.score,
            created_utc: item.created_at,
            subreddit: item.channel,
            url: item.url.unwrap_or_default(),
            num_comments: item.num_comments,
            sentiment_label: sentiment.label.as_str().to_string(),
            sentiment_confidence: sentiment.confidence,
            sentiment_positive: sentiment.positive,
            sentiment_negative: sentiment.negative,
            sentiment_neutral: sentiment.neutral,
            sentiment_score: sentiment.confidence,
            run_id: run_id.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_from_item() {
        let item = RawItem::new("p1", "Bitcoin rises", "BTC up 5%", "Bitcoin")
            .with_score(150)
            .with_created_at(1_640_995_200);
        let row = OutputRow::new(item, Sentiment::neutral(), "20240101_000000");

        assert_eq!(row.post_id, "p1");
        assert_eq!(row.subreddit, "Bitcoin");
        assert_eq!(row.url, "");
        assert_eq!(row.sentiment_label, "neutral");
        assert!((row.sentiment_score - row.sentiment_confidence).abs() < f64::EPSILON);
        assert_eq!(row.run_id, "20240101_000000");
    }
}
