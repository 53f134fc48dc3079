//! Scorer used when sentiment analysis is disabled.

use super::SentimentScorer;
use crate::Result;
use crate::models::Sentiment;

/// Scores every text as [`Sentiment::neutral`].
#[derive(Debug, Clone, Copy, Default)]
pub struct NeutralScorer;

impl NeutralScorer {
    /// Creates a new neutral scorer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl SentimentScorer for NeutralScorer {
    fn name(&self) -> &'static str {
        "neutral"
    }

    fn score(&self, _text: &str) -> Result<Sentiment> {
        Ok(Sentiment::neutral())
    }
}
