//! Sentiment classification results.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Dominant sentiment class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    /// Positive outlook.
    Positive,
    /// Negative outlook.
    Negative,
    /// Neither.
    Neutral,
}

impl SentimentLabel {
    /// Returns the label as a lowercase string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
            Self::Neutral => "neutral",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification of one text: dominant label plus per-class scores.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sentiment {
    /// Dominant class.
    pub label: SentimentLabel,
    /// Score of the dominant class.
    pub confidence: f64,
    /// Positive class score.
    pub positive: f64,
    /// Negative class score.
    pub negative: f64,
    /// Neutral class score.
    pub neutral: f64,
}

impl Sentiment {
    /// Default used whenever scoring is unavailable or fails.
    #[must_use]
    pub const fn neutral() -> Self {
        Self {
            label: SentimentLabel::Neutral,
            confidence: 0.5,
            positive: 0.33,
            negative: 0.33,
            neutral: 0.34,
        }
    }

    /// Builds a classification from per-class scores, picking the highest.
    ///
    /// Ties resolve to neutral, then positive.
    #[must_use]
    pub fn from_scores(positive: f64, negative: f64, neutral: f64) -> Self {
        let (label, confidence) = if neutral >= positive && neutral >= negative {
            (SentimentLabel::Neutral, neutral)
        } else if positive >= negative {
            (SentimentLabel::Positive, positive)
        } else {
            (SentimentLabel::Negative, negative)
        };
        Self {
            label,
            confidence,
            positive,
            negative,
            neutral,
        }
    }
}

impl Default for Sentiment {
    fn default() -> Self {
        Self::neutral()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neutral_default_values() {
        let s = Sentiment::default();
        assert_eq!(s.label, SentimentLabel::Neutral);
        assert!((s.confidence - 0.5).abs() < f64::EPSILON);
        assert!((s.positive + s.negative + s.neutral - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_from_scores_picks_max() {
        let s = Sentiment::from_scores(0.7, 0.2, 0.1);
        assert_eq!(s.label, SentimentLabel::Positive);
        assert!((s.confidence - 0.7).abs() < f64::EPSILON);

        let s = Sentiment::from_scores(0.1, 0.6, 0.3);
        assert_eq!(s.label, SentimentLabel::Negative);
    }

    #[test]
    fn test_from_scores_tie_prefers_neutral() {
        let s = Sentiment::from_scores(0.4, 0.2, 0.4);
        assert_eq!(s.label, SentimentLabel::Neutral);
    }
}
