//! Word-list sentiment scorer tuned for market chatter.

use super::SentimentScorer;
use crate::Result;
use crate::models::Sentiment;
use regex::Regex;
use std::sync::LazyLock;

static WORD: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"[a-z][a-z']*").ok());

const POSITIVE_WORDS: &[&str] = &[
    "adoption", "beat", "breakout", "bull", "bullish", "buy", "gain", "gains", "good", "great",
    "growth", "high", "moon", "optimistic", "profit", "rally", "record", "rise", "rises",
    "rising", "soar", "soaring", "strong", "surge", "up", "upgrade", "win",
];

const NEGATIVE_WORDS: &[&str] = &[
    "ban", "bad", "bear", "bearish", "collapse", "crash", "decline", "down", "drop", "dump",
    "fall", "falls", "fear", "fraud", "hack", "loss", "losses", "low", "plunge", "risk", "scam",
    "sell", "uncertain", "weak", "worse", "worst",
];

/// Logit for the neutral class; a single polar word outweighs it.
const NEUTRAL_BIAS: f64 = 0.5;

/// Counts positive and negative words and softmaxes the counts.
///
/// Text with no polar words comes out neutral.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexiconScorer;

impl LexiconScorer {
    /// Creates a new lexicon scorer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Returns (positive, negative) word counts.
    fn count_hits(text: &str) -> (usize, usize) {
        let Some(word) = WORD.as_ref() else {
            return (0, 0);
        };
        let lowered = text.to_lowercase();
        word.find_iter(&lowered)
            .map(|m| m.as_str())
            .fold((0, 0), |(pos, neg), token| {
                if POSITIVE_WORDS.contains(&token) {
                    (pos + 1, neg)
                } else if NEGATIVE_WORDS.contains(&token) {
                    (pos, neg + 1)
                } else {
                    (pos, neg)
                }
            })
    }
}

impl SentimentScorer for LexiconScorer {
    fn name(&self) -> &'static str {
        "lexicon"
    }

    #[allow(clippy::cast_precision_loss)]
    fn score(&self, text: &str) -> Result<Sentiment> {
        let (pos, neg) = Self::count_hits(text);
        let logits = [pos as f64, neg as f64, NEUTRAL_BIAS];
        let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let exp = logits.map(|l| (l - max).exp());
        let sum: f64 = exp.iter().sum();
        Ok(Sentiment::from_scores(exp[0] / sum, exp[1] / sum, exp[2] / sum))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SentimentLabel;
    use test_case::test_case;

    #[test_case("Bitcoin price rising!. Great news for crypto investors", SentimentLabel::Positive ; "sample bullish post")]
    #[test_case("Ethereum looks bearish. Market sentiment is uncertain", SentimentLabel::Negative ; "sample bearish post")]
    #[test_case("Weekly discussion thread", SentimentLabel::Neutral ; "no polar words")]
    #[test_case("Crash incoming as markets drop", SentimentLabel::Negative ; "negative headline")]
    fn test_lexicon_labels(text: &str, expected: SentimentLabel) {
        assert_eq!(LexiconScorer.score(text).unwrap().label, expected);
    }

    #[test]
    fn test_scores_sum_to_one() {
        let s = LexiconScorer.score("Huge RALLY, bulls win").unwrap();
        assert!((s.positive + s.negative + s.neutral - 1.0).abs() < 1e-9);
        assert!(s.confidence >= s.negative);
    }
}
