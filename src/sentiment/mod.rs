//! Sentiment scoring.
//!
//! Scorers are pluggable behind [`SentimentScorer`]. [`analyze_batch`] wraps
//! any scorer so that a failure never reaches the pipeline: a failed chunk is
//! retried text by text, and a text that still fails scores neutral.

mod lexicon;
mod neutral;

pub use lexicon::LexiconScorer;
pub use neutral::NeutralScorer;

use crate::Result;
use crate::models::Sentiment;

/// Longest text, in characters, handed to a scorer.
pub const MAX_TEXT_CHARS: usize = 400;

/// Texts per [`SentimentScorer::score_batch`] call.
pub const BATCH_SIZE: usize = 8;

/// Trait for sentiment scorers.
pub trait SentimentScorer: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Scores a single text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text cannot be scored.
    fn score(&self, text: &str) -> Result<Sentiment>;

    /// Scores several texts, one result per input in order.
    ///
    /// # Errors
    ///
    /// Returns an error if any text cannot be scored.
    fn score_batch(&self, texts: &[String]) -> Result<Vec<Sentiment>> {
        texts.iter().map(|t| self.score(t)).collect()
    }
}

/// Trims `text` and truncates it to [`MAX_TEXT_CHARS`] characters.
#[must_use]
pub fn prepare_text(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= MAX_TEXT_CHARS {
        return trimmed.to_string();
    }
    tracing::debug!(max_chars = MAX_TEXT_CHARS, "Truncating text for sentiment scoring");
    trimmed.chars().take(MAX_TEXT_CHARS).collect()
}

/// Scores every text, returning exactly one result per input.
///
/// Empty texts score neutral without reaching the scorer.
pub fn analyze_batch(scorer: &dyn SentimentScorer, texts: &[String]) -> Vec<Sentiment> {
    let prepared: Vec<String> = texts.iter().map(|t| prepare_text(t)).collect();
    let mut results = vec![Sentiment::neutral(); prepared.len()];

    let pending: Vec<usize> = prepared
        .iter()
        .enumerate()
        .filter(|(_, text)| !text.is_empty())
        .map(|(i, _)| i)
        .collect();

    for chunk in pending.chunks(BATCH_SIZE) {
        let batch: Vec<String> = chunk.iter().map(|&i| prepared[i].clone()).collect();
        match scorer.score_batch(&batch) {
            Ok(scores) if scores.len() == chunk.len() => {
                for (&i, score) in chunk.iter().zip(scores) {
                    results[i] = score;
                }
            },
            Ok(scores) => {
                tracing::warn!(
                    scorer = scorer.name(),
                    expected = chunk.len(),
                    got = scores.len(),
                    "Scorer returned wrong number of results, using neutral"
                );
            },
            Err(e) => {
                tracing::warn!(
                    scorer = scorer.name(),
                    error = %e,
                    "Batch scoring failed, retrying texts individually"
                );
                for &i in chunk {
                    match scorer.score(&prepared[i]) {
                        Ok(score) => results[i] = score,
                        Err(e) => {
                            tracing::warn!(scorer = scorer.name(), error = %e, "Scoring failed, using neutral");
                        },
                    }
                }
            },
        }
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use crate::models::SentimentLabel;

    /// Positive for everything, except texts containing "boom" which error.
    struct Touchy;

    impl SentimentScorer for Touchy {
        fn name(&self) -> &'static str {
            "touchy"
        }

        fn score(&self, text: &str) -> Result<Sentiment> {
            if text.contains("boom") {
                return Err(Error::operation("score", "model exploded"));
            }
            Ok(Sentiment::from_scores(0.9, 0.05, 0.05))
        }
    }

    struct ShortChanged;

    impl SentimentScorer for ShortChanged {
        fn name(&self) -> &'static str {
            "short"
        }

        fn score(&self, _text: &str) -> Result<Sentiment> {
            Ok(Sentiment::from_scores(0.0, 1.0, 0.0))
        }

        fn score_batch(&self, _texts: &[String]) -> Result<Vec<Sentiment>> {
            Ok(Vec::new())
        }
    }

    fn texts(raw: &[&str]) -> Vec<String> {
        raw.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_prepare_text_trims_and_truncates() {
        assert_eq!(prepare_text("  hi  "), "hi");
        let long = "é".repeat(MAX_TEXT_CHARS + 50);
        assert_eq!(prepare_text(&long).chars().count(), MAX_TEXT_CHARS);
    }

    #[test]
    fn test_failed_batch_retries_individually() {
        let results = analyze_batch(&Touchy, &texts(&["fine", "boom", "also fine"]));
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].label, SentimentLabel::Positive);
        assert_eq!(results[1], Sentiment::neutral());
        assert_eq!(results[2].label, SentimentLabel::Positive);
    }

    #[test]
    fn test_empty_text_is_neutral() {
        let results = analyze_batch(&Touchy, &texts(&["   ", "ok"]));
        assert_eq!(results[0], Sentiment::neutral());
        assert_eq!(results[1].label, SentimentLabel::Positive);
    }

    #[test]
    fn test_length_mismatch_falls_back_to_neutral() {
        let results = analyze_batch(&ShortChanged, &texts(&["a", "b"]));
        assert_eq!(results, vec![Sentiment::neutral(); 2]);
    }

    #[test]
    fn test_more_texts_than_batch_size() {
        let input: Vec<String> = (0..BATCH_SIZE * 2 + 3).map(|i| format!("text {i}")).collect();
        let results = analyze_batch(&Touchy, &input);
        assert_eq!(results.len(), input.len());
        assert!(results.iter().all(|s| s.label == SentimentLabel::Positive));
    }
}
