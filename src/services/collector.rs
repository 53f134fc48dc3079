//! Collection pipeline.
//!
//! One run: fetch every channel, drop seen content, score the survivors,
//! write them to CSV. Runs that end up with nothing to write stop early and
//! leave the previous output file untouched.

use crate::config::FeedsiftConfig;
use crate::io::write_rows_to_path;
use crate::models::{OutputRow, SentimentLabel};
use crate::sentiment::{LexiconScorer, NeutralScorer, SentimentScorer, analyze_batch};
use crate::services::DeduplicationService;
use crate::sources::{ItemSource, JsonlDirectorySource, SampleSource, collect_all};
use crate::storage::SqliteRecordStore;
use crate::{Result, current_timestamp};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::instrument;

/// Outcome of one collection run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Run identifier stamped on every output row.
    pub run_id: String,
    /// Items fetched across all channels.
    pub fetched: usize,
    /// Items that survived deduplication.
    pub survivors: usize,
    /// Items dropped as duplicates.
    pub duplicates_removed: usize,
    /// Channels whose fetch failed.
    pub failed_channels: Vec<String>,
    /// File written, if the run produced output.
    pub output_path: Option<PathBuf>,
    /// Survivors per sentiment label.
    pub sentiment: BTreeMap<SentimentLabel, usize>,
}

/// Runs the fetch, dedup, score, write pipeline.
pub struct CollectorService {
    dedup: Arc<DeduplicationService>,
    source: Arc<dyn ItemSource>,
    scorer: Arc<dyn SentimentScorer>,
    channels: Vec<String>,
    fetch_limit: usize,
    output_path: PathBuf,
    run_id: String,
}

impl CollectorService {
    /// Creates a collector with default channels, limit, and output path.
    #[must_use]
    pub fn new(
        dedup: Arc<DeduplicationService>,
        source: Arc<dyn ItemSource>,
        scorer: Arc<dyn SentimentScorer>,
    ) -> Self {
        let defaults = FeedsiftConfig::default();
        Self {
            dedup,
            source,
            scorer,
            channels: defaults.channels,
            fetch_limit: defaults.fetch_limit,
            output_path: defaults.output_path,
            run_id: default_run_id(),
        }
    }

    /// Builds the full pipeline from configuration.
    ///
    /// Opens the `SQLite` store at `config.db_path`, picks the JSONL source
    /// when `source_dir` is set (sample posts otherwise), and the lexicon
    /// scorer when sentiment is enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be opened or the dedup settings
    /// are invalid.
    pub fn from_config(config: &FeedsiftConfig) -> Result<Self> {
        let store = Arc::new(SqliteRecordStore::open(&config.db_path)?);
        let dedup = Arc::new(DeduplicationService::open(store, config.dedup.clone())?);

        let source: Arc<dyn ItemSource> = match &config.source_dir {
            Some(dir) => Arc::new(JsonlDirectorySource::new(dir)),
            None => {
                tracing::info!("No source directory configured, using sample posts");
                Arc::new(SampleSource)
            },
        };
        let scorer: Arc<dyn SentimentScorer> = if config.sentiment_enabled {
            Arc::new(LexiconScorer::new())
        } else {
            Arc::new(NeutralScorer::new())
        };

        let mut collector = Self::new(dedup, source, scorer)
            .with_channels(config.channels.clone())
            .with_fetch_limit(config.fetch_limit)
            .with_output_path(config.output_path.clone());
        if let Some(run_id) = &config.run_id {
            collector = collector.with_run_id(run_id.clone());
        }
        Ok(collector)
    }

    /// Sets the channel list.
    #[must_use]
    pub fn with_channels(mut self, channels: Vec<String>) -> Self {
        self.channels = channels;
        self
    }

    /// Sets the per-channel fetch limit.
    #[must_use]
    pub fn with_fetch_limit(mut self, limit: usize) -> Self {
        self.fetch_limit = limit;
        self
    }

    /// Sets the CSV output path.
    #[must_use]
    pub fn with_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = path.into();
        self
    }

    /// Sets the run identifier.
    #[must_use]
    pub fn with_run_id(mut self, run_id: impl Into<String>) -> Self {
        self.run_id = run_id.into();
        self
    }

    /// Returns the run identifier.
    #[must_use]
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Returns the deduplication service.
    #[must_use]
    pub const fn dedup(&self) -> &Arc<DeduplicationService> {
        &self.dedup
    }

    /// Runs one collection cycle.
    ///
    /// Channel fetch failures, store faults during dedup, and scoring
    /// failures are logged and absorbed.
    ///
    /// # Errors
    ///
    /// Returns an error only if the output file cannot be written.
    #[allow(clippy::cast_precision_loss)]
    #[instrument(skip(self), fields(operation = "run_once", run_id = %self.run_id))]
    pub fn run_once(&self) -> Result<RunSummary> {
        let start = Instant::now();
        tracing::info!(source = self.source.name(), channels = ?self.channels, "Starting collection run");

        let mut summary = RunSummary {
            run_id: self.run_id.clone(),
            ..RunSummary::default()
        };

        let report = collect_all(self.source.as_ref(), &self.channels, self.fetch_limit);
        summary.failed_channels = report.failed_channels;
        summary.fetched = report.items.len();

        if report.items.is_empty() {
            tracing::warn!("No posts fetched, ending run");
            record_pipeline_error("no_posts_fetched");
            return Ok(summary);
        }

        tracing::info!(count = summary.fetched, "Deduplicating posts");
        let outcome = self.dedup.filter_batch(report.items);
        summary.duplicates_removed = outcome.duplicates_removed;
        summary.survivors = outcome.survivors.len();
        metrics::counter!("posts_deduplicated_total").increment(outcome.duplicates_removed as u64);

        if outcome.survivors.is_empty() {
            tracing::warn!("No unique posts after deduplication, ending run");
            record_pipeline_error("no_unique_posts");
            return Ok(summary);
        }

        let texts: Vec<String> = outcome.survivors.iter().map(|item| item.sentiment_text()).collect();
        let scoring_start = Instant::now();
        let sentiments = analyze_batch(self.scorer.as_ref(), &texts);
        let scoring_secs = scoring_start.elapsed().as_secs_f64();
        metrics::histogram!("sentiment_analysis_duration_seconds").record(scoring_secs);

        for sentiment in &sentiments {
            *summary.sentiment.entry(sentiment.label).or_insert(0) += 1;
        }
        for (label, count) in &summary.sentiment {
            metrics::counter!("sentiment_distribution_total", "label" => label.as_str())
                .increment(*count as u64);
        }
        tracing::info!(
            scorer = self.scorer.name(),
            count = sentiments.len(),
            duration_secs = scoring_secs,
            distribution = ?summary.sentiment,
            "Sentiment analysis completed"
        );

        let rows: Vec<OutputRow> = outcome
            .survivors
            .into_iter()
            .zip(sentiments)
            .map(|(item, sentiment)| OutputRow::new(item, sentiment, &self.run_id))
            .collect();
        metrics::counter!("posts_processed_total").increment(rows.len() as u64);

        if let Err(e) = write_rows_to_path(&self.output_path, &rows) {
            tracing::error!(error = %e, path = %self.output_path.display(), "Failed to save output");
            record_pipeline_error("execution_failed");
            return Err(e);
        }
        summary.output_path = Some(self.output_path.clone());

        match self.dedup.stats() {
            Ok(stats) => tracing::info!(
                total_posts = stats.total_posts,
                by_channel = ?stats.by_channel,
                "Deduplication stats"
            ),
            Err(e) => tracing::warn!(error = %e, "Failed to read deduplication stats"),
        }

        let total_secs = start.elapsed().as_secs_f64();
        metrics::gauge!("pipeline_last_successful_run_timestamp").set(current_timestamp() as f64);
        metrics::histogram!("pipeline_total_duration_seconds").record(total_secs);
        tracing::info!(
            written = rows.len(),
            duration_secs = total_secs,
            "Collection completed successfully"
        );

        Ok(summary)
    }
}

/// Local-time run identifier, `YYYYMMDD_HHMMSS`.
#[must_use]
pub fn default_run_id() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}

fn record_pipeline_error(error_type: &'static str) {
    metrics::counter!(
        "pipeline_errors_total",
        "component" => "pipeline",
        "error_type" => error_type
    )
    .increment(1);
}
