//! Configuration management.
//!
//! Values are resolved in three layers, later layers winning:
//! 1. Built-in defaults
//! 2. A TOML file (`--config`, `FEEDSIFT_CONFIG_PATH`, or the platform config dir)
//! 3. `FEEDSIFT_*` environment variables
//!
//! # Example file
//!
//! ```toml
//! db_path = "data/dupes.db"
//! channels = ["CryptoCurrency", "Bitcoin", "ethereum"]
//! fetch_limit = 100
//! output_path = "data/feedsift.csv"
//!
//! [dedup]
//! capacity = 100000
//! error_rate = 0.1
//! insert_ordering = "filter_first"
//!
//! [observability.logging]
//! format = "json"
//!
//! [observability.metrics]
//! enabled = true
//!
//! [observability.metrics.push_gateway]
//! endpoint = "http://localhost:9091/metrics/job/feedsift"
//! ```

use crate::services::deduplication::{DeduplicationConfig, InsertOrdering};
use crate::{Error, Result};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default channels polled on every run.
pub const DEFAULT_CHANNELS: [&str; 3] = ["CryptoCurrency", "Bitcoin", "ethereum"];

/// Main configuration for feedsift.
#[derive(Debug, Clone, Serialize)]
pub struct FeedsiftConfig {
    /// Path to the `SQLite` dedup database.
    pub db_path: PathBuf,
    /// Channels fetched on every run, in order.
    pub channels: Vec<String>,
    /// Maximum items fetched per channel.
    pub fetch_limit: usize,
    /// Directory of `<channel>.jsonl` files. `None` uses the built-in sample posts.
    pub source_dir: Option<PathBuf>,
    /// CSV output file.
    pub output_path: PathBuf,
    /// Whether survivors are scored for sentiment.
    pub sentiment_enabled: bool,
    /// Fixed run identifier. `None` derives one from the local time.
    pub run_id: Option<String>,
    /// Deduplication settings.
    pub dedup: DeduplicationConfig,
    /// Logging and metrics settings.
    pub observability: ObservabilitySettings,
}

/// Logging and metrics settings.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ObservabilitySettings {
    /// Logging settings.
    pub logging: LoggingSettings,
    /// Metrics settings.
    pub metrics: MetricsSettings,
}

/// Logging settings.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LoggingSettings {
    /// `pretty` or `json`.
    pub format: Option<String>,
    /// Append logs to this file instead of stderr.
    pub file: Option<PathBuf>,
    /// Default filter directive when `RUST_LOG` is unset.
    pub level: Option<String>,
}

/// Metrics settings.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MetricsSettings {
    /// Whether the Prometheus recorder is installed.
    pub enabled: bool,
    /// Optional push gateway target.
    pub push_gateway: Option<MetricsPushGatewaySettings>,
}

/// Prometheus push gateway settings.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsPushGatewaySettings {
    /// Push gateway endpoint URI.
    pub endpoint: String,
    /// Optional username for basic auth.
    pub username: Option<String>,
    /// Optional password for basic auth.
    #[serde(skip_serializing)]
    pub password: Option<SecretString>,
    /// POST (accumulate) instead of PUT (replace).
    pub use_http_post: bool,
}

/// Configuration file structure (for TOML parsing).
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Database path.
    pub db_path: Option<String>,
    /// Channels.
    pub channels: Option<Vec<String>>,
    /// Per-channel fetch limit.
    pub fetch_limit: Option<usize>,
    /// JSONL source directory.
    pub source_dir: Option<String>,
    /// CSV output path.
    pub output_path: Option<String>,
    /// Sentiment toggle.
    pub sentiment_enabled: Option<bool>,
    /// Fixed run identifier.
    pub run_id: Option<String>,
    /// Dedup section.
    pub dedup: Option<ConfigFileDedup>,
    /// Observability section.
    pub observability: Option<ConfigFileObservability>,
}

/// Dedup section in config file.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFileDedup {
    /// Filter capacity.
    pub capacity: Option<usize>,
    /// Filter false-positive rate.
    pub error_rate: Option<f64>,
    /// `filter_first` or `store_first`.
    pub insert_ordering: Option<String>,
}

/// Observability section in config file.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFileObservability {
    /// Logging subsection.
    pub logging: Option<ConfigFileLogging>,
    /// Metrics subsection.
    pub metrics: Option<ConfigFileMetrics>,
}

/// Logging subsection in config file.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFileLogging {
    /// Log format.
    pub format: Option<String>,
    /// Log file.
    pub file: Option<String>,
    /// Default level.
    pub level: Option<String>,
}

/// Metrics subsection in config file.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFileMetrics {
    /// Metrics toggle.
    pub enabled: Option<bool>,
    /// Push gateway subsection.
    pub push_gateway: Option<ConfigFilePushGateway>,
}

/// Push gateway subsection in config file.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFilePushGateway {
    /// Endpoint URI.
    pub endpoint: Option<String>,
    /// Basic auth username.
    pub username: Option<String>,
    /// Basic auth password.
    pub password: Option<String>,
    /// POST instead of PUT.
    pub use_http_post: Option<bool>,
}

impl Default for FeedsiftConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("data/dupes.db"),
            channels: DEFAULT_CHANNELS.iter().map(ToString::to_string).collect(),
            fetch_limit: 100,
            source_dir: None,
            output_path: PathBuf::from("data/feedsift.csv"),
            sentiment_enabled: true,
            run_id: None,
            dedup: DeduplicationConfig::default(),
            observability: ObservabilitySettings::default(),
        }
    }
}

impl FeedsiftConfig {
    /// Loads configuration from file and process environment, then validates it.
    ///
    /// `explicit` takes precedence over `FEEDSIFT_CONFIG_PATH`; with neither,
    /// the platform config file is used if present.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly named file cannot be read or parsed,
    /// an environment override is malformed, or validation fails.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        Self::load_with(explicit, &|key| std::env::var(key).ok())
    }

    /// Same as [`load`](Self::load) with a custom environment lookup.
    ///
    /// # Errors
    ///
    /// See [`load`](Self::load).
    pub fn load_with(explicit: Option<&Path>, env: &dyn Fn(&str) -> Option<String>) -> Result<Self> {
        let path = explicit
            .map(Path::to_path_buf)
            .or_else(|| env_string(env, "FEEDSIFT_CONFIG_PATH").map(PathBuf::from));

        let mut config = match path {
            Some(path) => Self::load_from_file(&path)?,
            None => Self::load_default(),
        };
        config.apply_env_overrides(env)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::OperationFailed {
            operation: "read_config_file".to_string(),
            cause: format!("{}: {e}", path.display()),
        })?;

        let file: ConfigFile = toml::from_str(&contents).map_err(|e| Error::OperationFailed {
            operation: "parse_config_file".to_string(),
            cause: e.to_string(),
        })?;

        Self::from_config_file(file)
    }

    /// Loads the platform config file, falling back to defaults.
    ///
    /// `~/.config/feedsift/config.toml` on Linux,
    /// `~/Library/Application Support/feedsift/config.toml` on macOS.
    #[must_use]
    pub fn load_default() -> Self {
        let Some(path) = default_config_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from_file(&path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Ignoring unreadable config file");
                Self::default()
            },
        }
    }

    /// Converts a `ConfigFile` to `FeedsiftConfig`.
    fn from_config_file(file: ConfigFile) -> Result<Self> {
        let mut config = Self::default();

        if let Some(db_path) = file.db_path {
            config.db_path = PathBuf::from(db_path);
        }
        if let Some(channels) = file.channels {
            config.channels = clean_channels(channels);
        }
        if let Some(limit) = file.fetch_limit {
            config.fetch_limit = limit;
        }
        config.source_dir = file.source_dir.map(PathBuf::from);
        if let Some(output_path) = file.output_path {
            config.output_path = PathBuf::from(output_path);
        }
        if let Some(enabled) = file.sentiment_enabled {
            config.sentiment_enabled = enabled;
        }
        config.run_id = file.run_id.filter(|id| !id.trim().is_empty());

        if let Some(dedup) = file.dedup {
            if let Some(capacity) = dedup.capacity {
                config.dedup.capacity = capacity;
            }
            if let Some(error_rate) = dedup.error_rate {
                config.dedup.error_rate = error_rate;
            }
            if let Some(ordering) = dedup.insert_ordering {
                config.dedup.insert_ordering = parse_ordering(&ordering)?;
            }
        }

        if let Some(observability) = file.observability {
            if let Some(logging) = observability.logging {
                config.observability.logging = LoggingSettings {
                    format: logging.format,
                    file: logging.file.map(PathBuf::from),
                    level: logging.level,
                };
            }
            if let Some(metrics) = observability.metrics {
                config.observability.metrics.enabled = metrics.enabled.unwrap_or(false);
                config.observability.metrics.push_gateway =
                    metrics.push_gateway.and_then(push_gateway_from_file);
            }
        }

        Ok(config)
    }

    /// Applies `FEEDSIFT_*` overrides from `env`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if a variable is set but cannot be parsed.
    pub fn apply_env_overrides(&mut self, env: &dyn Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(path) = env_string(env, "FEEDSIFT_DB_PATH") {
            self.db_path = PathBuf::from(path);
        }
        if let Some(capacity) = env_parse(env, "FEEDSIFT_CAPACITY")? {
            self.dedup.capacity = capacity;
        }
        if let Some(error_rate) = env_parse(env, "FEEDSIFT_ERROR_RATE")? {
            self.dedup.error_rate = error_rate;
        }
        if let Some(ordering) = env_string(env, "FEEDSIFT_INSERT_ORDERING") {
            self.dedup.insert_ordering = parse_ordering(&ordering)?;
        }
        if let Some(channels) = env_string(env, "FEEDSIFT_CHANNELS") {
            self.channels = clean_channels(channels.split(',').map(str::to_string).collect());
        }
        if let Some(limit) = env_parse(env, "FEEDSIFT_FETCH_LIMIT")? {
            self.fetch_limit = limit;
        }
        if let Some(dir) = env_string(env, "FEEDSIFT_SOURCE_DIR") {
            self.source_dir = Some(PathBuf::from(dir));
        }
        if let Some(path) = env_string(env, "FEEDSIFT_OUTPUT_PATH") {
            self.output_path = PathBuf::from(path);
        }
        if let Some(enabled) = env_bool(env, "FEEDSIFT_SENTIMENT_ENABLED")? {
            self.sentiment_enabled = enabled;
        }
        if let Some(run_id) = env_string(env, "FEEDSIFT_RUN_ID") {
            self.run_id = Some(run_id);
        }

        let logging = &mut self.observability.logging;
        if let Some(format) = env_string(env, "FEEDSIFT_LOG_FORMAT") {
            logging.format = Some(format);
        }
        if let Some(file) = env_string(env, "FEEDSIFT_LOG_FILE") {
            logging.file = Some(PathBuf::from(file));
        }

        let metrics = &mut self.observability.metrics;
        if let Some(enabled) = env_bool(env, "FEEDSIFT_METRICS_ENABLED")? {
            metrics.enabled = enabled;
        }
        apply_push_gateway_env_overrides(metrics, env)?;

        Ok(())
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for unusable dedup settings or a zero
    /// fetch limit.
    pub fn validate(&self) -> Result<()> {
        self.dedup.validate()?;
        if self.fetch_limit == 0 {
            return Err(Error::InvalidInput(
                "fetch limit must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Sets the database path.
    #[must_use]
    pub fn with_db_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.db_path = path.into();
        self
    }

    /// Sets the output path.
    #[must_use]
    pub fn with_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = path.into();
        self
    }

    /// Sets the JSONL source directory.
    #[must_use]
    pub fn with_source_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.source_dir = Some(dir.into());
        self
    }

    /// Sets the channel list.
    #[must_use]
    pub fn with_channels<I, S>(mut self, channels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.channels = clean_channels(channels.into_iter().map(Into::into).collect());
        self
    }
}

/// Path of the platform config file, if a home directory is known.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "feedsift")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

fn clean_channels(channels: Vec<String>) -> Vec<String> {
    channels
        .into_iter()
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .collect()
}

fn parse_ordering(value: &str) -> Result<InsertOrdering> {
    InsertOrdering::parse(value).ok_or_else(|| {
        Error::InvalidInput(format!(
            "insert ordering must be 'filter_first' or 'store_first', got '{value}'"
        ))
    })
}

fn push_gateway_from_file(file: ConfigFilePushGateway) -> Option<MetricsPushGatewaySettings> {
    let endpoint = non_empty(file.endpoint)?;
    Some(MetricsPushGatewaySettings {
        endpoint,
        username: non_empty(file.username),
        password: non_empty(file.password).map(SecretString::from),
        // POST accumulates rather than replacing the whole group
        use_http_post: file.use_http_post.unwrap_or(true),
    })
}

fn apply_push_gateway_env_overrides(
    metrics: &mut MetricsSettings,
    env: &dyn Fn(&str) -> Option<String>,
) -> Result<()> {
    let endpoint = env_string(env, "FEEDSIFT_METRICS_PUSH_GATEWAY_ENDPOINT");
    let username = env_string(env, "FEEDSIFT_METRICS_PUSH_GATEWAY_USERNAME");
    let password = env_string(env, "FEEDSIFT_METRICS_PUSH_GATEWAY_PASSWORD");
    let use_http_post = env_bool(env, "FEEDSIFT_METRICS_PUSH_GATEWAY_USE_POST")?;

    if endpoint.is_none() && username.is_none() && password.is_none() && use_http_post.is_none() {
        return Ok(());
    }

    let mut current = metrics
        .push_gateway
        .take()
        .unwrap_or(MetricsPushGatewaySettings {
            endpoint: String::new(),
            username: None,
            password: None,
            use_http_post: true,
        });

    if let Some(endpoint) = endpoint {
        current.endpoint = endpoint;
    }
    if let Some(username) = username {
        current.username = Some(username);
    }
    if let Some(password) = password {
        current.password = Some(SecretString::from(password));
    }
    if let Some(use_http_post) = use_http_post {
        current.use_http_post = use_http_post;
    }

    if !current.endpoint.trim().is_empty() {
        metrics.push_gateway = Some(current);
    }
    Ok(())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_string(env: &dyn Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    non_empty(env(key))
}

fn env_parse<T>(env: &dyn Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    env_string(env, key)
        .map(|value| {
            value
                .parse::<T>()
                .map_err(|e| Error::InvalidInput(format!("{key}='{value}': {e}")))
        })
        .transpose()
}

fn env_bool(env: &dyn Fn(&str) -> Option<String>, key: &str) -> Result<Option<bool>> {
    env_string(env, key)
        .map(|value| match value.to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            _ => Err(Error::InvalidInput(format!(
                "{key}='{value}': expected a boolean"
            ))),
        })
        .transpose()
}
