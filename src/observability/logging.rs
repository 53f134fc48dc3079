//! Structured logging configuration.

use crate::config::LoggingSettings;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable multi-line output.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

impl LogFormat {
    /// Parses a format name. Unknown names fall back to `Pretty`.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Pretty,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Output format.
    pub format: LogFormat,
    /// Append to this file instead of writing to stderr.
    pub file: Option<PathBuf>,
    /// Filter directive used when `RUST_LOG` is unset.
    pub default_directive: String,
}

impl LoggingConfig {
    /// Builds logging configuration from settings.
    ///
    /// `verbose` lowers the default level to `debug`; an explicit level in
    /// settings wins over both.
    #[must_use]
    pub fn from_settings(settings: &LoggingSettings, verbose: bool) -> Self {
        let fallback = if verbose { "debug" } else { "info" };
        Self {
            format: settings
                .format
                .as_deref()
                .map_or(LogFormat::Pretty, LogFormat::parse),
            file: settings.file.clone(),
            default_directive: settings
                .level
                .clone()
                .unwrap_or_else(|| fallback.to_string()),
        }
    }

    /// Builds the event filter: `RUST_LOG` if set, the default directive otherwise.
    #[must_use]
    pub fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&self.default_directive))
    }
}
