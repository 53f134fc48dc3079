//! Prometheus metrics.
//!
//! The recorder is installed without an HTTP listener. Short-lived runs push
//! the rendered exposition text to a Prometheus push gateway at shutdown.

use crate::config::MetricsSettings;
use crate::{Error, Result};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;

/// Push gateway configuration.
#[derive(Debug, Clone)]
pub struct PushGatewayConfig {
    /// Push gateway endpoint URI.
    pub endpoint: String,
    /// Optional username for basic auth.
    pub username: Option<String>,
    /// Optional password for basic auth.
    pub password: Option<SecretString>,
    /// Whether to use HTTP POST instead of PUT.
    pub use_http_post: bool,
}

/// Metrics configuration.
#[derive(Debug, Clone, Default)]
pub struct MetricsConfig {
    /// Whether metrics are enabled.
    pub enabled: bool,
    /// Optional push gateway configuration.
    pub push_gateway: Option<PushGatewayConfig>,
}

impl MetricsConfig {
    /// Builds metrics configuration from settings.
    #[must_use]
    pub fn from_settings(settings: &MetricsSettings) -> Self {
        Self {
            enabled: settings.enabled,
            push_gateway: settings.push_gateway.as_ref().map(|gw| PushGatewayConfig {
                endpoint: gw.endpoint.clone(),
                username: gw.username.clone(),
                password: gw.password.clone(),
                use_http_post: gw.use_http_post,
            }),
        }
    }
}

/// Metrics handle for rendering and flushing on shutdown.
#[derive(Debug)]
pub struct MetricsHandle {
    prometheus: PrometheusHandle,
    push_gateway: Option<PushGatewayConfig>,
}

impl MetricsHandle {
    /// Renders the current metrics in Prometheus text format.
    #[must_use]
    pub fn render(&self) -> String {
        self.prometheus.render()
    }
}

/// Installs the Prometheus recorder as the process-wide `metrics` recorder.
///
/// Returns `None` when metrics are disabled.
///
/// # Errors
///
/// Returns an error if a global recorder is already installed.
pub fn install_prometheus(config: &MetricsConfig) -> Result<Option<MetricsHandle>> {
    if !config.enabled {
        return Ok(None);
    }

    let prometheus = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| Error::OperationFailed {
            operation: "metrics_recorder_install".to_string(),
            cause: e.to_string(),
        })?;

    Ok(Some(MetricsHandle {
        prometheus,
        push_gateway: config.push_gateway.clone(),
    }))
}

/// Pushes metrics to the push gateway if configured.
///
/// Failures are logged and otherwise ignored.
pub fn flush(handle: &MetricsHandle) {
    let Some(push_gateway) = &handle.push_gateway else {
        tracing::debug!("No push gateway configured, skipping flush");
        return;
    };

    let mut payload = handle.render();
    // The push gateway rejects bodies without a trailing newline
    if !payload.ends_with('\n') {
        payload.push('\n');
    }

    tracing::debug!(
        bytes = payload.len(),
        endpoint = %push_gateway.endpoint,
        "Pushing metrics to push gateway"
    );
    flush_to_gateway(push_gateway, payload);
}

fn flush_to_gateway(gateway: &PushGatewayConfig, payload: String) {
    let client = Client::new();

    let request = if gateway.use_http_post {
        client.post(&gateway.endpoint)
    } else {
        client.put(&gateway.endpoint)
    };

    let request = if let Some(username) = &gateway.username {
        request.basic_auth(
            username,
            gateway.password.as_ref().map(|p| p.expose_secret().to_string()),
        )
    } else {
        request
    };

    let response = request
        .header(CONTENT_TYPE, "text/plain; version=0.0.4")
        .timeout(Duration::from_secs(5))
        .body(payload)
        .send();

    match response {
        Ok(resp) => {
            if resp.status().is_success() {
                tracing::debug!(status = %resp.status(), "Metrics pushed successfully");
            } else {
                tracing::warn!(status = %resp.status(), "Metrics push failed");
            }
        },
        Err(err) => {
            tracing::warn!("Failed to push metrics: {err}");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MetricsPushGatewaySettings;

    #[test]
    fn test_local_recorder_renders_counters() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        metrics::with_local_recorder(&recorder, || {
            metrics::counter!("dedup_duplicates_total").increment(2);
        });

        assert!(handle.render().contains("dedup_duplicates_total 2"));
    }

    #[test]
    fn test_disabled_metrics_install_nothing() {
        let handle = install_prometheus(&MetricsConfig::default()).unwrap();
        assert!(handle.is_none());
    }

    #[test]
    fn test_from_settings_copies_gateway() {
        let settings = MetricsSettings {
            enabled: true,
            push_gateway: Some(MetricsPushGatewaySettings {
                endpoint: "http://gw:9091".to_string(),
                username: Some("ops".to_string()),
                password: Some(SecretString::from("pw".to_string())),
                use_http_post: false,
            }),
        };
        let config = MetricsConfig::from_settings(&settings);
        let gateway = config.push_gateway.unwrap();
        assert!(config.enabled);
        assert_eq!(gateway.endpoint, "http://gw:9091");
        assert!(!gateway.use_http_post);
        assert_eq!(gateway.password.unwrap().expose_secret(), "pw");
    }
}
