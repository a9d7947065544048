// src/config/models.rs
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

pub const DEFAULT_SERVICE_A_URL: &str = "http://localhost:18080";
pub const DEFAULT_SERVICE_B_URL: &str = "http://localhost:18000";
pub const DEFAULT_SERVICE_A_LABEL: &str = "Service A";
pub const DEFAULT_SERVICE_B_LABEL: &str = "Service B";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default)]
    pub endpoints: EndpointsConfig,
    #[serde(default)]
    pub poll: PollConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Where the two services live. Every field is optional; the endpoint
/// resolver substitutes the documented defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EndpointsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_a_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_b_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_a_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_b_label: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    #[serde(default = "default_poll_path")]
    pub path: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_subtitle")]
    pub subtitle: String,
    /// Runtime-mode label shown in the footer. Passed through untouched.
    #[serde(default = "default_environment")]
    pub environment: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_metrics_path")]
    pub path: String,
}

fn default_poll_path() -> String {
    "/api/hello".to_string()
}

fn default_timeout_secs() -> u64 {
    5
}

fn default_title() -> String {
    "DevOps Pipeline Dashboard".to_string()
}

fn default_subtitle() -> String {
    "Blue-Green Deployment Status".to_string()
}

fn default_environment() -> String {
    "development".to_string()
}

fn default_true() -> bool {
    true
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            path: default_poll_path(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            subtitle: default_subtitle(),
            environment: default_environment(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            path: default_metrics_path(),
        }
    }
}

impl EndpointsConfig {
    /// Display labels after blank values fall back to the defaults.
    pub fn labels(&self) -> (&str, &str) {
        (
            non_blank(self.service_a_label.as_deref()).unwrap_or(DEFAULT_SERVICE_A_LABEL),
            non_blank(self.service_b_label.as_deref()).unwrap_or(DEFAULT_SERVICE_B_LABEL),
        )
    }
}

/// Trims and drops empty values, which count as unset.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

impl PollConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl DashboardConfig {
    pub fn validate(&self) -> Result<()> {
        for (key, value) in [
            ("endpoints.service_a_url", &self.endpoints.service_a_url),
            ("endpoints.service_b_url", &self.endpoints.service_b_url),
        ] {
            if let Some(raw) = non_blank(value.as_deref()) {
                if !is_http_url(raw) {
                    bail!(
                        "{} must be an absolute http(s) URL without query or fragment, got {:?}",
                        key,
                        raw
                    );
                }
            }
        }

        // Labels identify the failing service and key the per-service metrics.
        let (label_a, label_b) = self.endpoints.labels();
        if label_a == label_b {
            bail!(
                "endpoints.service_a_label and endpoints.service_b_label must differ, both are {:?}",
                label_a
            );
        }

        if self.poll.timeout_secs == 0 {
            bail!("poll.timeout_secs must be greater than zero");
        }
        if !self.poll.path.starts_with('/') {
            bail!("poll.path must start with '/', got {:?}", self.poll.path);
        }
        if self.metrics.enabled && !self.metrics.path.starts_with('/') {
            bail!("metrics.path must start with '/', got {:?}", self.metrics.path);
        }

        Ok(())
    }
}

/// True for absolute `http`/`https` URLs with a host and no query or
/// fragment, so a request path can be appended to them.
pub fn is_http_url(raw: &str) -> bool {
    match Url::parse(raw) {
        Ok(url) => {
            matches!(url.scheme(), "http" | "https")
                && url.host_str().is_some()
                && url.query().is_none()
                && url.fragment().is_none()
        }
        Err(_) => false,
    }
}
