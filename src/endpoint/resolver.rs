// src/endpoint/resolver.rs
use crate::config::{
    is_http_url, non_blank, EndpointsConfig, DEFAULT_SERVICE_A_URL, DEFAULT_SERVICE_B_URL,
};
use serde::Serialize;
use tracing::warn;

/// Base address of one polled service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceEndpoint {
    pub label: String,
    pub base_url: String,
}

impl ServiceEndpoint {
    pub fn new(label: impl Into<String>, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            label: label.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Appends `path` to the base URL. Plain concatenation keeps any path
    /// prefix the base URL carries.
    pub fn request_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[derive(Debug, Clone, Default)]
pub struct EndpointResolver {
    config: EndpointsConfig,
}

impl EndpointResolver {
    pub fn new(config: EndpointsConfig) -> Self {
        Self { config }
    }

    /// Resolves both endpoints. Missing or unusable values fall back to the
    /// documented defaults, so this never fails.
    pub fn resolve(&self) -> (ServiceEndpoint, ServiceEndpoint) {
        let (label_a, label_b) = self.config.labels();
        let a = resolve_one(
            label_a,
            self.config.service_a_url.as_deref(),
            DEFAULT_SERVICE_A_URL,
        );
        let b = resolve_one(
            label_b,
            self.config.service_b_url.as_deref(),
            DEFAULT_SERVICE_B_URL,
        );
        (a, b)
    }
}

fn resolve_one(label: &str, url: Option<&str>, default_url: &str) -> ServiceEndpoint {
    let url = match non_blank(url) {
        Some(raw) if is_http_url(raw) => raw,
        Some(raw) => {
            warn!(
                "Ignoring malformed URL {:?} for {}, using {}",
                raw, label, default_url
            );
            default_url
        }
        None => default_url,
    };

    ServiceEndpoint::new(label, url)
}
