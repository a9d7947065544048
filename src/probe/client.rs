// src/probe/client.rs
use super::ProbeError;
use crate::endpoint::ServiceEndpoint;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// One outbound request to one service, yielding the decoded JSON body.
#[async_trait]
pub trait ServiceClient: Send + Sync {
    async fn fetch(&self, endpoint: &ServiceEndpoint) -> Result<Value, ProbeError>;
}

/// reqwest-backed client issuing `GET <base-url><path>`.
#[derive(Debug, Clone)]
pub struct HttpServiceClient {
    client: Client,
    path: String,
}

impl HttpServiceClient {
    pub fn new(path: impl Into<String>, timeout: Duration) -> Result<Self, ProbeError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ProbeError::from)?;

        Ok(Self {
            client,
            path: path.into(),
        })
    }
}

#[async_trait]
impl ServiceClient for HttpServiceClient {
    async fn fetch(&self, endpoint: &ServiceEndpoint) -> Result<Value, ProbeError> {
        let url = endpoint.request_url(&self.path);
        debug!("GET {} for {}", url, endpoint.label);

        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProbeError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| ProbeError::Decode(e.to_string()))
    }
}
