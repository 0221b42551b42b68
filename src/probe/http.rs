//! HTTP implementations of both probe stages

use super::{ReachabilityCheck, VerdictService};
use crate::error::{GuardError, Result};
use crate::types::{CheckRequest, CheckResponse};
use async_trait::async_trait;
use std::time::Duration;

fn build_client(timeout: Option<Duration>) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder
        .build()
        .map_err(|e| GuardError::Config(format!("Failed to build HTTP client: {}", e)))
}

/// `HEAD` request against the destination
///
/// Any response counts as reachable, whatever its status. Connection,
/// DNS and TLS failures surface as `GuardError::Transport`.
pub struct HttpReachability {
    client: reqwest::Client,
}

impl HttpReachability {
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout)?,
        })
    }
}

#[async_trait]
impl ReachabilityCheck for HttpReachability {
    async fn check(&self, url: &str) -> Result<()> {
        let response = self
            .client
            .head(url)
            .send()
            .await
            .map_err(|e| GuardError::Transport(format!("HEAD {} failed: {}", url, e)))?;

        tracing::debug!(url = %url, status = response.status().as_u16(), "Destination reachable");
        Ok(())
    }
}

/// JSON client for the verdict service's check endpoint
pub struct HttpVerdictClient {
    endpoint: reqwest::Url,
    client: reqwest::Client,
}

impl HttpVerdictClient {
    pub fn new(endpoint: &str, timeout: Option<Duration>) -> Result<Self> {
        let endpoint = reqwest::Url::parse(endpoint).map_err(|e| {
            GuardError::Config(format!("Invalid verdict endpoint '{}': {}", endpoint, e))
        })?;
        Ok(Self {
            endpoint,
            client: build_client(timeout)?,
        })
    }

    pub fn endpoint(&self) -> &reqwest::Url {
        &self.endpoint
    }
}

#[async_trait]
impl VerdictService for HttpVerdictClient {
    async fn check(&self, request: &CheckRequest) -> Result<CheckResponse> {
        tracing::debug!(endpoint = %self.endpoint, url = %request.url, "Requesting verdict");

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await
            .map_err(|e| GuardError::Transport(format!("POST {} failed: {}", self.endpoint, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GuardError::Service {
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| GuardError::Transport(format!("Failed to read verdict body: {}", e)))?;

        serde_json::from_str::<CheckResponse>(&body)
            .map_err(|e| GuardError::MalformedResponse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_rejects_bad_endpoint() {
        let err = HttpVerdictClient::new("::not-a-url::", None).err().unwrap();
        assert!(matches!(err, GuardError::Config(_)));
    }

    #[test]
    fn test_client_keeps_endpoint() {
        let client =
            HttpVerdictClient::new("http://localhost:5000/check", Some(Duration::from_secs(1)))
                .unwrap();
        assert_eq!(client.endpoint().path(), "/check");
    }

    #[tokio::test]
    async fn test_reachability_malformed_url_is_transport_error() {
        let probe = HttpReachability::new(None).unwrap();
        let err = probe.check("http://").await.unwrap_err();
        assert!(matches!(err, GuardError::Transport(_)));
    }
}
