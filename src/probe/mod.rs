//! Two-stage security probe
//!
//! Stage one asks whether the destination answers at all over a sound
//! connection. Stage two asks the remote verdict service. Every failure
//! resolves to a cautious verdict; nothing here returns an error.

use crate::classifier::classify;
use crate::error::Result;
use crate::types::{Assessment, CheckRequest, CheckResponse, NavigationEvent};
use async_trait::async_trait;
use std::sync::Arc;

pub mod http;
pub mod stub;

pub use http::{HttpReachability, HttpVerdictClient};
pub use stub::{StubReachability, StubVerdictService};

/// Lightweight connectivity/certificate check against a destination
#[async_trait]
pub trait ReachabilityCheck: Send + Sync {
    /// Succeeds on any HTTP response; fails on network or TLS errors
    async fn check(&self, url: &str) -> Result<()>;
}

/// Remote verdict service
#[async_trait]
pub trait VerdictService: Send + Sync {
    /// Ask the service about one navigation
    async fn check(&self, request: &CheckRequest) -> Result<CheckResponse>;
}

/// Runs reachability then remote verdict, short-circuiting on failure
#[derive(Clone)]
pub struct SecurityProbe {
    reachability: Arc<dyn ReachabilityCheck>,
    service: Arc<dyn VerdictService>,
}

impl SecurityProbe {
    pub fn new(
        reachability: impl ReachabilityCheck + 'static,
        service: impl VerdictService + 'static,
    ) -> Self {
        Self {
            reachability: Arc::new(reachability),
            service: Arc::new(service),
        }
    }

    /// Probe backed by the HTTP implementations of both stages
    pub fn http(config: &crate::config::GuardConfig) -> Result<Self> {
        Ok(Self::new(
            HttpReachability::new(config.request_timeout())?,
            HttpVerdictClient::new(&config.verdict_endpoint, config.request_timeout())?,
        ))
    }

    /// Assess one admitted navigation
    pub async fn assess(&self, event: &NavigationEvent) -> Assessment {
        if let Err(e) = self.reachability.check(&event.url).await {
            tracing::warn!(url = %event.url, error = %e, "Reachability probe failed");
            return Assessment::certificate_invalid();
        }

        let request = CheckRequest::from_event(event);
        match self.service.check(&request).await {
            Ok(response) => {
                let verdict = classify(&response.message);
                Assessment::new(verdict, response.message)
            }
            Err(e) => {
                tracing::error!(url = %event.url, error = %e, "Verdict service check failed");
                Assessment::unreachable()
            }
        }
    }
}
