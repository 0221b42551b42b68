//! Scripted probe stages for tests and offline runs
//!
//! Both stubs are cheap to clone and share their call records, so a test
//! can hand one clone to `SecurityProbe` and inspect the other.

use super::{ReachabilityCheck, VerdictService};
use crate::error::{GuardError, Result};
use crate::types::{CheckRequest, CheckResponse};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Reachability stage with a fixed outcome
#[derive(Clone)]
pub struct StubReachability {
    failure: Option<String>,
    calls: Arc<AtomicUsize>,
}

impl StubReachability {
    pub fn reachable() -> Self {
        Self {
            failure: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            failure: Some(reason.into()),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReachabilityCheck for StubReachability {
    async fn check(&self, _url: &str) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.failure {
            Some(reason) => Err(GuardError::Transport(reason.clone())),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone)]
enum Reply {
    Message(String),
    Status(u16),
    Transport(String),
    Malformed(String),
}

/// Verdict service with a fixed reply, recording every request
#[derive(Clone)]
pub struct StubVerdictService {
    reply: Reply,
    requests: Arc<Mutex<Vec<CheckRequest>>>,
}

impl StubVerdictService {
    fn with_reply(reply: Reply) -> Self {
        Self {
            reply,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Answer every request with `{"message": message}`
    pub fn replying(message: impl Into<String>) -> Self {
        Self::with_reply(Reply::Message(message.into()))
    }

    /// Answer every request with a non-success HTTP status
    pub fn status(status: u16) -> Self {
        Self::with_reply(Reply::Status(status))
    }

    /// Fail every request at the transport level
    pub fn transport_error(reason: impl Into<String>) -> Self {
        Self::with_reply(Reply::Transport(reason.into()))
    }

    /// Answer every request with an unparseable body
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::with_reply(Reply::Malformed(reason.into()))
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn requests(&self) -> Vec<CheckRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl VerdictService for StubVerdictService {
    async fn check(&self, request: &CheckRequest) -> Result<CheckResponse> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request.clone());

        match &self.reply {
            Reply::Message(message) => Ok(CheckResponse {
                message: message.clone(),
            }),
            Reply::Status(status) => Err(GuardError::Service { status: *status }),
            Reply::Transport(reason) => Err(GuardError::Transport(reason.clone())),
            Reply::Malformed(reason) => Err(GuardError::MalformedResponse(reason.clone())),
        }
    }
}
