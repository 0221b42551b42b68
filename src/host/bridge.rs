//! Capability sinks that forward to the extension over the host channel

use crate::alert::{Notifier, PageInjector, UiBroadcaster};
use crate::error::{GuardError, Result};
use crate::redirect::TabNavigator;
use crate::types::{Banner, Notification, TabId, UiMessage};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Message from the host to the extension
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutboundMessage {
    /// Create a system notification
    ShowNotification(Notification),
    /// Run the banner routine in a tab
    InjectBanner {
        #[serde(rename = "tabId")]
        tab_id: TabId,
        banner: Banner,
    },
    /// Relay to any open extension UI
    VulnerabilityDetected {
        #[serde(rename = "vulnerabilityDetails")]
        vulnerability_details: String,
    },
    /// Point a tab at a new URL, unless it has left `from_url`
    NavigateTab {
        #[serde(rename = "tabId")]
        tab_id: TabId,
        #[serde(rename = "fromUrl")]
        from_url: String,
        url: String,
    },
}

/// Queues outbound messages for the host writer
#[derive(Clone)]
pub struct HostBridge {
    tx: mpsc::UnboundedSender<OutboundMessage>,
}

impl HostBridge {
    /// Bridge plus the receiving end the host writer drains
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<OutboundMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn send(&self, message: OutboundMessage) -> Result<()> {
        self.tx
            .send(message)
            .map_err(|_| GuardError::Delivery("Host output channel closed".to_string()))
    }
}

#[async_trait]
impl Notifier for HostBridge {
    async fn notify(&self, notification: &Notification) -> Result<()> {
        self.send(OutboundMessage::ShowNotification(notification.clone()))
    }
}

#[async_trait]
impl PageInjector for HostBridge {
    async fn inject(&self, tab_id: TabId, banner: &Banner) -> Result<()> {
        self.send(OutboundMessage::InjectBanner {
            tab_id,
            banner: banner.clone(),
        })
        .map_err(|e| GuardError::Injection {
            tab_id,
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl UiBroadcaster for HostBridge {
    async fn broadcast(&self, message: &UiMessage) -> Result<()> {
        let UiMessage::VulnerabilityDetected {
            vulnerability_details,
        } = message;
        self.send(OutboundMessage::VulnerabilityDetected {
            vulnerability_details: vulnerability_details.clone(),
        })
    }
}

#[async_trait]
impl TabNavigator for HostBridge {
    async fn navigate(&self, tab_id: TabId, from_url: &str, to_url: &str) -> Result<()> {
        self.send(OutboundMessage::NavigateTab {
            tab_id,
            from_url: from_url.to_string(),
            url: to_url.to_string(),
        })
    }
}
