//! Alert fan-out
//!
//! An alert goes to three independent sinks: a system notification, a
//! banner injected into the offending page, and a broadcast to any open
//! extension UI. Sinks run concurrently and a failure in one never
//! affects the others.

use crate::error::Result;
use crate::types::{AlertMessage, Banner, Notification, TabId, UiMessage};
use async_trait::async_trait;
use std::sync::Arc;

pub mod memory;

pub use memory::{MemoryBroadcaster, MemoryInjector, MemoryNotifier};

/// System notification surface
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: &Notification) -> Result<()>;
}

/// In-page banner injection
///
/// The page side must treat injection as idempotent on `Banner::element_id`.
#[async_trait]
pub trait PageInjector: Send + Sync {
    async fn inject(&self, tab_id: TabId, banner: &Banner) -> Result<()>;
}

/// Broadcast to whatever extension UI is listening; no delivery guarantee
#[async_trait]
pub trait UiBroadcaster: Send + Sync {
    async fn broadcast(&self, message: &UiMessage) -> Result<()>;
}

/// Which sinks accepted an alert
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub notified: bool,
    pub injected: bool,
    pub broadcast: bool,
}

impl DispatchReport {
    pub fn all_delivered(&self) -> bool {
        self.notified && self.injected && self.broadcast
    }
}

/// Fans an alert out to the three sinks
#[derive(Clone)]
pub struct AlertDispatcher {
    notifier: Arc<dyn Notifier>,
    injector: Arc<dyn PageInjector>,
    broadcaster: Arc<dyn UiBroadcaster>,
}

impl AlertDispatcher {
    pub fn new(
        notifier: Arc<dyn Notifier>,
        injector: Arc<dyn PageInjector>,
        broadcaster: Arc<dyn UiBroadcaster>,
    ) -> Self {
        Self {
            notifier,
            injector,
            broadcaster,
        }
    }

    /// Deliver `alert` to every sink; failures are logged, never returned
    pub async fn dispatch(&self, alert: &AlertMessage) -> DispatchReport {
        let notification = Notification::security_alert(&alert.text);
        let banner = Banner::warning(&alert.text);
        let ui_message = UiMessage::vulnerability(&alert.text);

        let (notified, injected, broadcast) = futures::join!(
            self.notifier.notify(&notification),
            self.injector.inject(alert.tab_id, &banner),
            self.broadcaster.broadcast(&ui_message),
        );

        if let Err(e) = &notified {
            tracing::warn!(tab_id = alert.tab_id, error = %e, "Failed to show notification");
        }
        if let Err(e) = &injected {
            tracing::error!(tab_id = alert.tab_id, error = %e, "Failed to inject warning banner");
        }
        if let Err(e) = &broadcast {
            tracing::debug!(error = %e, "No UI listener for alert broadcast");
        }

        let report = DispatchReport {
            notified: notified.is_ok(),
            injected: injected.is_ok(),
            broadcast: broadcast.is_ok(),
        };
        tracing::info!(
            tab_id = alert.tab_id,
            severity = ?alert.severity,
            notified = report.notified,
            injected = report.injected,
            broadcast = report.broadcast,
            "Alert dispatched"
        );
        report
    }
}
