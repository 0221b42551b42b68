//! In-memory alert sinks for development and testing
//!
//! Each sink records what it received. Clones share the same record.

use super::{Notifier, PageInjector, UiBroadcaster};
use crate::error::{GuardError, Result};
use crate::types::{Banner, Notification, TabId, UiMessage};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Records notifications
#[derive(Clone, Default)]
pub struct MemoryNotifier {
    notifications: Arc<RwLock<Vec<Notification>>>,
}

impl MemoryNotifier {
    pub async fn notifications(&self) -> Vec<Notification> {
        self.notifications.read().await.clone()
    }
}

#[async_trait]
impl Notifier for MemoryNotifier {
    async fn notify(&self, notification: &Notification) -> Result<()> {
        self.notifications.write().await.push(notification.clone());
        Ok(())
    }
}

/// Records injected banners, or rejects every injection
#[derive(Clone, Default)]
pub struct MemoryInjector {
    banners: Arc<RwLock<Vec<(TabId, Banner)>>>,
    rejection: Option<String>,
    attempts: Arc<AtomicUsize>,
}

impl MemoryInjector {
    /// Injector whose target pages refuse every banner
    pub fn rejecting(reason: impl Into<String>) -> Self {
        Self {
            rejection: Some(reason.into()),
            ..Default::default()
        }
    }

    pub async fn banners(&self) -> Vec<(TabId, Banner)> {
        self.banners.read().await.clone()
    }

    /// Injection attempts, including rejected ones
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageInjector for MemoryInjector {
    async fn inject(&self, tab_id: TabId, banner: &Banner) -> Result<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if let Some(reason) = &self.rejection {
            return Err(GuardError::Injection {
                tab_id,
                reason: reason.clone(),
            });
        }
        self.banners.write().await.push((tab_id, banner.clone()));
        Ok(())
    }
}

/// Records UI broadcasts
#[derive(Clone, Default)]
pub struct MemoryBroadcaster {
    messages: Arc<RwLock<Vec<UiMessage>>>,
}

impl MemoryBroadcaster {
    pub async fn messages(&self) -> Vec<UiMessage> {
        self.messages.read().await.clone()
    }
}

#[async_trait]
impl UiBroadcaster for MemoryBroadcaster {
    async fn broadcast(&self, message: &UiMessage) -> Result<()> {
        self.messages.write().await.push(message.clone());
        Ok(())
    }
}
