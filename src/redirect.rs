//! Delayed redirect away from pages with the most severe verdict

use crate::error::{GuardError, Result};
use crate::types::TabId;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

/// Navigates a browser tab
#[async_trait]
pub trait TabNavigator: Send + Sync {
    /// Point `tab_id` at `to_url` if it is still showing `from_url`.
    ///
    /// A tab that has already moved on is left alone and is not an error.
    async fn navigate(&self, tab_id: TabId, from_url: &str, to_url: &str) -> Result<()>;
}

/// Schedules one-shot, non-cancellable redirects to a fixed landing page
#[derive(Clone)]
pub struct RedirectScheduler {
    navigator: Arc<dyn TabNavigator>,
    landing_url: String,
    delay: Duration,
}

impl RedirectScheduler {
    pub fn new(
        navigator: Arc<dyn TabNavigator>,
        landing_url: impl Into<String>,
        delay: Duration,
    ) -> Self {
        Self {
            navigator,
            landing_url: landing_url.into(),
            delay,
        }
    }

    /// Spawn the redirect timer for `tab_id`, currently showing `flagged_url`.
    ///
    /// The handle only reports completion; dropping it does not cancel the
    /// redirect. A navigation failure (tab closed) is logged and ignored.
    pub fn schedule(&self, tab_id: TabId, flagged_url: &str) -> JoinHandle<()> {
        let navigator = Arc::clone(&self.navigator);
        let landing_url = self.landing_url.clone();
        let flagged_url = flagged_url.to_string();
        let delay = self.delay;

        tracing::info!(
            tab_id,
            url = %flagged_url,
            delay_ms = delay.as_millis() as u64,
            landing_url = %landing_url,
            "Redirect scheduled"
        );

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            match navigator.navigate(tab_id, &flagged_url, &landing_url).await {
                Ok(()) => tracing::debug!(tab_id, landing_url = %landing_url, "Redirect issued"),
                Err(e) => tracing::debug!(tab_id, error = %e, "Redirect skipped"),
            }
        })
    }
}

/// Models browser tabs: each tab's current URL plus the redirects applied
///
/// Tabs marked closed fail to navigate. A redirect whose `from_url` no
/// longer matches the tab's current URL is dropped.
#[derive(Clone, Default)]
pub struct MemoryNavigator {
    current: Arc<RwLock<HashMap<TabId, String>>>,
    navigations: Arc<RwLock<Vec<(TabId, String)>>>,
    closed: Arc<RwLock<HashSet<TabId>>>,
}

impl MemoryNavigator {
    /// Record that the user moved `tab_id` to `url`
    pub async fn visit(&self, tab_id: TabId, url: impl Into<String>) {
        self.current.write().await.insert(tab_id, url.into());
    }

    pub async fn current_url(&self, tab_id: TabId) -> Option<String> {
        self.current.read().await.get(&tab_id).cloned()
    }

    pub async fn close_tab(&self, tab_id: TabId) {
        self.closed.write().await.insert(tab_id);
    }

    /// Redirects actually applied
    pub async fn navigations(&self) -> Vec<(TabId, String)> {
        self.navigations.read().await.clone()
    }
}

#[async_trait]
impl TabNavigator for MemoryNavigator {
    async fn navigate(&self, tab_id: TabId, from_url: &str, to_url: &str) -> Result<()> {
        if self.closed.read().await.contains(&tab_id) {
            return Err(GuardError::Delivery(format!("No tab with id: {}", tab_id)));
        }

        let mut current = self.current.write().await;
        if current.get(&tab_id).is_some_and(|url| url != from_url) {
            tracing::debug!(tab_id, from_url, "Tab moved on; redirect dropped");
            return Ok(());
        }
        current.insert(tab_id, to_url.to_string());
        self.navigations
            .write()
            .await
            .push((tab_id, to_url.to_string()));
        Ok(())
    }
}
