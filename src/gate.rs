//! Navigation gate: filters and deduplicates commits before they are probed

use crate::config::DedupScope;
use crate::types::{NavigationEvent, TabId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// URL prefixes that never reach the network probe
pub const NON_WEB_PREFIXES: &[&str] = &[
    "about:",
    "chrome:",
    "chrome-extension:",
    "file:",
    "view-source:",
    "data:",
    "javascript:",
];

/// Whether `url` uses a browser-internal or local scheme
pub fn is_non_web_url(url: &str) -> bool {
    NON_WEB_PREFIXES.iter().any(|prefix| {
        url.get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
    })
}

/// Why the gate turned an event away
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Protection is switched off
    Disabled,
    /// Event came from a sub-frame
    SubFrame,
    /// URL uses a non-web scheme
    NonWebScheme,
    /// URL equals the dedup cursor
    Duplicate,
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RejectReason::Disabled => "protection disabled",
            RejectReason::SubFrame => "sub-frame navigation",
            RejectReason::NonWebScheme => "non-web scheme",
            RejectReason::Duplicate => "duplicate of last checked url",
        };
        f.write_str(s)
    }
}

/// Gate decision for one navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Admit,
    Reject(RejectReason),
}

/// Cache of recently admitted URLs
pub trait DedupCache: Send + Sync {
    /// Record `url` as the cursor for `tab_id`'s scope unless it already is.
    ///
    /// Returns `true` when the URL was recorded. Check and record must be
    /// atomic with respect to concurrent callers.
    fn check_and_record(&self, tab_id: TabId, url: &str) -> bool;

    /// Current cursor for `tab_id`'s scope
    fn cursor(&self, tab_id: TabId) -> Option<String>;
}

/// Per-tab cursors kept before the lowest tab id is evicted
pub const DEFAULT_MAX_TAB_CURSORS: usize = 1024;

/// Last-admitted-URL cursor, either process-wide or per tab
///
/// Per-tab slots are bounded. Browsers hand out increasing tab ids, so at
/// capacity the lowest id is dropped to make room.
pub struct DedupCursor {
    scope: DedupScope,
    max_slots: usize,
    /// `None` keys the global slot
    slots: Mutex<HashMap<Option<TabId>, String>>,
}

impl DedupCursor {
    pub fn new(scope: DedupScope) -> Self {
        Self::with_capacity(scope, DEFAULT_MAX_TAB_CURSORS)
    }

    /// Cursor keeping at most `max_slots` per-tab entries (at least one)
    pub fn with_capacity(scope: DedupScope, max_slots: usize) -> Self {
        Self {
            scope,
            max_slots: max_slots.max(1),
            slots: Mutex::new(HashMap::new()),
        }
    }

    fn key(&self, tab_id: TabId) -> Option<TabId> {
        match self.scope {
            DedupScope::Global => None,
            DedupScope::PerTab => Some(tab_id),
        }
    }
}

impl DedupCache for DedupCursor {
    fn check_and_record(&self, tab_id: TabId, url: &str) -> bool {
        let key = self.key(tab_id);
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        if slots.get(&key).is_some_and(|last| last == url) {
            return false;
        }
        if !slots.contains_key(&key) && slots.len() >= self.max_slots {
            if let Some(oldest) = slots.keys().min().copied() {
                slots.remove(&oldest);
                tracing::trace!(tab_id = ?oldest, "Dedup cursor evicted");
            }
        }
        slots.insert(key, url.to_string());
        true
    }

    fn cursor(&self, tab_id: TabId) -> Option<String> {
        let slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        slots.get(&self.key(tab_id)).cloned()
    }
}

/// Filters navigation commits before they enter the probe pipeline
pub struct NavigationGate {
    dedup: Arc<dyn DedupCache>,
}

impl NavigationGate {
    pub fn new(dedup: Arc<dyn DedupCache>) -> Self {
        Self { dedup }
    }

    /// Gate with the built-in cursor for `scope`
    pub fn with_scope(scope: DedupScope) -> Self {
        Self::new(Arc::new(DedupCursor::new(scope)))
    }

    /// Decide whether `event` should be probed.
    ///
    /// On admit the URL is already the new cursor when this returns.
    pub fn admit(&self, event: &NavigationEvent, enabled: bool) -> GateDecision {
        let decision = if !enabled {
            GateDecision::Reject(RejectReason::Disabled)
        } else if !event.is_top_level() {
            GateDecision::Reject(RejectReason::SubFrame)
        } else if is_non_web_url(&event.url) {
            GateDecision::Reject(RejectReason::NonWebScheme)
        } else if !self.dedup.check_and_record(event.tab_id, &event.url) {
            GateDecision::Reject(RejectReason::Duplicate)
        } else {
            GateDecision::Admit
        };

        if let GateDecision::Reject(reason) = decision {
            tracing::debug!(tab_id = event.tab_id, url = %event.url, %reason, "Navigation rejected");
        }
        decision
    }

    pub fn dedup(&self) -> &dyn DedupCache {
        self.dedup.as_ref()
    }
}
