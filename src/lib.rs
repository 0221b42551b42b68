//! # phishguard
//!
//! Navigation interception and phishing verdict pipeline for browsers.
//!
//! ## Overview
//!
//! `phishguard` turns raw navigation events into a security verdict and an
//! alert fan-out. A committed navigation passes a gate (protection switch,
//! top-level frame, web scheme, dedup cursor), then a two-stage probe
//! (reachability/certificate, then a remote verdict service). The verdict
//! drives a system notification, an in-page banner and a UI broadcast, and
//! for the most severe class a delayed redirect to a safe landing page.
//! Browser-reported navigation errors go straight to the alert fan-out.
//!
//! ## Quick Start
//!
//! ```rust
//! use phishguard::{
//!     AlertDispatcher, BrowserEvent, Guard, GuardConfig, Handled, MemoryBroadcaster,
//!     MemoryInjector, MemoryNavigator, MemoryNotifier, MemoryStateStore, NavigationEvent,
//!     SecurityProbe, StubReachability, StubVerdictService, Verdict,
//! };
//! use std::sync::Arc;
//!
//! # async fn example() -> phishguard::Result<()> {
//! let alerts = AlertDispatcher::new(
//!     Arc::new(MemoryNotifier::default()),
//!     Arc::new(MemoryInjector::default()),
//!     Arc::new(MemoryBroadcaster::default()),
//! );
//! let probe = SecurityProbe::new(
//!     StubReachability::reachable(),
//!     StubVerdictService::replying("Vulnerable domain found! Known phishing host."),
//! );
//! let guard = Guard::new(
//!     &GuardConfig::default(),
//!     Arc::new(MemoryStateStore::with_enabled(true)),
//!     probe,
//!     alerts,
//!     Arc::new(MemoryNavigator::default()),
//! )?;
//!
//! let event =
//!     BrowserEvent::NavigationCommitted(NavigationEvent::top_level(1, "http://example.com"));
//! if let Handled::Checked(outcome) = guard.handle(event).await? {
//!     assert_eq!(outcome.verdict, Verdict::RemoteVulnerableRedirect);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - **Guard**: entry point; routes `BrowserEvent`s by kind
//! - **NavigationGate** / **DedupCache**: admission and dedup policy
//! - **SecurityProbe**: `ReachabilityCheck` then `VerdictService`
//! - **classify**: remote message → `Verdict`
//! - **NavigationErrorHandler**: browser error code → alert
//! - **AlertDispatcher**: `Notifier`, `PageInjector`, `UiBroadcaster`
//! - **RedirectScheduler**: delayed `TabNavigator` call
//! - **host**: native-messaging transport for running as a browser host

pub mod alert;
pub mod classifier;
pub mod config;
pub mod error;
pub mod gate;
pub mod guard;
pub mod host;
pub mod nav_error;
pub mod probe;
pub mod redirect;
pub mod state;
pub mod types;

// Re-export core types
pub use alert::{
    AlertDispatcher, DispatchReport, MemoryBroadcaster, MemoryInjector, MemoryNotifier, Notifier,
    PageInjector, UiBroadcaster,
};
pub use classifier::classify;
pub use config::{DedupScope, GuardConfig};
pub use error::{GuardError, Result};
pub use gate::{
    is_non_web_url, DedupCache, DedupCursor, GateDecision, NavigationGate, RejectReason,
};
pub use guard::{CheckOutcome, Guard, Handled};
pub use nav_error::{error_message, NavigationErrorHandler};
pub use probe::{
    HttpReachability, HttpVerdictClient, ReachabilityCheck, SecurityProbe, StubReachability,
    StubVerdictService, VerdictService,
};
pub use redirect::{MemoryNavigator, RedirectScheduler, TabNavigator};
pub use state::{
    FileStateStore, MemoryStateStore, ProtectionState, ProtectionStateStore, ProtectionSwitch,
};
pub use types::{
    AlertMessage, Assessment, Banner, BrowserEvent, CheckRequest, CheckResponse, EventKind,
    NavigationErrorEvent, NavigationEvent, Notification, Severity, TabId, UiMessage, Verdict,
};
