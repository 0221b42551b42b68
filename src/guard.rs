//! Guard: the pipeline entry point
//!
//! A `Guard` owns one protection switch, one navigation gate, the probe,
//! the alert dispatcher and the redirect scheduler. Instances share no
//! state, so several can run side by side with different settings.

use crate::alert::{AlertDispatcher, DispatchReport};
use crate::config::GuardConfig;
use crate::error::Result;
use crate::gate::{DedupCache, GateDecision, NavigationGate, RejectReason};
use crate::nav_error::NavigationErrorHandler;
use crate::probe::SecurityProbe;
use crate::redirect::{RedirectScheduler, TabNavigator};
use crate::state::{ProtectionStateStore, ProtectionSwitch};
use crate::types::{BrowserEvent, NavigationErrorEvent, NavigationEvent, Severity, Verdict};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Result of a completed check
#[derive(Debug)]
pub struct CheckOutcome {
    pub verdict: Verdict,
    /// `None` for a safe verdict
    pub dispatch: Option<DispatchReport>,
    /// Present only for `RemoteVulnerableRedirect`
    pub redirect: Option<JoinHandle<()>>,
}

/// What `Guard::handle` did with an event
#[derive(Debug)]
pub enum Handled {
    Toggled { enabled: bool },
    Rejected(RejectReason),
    Checked(CheckOutcome),
    Alerted(DispatchReport),
}

/// Navigation-interception and verdict pipeline
pub struct Guard {
    protection: ProtectionSwitch,
    gate: NavigationGate,
    probe: SecurityProbe,
    errors: NavigationErrorHandler,
    alerts: AlertDispatcher,
    redirects: RedirectScheduler,
}

impl Guard {
    /// Build a guard, reading the persisted protection flag once.
    ///
    /// Fails only on invalid configuration.
    pub fn new(
        config: &GuardConfig,
        state_store: Arc<dyn ProtectionStateStore>,
        probe: SecurityProbe,
        alerts: AlertDispatcher,
        navigator: Arc<dyn TabNavigator>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            protection: ProtectionSwitch::load(state_store),
            gate: NavigationGate::with_scope(config.dedup_scope),
            probe,
            errors: NavigationErrorHandler,
            alerts,
            redirects: RedirectScheduler::new(
                navigator,
                config.landing_url.clone(),
                config.redirect_delay(),
            ),
        })
    }

    /// Replace the dedup cache
    pub fn with_dedup_cache(mut self, cache: Arc<dyn DedupCache>) -> Self {
        self.gate = NavigationGate::new(cache);
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.protection.is_enabled()
    }

    pub fn gate(&self) -> &NavigationGate {
        &self.gate
    }

    /// Route an inbound event by kind
    pub async fn handle(&self, event: BrowserEvent) -> Result<Handled> {
        let kind = event.kind();
        tracing::trace!(%kind, "Routing browser event");

        match event {
            BrowserEvent::ToggleProtection { is_enabled } => {
                self.toggle(is_enabled)?;
                Ok(Handled::Toggled {
                    enabled: is_enabled,
                })
            }
            BrowserEvent::NavigationCommitted(nav) => Ok(self.on_navigation_committed(&nav).await),
            BrowserEvent::NavigationError(failure) => Ok(self.on_navigation_error(&failure).await),
        }
    }

    /// Flip protection and persist the new value
    pub fn toggle(&self, enabled: bool) -> Result<()> {
        self.protection.set(enabled)?;
        tracing::info!(enabled, "Protection toggled");
        Ok(())
    }

    /// Gate, probe, classify, alert and maybe redirect one committed navigation
    pub async fn on_navigation_committed(&self, event: &NavigationEvent) -> Handled {
        if let GateDecision::Reject(reason) = self.gate.admit(event, self.is_enabled()) {
            return Handled::Rejected(reason);
        }

        let check_id = format!("chk-{}", uuid::Uuid::new_v4());
        tracing::debug!(
            check_id = %check_id,
            tab_id = event.tab_id,
            url = %event.url,
            "Navigation admitted"
        );

        let assessment = self.probe.assess(event).await;
        tracing::info!(
            check_id = %check_id,
            tab_id = event.tab_id,
            url = %event.url,
            verdict = %assessment.verdict,
            "Check completed"
        );

        let Some(alert) = assessment.alert_for(event.tab_id) else {
            return Handled::Checked(CheckOutcome {
                verdict: assessment.verdict,
                dispatch: None,
                redirect: None,
            });
        };

        let report = self.alerts.dispatch(&alert).await;
        let redirect = (alert.severity == Severity::Critical)
            .then(|| self.redirects.schedule(event.tab_id, &event.url));

        Handled::Checked(CheckOutcome {
            verdict: assessment.verdict,
            dispatch: Some(report),
            redirect,
        })
    }

    /// Alert on a failed navigation; bypasses the gate and the probe
    pub async fn on_navigation_error(&self, event: &NavigationErrorEvent) -> Handled {
        let enabled = self.is_enabled();
        match self.errors.handle(event, enabled) {
            Some(alert) => Handled::Alerted(self.alerts.dispatch(&alert).await),
            None if !enabled => Handled::Rejected(RejectReason::Disabled),
            None => Handled::Rejected(RejectReason::SubFrame),
        }
    }
}
