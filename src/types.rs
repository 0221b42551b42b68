//! Core types for the phishguard pipeline
//!
//! Wire-facing types use camelCase JSON serialization to match the
//! extension's message shapes.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Browser tab identifier
pub type TabId = i64;

/// Text shown when the reachability probe fails
pub const CERTIFICATE_INVALID_MESSAGE: &str =
    "Invalid security certificate detected. Site might be unsafe.";

/// Text shown when the verdict service cannot be consulted
pub const UNREACHABLE_MESSAGE: &str = "Unable to verify site security. Proceed with caution.";

/// A committed top-level or sub-frame navigation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationEvent {
    /// Tab that navigated
    pub tab_id: TabId,

    /// Frame within the tab; `0` is the top-level frame
    pub frame_id: i64,

    /// Destination URL
    pub url: String,

    /// Referrer reported by the browser, empty when absent
    #[serde(default)]
    pub referrer: String,

    /// When the navigation was observed
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl NavigationEvent {
    /// Create a top-level navigation event observed now
    pub fn top_level(tab_id: TabId, url: impl Into<String>) -> Self {
        Self {
            tab_id,
            frame_id: 0,
            url: url.into(),
            referrer: String::new(),
            timestamp: Utc::now(),
        }
    }

    /// Set the frame id
    pub fn in_frame(mut self, frame_id: i64) -> Self {
        self.frame_id = frame_id;
        self
    }

    /// Set the referrer
    pub fn with_referrer(mut self, referrer: impl Into<String>) -> Self {
        self.referrer = referrer.into();
        self
    }

    /// Whether this navigation happened in the top-level frame
    pub fn is_top_level(&self) -> bool {
        self.frame_id == 0
    }
}

/// A navigation that the browser failed to complete
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationErrorEvent {
    pub tab_id: TabId,
    pub frame_id: i64,
    /// Browser error code, e.g. `net::ERR_CERT_INVALID`
    pub error: String,
    #[serde(default)]
    pub url: String,
}

impl NavigationErrorEvent {
    pub fn is_top_level(&self) -> bool {
        self.frame_id == 0
    }
}

/// Inbound message from the browser side
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BrowserEvent {
    /// User flipped the protection switch
    ToggleProtection {
        #[serde(rename = "isEnabled")]
        is_enabled: bool,
    },
    /// A navigation committed
    NavigationCommitted(NavigationEvent),
    /// A navigation failed
    NavigationError(NavigationErrorEvent),
}

/// Routing key for `BrowserEvent`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Toggle,
    NavigationCommitted,
    NavigationError,
}

impl BrowserEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            BrowserEvent::ToggleProtection { .. } => EventKind::Toggle,
            BrowserEvent::NavigationCommitted(_) => EventKind::NavigationCommitted,
            BrowserEvent::NavigationError(_) => EventKind::NavigationError,
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EventKind::Toggle => "toggle",
            EventKind::NavigationCommitted => "navigation_committed",
            EventKind::NavigationError => "navigation_error",
        };
        f.write_str(name)
    }
}

/// Classification of a completed check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Safe,
    CertificateInvalid,
    RemoteVulnerableRedirect,
    RemoteVulnerableWarn,
    Unreachable,
}

impl Verdict {
    /// Alert severity for this verdict, `None` when no alert is due
    pub fn severity(self) -> Option<Severity> {
        match self {
            Verdict::Safe => None,
            Verdict::RemoteVulnerableRedirect => Some(Severity::Critical),
            Verdict::RemoteVulnerableWarn | Verdict::CertificateInvalid | Verdict::Unreachable => {
                Some(Severity::Warning)
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Verdict::Safe => "safe",
            Verdict::CertificateInvalid => "certificate_invalid",
            Verdict::RemoteVulnerableRedirect => "remote_vulnerable_redirect",
            Verdict::RemoteVulnerableWarn => "remote_vulnerable_warn",
            Verdict::Unreachable => "unreachable",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Alert severity; `Critical` is the only level that triggers a redirect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Critical,
}

/// Result of running `SecurityProbe` on one navigation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assessment {
    pub verdict: Verdict,
    /// Remote message for remote verdicts, fixed text otherwise
    pub message: String,
}

impl Assessment {
    pub fn new(verdict: Verdict, message: impl Into<String>) -> Self {
        Self {
            verdict,
            message: message.into(),
        }
    }

    pub fn certificate_invalid() -> Self {
        Self::new(Verdict::CertificateInvalid, CERTIFICATE_INVALID_MESSAGE)
    }

    pub fn unreachable() -> Self {
        Self::new(Verdict::Unreachable, UNREACHABLE_MESSAGE)
    }

    /// Build the alert for a tab, or `None` for a safe verdict
    pub fn alert_for(&self, tab_id: TabId) -> Option<AlertMessage> {
        self.verdict.severity().map(|severity| AlertMessage {
            tab_id,
            text: self.message.clone(),
            severity,
        })
    }
}

/// A user-facing alert bound to a tab
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertMessage {
    pub tab_id: TabId,
    pub text: String,
    pub severity: Severity,
}

impl AlertMessage {
    pub fn warning(tab_id: TabId, text: impl Into<String>) -> Self {
        Self {
            tab_id,
            text: text.into(),
            severity: Severity::Warning,
        }
    }
}

/// Request body for the remote verdict service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckRequest {
    pub url: String,
    /// ISO-8601, millisecond precision, UTC
    pub timestamp: String,
    pub referrer: String,
}

impl CheckRequest {
    pub fn from_event(event: &NavigationEvent) -> Self {
        Self {
            url: event.url.clone(),
            timestamp: event.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            referrer: event.referrer.clone(),
        }
    }
}

/// Success body from the remote verdict service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResponse {
    pub message: String,
}

/// System notification payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub title: String,
    pub message: String,
    pub priority: u8,
    pub require_interaction: bool,
}

impl Notification {
    /// High-priority notification that stays until the user dismisses it
    pub fn security_alert(message: impl Into<String>) -> Self {
        Self {
            title: "Security Alert!".to_string(),
            message: message.into(),
            priority: 2,
            require_interaction: true,
        }
    }
}

/// Element id of the in-page warning banner; injection is a no-op when present
pub const BANNER_ELEMENT_ID: &str = "security-warning";

/// Banner to be rendered at the top of a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Banner {
    pub element_id: String,
    pub message: String,
    pub dismissible: bool,
}

impl Banner {
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            element_id: BANNER_ELEMENT_ID.to_string(),
            message: message.into(),
            dismissible: true,
        }
    }
}

/// Fire-and-forget message for any open extension UI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UiMessage {
    VulnerabilityDetected {
        #[serde(rename = "vulnerabilityDetails")]
        vulnerability_details: String,
    },
}

impl UiMessage {
    pub fn vulnerability(details: impl Into<String>) -> Self {
        UiMessage::VulnerabilityDetected {
            vulnerability_details: details.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_navigation_event_defaults() {
        let json = r#"{"tabId": 7, "frameId": 0, "url": "https://example.com"}"#;
        let event: NavigationEvent = serde_json::from_str(json).unwrap();

        assert_eq!(event.tab_id, 7);
        assert!(event.is_top_level());
        assert_eq!(event.referrer, "");
    }

    #[test]
    fn test_browser_event_toggle_wire_shape() {
        let json = r#"{"type": "TOGGLE_PROTECTION", "isEnabled": true}"#;
        let event: BrowserEvent = serde_json::from_str(json).unwrap();

        assert_eq!(event, BrowserEvent::ToggleProtection { is_enabled: true });
        assert_eq!(event.kind(), EventKind::Toggle);
    }

    #[test]
    fn test_browser_event_navigation_variants() {
        let committed: BrowserEvent = serde_json::from_str(
            r#"{"type": "NAVIGATION_COMMITTED", "tabId": 1, "frameId": 0,
                "url": "http://example.com", "referrer": "http://ref.example"}"#,
        )
        .unwrap();
        assert_eq!(committed.kind(), EventKind::NavigationCommitted);

        let failed: BrowserEvent = serde_json::from_str(
            r#"{"type": "NAVIGATION_ERROR", "tabId": 1, "frameId": 0,
                "error": "net::ERR_CERT_INVALID", "url": "https://bad.example"}"#,
        )
        .unwrap();
        match failed {
            BrowserEvent::NavigationError(e) => assert_eq!(e.error, "net::ERR_CERT_INVALID"),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_browser_event_is_rejected() {
        let result: std::result::Result<BrowserEvent, _> =
            serde_json::from_str(r#"{"type": "checkVulnerability", "url": "x"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_verdict_severity() {
        assert_eq!(Verdict::Safe.severity(), None);
        assert_eq!(
            Verdict::RemoteVulnerableRedirect.severity(),
            Some(Severity::Critical)
        );
        for v in [
            Verdict::RemoteVulnerableWarn,
            Verdict::CertificateInvalid,
            Verdict::Unreachable,
        ] {
            assert_eq!(v.severity(), Some(Severity::Warning));
        }
    }

    #[test]
    fn test_assessment_alert_for() {
        assert!(Assessment::new(Verdict::Safe, "This URL seems safe.")
            .alert_for(3)
            .is_none());

        let alert = Assessment::certificate_invalid().alert_for(3).unwrap();
        assert_eq!(alert.tab_id, 3);
        assert_eq!(alert.text, CERTIFICATE_INVALID_MESSAGE);
        assert_eq!(alert.severity, Severity::Warning);
    }

    #[test]
    fn test_check_request_timestamp_format() {
        let mut event = NavigationEvent::top_level(1, "http://example.com").with_referrer("r");
        event.timestamp = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 5).unwrap();

        let req = CheckRequest::from_event(&event);
        assert_eq!(req.timestamp, "2024-03-01T12:30:05.000Z");

        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["url"], "http://example.com");
        assert_eq!(json["referrer"], "r");
    }

    #[test]
    fn test_ui_message_wire_shape() {
        let json = serde_json::to_value(UiMessage::vulnerability("bad site")).unwrap();
        assert_eq!(json["type"], "VULNERABILITY_DETECTED");
        assert_eq!(json["vulnerabilityDetails"], "bad site");
    }

    #[test]
    fn test_notification_security_alert() {
        let n = Notification::security_alert("msg");
        assert_eq!(n.title, "Security Alert!");
        assert_eq!(n.priority, 2);
        assert!(n.require_interaction);

        let json = serde_json::to_string(&n).unwrap();
        assert!(json.contains("\"requireInteraction\":true"));
    }
}
