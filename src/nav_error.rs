//! Browser navigation errors mapped to user-facing alerts
//!
//! This path never consults the dedup cursor and never runs the probe.

use crate::types::{AlertMessage, NavigationErrorEvent};

/// Message for error codes missing from the table
pub const GENERIC_ERROR_MESSAGE: &str = "Security risk detected with this website.";

const ERROR_MESSAGES: &[(&str, &str)] = &[
    (
        "net::ERR_CONNECTION_REFUSED",
        "Connection was refused. This could be a malicious site.",
    ),
    (
        "net::ERR_CERT_INVALID",
        "Invalid SSL certificate detected. Site might be unsafe.",
    ),
    (
        "net::ERR_CERT_AUTHORITY_INVALID",
        "Invalid certificate authority. Possible security risk.",
    ),
    (
        "net::ERR_SSL_PROTOCOL_ERROR",
        "SSL protocol error. Connection might be compromised.",
    ),
    (
        "net::ERR_CERT_COMMON_NAME_INVALID",
        "Domain name mismatch. Possible phishing attempt.",
    ),
    (
        "net::ERR_BAD_SSL_CLIENT_AUTH_CERT",
        "Invalid client authentication certificate.",
    ),
    ("net::ERR_CERT_REVOKED", "Website certificate has been revoked."),
    (
        "net::ERR_BLOCKED_BY_ADMINISTRATOR",
        "This site is blocked by your organization.",
    ),
    ("net::ERR_UNSAFE_PORT", "The requested port is not secure."),
];

/// Human-readable message for a browser error code
pub fn error_message(code: &str) -> &'static str {
    ERROR_MESSAGES
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, message)| *message)
        .unwrap_or(GENERIC_ERROR_MESSAGE)
}

/// Turns navigation failures into warning alerts
#[derive(Debug, Default, Clone, Copy)]
pub struct NavigationErrorHandler;

impl NavigationErrorHandler {
    /// Alert for a failed navigation, or `None` when it is out of scope
    /// (protection off or sub-frame)
    pub fn handle(&self, event: &NavigationErrorEvent, enabled: bool) -> Option<AlertMessage> {
        if !enabled || !event.is_top_level() {
            return None;
        }
        let message = error_message(&event.error);
        tracing::info!(
            tab_id = event.tab_id,
            url = %event.url,
            error = %event.error,
            "Navigation error"
        );
        Some(AlertMessage::warning(event.tab_id, message))
    }
}
