//! Error types for phishguard

use thiserror::Error;

/// Errors that can occur in the guard pipeline and its host
///
/// The verdict pipeline never propagates the transport-level variants:
/// they are downgraded to a cautious verdict inside `SecurityProbe`.
#[derive(Debug, Error)]
pub enum GuardError {
    /// Network or TLS failure while talking to a page or the verdict service
    #[error("Transport error: {0}")]
    Transport(String),

    /// Verdict service answered with a non-success HTTP status
    #[error("Verdict service returned HTTP {status}")]
    Service { status: u16 },

    /// Verdict service answered with a body that is not `{"message": string}`
    #[error("Malformed verdict response: {0}")]
    MalformedResponse(String),

    /// Banner injection rejected by the target page
    #[error("Failed to inject banner into tab {tab_id}: {reason}")]
    Injection { tab_id: i64, reason: String },

    /// Notification, broadcast, or tab navigation could not be delivered
    #[error("Delivery failed: {0}")]
    Delivery(String),

    /// Persisted protection state could not be read or written
    #[error("State error: {0}")]
    State(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Native-messaging frame violation
    #[error("Frame error: {0}")]
    Frame(String),

    /// Serialization/deserialization failure
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O failure on the host channel
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for guard operations
pub type Result<T> = std::result::Result<T, GuardError>;
