//! Shared error type across tigcluster crates.

use thiserror::Error;

/// Stable error codes (reported in logs and metrics labels).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Inbound envelope is not a cluster envelope.
    MalformedEnvelope,
    /// Invalid input (payload, config value).
    BadRequest,
    /// Unsupported config version.
    UnsupportedVersion,
    /// Target node is not known to the delivery layer.
    UnknownNode,
    /// Envelope could not be handed to the target node.
    DeliveryFailed,
    /// Internal error.
    Internal,
}

impl ErrorCode {
    /// String representation used in logs and metrics.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MalformedEnvelope => "MALFORMED_ENVELOPE",
            ErrorCode::BadRequest => "BAD_REQUEST",
            ErrorCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ErrorCode::UnknownNode => "UNKNOWN_NODE",
            ErrorCode::DeliveryFailed => "DELIVERY_FAILED",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, ClusterError>;

/// Unified error type used by core and node runtime.
#[derive(Debug, Error)]
pub enum ClusterError {
    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("unknown node: {0}")]
    UnknownNode(String),
    #[error("delivery failed: {0}")]
    Delivery(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl ClusterError {
    /// Map the error to its stable code.
    pub fn code(&self) -> ErrorCode {
        match self {
            ClusterError::MalformedEnvelope(_) => ErrorCode::MalformedEnvelope,
            ClusterError::BadRequest(_) => ErrorCode::BadRequest,
            ClusterError::UnsupportedVersion => ErrorCode::UnsupportedVersion,
            ClusterError::UnknownNode(_) => ErrorCode::UnknownNode,
            ClusterError::Delivery(_) => ErrorCode::DeliveryFailed,
            ClusterError::Internal(_) => ErrorCode::Internal,
        }
    }
}
