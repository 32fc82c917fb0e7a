//! Error types for the connection registry.

use crate::types::SubscriptionId;
use thiserror::Error;

/// Errors raised by an event source's own subscribe/unsubscribe primitives.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SourceError {
    #[error("Unknown subscription: {0}")]
    UnknownSubscription(SubscriptionId),

    #[error("Unsupported event: {0}")]
    UnsupportedEvent(String),

    #[error("Source already destroyed")]
    Destroyed,

    #[error("{0}")]
    Other(String),
}

/// Main error type for registry operations.
///
/// Only [`ConnectionError::Subscribe`] is ever returned to a caller. The other
/// variants are handed to the registry's [`ErrorReporter`](crate::ErrorReporter)
/// and never escape a teardown operation.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ConnectionError {
    #[error("Error subscribing to `{event}`: {source}")]
    Subscribe { event: String, source: SourceError },

    #[error("Error removing connection {id}: {source}")]
    Unsubscribe { id: SubscriptionId, source: SourceError },

    #[error("Error watching destruction for connection {id}: {source}")]
    DestroyWatch { id: SubscriptionId, source: SourceError },
}

impl ConnectionError {
    /// The subscription the failure relates to, when there is one.
    pub fn subscription(&self) -> Option<SubscriptionId> {
        match self {
            ConnectionError::Subscribe { .. } => None,
            ConnectionError::Unsubscribe { id, .. } | ConnectionError::DestroyWatch { id, .. } => {
                Some(*id)
            }
        }
    }
}

/// Result type for registry operations.
pub type Result<T> = std::result::Result<T, ConnectionError>;
