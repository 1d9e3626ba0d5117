//! Push delivery port.

use crate::reminder::domain::{NotificationPayload, PushSubscription};
use async_trait::async_trait;
use thiserror::Error;

/// Delivers one payload to one push subscription.
///
/// Implementations report and classify failures only; pruning dead
/// subscriptions is the caller's responsibility.
#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// Sends `payload` to `subscription`.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationSendError`] when the push service rejects the
    /// delivery or cannot be reached.
    async fn send(
        &self,
        subscription: &PushSubscription,
        payload: &NotificationPayload,
    ) -> Result<(), NotificationSendError>;
}

/// Whether a failed delivery says anything about the endpoint itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendFailureKind {
    /// The push service reported the subscription expired or unregistered.
    Gone,
    /// The delivery path failed; the endpoint may still be valid.
    Transient,
}

/// Failed delivery to one subscription endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("push delivery to {endpoint} failed: {reason}")]
pub struct NotificationSendError {
    /// Endpoint of the failed subscription.
    pub endpoint: String,
    /// Failure description.
    pub reason: String,
    /// Failure classification.
    pub kind: SendFailureKind,
}

impl NotificationSendError {
    /// Creates a send error for an endpoint the push service no longer
    /// accepts.
    #[must_use]
    pub fn gone(endpoint: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::with_kind(endpoint, reason, SendFailureKind::Gone)
    }

    /// Creates a send error that leaves the endpoint's validity unknown.
    #[must_use]
    pub fn transient(endpoint: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::with_kind(endpoint, reason, SendFailureKind::Transient)
    }

    fn with_kind(
        endpoint: impl Into<String>,
        reason: impl Into<String>,
        kind: SendFailureKind,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            reason: reason.into(),
            kind,
        }
    }

    /// Returns `true` when the subscription should be removed.
    #[must_use]
    pub const fn is_permanent(&self) -> bool {
        matches!(self.kind, SendFailureKind::Gone)
    }
}
