//! Recording notification sender for tests and local runs.

use crate::reminder::{
    domain::{NotificationPayload, PushSubscription},
    ports::{NotificationSendError, NotificationSender, SendFailureKind},
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// A delivery accepted by [`RecordingNotificationSender`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedDelivery {
    /// Endpoint the payload was sent to.
    pub endpoint: String,
    /// Delivered payload.
    pub payload: NotificationPayload,
}

/// Sender that records deliveries in memory.
///
/// Endpoints registered as failing are rejected, either as expired browser
/// subscriptions or as transient push service outages.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotificationSender {
    deliveries: Arc<Mutex<Vec<RecordedDelivery>>>,
    failing: Arc<Mutex<HashMap<String, SendFailureKind>>>,
}

impl RecordingNotificationSender {
    /// Creates a sender that accepts every delivery.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `endpoint` as permanently failing.
    pub fn fail_endpoint(&self, endpoint: impl Into<String>) {
        self.mark(endpoint.into(), SendFailureKind::Gone);
    }

    /// Marks `endpoint` as unreachable without invalidating it.
    pub fn interrupt_endpoint(&self, endpoint: impl Into<String>) {
        self.mark(endpoint.into(), SendFailureKind::Transient);
    }

    fn mark(&self, endpoint: String, kind: SendFailureKind) {
        if let Ok(mut failing) = self.failing.lock() {
            failing.insert(endpoint, kind);
        }
    }

    /// Returns the deliveries accepted so far, in order.
    #[must_use]
    pub fn deliveries(&self) -> Vec<RecordedDelivery> {
        self.deliveries
            .lock()
            .map(|deliveries| deliveries.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl NotificationSender for RecordingNotificationSender {
    async fn send(
        &self,
        subscription: &PushSubscription,
        payload: &NotificationPayload,
    ) -> Result<(), NotificationSendError> {
        let outcome = self
            .failing
            .lock()
            .map_err(|err| NotificationSendError::transient(&subscription.endpoint, err.to_string()))?
            .get(&subscription.endpoint)
            .copied();
        match outcome {
            Some(SendFailureKind::Gone) => {
                return Err(NotificationSendError::gone(
                    &subscription.endpoint,
                    "subscription expired",
                ));
            }
            Some(SendFailureKind::Transient) => {
                return Err(NotificationSendError::transient(
                    &subscription.endpoint,
                    "push service unavailable",
                ));
            }
            None => {}
        }
        self.deliveries
            .lock()
            .map_err(|err| NotificationSendError::transient(&subscription.endpoint, err.to_string()))?
            .push(RecordedDelivery {
                endpoint: subscription.endpoint.clone(),
                payload: payload.clone(),
            });
        Ok(())
    }
}
