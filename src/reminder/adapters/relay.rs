//! HTTP push relay adapter.
//!
//! Web Push encryption and VAPID signing are delegated to an external relay
//! service. This adapter posts the subscription and payload as JSON.
//!
//! The relay answers `404 Not Found` or `410 Gone` when the push service
//! reports the subscription expired or unregistered; only those failures
//! mark the endpoint as gone. Transport errors, timeouts and any other
//! non-success status are transient.

use crate::reminder::{
    domain::{NotificationPayload, PushSubscription},
    ports::{NotificationSendError, NotificationSender},
};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

#[derive(Serialize)]
struct RelayRequest<'a> {
    subscription: &'a PushSubscription,
    payload: &'a NotificationPayload,
}

/// Notification sender backed by an HTTP push relay.
#[derive(Debug, Clone)]
pub struct HttpPushRelay {
    client: reqwest::Client,
    url: String,
}

impl HttpPushRelay {
    /// Creates a relay client posting to `url` with a request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`reqwest::Error`] when the HTTP client cannot be built.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

fn endpoint_gone(status: StatusCode) -> bool {
    status == StatusCode::NOT_FOUND || status == StatusCode::GONE
}

#[async_trait]
impl NotificationSender for HttpPushRelay {
    async fn send(
        &self,
        subscription: &PushSubscription,
        payload: &NotificationPayload,
    ) -> Result<(), NotificationSendError> {
        let response = self
            .client
            .post(&self.url)
            .json(&RelayRequest {
                subscription,
                payload,
            })
            .send()
            .await
            .map_err(|err| {
                NotificationSendError::transient(&subscription.endpoint, err.without_url().to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let reason = format!("relay responded with {status}");
            return Err(if endpoint_gone(status) {
                NotificationSendError::gone(&subscription.endpoint, reason)
            } else {
                NotificationSendError::transient(&subscription.endpoint, reason)
            });
        }
        debug!(endpoint_host = subscription.endpoint_host(), "push relayed");
        Ok(())
    }
}
