//! Browser push subscriptions and the server's VAPID public key.

use super::ReminderDomainError;
use base64::Engine;
use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD, URL_SAFE, URL_SAFE_NO_PAD};
use serde::{Deserialize, Serialize};
use std::fmt;

const VAPID_KEY_LEN: usize = 65;
const REDACTED: &str = "<redacted>";

/// Encryption keys issued by the browser for one subscription.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionKeys {
    /// Client public key.
    pub p256dh: String,
    /// Client authentication secret.
    pub auth: String,
}

impl fmt::Debug for SubscriptionKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionKeys")
            .field("p256dh", &REDACTED)
            .field("auth", &REDACTED)
            .finish()
    }
}

/// A registered browser push endpoint.
///
/// Treated as an opaque credential; only the endpoint identifies it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushSubscription {
    /// Push service URL.
    pub endpoint: String,
    /// Expiry in epoch milliseconds, if the browser reported one.
    #[serde(default)]
    pub expiration_time: Option<i64>,
    /// Encryption keys.
    pub keys: SubscriptionKeys,
}

impl PushSubscription {
    /// Checks that the endpoint is present.
    ///
    /// # Errors
    ///
    /// Returns [`ReminderDomainError::EmptyEndpoint`] for a blank endpoint.
    pub fn validate(&self) -> Result<(), ReminderDomainError> {
        if self.endpoint.trim().is_empty() {
            return Err(ReminderDomainError::EmptyEndpoint);
        }
        Ok(())
    }

    /// Returns the endpoint host, safe to include in logs.
    #[must_use]
    pub fn endpoint_host(&self) -> &str {
        endpoint_host(&self.endpoint)
    }
}

/// Returns the host part of a push endpoint URL.
#[must_use]
pub fn endpoint_host(endpoint: &str) -> &str {
    let without_scheme = endpoint
        .split_once("://")
        .map_or(endpoint, |(_, rest)| rest);
    without_scheme
        .split(['/', '?', '#'])
        .next()
        .unwrap_or(without_scheme)
}

/// Server VAPID public key handed to browsers when they subscribe.
#[derive(Clone, PartialEq, Eq)]
pub struct VapidPublicKey(String);

impl VapidPublicKey {
    /// Validates a base64 encoded uncompressed P-256 public key.
    ///
    /// Standard and URL-safe alphabets are accepted, padded or not.
    ///
    /// # Errors
    ///
    /// Returns [`ReminderDomainError::InvalidVapidKey`] unless the value
    /// decodes to exactly 65 bytes.
    pub fn parse(value: &str) -> Result<Self, ReminderDomainError> {
        let trimmed = value.trim();
        let decoded = [URL_SAFE_NO_PAD, URL_SAFE, STANDARD, STANDARD_NO_PAD]
            .iter()
            .find_map(|engine| engine.decode(trimmed).ok());
        match decoded {
            Some(bytes) if bytes.len() == VAPID_KEY_LEN => Ok(Self(trimmed.to_owned())),
            _ => Err(ReminderDomainError::InvalidVapidKey),
        }
    }

    /// Returns the key as configured.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for VapidPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("VapidPublicKey").field(&REDACTED).finish()
    }
}
