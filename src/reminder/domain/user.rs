//! User record holding push subscriptions and notification settings.

use super::PushSubscription;
use crate::task::domain::{ClockTime, UserId};
use serde::{Deserialize, Serialize};

/// Window during which dispatched reminders are suppressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuietHours {
    /// Whether the window applies.
    pub enabled: bool,
    /// Window start, inclusive.
    pub start: ClockTime,
    /// Window end, exclusive. May be earlier than `start` to wrap midnight.
    pub end: ClockTime,
}

impl Default for QuietHours {
    fn default() -> Self {
        Self {
            enabled: false,
            start: ClockTime::from_hm(22, 0).unwrap_or(ClockTime::MIDNIGHT),
            end: ClockTime::from_hm(7, 0).unwrap_or(ClockTime::MIDNIGHT),
        }
    }
}

impl QuietHours {
    /// Returns `true` when the window is enabled and contains `time`.
    #[must_use]
    pub fn contains(self, time: ClockTime) -> bool {
        self.enabled && time.is_within(self.start, self.end)
    }
}

/// Per-user notification settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UserSettings {
    /// IANA time zone name. Stored for clients; dispatch uses server time.
    pub timezone: String,
    /// Quiet-hours window.
    pub quiet_hours: QuietHours,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            timezone: "UTC".to_owned(),
            quiet_hours: QuietHours::default(),
        }
    }
}

/// A user as seen by the reminder core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    subscriptions: Vec<PushSubscription>,
    settings: UserSettings,
}

impl User {
    /// Creates a user without subscriptions and with default settings.
    #[must_use]
    pub fn new(id: UserId) -> Self {
        Self::from_parts(id, Vec::new(), UserSettings::default())
    }

    /// Reconstructs a user from persisted parts.
    #[must_use]
    pub const fn from_parts(
        id: UserId,
        subscriptions: Vec<PushSubscription>,
        settings: UserSettings,
    ) -> Self {
        Self {
            id,
            subscriptions,
            settings,
        }
    }

    /// Returns the user identifier.
    #[must_use]
    pub const fn id(&self) -> UserId {
        self.id
    }

    /// Returns the registered push subscriptions.
    #[must_use]
    pub fn subscriptions(&self) -> &[PushSubscription] {
        &self.subscriptions
    }

    /// Returns the notification settings.
    #[must_use]
    pub const fn settings(&self) -> &UserSettings {
        &self.settings
    }

    /// Replaces the notification settings.
    pub fn set_settings(&mut self, settings: UserSettings) {
        self.settings = settings;
    }

    /// Adds a subscription, replacing any existing one with the same
    /// endpoint.
    pub fn upsert_subscription(&mut self, subscription: PushSubscription) {
        if let Some(existing) = self
            .subscriptions
            .iter_mut()
            .find(|existing| existing.endpoint == subscription.endpoint)
        {
            *existing = subscription;
        } else {
            self.subscriptions.push(subscription);
        }
    }

    /// Removes every subscription whose endpoint is listed and returns how
    /// many were removed.
    pub fn remove_endpoints<S: AsRef<str>>(&mut self, endpoints: &[S]) -> usize {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|subscription| {
            !endpoints
                .iter()
                .any(|endpoint| endpoint.as_ref() == subscription.endpoint)
        });
        before - self.subscriptions.len()
    }

    /// Returns `true` when quiet hours suppress dispatch at `time`.
    #[must_use]
    pub fn is_quiet_at(&self, time: ClockTime) -> bool {
        self.settings.quiet_hours.contains(time)
    }
}
