//! Push subscription management and delivery with dead-endpoint pruning.

use crate::reminder::{
    domain::{
        FireEvent, FireKind, NotificationPayload, PushSubscription, ReminderDomainError, User,
        VapidPublicKey, endpoint_host,
    },
    ports::{NotificationSendError, NotificationSender, UserRepository, UserRepositoryError},
};
use crate::task::domain::{Task, UserId};
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

/// Service-level errors for notification operations.
#[derive(Debug, Error)]
pub enum NotificationServiceError {
    /// Push delivery is not configured on this server.
    #[error("push notifications are not configured on this server")]
    ConfigurationMissing,

    /// The user has no registered push subscriptions.
    #[error("no push subscriptions found for user {0}")]
    NoSubscriptions(UserId),

    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] ReminderDomainError),

    /// User repository operation failed.
    #[error(transparent)]
    Users(#[from] UserRepositoryError),
}

/// Result type for notification service operations.
pub type NotificationServiceResult<T> = Result<T, NotificationServiceError>;

/// Outcome of delivering payloads to one user's subscriptions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    /// Sends attempted.
    pub attempted: usize,
    /// Sends accepted by the push service.
    pub delivered: usize,
    /// Failed sends, one per failed attempt.
    pub failures: Vec<NotificationSendError>,
    /// Subscriptions removed after the push service reported them gone.
    pub pruned: usize,
}

impl DeliveryReport {
    /// Returns the number of failed sends.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.attempted - self.delivered
    }
}

struct PushChannel<S: ?Sized> {
    vapid_key: VapidPublicKey,
    sender: Arc<S>,
}

/// Push notification orchestration service.
pub struct NotificationService<U, S>
where
    U: UserRepository + ?Sized,
    S: NotificationSender + ?Sized,
{
    users: Arc<U>,
    push: Option<PushChannel<S>>,
}

impl<U, S> Clone for NotificationService<U, S>
where
    U: UserRepository + ?Sized,
    S: NotificationSender + ?Sized,
{
    fn clone(&self) -> Self {
        Self {
            users: Arc::clone(&self.users),
            push: self.push.as_ref().map(|channel| PushChannel {
                vapid_key: channel.vapid_key.clone(),
                sender: Arc::clone(&channel.sender),
            }),
        }
    }
}

impl<U, S> NotificationService<U, S>
where
    U: UserRepository + ?Sized + 'static,
    S: NotificationSender + ?Sized + 'static,
{
    /// Creates a service without push delivery configured.
    ///
    /// Operations that need push fail with
    /// [`NotificationServiceError::ConfigurationMissing`].
    #[must_use]
    pub const fn new(users: Arc<U>) -> Self {
        Self { users, push: None }
    }

    /// Enables push delivery through `sender`.
    #[must_use]
    pub fn with_push(mut self, vapid_key: VapidPublicKey, sender: Arc<S>) -> Self {
        self.push = Some(PushChannel { vapid_key, sender });
        self
    }

    /// Returns `true` when push delivery is configured.
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.push.is_some()
    }

    /// Returns the user record store.
    #[must_use]
    pub fn users(&self) -> &U {
        &self.users
    }

    fn channel(&self) -> NotificationServiceResult<&PushChannel<S>> {
        self.push
            .as_ref()
            .ok_or(NotificationServiceError::ConfigurationMissing)
    }

    /// Registers a push subscription and returns the VAPID public key.
    ///
    /// The user record is created on first subscription. A subscription with
    /// an already registered endpoint replaces the stored one.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationServiceError::ConfigurationMissing`] when push is
    /// not configured and [`NotificationServiceError::Domain`] for a blank
    /// endpoint.
    pub async fn subscribe(
        &self,
        user_id: UserId,
        subscription: PushSubscription,
    ) -> NotificationServiceResult<String> {
        let channel = self.channel()?;
        subscription.validate()?;
        let host = subscription.endpoint_host().to_owned();

        self.users.add_subscription(user_id, subscription).await?;
        info!(user_id = %user_id, endpoint_host = %host, "push subscription registered");
        Ok(channel.vapid_key.as_str().to_owned())
    }

    /// Removes the subscription registered for `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationServiceError::Domain`] for a blank endpoint.
    pub async fn unsubscribe(&self, user_id: UserId, endpoint: &str) -> NotificationServiceResult<()> {
        if endpoint.trim().is_empty() {
            return Err(ReminderDomainError::EmptyEndpoint.into());
        }
        let removed = self
            .users
            .remove_subscriptions(user_id, &[endpoint.to_owned()])
            .await?;
        info!(
            user_id = %user_id,
            endpoint_host = endpoint_host(endpoint),
            removed,
            "push subscription removed"
        );
        Ok(())
    }

    /// Sends the test notification to every subscription of the user.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationServiceError::ConfigurationMissing`] or
    /// [`NotificationServiceError::NoSubscriptions`].
    pub async fn send_test(&self, user_id: UserId) -> NotificationServiceResult<DeliveryReport> {
        self.send_on_demand(user_id, NotificationPayload::test())
            .await
    }

    /// Sends an immediate reminder for `task` to its owner.
    ///
    /// Quiet hours do not apply to on-demand sends.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationServiceError::ConfigurationMissing`],
    /// [`NotificationServiceError::NoSubscriptions`], or a template error.
    pub async fn send_reminder(&self, task: &Task) -> NotificationServiceResult<DeliveryReport> {
        let event = FireEvent {
            kind: FireKind::Exact,
            scheduled_time: task.times().first().unwrap_or_default(),
            lead: task.reminder_lead(),
        };
        let payload = NotificationPayload::for_reminder(task, &event)?;
        self.send_on_demand(task.owner(), payload).await
    }

    async fn send_on_demand(
        &self,
        user_id: UserId,
        payload: NotificationPayload,
    ) -> NotificationServiceResult<DeliveryReport> {
        self.channel()?;
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .filter(|user| !user.subscriptions().is_empty())
            .ok_or(NotificationServiceError::NoSubscriptions(user_id))?;
        self.deliver(&user, &[payload]).await
    }

    /// Sends every payload to every subscription of `user` concurrently, then
    /// removes every endpoint reported gone with a single user-record update.
    ///
    /// A failure on one endpoint never prevents attempts on the others.
    /// Transient failures are reported but keep the subscription.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationServiceError::ConfigurationMissing`] when push is
    /// not configured.
    pub async fn deliver(
        &self,
        user: &User,
        payloads: &[NotificationPayload],
    ) -> NotificationServiceResult<DeliveryReport> {
        let channel = self.channel()?;
        let mut sends = JoinSet::new();
        for payload in payloads {
            for subscription in user.subscriptions() {
                let sender = Arc::clone(&channel.sender);
                let target = subscription.clone();
                let message = payload.clone();
                sends.spawn(async move { sender.send(&target, &message).await });
            }
        }

        let mut report = DeliveryReport::default();
        while let Some(joined) = sends.join_next().await {
            report.attempted += 1;
            match joined {
                Ok(Ok(())) => report.delivered += 1,
                Ok(Err(failure)) => {
                    warn!(
                        user_id = %user.id(),
                        endpoint_host = endpoint_host(&failure.endpoint),
                        reason = %failure.reason,
                        permanent = failure.is_permanent(),
                        "push delivery failed"
                    );
                    report.failures.push(failure);
                }
                Err(join_error) => {
                    error!(user_id = %user.id(), error = %join_error, "push send task aborted");
                }
            }
        }

        report.pruned = self.prune(user.id(), &report.failures).await;
        Ok(report)
    }

    async fn prune(&self, user_id: UserId, failures: &[NotificationSendError]) -> usize {
        let mut endpoints: Vec<String> = failures
            .iter()
            .filter(|failure| failure.is_permanent())
            .map(|failure| failure.endpoint.clone())
            .collect();
        endpoints.sort_unstable();
        endpoints.dedup();
        if endpoints.is_empty() {
            return 0;
        }
        match self.users.remove_subscriptions(user_id, &endpoints).await {
            Ok(removed) => {
                info!(user_id = %user_id, removed, "pruned failed push subscriptions");
                removed
            }
            Err(err) => {
                error!(user_id = %user_id, error = %err, "failed to prune push subscriptions");
                0
            }
        }
    }
}
