//! User repository port.

use crate::reminder::domain::{PushSubscription, User};
use crate::task::domain::UserId;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for user repository operations.
pub type UserRepositoryResult<T> = Result<T, UserRepositoryError>;

/// User record persistence contract.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Finds a user by identifier.
    async fn find_by_id(&self, id: UserId) -> UserRepositoryResult<Option<User>>;

    /// Inserts or replaces a user record.
    async fn save(&self, user: &User) -> UserRepositoryResult<()>;

    /// Adds or replaces the subscription for its endpoint in one atomic
    /// update, creating the user record when absent.
    ///
    /// Subscriptions added or removed concurrently by other callers are
    /// preserved.
    async fn add_subscription(
        &self,
        id: UserId,
        subscription: PushSubscription,
    ) -> UserRepositoryResult<()>;

    /// Removes the listed endpoints from a user's subscriptions in one
    /// atomic update and returns how many were removed.
    ///
    /// A missing user removes nothing.
    async fn remove_subscriptions(
        &self,
        id: UserId,
        endpoints: &[String],
    ) -> UserRepositoryResult<usize>;
}

/// Errors returned by user repository implementations.
#[derive(Debug, Clone, Error)]
pub enum UserRepositoryError {
    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl UserRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
