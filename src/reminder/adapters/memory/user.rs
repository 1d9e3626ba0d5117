//! In-memory user repository.

use crate::reminder::{
    domain::{PushSubscription, User},
    ports::{UserRepository, UserRepositoryError, UserRepositoryResult},
};
use crate::task::domain::UserId;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Thread-safe in-memory user repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<UserId, User>>>,
}

impl InMemoryUserRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(err: impl ToString) -> UserRepositoryError {
    UserRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: UserId) -> UserRepositoryResult<Option<User>> {
        let users = self.users.read().map_err(lock_error)?;
        Ok(users.get(&id).cloned())
    }

    async fn save(&self, user: &User) -> UserRepositoryResult<()> {
        let mut users = self.users.write().map_err(lock_error)?;
        users.insert(user.id(), user.clone());
        Ok(())
    }

    async fn add_subscription(
        &self,
        id: UserId,
        subscription: PushSubscription,
    ) -> UserRepositoryResult<()> {
        let mut users = self.users.write().map_err(lock_error)?;
        users
            .entry(id)
            .or_insert_with(|| User::new(id))
            .upsert_subscription(subscription);
        Ok(())
    }

    async fn remove_subscriptions(
        &self,
        id: UserId,
        endpoints: &[String],
    ) -> UserRepositoryResult<usize> {
        let mut users = self.users.write().map_err(lock_error)?;
        Ok(users
            .get_mut(&id)
            .map_or(0, |user| user.remove_endpoints(endpoints)))
    }
}
