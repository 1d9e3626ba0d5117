//! `PostgreSQL` repository implementation for user records.

use super::schema::users;
use crate::postgres::{BoxedDbError, PgPool, run_blocking_with};
use crate::reminder::{
    domain::{PushSubscription, User, UserSettings},
    ports::{UserRepository, UserRepositoryError, UserRepositoryResult},
};
use crate::task::domain::UserId;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::upsert::excluded;
use serde_json::Value;
use std::sync::Arc;

/// Query result and insert row for user records.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
struct UserRow {
    id: uuid::Uuid,
    subscriptions: Value,
    settings: Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// `PostgreSQL`-backed user repository.
#[derive(Debug, Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> UserRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> UserRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        run_blocking_with(&self.pool, boxed_persistence, f).await
    }
}

fn boxed_persistence(err: BoxedDbError) -> UserRepositoryError {
    UserRepositoryError::Persistence(Arc::from(err))
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_id(&self, id: UserId) -> UserRepositoryResult<Option<User>> {
        self.run_blocking(move |connection| {
            let row = users::table
                .find(id.into_inner())
                .select(UserRow::as_select())
                .first::<UserRow>(connection)
                .optional()
                .map_err(UserRepositoryError::persistence)?;
            row.map(row_to_user).transpose()
        })
        .await
    }

    async fn save(&self, user: &User) -> UserRepositoryResult<()> {
        let row = new_user_row(user)?;
        self.run_blocking(move |connection| {
            diesel::insert_into(users::table)
                .values(&row)
                .on_conflict(users::id)
                .do_update()
                .set((
                    users::subscriptions.eq(excluded(users::subscriptions)),
                    users::settings.eq(excluded(users::settings)),
                    users::updated_at.eq(excluded(users::updated_at)),
                ))
                .execute(connection)
                .map_err(UserRepositoryError::persistence)?;
            Ok(())
        })
        .await
    }

    async fn add_subscription(
        &self,
        id: UserId,
        subscription: PushSubscription,
    ) -> UserRepositoryResult<()> {
        let fresh = new_user_row(&User::new(id))?;
        self.run_blocking(move |connection| {
            connection.transaction::<(), UserRepositoryError, _>(|tx| {
                diesel::insert_into(users::table)
                    .values(&fresh)
                    .on_conflict(users::id)
                    .do_nothing()
                    .execute(tx)
                    .map_err(UserRepositoryError::persistence)?;
                let row = users::table
                    .find(id.into_inner())
                    .for_update()
                    .select(UserRow::as_select())
                    .first::<UserRow>(tx)
                    .map_err(UserRepositoryError::persistence)?;
                let mut user = row_to_user(row)?;
                user.upsert_subscription(subscription);
                let updated = serde_json::to_value(user.subscriptions())
                    .map_err(UserRepositoryError::persistence)?;
                diesel::update(users::table.find(id.into_inner()))
                    .set((
                        users::subscriptions.eq(updated),
                        users::updated_at.eq(Utc::now()),
                    ))
                    .execute(tx)
                    .map_err(UserRepositoryError::persistence)?;
                Ok(())
            })
        })
        .await
    }

    async fn remove_subscriptions(
        &self,
        id: UserId,
        endpoints: &[String],
    ) -> UserRepositoryResult<usize> {
        let endpoints = endpoints.to_vec();
        self.run_blocking(move |connection| {
            connection.transaction::<usize, UserRepositoryError, _>(|tx| {
                let row = users::table
                    .find(id.into_inner())
                    .for_update()
                    .select(UserRow::as_select())
                    .first::<UserRow>(tx)
                    .optional()
                    .map_err(UserRepositoryError::persistence)?;
                let Some(found) = row else {
                    return Ok(0);
                };
                let mut user = row_to_user(found)?;
                let removed = user.remove_endpoints(&endpoints);
                if removed == 0 {
                    return Ok(0);
                }
                let remaining = serde_json::to_value(user.subscriptions())
                    .map_err(UserRepositoryError::persistence)?;
                diesel::update(users::table.find(id.into_inner()))
                    .set((
                        users::subscriptions.eq(remaining),
                        users::updated_at.eq(Utc::now()),
                    ))
                    .execute(tx)
                    .map_err(UserRepositoryError::persistence)?;
                Ok(removed)
            })
        })
        .await
    }
}

impl From<diesel::result::Error> for UserRepositoryError {
    fn from(err: diesel::result::Error) -> Self {
        Self::persistence(err)
    }
}

fn new_user_row(user: &User) -> UserRepositoryResult<UserRow> {
    let subscriptions =
        serde_json::to_value(user.subscriptions()).map_err(UserRepositoryError::persistence)?;
    let settings =
        serde_json::to_value(user.settings()).map_err(UserRepositoryError::persistence)?;
    let now = Utc::now();
    Ok(UserRow {
        id: user.id().into_inner(),
        subscriptions,
        settings,
        created_at: now,
        updated_at: now,
    })
}

fn row_to_user(row: UserRow) -> UserRepositoryResult<User> {
    let subscriptions = serde_json::from_value::<Vec<PushSubscription>>(row.subscriptions)
        .map_err(UserRepositoryError::persistence)?;
    let settings = serde_json::from_value::<UserSettings>(row.settings)
        .map_err(UserRepositoryError::persistence)?;
    Ok(User::from_parts(
        UserId::from_uuid(row.id),
        subscriptions,
        settings,
    ))
}
