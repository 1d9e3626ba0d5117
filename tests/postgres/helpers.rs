//! Embedded cluster helpers shared by the `PostgreSQL` adapter tests.

use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use nudge::postgres::{PgPool, build_pool};
use nudge::reminder::{
    adapters::{memory::RecordingNotificationSender, postgres::PostgresUserRepository},
    domain::{PushSubscription, SubscriptionKeys, VapidPublicKey},
    services::NotificationService,
};
use pg_embedded_setup_unpriv::TestCluster;
use std::error::Error;
use std::sync::Arc;
use tokio::runtime::Runtime;

type SetupError = Box<dyn Error + Send + Sync>;

const CREATE_TASKS_SQL: &str =
    include_str!("../../migrations/2025-01-01-000000_create_tasks/up.sql");

const CREATE_USERS_SQL: &str =
    include_str!("../../migrations/2025-01-01-000100_create_users/up.sql");

/// Public key accepted by [`VapidPublicKey::parse`].
const VAPID_KEY: &str =
    "BAECAwQFBgcICQoLDA0ODxAREhMUFRYXGBkaGxwdHh8gISIjJCUmJygpKissLS4vMDEyMzQ1Njc4OTo7PD0-P0A";

/// Notification service over the `PostgreSQL` user store.
pub type Notifications = NotificationService<PostgresUserRepository, RecordingNotificationSender>;

/// Template database holding the migrated schema.
const TEMPLATE_DB: &str = "nudge_test_template";

/// Builds a runtime for driving the async repositories from sync tests.
///
/// # Panics
///
/// Panics when the runtime cannot be built.
#[must_use]
pub fn test_runtime() -> Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed to create test runtime")
}

/// Ensures the template database exists with every migration applied.
///
/// # Errors
///
/// Returns an error when the template cannot be created or migrated.
pub fn ensure_template(cluster: &TestCluster) -> Result<(), SetupError> {
    cluster
        .ensure_template_exists(TEMPLATE_DB, |db_name| {
            let url = cluster.connection().database_url(db_name);
            let mut conn = PgConnection::establish(&url).map_err(|e| eyre::eyre!("{e}"))?;
            execute_sql_statements(&mut conn, CREATE_TASKS_SQL)?;
            execute_sql_statements(&mut conn, CREATE_USERS_SQL)?;
            Ok(())
        })
        .map_err(|e| Box::new(e) as SetupError)?;
    Ok(())
}

/// Runs each statement of a migration file separately.
///
/// `diesel::sql_query` executes one statement per call, so the file is split
/// on semicolons and comment-only fragments are skipped.
fn execute_sql_statements(conn: &mut PgConnection, sql: &str) -> eyre::Result<()> {
    for statement in sql.split(';') {
        let trimmed = statement.trim();
        if trimmed.is_empty() || trimmed.lines().all(|line| line.trim().starts_with("--")) {
            continue;
        }
        diesel::sql_query(trimmed)
            .execute(conn)
            .map_err(|e| eyre::eyre!("SQL error: {e}\nStatement: {trimmed}"))?;
    }
    Ok(())
}

/// Clones the template into `db_name` and opens a single-connection pool.
///
/// # Errors
///
/// Returns an error when the database or the pool cannot be created.
pub fn create_database(cluster: &TestCluster, db_name: &str) -> Result<PgPool, SetupError> {
    ensure_template(cluster)?;
    cluster
        .create_database_from_template(db_name, TEMPLATE_DB)
        .map_err(|e| Box::new(e) as SetupError)?;
    let url = cluster.connection().database_url(db_name);
    build_pool(&url, 1).map_err(|e| Box::new(e) as SetupError)
}

/// Unique database name for one test.
#[must_use]
pub fn database_name(prefix: &str) -> String {
    format!("{prefix}_{}", uuid::Uuid::new_v4().simple())
}

/// Drops a test database when it goes out of scope, even after a panic.
///
/// Declare the guard before the pool so the pool closes its connection
/// first.
pub struct CleanupGuard<'a> {
    cluster: &'a TestCluster,
    db_name: String,
}

impl<'a> CleanupGuard<'a> {
    /// Guards `db_name` on `cluster`.
    #[must_use]
    pub const fn new(cluster: &'a TestCluster, db_name: String) -> Self {
        Self { cluster, db_name }
    }
}

impl Drop for CleanupGuard<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.cluster.drop_database(self.db_name.as_str()) {
            eprintln!("Warning: failed to drop test database {}: {e}", self.db_name);
        }
    }
}

/// Local wall-clock time in June 2025.
///
/// # Panics
///
/// Panics when the components do not form a valid date and time.
#[must_use]
pub fn june(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    june_day(day)
        .and_hms_opt(hour, minute, 0)
        .expect("valid June 2025 wall-clock time")
}

/// A calendar day in June 2025.
///
/// # Panics
///
/// Panics when `day` is not a day of June.
#[must_use]
pub fn june_day(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, day).expect("valid June 2025 date")
}

/// Builds a push subscription for `endpoint`.
#[must_use]
pub fn subscription(endpoint: &str) -> PushSubscription {
    PushSubscription {
        endpoint: endpoint.to_owned(),
        expiration_time: None,
        keys: SubscriptionKeys {
            p256dh: "client-key".to_owned(),
            auth: "client-auth".to_owned(),
        },
    }
}

/// Push-enabled notification service over `users` delivering to `sender`.
///
/// # Panics
///
/// Panics when the built-in VAPID key is rejected.
#[must_use]
pub fn notifications(
    users: Arc<PostgresUserRepository>,
    sender: Arc<RecordingNotificationSender>,
) -> Notifications {
    NotificationService::new(users).with_push(
        VapidPublicKey::parse(VAPID_KEY).expect("valid VAPID key"),
        sender,
    )
}
