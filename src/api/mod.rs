//! HTTP layer built on axum.
//!
//! Handlers resolve the caller through [`AuthUser`], delegate to the
//! application services, and translate service errors with [`ApiError`].
//! Repositories are held as trait objects so one router type serves both the
//! in-memory and `PostgreSQL` adapters.

mod auth;
mod error;
mod notifications;
mod stats;
mod tasks;


pub use auth::{AuthUser, TokenRegistry, digest_hex};
pub use error::{ApiError, ApiResult};

use crate::reminder::{
    ports::{NotificationSender, UserRepository},
    services::NotificationService,
};
use crate::stats::services::StatisticsService;
use crate::task::{
    domain::ReminderLead,
    ports::{HistoryRepository, TaskRepository},
    services::{CompletionService, TaskService},
};
use axum::{
    Json, Router,
    extract::FromRef,
    http::{Method, header},
    routing::{get, post},
};
use mockable::Clock;
use serde_json::{Value, json};
use std::{future::Future, io, sync::Arc};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

/// Storage ports shared by every handler.
#[derive(Clone)]
pub struct Repositories {
    /// Task storage.
    pub tasks: Arc<dyn TaskRepository>,
    /// Completion history storage.
    pub history: Arc<dyn HistoryRepository>,
    /// User records and push subscriptions.
    pub users: Arc<dyn UserRepository>,
}

/// Notification service over trait-object ports.
pub type SharedNotificationService = NotificationService<dyn UserRepository, dyn NotificationSender>;

/// Shared handler state.
pub struct AppState<C>
where
    C: Clock + Send + Sync + 'static,
{
    tasks: TaskService<dyn TaskRepository, C>,
    completion: CompletionService<dyn TaskRepository, dyn HistoryRepository, C>,
    statistics: StatisticsService<dyn TaskRepository, dyn HistoryRepository, C>,
    notifications: SharedNotificationService,
    tokens: Arc<TokenRegistry>,
}

impl<C> Clone for AppState<C>
where
    C: Clock + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            tasks: self.tasks.clone(),
            completion: self.completion.clone(),
            statistics: self.statistics.clone(),
            notifications: self.notifications.clone(),
            tokens: Arc::clone(&self.tokens),
        }
    }
}

impl<C> AppState<C>
where
    C: Clock + Send + Sync + 'static,
{
    /// Wires the services over `repositories`.
    #[must_use]
    pub fn new(
        repositories: &Repositories,
        notifications: SharedNotificationService,
        tokens: TokenRegistry,
        clock: Arc<C>,
    ) -> Self {
        Self {
            tasks: TaskService::new(Arc::clone(&repositories.tasks), Arc::clone(&clock)),
            completion: CompletionService::new(
                Arc::clone(&repositories.tasks),
                Arc::clone(&repositories.history),
                Arc::clone(&clock),
            ),
            statistics: StatisticsService::new(
                Arc::clone(&repositories.tasks),
                Arc::clone(&repositories.history),
                clock,
            ),
            notifications,
            tokens: Arc::new(tokens),
        }
    }

    /// Sets the lead time given to tasks created without one.
    #[must_use]
    pub fn with_default_lead(mut self, lead: ReminderLead) -> Self {
        self.tasks = self.tasks.with_default_lead(lead);
        self
    }
}

impl<C> FromRef<AppState<C>> for Arc<TokenRegistry>
where
    C: Clock + Send + Sync + 'static,
{
    fn from_ref(state: &AppState<C>) -> Self {
        Arc::clone(&state.tokens)
    }
}

/// Builds the application router.
#[must_use]
pub fn build_router<C>(state: AppState<C>) -> Router
where
    C: Clock + Send + Sync + 'static,
{
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    Router::new()
        .route("/api/health", get(health))
        .route(
            "/api/tasks",
            get(tasks::list::<C>).post(tasks::create::<C>),
        )
        .route("/api/tasks/stats", get(stats::statistics::<C>))
        .route("/api/tasks/completed/today", get(tasks::completed_today::<C>))
        .route(
            "/api/tasks/{id}",
            get(tasks::fetch::<C>)
                .put(tasks::update::<C>)
                .delete(tasks::remove::<C>),
        )
        .route("/api/tasks/{id}/complete", post(tasks::complete::<C>))
        .route("/api/tasks/{id}/remind", post(notifications::remind::<C>))
        .route(
            "/api/notifications/subscribe",
            post(notifications::subscribe::<C>),
        )
        .route(
            "/api/notifications/unsubscribe",
            post(notifications::unsubscribe::<C>),
        )
        .route("/api/notifications/test", post(notifications::test::<C>))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "message": "nudge server is running" }))
}

/// Serves `router` on `listener` until `shutdown` resolves.
///
/// # Errors
///
/// Returns the I/O error that stopped the server.
pub async fn serve(
    listener: TcpListener,
    router: Router,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "http server listening");
    }
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
}
