//! Runs the nudge HTTP API and the reminder dispatcher.
//!
//! Usage:
//!
//! ```text
//! nudge-server [--config nudge.toml] [--host 0.0.0.0] [--port 5001]
//! ```
//!
//! Storage is `PostgreSQL` when `[database] url` is set and in-memory
//! otherwise. Push delivery is enabled only when `[push]` carries a valid
//! VAPID public key and a relay URL.

use clap::Parser;
use diesel::r2d2::PoolError;
use mockable::DefaultClock;
use nudge::api::{self, AppState, Repositories, SharedNotificationService, TokenRegistry};
use nudge::config::{Config, ConfigError, DatabaseConfig, PushConfig};
use nudge::postgres::build_pool;
use nudge::reminder::{
    adapters::{memory::InMemoryUserRepository, postgres::PostgresUserRepository, relay::HttpPushRelay},
    ports::{NotificationSender, UserRepository},
    services::ReminderDispatcher,
};
use nudge::task::adapters::{
    memory::{InMemoryHistoryRepository, InMemoryTaskRepository},
    postgres::{PostgresHistoryRepository, PostgresTaskRepository},
};
use std::future::Future;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, Registry, fmt, prelude::*, reload};

#[derive(Debug, Parser)]
#[command(name = "nudge-server", version, about)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "nudge.toml")]
    config: PathBuf,
    /// Overrides `[server] host`.
    #[arg(long)]
    host: Option<String>,
    /// Overrides `[server] port`.
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Debug, Error)]
enum ServerError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to build database pool: {0}")]
    Pool(#[source] PoolError),
    #[error("failed to build push relay client: {0}")]
    Relay(#[source] reqwest::Error),
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },
    #[error("http server failed: {0}")]
    Serve(#[source] io::Error),
}

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    let cli = Cli::parse();
    let log_filter = init_tracing();
    let mut config = Config::load(&cli.config)?;
    apply_log_level(log_filter.as_ref(), &config.server.log_level);
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    let clock = Arc::new(DefaultClock);
    let repositories = open_repositories(&config.database)?;
    let notifications = notification_service(&config.push, Arc::clone(&repositories.users))?;
    let (stop_tx, stop_rx) = watch::channel(false);
    tokio::spawn(async move { forward_ctrl_c(&stop_tx).await });

    let dispatcher = if config.reminder.enabled {
        let dispatcher = ReminderDispatcher::new(
            Arc::clone(&repositories.tasks),
            notifications.clone(),
            Arc::clone(&clock),
        )
        .with_gating(config.reminder.schedule_gating)
        .with_quiet_hours(config.reminder.quiet_hours);
        Some(tokio::spawn(
            Arc::new(dispatcher).run(stopped(stop_rx.clone())),
        ))
    } else {
        info!("reminder dispatcher disabled");
        None
    };

    let tokens = TokenRegistry::from_config(&config.auth);
    if tokens.is_empty() {
        warn!("no API tokens configured; every authenticated route will reject requests");
    }
    let state = AppState::new(&repositories, notifications, tokens, clock)
        .with_default_lead(config.reminder.default_lead());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;
    let served = api::serve(listener, api::build_router(state), stopped(stop_rx)).await;

    if let Some(handle) = dispatcher {
        if let Err(err) = handle.await {
            error!(error = %err, "reminder dispatcher panicked");
        }
    }
    served.map_err(ServerError::Serve)?;
    info!("server stopped");
    Ok(())
}

/// Filter applied until the configuration names a log level.
const STARTUP_LOG_LEVEL: &str = "info";

type LogFilterHandle = reload::Handle<EnvFilter, Registry>;

/// Installs the global subscriber before anything else logs.
///
/// `RUST_LOG` fixes the filter for the whole run. Otherwise a reloadable
/// startup filter is installed and its handle returned so the configured
/// level can replace it once the config file is read.
fn init_tracing() -> Option<LogFilterHandle> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        tracing_subscriber::fmt().with_env_filter(filter).init();
        return None;
    }
    let (filter, handle) = reload::Layer::new(EnvFilter::new(STARTUP_LOG_LEVEL));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .init();
    Some(handle)
}

fn apply_log_level(handle: Option<&LogFilterHandle>, level: &str) {
    let Some(filter) = handle else {
        return;
    };
    if let Err(err) = filter.reload(EnvFilter::new(level)) {
        warn!(error = %err, "failed to apply configured log level");
    }
}

fn open_repositories(config: &DatabaseConfig) -> Result<Repositories, ServerError> {
    let Some(url) = config.url.as_deref() else {
        warn!("no database url configured; data is kept in memory only");
        return Ok(Repositories {
            tasks: Arc::new(InMemoryTaskRepository::new()),
            history: Arc::new(InMemoryHistoryRepository::new()),
            users: Arc::new(InMemoryUserRepository::new()),
        });
    };
    let pool = build_pool(url, config.pool_size).map_err(ServerError::Pool)?;
    info!(pool_size = config.pool_size, "connected to postgres");
    let users: Arc<dyn UserRepository> = Arc::new(PostgresUserRepository::new(pool.clone()));
    Ok(Repositories {
        tasks: Arc::new(PostgresTaskRepository::new(pool.clone())),
        history: Arc::new(PostgresHistoryRepository::new(pool)),
        users,
    })
}

fn notification_service(
    config: &PushConfig,
    users: Arc<dyn UserRepository>,
) -> Result<SharedNotificationService, ServerError> {
    let service = SharedNotificationService::new(users);
    let Some(push) = config.resolve() else {
        warn!("push notifications disabled; set [push] vapid_public_key and relay_url");
        return Ok(service);
    };
    let relay = HttpPushRelay::new(push.relay_url, push.timeout).map_err(ServerError::Relay)?;
    let sender: Arc<dyn NotificationSender> = Arc::new(relay);
    info!("push notifications enabled");
    Ok(service.with_push(push.vapid_key, sender))
}

async fn forward_ctrl_c(stop: &watch::Sender<bool>) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            info!("shutdown requested");
            if stop.send(true).is_err() {
                debug!("nothing left to stop");
            }
        }
        Err(err) => {
            error!(error = %err, "failed to listen for ctrl-c; running until killed");
            std::future::pending::<()>().await;
        }
    }
}

fn stopped(mut stop: watch::Receiver<bool>) -> impl Future<Output = ()> + Send + 'static {
    async move {
        if stop.wait_for(|stopped| *stopped).await.is_err() {
            debug!("shutdown channel closed");
        }
    }
}
