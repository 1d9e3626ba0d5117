//! Shared `PostgreSQL` plumbing for the Diesel adapters.
//!
//! Provides the connection pool type and helpers for offloading synchronous
//! Diesel operations to a dedicated thread pool, avoiding blocking the async
//! executor.

use diesel::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool, PoolError, PooledConnection};

/// `PostgreSQL` connection pool type shared by all adapters.
pub type PgPool = Pool<ConnectionManager<PgConnection>>;

/// Pooled connection type handed to blocking closures.
pub type PooledConn = PooledConnection<ConnectionManager<PgConnection>>;

/// Builds a connection pool for `database_url`.
///
/// # Errors
///
/// Returns [`PoolError`] when the initial connections cannot be established.
pub fn build_pool(database_url: &str, max_size: u32) -> Result<PgPool, PoolError> {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    Pool::builder().max_size(max_size).build(manager)
}

/// Boxed error handed to adapter error mappers.
pub type BoxedDbError = Box<dyn std::error::Error + Send + Sync>;

/// Runs a blocking closure with a pooled connection on the blocking thread
/// pool, mapping pool and join failures into the caller's error type.
pub(crate) async fn run_blocking_with<F, T, E>(
    pool: &PgPool,
    map_err: fn(BoxedDbError) -> E,
    f: F,
) -> Result<T, E>
where
    F: FnOnce(&mut PgConnection) -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
{
    let pool = pool.clone();
    tokio::task::spawn_blocking(move || {
        let mut connection: PooledConn = pool.get().map_err(|err| map_err(Box::new(err)))?;
        f(&mut connection)
    })
    .await
    .map_err(|err| map_err(Box::new(err)))?
}
