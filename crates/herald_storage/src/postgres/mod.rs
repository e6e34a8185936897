//! PostgreSQL stores backed by diesel and an r2d2 pool.
//!
//! Diesel is synchronous, so every call checks a connection out of the pool
//! on a `spawn_blocking` worker.

mod config;
mod models;
pub mod schema;
mod stats;

pub use config::PgConfigStore;
pub use stats::PgStatsStore;

use crate::StoreResult;
use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use herald_error::{StoreError, StoreErrorKind};
use tracing::{info, instrument};

/// Connection pool shared by the PostgreSQL stores.
pub type PgPool = Pool<ConnectionManager<PgConnection>>;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Build a connection pool.
///
/// # Errors
///
/// Returns [`StoreErrorKind::Connection`] if the pool cannot open its first
/// connection.
#[instrument(skip(database_url))]
pub fn connect(database_url: &str, pool_size: u32) -> StoreResult<PgPool> {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    let pool = Pool::builder()
        .max_size(pool_size)
        .build(manager)
        .map_err(|e| {
            StoreError::new(StoreErrorKind::Connection(format!(
                "Failed to create connection pool: {e}"
            )))
        })?;
    info!(pool_size, "PostgreSQL pool ready");
    Ok(pool)
}

/// Apply pending schema migrations.
///
/// # Errors
///
/// Returns an error if a connection cannot be checked out or a migration fails.
#[instrument(skip(pool))]
pub async fn run_migrations(pool: &PgPool) -> StoreResult<()> {
    with_connection(pool, |conn| {
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| StoreError::new(StoreErrorKind::Query(e.to_string())))?;
        info!(count = applied.len(), "Applied migrations");
        Ok(())
    })
    .await
}

/// Run `f` with a pooled connection on the blocking thread pool.
pub(crate) async fn with_connection<T, F>(pool: &PgPool, f: F) -> StoreResult<T>
where
    F: FnOnce(&mut PgConnection) -> StoreResult<T> + Send + 'static,
    T: Send + 'static,
{
    let pool = pool.clone();
    tokio::task::spawn_blocking(move || {
        let mut conn = pool.get().map_err(|e| {
            StoreError::new(StoreErrorKind::Connection(format!(
                "Failed to get connection from pool: {e}"
            )))
        })?;
        f(&mut conn)
    })
    .await
    .map_err(|e| StoreError::new(StoreErrorKind::Task(e.to_string())))?
}
