//! Storage bootstrap: connection pools and schema migrations.
//!
//! The service works against two pools, one for reads and one for writes.
//! Both are opened once at startup from the configured connection URLs.

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::{debug, info};

use crate::error::Result;

/// A storage handle.
pub type DbPool = SqlitePool;

/// Opens a pool for `url` (e.g. `sqlite://data/quill.db`), creating the
/// database file if it does not exist.
pub async fn connect(url: &str) -> Result<DbPool> {
    info!(url, "opening database");
    let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
    Ok(SqlitePoolOptions::new().connect_with(options).await?)
}

/// Opens a private in-memory database.
///
/// The pool holds exactly one connection that is never recycled, since every
/// SQLite in-memory connection is its own database. Hand clones of the pool
/// to code that expects separate read and write handles.
pub async fn connect_in_memory() -> Result<DbPool> {
    debug!("opening in-memory database");
    Ok(SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None::<Duration>)
        .max_lifetime(None::<Duration>)
        .connect("sqlite::memory:")
        .await?)
}

/// Applies the embedded schema migrations that have not run yet.
pub async fn migrate(pool: &DbPool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("database migrations applied");
    Ok(())
}
