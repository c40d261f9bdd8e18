//! An in-memory SQLite database holding the fixture dataset.

use sqlx::any::AnyPoolOptions;

const SCHEMA: &str = include_str!("../fixtures/schema.sql");

/// The connection URI of a private in-memory database.
pub const CONNECTION_URI: &str = "sqlite::memory:";

/// Create a pool over a fresh in-memory database and load the fixture dataset.
///
/// Every connection to `sqlite::memory:` opens its own database, so the pool keeps
/// exactly one connection alive for as long as it exists.
pub async fn seeded_pool() -> Result<sqlx::AnyPool, sqlx::Error> {
    sqlx::any::install_default_drivers();

    let pool = AnyPoolOptions::new()
        .min_connections(1)
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect(CONNECTION_URI)
        .await?;

    for statement in SCHEMA.split(';').map(str::trim).filter(|s| !s.is_empty()) {
        sqlx::query(statement).execute(&pool).await?;
    }

    tracing::debug!("seeded the fixture database");
    Ok(pool)
}
