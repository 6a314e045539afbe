//! PostgreSQL persistence for the cinema service.
//!
//! Repositories are zero-sized structs whose methods take `&PgPool`.
//! Mutations that must respect a domain invariant run in a transaction
//! that locks the row scoping the invariant (the room for screenings, the
//! screening for tickets) before asking `cinema_core` for a decision.

pub mod error;
pub mod models;
pub mod repositories;

pub use error::LedgerError;

use sqlx::postgres::PgPoolOptions;

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}

/// Round-trip a trivial query to confirm the database is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply pending migrations from `db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../db/migrations").run(pool).await
}
