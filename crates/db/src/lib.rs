//! PostgreSQL persistence for the catalog back-office.
//!
//! Row models and DTOs live in [`models`]; [`repositories`] holds the
//! zero-sized repository structs that read and write them.

use serde::Serialize;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;

pub mod error;
pub mod models;
pub mod repositories;

pub use error::ReconcileError;

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

static MIGRATOR: Migrator = sqlx::migrate!("../../db/migrations");

/// Apply any pending migrations from `db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    tracing::debug!(count = MIGRATOR.iter().count(), "Applying migrations");
    MIGRATOR.run(pool).await
}

/// How far the connected database's schema is behind this build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaStatus {
    /// Successfully applied migrations recorded in the database.
    pub applied: usize,
    /// Highest applied version, `None` on an empty database.
    pub latest_version: Option<i64>,
    /// Migrations shipped with this build that have not run yet.
    pub pending: Vec<i64>,
}

impl SchemaStatus {
    pub fn is_current(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Compare the migrations embedded in this build with those recorded in
/// `_sqlx_migrations`.
pub async fn schema_status(pool: &DbPool) -> Result<SchemaStatus, sqlx::Error> {
    let exists: bool = sqlx::query_scalar("SELECT to_regclass('_sqlx_migrations') IS NOT NULL")
        .fetch_one(pool)
        .await?;
    let applied: Vec<i64> = if exists {
        sqlx::query_scalar("SELECT version FROM _sqlx_migrations WHERE success ORDER BY version")
            .fetch_all(pool)
            .await?
    } else {
        Vec::new()
    };

    let pending = MIGRATOR
        .iter()
        .map(|m| m.version)
        .filter(|v| applied.binary_search(v).is_err())
        .collect();

    Ok(SchemaStatus {
        applied: applied.len(),
        latest_version: applied.last().copied(),
        pending,
    })
}
