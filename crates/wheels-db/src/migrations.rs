//! # Schema Migrations
//!
//! The schema ships inside the binary. `Database::new` applies whatever the
//! `_sqlx_migrations` ledger has not seen yet, so a fresh file and an
//! in-memory test database end up with the same tables.
//!
//! ```text
//! migrations/sqlite/
//! └── 001_initial_schema.sql
//!       users ─┬─< cart_entries >─┬─ cars
//!              ├─< rentals      >─┤
//!              └─< feedback     >─┘
//! ```
//!
//! Applied files are checksummed. Schema changes go in a new `NNN_*.sql`
//! file; editing an applied one makes startup fail.

use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::DbResult;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Applies pending migrations. Safe to call on every start.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    debug!(embedded = MIGRATOR.migrations.len(), "Applying schema migrations");
    MIGRATOR.run(pool).await?;
    info!("Schema up to date");
    Ok(())
}

/// Embedded and applied migration counts.
pub async fn migration_status(pool: &SqlitePool) -> DbResult<(usize, usize)> {
    let applied: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = 1")
            .fetch_one(pool)
            .await?;

    Ok((MIGRATOR.migrations.len(), usize::try_from(applied).unwrap_or(0)))
}
