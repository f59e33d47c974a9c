//! Database schema management for `weather-monitor`.
//!
//! Ensures required tables and indexes exist before polling starts.
//! Applied once on startup from `main.rs` (EMBP: single gateway call).

use anyhow::Result;
use sqlx::SqlitePool;

// ---

/// Create or update the database schema (idempotent).
///
/// Creates the append-only `weather` table holding one row per reading.
/// Safe to call on every startup; no-op if objects already exist.
///
/// Errors are propagated if any SQL execution fails.
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    // ---
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS weather (
            id           INTEGER PRIMARY KEY AUTOINCREMENT,
            condition    TEXT    NOT NULL,
            temperature  REAL    NOT NULL,
            feels_like   REAL    NOT NULL,
            observed_at  INTEGER NOT NULL
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    // Date queries are range scans over observed_at
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_weather_observed_at
            ON weather (observed_at);
        "#,
    )
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}
