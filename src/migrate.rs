use anyhow::Result;
use sqlx::SqlitePool;

use crate::config::Config;
use crate::db;

/// Create the schema. Idempotent — safe to run on every `scanh init`.
///
/// All local state lives in a single key-value table: one JSON blob per
/// collection (`scan_history`, `favorites`). The blobs are small (history
/// is capped) and always rewritten whole, so there is nothing to index.
pub async fn run_migrations(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    ensure_schema(&pool).await?;
    pool.close().await;
    Ok(())
}

pub async fn ensure_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS kv (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
