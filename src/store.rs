//! Local persistence for scan history and favorites.
//!
//! Each collection is one JSON blob in the `kv` table, rewritten whole on
//! every mutation. History is recency-ordered and capped; favorites are
//! append-once and unordered by use.
//!
//! Reads are total: a missing blob, an unreadable blob, or a database
//! error all come back as an empty collection (with a stderr warning for
//! the genuinely broken cases). Mutations return `Result` — the caller
//! awaits them and decides whether a failure matters.

use anyhow::Result;
use chrono::Utc;
use sqlx::SqlitePool;

use crate::config::Config;
use crate::db;
use crate::migrate;
use crate::models::{Barcode, HistoryEntry, Product};

const HISTORY_KEY: &str = "scan_history";
const FAVORITES_KEY: &str = "favorites";

/// Store for past lookups, persisted in the local SQLite database.
pub struct HistoryStore {
    pool: SqlitePool,
    max_entries: usize,
}

impl HistoryStore {
    pub fn new(pool: SqlitePool, max_entries: usize) -> Self {
        Self { pool, max_entries }
    }

    /// Open the configured database and make sure the schema exists.
    pub async fn open(config: &Config) -> Result<Self> {
        let pool = db::connect(config).await?;
        migrate::ensure_schema(&pool).await?;
        Ok(Self::new(pool, config.history.max_entries))
    }

    pub async fn close(self) {
        self.pool.close().await;
    }

    // ============ History ============

    /// Past lookups, most recent first. Never fails: corrupt or missing
    /// data reads as empty.
    pub async fn list(&self) -> Vec<HistoryEntry> {
        self.read_entries(HISTORY_KEY).await
    }

    /// Record a successful lookup. Any prior entry for the same code is
    /// dropped, the new entry goes to the front, and the collection is
    /// truncated to the configured cap before persisting.
    pub async fn append(&self, barcode: &Barcode, product: &Product) -> Result<()> {
        let mut entries = self.read_entries(HISTORY_KEY).await;
        entries.retain(|entry| entry.barcode != *barcode);
        entries.insert(
            0,
            HistoryEntry {
                barcode: barcode.clone(),
                product: product.clone(),
                scanned_at: Utc::now(),
            },
        );
        entries.truncate(self.max_entries);
        self.write_entries(HISTORY_KEY, &entries).await
    }

    pub async fn remove(&self, barcode: &Barcode) -> Result<()> {
        let mut entries = self.read_entries(HISTORY_KEY).await;
        entries.retain(|entry| entry.barcode != *barcode);
        self.write_entries(HISTORY_KEY, &entries).await
    }

    pub async fn clear(&self) -> Result<()> {
        sqlx::query("DELETE FROM kv WHERE key = ?")
            .bind(HISTORY_KEY)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    // ============ Favorites ============

    pub async fn favorites(&self) -> Vec<HistoryEntry> {
        self.read_entries(FAVORITES_KEY).await
    }

    /// Add a favorite. A no-op when the code is already present — unlike
    /// history, re-adding does not reorder.
    pub async fn add_favorite(&self, barcode: &Barcode, product: &Product) -> Result<()> {
        let mut entries = self.read_entries(FAVORITES_KEY).await;
        if entries.iter().any(|entry| entry.barcode == *barcode) {
            return Ok(());
        }
        entries.insert(
            0,
            HistoryEntry {
                barcode: barcode.clone(),
                product: product.clone(),
                scanned_at: Utc::now(),
            },
        );
        self.write_entries(FAVORITES_KEY, &entries).await
    }

    pub async fn remove_favorite(&self, barcode: &Barcode) -> Result<()> {
        let mut entries = self.read_entries(FAVORITES_KEY).await;
        entries.retain(|entry| entry.barcode != *barcode);
        self.write_entries(FAVORITES_KEY, &entries).await
    }

    pub async fn is_favorite(&self, barcode: &Barcode) -> bool {
        self.favorites()
            .await
            .iter()
            .any(|entry| entry.barcode == *barcode)
    }

    // ============ Blob plumbing ============

    async fn read_entries(&self, key: &str) -> Vec<HistoryEntry> {
        let blob: Option<String> =
            match sqlx::query_scalar("SELECT value FROM kv WHERE key = ?")
                .bind(key)
                .fetch_optional(&self.pool)
                .await
            {
                Ok(blob) => blob,
                Err(e) => {
                    eprintln!("Warning: could not read '{}': {}", key, e);
                    return Vec::new();
                }
            };

        let Some(blob) = blob else {
            return Vec::new();
        };

        match serde_json::from_str(&blob) {
            Ok(entries) => entries,
            Err(e) => {
                // Corrupt blob reads as empty; the next write replaces it.
                eprintln!("Warning: unreadable '{}' blob, treating as empty: {}", key, e);
                Vec::new()
            }
        }
    }

    async fn write_entries(&self, key: &str, entries: &[HistoryEntry]) -> Result<()> {
        let blob = serde_json::to_string(entries)?;
        let now = Utc::now().timestamp();
        sqlx::query(
            r#"
            INSERT INTO kv (key, value, updated_at) VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(blob)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
