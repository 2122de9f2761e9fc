use std::path::PathBuf;

use tempfile::TempDir;

use scan_harness::config::{ApiConfig, Config, DbConfig, HistoryConfig, PollingConfig};
use scan_harness::models::{Barcode, Product};
use scan_harness::store::HistoryStore;

fn test_config(root: &TempDir, max_entries: usize) -> Config {
    Config {
        api: ApiConfig {
            base_url: "http://127.0.0.1:9".to_string(),
        },
        db: DbConfig {
            path: root.path().join("data").join("scanh.sqlite"),
        },
        polling: PollingConfig::default(),
        history: HistoryConfig { max_entries },
    }
}

fn code(n: u64) -> Barcode {
    format!("{:013}", n).parse().unwrap()
}

fn product(name: &str) -> Product {
    serde_json::from_value(serde_json::json!({
        "name_en": name,
        "brand": "Test Brand",
        "source": "test",
        "ingredients": null
    }))
    .unwrap()
}

#[tokio::test]
async fn list_is_empty_on_fresh_database() {
    let tmp = TempDir::new().unwrap();
    let store = HistoryStore::open(&test_config(&tmp, 100)).await.unwrap();
    assert!(store.list().await.is_empty());
}

#[tokio::test]
async fn append_puts_new_code_at_front() {
    let tmp = TempDir::new().unwrap();
    let store = HistoryStore::open(&test_config(&tmp, 100)).await.unwrap();

    store.append(&code(1), &product("First")).await.unwrap();
    store.append(&code(2), &product("Second")).await.unwrap();

    let entries = store.list().await;
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].barcode, code(2));
    assert_eq!(entries[1].barcode, code(1));
}

#[tokio::test]
async fn reappend_moves_existing_code_to_front_without_duplicating() {
    let tmp = TempDir::new().unwrap();
    let store = HistoryStore::open(&test_config(&tmp, 100)).await.unwrap();

    store.append(&code(1), &product("First")).await.unwrap();
    store.append(&code(2), &product("Second")).await.unwrap();
    store.append(&code(1), &product("First again")).await.unwrap();

    let entries = store.list().await;
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].barcode, code(1));
    assert_eq!(entries[0].product.name_en, "First again");
    assert_eq!(entries[1].barcode, code(2));
}

#[tokio::test]
async fn history_is_capped_at_the_most_recent_entries() {
    let tmp = TempDir::new().unwrap();
    let store = HistoryStore::open(&test_config(&tmp, 100)).await.unwrap();

    for n in 0..105 {
        store.append(&code(n), &product("P")).await.unwrap();
    }

    let entries = store.list().await;
    assert_eq!(entries.len(), 100);
    // Most recent first, oldest five gone.
    assert_eq!(entries[0].barcode, code(104));
    assert_eq!(entries[99].barcode, code(5));
    assert!(!entries.iter().any(|e| e.barcode == code(4)));
}

#[tokio::test]
async fn remove_and_clear_persist() {
    let tmp = TempDir::new().unwrap();
    let config = test_config(&tmp, 100);
    let store = HistoryStore::open(&config).await.unwrap();

    store.append(&code(1), &product("First")).await.unwrap();
    store.append(&code(2), &product("Second")).await.unwrap();

    store.remove(&code(1)).await.unwrap();
    assert_eq!(store.list().await.len(), 1);
    store.close().await;

    // Reopen: the removal survived.
    let store = HistoryStore::open(&config).await.unwrap();
    assert_eq!(store.list().await.len(), 1);

    store.clear().await.unwrap();
    assert!(store.list().await.is_empty());
}

#[tokio::test]
async fn corrupt_blob_reads_as_empty_and_recovers_on_next_write() {
    let tmp = TempDir::new().unwrap();
    let config = test_config(&tmp, 100);

    {
        let store = HistoryStore::open(&config).await.unwrap();
        store.append(&code(1), &product("First")).await.unwrap();
        store.close().await;
    }

    // Scribble over the blob behind the store's back.
    let pool = scan_harness::db::connect(&config).await.unwrap();
    sqlx::query("UPDATE kv SET value = 'not json at all' WHERE key = 'scan_history'")
        .execute(&pool)
        .await
        .unwrap();
    pool.close().await;

    let store = HistoryStore::open(&config).await.unwrap();
    assert!(store.list().await.is_empty());

    store.append(&code(2), &product("Second")).await.unwrap();
    let entries = store.list().await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].barcode, code(2));
}

#[tokio::test]
async fn favorites_do_not_reorder_on_readd() {
    let tmp = TempDir::new().unwrap();
    let store = HistoryStore::open(&test_config(&tmp, 100)).await.unwrap();

    store.add_favorite(&code(1), &product("First")).await.unwrap();
    store.add_favorite(&code(2), &product("Second")).await.unwrap();
    assert!(store.is_favorite(&code(1)).await);

    // Re-adding an existing favorite is a no-op.
    store.add_favorite(&code(1), &product("First updated")).await.unwrap();

    let favorites = store.favorites().await;
    assert_eq!(favorites.len(), 2);
    assert_eq!(favorites[0].barcode, code(2));
    assert_eq!(favorites[1].barcode, code(1));
    assert_eq!(favorites[1].product.name_en, "First");

    store.remove_favorite(&code(1)).await.unwrap();
    assert!(!store.is_favorite(&code(1)).await);
    assert_eq!(store.favorites().await.len(), 1);
}

#[tokio::test]
async fn history_and_favorites_are_independent_collections() {
    let tmp = TempDir::new().unwrap();
    let store = HistoryStore::open(&test_config(&tmp, 100)).await.unwrap();

    store.append(&code(1), &product("Scanned")).await.unwrap();
    store.add_favorite(&code(2), &product("Favorited")).await.unwrap();

    store.clear().await.unwrap();
    assert!(store.list().await.is_empty());
    assert_eq!(store.favorites().await.len(), 1);
}

#[tokio::test]
async fn open_creates_parent_directories() {
    let tmp = TempDir::new().unwrap();
    let mut config = test_config(&tmp, 100);
    config.db.path = PathBuf::from(tmp.path()).join("deep/nested/dir/scanh.sqlite");

    let store = HistoryStore::open(&config).await.unwrap();
    store.append(&code(1), &product("First")).await.unwrap();
    assert_eq!(store.list().await.len(), 1);
}
