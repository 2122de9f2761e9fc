//! The `scanh history` commands: list, remove, clear.

use anyhow::Result;

use crate::config::Config;
use crate::models::Barcode;
use crate::store::HistoryStore;

pub async fn run_history_list(config: &Config, limit: Option<usize>) -> Result<()> {
    let store = HistoryStore::open(config).await?;
    let mut entries = store.list().await;
    if let Some(limit) = limit {
        entries.truncate(limit);
    }

    if entries.is_empty() {
        println!("history is empty");
        store.close().await;
        return Ok(());
    }

    println!("{:<15} {:<28} {:<20} SCANNED", "BARCODE", "PRODUCT", "BRAND");
    for entry in &entries {
        println!(
            "{:<15} {:<28} {:<20} {}",
            entry.barcode,
            truncate(entry.product.display_name(), 28),
            truncate(&entry.product.brand, 20),
            entry.scanned_at.format("%Y-%m-%d %H:%M")
        );
    }
    println!("{} entries", entries.len());

    store.close().await;
    Ok(())
}

pub async fn run_history_remove(config: &Config, code: &str) -> Result<()> {
    let barcode: Barcode = code.parse()?;
    let store = HistoryStore::open(config).await?;
    store.remove(&barcode).await?;
    store.close().await;
    println!("removed {}", barcode);
    Ok(())
}

pub async fn run_history_clear(config: &Config) -> Result<()> {
    let store = HistoryStore::open(config).await?;
    store.clear().await?;
    store.close().await;
    println!("history cleared");
    Ok(())
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let cut: String = s.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{}…", cut)
}
