//! The `scanh favorites` commands: list, add, remove.
//!
//! Adding takes its product snapshot from history — a code has to be
//! scanned before it can be favorited.

use anyhow::{bail, Result};

use crate::config::Config;
use crate::models::Barcode;
use crate::store::HistoryStore;

pub async fn run_favorites_list(config: &Config) -> Result<()> {
    let store = HistoryStore::open(config).await?;
    let entries = store.favorites().await;

    if entries.is_empty() {
        println!("no favorites yet");
        store.close().await;
        return Ok(());
    }

    println!("{:<15} {:<28} BRAND", "BARCODE", "PRODUCT");
    for entry in &entries {
        println!(
            "{:<15} {:<28} {}",
            entry.barcode,
            entry.product.display_name(),
            entry.product.brand
        );
    }
    println!("{} favorites", entries.len());

    store.close().await;
    Ok(())
}

pub async fn run_favorites_add(config: &Config, code: &str) -> Result<()> {
    let barcode: Barcode = code.parse()?;
    let store = HistoryStore::open(config).await?;

    let snapshot = store
        .list()
        .await
        .into_iter()
        .find(|entry| entry.barcode == barcode);

    let Some(entry) = snapshot else {
        store.close().await;
        bail!("{} is not in history; look it up first", barcode);
    };

    store.add_favorite(&barcode, &entry.product).await?;
    store.close().await;
    println!("favorited {}", barcode);
    Ok(())
}

pub async fn run_favorites_remove(config: &Config, code: &str) -> Result<()> {
    let barcode: Barcode = code.parse()?;
    let store = HistoryStore::open(config).await?;
    store.remove_favorite(&barcode).await?;
    store.close().await;
    println!("unfavorited {}", barcode);
    Ok(())
}
