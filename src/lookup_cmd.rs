//! The `scanh lookup` command: one full orchestrated lookup session.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use crate::client::LookupClient;
use crate::config::Config;
use crate::models::{Barcode, Product};
use crate::poll::PollOptions;
use crate::risk::RiskSummary;
use crate::session::{Enrichment, LookupOrchestrator, SessionState};
use crate::store::HistoryStore;

pub async fn run_lookup(
    config: &Config,
    code: &str,
    no_wait: bool,
    wait_secs: Option<u64>,
) -> Result<()> {
    // Validation happens before anything touches the network.
    let barcode: Barcode = code.parse()?;

    // A broken local database downgrades to a lookup without history,
    // never to a failed lookup.
    let store = match HistoryStore::open(config).await {
        Ok(store) => Some(Arc::new(store)),
        Err(e) => {
            eprintln!("Warning: history unavailable, continuing without it: {}", e);
            None
        }
    };
    let saving = store.is_some();

    let source = Arc::new(LookupClient::new(config));
    let mut options = PollOptions::from(&config.polling);
    if let Some(secs) = wait_secs {
        options.max_wait = Duration::from_secs(secs);
    }

    let mut orchestrator = LookupOrchestrator::new(source, store, options);

    println!("lookup {}", barcode);

    let state = orchestrator.lookup(barcode).await;

    match state {
        SessionState::NotFound { reason, brand_hint } => {
            println!("  found: false");
            println!("  reason: {}", reason);
            if let Some(hint) = brand_hint {
                println!("  brand hint: {}", hint.name_en);
            }
        }
        SessionState::Found {
            product,
            enrichment: Enrichment::Ready,
        } => {
            print_product(&product, saving);
            println!("ok");
        }
        SessionState::Found {
            product,
            enrichment: Enrichment::Pending,
        } => {
            if no_wait {
                print_product(&product, saving);
                println!("  ingredients: pending (not waiting)");
                println!("ok");
                return Ok(());
            }

            println!(
                "  ingredients: pending, waiting up to {}s...",
                options.max_wait.as_secs()
            );

            let settled = wait_for_enrichment(&orchestrator, options.max_wait).await;
            match settled {
                SessionState::Found { product, .. } => {
                    print_product(&product, saving);
                    if product_is_thin(&product) {
                        println!("  ingredients: still pending, giving up the wait");
                    }
                    println!("ok");
                }
                // The session cannot leave Found once there; keep the
                // match total anyway.
                other => {
                    println!("  state: {:?}", other);
                }
            }
        }
        SessionState::Idle | SessionState::Loading => unreachable!("lookup returned an unsettled state"),
    }

    Ok(())
}

/// Block until the session settles or `max_wait` passes, then report the
/// latest state. The poll itself enforces the same ceiling; this bound
/// only keeps the CLI from waiting forever on the silent-timeout path.
async fn wait_for_enrichment(
    orchestrator: &LookupOrchestrator,
    max_wait: Duration,
) -> SessionState {
    let mut rx = orchestrator.subscribe();
    // Slack past the poll ceiling so a final in-flight check can land.
    let deadline = max_wait + Duration::from_secs(2);

    let _ = tokio::time::timeout(deadline, async {
        loop {
            if rx.borrow().is_settled() {
                break;
            }
            if rx.changed().await.is_err() {
                break;
            }
        }
    })
    .await;

    orchestrator.state()
}

fn product_is_thin(product: &Product) -> bool {
    product.ingredients.is_none()
}

fn print_product(product: &Product, saved: bool) {
    println!("  found: true");
    println!("  product: {}", product.display_name());
    println!("  brand: {}", product.brand);
    if let Some(parent) = &product.parent_brand {
        println!("  parent brand: {}", parent.name_en);
    }
    if let Some(country) = &product.country {
        println!("  country: {}", country);
    }
    if let Some(category) = product.categories.first() {
        println!("  category: {}", category.path);
    }
    if let Some(data) = &product.ingredients {
        let summary = RiskSummary::of(data);
        println!("  ingredients: {} listed", summary.total);
        println!(
            "  risk: {} safe, {} medium, {} high, {} unknown",
            summary.safe, summary.medium, summary.high, summary.unknown
        );
        if summary.flagged() > 0 {
            println!("  flagged: {} at medium risk or above", summary.flagged());
        }
    }
    if saved {
        println!("  history: saved");
    }
}
