//! The `scanh status` command: one best-effort enrichment status check.

use anyhow::Result;

use crate::client::{LookupClient, ProductSource};
use crate::config::Config;
use crate::models::Barcode;
use crate::risk::RiskSummary;

pub async fn run_status(config: &Config, code: &str) -> Result<()> {
    let barcode: Barcode = code.parse()?;
    let client = LookupClient::new(config);

    let status = client.check_enrichment(&barcode).await;

    println!("status {}", barcode);
    println!("  ready: {}", status.ready);
    if let Some(data) = &status.ingredients {
        let summary = RiskSummary::of(data);
        println!("  ingredients: {} listed", summary.total);
        println!(
            "  risk: {} safe, {} medium, {} high, {} unknown",
            summary.safe, summary.medium, summary.high, summary.unknown
        );
    }
    if let Some(img_url) = &status.img_url {
        println!("  image: {}", img_url);
    }
    println!("ok");

    Ok(())
}
