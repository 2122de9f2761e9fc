//! # Scan Harness CLI (`scanh`)
//!
//! The `scanh` binary drives barcode lookups from the terminal: database
//! initialization, full lookup sessions, one-shot enrichment checks, and
//! the local history and favorites collections.
//!
//! ## Usage
//!
//! ```bash
//! scanh --config ./config/scanh.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `scanh init` | Create the SQLite database and run schema migrations |
//! | `scanh lookup <code>` | Full lookup session: search, save, wait for ingredients |
//! | `scanh status <code>` | One best-effort enrichment status check |
//! | `scanh history list` | Past scans, most recent first |
//! | `scanh history remove <code>` | Drop one entry from history |
//! | `scanh history clear` | Drop the whole history |
//! | `scanh favorites list` | Saved favorites |
//! | `scanh favorites add <code>` | Favorite a previously scanned code |
//! | `scanh favorites remove <code>` | Unfavorite a code |

mod client;
#[allow(dead_code)]
mod config;
mod db;
mod favorites_cmd;
mod history_cmd;
mod lookup_cmd;
mod migrate;
mod models;
#[allow(dead_code)]
mod poll;
mod risk;
#[allow(dead_code)]
mod session;
mod status_cmd;
#[allow(dead_code)]
mod store;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Scan Harness CLI — barcode lookup and ingredient-safety checks
/// against a remote enrichment backend, with a local scan history.
#[derive(Parser)]
#[command(
    name = "scanh",
    about = "Scan Harness — barcode-driven cosmetics lookup and ingredient-safety toolkit",
    version,
    long_about = "Scan Harness looks up EAN-13 barcodes against a remote enrichment backend, \
    classifies ingredient risk, and keeps a local scan history and favorites list. \
    Products whose ingredient data is still being produced are polled until ready."
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/scanh.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Initialize the local database.
    ///
    /// Creates the SQLite file and the key-value table that holds the
    /// history and favorites blobs. Idempotent.
    Init,

    /// Look up a barcode.
    ///
    /// Validates the code (13 digits), searches the backend, saves the
    /// result to history, and — when the ingredient payload is not ready
    /// yet — waits for enrichment before printing the risk summary.
    Lookup {
        /// EAN-13 barcode (13 digits).
        code: String,

        /// Print the thin result immediately instead of waiting for
        /// ingredient data.
        #[arg(long)]
        no_wait: bool,

        /// Cap the enrichment wait, in seconds (default: config
        /// `polling.max_wait_ms`).
        #[arg(long)]
        wait_secs: Option<u64>,
    },

    /// Check enrichment status once, without a lookup session.
    Status {
        /// EAN-13 barcode (13 digits).
        code: String,
    },

    /// Inspect or edit the scan history.
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },

    /// Inspect or edit the favorites list.
    Favorites {
        #[command(subcommand)]
        action: FavoritesAction,
    },
}

/// History subcommands.
#[derive(Subcommand)]
enum HistoryAction {
    /// List past scans, most recent first.
    List {
        /// Maximum number of entries to print.
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Remove one entry by barcode.
    Remove {
        /// EAN-13 barcode (13 digits).
        code: String,
    },
    /// Remove all entries.
    Clear,
}

/// Favorites subcommands.
#[derive(Subcommand)]
enum FavoritesAction {
    /// List favorites.
    List,
    /// Favorite a code that is already in history.
    Add {
        /// EAN-13 barcode (13 digits).
        code: String,
    },
    /// Remove a favorite by barcode.
    Remove {
        /// EAN-13 barcode (13 digits).
        code: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Lookup {
            code,
            no_wait,
            wait_secs,
        } => {
            lookup_cmd::run_lookup(&cfg, &code, no_wait, wait_secs).await?;
        }
        Commands::Status { code } => {
            status_cmd::run_status(&cfg, &code).await?;
        }
        Commands::History { action } => match action {
            HistoryAction::List { limit } => {
                history_cmd::run_history_list(&cfg, limit).await?;
            }
            HistoryAction::Remove { code } => {
                history_cmd::run_history_remove(&cfg, &code).await?;
            }
            HistoryAction::Clear => {
                history_cmd::run_history_clear(&cfg).await?;
            }
        },
        Commands::Favorites { action } => match action {
            FavoritesAction::List => {
                favorites_cmd::run_favorites_list(&cfg).await?;
            }
            FavoritesAction::Add { code } => {
                favorites_cmd::run_favorites_add(&cfg, &code).await?;
            }
            FavoritesAction::Remove { code } => {
                favorites_cmd::run_favorites_remove(&cfg, &code).await?;
            }
        },
    }

    Ok(())
}
