//! # Scan Harness
//!
//! A barcode-driven cosmetics lookup and ingredient-safety toolkit.
//!
//! Scan Harness takes an EAN-13 barcode, looks the product up against a
//! remote enrichment backend, records the result in a local scan history,
//! and — when the ingredient payload is not ready yet — polls the backend
//! until it arrives or a wait ceiling passes.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐    ┌───────────────┐    ┌──────────────┐
//! │  barcode  │──▶│ Orchestrator  │──▶│ LookupClient │──▶ backend
//! │ (EAN-13)  │    │ state machine │    │ search+poll  │
//! └──────────┘    └──────┬────────┘    └──────────────┘
//!                        │ watch channel        │
//!                        ▼                      ▼
//!                 ┌──────────────┐      ┌──────────────┐
//!                 │     CLI      │      │ HistoryStore │
//!                 │   (scanh)    │      │ SQLite blobs │
//!                 └──────────────┘      └──────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! scanh init                        # create the local database
//! scanh lookup 8809432018285        # search, save, wait for ingredients
//! scanh status 8809432018285        # one enrichment status check
//! scanh history list                # past scans, most recent first
//! scanh favorites add 8809432018285
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Barcode, product, and history types |
//! | [`client`] | HTTP lookup client and the [`client::ProductSource`] seam |
//! | [`poll`] | Enrichment polling with explicit cancellation |
//! | [`session`] | Per-lookup state machine |
//! | [`risk`] | Derived ingredient risk classification |
//! | [`store`] | Local history and favorites persistence |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema migrations |

pub mod client;
pub mod config;
pub mod db;
pub mod favorites_cmd;
pub mod history_cmd;
pub mod lookup_cmd;
pub mod migrate;
pub mod models;
pub mod poll;
pub mod risk;
pub mod session;
pub mod status_cmd;
pub mod store;
