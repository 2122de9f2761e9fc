//! Lookup session orchestration.
//!
//! A [`LookupOrchestrator`] drives one code-lookup session at a time:
//! search, history commit, and the conditional enrichment poll. Consumers
//! observe the session through a `tokio::sync::watch` channel — the
//! orchestrator publishes every state transition and the presentation
//! layer renders whatever state it sees.
//!
//! ```text
//! Idle ─ lookup ─▶ Loading ─┬─▶ NotFound                      (settled)
//!                           ├─▶ Found / Ready                 (settled)
//!                           └─▶ Found / Pending ─ poll ─▶ Found / Ready
//! ```
//!
//! A poll that times out leaves the session in `Found / Pending`; by
//! contract the timeout is silent and no further updates arrive. Starting
//! a new lookup, resuming, or dropping the orchestrator cancels any
//! active poll first — at most one poll is ever live per orchestrator.

use std::sync::Arc;

use tokio::sync::watch;

use crate::client::{ProductSource, SearchOutcome};
use crate::models::{Barcode, BrandHint, Product};
use crate::poll::{poll_enrichment, EnrichmentUpdate, PollHandle, PollOptions};
use crate::store::HistoryStore;

/// Whether a found product's ingredient payload has arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enrichment {
    Ready,
    Pending,
}

/// Observable state of a lookup session.
#[derive(Debug, Clone)]
pub enum SessionState {
    Idle,
    Loading,
    NotFound {
        reason: String,
        brand_hint: Option<BrandHint>,
    },
    Found {
        product: Product,
        enrichment: Enrichment,
    },
}

impl SessionState {
    pub fn is_settled(&self) -> bool {
        !matches!(
            self,
            SessionState::Loading
                | SessionState::Found {
                    enrichment: Enrichment::Pending,
                    ..
                }
        )
    }
}

/// Merge an enrichment update into a product.
///
/// Ingredients are replaced outright — the update payload always carries
/// them, so an enriched product can never go back to the thin state. The
/// image URL is only replaced when the update supplies one.
pub fn apply_enrichment(product: &mut Product, update: &EnrichmentUpdate) {
    product.ingredients = Some(update.ingredients.clone());
    if update.img_url.is_some() {
        product.img_url = update.img_url.clone();
    }
}

/// Drives lookup sessions against an injected [`ProductSource`] and an
/// optional [`HistoryStore`].
///
/// `store: None` means "operate without persistence" — lookups still work,
/// nothing is recorded. A history write failure is logged to stderr and
/// never surfaced: the lookup itself already succeeded.
pub struct LookupOrchestrator {
    source: Arc<dyn ProductSource>,
    store: Option<Arc<HistoryStore>>,
    options: PollOptions,
    state: watch::Sender<SessionState>,
    active_poll: Option<PollHandle>,
}

impl LookupOrchestrator {
    pub fn new(
        source: Arc<dyn ProductSource>,
        store: Option<Arc<HistoryStore>>,
        options: PollOptions,
    ) -> Self {
        let (state, _) = watch::channel(SessionState::Idle);
        Self {
            source,
            store,
            options,
            state,
            active_poll: None,
        }
    }

    /// Subscribe to state transitions. The receiver sees the current
    /// state immediately and every change after it.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Run a full lookup session for `barcode`.
    ///
    /// Any still-active poll from a previous session is cancelled before
    /// the search goes out. Returns the state the session settles into
    /// (for a thin product that is `Found / Pending`, with the poll
    /// continuing in the background).
    pub async fn lookup(&mut self, barcode: Barcode) -> SessionState {
        self.cancel_active_poll();
        self.publish(SessionState::Loading);

        match self.source.search_by_code(&barcode).await {
            SearchOutcome::Found(product) => {
                self.commit_history(&barcode, &product).await;

                if product.ingredients.is_some() {
                    self.publish(SessionState::Found {
                        product,
                        enrichment: Enrichment::Ready,
                    });
                } else {
                    self.publish(SessionState::Found {
                        product,
                        enrichment: Enrichment::Pending,
                    });
                    self.start_poll(barcode);
                }
            }
            SearchOutcome::NotFound { reason, brand_hint } => {
                self.publish(SessionState::NotFound { reason, brand_hint });
            }
            SearchOutcome::TransportFailed { message } => {
                self.publish(SessionState::NotFound {
                    reason: message,
                    brand_hint: None,
                });
            }
        }

        self.state()
    }

    /// Seed a session from an already-known product (a history entry),
    /// skipping the search. A thin product goes straight to
    /// `Found / Pending` with a poll running; an enriched one settles
    /// immediately. No history write happens here — the snapshot came
    /// from history in the first place.
    pub fn resume(&mut self, barcode: Barcode, product: Product) -> SessionState {
        self.cancel_active_poll();

        if product.ingredients.is_some() {
            self.publish(SessionState::Found {
                product,
                enrichment: Enrichment::Ready,
            });
        } else {
            self.publish(SessionState::Found {
                product,
                enrichment: Enrichment::Pending,
            });
            self.start_poll(barcode);
        }

        self.state()
    }

    /// Tear the session down: cancel any in-flight poll and return to
    /// `Idle`. The consuming view has gone away.
    pub fn shutdown(&mut self) {
        self.cancel_active_poll();
        self.publish(SessionState::Idle);
    }

    fn start_poll(&mut self, barcode: Barcode) {
        let state = self.state.clone();
        let handle = poll_enrichment(
            self.source.clone(),
            barcode,
            self.options,
            move |update| {
                state.send_modify(|current| {
                    if let SessionState::Found {
                        product,
                        enrichment,
                    } = current
                    {
                        apply_enrichment(product, &update);
                        *enrichment = Enrichment::Ready;
                    }
                });
            },
        );
        self.active_poll = Some(handle);
    }

    fn cancel_active_poll(&mut self) {
        if let Some(handle) = self.active_poll.take() {
            handle.cancel();
        }
    }

    async fn commit_history(&self, barcode: &Barcode, product: &Product) {
        if let Some(store) = &self.store {
            if let Err(e) = store.append(barcode, product).await {
                eprintln!("Warning: could not save scan to history: {}", e);
            }
        }
    }

    fn publish(&self, next: SessionState) {
        self.state.send_replace(next);
    }
}

impl Drop for LookupOrchestrator {
    fn drop(&mut self) {
        self.cancel_active_poll();
    }
}
