//! Enrichment polling with explicit cancellation.
//!
//! [`poll_enrichment`] runs an immediate status check, then one check per
//! interval until the payload is ready, the wait ceiling passes, or the
//! caller cancels. A poll delivers **at most one** update, and delivery is
//! serialized with [`CancelToken::cancel`]: once `cancel()` returns, no
//! update will fire — even if a status check was in flight at that moment.
//!
//! Timeout is silent by contract: the loop just stops issuing checks and
//! the consumer sees no further updates.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::client::ProductSource;
use crate::config::PollingConfig;
use crate::models::{Barcode, IngredientsData};

/// Pacing of the polling loop.
#[derive(Debug, Clone, Copy)]
pub struct PollOptions {
    pub interval: Duration,
    pub max_wait: Duration,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(2000),
            max_wait: Duration::from_millis(60_000),
        }
    }
}

impl From<&PollingConfig> for PollOptions {
    fn from(config: &PollingConfig) -> Self {
        Self {
            interval: Duration::from_millis(config.interval_ms),
            max_wait: Duration::from_millis(config.max_wait_ms),
        }
    }
}

/// The single update a successful poll delivers.
#[derive(Debug, Clone)]
pub struct EnrichmentUpdate {
    pub ingredients: IngredientsData,
    pub img_url: Option<String>,
}

/// Cancellation token shared between the polling task and its owner.
///
/// The flag lives behind a mutex, and update delivery happens while the
/// guard is held: a racing `cancel()` either lands first (the update is
/// dropped) or blocks until the callback has returned. Both orders keep
/// the guarantee that no update fires after `cancel()` returns.
#[derive(Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<Mutex<bool>>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        *self.guard() = true;
    }

    pub fn is_cancelled(&self) -> bool {
        *self.guard()
    }

    /// Run `deliver` unless the token is already cancelled. The flag check
    /// and the callback are one critical section.
    fn deliver_unless_cancelled(&self, deliver: impl FnOnce()) -> bool {
        let guard = self.guard();
        if *guard {
            return false;
        }
        deliver();
        true
    }

    fn guard(&self) -> MutexGuard<'_, bool> {
        match self.cancelled.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// Handle to a running poll.
pub struct PollHandle {
    token: CancelToken,
    task: JoinHandle<()>,
}

impl PollHandle {
    /// Stop the poll. After this returns, the update callback will not be
    /// invoked again.
    pub fn cancel(&self) {
        self.token.cancel();
        self.task.abort();
    }

    pub fn token(&self) -> CancelToken {
        self.token.clone()
    }

    /// Wait for the polling task to exit (test support).
    pub async fn finished(self) {
        let _ = self.task.await;
    }
}

/// Start polling the enrichment status of `code`.
///
/// Checks immediately, then every `options.interval`. A check that comes
/// back `ready` with ingredients present fires `on_update` once and stops.
/// Once `options.max_wait` has elapsed the loop stops without issuing
/// another check and without surfacing an error.
pub fn poll_enrichment<F>(
    source: Arc<dyn ProductSource>,
    code: Barcode,
    options: PollOptions,
    on_update: F,
) -> PollHandle
where
    F: FnMut(EnrichmentUpdate) + Send + 'static,
{
    let token = CancelToken::new();
    let loop_token = token.clone();

    let task = tokio::spawn(async move {
        let mut on_update = on_update;
        let started = Instant::now();

        loop {
            if loop_token.is_cancelled() {
                return;
            }

            let status = source.check_enrichment(&code).await;

            if status.ready {
                if let Some(ingredients) = status.ingredients {
                    loop_token.deliver_unless_cancelled(|| {
                        on_update(EnrichmentUpdate {
                            ingredients,
                            img_url: status.img_url,
                        });
                    });
                    return;
                }
            }

            if started.elapsed() >= options.max_wait {
                return;
            }

            tokio::time::sleep(options.interval).await;
        }
    });

    PollHandle { token, task }
}
