use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use scan_harness::client::{EnrichmentStatus, ProductSource, SearchOutcome};
use scan_harness::models::{Barcode, Ingredient, IngredientsData};
use scan_harness::poll::{poll_enrichment, PollOptions};

fn barcode() -> Barcode {
    "8809432018285".parse().unwrap()
}

fn ready_status() -> EnrichmentStatus {
    EnrichmentStatus {
        ready: true,
        ingredients: Some(IngredientsData::Regular {
            count: 1,
            ingredients: vec![Ingredient {
                position: 1,
                name_en: "Water".to_string(),
                name_ru: None,
                risk_score: Some("1".to_string()),
                tags: vec![],
            }],
        }),
        img_url: None,
    }
}

/// Enrichment source that replays a script of statuses, then repeats
/// "not ready" forever. Optionally delays each check to simulate a slow
/// request in flight.
struct ScriptedSource {
    script: Mutex<VecDeque<EnrichmentStatus>>,
    check_delay: Duration,
    checks: AtomicUsize,
}

impl ScriptedSource {
    fn new(script: Vec<EnrichmentStatus>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            check_delay: Duration::ZERO,
            checks: AtomicUsize::new(0),
        })
    }

    fn slow(script: Vec<EnrichmentStatus>, check_delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            check_delay,
            checks: AtomicUsize::new(0),
        })
    }

    fn check_count(&self) -> usize {
        self.checks.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProductSource for ScriptedSource {
    async fn search_by_code(&self, _code: &Barcode) -> SearchOutcome {
        panic!("poll tests must not search");
    }

    async fn check_enrichment(&self, _code: &Barcode) -> EnrichmentStatus {
        self.checks.fetch_add(1, Ordering::SeqCst);
        if !self.check_delay.is_zero() {
            tokio::time::sleep(self.check_delay).await;
        }
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_default()
    }
}

fn fast_options() -> PollOptions {
    PollOptions {
        interval: Duration::from_millis(10),
        max_wait: Duration::from_millis(500),
    }
}

#[tokio::test]
async fn delivers_exactly_one_update_when_ready_immediately() {
    let source = ScriptedSource::new(vec![ready_status()]);
    let updates = Arc::new(AtomicUsize::new(0));
    let seen = updates.clone();

    let handle = poll_enrichment(source.clone(), barcode(), fast_options(), move |update| {
        assert!(matches!(update.ingredients, IngredientsData::Regular { .. }));
        seen.fetch_add(1, Ordering::SeqCst);
    });

    handle.finished().await;
    assert_eq!(updates.load(Ordering::SeqCst), 1);
    assert_eq!(source.check_count(), 1);

    // Nothing keeps running after delivery.
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(source.check_count(), 1);
}

#[tokio::test]
async fn keeps_polling_until_payload_is_present() {
    // Two not-ready checks, then ready-without-payload, then the real one.
    let source = ScriptedSource::new(vec![
        EnrichmentStatus::default(),
        EnrichmentStatus::default(),
        EnrichmentStatus {
            ready: true,
            ingredients: None,
            img_url: None,
        },
        ready_status(),
    ]);
    let updates = Arc::new(AtomicUsize::new(0));
    let seen = updates.clone();

    let handle = poll_enrichment(source.clone(), barcode(), fast_options(), move |_| {
        seen.fetch_add(1, Ordering::SeqCst);
    });

    handle.finished().await;
    assert_eq!(updates.load(Ordering::SeqCst), 1);
    assert_eq!(source.check_count(), 4);
}

#[tokio::test]
async fn stops_checking_after_max_wait() {
    let source = ScriptedSource::new(vec![]);
    let updates = Arc::new(AtomicUsize::new(0));
    let seen = updates.clone();

    let options = PollOptions {
        interval: Duration::from_millis(20),
        max_wait: Duration::from_millis(100),
    };
    let handle = poll_enrichment(source.clone(), barcode(), options, move |_| {
        seen.fetch_add(1, Ordering::SeqCst);
    });

    handle.finished().await;
    let checks_at_timeout = source.check_count();
    assert!(checks_at_timeout >= 2, "expected several checks, got {}", checks_at_timeout);

    // Silent timeout: no update, and no further checks ever.
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(source.check_count(), checks_at_timeout);
    assert_eq!(updates.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn cancel_suppresses_update_from_in_flight_check() {
    // The first check is slow and would come back ready; cancellation
    // lands while it is in flight.
    let source = ScriptedSource::slow(vec![ready_status()], Duration::from_millis(100));
    let updates = Arc::new(AtomicUsize::new(0));
    let seen = updates.clone();

    let handle = poll_enrichment(source.clone(), barcode(), fast_options(), move |_| {
        seen.fetch_add(1, Ordering::SeqCst);
    });

    tokio::time::sleep(Duration::from_millis(30)).await;
    assert_eq!(source.check_count(), 1, "check should be in flight");

    // Cancel through the token alone, leaving the task alive so the
    // in-flight check actually completes and hits the token gate.
    handle.token().cancel();

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(updates.load(Ordering::SeqCst), 0);

    handle.cancel();
}

#[tokio::test]
async fn cancel_stops_future_checks() {
    let source = ScriptedSource::new(vec![]);
    let updates = Arc::new(AtomicUsize::new(0));
    let seen = updates.clone();

    let handle = poll_enrichment(source.clone(), barcode(), fast_options(), move |_| {
        seen.fetch_add(1, Ordering::SeqCst);
    });

    tokio::time::sleep(Duration::from_millis(35)).await;
    handle.cancel();
    let checks_at_cancel = source.check_count();

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(source.check_count(), checks_at_cancel);
    assert_eq!(updates.load(Ordering::SeqCst), 0);
}
