//! Collector Integration Tests
//!
//! These tests drive fetch-and-distribute cycles with scripted source and
//! sink doubles to verify:
//! - A successful cycle feeds both the rolling store and the sink
//! - A fetch failure leaves the store contents unchanged
//! - A sink failure never affects the live path
//! - The loop keeps its cadence after failures and stops gracefully

use argus::client::{ClientError, PointSource};
use argus::collector::{Collector, CollectorConfig, Freshness, PollState};
use argus::core::PointRecord;
use argus::parsing::ParseOutcome;
use argus::sink::{RecordSink, SinkError};
use argus::store::RollingStore;
use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, TimeZone, Utc};
use std::collections::VecDeque;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};
use std::time::Duration;

fn record_at(label: &str, value: f64, offset_secs: i64) -> PointRecord {
    let ts = Utc.with_ymd_and_hms(2026, 1, 7, 14, 0, 0).unwrap()
        + ChronoDuration::seconds(offset_secs);
    PointRecord::new("site-1", label, value, ts)
}

fn batch_of(labels: &[(&str, f64)]) -> ParseOutcome {
    let mut outcome = ParseOutcome::default();
    for (i, (label, value)) in labels.iter().enumerate() {
        outcome.records.push(record_at(label, *value, i as i64));
    }
    outcome
}

/// Source double that replays a scripted sequence of fetch results, then
/// keeps returning empty batches.
struct ScriptedSource {
    responses: Mutex<VecDeque<Result<ParseOutcome, ClientError>>>,
    fetches: AtomicUsize,
}

impl ScriptedSource {
    fn new(responses: Vec<Result<ParseOutcome, ClientError>>) -> Self {
        Self { responses: Mutex::new(responses.into_iter().collect()), fetches: AtomicUsize::new(0) }
    }
}

#[async_trait]
impl PointSource for ScriptedSource {
    async fn fetch(&self) -> Result<ParseOutcome, ClientError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(ParseOutcome::default()))
    }
}

/// Source double that takes a while, for shutdown and overlap tests.
struct SlowSource {
    delay: Duration,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl SlowSource {
    fn new(delay: Duration) -> Self {
        Self { delay, in_flight: AtomicUsize::new(0), max_in_flight: AtomicUsize::new(0) }
    }
}

#[async_trait]
impl PointSource for SlowSource {
    async fn fetch(&self) -> Result<ParseOutcome, ClientError> {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(batch_of(&[("Pump1 Speed", 72.09)]))
    }
}

/// Sink double recording every batch, optionally failing each write.
struct RecordingSink {
    written: AtomicUsize,
    fail: bool,
}

impl RecordingSink {
    fn new(fail: bool) -> Self {
        Self { written: AtomicUsize::new(0), fail }
    }
}

#[async_trait]
impl RecordSink for RecordingSink {
    async fn write(&self, records: &[PointRecord]) -> Result<usize, SinkError> {
        if self.fail {
            return Err(SinkError::Unavailable("connection refused".to_string()));
        }
        self.written.fetch_add(records.len(), Ordering::SeqCst);
        Ok(records.len())
    }
}

fn collector_with(
    source: Arc<dyn PointSource>,
    store: Arc<RollingStore>,
    sink: Option<Arc<dyn RecordSink>>,
    interval: Duration,
) -> Collector {
    Collector::new(
        CollectorConfig { poll_interval: interval, stale_after_intervals: 2 },
        source,
        store,
        sink,
    )
}

#[tokio::test]
async fn test_cycle_feeds_store_and_sink() {
    let source = Arc::new(ScriptedSource::new(vec![Ok(batch_of(&[
        ("Pump1 Speed", 72.09),
        ("Boiler Flow Temp", 64.2),
    ]))]));
    let store = Arc::new(RollingStore::new(100));
    let sink = Arc::new(RecordingSink::new(false));

    let collector = collector_with(
        source,
        Arc::clone(&store),
        Some(Arc::clone(&sink) as Arc<dyn RecordSink>),
        Duration::from_secs(300),
    );

    collector.run_cycle().await;

    assert_eq!(store.series_count(), 2);
    assert_eq!(sink.written.load(Ordering::SeqCst), 2);

    let metrics = collector.metrics();
    assert_eq!(metrics.polls_completed, 1);
    assert_eq!(metrics.points_ingested, 2);
    assert_eq!(metrics.sink_batches, 1);
    assert_eq!(collector.state(), PollState::Idle);
}

#[tokio::test]
async fn test_fetch_failure_leaves_store_unchanged() {
    let source = Arc::new(ScriptedSource::new(vec![
        Ok(batch_of(&[("Pump1 Speed", 72.09)])),
        Err(ClientError::Connectivity("request timed out".to_string())),
    ]));
    let store = Arc::new(RollingStore::new(100));
    let collector =
        collector_with(source, Arc::clone(&store), None, Duration::from_secs(300));

    collector.run_cycle().await;
    let before = store.read_all();

    collector.run_cycle().await;
    let after = store.read_all();

    assert_eq!(before, after);
    let metrics = collector.metrics();
    assert_eq!(metrics.polls_completed, 1);
    assert_eq!(metrics.polls_failed, 1);
}

#[tokio::test]
async fn test_auth_failure_counts_as_failed_poll() {
    let source = Arc::new(ScriptedSource::new(vec![Err(ClientError::Auth(
        "credentials rejected with status 401".to_string(),
    ))]));
    let store = Arc::new(RollingStore::new(100));
    let collector =
        collector_with(source, Arc::clone(&store), None, Duration::from_secs(300));

    collector.run_cycle().await;

    assert_eq!(store.series_count(), 0);
    assert_eq!(collector.metrics().polls_failed, 1);
    assert_eq!(collector.freshness(), Freshness::NoData);
}

#[tokio::test]
async fn test_sink_failure_does_not_affect_live_path() {
    let source = Arc::new(ScriptedSource::new(vec![Ok(batch_of(&[("Pump1 Speed", 72.09)]))]));
    let store = Arc::new(RollingStore::new(100));
    let sink = Arc::new(RecordingSink::new(true));

    let collector = collector_with(
        source,
        Arc::clone(&store),
        Some(sink as Arc<dyn RecordSink>),
        Duration::from_secs(300),
    );

    collector.run_cycle().await;

    // The live view still received the batch.
    assert_eq!(store.read("Pump1 Speed").unwrap().len(), 1);

    let metrics = collector.metrics();
    assert_eq!(metrics.polls_completed, 1);
    assert_eq!(metrics.sink_errors, 1);
    assert_eq!(metrics.sink_batches, 0);
}

#[tokio::test]
async fn test_skip_counters_accumulate() {
    let mut outcome = batch_of(&[("Good", 1.0)]);
    outcome.skipped_values = 2;
    outcome.skipped_timestamps = 1;

    let source = Arc::new(ScriptedSource::new(vec![Ok(outcome)]));
    let store = Arc::new(RollingStore::new(100));
    let collector =
        collector_with(source, Arc::clone(&store), None, Duration::from_secs(300));

    collector.run_cycle().await;

    let metrics = collector.metrics();
    assert_eq!(metrics.points_ingested, 1);
    assert_eq!(metrics.points_skipped, 3);
}

#[tokio::test]
async fn test_freshness_reflects_last_success() {
    let source = Arc::new(ScriptedSource::new(vec![Ok(batch_of(&[("Pump1 Speed", 72.09)]))]));
    let store = Arc::new(RollingStore::new(100));
    let collector =
        collector_with(source, Arc::clone(&store), None, Duration::from_secs(300));

    assert_eq!(collector.freshness(), Freshness::NoData);
    assert!(collector.last_success().is_none());

    collector.run_cycle().await;

    assert_eq!(collector.freshness(), Freshness::Live);
    assert!(collector.last_success().is_some());
}

#[tokio::test]
async fn test_stale_after_configured_intervals() {
    let source = Arc::new(ScriptedSource::new(vec![Ok(batch_of(&[("Pump1 Speed", 72.09)]))]));
    let store = Arc::new(RollingStore::new(100));
    let collector = Collector::new(
        CollectorConfig { poll_interval: Duration::from_secs(1), stale_after_intervals: 1 },
        source,
        store,
        None,
    );

    collector.run_cycle().await;
    assert_eq!(collector.freshness(), Freshness::Live);

    tokio::time::sleep(Duration::from_millis(2100)).await;
    assert_eq!(collector.freshness(), Freshness::Stale);
}

#[tokio::test]
async fn test_timer_continues_after_failure() {
    let source = Arc::new(ScriptedSource::new(vec![
        Err(ClientError::Connectivity("request timed out".to_string())),
        Ok(batch_of(&[("Pump1 Speed", 72.09)])),
    ]));
    let store = Arc::new(RollingStore::new(100));
    let collector = Arc::new(collector_with(
        source,
        Arc::clone(&store),
        None,
        Duration::from_millis(100),
    ));

    let runner = Arc::clone(&collector);
    let handle = tokio::spawn(async move { runner.run().await });

    tokio::time::sleep(Duration::from_millis(450)).await;
    collector.stop();
    handle.await.unwrap();

    // The failed first cycle did not stop the loop; a later cycle succeeded.
    let metrics = collector.metrics();
    assert_eq!(metrics.polls_failed, 1);
    assert!(metrics.polls_completed >= 1);
    assert!(store.read("Pump1 Speed").is_some());
}

#[tokio::test]
async fn test_no_overlapping_cycles() {
    let source = Arc::new(SlowSource::new(Duration::from_millis(150)));
    let store = Arc::new(RollingStore::new(100));
    let collector = Arc::new(collector_with(
        Arc::clone(&source) as Arc<dyn PointSource>,
        store,
        None,
        Duration::from_millis(50),
    ));

    let runner = Arc::clone(&collector);
    let handle = tokio::spawn(async move { runner.run().await });

    tokio::time::sleep(Duration::from_millis(500)).await;
    collector.stop();
    handle.await.unwrap();

    // Ticks that fire during a running cycle are skipped, never queued.
    assert_eq!(source.max_in_flight.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_graceful_stop_finishes_in_flight_cycle() {
    let source = Arc::new(SlowSource::new(Duration::from_millis(200)));
    let store = Arc::new(RollingStore::new(100));
    let collector = Arc::new(collector_with(
        source as Arc<dyn PointSource>,
        Arc::clone(&store),
        None,
        Duration::from_secs(300),
    ));

    let runner = Arc::clone(&collector);
    let handle = tokio::spawn(async move { runner.run().await });

    // Stop while the startup fetch is still in flight.
    tokio::time::sleep(Duration::from_millis(50)).await;
    collector.stop();

    tokio::time::timeout(Duration::from_secs(2), handle)
        .await
        .expect("collector did not stop in time")
        .unwrap();

    // The in-flight cycle was applied before the loop exited.
    assert_eq!(collector.metrics().polls_completed, 1);
    assert_eq!(store.read("Pump1 Speed").unwrap().len(), 1);
}
