//! Fixed-interval polling collector.
//!
//! The collector does the following things on every cycle:
//! 1. Fetch the current point values from the configured source.
//! 2. Ingest the batch into the rolling store (the live view).
//! 3. Forward the same batch to the persistent sink, when one is configured.
//!
//! Cycles run on a fixed-period timer with one immediate cycle at startup so
//! the first user-visible view is never empty. Exactly one cycle executes at
//! a time; a tick that fires while a cycle is still running is skipped, not
//! queued. A failed fetch leaves the store untouched and the timer on its
//! normal schedule. There is no backoff: the target network is low-traffic
//! and tolerant, and a connectivity blip must never stop future polling.

use crate::client::PointSource;
use crate::sink::RecordSink;
use crate::store::RollingStore;
use chrono::{DateTime, TimeZone, Utc};
use log::{error, info, warn};
use std::sync::{
    atomic::{AtomicBool, AtomicU64, Ordering},
    Arc, RwLock,
};
use std::time::{Duration, Instant};
use tokio::sync::Notify;
use tokio::time::MissedTickBehavior;

/// Collector cadence configuration.
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    pub poll_interval: Duration,
    /// Number of missed intervals after which the live view counts as stale.
    pub stale_after_intervals: u32,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self { poll_interval: Duration::from_secs(300), stale_after_intervals: 2 }
    }
}

/// Where the collector currently is within a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Idle,
    Fetching,
    Distributing,
}

impl PollState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PollState::Idle => "idle",
            PollState::Fetching => "fetching",
            PollState::Distributing => "distributing",
        }
    }
}

/// Pipeline freshness as seen by a dashboard viewer: `NoData` means the
/// collector has never completed a cycle, `Stale` means the last success is
/// older than the configured number of poll intervals. This lets a viewer
/// tell a quiet sensor from a broken pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    NoData,
    Live,
    Stale,
}

impl Freshness {
    pub fn as_str(&self) -> &'static str {
        match self {
            Freshness::NoData => "no-data",
            Freshness::Live => "live",
            Freshness::Stale => "stale",
        }
    }
}

/// Metrics snapshot collected by the collector.
#[derive(Debug, Clone)]
pub struct CollectorMetrics {
    pub polls_completed: u64,
    pub polls_failed: u64,
    pub points_ingested: u64,
    pub points_skipped: u64,
    pub sink_batches: u64,
    pub sink_errors: u64,
    pub elapsed_seconds: f64,
}

impl CollectorMetrics {
    pub fn poll_success_rate(&self) -> f64 {
        let attempts = self.polls_completed + self.polls_failed;
        if attempts > 0 {
            (self.polls_completed as f64 / attempts as f64) * 100.0
        } else {
            0.0
        }
    }

    pub fn points_per_poll(&self) -> f64 {
        if self.polls_completed > 0 {
            self.points_ingested as f64 / self.polls_completed as f64
        } else {
            0.0
        }
    }
}

/// The polling collector.
pub struct Collector {
    config: CollectorConfig,
    source: Arc<dyn PointSource>,
    store: Arc<RollingStore>,
    sink: Option<Arc<dyn RecordSink>>,
    state: RwLock<PollState>,
    polls_completed: AtomicU64,
    polls_failed: AtomicU64,
    points_ingested: AtomicU64,
    points_skipped: AtomicU64,
    sink_batches: AtomicU64,
    sink_errors: AtomicU64,
    // Epoch milliseconds of the last completed cycle; 0 = never.
    last_success_ms: AtomicU64,
    should_stop: AtomicBool,
    stop_notify: Notify,
    started: Instant,
}

impl Collector {
    pub fn new(
        config: CollectorConfig,
        source: Arc<dyn PointSource>,
        store: Arc<RollingStore>,
        sink: Option<Arc<dyn RecordSink>>,
    ) -> Self {
        Self {
            config,
            source,
            store,
            sink,
            state: RwLock::new(PollState::Idle),
            polls_completed: AtomicU64::new(0),
            polls_failed: AtomicU64::new(0),
            points_ingested: AtomicU64::new(0),
            points_skipped: AtomicU64::new(0),
            sink_batches: AtomicU64::new(0),
            sink_errors: AtomicU64::new(0),
            last_success_ms: AtomicU64::new(0),
            should_stop: AtomicBool::new(false),
            stop_notify: Notify::new(),
            started: Instant::now(),
        }
    }

    /// Run the polling loop until `stop` is called.
    ///
    /// An in-flight cycle always completes before the loop exits, so a cycle
    /// is never left partially applied to the store.
    pub async fn run(&self) {
        let mut interval = tokio::time::interval(self.config.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            "Collector started (interval: {}s, capacity: {}, sink: {})",
            self.config.poll_interval.as_secs(),
            self.store.capacity(),
            if self.sink.is_some() { "enabled" } else { "disabled" }
        );

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if self.should_stop.load(Ordering::Relaxed) {
                        break;
                    }
                    self.run_cycle().await;
                }
                _ = self.stop_notify.notified() => break,
            }
        }

        info!("Collector stopped after {} completed polls", self.polls_completed.load(Ordering::Relaxed));
    }

    /// Execute one fetch-and-distribute cycle.
    pub async fn run_cycle(&self) {
        self.set_state(PollState::Fetching);

        let outcome = match self.source.fetch().await {
            Ok(outcome) => outcome,
            Err(e) => {
                // Store contents stay untouched; the next attempt happens on
                // the normal timer.
                self.polls_failed.fetch_add(1, Ordering::Relaxed);
                self.set_state(PollState::Idle);
                error!("Poll failed: {}", e);
                return;
            }
        };

        self.set_state(PollState::Distributing);

        let stored = self.store.ingest(&outcome.records);
        self.points_ingested.fetch_add(stored as u64, Ordering::Relaxed);
        self.points_skipped.fetch_add(outcome.skipped_total(), Ordering::Relaxed);
        let poll_number = self.polls_completed.fetch_add(1, Ordering::Relaxed) + 1;
        self.last_success_ms
            .store(Utc::now().timestamp_millis().max(0) as u64, Ordering::Relaxed);

        info!(
            "Poll #{}: stored {} points across {} sensors (skipped {})",
            poll_number,
            stored,
            self.store.series_count(),
            outcome.skipped_total()
        );

        // The sink is independent of the live view: the store already has the
        // batch, and a sink failure is logged and discarded.
        if let Some(sink) = &self.sink {
            match sink.write(&outcome.records).await {
                Ok(written) => {
                    self.sink_batches.fetch_add(1, Ordering::Relaxed);
                    info!("Sink: wrote {} points", written);
                }
                Err(e) => {
                    self.sink_errors.fetch_add(1, Ordering::Relaxed);
                    warn!("Sink write failed, batch discarded: {}", e);
                }
            }
        }

        self.set_state(PollState::Idle);
    }

    /// Signal the loop to stop. The in-flight cycle, if any, finishes first.
    pub fn stop(&self) {
        self.should_stop.store(true, Ordering::Relaxed);
        self.stop_notify.notify_one();
    }

    pub fn state(&self) -> PollState {
        *self.state.read().unwrap()
    }

    /// Time of the last completed cycle.
    pub fn last_success(&self) -> Option<DateTime<Utc>> {
        let ms = self.last_success_ms.load(Ordering::Relaxed);
        if ms == 0 {
            None
        } else {
            Utc.timestamp_millis_opt(ms as i64).single()
        }
    }

    /// Classify the live view: no data yet, live, or stale.
    pub fn freshness(&self) -> Freshness {
        match self.last_success() {
            None => Freshness::NoData,
            Some(last) => {
                let age = Utc::now().signed_duration_since(last);
                let limit = self.config.poll_interval.as_secs()
                    * u64::from(self.config.stale_after_intervals);
                if age.num_seconds() > limit as i64 {
                    Freshness::Stale
                } else {
                    Freshness::Live
                }
            }
        }
    }

    pub fn poll_interval(&self) -> Duration {
        self.config.poll_interval
    }

    pub fn metrics(&self) -> CollectorMetrics {
        CollectorMetrics {
            polls_completed: self.polls_completed.load(Ordering::Relaxed),
            polls_failed: self.polls_failed.load(Ordering::Relaxed),
            points_ingested: self.points_ingested.load(Ordering::Relaxed),
            points_skipped: self.points_skipped.load(Ordering::Relaxed),
            sink_batches: self.sink_batches.load(Ordering::Relaxed),
            sink_errors: self.sink_errors.load(Ordering::Relaxed),
            elapsed_seconds: self.started.elapsed().as_secs_f64(),
        }
    }

    fn set_state(&self, state: PollState) {
        *self.state.write().unwrap() = state;
    }
}
