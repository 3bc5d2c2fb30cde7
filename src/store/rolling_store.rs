//! Bounded per-label rolling history.
//!
//! One series per distinct label, each a FIFO of the most recent N samples.
//! Series are created on first sight of a label and live for the process
//! lifetime; the window itself is never persisted. Durability is the
//! persistent sink's job.
//!
//! Locking discipline: exactly one writer (the collector) and any number of
//! readers behind a single `RwLock`. A whole batch is applied under one
//! write-lock hold, so readers never observe a cycle half-applied. Reads
//! return snapshot copies.

use crate::core::{PointRecord, PointSample};
use crate::parsing::label::natural_key;
use std::collections::{HashMap, VecDeque};
use std::sync::RwLock;

/// Which points to retain in the live view. Everything else is still
/// forwarded to the persistent sink; the filter only bounds what the
/// dashboard tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointFilter {
    #[default]
    All,
    Pumps,
    Valves,
    Ahu,
    Temperature,
}

impl PointFilter {
    /// Parse a filter name as configured: all, pumps, valves, ahu, or temp.
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "all" => Some(PointFilter::All),
            "pumps" => Some(PointFilter::Pumps),
            "valves" => Some(PointFilter::Valves),
            "ahu" => Some(PointFilter::Ahu),
            "temp" => Some(PointFilter::Temperature),
            _ => None,
        }
    }

    pub fn matches(&self, label: &str) -> bool {
        let lower = label.to_lowercase();
        match self {
            PointFilter::All => true,
            PointFilter::Pumps => lower.contains("pump"),
            PointFilter::Valves => lower.contains("valve"),
            PointFilter::Ahu => lower.contains("ahu"),
            PointFilter::Temperature => lower.contains("temp"),
        }
    }
}

/// In-memory mapping from point label to its bounded rolling series.
pub struct RollingStore {
    series: RwLock<HashMap<String, VecDeque<PointSample>>>,
    capacity: usize,
    filter: PointFilter,
}

impl RollingStore {
    pub fn new(capacity: usize) -> Self {
        Self::with_filter(capacity, PointFilter::All)
    }

    pub fn with_filter(capacity: usize, filter: PointFilter) -> Self {
        Self { series: RwLock::new(HashMap::new()), capacity, filter }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Ingest one batch of records, evicting the oldest sample of any series
    /// that is at capacity. Duplicate label+timestamp pairs are stored as
    /// distinct entries; there is no deduplication and no backfill.
    ///
    /// Returns the number of samples stored (records dropped by the point
    /// filter are not counted).
    pub fn ingest(&self, records: &[PointRecord]) -> usize {
        let mut series = self.series.write().unwrap();
        let mut stored = 0;

        for record in records {
            if !self.filter.matches(&record.label) {
                continue;
            }

            let deque = series
                .entry(record.label.clone())
                .or_insert_with(|| VecDeque::with_capacity(self.capacity.min(64)));

            if deque.len() == self.capacity {
                deque.pop_front();
            }
            deque.push_back(PointSample::from(record));
            stored += 1;
        }

        stored
    }

    /// Snapshot of one series in insertion order, or `None` for an unknown
    /// label.
    pub fn read(&self, label: &str) -> Option<Vec<PointSample>> {
        let series = self.series.read().unwrap();
        series.get(label).map(|deque| deque.iter().copied().collect())
    }

    /// Snapshot of every series.
    pub fn read_all(&self) -> HashMap<String, Vec<PointSample>> {
        let series = self.series.read().unwrap();
        series
            .iter()
            .map(|(label, deque)| (label.clone(), deque.iter().copied().collect()))
            .collect()
    }

    /// All known labels in natural sort order (D2 before D21), for legends.
    pub fn labels(&self) -> Vec<String> {
        let series = self.series.read().unwrap();
        let mut labels: Vec<String> = series.keys().cloned().collect();
        labels.sort_by_key(|label| natural_key(label));
        labels
    }

    pub fn series_count(&self) -> usize {
        self.series.read().unwrap().len()
    }

    pub fn sample_count(&self) -> usize {
        self.series.read().unwrap().values().map(VecDeque::len).sum()
    }
}
