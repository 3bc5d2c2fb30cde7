//! Rolling store write throughput.
//!
//! One real BMS poll returns roughly 650 points across distinct labels, so
//! the batch benchmark mirrors that shape. The eviction benchmark hammers a
//! single series that is permanently at capacity.

use argus::core::PointRecord;
use argus::store::RollingStore;
use chrono::{Duration, TimeZone, Utc};
use criterion::{criterion_group, criterion_main, BatchSize, Criterion};

fn poll_batch(labels: usize, offset_secs: i64) -> Vec<PointRecord> {
    let base = Utc.with_ymd_and_hms(2026, 1, 7, 14, 0, 0).unwrap();
    (0..labels)
        .map(|i| {
            PointRecord::new(
                "bench-site",
                &format!("L11_O{}_D{}_Sensor", i % 20, i),
                i as f64 * 0.1,
                base + Duration::seconds(offset_secs),
            )
        })
        .collect()
}

fn bench_poll_batch_ingest(c: &mut Criterion) {
    c.bench_function("ingest_650_point_batch", |b| {
        let store = RollingStore::new(1000);
        let mut cycle = 0i64;
        b.iter_batched(
            || {
                cycle += 1;
                poll_batch(650, cycle)
            },
            |batch| store.ingest(&batch),
            BatchSize::SmallInput,
        );
    });
}

fn bench_eviction_at_capacity(c: &mut Criterion) {
    c.bench_function("ingest_single_label_at_capacity", |b| {
        let store = RollingStore::new(1000);
        // Fill the series so every further ingest evicts.
        for i in 0..1000 {
            store.ingest(&poll_batch(1, i));
        }

        let mut cycle = 1000i64;
        b.iter_batched(
            || {
                cycle += 1;
                poll_batch(1, cycle)
            },
            |batch| store.ingest(&batch),
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, bench_poll_batch_ingest, bench_eviction_at_capacity);
criterion_main!(benches);
