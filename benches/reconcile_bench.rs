#![allow(unused)]
//! Timeline reconciliation and ingest benchmarks.
//!
//! # Groups
//!
//! | Group | What it measures |
//! |-------|-----------------|
//! | `reconcile` | Folding N event records with many chained-slot candidates |
//! | `resume_csv` | Rendering and parsing resume rows |
//! | `ingest` | Sorting and deduplicating a batch of resume rows |
//!
//! # Viewing results
//!
//! ```sh
//! cargo bench --bench reconcile_bench
//! open target/criterion/report/index.html
//! ```

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ipld::csv::{parse_resume_row, resume_row};
use ipld::datetime::{LogDate, LogTime};
use ipld::outcome::IngestReport;
use ipld::{reconcile, ErrorFlag, EventRecord, EventType, ResumeRecord};

const KINDS: [EventType; 6] = [
    EventType::PreIpl,
    EventType::ShutdownBegin,
    EventType::EndOfShutdown,
    EventType::IplBegin,
    EventType::IplEnd,
    EventType::PostIpl,
];

/// `n` lifecycle records spread over one day, cycling through the six
/// categories.
fn records(n: usize) -> Vec<EventRecord> {
    (0..n)
        .map(|i| {
            let secs = (i * 7) % 86_400;
            EventRecord {
                log_name: "SYSLOG.D221005".to_string(),
                log_id: i as u64 + 1,
                date: Some(LogDate::new(2022, 10, 5)),
                time: Some(LogTime::new(
                    (secs / 3600) as u8,
                    (secs / 60 % 60) as u8,
                    (secs % 60) as u8,
                )),
                system_name: "SYSA".to_string(),
                event_type: KINDS[i % KINDS.len()],
                error_flag: ErrorFlag::None,
                raw_line: String::new(),
            }
        })
        .collect()
}

fn resume_rows(n: usize) -> Vec<ResumeRecord> {
    let full = reconcile("SYSA", "SYSLOG.D221005", &records(60)).resume;
    (0..n)
        .map(|i| ResumeRecord {
            system_name: format!("SYS{}", i % 40),
            log_dataset: format!("SYSLOG.D22{:04}", i),
            ..full.clone()
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Reconcile
// ---------------------------------------------------------------------------

fn reconcile_bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconcile");

    for size in [10usize, 1_000, 50_000] {
        let recs = records(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("records", size), &recs, |b, recs| {
            b.iter(|| reconcile("SYSA", "SYSLOG.D221005", black_box(recs)))
        });
    }

    group.finish();
}

// ---------------------------------------------------------------------------
// Resume CSV
// ---------------------------------------------------------------------------

fn resume_csv_bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("resume_csv");
    let row = reconcile("SYSA", "SYSLOG.D221005", &records(60)).resume;
    let line = resume_row(&row);

    group.throughput(Throughput::Elements(1));
    group.bench_function("render", |b| b.iter(|| resume_row(black_box(&row))));
    group.bench_function("parse", |b| b.iter(|| parse_resume_row(black_box(&line))));

    group.finish();
}

// ---------------------------------------------------------------------------
// Ingest
// ---------------------------------------------------------------------------

fn ingest_bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("ingest");

    for size in [100usize, 10_000] {
        let rows = resume_rows(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("rows", size), &rows, |b, rows| {
            b.iter(|| black_box(rows).iter().collect::<IngestReport>())
        });
    }

    group.finish();
}

criterion_group!(benches, reconcile_bench, resume_csv_bench, ingest_bench);
criterion_main!(benches);
