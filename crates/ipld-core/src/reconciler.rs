//! Timeline reconciler — folds a file's event records into one
//! [`ResumeRecord`].
//!
//! Slots with a single rule are folded as records arrive:
//!
//! | Slot             | Rule         |
//! |------------------|--------------|
//! | `pre_ipl`        | earliest     |
//! | `shutdown_begin` | earliest     |
//! | `post_ipl`       | latest       |
//! | `SYSTEM IPLED`   | latest       |
//!
//! The three chained slots keep every candidate and are resolved in
//! [`TimelineAccumulator::finish`], each against the slot before it:
//!
//! - `shutdown_end` is the earliest candidate after `shutdown_begin`;
//! - `ipl_begin` is the earliest candidate after `shutdown_end`;
//! - `ipl_end` is the latest candidate after `ipl_begin`.
//!
//! Resolution depends only on the set of records, not on their order, so
//! folding the same records twice yields the same row.

use std::collections::BTreeMap;
use std::ops::Bound;

use tracing::{debug, trace};

use crate::datetime::Timestamp;
use crate::elapsed::{duration, Elapsed};
use crate::types::{EventRecord, EventType, LineDiagnostic, ResumeRecord};

/// Candidate timestamps for a chained slot, each with the first line it was
/// seen on.
type Candidates = BTreeMap<Timestamp, u64>;

#[derive(Debug, Clone, Default)]
pub struct TimelineAccumulator {
    pre_ipl: Option<Timestamp>,
    shutdown_begin: Option<Timestamp>,
    shutdown_end: Candidates,
    ipl_begin: Candidates,
    ipl_end: Candidates,
    post_ipl: Option<Timestamp>,
    system_ipled: Option<Timestamp>,
}

/// A resume row plus whatever went wrong building it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled {
    pub resume: ResumeRecord,
    pub diagnostics: Vec<LineDiagnostic>,
}

impl TimelineAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one record. Records without a full timestamp carry no timeline
    /// information and are ignored.
    pub fn observe(&mut self, record: &EventRecord) {
        let Some(ts) = record.timestamp() else {
            if record.event_type != EventType::None {
                trace!(log_id = record.log_id, event = %record.event_type, "event without timestamp skipped");
            }
            return;
        };

        match record.event_type {
            EventType::PreIpl => keep_min(&mut self.pre_ipl, ts),
            EventType::ShutdownBegin => keep_min(&mut self.shutdown_begin, ts),
            EventType::PostIpl => keep_max(&mut self.post_ipl, ts),
            EventType::EndOfShutdown => {
                self.shutdown_end.entry(ts).or_insert(record.log_id);
            }
            EventType::IplBegin => {
                self.ipl_begin.entry(ts).or_insert(record.log_id);
            }
            EventType::IplEnd => {
                self.ipl_end.entry(ts).or_insert(record.log_id);
            }
            EventType::SystemIpled => keep_max(&mut self.system_ipled, ts),
            EventType::None => {}
        }
    }

    pub fn finish(self, system_name: &str, log_dataset: &str) -> Reconciled {
        let mut diagnostics = Vec::new();

        let shutdown_begin = self.shutdown_begin;
        let shutdown_end = resolve(
            &self.shutdown_end,
            shutdown_begin,
            Pick::Earliest,
            EventType::EndOfShutdown,
            &mut diagnostics,
        );
        let ipl_begin = resolve(
            &self.ipl_begin,
            shutdown_end,
            Pick::Earliest,
            EventType::IplBegin,
            &mut diagnostics,
        );
        let ipl_end = resolve(
            &self.ipl_end,
            ipl_begin,
            Pick::Latest,
            EventType::IplEnd,
            &mut diagnostics,
        );

        let mut resume = ResumeRecord {
            system_name: system_name.to_string(),
            log_dataset: log_dataset.to_string(),
            pre_ipl: self.pre_ipl,
            shutdown_begin,
            shutdown_end,
            ipl_begin,
            ipl_end,
            post_ipl: self.post_ipl,
            ..Default::default()
        };

        if !resume.has_lifecycle() {
            resume.last_ipl = self.system_ipled;
        }

        resume.elapsed_before_shutdown = interval(
            "elapsed_before_shutdown",
            resume.pre_ipl,
            resume.shutdown_begin,
            &mut diagnostics,
        );
        resume.elapsed_after_shutdown = interval(
            "elapsed_after_shutdown",
            resume.shutdown_begin,
            resume.shutdown_end,
            &mut diagnostics,
        );
        resume.elapsed_between_shutdown_and_ipl = interval(
            "elapsed_btn_shut_ipl",
            resume.shutdown_end,
            resume.ipl_begin,
            &mut diagnostics,
        );
        resume.elapsed_ipl = interval(
            "elapsed_ipl",
            resume.ipl_begin,
            resume.ipl_end,
            &mut diagnostics,
        );
        resume.elapsed_after_ipl = interval(
            "elapsed_after_ipl",
            resume.ipl_end,
            resume.post_ipl,
            &mut diagnostics,
        );
        resume.total_elapsed = interval(
            "total_elapsed",
            resume.pre_ipl,
            resume.post_ipl,
            &mut diagnostics,
        );

        debug!(
            system = system_name,
            dataset = log_dataset,
            lifecycle = resume.has_lifecycle(),
            last_ipl = resume.last_ipl.is_some(),
            diagnostics = diagnostics.len(),
            "timeline reconciled"
        );

        Reconciled {
            resume,
            diagnostics,
        }
    }
}

/// Reconcile a whole file's records in one call.
pub fn reconcile<'a, I>(system_name: &str, log_dataset: &str, records: I) -> Reconciled
where
    I: IntoIterator<Item = &'a EventRecord>,
{
    let mut acc = TimelineAccumulator::new();
    for record in records {
        acc.observe(record);
    }
    acc.finish(system_name, log_dataset)
}

#[derive(Debug, Clone, Copy)]
enum Pick {
    Earliest,
    Latest,
}

/// Choose a candidate strictly after `anchor`, or from all candidates when
/// there is no anchor. Candidates at or before the anchor are reported.
fn resolve(
    candidates: &Candidates,
    anchor: Option<Timestamp>,
    pick: Pick,
    event: EventType,
    diagnostics: &mut Vec<LineDiagnostic>,
) -> Option<Timestamp> {
    let Some(anchor) = anchor else {
        return match pick {
            Pick::Earliest => candidates.keys().next().copied(),
            Pick::Latest => candidates.keys().next_back().copied(),
        };
    };

    for (ts, log_id) in candidates.range(..=anchor) {
        diagnostics.push(LineDiagnostic::NonMonotonicTimestamps {
            log_id: *log_id,
            event,
            at: ts.to_string(),
            anchor,
        });
    }

    let mut after = candidates.range((Bound::Excluded(anchor), Bound::Unbounded));
    match pick {
        Pick::Earliest => after.next().map(|(ts, _)| *ts),
        Pick::Latest => after.next_back().map(|(ts, _)| *ts),
    }
}

fn interval(
    name: &'static str,
    start: Option<Timestamp>,
    end: Option<Timestamp>,
    diagnostics: &mut Vec<LineDiagnostic>,
) -> Option<Elapsed> {
    let (start, end) = (start?, end?);
    match duration(&start, &end) {
        Ok(elapsed) => Some(elapsed),
        Err(_) => {
            debug!(interval = name, %start, %end, "interval left empty");
            diagnostics.push(LineDiagnostic::NonMonotonicInterval {
                interval: name,
                start,
                end,
            });
            None
        }
    }
}

fn keep_min(slot: &mut Option<Timestamp>, ts: Timestamp) {
    *slot = Some(slot.map_or(ts, |cur| cur.min(ts)));
}

fn keep_max(slot: &mut Option<Timestamp>, ts: Timestamp) {
    *slot = Some(slot.map_or(ts, |cur| cur.max(ts)));
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
