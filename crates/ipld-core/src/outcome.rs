//! Outcome classification of resume rows.
//!
//! Each resume row is sorted by how much of the shutdown/IPL sequence it
//! holds:
//!
//! - `done`: shutdown begin, shutdown end, IPL begin and IPL end are all
//!   present, valid calendar timestamps, and in order;
//! - `fail`: some of those four, but not a complete valid sequence;
//! - `garbage`: none of the four.
//!
//! Independently, a row carrying `last_ipl` yields a last-IPL entry.
//!
//! Durations here are measured on the real calendar with `chrono`, unlike the
//! per-file intervals in [`crate::reconciler`].

use std::collections::HashSet;

use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::debug;

use crate::datetime::Timestamp;
use crate::elapsed::Elapsed;
use crate::types::ResumeRecord;

const IPL_DATE_FORMAT: &str = "%b %d, %Y";

/// A complete shutdown-to-IPL sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DoneRow {
    pub sysname: String,
    pub ipl_date: String,
    pub log_dataset: String,
    pub shutdown_begin: Timestamp,
    pub shutdown_end: Timestamp,
    pub ipl_begin: Timestamp,
    pub ipl_end: Timestamp,
    pub pre_ipl: Option<Timestamp>,
    pub post_ipl: Option<Timestamp>,
    /// Shutdown begin to shutdown end.
    pub shutdown_duration: Elapsed,
    /// Shutdown end to IPL begin.
    pub poweroff_duration: Elapsed,
    /// IPL begin to IPL end.
    pub load_ipl: Elapsed,
    /// Shutdown begin to IPL end.
    pub total_duration: Elapsed,
}

/// A `fail` or `garbage` row: the lifecycle columns as found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartialRow {
    pub sysname: String,
    pub log_dataset: String,
    pub shutdown_begin: Option<Timestamp>,
    pub shutdown_end: Option<Timestamp>,
    pub ipl_begin: Option<Timestamp>,
    pub ipl_end: Option<Timestamp>,
    pub pre_ipl: Option<Timestamp>,
    pub post_ipl: Option<Timestamp>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LastIplRow {
    pub sysname: String,
    pub log_dataset: String,
    pub last_ipl: Timestamp,
    pub last_ipl_date: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Done(DoneRow),
    Fail(PartialRow),
    Garbage(PartialRow),
}

/// Sort one resume row. The second value is the row's last-IPL entry, if
/// it has one.
pub fn classify(resume: &ResumeRecord) -> (Outcome, Option<LastIplRow>) {
    let last_ipl = resume.last_ipl.and_then(|ts| {
        Some(LastIplRow {
            sysname: resume.system_name.clone(),
            log_dataset: resume.log_dataset.clone(),
            last_ipl: ts,
            last_ipl_date: to_naive(&ts)?.format(IPL_DATE_FORMAT).to_string(),
        })
    });

    let four = [
        resume.shutdown_begin,
        resume.shutdown_end,
        resume.ipl_begin,
        resume.ipl_end,
    ];
    if four.iter().all(Option::is_none) {
        return (Outcome::Garbage(partial(resume)), last_ipl);
    }

    let outcome = match done_row(resume) {
        Some(done) => Outcome::Done(done),
        None => Outcome::Fail(partial(resume)),
    };
    (outcome, last_ipl)
}

fn done_row(resume: &ResumeRecord) -> Option<DoneRow> {
    let sb = resume.shutdown_begin?;
    let se = resume.shutdown_end?;
    let ib = resume.ipl_begin?;
    let ie = resume.ipl_end?;
    let (nsb, nse, nib, nie) = (to_naive(&sb)?, to_naive(&se)?, to_naive(&ib)?, to_naive(&ie)?);

    let span = |from: NaiveDateTime, to: NaiveDateTime| -> Option<Elapsed> {
        let secs = (to - from).num_seconds();
        u64::try_from(secs).ok().map(Elapsed::from_seconds)
    };
    let Some(shutdown_duration) = span(nsb, nse) else {
        debug!(sysname = %resume.system_name, dataset = %resume.log_dataset, "shutdown end precedes begin");
        return None;
    };

    Some(DoneRow {
        sysname: resume.system_name.clone(),
        ipl_date: nsb.format(IPL_DATE_FORMAT).to_string(),
        log_dataset: resume.log_dataset.clone(),
        shutdown_begin: sb,
        shutdown_end: se,
        ipl_begin: ib,
        ipl_end: ie,
        pre_ipl: resume.pre_ipl,
        post_ipl: resume.post_ipl,
        shutdown_duration,
        poweroff_duration: span(nse, nib)?,
        load_ipl: span(nib, nie)?,
        total_duration: span(nsb, nie)?,
    })
}

fn partial(resume: &ResumeRecord) -> PartialRow {
    PartialRow {
        sysname: resume.system_name.clone(),
        log_dataset: resume.log_dataset.clone(),
        shutdown_begin: resume.shutdown_begin,
        shutdown_end: resume.shutdown_end,
        ipl_begin: resume.ipl_begin,
        ipl_end: resume.ipl_end,
        pre_ipl: resume.pre_ipl,
        post_ipl: resume.post_ipl,
    }
}

/// `None` for dates the real calendar does not have (e.g. Feb 29 1900,
/// which the SYSLOG calendar accepts).
fn to_naive(ts: &Timestamp) -> Option<NaiveDateTime> {
    chrono::NaiveDate::from_ymd_opt(
        i32::from(ts.date.year),
        u32::from(ts.date.month),
        u32::from(ts.date.day),
    )?
    .and_hms_opt(
        u32::from(ts.time.hour),
        u32::from(ts.time.minute),
        u32::from(ts.time.second),
    )
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// All outcomes for a set of resume rows, deduplicated.
///
/// A second row for an already-seen `(sysname, log_dataset)` is dropped, as
/// is a last-IPL entry repeating an already-seen `(sysname, last_ipl)`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestReport {
    pub done: Vec<DoneRow>,
    pub fail: Vec<PartialRow>,
    pub garbage: Vec<PartialRow>,
    pub last_ipl: Vec<LastIplRow>,
    #[serde(skip)]
    seen_datasets: HashSet<(String, String)>,
    #[serde(skip)]
    seen_last_ipl: HashSet<(String, Timestamp)>,
}

impl IngestReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify and add one row. Returns `false` if it was a duplicate.
    pub fn add(&mut self, resume: &ResumeRecord) -> bool {
        let key = (resume.system_name.clone(), resume.log_dataset.clone());
        if !self.seen_datasets.insert(key) {
            debug!(sysname = %resume.system_name, dataset = %resume.log_dataset, "duplicate resume row dropped");
            return false;
        }

        let (outcome, last_ipl) = classify(resume);
        match outcome {
            Outcome::Done(row) => self.done.push(row),
            Outcome::Fail(row) => self.fail.push(row),
            Outcome::Garbage(row) => self.garbage.push(row),
        }
        if let Some(row) = last_ipl {
            if self.seen_last_ipl.insert((row.sysname.clone(), row.last_ipl)) {
                self.last_ipl.push(row);
            }
        }
        true
    }

    pub fn total(&self) -> usize {
        self.done.len() + self.fail.len() + self.garbage.len()
    }
}

impl<'a> Extend<&'a ResumeRecord> for IngestReport {
    fn extend<I: IntoIterator<Item = &'a ResumeRecord>>(&mut self, iter: I) {
        for resume in iter {
            self.add(resume);
        }
    }
}

impl<'a> FromIterator<&'a ResumeRecord> for IngestReport {
    fn from_iter<I: IntoIterator<Item = &'a ResumeRecord>>(iter: I) -> Self {
        let mut report = Self::new();
        report.extend(iter);
        report
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ts(s: &str) -> Option<Timestamp> {
        Some(s.parse().unwrap())
    }

    fn full(dataset: &str) -> ResumeRecord {
        ResumeRecord {
            shutdown_begin: ts("2022-10-31 23:00:00"),
            shutdown_end: ts("2022-10-31 23:30:00"),
            ipl_begin: ts("2022-11-01 00:10:00"),
            ipl_end: ts("2022-11-01 01:00:00"),
            ..ResumeRecord::empty("SYSA", dataset)
        }
    }

    #[test]
    fn complete_row_is_done_on_real_calendar() {
        let (outcome, last) = classify(&full("D1"));
        let Outcome::Done(done) = outcome else {
            panic!("expected done, got {outcome:?}");
        };
        assert_eq!(done.ipl_date, "Oct 31, 2022");
        assert_eq!(done.shutdown_duration.to_csv(), "00:30:00");
        assert_eq!(done.poweroff_duration.to_csv(), "00:40:00");
        assert_eq!(done.load_ipl.to_csv(), "00:50:00");
        assert_eq!(done.total_duration.to_csv(), "02:00:00");
        assert!(last.is_none());
    }

    #[test]
    fn partial_row_is_fail() {
        let mut row = full("D1");
        row.ipl_end = None;
        assert!(matches!(classify(&row).0, Outcome::Fail(_)));
    }

    #[test]
    fn out_of_order_row_is_fail() {
        let mut row = full("D1");
        row.shutdown_end = ts("2022-10-31 22:00:00");
        assert!(matches!(classify(&row).0, Outcome::Fail(_)));
    }

    #[test]
    fn impossible_calendar_date_is_fail() {
        let mut row = full("D1");
        row.shutdown_begin = ts("1900-02-29 23:00:00");
        assert!(matches!(classify(&row).0, Outcome::Fail(_)));
    }

    #[test]
    fn last_ipl_only_row_is_garbage_with_entry() {
        let mut row = ResumeRecord::empty("SYSA", "D1");
        row.last_ipl = ts("2023-01-12 08:00:00");
        let (outcome, last) = classify(&row);
        assert!(matches!(outcome, Outcome::Garbage(_)));
        assert_eq!(last.unwrap().last_ipl_date, "Jan 12, 2023");
    }

    #[test]
    fn report_drops_duplicates() {
        let mut a = ResumeRecord::empty("SYSA", "D1");
        a.last_ipl = ts("2023-01-12 08:00:00");
        let mut b = ResumeRecord::empty("SYSA", "D2");
        b.last_ipl = ts("2023-01-12 08:00:00");
        let c = full("D3");

        let report: IngestReport = [&a, &a, &b, &c].into_iter().collect();
        assert_eq!(report.garbage.len(), 2);
        assert_eq!(report.done.len(), 1);
        assert_eq!(report.last_ipl.len(), 1);
        assert_eq!(report.total(), 3);
    }
}
