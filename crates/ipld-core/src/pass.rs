//! Per-file pass — filter, classify, reconcile.
//!
//! Lines are numbered from 1 in file order. Only lines containing a
//! registry marker are classified, each against a [`ClassifyContext`] that
//! carries the earliest shutdown begin seen so far. Every classified line
//! yields one [`EventRecord`]; the records are folded into a
//! [`TimelineAccumulator`] as they are produced, so the file is read once.

use serde::Serialize;
use tracing::debug;

use crate::classifier::{ClassifyContext, IplNotification, LineClassifier};
use crate::reconciler::TimelineAccumulator;
use crate::registry::PatternRegistry;
use crate::types::{EventRecord, LineDiagnostic, ResumeRecord};

/// Everything one file produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub log_name: String,
    pub events: Vec<EventRecord>,
    pub resume: ResumeRecord,
    pub diagnostics: Vec<LineDiagnostic>,
    pub notifications: Vec<IplNotification>,
    pub stats: PassStats,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PassStats {
    pub lines_read: u64,
    pub lines_matched: u64,
}

/// Borrowed inputs shared by every file of a host.
#[derive(Debug, Clone, Copy)]
pub struct FilePass<'a> {
    registry: &'a PatternRegistry,
    classifier: &'a LineClassifier,
}

impl<'a> FilePass<'a> {
    pub fn new(registry: &'a PatternRegistry, classifier: &'a LineClassifier) -> Self {
        Self {
            registry,
            classifier,
        }
    }

    pub fn run<I, S>(&self, log_name: &str, lines: I) -> FileReport
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut diagnostics = Vec::new();
        if self.registry.is_empty() {
            diagnostics.push(LineDiagnostic::EmptyRegistry);
        }

        let mut ctx = ClassifyContext::default();
        let mut timeline = TimelineAccumulator::new();
        let mut events = Vec::new();
        let mut notifications = Vec::new();
        let mut stats = PassStats::default();

        for (idx, line) in lines.into_iter().enumerate() {
            let line = line.as_ref();
            stats.lines_read += 1;
            if !self.registry.is_match(line) {
                continue;
            }
            stats.lines_matched += 1;

            let log_id = idx as u64 + 1;
            let classified = self.classifier.classify(log_name, log_id, line, &ctx);
            ctx.observe(&classified.record);
            timeline.observe(&classified.record);

            diagnostics.extend(classified.diagnostics);
            notifications.extend(classified.notification);
            events.push(classified.record);
        }

        let reconciled = timeline.finish(self.classifier.host(), log_name);
        diagnostics.extend(reconciled.diagnostics);

        debug!(
            log_name,
            lines_read = stats.lines_read,
            lines_matched = stats.lines_matched,
            diagnostics = diagnostics.len(),
            "file pass complete"
        );

        FileReport {
            log_name: log_name.to_string(),
            events,
            resume: reconciled.resume,
            diagnostics,
            notifications,
            stats,
        }
    }
}
