//! Line classifier — one raw SYSLOG line in, one [`EventRecord`] out.
//!
//! Classification is attempted in order:
//!
//! 1. the `SYSTEM IPLED` display line, which has its own fixed columns
//!    (date in field 10 as `MM/DD/YYYY`, time in field 8 as `HH.MM.SS`);
//! 2. the column-layout cascade from [`crate::layout`] to find the date and
//!    time tokens;
//! 3. the marker table from [`crate::markers`], first category wins, then
//!    the error markers.
//!
//! A line never fails. A line with no layout, or with a timestamp that does
//! not parse, still yields a record with `event_type = NONE` plus a
//! [`LineDiagnostic`] describing why.
//!
//! The only input beyond the line itself is [`ClassifyContext`], which
//! carries the earliest shutdown begin seen so far in the file so an
//! end-of-shutdown can be checked against it.

use regex::Regex;
use tracing::debug;

use crate::datetime::{
    convert_colon_time, convert_dot_time, convert_ordinal_date, convert_slash_date, LogDate,
    LogTime, Timestamp, TimestampError,
};
use crate::layout::{detect_layout, LayoutContext, LayoutKind};
use crate::markers::{is_error_line, lifecycle_groups, SYSTEM_IPLED};
use crate::types::{ErrorFlag, EventRecord, EventType, LineDiagnostic};

/// Field positions of the `SYSTEM IPLED` line (1-based).
const IPLED_TIME_FIELD: usize = 8;
const IPLED_DATE_FIELD: usize = 10;

/// State carried between lines of one file.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassifyContext {
    pub shutdown_begin: Option<Timestamp>,
}

impl ClassifyContext {
    /// Fold a classified record into the context.
    pub fn observe(&mut self, record: &EventRecord) {
        if record.event_type != EventType::ShutdownBegin {
            return;
        }
        if let Some(ts) = record.timestamp() {
            self.shutdown_begin = Some(self.shutdown_begin.map_or(ts, |cur| cur.min(ts)));
        }
    }
}

/// Side-channel notice raised by a `SYSTEM IPLED` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IplNotification {
    pub system: String,
    pub timestamp: Timestamp,
}

impl IplNotification {
    /// `hostname date time`, one line in the notification sink.
    pub fn to_line(&self) -> String {
        format!(
            "{} {} {}",
            self.system, self.timestamp.date, self.timestamp.time
        )
    }
}

/// Result of classifying one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedLine {
    pub record: EventRecord,
    /// Layout used, `None` for the `SYSTEM IPLED` branch and for
    /// unclassifiable lines.
    pub layout: Option<LayoutKind>,
    pub diagnostics: Vec<LineDiagnostic>,
    pub notification: Option<IplNotification>,
}

#[derive(Debug, Clone)]
pub struct LineClassifier {
    host: String,
    excluded: Regex,
}

impl LineClassifier {
    /// `host` is the system name expected in the host column; `excluded` is
    /// the message-class filter applied to field 2.
    pub fn new(host: impl Into<String>, excluded: Regex) -> Self {
        Self {
            host: host.into(),
            excluded,
        }
    }

    /// Build with the excluded-class expression from configuration.
    pub fn with_pattern(host: impl Into<String>, excluded: &str) -> Result<Self, regex::Error> {
        Ok(Self::new(host, Regex::new(excluded)?))
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn classify(
        &self,
        log_name: &str,
        log_id: u64,
        raw: &str,
        ctx: &ClassifyContext,
    ) -> ClassifiedLine {
        let fields: Vec<&str> = raw.split_whitespace().collect();

        if raw.contains(SYSTEM_IPLED) {
            return self.classify_ipled(log_name, log_id, raw, &fields);
        }

        let mut diagnostics = Vec::new();
        let layout_ctx = LayoutContext {
            host: &self.host,
            excluded: &self.excluded,
        };

        let Some(layout) = detect_layout(&fields, &layout_ctx) else {
            debug!(log_name, log_id, "no column layout matched");
            diagnostics.push(LineDiagnostic::UnclassifiableLine { log_id });
            let record = EventRecord {
                log_name: log_name.to_string(),
                log_id,
                date: None,
                time: None,
                system_name: self.host.clone(),
                event_type: EventType::None,
                error_flag: error_flag(raw, &fields),
                raw_line: raw.to_string(),
            };
            return ClassifiedLine {
                record,
                layout: None,
                diagnostics,
                notification: None,
            };
        };

        let date = convert_ordinal_date(layout.date)
            .map_err(|e| malformed(log_id, e, &mut diagnostics))
            .ok();
        let time = layout.time.and_then(|token| {
            convert_colon_time(token)
                .map_err(|e| malformed(log_id, e, &mut diagnostics))
                .ok()
        });

        let event_type = if diagnostics.is_empty() {
            self.lifecycle_event(raw, &fields, log_id, date, time, ctx, &mut diagnostics)
        } else {
            EventType::None
        };
        let error_flag = if event_type == EventType::None {
            error_flag(raw, &fields)
        } else {
            ErrorFlag::None
        };

        let record = EventRecord {
            log_name: log_name.to_string(),
            log_id,
            date,
            time,
            system_name: layout.system.unwrap_or(&self.host).to_string(),
            event_type,
            error_flag,
            raw_line: raw.to_string(),
        };

        ClassifiedLine {
            record,
            layout: Some(layout.kind),
            diagnostics,
            notification: None,
        }
    }

    /// Marker cascade. A category whose markers match but whose guard fails
    /// does not stop the cascade.
    #[allow(clippy::too_many_arguments)]
    fn lifecycle_event(
        &self,
        raw: &str,
        fields: &[&str],
        log_id: u64,
        date: Option<LogDate>,
        time: Option<LogTime>,
        ctx: &ClassifyContext,
        diagnostics: &mut Vec<LineDiagnostic>,
    ) -> EventType {
        let timestamp = date.zip(time).map(|(d, t)| Timestamp::new(d, t));

        for (event, markers) in lifecycle_groups() {
            if !markers.iter().any(|m| m.matches(raw, fields)) {
                continue;
            }
            if event == EventType::EndOfShutdown {
                if let Some(anchor) = ctx.shutdown_begin {
                    if !timestamp.is_some_and(|ts| ts > anchor) {
                        debug!(log_id, %anchor, "end of shutdown does not follow shutdown begin");
                        diagnostics.push(LineDiagnostic::NonMonotonicTimestamps {
                            log_id,
                            event,
                            at: render_partial(date, time),
                            anchor,
                        });
                        continue;
                    }
                }
            }
            return event;
        }
        EventType::None
    }

    fn classify_ipled(
        &self,
        log_name: &str,
        log_id: u64,
        raw: &str,
        fields: &[&str],
    ) -> ClassifiedLine {
        let mut diagnostics = Vec::new();
        let token = |n: usize| fields.get(n - 1).copied().unwrap_or("");

        let date = convert_slash_date(token(IPLED_DATE_FIELD))
            .map_err(|e| malformed(log_id, e, &mut diagnostics))
            .ok();
        let time = convert_dot_time(token(IPLED_TIME_FIELD))
            .map_err(|e| malformed(log_id, e, &mut diagnostics))
            .ok();

        let notification = date.zip(time).map(|(d, t)| IplNotification {
            system: self.host.clone(),
            timestamp: Timestamp::new(d, t),
        });
        let (event_type, error_flag) = if notification.is_some() {
            (EventType::SystemIpled, ErrorFlag::None)
        } else {
            (EventType::None, error_flag(raw, fields))
        };

        ClassifiedLine {
            record: EventRecord {
                log_name: log_name.to_string(),
                log_id,
                date,
                time,
                system_name: self.host.clone(),
                event_type,
                error_flag,
                raw_line: raw.to_string(),
            },
            layout: None,
            diagnostics,
            notification,
        }
    }
}

fn malformed(log_id: u64, source: TimestampError, diagnostics: &mut Vec<LineDiagnostic>) {
    debug!(log_id, %source, "malformed timestamp");
    diagnostics.push(LineDiagnostic::MalformedTimestamp { log_id, source });
}

fn error_flag(raw: &str, fields: &[&str]) -> ErrorFlag {
    if is_error_line(raw, fields) {
        ErrorFlag::ErrorDetected
    } else {
        ErrorFlag::None
    }
}

fn render_partial(date: Option<LogDate>, time: Option<LogTime>) -> String {
    match (date, time) {
        (Some(d), Some(t)) => format!("{d} {t}"),
        (Some(d), None) => d.to_string(),
        (None, Some(t)) => t.to_string(),
        (None, None) => String::new(),
    }
}
