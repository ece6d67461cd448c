//! Core types for ipld-core.
//!
//! This module defines the records that flow between the layers: the
//! per-line [`EventRecord`] emitted by the classifier, the per-file
//! [`ResumeRecord`] emitted by the reconciler, and the [`LineDiagnostic`]
//! kinds surfaced alongside them.

use serde::Serialize;
use thiserror::Error;

use crate::datetime::{LogDate, LogTime, Timestamp, TimestampError};
use crate::elapsed::Elapsed;

/// Lifecycle category of a classified line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    ShutdownBegin,
    EndOfShutdown,
    IplBegin,
    IplEnd,
    PreIpl,
    PostIpl,
    SystemIpled,
    None,
}

impl EventType {
    /// Wire label used in the event CSV and as the marker-table key.
    /// [`EventType::None`] is written as `null`.
    pub fn label(&self) -> &'static str {
        match self {
            EventType::ShutdownBegin => "SHUTDOWN_BEGIN",
            EventType::EndOfShutdown => "END_OF_SHUTDOWN",
            EventType::IplBegin => "IPL_BEGIN",
            EventType::IplEnd => "IPL_END",
            EventType::PreIpl => "PRE_IPL",
            EventType::PostIpl => "POST_IPL",
            EventType::SystemIpled => "SYSTEM_IPLED",
            EventType::None => "null",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Some(match label {
            "SHUTDOWN_BEGIN" => EventType::ShutdownBegin,
            "END_OF_SHUTDOWN" => EventType::EndOfShutdown,
            "IPL_BEGIN" => EventType::IplBegin,
            "IPL_END" => EventType::IplEnd,
            "PRE_IPL" => EventType::PreIpl,
            "POST_IPL" => EventType::PostIpl,
            "SYSTEM_IPLED" => EventType::SystemIpled,
            "null" | "NONE" => EventType::None,
            _ => return None,
        })
    }

    /// True for the six categories that feed the resume timeline.
    pub fn is_lifecycle(&self) -> bool {
        !matches!(self, EventType::SystemIpled | EventType::None)
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Whether the line matched one of the error markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorFlag {
    #[default]
    None,
    ErrorDetected,
}

impl ErrorFlag {
    /// `null` or `y`, as written in the event CSV.
    pub fn label(&self) -> &'static str {
        match self {
            ErrorFlag::None => "null",
            ErrorFlag::ErrorDetected => "y",
        }
    }
}

/// One classified log line.
///
/// Exactly one `event_type` per record. `error_flag` is only ever set when
/// `event_type` is [`EventType::None`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventRecord {
    pub log_name: String,
    /// 1-based line number within the source file.
    pub log_id: u64,
    #[serde(serialize_with = "serialize_display_opt")]
    pub date: Option<LogDate>,
    #[serde(serialize_with = "serialize_display_opt")]
    pub time: Option<LogTime>,
    pub system_name: String,
    pub event_type: EventType,
    pub error_flag: ErrorFlag,
    pub raw_line: String,
}

impl EventRecord {
    /// The full timestamp, if both halves were recovered.
    pub fn timestamp(&self) -> Option<Timestamp> {
        Some(Timestamp::new(self.date?, self.time?))
    }
}

/// Per-file summary of the IPL timeline.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ResumeRecord {
    pub system_name: String,
    pub log_dataset: String,
    pub pre_ipl: Option<Timestamp>,
    pub shutdown_begin: Option<Timestamp>,
    pub shutdown_end: Option<Timestamp>,
    pub ipl_begin: Option<Timestamp>,
    pub ipl_end: Option<Timestamp>,
    pub post_ipl: Option<Timestamp>,
    /// Only set when the file had a `SYSTEM IPLED` line and none of the six
    /// lifecycle markers.
    pub last_ipl: Option<Timestamp>,
    pub elapsed_before_shutdown: Option<Elapsed>,
    pub elapsed_after_shutdown: Option<Elapsed>,
    pub elapsed_between_shutdown_and_ipl: Option<Elapsed>,
    pub elapsed_ipl: Option<Elapsed>,
    pub elapsed_after_ipl: Option<Elapsed>,
    pub total_elapsed: Option<Elapsed>,
}

impl ResumeRecord {
    /// An all-absent record: one row per file even when nothing was found.
    pub fn empty(system_name: impl Into<String>, log_dataset: impl Into<String>) -> Self {
        Self {
            system_name: system_name.into(),
            log_dataset: log_dataset.into(),
            ..Default::default()
        }
    }

    pub fn has_lifecycle(&self) -> bool {
        self.pre_ipl.is_some()
            || self.shutdown_begin.is_some()
            || self.shutdown_end.is_some()
            || self.ipl_begin.is_some()
            || self.ipl_end.is_some()
            || self.post_ipl.is_some()
    }
}

/// Non-fatal problems found while processing a file. None of these abort a
/// run; they are returned next to the records they concern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LineDiagnostic {
    #[error("line {log_id}: {source}")]
    MalformedTimestamp {
        log_id: u64,
        #[source]
        source: TimestampError,
    },
    #[error("line {log_id}: no column layout matched")]
    UnclassifiableLine { log_id: u64 },
    #[error("line {log_id}: {event} at {at} does not follow {anchor}")]
    NonMonotonicTimestamps {
        log_id: u64,
        event: EventType,
        at: String,
        anchor: Timestamp,
    },
    #[error("interval {interval}: end {end} precedes start {start}")]
    NonMonotonicInterval {
        interval: &'static str,
        start: Timestamp,
        end: Timestamp,
    },
    #[error("pattern registry is empty; no line can match")]
    EmptyRegistry,
}

fn serialize_display_opt<T, S>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
where
    T: std::fmt::Display,
    S: serde::Serializer,
{
    match value {
        Some(v) => serializer.collect_str(v),
        None => serializer.serialize_none(),
    }
}
