//! Test builders — ergonomic constructors for SYSLOG lines and event records.
//!
//! These builders are designed for readability in test assertions, not for
//! production use. They panic on invalid input rather than returning `Result`.

use ipld::{ErrorFlag, EventRecord, EventType, Timestamp};

// ---------------------------------------------------------------------------
// SyslogLineBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for secondary-layout SYSLOG lines (host in field 3,
/// ordinal date in field 4, colon time in field 5).
///
/// # Example
///
/// ```rust
/// let line = SyslogLineBuilder::new("SYSA", "2022-10-05 23:00:00")
///     .job("STC00001")
///     .message("SHUTDOWN BEGIN")
///     .build();
/// // "N 4000000 SYSA 22278 23:00:00.00 STC00001 00000090 SHUTDOWN BEGIN"
/// ```
pub struct SyslogLineBuilder {
    host: String,
    at: Timestamp,
    job: String,
    message: String,
}

impl SyslogLineBuilder {
    pub fn new(host: impl Into<String>, at: &str) -> Self {
        Self {
            host: host.into(),
            at: at.parse().expect("builder timestamp must be YYYY-MM-DD HH:MM:SS"),
            job: "STC00001".to_string(),
            message: "IEF196I ALLOCATION".to_string(),
        }
    }

    pub fn job(mut self, job: impl Into<String>) -> Self {
        self.job = job.into();
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn build(self) -> String {
        let d = self.at.date;
        let t = self.at.time;
        format!(
            "N 4000000 {} {:02}{:03} {:02}:{:02}:{:02}.00 {} 00000090 {}",
            self.host,
            d.year % 100,
            d.ordinal(),
            t.hour,
            t.minute,
            t.second,
            self.job,
            self.message
        )
    }
}

/// A `SYSTEM IPLED` display line for `host` at `at`.
pub fn ipled_line(host: &str, at: &str) -> String {
    let ts: Timestamp = at.parse().expect("ipled timestamp must be YYYY-MM-DD HH:MM:SS");
    format!(
        "DR {} 360 00000090 SYSTEM IPLED AT {:02}.{:02}.{:02} ON {:02}/{:02}/{}",
        host,
        ts.time.hour,
        ts.time.minute,
        ts.time.second,
        ts.date.month,
        ts.date.day,
        ts.date.year
    )
}

// ---------------------------------------------------------------------------
// EventBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for [`EventRecord`] fixtures fed straight to the reconciler.
pub struct EventBuilder {
    event_type: EventType,
    at: Option<Timestamp>,
    log_id: u64,
    log_name: String,
}

impl EventBuilder {
    pub fn new(event_type: EventType) -> Self {
        Self {
            event_type,
            at: None,
            log_id: 1,
            log_name: "SYSLOG.D221005".to_string(),
        }
    }

    pub fn at(mut self, at: &str) -> Self {
        self.at = Some(at.parse().expect("event timestamp must be YYYY-MM-DD HH:MM:SS"));
        self
    }

    pub fn line(mut self, log_id: u64) -> Self {
        self.log_id = log_id;
        self
    }

    pub fn build(self) -> EventRecord {
        EventRecord {
            log_name: self.log_name,
            log_id: self.log_id,
            date: self.at.map(|ts| ts.date),
            time: self.at.map(|ts| ts.time),
            system_name: "SYSA".to_string(),
            event_type: self.event_type,
            error_flag: ErrorFlag::None,
            raw_line: String::new(),
        }
    }
}
