//! Domain-specific assertion macros for ipld harnesses.
//!
//! These add context-rich failure messages that make it clear *which* line
//! or resume column went wrong, instead of dumping two whole structs.

// ---------------------------------------------------------------------------
// Event assertions
// ---------------------------------------------------------------------------

/// Assert that an `EventRecord` carries the expected event type.
///
/// ```rust
/// assert_event!(report.events[0], EventType::ShutdownBegin);
/// ```
#[macro_export]
macro_rules! assert_event {
    ($record:expr, $event:expr) => {{
        let record: &ipld::EventRecord = &$record;
        let expected: ipld::EventType = $event;
        if record.event_type != expected {
            panic!(
                "assert_event! failed at line {}:\n  expected: {}\n  actual:   {}\n  raw: {:?}",
                record.log_id, expected, record.event_type, record.raw_line
            );
        }
    }};
}

/// Assert the rendered timestamp of an `EventRecord`.
///
/// ```rust
/// assert_event_at!(record, "2022-10-05 23:00:00");
/// ```
#[macro_export]
macro_rules! assert_event_at {
    ($record:expr, $at:expr) => {{
        let record: &ipld::EventRecord = &$record;
        let expected: &str = $at;
        match record.timestamp() {
            Some(ts) if ts.to_string() == expected => {}
            other => panic!(
                "assert_event_at! failed at line {}:\n  expected: {:?}\n  actual:   {:?}\n  raw: {:?}",
                record.log_id,
                expected,
                other.map(|t| t.to_string()),
                record.raw_line
            ),
        }
    }};
}

// ---------------------------------------------------------------------------
// Resume assertions
// ---------------------------------------------------------------------------

/// Assert one elapsed column of a `ResumeRecord` in its CSV form, or `None`
/// for an absent column.
///
/// ```rust
/// assert_interval!(resume, elapsed_ipl, Some("00:08:00"));
/// assert_interval!(resume, total_elapsed, None);
/// ```
#[macro_export]
macro_rules! assert_interval {
    ($resume:expr, $field:ident, $expected:expr) => {{
        let resume: &ipld::ResumeRecord = &$resume;
        let expected: Option<&str> = $expected;
        let actual: Option<String> = resume.$field.map(|e| e.to_csv());
        if actual.as_deref() != expected {
            panic!(
                "assert_interval! failed for {}:\n  expected: {:?}\n  actual:   {:?}\n  dataset: {}",
                stringify!($field),
                expected,
                actual,
                resume.log_dataset
            );
        }
    }};
}

/// Assert one timestamp column of a `ResumeRecord`, or `None` for absent.
#[macro_export]
macro_rules! assert_slot {
    ($resume:expr, $field:ident, $expected:expr) => {{
        let resume: &ipld::ResumeRecord = &$resume;
        let expected: Option<&str> = $expected;
        let actual: Option<String> = resume.$field.map(|t| t.to_string());
        if actual.as_deref() != expected {
            panic!(
                "assert_slot! failed for {}:\n  expected: {:?}\n  actual:   {:?}\n  dataset: {}",
                stringify!($field),
                expected,
                actual,
                resume.log_dataset
            );
        }
    }};
}

// ---------------------------------------------------------------------------
// Diagnostic assertions
// ---------------------------------------------------------------------------

/// Assert that at least one diagnostic matches a pattern.
///
/// ```rust
/// assert_diagnostic!(report.diagnostics, LineDiagnostic::UnclassifiableLine { log_id: 7 });
/// ```
#[macro_export]
macro_rules! assert_diagnostic {
    ($diagnostics:expr, $pattern:pat) => {{
        let diagnostics: &[ipld::LineDiagnostic] = &$diagnostics;
        if !diagnostics.iter().any(|d| matches!(d, $pattern)) {
            panic!(
                "assert_diagnostic! failed: no diagnostic matches {}\n  found: {:#?}",
                stringify!($pattern),
                diagnostics
            );
        }
    }};
}
