//! Semicolon-separated event and resume files.
//!
//! Both files start with a header row. Absent values are written as the
//! empty string. The raw line is the last event column and is written as-is.

use std::io::{self, Write};

use thiserror::Error;
use tracing::warn;

use crate::datetime::Timestamp;
use crate::elapsed::Elapsed;
use crate::types::{EventRecord, ResumeRecord};

pub const SEPARATOR: char = ';';

pub const EVENT_HEADER: &str = "log_name;log_id;date;time;system;type;error;msg";

pub const RESUME_HEADER: &str = "sysname;log_dataset;pre_ipl;shutdown_begin;shutdown_end;\
ipl_begin;ipl_end;post_ipl;last_ipl;elapsed_before_shutdown;elapsed_after_shutdown;\
elapsed_btn_shut_ipl;elapsed_ipl;elapsed_after_ipl;total_elapsed";

const RESUME_COLUMNS: usize = 15;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CsvError {
    #[error("resume row has {found} columns, expected 15")]
    ColumnCount { found: usize },
    #[error("resume row has an empty sysname")]
    MissingSystem,
}

pub fn event_row(record: &EventRecord) -> String {
    [
        record.log_name.clone(),
        record.log_id.to_string(),
        opt(record.date),
        opt(record.time),
        record.system_name.clone(),
        record.event_type.label().to_string(),
        record.error_flag.label().to_string(),
        record.raw_line.clone(),
    ]
    .join(";")
}

pub fn resume_row(resume: &ResumeRecord) -> String {
    [
        resume.system_name.clone(),
        resume.log_dataset.clone(),
        opt(resume.pre_ipl),
        opt(resume.shutdown_begin),
        opt(resume.shutdown_end),
        opt(resume.ipl_begin),
        opt(resume.ipl_end),
        opt(resume.post_ipl),
        opt(resume.last_ipl),
        opt(resume.elapsed_before_shutdown),
        opt(resume.elapsed_after_shutdown),
        opt(resume.elapsed_between_shutdown_and_ipl),
        opt(resume.elapsed_ipl),
        opt(resume.elapsed_after_ipl),
        opt(resume.total_elapsed),
    ]
    .join(";")
}

pub fn write_events<'a, W, I>(mut out: W, records: I) -> io::Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a EventRecord>,
{
    writeln!(out, "{EVENT_HEADER}")?;
    for record in records {
        writeln!(out, "{}", event_row(record))?;
    }
    out.flush()
}

pub fn write_resume<'a, W, I>(mut out: W, rows: I) -> io::Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a ResumeRecord>,
{
    writeln!(out, "{RESUME_HEADER}")?;
    for row in rows {
        writeln!(out, "{}", resume_row(row))?;
    }
    out.flush()
}

/// Parse one resume row. Timestamp or elapsed cells that do not parse are
/// read as absent; the outcome classifier treats them the same way.
pub fn parse_resume_row(line: &str) -> Result<ResumeRecord, CsvError> {
    let cells: Vec<&str> = line.trim_end_matches(['\r', '\n']).split(SEPARATOR).collect();
    if cells.len() != RESUME_COLUMNS {
        return Err(CsvError::ColumnCount { found: cells.len() });
    }
    let system_name = cells[0].trim();
    if system_name.is_empty() {
        return Err(CsvError::MissingSystem);
    }

    Ok(ResumeRecord {
        system_name: system_name.to_string(),
        log_dataset: cells[1].trim().to_string(),
        pre_ipl: timestamp_cell(cells[2]),
        shutdown_begin: timestamp_cell(cells[3]),
        shutdown_end: timestamp_cell(cells[4]),
        ipl_begin: timestamp_cell(cells[5]),
        ipl_end: timestamp_cell(cells[6]),
        post_ipl: timestamp_cell(cells[7]),
        last_ipl: timestamp_cell(cells[8]),
        elapsed_before_shutdown: elapsed_cell(cells[9]),
        elapsed_after_shutdown: elapsed_cell(cells[10]),
        elapsed_between_shutdown_and_ipl: elapsed_cell(cells[11]),
        elapsed_ipl: elapsed_cell(cells[12]),
        elapsed_after_ipl: elapsed_cell(cells[13]),
        total_elapsed: elapsed_cell(cells[14]),
    })
}

/// Read a whole resume file. The header row and blank lines are skipped;
/// rows that fail to parse are returned separately with their line number.
pub fn read_resume(contents: &str) -> (Vec<ResumeRecord>, Vec<(usize, CsvError)>) {
    let mut rows = Vec::new();
    let mut rejected = Vec::new();
    for (idx, line) in contents.lines().enumerate() {
        if line.trim().is_empty() || line.starts_with("sysname;") {
            continue;
        }
        match parse_resume_row(line) {
            Ok(row) => rows.push(row),
            Err(e) => rejected.push((idx + 1, e)),
        }
    }
    (rows, rejected)
}

fn opt<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn timestamp_cell(cell: &str) -> Option<Timestamp> {
    let cell = cell.trim();
    if cell.is_empty() {
        return None;
    }
    match cell.parse() {
        Ok(ts) => Some(ts),
        Err(e) => {
            warn!(%cell, error = %e, "unreadable timestamp cell");
            None
        }
    }
}

fn elapsed_cell(cell: &str) -> Option<Elapsed> {
    let cell = cell.trim();
    if cell.is_empty() {
        return None;
    }
    Elapsed::parse_csv(cell)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
