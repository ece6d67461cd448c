//! Subcommand implementations for the `ipld` binary.
//!
//! Each command writes its result to the given writer so the binary and the
//! tests drive the same code.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context};
use ipld_core::config::Config;
use ipld_core::markers::{lifecycle_groups, ERROR_MARKERS};
use ipld_core::outcome::{DoneRow, IngestReport, LastIplRow, PartialRow};
use ipld_core::{csv, duration, Timestamp};
use ipld_feeds::discover::resume_files;
use ipld_feeds::fleet::{run_fleet, FleetManifest, HostStatus};
use ipld_feeds::host::{HostContext, HostJob, HostReport};
use ipld_feeds::{InMemoryLog, LogFile, LogSource};
use tracing::{info, warn};

/// Output format of `ingest`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ReportFormat {
    #[default]
    Csv,
    Json,
}

// ---------------------------------------------------------------------------
// analyze
// ---------------------------------------------------------------------------

pub struct AnalyzeArgs {
    pub host: String,
    pub qualifier: String,
    pub logs: Option<PathBuf>,
    pub out: PathBuf,
    /// Explicit files; `-` reads stdin. Overrides discovery under `logs`.
    pub files: Vec<PathBuf>,
}

pub fn analyze(config: &Config, args: AnalyzeArgs, out: &mut impl Write) -> anyhow::Result<HostReport> {
    let ctx = HostContext::from_config(&config.analysis)?;
    let job = HostJob {
        hostname: args.host,
        qualifier: args.qualifier,
        logs_dir: args.logs.clone().unwrap_or_default(),
        output_dir: args.out,
    };

    let report = if args.files.is_empty() {
        if args.logs.is_none() {
            bail!("either --logs or at least one file is required");
        }
        job.run(&ctx)?
    } else {
        let sources = explicit_sources(&args.files)?;
        let output = job.process(&ctx, &sources)?;
        job.write(output)?
    };

    for file in &report.files {
        writeln!(
            out,
            "{}: {} lines, {} events, {} diagnostics",
            file.log_name, file.lines_read, file.events, file.diagnostics
        )?;
        if let Some(err) = &file.read_error {
            writeln!(out, "  unreadable: {err}")?;
        }
        if file.notifications_lost > 0 {
            writeln!(out, "  {} notification(s) not recorded", file.notifications_lost)?;
        }
    }
    writeln!(out, "events: {}", report.events_path.display())?;
    writeln!(out, "resume: {}", report.resume_path.display())?;
    Ok(report)
}

enum Source {
    File(LogFile),
    Stdin(InMemoryLog),
}

impl LogSource for Source {
    fn name(&self) -> &str {
        match self {
            Source::File(f) => f.name(),
            Source::Stdin(m) => m.name(),
        }
    }

    fn read_lines(&self) -> anyhow::Result<Vec<String>> {
        match self {
            Source::File(f) => f.read_lines(),
            Source::Stdin(m) => m.read_lines(),
        }
    }
}

fn explicit_sources(files: &[PathBuf]) -> anyhow::Result<Vec<Source>> {
    let mut sources = Vec::with_capacity(files.len());
    let mut stdin_used = false;
    for path in files {
        if path.as_os_str() == "-" {
            if stdin_used {
                bail!("stdin can only be given once");
            }
            stdin_used = true;
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("reading stdin")?;
            sources.push(Source::Stdin(InMemoryLog::from_text("STDIN", &text)));
        } else {
            if !path.is_file() {
                bail!("no such log file: {}", path.display());
            }
            sources.push(Source::File(LogFile::new(path)));
        }
    }
    Ok(sources)
}

// ---------------------------------------------------------------------------
// fleet
// ---------------------------------------------------------------------------

/// Returns the number of hosts that failed.
pub async fn fleet(
    config: &Config,
    manifest: &Path,
    out_dir: Option<PathBuf>,
    workers: Option<usize>,
    out: &mut impl Write,
) -> anyhow::Result<usize> {
    let manifest = FleetManifest::from_path(manifest)
        .with_context(|| format!("loading manifest {}", manifest.display()))?;
    let ctx = Arc::new(HostContext::from_config(&config.analysis)?);
    let out_dir = out_dir.unwrap_or_else(|| config.fleet.results_dir.clone());
    let workers = workers.unwrap_or(config.fleet.workers);

    let outcomes = run_fleet(&manifest, ctx, &out_dir, workers).await;
    let mut failed = 0;
    for outcome in &outcomes {
        if matches!(outcome.status, HostStatus::Error { .. }) {
            failed += 1;
        }
        writeln!(out, "{}", serde_json::to_string(outcome)?)?;
    }
    Ok(failed)
}

// ---------------------------------------------------------------------------
// ingest
// ---------------------------------------------------------------------------

pub fn ingest(results: &Path, format: ReportFormat, out: &mut impl Write) -> anyhow::Result<IngestReport> {
    let mut report = IngestReport::new();
    for path in resume_files(results)? {
        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        let (rows, rejected) = csv::read_resume(&contents);
        for (line, err) in rejected {
            warn!(file = %path.display(), line, error = %err, "resume row skipped");
        }
        report.extend(&rows);
    }
    info!(
        done = report.done.len(),
        fail = report.fail.len(),
        garbage = report.garbage.len(),
        last_ipl = report.last_ipl.len(),
        "ingest complete"
    );

    match format {
        ReportFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, &report)?;
            writeln!(out)?;
        }
        ReportFormat::Csv => write_report_csv(&report, out)?,
    }
    Ok(report)
}

const DONE_HEADER: &str = "sysname;ipl_date;log_dataset;shutdown_begin;shutdown_end;ipl_begin;\
ipl_end;pre_ipl;post_ipl;shutdown_duration;poweroff_duration;load_ipl;total_duration";
const PARTIAL_HEADER: &str =
    "sysname;log_dataset;shutdown_begin;shutdown_end;ipl_begin;ipl_end;pre_ipl;post_ipl";
const LAST_IPL_HEADER: &str = "sysname;log_dataset;last_ipl;last_ipl_date";

/// Four sections, each a `# name` line, a header and its rows, separated by
/// a blank line.
fn write_report_csv(report: &IngestReport, out: &mut impl Write) -> anyhow::Result<()> {
    writeln!(out, "# done\n{DONE_HEADER}")?;
    for row in &report.done {
        writeln!(out, "{}", done_row(row))?;
    }
    writeln!(out, "\n# fail\n{PARTIAL_HEADER}")?;
    for row in &report.fail {
        writeln!(out, "{}", partial_row(row))?;
    }
    writeln!(out, "\n# garbage\n{PARTIAL_HEADER}")?;
    for row in &report.garbage {
        writeln!(out, "{}", partial_row(row))?;
    }
    writeln!(out, "\n# last_ipl\n{LAST_IPL_HEADER}")?;
    for row in &report.last_ipl {
        writeln!(out, "{}", last_ipl_row(row))?;
    }
    Ok(())
}

fn opt(ts: Option<Timestamp>) -> String {
    ts.map(|t| t.to_string()).unwrap_or_default()
}

fn done_row(row: &DoneRow) -> String {
    [
        row.sysname.clone(),
        row.ipl_date.clone(),
        row.log_dataset.clone(),
        row.shutdown_begin.to_string(),
        row.shutdown_end.to_string(),
        row.ipl_begin.to_string(),
        row.ipl_end.to_string(),
        opt(row.pre_ipl),
        opt(row.post_ipl),
        row.shutdown_duration.to_csv(),
        row.poweroff_duration.to_csv(),
        row.load_ipl.to_csv(),
        row.total_duration.to_csv(),
    ]
    .join(";")
}

fn partial_row(row: &PartialRow) -> String {
    [
        row.sysname.clone(),
        row.log_dataset.clone(),
        opt(row.shutdown_begin),
        opt(row.shutdown_end),
        opt(row.ipl_begin),
        opt(row.ipl_end),
        opt(row.pre_ipl),
        opt(row.post_ipl),
    ]
    .join(";")
}

fn last_ipl_row(row: &LastIplRow) -> String {
    format!(
        "{};{};{};{}",
        row.sysname, row.log_dataset, row.last_ipl, row.last_ipl_date
    )
}

// ---------------------------------------------------------------------------
// elapsed / markers
// ---------------------------------------------------------------------------

pub fn elapsed(start: &str, end: &str, csv_form: bool, out: &mut impl Write) -> anyhow::Result<()> {
    let start: Timestamp = start.parse()?;
    let end: Timestamp = end.parse()?;
    let span = duration(&start, &end)?;
    if csv_form {
        writeln!(out, "{}", span.to_csv())?;
    } else {
        writeln!(out, "{}", span.to_display())?;
    }
    Ok(())
}

pub fn markers(out: &mut impl Write) -> anyhow::Result<()> {
    for (event, markers) in lifecycle_groups() {
        let needles: Vec<String> = markers
            .iter()
            .map(|m| match m.gate {
                Some(gate) => format!(
                    "{} (+{}, then {})",
                    m.needle, gate.also_contains, gate.next_field
                ),
                None => m.needle.to_string(),
            })
            .collect();
        writeln!(out, "{:<16} {}", event.label(), needles.join(" | "))?;
    }
    let errors: Vec<&str> = ERROR_MARKERS.iter().map(|m| m.needle).collect();
    writeln!(out, "{:<16} {}", "ERROR", errors.join(" | "))?;
    Ok(())
}
