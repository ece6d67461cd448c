//! Per-host run.
//!
//! A [`HostJob`] processes every log file of one host and writes two files
//! into the output directory:
//!
//! - `<HOST>.<QUALIFIER>.events.CSV`, every event record of every file;
//! - `<HOST>.<QUALIFIER>.resume.CSV`, one resume row per file.
//!
//! `SYSTEM IPLED` notifications go to the shared [`NotificationSink`].
//! A job holds no state of its own, so any number may run at once against
//! the same [`HostContext`].

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use ipld_core::config::AnalysisConfig;
use ipld_core::{csv, EventRecord, FilePass, PatternRegistry, ResumeRecord};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::discover::host_logs;
use crate::notify::NotificationSink;
use crate::{LogFile, LogSource};

/// Shared, read-only inputs for every host run.
#[derive(Debug)]
pub struct HostContext {
    pub registry: PatternRegistry,
    pub analysis: AnalysisConfig,
    pub sink: Arc<NotificationSink>,
}

impl HostContext {
    /// Build from configuration: loads the pattern registry and opens the
    /// configured notification sink.
    pub fn from_config(analysis: &AnalysisConfig) -> anyhow::Result<Self> {
        let registry = analysis.registry().context("loading pattern registry")?;
        if registry.is_empty() {
            warn!("pattern registry is empty; no line will be classified");
        }
        Ok(Self {
            registry,
            analysis: analysis.clone(),
            sink: Arc::new(NotificationSink::new(&analysis.notification_path)),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostJob {
    pub hostname: String,
    /// Substring selecting this host's files; empty selects all.
    pub qualifier: String,
    pub logs_dir: PathBuf,
    pub output_dir: PathBuf,
}

/// What one host run produced in memory.
#[derive(Debug, Clone, Default)]
pub struct HostOutput {
    pub events: Vec<EventRecord>,
    pub resume: Vec<ResumeRecord>,
    pub files: Vec<FileSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileSummary {
    pub log_name: String,
    pub lines_read: u64,
    pub events: usize,
    pub diagnostics: usize,
    pub notifications: usize,
    /// Notifications the sink could not record.
    pub notifications_lost: usize,
    /// Why the file could not be read; its resume row is then all-absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_error: Option<String>,
}

/// Where a completed host run left its files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostReport {
    #[serde(skip_serializing)]
    pub hostname: String,
    pub events_path: PathBuf,
    pub resume_path: PathBuf,
    pub files: Vec<FileSummary>,
}

impl HostJob {
    pub fn events_path(&self) -> PathBuf {
        self.output_dir
            .join(format!("{}.events.CSV", self.file_stem()))
    }

    pub fn resume_path(&self) -> PathBuf {
        self.output_dir
            .join(format!("{}.resume.CSV", self.file_stem()))
    }

    fn file_stem(&self) -> String {
        let qualifier = if self.qualifier.is_empty() {
            "ALL"
        } else {
            self.qualifier.as_str()
        };
        format!("{}.{}", self.hostname.to_uppercase(), qualifier.to_uppercase())
    }

    /// Discover this host's files, process them, and write the CSV files.
    pub fn run(&self, ctx: &HostContext) -> anyhow::Result<HostReport> {
        let files: Vec<LogFile> = host_logs(&self.logs_dir, &self.qualifier)?;
        if files.is_empty() {
            warn!(host = %self.hostname, dir = %self.logs_dir.display(), "no log files matched");
        }
        let output = self.process(ctx, &files)?;
        self.write(output)
    }

    /// Run every source through a fresh file pass. Results stay in memory.
    pub fn process<S: LogSource>(
        &self,
        ctx: &HostContext,
        sources: &[S],
    ) -> anyhow::Result<HostOutput> {
        let classifier = ctx
            .analysis
            .classifier(&self.hostname)
            .context("compiling excluded message class")?;
        let pass = FilePass::new(&ctx.registry, &classifier);
        let mut output = HostOutput::default();

        for source in sources {
            let lines = match source.read_lines() {
                Ok(lines) => lines,
                Err(e) => {
                    let reason = format!("{e:#}");
                    warn!(host = %self.hostname, log = %source.name(), error = %reason, "log unreadable");
                    output.files.push(FileSummary {
                        log_name: source.name().to_string(),
                        lines_read: 0,
                        events: 0,
                        diagnostics: 0,
                        notifications: 0,
                        notifications_lost: 0,
                        read_error: Some(reason),
                    });
                    output
                        .resume
                        .push(ResumeRecord::empty(self.hostname.as_str(), source.name()));
                    continue;
                }
            };
            let report = pass.run(source.name(), &lines);

            for diag in &report.diagnostics {
                debug!(host = %self.hostname, log = %report.log_name, %diag, "diagnostic");
            }
            let notifications_lost = match ctx.sink.append(&report.notifications) {
                Ok(()) => 0,
                Err(e) => {
                    let reason = format!("{e:#}");
                    warn!(
                        host = %self.hostname,
                        log = %report.log_name,
                        sink = %ctx.sink.path().display(),
                        error = %reason,
                        "notifications not recorded"
                    );
                    report.notifications.len()
                }
            };

            info!(
                host = %self.hostname,
                log = %report.log_name,
                lines = report.stats.lines_read,
                events = report.events.len(),
                diagnostics = report.diagnostics.len(),
                "log processed"
            );

            output.files.push(FileSummary {
                log_name: report.log_name.clone(),
                lines_read: report.stats.lines_read,
                events: report.events.len(),
                diagnostics: report.diagnostics.len(),
                notifications: report.notifications.len(),
                notifications_lost,
                read_error: None,
            });
            output.events.extend(report.events);
            output.resume.push(report.resume);
        }

        Ok(output)
    }

    /// Write both CSV files for `output`.
    pub fn write(&self, output: HostOutput) -> anyhow::Result<HostReport> {
        std::fs::create_dir_all(&self.output_dir)
            .with_context(|| format!("creating {}", self.output_dir.display()))?;

        let events_path = self.events_path();
        csv::write_events(create(&events_path)?, &output.events)
            .with_context(|| format!("writing {}", events_path.display()))?;

        let resume_path = self.resume_path();
        csv::write_resume(create(&resume_path)?, &output.resume)
            .with_context(|| format!("writing {}", resume_path.display()))?;

        info!(host = %self.hostname, files = output.files.len(), "host complete");
        Ok(HostReport {
            hostname: self.hostname.clone(),
            events_path,
            resume_path,
            files: output.files,
        })
    }
}

fn create(path: &Path) -> anyhow::Result<BufWriter<File>> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    Ok(BufWriter::new(file))
}
