//! Fleet runs — many hosts at once.
//!
//! The manifest is a TOML file with one `[[lpar]]` table per host:
//!
//! ```toml
//! [[lpar]]
//! lpar     = "PROD1"
//! hostname = "SYSA"
//! dataset  = "SYSLOG"
//! logs     = "/zplatipld/logs/SYSA"
//! enable   = true
//! ```
//!
//! Each enabled host becomes a [`HostJob`] on the blocking pool. A
//! semaphore caps how many run at once. A failing host is recorded and does
//! not stop the others.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info};

use crate::host::{HostContext, HostJob, HostReport};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Lpar {
    pub lpar: String,
    pub hostname: String,
    /// Qualifier selecting the host's log files.
    #[serde(default)]
    pub dataset: String,
    pub logs: PathBuf,
    #[serde(default = "default_enable")]
    pub enable: bool,
}

fn default_enable() -> bool { true }

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FleetManifest {
    #[serde(default)]
    pub lpar: Vec<Lpar>,
}

impl FleetManifest {
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        config::Config::builder()
            .add_source(config::File::from(path).format(config::FileFormat::Toml))
            .build()?
            .try_deserialize()
            .map_err(Into::into)
    }

    pub fn enabled(&self) -> impl Iterator<Item = &Lpar> {
        self.lpar.iter().filter(|l| l.enable)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum HostStatus {
    Done(HostReport),
    Error { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostOutcome {
    pub lpar: String,
    pub hostname: String,
    #[serde(flatten)]
    pub status: HostStatus,
}

/// Run every enabled host of `manifest`, at most `workers` at a time.
/// Outcomes are returned in manifest order.
pub async fn run_fleet(
    manifest: &FleetManifest,
    ctx: Arc<HostContext>,
    output_dir: &Path,
    workers: usize,
) -> Vec<HostOutcome> {
    let permits = Arc::new(Semaphore::new(workers.max(1)));
    let mut tasks = JoinSet::new();
    let hosts: Vec<&Lpar> = manifest.enabled().collect();

    info!(hosts = hosts.len(), workers, "fleet run started");

    for (idx, lpar) in hosts.iter().enumerate() {
        let job = HostJob {
            hostname: lpar.hostname.clone(),
            qualifier: lpar.dataset.clone(),
            logs_dir: lpar.logs.clone(),
            output_dir: output_dir.join(&lpar.hostname),
        };
        let ctx = Arc::clone(&ctx);
        let permits = Arc::clone(&permits);

        tasks.spawn(async move {
            let status = match permits.acquire_owned().await {
                Ok(permit) => {
                    let run = tokio::task::spawn_blocking(move || {
                        let _permit = permit;
                        job.run(&ctx)
                    })
                    .await;
                    match run {
                        Ok(Ok(report)) => HostStatus::Done(report),
                        Ok(Err(e)) => HostStatus::Error {
                            message: format!("{e:#}"),
                        },
                        Err(e) => HostStatus::Error {
                            message: format!("host task failed: {e}"),
                        },
                    }
                }
                Err(e) => HostStatus::Error {
                    message: format!("worker pool closed: {e}"),
                },
            };
            (idx, status)
        });
    }

    let mut statuses: Vec<Option<HostStatus>> = vec![None; hosts.len()];
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((idx, status)) => statuses[idx] = Some(status),
            Err(e) => error!(error = %e, "fleet task panicked"),
        }
    }

    let outcomes: Vec<HostOutcome> = hosts
        .iter()
        .zip(statuses)
        .map(|(lpar, status)| {
            let status = status.unwrap_or_else(|| HostStatus::Error {
                message: "host task did not complete".to_string(),
            });
            if let HostStatus::Error { message } = &status {
                error!(host = %lpar.hostname, %message, "host failed");
            }
            HostOutcome {
                lpar: lpar.lpar.clone(),
                hostname: lpar.hostname.clone(),
                status,
            }
        })
        .collect();

    let done = outcomes
        .iter()
        .filter(|o| matches!(o.status, HostStatus::Done(_)))
        .count();
    info!(done, failed = outcomes.len() - done, "fleet run complete");
    outcomes
}
