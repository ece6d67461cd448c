//! Append-only sink for `SYSTEM IPLED` notifications.
//!
//! One line per notification: `hostname date time`. Concurrent host runs
//! share one sink; writes are serialised so lines never interleave.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Context;
use ipld_core::IplNotification;
use tracing::debug;

#[derive(Debug)]
pub struct NotificationSink {
    path: PathBuf,
    lock: Mutex<()>,
}

impl NotificationSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append `notes` in order. The file and its parent directory are
    /// created on first use.
    pub fn append(&self, notes: &[IplNotification]) -> anyhow::Result<()> {
        if notes.is_empty() {
            return Ok(());
        }

        let _guard = self
            .lock
            .lock()
            .map_err(|_| anyhow::anyhow!("notification sink lock poisoned"))?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("opening {}", self.path.display()))?;

        let mut buf = String::new();
        for note in notes {
            buf.push_str(&note.to_line());
            buf.push('\n');
        }
        file.write_all(buf.as_bytes())?;

        debug!(path = %self.path.display(), count = notes.len(), "notifications appended");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ipld_core::Timestamp;
    use pretty_assertions::assert_eq;

    fn note(system: &str, at: &str) -> IplNotification {
        IplNotification {
            system: system.to_string(),
            timestamp: at.parse::<Timestamp>().unwrap(),
        }
    }

    #[test]
    fn appends_across_calls() {
        let dir = tempfile::tempdir().unwrap();
        let sink = NotificationSink::new(dir.path().join("ipl_analysis").join("system_ipled"));

        sink.append(&[note("SYSA", "2022-10-05 23:45:10")]).unwrap();
        sink.append(&[]).unwrap();
        sink.append(&[note("SYSB", "2022-10-06 01:02:03")]).unwrap();

        let text = std::fs::read_to_string(sink.path()).unwrap();
        assert_eq!(
            text,
            "SYSA 2022-10-05 23:45:10\nSYSB 2022-10-06 01:02:03\n"
        );
    }
}
