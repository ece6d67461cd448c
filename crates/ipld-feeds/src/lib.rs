//! ipld-feeds — log sources and run orchestration for ipld.
//!
//! A [`LogSource`] yields the raw lines of one SYSLOG extract. [`host`] runs
//! every source of one host through [`ipld_core::FilePass`] and writes the
//! host's CSV files; [`fleet`] fans that out across a manifest of hosts with
//! a bounded number of concurrent runs.

pub mod discover;
pub mod fleet;
pub mod host;
pub mod notify;

use std::path::{Path, PathBuf};

use anyhow::Context;

/// Trait implemented by each log source.
pub trait LogSource: Send + Sync {
    /// Dataset name recorded as `log_name` / `log_dataset`.
    fn name(&self) -> &str;

    fn read_lines(&self) -> anyhow::Result<Vec<String>>;
}

/// `;` separates CSV columns, so it cannot appear in a dataset name.
fn dataset_name(raw: &str) -> String {
    raw.replace(';', "_")
}

impl<T: LogSource + ?Sized> LogSource for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn read_lines(&self) -> anyhow::Result<Vec<String>> {
        (**self).read_lines()
    }
}

/// A SYSLOG extract on disk. Bytes that are not UTF-8 are replaced, not
/// rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFile {
    name: String,
    path: PathBuf,
}

impl LogFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self {
            name: dataset_name(&name),
            path,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LogSource for LogFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn read_lines(&self) -> anyhow::Result<Vec<String>> {
        let bytes = std::fs::read(&self.path)
            .with_context(|| format!("reading {}", self.path.display()))?;
        Ok(String::from_utf8_lossy(&bytes)
            .lines()
            .map(str::to_string)
            .collect())
    }
}

/// Lines already in memory, e.g. read from stdin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InMemoryLog {
    name: String,
    lines: Vec<String>,
}

impl InMemoryLog {
    pub fn new(name: impl Into<String>, lines: Vec<String>) -> Self {
        let name: String = name.into();
        Self {
            name: dataset_name(&name),
            lines,
        }
    }

    pub fn from_text(name: impl Into<String>, text: &str) -> Self {
        Self::new(name, text.lines().map(str::to_string).collect())
    }
}

impl LogSource for InMemoryLog {
    fn name(&self) -> &str {
        &self.name
    }

    fn read_lines(&self) -> anyhow::Result<Vec<String>> {
        Ok(self.lines.clone())
    }
}
