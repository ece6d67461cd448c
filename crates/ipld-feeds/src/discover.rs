//! Finding input files on disk.

use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::{debug, warn};

use crate::LogFile;

/// SYSLOG extracts of one host: regular files directly under `dir` whose
/// name contains `qualifier` (ASCII case-insensitive). An empty qualifier
/// selects every file. Sorted by name so runs are repeatable.
pub fn host_logs(dir: &Path, qualifier: &str) -> anyhow::Result<Vec<LogFile>> {
    let wanted = qualifier.to_ascii_uppercase();
    let mut found = Vec::new();

    for entry in std::fs::read_dir(dir).with_context(|| format!("listing {}", dir.display()))? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_ascii_uppercase();
        if name.contains(&wanted) {
            found.push(entry.path());
        }
    }

    found.sort();
    debug!(dir = %dir.display(), qualifier, files = found.len(), "host logs discovered");
    Ok(found.into_iter().map(LogFile::new).collect())
}

/// Resume files anywhere under `root`: names ending in `.CSV` that contain
/// `resume`. Unreadable subdirectories are skipped with a warning.
pub fn resume_files(root: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    let mut pending = vec![root.to_path_buf()];
    let mut first = true;

    while let Some(dir) = pending.pop() {
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if !first => {
                warn!(dir = %dir.display(), error = %e, "skipping unreadable directory");
                continue;
            }
            Err(e) => return Err(e).with_context(|| format!("listing {}", dir.display())),
        };
        first = false;

        for entry in entries {
            let entry = entry?;
            let path = entry.path();
            let file_type = entry.file_type()?;
            if file_type.is_dir() {
                pending.push(path);
            } else if file_type.is_file() && is_resume_name(&entry.file_name().to_string_lossy()) {
                found.push(path);
            }
        }
    }

    found.sort();
    Ok(found)
}

fn is_resume_name(name: &str) -> bool {
    name.ends_with(".CSV") && name.contains("resume")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn host_logs_filter_by_qualifier() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["SYSLOG.D221006", "SYSLOG.D221005", "OPERLOG.D221005"] {
            std::fs::write(dir.path().join(name), "").unwrap();
        }
        std::fs::create_dir(dir.path().join("SYSLOG.SUBDIR")).unwrap();

        let names: Vec<String> = host_logs(dir.path(), "syslog")
            .unwrap()
            .iter()
            .map(|f| f.path().file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["SYSLOG.D221005", "SYSLOG.D221006"]);

        assert_eq!(host_logs(dir.path(), "").unwrap().len(), 3);
    }

    #[test]
    fn resume_files_are_found_recursively() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("SYSA");
        std::fs::create_dir(&nested).unwrap();
        std::fs::write(nested.join("SYSA.SYSLOG.resume.CSV"), "").unwrap();
        std::fs::write(nested.join("SYSA.SYSLOG.events.CSV"), "").unwrap();
        std::fs::write(dir.path().join("old.resume.csv"), "").unwrap();

        let found = resume_files(dir.path()).unwrap();
        assert_eq!(found, vec![nested.join("SYSA.SYSLOG.resume.CSV")]);
    }

    #[test]
    fn missing_root_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(resume_files(&dir.path().join("nope")).is_err());
    }
}
