//! Pattern registry — the marker list that decides which raw lines are worth
//! classifying.
//!
//! The pattern file holds one marker substring per line. Blank lines and lines
//! starting with `#` are skipped. All markers are compiled into one regex
//! alternation so a line is tested once. An empty registry matches nothing.

use std::path::Path;

use regex::Regex;
use thiserror::Error;

/// Built-in pattern list, used when no `patterns_file` is configured.
pub const DEFAULT_PATTERNS: &str = include_str!("patterns/default.patterns");

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("cannot read pattern file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot compile pattern registry: {0}")]
    InvalidPattern(#[from] regex::Error),
}

#[derive(Debug, Clone)]
pub struct PatternRegistry {
    markers: Vec<String>,
    filter: Option<Regex>,
}

impl PatternRegistry {
    /// Build from an ordered list of marker lines.
    pub fn from_lines<I, S>(lines: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut markers: Vec<String> = Vec::new();
        for line in lines {
            let marker = line.as_ref().trim();
            if marker.is_empty() || marker.starts_with('#') {
                continue;
            }
            if !markers.iter().any(|m| m == marker) {
                markers.push(marker.to_string());
            }
        }

        let filter = if markers.is_empty() {
            None
        } else {
            let alternation = markers
                .iter()
                .map(|m| regex::escape(m))
                .collect::<Vec<_>>()
                .join("|");
            Some(Regex::new(&alternation)?)
        };

        Ok(Self { markers, filter })
    }

    /// Parse the contents of a pattern file.
    pub fn parse(contents: &str) -> Result<Self, RegistryError> {
        Self::from_lines(contents.lines())
    }

    pub fn from_file(path: &Path) -> Result<Self, RegistryError> {
        let contents = std::fs::read_to_string(path).map_err(|source| RegistryError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&contents)
    }

    /// The registry shipped with the binary.
    pub fn builtin() -> Self {
        Self::parse(DEFAULT_PATTERNS).expect("built-in pattern list must compile")
    }

    /// Does `line` contain any marker? Always false for an empty registry.
    #[inline]
    pub fn is_match(&self, line: &str) -> bool {
        self.filter.as_ref().is_some_and(|re| re.is_match(line))
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn markers(&self) -> &[String] {
        &self.markers
    }
}
