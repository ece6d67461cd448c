//! Configuration types for ipld.
//!
//! [`Config::load`] reads `~/.config/ipld/config.toml`, creating it with
//! hardcoded defaults if it does not yet exist. [`Config::from_path`] layers
//! an explicit file instead. [`Config::defaults`] returns the same defaults
//! without touching the filesystem (useful in tests).

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::classifier::LineClassifier;
use crate::registry::{PatternRegistry, RegistryError};

// ---------------------------------------------------------------------------
// Embedded defaults
// ---------------------------------------------------------------------------

const DEFAULT_CONFIG: &str = r#"
[analysis]
# patterns_file        = "/etc/ipld/ipl.patterns"
excluded_message_class = '^(?:\$HASP\d+|[A-Z]{3,5}\d{3,5}[A-Z])$'
notification_path      = "/tmp/ipl_analysis/system_ipled"

[fleet]
workers     = 60
results_dir = "/zplatipld/results"
"#;

// ---------------------------------------------------------------------------
// Public config types
// ---------------------------------------------------------------------------

/// Top-level application configuration, loaded from `~/.config/ipld/config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub fleet: FleetConfig,
}

/// `[analysis]` section of `config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    /// Marker list to use instead of the built-in one.
    #[serde(default)]
    pub patterns_file: Option<PathBuf>,
    /// Field-2 values matching this expression disqualify the secondary,
    /// tertiary and quaternary layouts.
    #[serde(default = "default_excluded_message_class")]
    pub excluded_message_class: String,
    /// Append-only file receiving one line per `SYSTEM IPLED` sighting.
    #[serde(default = "default_notification_path")]
    pub notification_path: PathBuf,
}

fn default_excluded_message_class() -> String { r"^(?:\$HASP\d+|[A-Z]{3,5}\d{3,5}[A-Z])$".to_string() }
fn default_notification_path() -> PathBuf { PathBuf::from("/tmp/ipl_analysis/system_ipled") }

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            patterns_file: None,
            excluded_message_class: default_excluded_message_class(),
            notification_path: default_notification_path(),
        }
    }
}

impl AnalysisConfig {
    /// The configured pattern registry, or the built-in one.
    pub fn registry(&self) -> Result<PatternRegistry, RegistryError> {
        match &self.patterns_file {
            Some(path) => PatternRegistry::from_file(path),
            None => Ok(PatternRegistry::builtin()),
        }
    }

    pub fn classifier(&self, host: &str) -> Result<LineClassifier, regex::Error> {
        LineClassifier::with_pattern(host, &self.excluded_message_class)
    }
}

/// `[fleet]` section of `config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct FleetConfig {
    /// Upper bound on hosts processed at once.
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Where per-host CSV files are written and later ingested from.
    #[serde(default = "default_results_dir")]
    pub results_dir: PathBuf,
}

fn default_workers() -> usize { 60 }
fn default_results_dir() -> PathBuf { PathBuf::from("/zplatipld/results") }

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            results_dir: default_results_dir(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::defaults()
    }
}

impl Config {
    /// Load from `~/.config/ipld/config.toml`, layered on top of the built-in
    /// defaults. Creates the file with defaults if it does not exist.
    pub fn load() -> anyhow::Result<Self> {
        let path = config_path();

        if !path.exists() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, DEFAULT_CONFIG.trim_start())?;
        }

        Self::from_path(&path)
    }

    /// Layer `path` on top of the built-in defaults. The file must exist.
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .add_source(config::File::from(path).required(true))
            .build()?
            .try_deserialize()
            .map_err(Into::into)
    }

    /// Return the built-in defaults without touching the filesystem.
    pub fn defaults() -> Self {
        config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .build()
            .expect("built-in default config must be valid TOML")
            .try_deserialize()
            .expect("built-in default config must deserialize correctly")
    }
}

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

fn config_path() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".to_string()))
                .join(".config")
        })
        .join("ipld")
        .join("config.toml")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
