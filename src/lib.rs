//! ipld — IPL duration extraction from mainframe SYSLOG extracts.
//!
//! Reads SYSLOG extracts, classifies the lines that mark shutdown and IPL
//! milestones, and writes one events CSV and one resume CSV per host. This
//! crate re-exports the engine and the feed layer so that integration tests
//! can import them from one place.
//!
//! # Architecture
//!
//! ```text
//! LogSource ──► FilePass (registry ► classifier ► reconciler) ──► HostJob ──► CSV files
//!                     │                                              ▲
//!                     └──► NotificationSink              run_fleet ──┘
//! ```
//!
//! Per-file work is synchronous. Fleet runs put each host on the tokio
//! blocking pool behind a semaphore.

pub mod commands;

pub use ipld_core::*;
pub use ipld_feeds::{discover, fleet, host, notify, InMemoryLog, LogFile, LogSource};
