//! ipld-core — SYSLOG IPL lifecycle extraction engine.
//!
//! This crate is synchronous and does no I/O beyond reading an optional
//! pattern file. It exposes each pipeline stage as a public module, plus
//! the shared types that flow between them.
//!
//! # Architecture
//!
//! ```text
//! raw line ──► Registry filter ──► Classifier ──► EventRecord ──► events CSV
//!                                      │               │
//!                                      │               ▼
//!                                      │          Reconciler ──► ResumeRecord ──► resume CSV
//!                                      ▼                                             │
//!                                IplNotification                                     ▼
//!                                                                             Outcome report
//! ```
//!
//! [`pass::FilePass`] runs the first three stages over one file.

pub mod classifier;
pub mod config;
pub mod csv;
pub mod datetime;
pub mod elapsed;
pub mod layout;
pub mod markers;
pub mod outcome;
pub mod pass;
pub mod reconciler;
pub mod registry;
pub mod types;

pub use classifier::{ClassifyContext, IplNotification, LineClassifier};
pub use datetime::{LogDate, LogTime, Timestamp, TimestampError};
pub use elapsed::{duration, Elapsed, ElapsedError};
pub use pass::{FilePass, FileReport};
pub use reconciler::{reconcile, TimelineAccumulator};
pub use registry::PatternRegistry;
pub use types::{ErrorFlag, EventRecord, EventType, LineDiagnostic, ResumeRecord};
