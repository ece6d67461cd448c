//! Static SYSLOG corpora and engine setup used across harnesses.
//!
//! Every corpus is a `&'static [&'static str]` of lines for host `SYSA`.
//! Dates are ordinal: `22278` is 2022-10-05.

use ipld::{FilePass, FileReport, LineClassifier, PatternRegistry};

pub const HOST: &str = "SYSA";

pub const LOG_NAME: &str = "SYSLOG.D221005";

/// Same expression as the built-in `excluded_message_class` default.
pub const EXCLUDED_CLASS: &str = r"^(?:\$HASP\d+|[A-Z]{3,5}\d{3,5}[A-Z])$";

/// Full shutdown and IPL sequence, with two lines no marker matches.
pub const SCENARIO_A: &[&str] = &[
    "N 4000000 SYSA 22278 22:55:00.00 STC00001 00000090 $HASP100 BPXAS    ON STCINRDR",
    "N 4000000 SYSA 22278 23:00:00.00 STC00001 00000090 SHUTDOWN BEGIN",
    "N 4000000 SYSA 22278 23:10:00.00 STC00001 00000090 END OF SHUTDOWN",
    "N 4000000 SYSA 22278 23:11:30.00 JOB00042 00000090 IEF196I IGD104I SYS1.LINKLIB RETAINED",
    "N 4000000 SYSA 22278 23:12:00.00 *MASTER* 00000090 IEA371I SYS0.IPLPARM ON DEVICE 0A20 SELECTED FOR IPL PARAMETERS",
    "N 4000000 SYSA 22278 23:20:00.00 HZSPROC  00000090 HZS0103I HZSPROC INITIALIZATION COMPLETE",
];

/// Only the IPL display line.
pub const SCENARIO_B: &[&str] = &["DR SYSA 360 00000090 SYSTEM IPLED AT 23.45.10 ON 10/05/2022"];

/// End of shutdown stamped before its shutdown begin.
pub const SCENARIO_C: &[&str] = &[
    "N 4000000 SYSA 22278 23:00:00.00 STC00001 00000090 SHUTDOWN BEGIN",
    "N 4000000 SYSA 22278 22:50:00.00 STC00001 00000090 END OF SHUTDOWN",
];

/// Same as [`SCENARIO_C`] with the lines swapped, so the rejection happens
/// at reconciliation rather than during classification.
pub const SCENARIO_C_REORDERED: &[&str] = &[
    "N 4000000 SYSA 22278 22:50:00.00 STC00001 00000090 END OF SHUTDOWN",
    "N 4000000 SYSA 22278 23:00:00.00 STC00001 00000090 SHUTDOWN BEGIN",
];

/// Marker-bearing lines in every layout, plus one that fits none.
pub const CORPUS_LAYOUTS: &[&str] = &[
    "1 N 4000000 SYSA 22278 23:00:00.12 STC00001 SHUTDOWN BEGIN",
    "N 4000000 SYSA 22278 23:10:00.00 STC00001 00000090 IEE334I HALT EOD SUCCESSFUL",
    "NR 0000000 SYSB 22278 23:10:30.00 R=SYSA IEE334I HALT EOD SUCCESSFUL",
    "M SYSA 22278 231200 IEA371I SYS0.IPLPARM ON DEVICE 0A20",
    "D SYSA 22278 IEA370I MASTER CATALOG SELECTED",
    "D SYSA CONSOLE 22278 232000 HZS0103I HZSPROC INITIALIZATION COMPLETE",
    "SHUTDOWN BEGIN",
];

/// Built-in registry and a `SYSA` classifier.
pub fn engine() -> (PatternRegistry, LineClassifier) {
    let classifier =
        LineClassifier::with_pattern(HOST, EXCLUDED_CLASS).expect("excluded class must compile");
    (PatternRegistry::builtin(), classifier)
}

/// Run `lines` through a file pass named [`LOG_NAME`].
pub fn run_pass(lines: &[&str]) -> FileReport {
    let (registry, classifier) = engine();
    FilePass::new(&registry, &classifier).run(LOG_NAME, lines)
}
