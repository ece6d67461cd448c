//! Marker table — which substrings put a line into which lifecycle category.
//!
//! Categories are kept in a compile-time ordered map keyed by their wire
//! label. Iteration order is test priority: the first category with a
//! matching marker wins. Adding a marker is a data change here, not a new
//! branch in the classifier.

use phf::phf_ordered_map;

use crate::types::EventType;

/// Substring that identifies the IPL-information display line.
pub const SYSTEM_IPLED: &str = "SYSTEM IPLED";

/// A single marker. Most markers are a bare substring; a gated marker also
/// needs a second substring somewhere on the line and a specific token right
/// after the marker itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Marker {
    pub needle: &'static str,
    pub gate: Option<Gate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gate {
    pub also_contains: &'static str,
    pub next_field: &'static str,
}

impl Marker {
    pub const fn plain(needle: &'static str) -> Self {
        Self { needle, gate: None }
    }

    pub const fn gated(
        needle: &'static str,
        also_contains: &'static str,
        next_field: &'static str,
    ) -> Self {
        Self {
            needle,
            gate: Some(Gate {
                also_contains,
                next_field,
            }),
        }
    }

    /// Test `line` (already split into `fields`) against this marker.
    pub fn matches(&self, line: &str, fields: &[&str]) -> bool {
        if !line.contains(self.needle) {
            return false;
        }
        let Some(gate) = self.gate else {
            return true;
        };
        line.contains(gate.also_contains)
            && fields
                .iter()
                .position(|f| *f == self.needle)
                .and_then(|i| fields.get(i + 1))
                .is_some_and(|next| *next == gate.next_field)
    }
}

/// Lifecycle categories in priority order.
pub static LIFECYCLE_MARKERS: phf::OrderedMap<&'static str, &'static [Marker]> = phf_ordered_map! {
    "SHUTDOWN_BEGIN" => &[
        Marker::plain("SHUTDOWN BEGIN"),
        Marker::plain("SHUTDOWN INITIATED"),
    ],
    "END_OF_SHUTDOWN" => &[
        Marker::plain("END OF SHUTDOWN"),
        Marker::plain("SHUTDOWN COMPLETE"),
        Marker::gated("IEE334I", "EOD", "HALT"),
    ],
    "IPL_BEGIN" => &[
        Marker::plain("IEA371I"),
        Marker::plain("IEA370I"),
    ],
    "IPL_END" => &[
        Marker::plain("HZS0103I"),
        Marker::plain("IPL COMPLETE"),
    ],
    "PRE_IPL" => &[
        Marker::plain("PRE-IPL"),
        Marker::plain("PRE IPL"),
    ],
    "POST_IPL" => &[
        Marker::plain("POST-IPL"),
        Marker::plain("POST IPL"),
    ],
};

/// Checked after every lifecycle category has failed to match.
pub static ERROR_MARKERS: &[Marker] = &[
    Marker::plain("ABEND"),
    Marker::plain("IEA911E"),
    Marker::plain("IEA995I"),
    Marker::plain("IXC402D"),
    Marker::plain("BPXI999"),
];

/// Lifecycle groups as `(category, markers)` in priority order.
pub fn lifecycle_groups() -> impl Iterator<Item = (EventType, &'static [Marker])> {
    LIFECYCLE_MARKERS
        .entries()
        .filter_map(|(label, markers)| EventType::from_label(label).map(|ty| (ty, *markers)))
}

pub fn is_error_line(line: &str, fields: &[&str]) -> bool {
    ERROR_MARKERS.iter().any(|m| m.matches(line, fields))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(line: &str) -> Vec<&str> {
        line.split_whitespace().collect()
    }

    #[test]
    fn table_order_is_priority_order() {
        let order: Vec<EventType> = lifecycle_groups().map(|(ty, _)| ty).collect();
        assert_eq!(
            order,
            vec![
                EventType::ShutdownBegin,
                EventType::EndOfShutdown,
                EventType::IplBegin,
                EventType::IplEnd,
                EventType::PreIpl,
                EventType::PostIpl,
            ]
        );
    }

    #[test]
    fn gated_marker_needs_both_conditions() {
        let marker = Marker::gated("IEE334I", "EOD", "HALT");

        let ok = "N 4000000 SYSA 22278 23:10:00.00 STC1 00000090 IEE334I HALT EOD SUCCESSFUL";
        assert!(marker.matches(ok, &fields(ok)));

        let no_eod = "N 4000000 SYSA 22278 23:10:00.00 STC1 00000090 IEE334I HALT NET";
        assert!(!marker.matches(no_eod, &fields(no_eod)));

        let wrong_field = "N 4000000 SYSA 22278 23:10:00.00 STC1 00000090 IEE334I EOD HALT";
        assert!(!marker.matches(wrong_field, &fields(wrong_field)));
    }

    #[test]
    fn error_markers_are_plain() {
        let line = "N 4000000 SYSA 22278 23:30:00.00 JOB1 00000090 IEA995I ABEND";
        assert!(is_error_line(line, &fields(line)));
        assert!(ERROR_MARKERS.iter().all(|m| m.gate.is_none()));
    }
}
