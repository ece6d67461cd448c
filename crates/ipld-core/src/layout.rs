//! Column layouts — where the date and time live on a SYSLOG line.
//!
//! Source systems put the timestamp in different columns depending on the
//! message prefix, so the classifier tries an ordered list of layouts and
//! takes the first that fits. The order resolves ambiguous lines and must not
//! change.
//!
//! | Layout     | Condition                                       | Date | Time        |
//! |------------|-------------------------------------------------|------|-------------|
//! | Primary    | f4 is the host, f6 looks like a time            | f5   | f6          |
//! | Secondary  | f5 looks like a time, f2 not excluded, f3 host  | f4   | f5          |
//! | Tertiary   | f6 contains `R=`, f2 not excluded               | f4   | f5          |
//! | Quaternary | f3 and f4 numeric, f2 not excluded              | f3   | f4 (packed) |
//! | Quinary    | f3 numeric                                      | f3   | —           |
//! | Senary     | f4 and f5 numeric                               | f4   | f5 (packed) |
//!
//! Field numbers are 1-based, as in the SYSLOG column documentation.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

static TIME_LIKE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{1,2}:\d{2}:\d{2}(?:\.\d+)?$").expect("time-like pattern is valid")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutKind {
    Primary,
    Secondary,
    Tertiary,
    Quaternary,
    Quinary,
    Senary,
}

/// Where the timestamp fields of one line were found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldLayout<'a> {
    pub kind: LayoutKind,
    /// Ordinal date token.
    pub date: &'a str,
    /// Colon or packed time token; `None` when the layout carries no time.
    pub time: Option<&'a str>,
    /// System-name column, when the layout has one.
    pub system: Option<&'a str>,
}

/// Per-run inputs the layout tests need.
#[derive(Debug, Clone, Copy)]
pub struct LayoutContext<'a> {
    pub host: &'a str,
    pub excluded: &'a Regex,
}

impl LayoutContext<'_> {
    fn is_host(&self, field: Option<&str>) -> bool {
        field.is_some_and(|f| f.eq_ignore_ascii_case(self.host))
    }

    fn not_excluded(&self, field: Option<&str>) -> bool {
        field.is_some_and(|f| !self.excluded.is_match(f))
    }
}

impl LayoutKind {
    /// Test order.
    pub const ALL: [LayoutKind; 6] = [
        LayoutKind::Primary,
        LayoutKind::Secondary,
        LayoutKind::Tertiary,
        LayoutKind::Quaternary,
        LayoutKind::Quinary,
        LayoutKind::Senary,
    ];

    pub fn try_match<'a>(
        self,
        fields: &[&'a str],
        ctx: &LayoutContext<'_>,
    ) -> Option<FieldLayout<'a>> {
        let f = |n: usize| fields.get(n - 1).copied();

        let (date, time, system) = match self {
            LayoutKind::Primary => {
                if !(ctx.is_host(f(4)) && is_time_like(f(6))) {
                    return None;
                }
                (f(5)?, f(6), f(4))
            }
            LayoutKind::Secondary => {
                if !(is_time_like(f(5)) && ctx.not_excluded(f(2)) && ctx.is_host(f(3))) {
                    return None;
                }
                (f(4)?, f(5), f(3))
            }
            LayoutKind::Tertiary => {
                if !(f(6).is_some_and(|t| t.contains("R=")) && ctx.not_excluded(f(2))) {
                    return None;
                }
                (f(4)?, f(5), f(3))
            }
            LayoutKind::Quaternary => {
                if !(is_numeric(f(3)) && is_numeric(f(4)) && ctx.not_excluded(f(2))) {
                    return None;
                }
                (f(3)?, f(4), None)
            }
            LayoutKind::Quinary => {
                if !is_numeric(f(3)) {
                    return None;
                }
                (f(3)?, None, None)
            }
            LayoutKind::Senary => {
                if !(is_numeric(f(4)) && is_numeric(f(5))) {
                    return None;
                }
                (f(4)?, f(5), None)
            }
        };

        Some(FieldLayout {
            kind: self,
            date,
            time,
            system,
        })
    }
}

/// First layout that fits `fields`, or `None` for an unclassifiable line.
pub fn detect_layout<'a>(fields: &[&'a str], ctx: &LayoutContext<'_>) -> Option<FieldLayout<'a>> {
    LayoutKind::ALL
        .into_iter()
        .find_map(|kind| kind.try_match(fields, ctx))
}

fn is_time_like(field: Option<&str>) -> bool {
    field.is_some_and(|f| TIME_LIKE.is_match(f))
}

fn is_numeric(field: Option<&str>) -> bool {
    field.is_some_and(|f| !f.is_empty() && f.bytes().all(|b| b.is_ascii_digit()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn excluded() -> Regex {
        Regex::new(r"^(?:\$HASP\d+|[A-Z]{3,5}\d{3,5}[A-Z])$").unwrap()
    }

    fn detect(line: &str) -> Option<(LayoutKind, String, Option<String>)> {
        let re = excluded();
        let ctx = LayoutContext {
            host: "SYSA",
            excluded: &re,
        };
        let fields: Vec<&str> = line.split_whitespace().collect();
        detect_layout(&fields, &ctx)
            .map(|l| (l.kind, l.date.to_string(), l.time.map(str::to_string)))
    }

    #[rstest]
    #[case::primary(
        "1 N 4000000 SYSA 22278 23:00:00.12 STC1 SHUTDOWN BEGIN",
        LayoutKind::Primary, "22278", Some("23:00:00.12")
    )]
    #[case::secondary(
        "N 4000000 SYSA 22278 23:00:00.12 STC1 00000090 SHUTDOWN BEGIN",
        LayoutKind::Secondary, "22278", Some("23:00:00.12")
    )]
    #[case::tertiary(
        "NR 0000000 SYSB 22278 23:00:00.12 R=SYSA IEE334I HALT EOD SUCCESSFUL",
        LayoutKind::Tertiary, "22278", Some("23:00:00.12")
    )]
    #[case::quaternary(
        "M SYSA 22278 230000 IEA371I SYS1.PARMLIB",
        LayoutKind::Quaternary, "22278", Some("230000")
    )]
    #[case::quinary(
        "D SYSA 22278 IEA371I SYS1.PARMLIB",
        LayoutKind::Quinary, "22278", None
    )]
    #[case::senary(
        "D SYSA CONSOLE 22278 230000 HZS0103I",
        LayoutKind::Senary, "22278", Some("230000")
    )]
    fn layouts(
        #[case] line: &str,
        #[case] kind: LayoutKind,
        #[case] date: &str,
        #[case] time: Option<&str>,
    ) {
        assert_eq!(
            detect(line),
            Some((kind, date.to_string(), time.map(str::to_string)))
        );
    }

    #[test]
    fn secondary_needs_host_in_field_three() {
        // Other host, no R= in f6: falls to no layout.
        assert_eq!(
            detect("N 4000000 SYSB 22278 23:00:00.12 STC1 00000090 SHUTDOWN BEGIN"),
            None
        );
    }

    #[test]
    fn excluded_message_class_blocks_secondary() {
        // f2 is a message id, so the line is a shifted message body.
        assert_eq!(
            detect("N IEE334I SYSA 22278 23:00:00.12 HALT EOD SUCCESSFUL"),
            None
        );
    }

    #[test]
    fn host_match_ignores_case() {
        assert!(matches!(
            detect("N 4000000 sysa 22278 23:00:00.12 STC1 00000090 X"),
            Some((LayoutKind::Secondary, _, _))
        ));
    }

    #[test]
    fn empty_line_has_no_layout() {
        assert_eq!(detect(""), None);
    }

    proptest::proptest! {
        #[test]
        fn detected_tokens_come_from_the_line(
            fields in proptest::collection::vec("[A-Z0-9:.=]{1,8}", 0..10)
        ) {
            let re = excluded();
            let ctx = LayoutContext { host: "SYSA", excluded: &re };
            let refs: Vec<&str> = fields.iter().map(String::as_str).collect();
            if let Some(layout) = detect_layout(&refs, &ctx) {
                proptest::prop_assert!(refs.contains(&layout.date));
                if let Some(time) = layout.time {
                    proptest::prop_assert!(refs.contains(&time));
                }
            }
        }
    }
}
