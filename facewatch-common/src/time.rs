//! Timestamp helpers
//!
//! All persisted timestamps use one fixed-width RFC 3339 format so that
//! lexicographic ordering (SQL MIN/MAX, ORDER BY on text columns) matches
//! chronological ordering.

use chrono::{DateTime, SecondsFormat, Utc};

/// Current UTC time in the canonical storage format, e.g.
/// `2026-08-07T14:03:21.512Z`
pub fn now_rfc3339() -> String {
    format_rfc3339(Utc::now())
}

/// Format an arbitrary instant in the canonical storage format
pub fn format_rfc3339(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn format_is_fixed_width_and_sortable() {
        let early = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        let late = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 6).unwrap();
        let a = format_rfc3339(early);
        let b = format_rfc3339(late);
        assert_eq!(a.len(), b.len());
        assert!(a < b);
    }
}
