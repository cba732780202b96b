use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, TimeDelta};
use regex::Regex;

// ── Epoch-millisecond dates ──────────────────────────────────────────────────

/// Convert a Unix timestamp in milliseconds to the calendar date it falls on.
///
/// The conversion floors, so negative timestamps resolve to the correct
/// earlier day (`-1` ms is `1969-12-31`, not `1970-01-01`). Returns `None`
/// when the value lies outside chrono's representable range.
pub fn date_from_epoch_ms(ms: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp_millis(ms).map(|dt| dt.date_naive())
}

// ── "1h 10m 26s" durations ───────────────────────────────────────────────────

/// Hours, minutes and seconds in that order, every group optional, digits
/// glued to their unit letter, neighbouring groups separated by at most one
/// space.
const HMS_PATTERN: &str = r"^(?:(\d+)h ?)?(?:(\d+)m ?)?(?:(\d+)s)?$";

fn hms_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(HMS_PATTERN).expect("regex is valid"))
}

/// Parse a human-readable duration such as `"1h 10m 26s"`.
///
/// Accepted forms: any subset of the three groups in hour/minute/second
/// order (`"2h"`, `"10m 26s"`, `"1h26s"`) plus the empty string, which is
/// zero. Absent groups contribute zero. Returns `None` when the input does
/// not match the grammar or the total overflows.
///
/// # Examples
///
/// ```
/// use chrono::TimeDelta;
/// use lifelog_core::time_utils::parse_hms_duration;
///
/// assert_eq!(parse_hms_duration("1h 10m 26s"), Some(TimeDelta::seconds(4226)));
/// assert_eq!(parse_hms_duration(""), Some(TimeDelta::zero()));
/// assert_eq!(parse_hms_duration("ten minutes"), None);
/// ```
pub fn parse_hms_duration(s: &str) -> Option<TimeDelta> {
    let caps = hms_regex().captures(s)?;

    // Unmatched groups are zero; matched groups are all-digit by the pattern,
    // so a parse failure here can only mean the number does not fit in i64.
    let group = |i: usize| -> Option<i64> {
        match caps.get(i) {
            Some(m) => m.as_str().parse::<i64>().ok(),
            None => Some(0),
        }
    };

    let hours = group(1)?;
    let minutes = group(2)?;
    let seconds = group(3)?;

    let total = hours
        .checked_mul(3600)?
        .checked_add(minutes.checked_mul(60)?)?
        .checked_add(seconds)?;
    TimeDelta::try_seconds(total)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
