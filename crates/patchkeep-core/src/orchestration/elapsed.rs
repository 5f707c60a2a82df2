//! Compact human-readable durations for the final log line.

use std::time::Duration;

/// Printed when a run finishes in under a second.
pub const UNDER_A_SECOND: &str = "less than a second";

const UNITS: &[(u64, char)] = &[(86_400, 'd'), (3_600, 'h'), (60, 'm'), (1, 's')];

/// Format `elapsed` as e.g. `1h2m3s`.
///
/// Units with a zero amount are left out and sub-second precision is
/// dropped.
pub fn format_elapsed(elapsed: Duration) -> String {
    let mut remaining = elapsed.as_secs();
    let mut out = String::new();
    for &(unit_secs, suffix) in UNITS {
        let amount = remaining / unit_secs;
        remaining %= unit_secs;
        if amount > 0 {
            out.push_str(&amount.to_string());
            out.push(suffix);
        }
    }

    if out.is_empty() {
        UNDER_A_SECOND.to_string()
    } else {
        out
    }
}
