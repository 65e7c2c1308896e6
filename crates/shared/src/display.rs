//! Formatting helpers for presentation consumers. Pure string derivation
//! from committed records; nothing here touches reconciler state.

use chrono::{DateTime, Local, Utc};

/// Step count with thousands separators, e.g. `12345` -> `"12,345"`.
pub fn format_steps(steps: u64) -> String {
    let digits = steps.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Date and time halves of a record timestamp, rendered in local time the
/// way the dashboard table shows them ("Aug 28, 2026" / "02:03:07 PM").
pub fn format_timestamp(timestamp: DateTime<Utc>) -> (String, String) {
    let local = timestamp.with_timezone(&Local);
    (
        local.format("%b %-d, %Y").to_string(),
        local.format("%I:%M:%S %p").to_string(),
    )
}

/// Header clock line, e.g. "Friday, August 28, 2026, 02:03:07 PM".
pub fn format_wall_clock(now: DateTime<Local>) -> String {
    now.format("%A, %B %-d, %Y, %I:%M:%S %p").to_string()
}
