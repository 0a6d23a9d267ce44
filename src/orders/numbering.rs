//! Per-day order numbering
//!
//! Orders carry a day-scoped sequence starting at 1 each local calendar
//! day, persisted as the composite `(day_stamp, order_number)` so numbers
//! stay unique across days even though the bare sequence resets. The
//! human-facing receipt form is `YYMMDD-NNN`.

use chrono::{DateTime, Datelike, Local};

/// Day stamp for the given local time, `YYMMDD`.
pub fn day_stamp(now: DateTime<Local>) -> String {
    now.format("%y%m%d").to_string()
}

/// Day stamp as the numeric counter key, `yymmdd` as an integer.
pub fn day_key(now: DateTime<Local>) -> u64 {
    let year = u64::from(now.year() as u32 % 100);
    year * 10_000 + u64::from(now.month()) * 100 + u64::from(now.day())
}

/// Human-facing composite order number, zero-padded to 3 digits.
pub fn receipt_number(day_stamp: &str, sequence: u32) -> String {
    format!("{day_stamp}-{sequence:03}")
}
