//! Time/price arithmetic
//!
//! All rounding here rounds UP: partial minutes bill as a full minute and
//! prices round up to the next whole VND. Revenue-rounding policy, not a
//! display convenience.

/// Sentinel returned when no billable time has accrued yet
///
/// Returned for clock skew, a not-yet-started session, or a tick arriving
/// before the start registers. Callers must treat it as "no time has
/// accrued", never as an error and never as zero.
pub const NOT_YET_BILLABLE: f64 = 0.001;

/// Whether an `elapsed_minutes` result represents real accrued time
pub fn is_billable(minutes: f64) -> bool {
    minutes >= 1.0
}

/// Billed minutes between two Unix-millis timestamps
///
/// `end_ms <= start_ms` (or either unset) yields [`NOT_YET_BILLABLE`];
/// otherwise the duration rounds up to the next whole minute.
pub fn elapsed_minutes(start_ms: i64, end_ms: i64) -> f64 {
    if start_ms <= 0 || end_ms <= 0 {
        return NOT_YET_BILLABLE;
    }
    if end_ms <= start_ms {
        return NOT_YET_BILLABLE;
    }
    let diff_ms = (end_ms - start_ms) as f64;
    (diff_ms / 60_000.0).ceil()
}

/// Display hours for a minute count, rounded up at 3-decimal precision
pub fn hours_from_minutes(minutes: f64) -> f64 {
    if minutes <= 0.0 {
        return NOT_YET_BILLABLE;
    }
    (minutes / 60.0 * 1000.0).ceil() / 1000.0
}

/// Time charge in VND for a minute count at an hourly rate
///
/// Rounds up to the nearest currency unit. Non-billable minutes or a
/// non-positive rate charge nothing.
pub fn price_for_minutes(minutes: f64, hourly_rate: i64) -> i64 {
    if !is_billable(minutes) || hourly_rate <= 0 {
        return 0;
    }
    (minutes / 60.0 * hourly_rate as f64).ceil() as i64
}
