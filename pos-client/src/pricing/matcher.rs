//! Price rule schedule matching
//!
//! Resolves which catalog rules are active (and which come next) for a
//! civil wall-clock instant. Matching is only consulted when staff
//! activate a rule; once attached to a room the rate stays locked for the
//! life of the session.

use chrono::{Datelike, NaiveDateTime, NaiveTime, Timelike, Weekday};
use shared::models::{DayType, PriceRule};

/// Day type for a civil date: Saturday/Sunday bill at weekend rates
pub fn day_type(now: &NaiveDateTime) -> DayType {
    match now.weekday() {
        Weekday::Sat | Weekday::Sun => DayType::Weekend,
        _ => DayType::Weekday,
    }
}

fn parse_hhmm(value: &str) -> Option<NaiveTime> {
    match NaiveTime::parse_from_str(value, "%H:%M") {
        Ok(t) => Some(t),
        Err(_) => {
            tracing::warn!(time = %value, "Unparseable HH:MM in price rule, rule skipped");
            None
        }
    }
}

/// Whether a rule's time band contains `time`, interval `[start, end)`
///
/// `start > end` means the band wraps past midnight (e.g. 22:00-02:00):
/// active if `time >= start` or `time < end`.
fn band_contains(rule: &PriceRule, time: NaiveTime) -> bool {
    let (Some(start), Some(end)) = (parse_hhmm(&rule.start_time), parse_hhmm(&rule.end_time))
    else {
        return false;
    };

    if start <= end {
        time >= start && time < end
    } else {
        // Overnight band
        time >= start || time < end
    }
}

/// Rules active at `now`, across all capacity tiers
///
/// Staff pick the right tier for the seated group. A gap in the schedule
/// yields an empty list; callers must handle "no applicable rate"
/// explicitly rather than defaulting to zero.
pub fn active_rules<'a>(catalog: &'a [PriceRule], now: &NaiveDateTime) -> Vec<&'a PriceRule> {
    let today = day_type(now);
    let time = NaiveTime::from_hms_opt(now.hour(), now.minute(), 0)
        .unwrap_or_else(|| NaiveTime::from_hms_opt(0, 0, 0).unwrap());

    catalog
        .iter()
        .filter(|r| r.day_type == today && band_contains(r, time))
        .collect()
}

/// Upcoming same-day rules sorted by start time (display lookahead)
pub fn next_rules<'a>(catalog: &'a [PriceRule], now: &NaiveDateTime) -> Vec<&'a PriceRule> {
    let today = day_type(now);
    let time = NaiveTime::from_hms_opt(now.hour(), now.minute(), 0)
        .unwrap_or_else(|| NaiveTime::from_hms_opt(0, 0, 0).unwrap());

    let mut upcoming: Vec<&PriceRule> = catalog
        .iter()
        .filter(|r| {
            r.day_type == today && parse_hhmm(&r.start_time).is_some_and(|start| start > time)
        })
        .collect();
    upcoming.sort_by_key(|r| parse_hhmm(&r.start_time));
    upcoming
}
