//! Price Rule Model

use serde::{Deserialize, Serialize};

/// Day type enum
///
/// Saturday/Sunday sessions bill at weekend rates, everything else at
/// weekday rates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DayType {
    Weekday,
    Weekend,
}

/// Price rule entity
///
/// One time-banded hourly rate for a capacity tier. Immutable catalog
/// entry; staff pick the rule for the seated group and the rate stays
/// locked for the life of the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceRule {
    pub id: i64,
    pub name: String,
    /// Band start time-of-day ("HH:MM")
    pub start_time: String,
    /// Band end time-of-day ("HH:MM"); start > end means the band wraps
    /// past midnight
    pub end_time: String,
    /// Hourly rate in integer VND
    pub hourly_rate: i64,
    pub day_type: DayType,
    /// Capacity tier bounds (seated group size)
    pub min_people: i32,
    pub max_people: i32,
}

/// Rule copy attached to a room once activated
///
/// Carries the running time charge; `total` is recomputed on every clock
/// tick from elapsed minutes and the discount-adjusted rate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PriceRuleSnapshot {
    pub rule_id: i64,
    pub name: String,
    pub hourly_rate: i64,
    pub day_type: DayType,
    /// Accrued time charge in VND
    #[serde(default)]
    pub total: i64,
}

impl PriceRuleSnapshot {
    pub fn from_rule(rule: &PriceRule) -> Self {
        Self {
            rule_id: rule.id,
            name: rule.name.clone(),
            hourly_rate: rule.hourly_rate,
            day_type: rule.day_type,
            total: 0,
        }
    }
}
