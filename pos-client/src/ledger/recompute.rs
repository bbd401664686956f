//! Derived-field recomputation
//!
//! The single place where a room's minutes, time charge and grand total
//! are derived. Invoked on every clock tick and at the end of every
//! mutating transition.

use shared::models::Room;

use crate::pricing::{discounted_rate, elapsed_minutes, is_billable, price_for_minutes};

/// Recompute `minutes`, `price_rule.total` and `total` for a room
///
/// `now_ms` is the authoritative clock value (normally the latest server
/// tick). While the room is in checkout, `end` freezes the computation
/// point instead of the live clock. Rooms without an active rule keep a
/// pure order total.
pub fn recompute(room: &mut Room, now_ms: i64) {
    let orders_total = room.orders_total();

    let Some(rule) = room.price_rule.as_mut() else {
        room.minutes = 0.0;
        room.total = orders_total;
        return;
    };

    let point = room.end.unwrap_or(now_ms);
    let minutes = elapsed_minutes(room.start.unwrap_or(0), point);
    room.minutes = minutes;

    let rate = discounted_rate(room.discount_type, room.discount_value, rule.hourly_rate);
    rule.total = if is_billable(minutes) {
        price_for_minutes(minutes, rate)
    } else {
        0
    };

    room.total = rule.total + orders_total;
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{DayType, DiscountType, OrderLine, PriceRuleSnapshot, Room, RoomStatus};

    fn running_room(start_ms: i64, hourly_rate: i64) -> Room {
        let mut room = Room::new(3, "BOX 3");
        room.status = RoomStatus::Occupied;
        room.start = Some(start_ms);
        room.price_rule = Some(PriceRuleSnapshot {
            rule_id: 1,
            name: "Box 2-3 người".to_string(),
            hourly_rate,
            day_type: DayType::Weekday,
            total: 0,
        });
        room
    }

    #[test]
    fn tick_prices_elapsed_minutes() {
        let mut room = running_room(1_000, 90_000);
        // 91 s elapsed: 2 billed minutes
        recompute(&mut room, 92_000);
        assert_eq!(room.minutes, 2.0);
        assert_eq!(room.price_rule.as_ref().unwrap().total, 3_000);
        assert_eq!(room.total, 3_000);
    }

    #[test]
    fn orders_add_on_top_of_time_charge() {
        let mut room = running_room(1_000, 90_000);
        room.orders.push(OrderLine::new(1, "Trà chanh", 15_000, 1));
        recompute(&mut room, 92_000);
        assert_eq!(room.total, 18_000);
    }

    #[test]
    fn frozen_end_wins_over_live_clock() {
        let mut room = running_room(1_000, 90_000);
        room.end = Some(92_000);
        recompute(&mut room, 10_000_000);
        assert_eq!(room.minutes, 2.0);
        assert_eq!(room.total, 3_000);
    }

    #[test]
    fn rule_less_room_totals_orders_only() {
        let mut room = Room::new(5, "BOX 5");
        room.status = RoomStatus::Occupied;
        room.orders.push(OrderLine::new(2, "Nước ngọt", 20_000, 2));
        recompute(&mut room, 92_000);
        assert_eq!(room.minutes, 0.0);
        assert_eq!(room.total, 40_000);
    }

    #[test]
    fn tick_before_start_charges_nothing() {
        let mut room = running_room(100_000, 90_000);
        recompute(&mut room, 50_000);
        assert!(!crate::pricing::is_billable(room.minutes));
        assert_eq!(room.total, 0);
    }

    #[test]
    fn discount_adjusts_rate_not_orders() {
        let mut room = running_room(1_000, 90_000);
        room.orders.push(OrderLine::new(1, "Trà chanh", 15_000, 1));
        room.discount_type = Some(DiscountType::Percent);
        room.discount_value = Some(50.0);
        // 2 minutes at 45,000/hr -> 1,500; orders untouched
        recompute(&mut room, 92_000);
        assert_eq!(room.price_rule.as_ref().unwrap().total, 1_500);
        assert_eq!(room.total, 16_500);
    }

    #[test]
    fn clearing_discount_restores_exact_pre_discount_total() {
        let mut room = running_room(1_000, 90_000);
        recompute(&mut room, 92_000);
        let before = room.price_rule.as_ref().unwrap().total;

        room.discount_type = Some(DiscountType::Vnd);
        room.discount_value = Some(30_000.0);
        recompute(&mut room, 92_000);
        assert_ne!(room.price_rule.as_ref().unwrap().total, before);

        room.discount_type = None;
        room.discount_value = None;
        recompute(&mut room, 92_000);
        assert_eq!(room.price_rule.as_ref().unwrap().total, before);
    }
}
