//! RoomLedger - roster ownership and session transitions
//!
//! # Transition flow
//!
//! ```text
//! command(room_id, ...)
//!     ├─ 1. Look up the room
//!     ├─ 2. Validate the transition (advisory rejection on misuse)
//!     ├─ 3. Mutate
//!     ├─ 4. Bump the room version
//!     └─ 5. recompute(room, now)
//! ```
//!
//! The version counter only moves on commanded mutations; the periodic
//! tick recomputes derived fields without bumping it, so in-flight
//! backend responses are not invalidated by the clock.

use shared::models::{BillingStatus, Dish, OrderLine, PriceRule, PriceRuleSnapshot, Room, RoomStatus};

use super::recompute;
use crate::error::{LedgerError, LedgerResult};

/// Owned room roster with exclusive-access mutation methods
///
/// The sole write path for billing state. All methods are synchronous;
/// persistence happens elsewhere and resyncs through [`RoomLedger::replace_all`].
pub struct RoomLedger {
    rooms: Vec<Room>,
}

impl RoomLedger {
    pub fn new(rooms: Vec<Room>) -> Self {
        Self { rooms }
    }

    /// Fixed roster of `count` empty boxes named "BOX 1".."BOX n"
    pub fn with_roster(count: usize) -> Self {
        let rooms = (1..=count as i64)
            .map(|id| Room::new(id, format!("BOX {id}")))
            .collect();
        Self::new(rooms)
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn room(&self, room_id: i64) -> LedgerResult<&Room> {
        self.rooms
            .iter()
            .find(|r| r.id == room_id)
            .ok_or(LedgerError::RoomNotFound(room_id))
    }

    pub(crate) fn room_mut(&mut self, room_id: i64) -> LedgerResult<&mut Room> {
        self.rooms
            .iter_mut()
            .find(|r| r.id == room_id)
            .ok_or(LedgerError::RoomNotFound(room_id))
    }

    /// Current version counter for a room
    pub fn version(&self, room_id: i64) -> u64 {
        self.room(room_id).map(|r| r.version).unwrap_or(0)
    }

    /// Periodic recompute driven by the authoritative clock tick
    pub fn apply_tick(&mut self, now_ms: i64) {
        for room in self.rooms.iter_mut().filter(|r| r.using()) {
            recompute(room, now_ms);
        }
    }

    /// Activate (or switch) the hourly rate for a room
    ///
    /// Sets the session start only on first activation; switching tiers
    /// mid-session keeps `start` and reprices the elapsed minutes at the
    /// new rate on recompute.
    pub fn activate_rule(
        &mut self,
        room_id: i64,
        rule: &PriceRule,
        now_ms: i64,
    ) -> LedgerResult<&Room> {
        let room = self.room_mut(room_id)?;
        if room.status == RoomStatus::Maintenance {
            return Err(LedgerError::RoomInMaintenance(room_id));
        }
        if room.billing_status == Some(BillingStatus::Paying) {
            return Err(LedgerError::InvalidTransition {
                room_id,
                reason: "checkout in progress".to_string(),
            });
        }

        room.status = RoomStatus::Occupied;
        room.billing_status = Some(BillingStatus::Running);
        if room.start.is_none() {
            room.start = Some(now_ms);
        }
        room.price_rule = Some(PriceRuleSnapshot::from_rule(rule));
        room.version += 1;
        recompute(room, now_ms);
        tracing::info!(room_id, rule_id = rule.id, "Price rule activated");
        Ok(room)
    }

    /// Add one unit of a dish to a room's order
    ///
    /// The same dish increments the existing line instead of creating a
    /// duplicate. First attachment occupies the room as a DRAFT bill.
    pub fn add_dish(&mut self, room_id: i64, dish: &Dish, now_ms: i64) -> LedgerResult<&Room> {
        let room = self.room_mut(room_id)?;
        if room.status == RoomStatus::Maintenance {
            return Err(LedgerError::RoomInMaintenance(room_id));
        }

        match room.order_line_mut(dish.id) {
            Some(line) => {
                let next = line.quantity + 1;
                line.set_quantity(next);
            }
            None => {
                room.orders
                    .push(OrderLine::new(dish.id, dish.name.clone(), dish.price, 1));
            }
        }

        room.status = RoomStatus::Occupied;
        if room.billing_status.is_none() {
            room.billing_status = Some(if room.price_rule.is_some() {
                BillingStatus::Running
            } else {
                BillingStatus::Draft
            });
        }
        room.version += 1;
        recompute(room, now_ms);
        Ok(room)
    }

    /// Set an order line's quantity; 0 removes the line entirely
    ///
    /// Negative quantities and unknown lines are ignored without touching
    /// state (bad input is dropped silently, not surfaced).
    pub fn set_line_quantity(
        &mut self,
        room_id: i64,
        dish_id: i64,
        quantity: i32,
        now_ms: i64,
    ) -> LedgerResult<&Room> {
        if quantity < 0 {
            return self.room(room_id);
        }
        let room = self.room_mut(room_id)?;
        if room.order_line(dish_id).is_none() {
            return Ok(room);
        }

        if quantity == 0 {
            room.orders.retain(|o| o.dish_id != dish_id);
        } else if let Some(line) = room.order_line_mut(dish_id) {
            line.set_quantity(quantity);
        }

        room.version += 1;
        if room.has_session_content() {
            recompute(room, now_ms);
        } else {
            // Last line gone and no rule attached: the session is empty
            room.reset();
        }
        Ok(room)
    }

    /// Remove an order line outright
    pub fn remove_line(&mut self, room_id: i64, dish_id: i64, now_ms: i64) -> LedgerResult<&Room> {
        self.set_line_quantity(room_id, dish_id, 0, now_ms)
    }

    /// Apply a discount to the room's hourly rate
    pub fn apply_discount(
        &mut self,
        room_id: i64,
        discount_type: shared::models::DiscountType,
        value: f64,
        now_ms: i64,
    ) -> LedgerResult<&Room> {
        let room = self.room_mut(room_id)?;
        if room.price_rule.is_none() {
            return Err(LedgerError::NoActiveRule(room_id));
        }
        room.discount_type = Some(discount_type);
        room.discount_value = Some(value);
        room.version += 1;
        recompute(room, now_ms);
        Ok(room)
    }

    /// Clear the room's discount and reprice at the undiscounted rate
    pub fn clear_discount(&mut self, room_id: i64, now_ms: i64) -> LedgerResult<&Room> {
        let room = self.room_mut(room_id)?;
        if room.price_rule.is_none() {
            return Err(LedgerError::NoActiveRule(room_id));
        }
        room.discount_type = None;
        room.discount_value = None;
        room.version += 1;
        recompute(room, now_ms);
        Ok(room)
    }

    /// Exchange the entire billing state between two rooms
    ///
    /// Used when a party is relocated mid-session. Room identities (id,
    /// name) stay fixed; everything billing-relevant moves.
    pub fn swap_rooms(&mut self, room_a: i64, room_b: i64) -> LedgerResult<()> {
        if room_a == room_b {
            return Err(LedgerError::InvalidTransition {
                room_id: room_a,
                reason: "cannot swap a room with itself".to_string(),
            });
        }
        // Resolve both before mutating either
        let idx_a = self
            .rooms
            .iter()
            .position(|r| r.id == room_a)
            .ok_or(LedgerError::RoomNotFound(room_a))?;
        let idx_b = self
            .rooms
            .iter()
            .position(|r| r.id == room_b)
            .ok_or(LedgerError::RoomNotFound(room_b))?;
        let (lo, hi) = if idx_a < idx_b { (idx_a, idx_b) } else { (idx_b, idx_a) };
        let (head, tail) = self.rooms.split_at_mut(hi);
        let a = &mut head[lo];
        let b = &mut tail[0];

        std::mem::swap(&mut a.status, &mut b.status);
        std::mem::swap(&mut a.billing_status, &mut b.billing_status);
        std::mem::swap(&mut a.start, &mut b.start);
        std::mem::swap(&mut a.end, &mut b.end);
        std::mem::swap(&mut a.minutes, &mut b.minutes);
        std::mem::swap(&mut a.price_rule, &mut b.price_rule);
        std::mem::swap(&mut a.orders, &mut b.orders);
        std::mem::swap(&mut a.discount_type, &mut b.discount_type);
        std::mem::swap(&mut a.discount_value, &mut b.discount_value);
        std::mem::swap(&mut a.total, &mut b.total);
        std::mem::swap(&mut a.qr_code_url, &mut b.qr_code_url);
        a.version += 1;
        b.version += 1;
        tracing::info!(from = room_a, to = room_b, "Rooms swapped");
        Ok(())
    }

    /// Replace the roster wholesale from a backend reload
    ///
    /// Versions carry forward monotonically so responses dispatched
    /// before the reload are recognized as stale afterwards.
    pub fn replace_all(&mut self, mut incoming: Vec<Room>, now_ms: i64) {
        for room in incoming.iter_mut() {
            let prior = self.rooms.iter().find(|r| r.id == room.id);
            room.version = prior.map(|r| r.version + 1).unwrap_or(1);
            recompute(room, now_ms);
        }
        self.rooms = incoming;
        tracing::info!(rooms = self.rooms.len(), "Roster replaced from backend");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{DayType, DiscountType, DishType};

    fn make_rule(id: i64, hourly_rate: i64) -> PriceRule {
        PriceRule {
            id,
            name: "Box 2-3 người".to_string(),
            start_time: "14:00".to_string(),
            end_time: "18:00".to_string(),
            hourly_rate,
            day_type: DayType::Weekday,
            min_people: 2,
            max_people: 3,
        }
    }

    fn make_dish(id: i64, price: i64) -> Dish {
        Dish {
            id,
            name: format!("Dish {id}"),
            price,
            dish_type: DishType::Drink,
        }
    }

    #[test]
    fn activating_a_rule_occupies_and_starts_the_session() {
        let mut ledger = RoomLedger::with_roster(3);
        ledger.activate_rule(1, &make_rule(10, 90_000), 1_000).unwrap();

        let room = ledger.room(1).unwrap();
        assert!(room.using());
        assert_eq!(room.billing_status, Some(BillingStatus::Running));
        assert_eq!(room.start, Some(1_000));
        assert_eq!(room.price_rule.as_ref().unwrap().rule_id, 10);
    }

    #[test]
    fn switching_tiers_keeps_the_original_start() {
        let mut ledger = RoomLedger::with_roster(3);
        ledger.activate_rule(1, &make_rule(10, 90_000), 1_000).unwrap();
        ledger.activate_rule(1, &make_rule(11, 120_000), 600_000).unwrap();

        let room = ledger.room(1).unwrap();
        assert_eq!(room.start, Some(1_000));
        assert_eq!(room.price_rule.as_ref().unwrap().rule_id, 11);
        // Elapsed minutes reprice at the new rate: 10 min at 120,000/hr
        assert_eq!(room.price_rule.as_ref().unwrap().total, 20_000);
    }

    #[test]
    fn adding_the_same_dish_twice_increments_quantity() {
        let mut ledger = RoomLedger::with_roster(3);
        let dish = make_dish(1, 15_000);
        ledger.add_dish(2, &dish, 1_000).unwrap();
        ledger.add_dish(2, &dish, 1_000).unwrap();

        let room = ledger.room(2).unwrap();
        assert_eq!(room.orders.len(), 1);
        assert_eq!(room.orders[0].quantity, 2);
        assert_eq!(room.orders[0].total, 30_000);
        assert_eq!(room.billing_status, Some(BillingStatus::Draft));
        assert!(room.using());
    }

    #[test]
    fn zero_quantity_removes_the_line_and_frees_the_room() {
        let mut ledger = RoomLedger::with_roster(3);
        ledger.add_dish(2, &make_dish(1, 15_000), 1_000).unwrap();
        ledger.set_line_quantity(2, 1, 0, 1_000).unwrap();

        let room = ledger.room(2).unwrap();
        assert!(room.orders.is_empty());
        assert_eq!(room.status, RoomStatus::Available);
        assert_eq!(room.billing_status, None);
    }

    #[test]
    fn removal_with_active_rule_keeps_the_room_occupied() {
        let mut ledger = RoomLedger::with_roster(3);
        ledger.activate_rule(2, &make_rule(10, 90_000), 1_000).unwrap();
        ledger.add_dish(2, &make_dish(1, 15_000), 1_000).unwrap();
        ledger.remove_line(2, 1, 92_000).unwrap();

        let room = ledger.room(2).unwrap();
        assert!(room.orders.is_empty());
        assert!(room.using());
        assert_eq!(room.billing_status, Some(BillingStatus::Running));
    }

    #[test]
    fn negative_and_unknown_quantities_are_ignored() {
        let mut ledger = RoomLedger::with_roster(3);
        ledger.add_dish(2, &make_dish(1, 15_000), 1_000).unwrap();
        let version = ledger.version(2);

        ledger.set_line_quantity(2, 1, -4, 1_000).unwrap();
        ledger.set_line_quantity(2, 99, 5, 1_000).unwrap();

        let room = ledger.room(2).unwrap();
        assert_eq!(room.orders[0].quantity, 1);
        assert_eq!(room.version, version);
    }

    #[test]
    fn discount_requires_an_active_rule() {
        let mut ledger = RoomLedger::with_roster(3);
        let err = ledger
            .apply_discount(1, DiscountType::Percent, 50.0, 1_000)
            .unwrap_err();
        assert_eq!(err, LedgerError::NoActiveRule(1));
        assert!(err.is_advisory());
    }

    #[test]
    fn maintenance_rooms_reject_sessions() {
        let mut ledger = RoomLedger::with_roster(3);
        ledger.room_mut(1).unwrap().status = RoomStatus::Maintenance;

        assert_eq!(
            ledger.activate_rule(1, &make_rule(10, 90_000), 1_000).unwrap_err(),
            LedgerError::RoomInMaintenance(1)
        );
        assert_eq!(
            ledger.add_dish(1, &make_dish(1, 15_000), 1_000).unwrap_err(),
            LedgerError::RoomInMaintenance(1)
        );
    }

    #[test]
    fn swap_exchanges_billing_state_but_not_identity() {
        let mut ledger = RoomLedger::with_roster(3);
        ledger.activate_rule(1, &make_rule(10, 90_000), 1_000).unwrap();
        ledger.add_dish(1, &make_dish(1, 15_000), 1_000).unwrap();
        ledger.apply_tick(92_000);

        let total_before = ledger.room(1).unwrap().total;
        let orders_before = ledger.room(1).unwrap().orders.clone();

        ledger.swap_rooms(1, 3).unwrap();

        let one = ledger.room(1).unwrap();
        let three = ledger.room(3).unwrap();
        assert_eq!(one.name, "BOX 1");
        assert_eq!(three.name, "BOX 3");
        assert_eq!(one.status, RoomStatus::Available);
        assert!(one.orders.is_empty());
        assert!(three.using());
        assert_eq!(three.total, total_before);
        assert_eq!(three.orders, orders_before);
        assert_eq!(three.start, Some(1_000));
    }

    #[test]
    fn swap_with_self_is_rejected() {
        let mut ledger = RoomLedger::with_roster(3);
        assert!(matches!(
            ledger.swap_rooms(2, 2),
            Err(LedgerError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn tick_recomputes_without_bumping_versions() {
        let mut ledger = RoomLedger::with_roster(3);
        ledger.activate_rule(1, &make_rule(10, 90_000), 1_000).unwrap();
        let version = ledger.version(1);

        ledger.apply_tick(92_000);

        assert_eq!(ledger.room(1).unwrap().minutes, 2.0);
        assert_eq!(ledger.version(1), version);
    }

    #[test]
    fn replace_all_carries_versions_forward() {
        let mut ledger = RoomLedger::with_roster(2);
        ledger.activate_rule(1, &make_rule(10, 90_000), 1_000).unwrap();
        let old_version = ledger.version(1);

        let fresh = vec![Room::new(1, "BOX 1"), Room::new(2, "BOX 2")];
        ledger.replace_all(fresh, 92_000);

        assert_eq!(ledger.version(1), old_version + 1);
        assert_eq!(ledger.room(1).unwrap().status, RoomStatus::Available);
    }
}
