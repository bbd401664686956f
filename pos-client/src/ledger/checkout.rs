//! Checkout transitions
//!
//! The billing sub-machine layered on a room:
//! `None → DRAFT → RUNNING → PAYING → PAID`, with `PAYING → RUNNING|DRAFT`
//! as the only backward edge and CANCELED as the terminal alternate for a
//! staff-cancelled session. PAID and CANCELED are immediately followed by
//! the full reset back to the neutral AVAILABLE slot.

use shared::models::{BillingStatus, Room};

use super::{RoomLedger, recompute};
use crate::error::{LedgerError, LedgerResult};

impl RoomLedger {
    /// Open checkout: freeze elapsed time and enter PAYING
    ///
    /// Rejected with an advisory warning when the room holds no session;
    /// no state change and no outbound call happen in that case.
    pub fn open_checkout(&mut self, room_id: i64, now_ms: i64) -> LedgerResult<&Room> {
        let room = self.room_mut(room_id)?;
        if !room.using() {
            return Err(LedgerError::RoomNotInUse(room_id));
        }
        if room.billing_status == Some(BillingStatus::Paying) {
            return Err(LedgerError::InvalidTransition {
                room_id,
                reason: "checkout already open".to_string(),
            });
        }

        room.end = Some(now_ms);
        room.billing_status = Some(BillingStatus::Paying);
        room.version += 1;
        recompute(room, now_ms);
        tracing::info!(room_id, total = room.total, "Checkout opened");
        Ok(room)
    }

    /// Undo the PAYING step and resume live accrual
    ///
    /// Clears the freeze point and any pending QR reference. The bill
    /// falls back to RUNNING (rule active) or DRAFT (orders only).
    pub fn cancel_checkout(&mut self, room_id: i64, now_ms: i64) -> LedgerResult<&Room> {
        let room = self.room_mut(room_id)?;
        if room.billing_status != Some(BillingStatus::Paying) {
            return Err(LedgerError::InvalidTransition {
                room_id,
                reason: "no checkout in progress".to_string(),
            });
        }

        room.end = None;
        room.qr_code_url = None;
        room.billing_status = Some(if room.price_rule.is_some() {
            BillingStatus::Running
        } else {
            BillingStatus::Draft
        });
        room.version += 1;
        recompute(room, now_ms);
        tracing::info!(room_id, "Checkout cancelled, accrual resumed");
        Ok(room)
    }

    /// Complete the payment and return the room to AVAILABLE
    ///
    /// Invoked only after the backend acknowledged the payment (manual
    /// cash/transfer confirmation) or a positive realtime payment status
    /// arrived for the room.
    pub fn finalize(&mut self, room_id: i64) -> LedgerResult<i64> {
        let room = self.room_mut(room_id)?;
        if room.billing_status != Some(BillingStatus::Paying) {
            return Err(LedgerError::InvalidTransition {
                room_id,
                reason: "room is not awaiting payment".to_string(),
            });
        }

        let paid_total = room.total;
        room.billing_status = Some(BillingStatus::Paid);
        room.version += 1;
        room.reset();
        tracing::info!(room_id, total = paid_total, "Payment finalized, room reset");
        Ok(paid_total)
    }

    /// Staff cancellation of the whole session (not just the payment step)
    pub fn cancel_session(&mut self, room_id: i64) -> LedgerResult<&Room> {
        let room = self.room_mut(room_id)?;
        if room.billing_status != Some(BillingStatus::Paying) {
            return Err(LedgerError::InvalidTransition {
                room_id,
                reason: "session can only be cancelled from checkout".to_string(),
            });
        }

        room.billing_status = Some(BillingStatus::Canceled);
        room.version += 1;
        room.reset();
        tracing::info!(room_id, "Session cancelled, room reset");
        Ok(room)
    }

    /// Attach the gateway checkout reference for a transfer payment
    pub fn set_qr_reference(&mut self, room_id: i64, reference: String) -> LedgerResult<&Room> {
        let room = self.room_mut(room_id)?;
        if room.billing_status != Some(BillingStatus::Paying) {
            return Err(LedgerError::InvalidTransition {
                room_id,
                reason: "room is not awaiting payment".to_string(),
            });
        }
        room.qr_code_url = Some(reference);
        room.version += 1;
        Ok(room)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{DayType, Dish, DishType, PriceRule, RoomStatus};

    fn make_rule(hourly_rate: i64) -> PriceRule {
        PriceRule {
            id: 10,
            name: "Box 2-3 người".to_string(),
            start_time: "14:00".to_string(),
            end_time: "18:00".to_string(),
            hourly_rate,
            day_type: DayType::Weekday,
            min_people: 2,
            max_people: 3,
        }
    }

    fn make_dish(price: i64) -> Dish {
        Dish {
            id: 1,
            name: "Trà chanh".to_string(),
            price,
            dish_type: DishType::Drink,
        }
    }

    fn running_ledger() -> RoomLedger {
        let mut ledger = RoomLedger::with_roster(3);
        ledger.activate_rule(3, &make_rule(90_000), 1_000).unwrap();
        ledger
    }

    #[test]
    fn checkout_on_idle_room_is_an_advisory_noop() {
        let mut ledger = RoomLedger::with_roster(3);
        let version = ledger.version(1);

        let err = ledger.open_checkout(1, 1_000).unwrap_err();

        assert_eq!(err, LedgerError::RoomNotInUse(1));
        assert!(err.is_advisory());
        assert_eq!(ledger.version(1), version);
        assert_eq!(ledger.room(1).unwrap().status, RoomStatus::Available);
    }

    #[test]
    fn open_checkout_freezes_elapsed_time() {
        let mut ledger = running_ledger();
        ledger.open_checkout(3, 92_000).unwrap();

        let room = ledger.room(3).unwrap();
        assert_eq!(room.billing_status, Some(BillingStatus::Paying));
        assert_eq!(room.end, Some(92_000));
        assert_eq!(room.minutes, 2.0);

        // A much later tick no longer advances the bill
        ledger.apply_tick(10_000_000);
        assert_eq!(ledger.room(3).unwrap().minutes, 2.0);
    }

    #[test]
    fn cancel_checkout_resumes_accrual_and_drops_qr() {
        let mut ledger = running_ledger();
        ledger.open_checkout(3, 92_000).unwrap();
        ledger.set_qr_reference(3, "https://pay.example/qr/abc".to_string()).unwrap();

        ledger.cancel_checkout(3, 92_000).unwrap();

        let room = ledger.room(3).unwrap();
        assert_eq!(room.billing_status, Some(BillingStatus::Running));
        assert_eq!(room.end, None);
        assert_eq!(room.qr_code_url, None);

        ledger.apply_tick(601_000);
        assert_eq!(ledger.room(3).unwrap().minutes, 10.0);
    }

    #[test]
    fn cancel_checkout_falls_back_to_draft_without_a_rule() {
        let mut ledger = RoomLedger::with_roster(3);
        ledger.add_dish(2, &make_dish(15_000), 1_000).unwrap();
        ledger.open_checkout(2, 2_000).unwrap();

        ledger.cancel_checkout(2, 2_000).unwrap();
        assert_eq!(
            ledger.room(2).unwrap().billing_status,
            Some(BillingStatus::Draft)
        );
    }

    #[test]
    fn finalize_resets_the_room_and_reports_the_total() {
        let mut ledger = running_ledger();
        ledger.add_dish(3, &make_dish(15_000), 1_000).unwrap();
        ledger.apply_tick(92_000);
        ledger.open_checkout(3, 92_000).unwrap();

        let paid = ledger.finalize(3).unwrap();

        assert_eq!(paid, 18_000);
        let room = ledger.room(3).unwrap();
        assert_eq!(room.status, RoomStatus::Available);
        assert_eq!(room.billing_status, None);
        assert_eq!(room.start, None);
        assert_eq!(room.end, None);
        assert!(room.orders.is_empty());
        assert!(room.price_rule.is_none());
        assert_eq!(room.total, 0);
    }

    #[test]
    fn finalize_outside_checkout_is_rejected() {
        let mut ledger = running_ledger();
        assert!(matches!(
            ledger.finalize(3),
            Err(LedgerError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn cancel_session_only_from_checkout() {
        let mut ledger = running_ledger();
        assert!(matches!(
            ledger.cancel_session(3),
            Err(LedgerError::InvalidTransition { .. })
        ));

        ledger.open_checkout(3, 92_000).unwrap();
        ledger.cancel_session(3).unwrap();
        assert_eq!(ledger.room(3).unwrap().status, RoomStatus::Available);
        assert_eq!(ledger.room(3).unwrap().billing_status, None);
    }

    #[test]
    fn double_open_checkout_is_rejected() {
        let mut ledger = running_ledger();
        ledger.open_checkout(3, 92_000).unwrap();
        assert!(matches!(
            ledger.open_checkout(3, 93_000),
            Err(LedgerError::InvalidTransition { .. })
        ));
        // Freeze point unchanged
        assert_eq!(ledger.room(3).unwrap().end, Some(92_000));
    }
}
