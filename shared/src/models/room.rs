//! Room Model
//!
//! One entry per physical karaoke box. Entries are created once for the
//! venue's fixed roster and never destroyed; they cycle
//! AVAILABLE → OCCUPIED → (PAYING) → AVAILABLE as sessions come and go.

use serde::{Deserialize, Serialize};

use super::PriceRuleSnapshot;

/// Room occupancy status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoomStatus {
    #[default]
    Available,
    Occupied,
    Maintenance,
}

/// Billing status of a room's active bill
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BillingStatus {
    /// Occupied with order lines only, no hourly rule yet
    Draft,
    /// Hourly rule active, elapsed time accruing
    Running,
    /// Checkout opened; elapsed time frozen at `end`
    Paying,
    /// Terminal; immediately followed by a full room reset
    Paid,
    /// Terminal alternate; staff cancelled the whole session
    Canceled,
}

/// Discount type enum
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscountType {
    /// Flat subtraction from the hourly rate, in VND
    Vnd,
    /// Proportional reduction of the hourly rate
    Percent,
}

/// One dish charged to a room's session
///
/// Name and unit price are snapshots taken when the line is created, so a
/// later catalog edit never reprices an open bill. Driving `quantity` to 0
/// removes the line entirely.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderLine {
    pub dish_id: i64,
    pub name: String,
    /// Unit price snapshot in VND
    pub unit_price: i64,
    pub quantity: i32,
    /// quantity × unit_price
    pub total: i64,
}

impl OrderLine {
    pub fn new(dish_id: i64, name: impl Into<String>, unit_price: i64, quantity: i32) -> Self {
        Self {
            dish_id,
            name: name.into(),
            unit_price,
            quantity,
            total: unit_price * quantity as i64,
        }
    }

    /// Set quantity and keep the line total consistent
    pub fn set_quantity(&mut self, quantity: i32) {
        self.quantity = quantity;
        self.total = self.unit_price * quantity as i64;
    }
}

/// Room entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub id: i64,
    pub name: String,
    pub status: RoomStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_status: Option<BillingStatus>,
    /// Session start (Unix millis); set once on first rule activation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<i64>,
    /// Checkout freeze point (Unix millis); set only while Paying
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<i64>,
    /// Billed minutes, derived on every tick
    #[serde(default)]
    pub minutes: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_rule: Option<PriceRuleSnapshot>,
    #[serde(default)]
    pub orders: Vec<OrderLine>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_type: Option<DiscountType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_value: Option<f64>,
    /// Grand total: time charge + order lines
    #[serde(default)]
    pub total: i64,
    /// Transfer-payment checkout reference, present only while Paying
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qr_code_url: Option<String>,
    /// Monotonic mutation counter used to discard stale outbound-call
    /// responses. Local bookkeeping, never sent over the wire.
    #[serde(skip)]
    pub version: u64,
}

impl Room {
    /// Create an idle room slot
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            status: RoomStatus::Available,
            billing_status: None,
            start: None,
            end: None,
            minutes: 0.0,
            price_rule: None,
            orders: Vec::new(),
            discount_type: None,
            discount_value: None,
            total: 0,
            qr_code_url: None,
            version: 0,
        }
    }

    /// Whether the room currently holds a billable session
    pub fn using(&self) -> bool {
        self.status == RoomStatus::Occupied
    }

    /// Whether anything is attached that justifies OCCUPIED status
    pub fn has_session_content(&self) -> bool {
        self.price_rule.is_some() || !self.orders.is_empty()
    }

    /// Sum of all order line totals
    pub fn orders_total(&self) -> i64 {
        self.orders.iter().map(|o| o.total).sum()
    }

    pub fn order_line(&self, dish_id: i64) -> Option<&OrderLine> {
        self.orders.iter().find(|o| o.dish_id == dish_id)
    }

    pub fn order_line_mut(&mut self, dish_id: i64) -> Option<&mut OrderLine> {
        self.orders.iter_mut().find(|o| o.dish_id == dish_id)
    }

    /// Full reset back to the neutral AVAILABLE slot
    ///
    /// Identity (id, name) and the version counter survive; everything
    /// session-related is cleared.
    pub fn reset(&mut self) {
        self.status = RoomStatus::Available;
        self.billing_status = None;
        self.start = None;
        self.end = None;
        self.minutes = 0.0;
        self.price_rule = None;
        self.orders.clear();
        self.discount_type = None;
        self.discount_value = None;
        self.total = 0;
        self.qr_code_url = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_line_total_tracks_quantity() {
        let mut line = OrderLine::new(1, "Trà chanh", 15_000, 1);
        assert_eq!(line.total, 15_000);
        line.set_quantity(3);
        assert_eq!(line.total, 45_000);
    }

    #[test]
    fn reset_clears_session_state_but_keeps_identity() {
        let mut room = Room::new(3, "BOX 3");
        room.status = RoomStatus::Occupied;
        room.billing_status = Some(BillingStatus::Running);
        room.start = Some(1_000);
        room.orders.push(OrderLine::new(1, "Nước ngọt", 20_000, 2));
        room.total = 40_000;
        room.version = 7;

        room.reset();

        assert_eq!(room.id, 3);
        assert_eq!(room.name, "BOX 3");
        assert_eq!(room.status, RoomStatus::Available);
        assert_eq!(room.billing_status, None);
        assert_eq!(room.start, None);
        assert!(room.orders.is_empty());
        assert_eq!(room.total, 0);
        assert_eq!(room.version, 7);
    }
}
