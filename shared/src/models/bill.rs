//! Bill wire payloads
//!
//! Request/response shapes for the backend's bill endpoints. The backend
//! keeps at most one active bill per room; every payload is keyed by room
//! id rather than a bill id.

use serde::{Deserialize, Serialize};

use super::{BillingStatus, DiscountType, OrderLine, PriceRuleSnapshot, RoomStatus};

/// Per-room bill record as returned by the roster endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomBill {
    pub room_id: i64,
    pub room_name: String,
    pub status: RoomStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_status: Option<BillingStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_rule: Option<PriceRuleSnapshot>,
    #[serde(default)]
    pub orders: Vec<OrderLine>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_type: Option<DiscountType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qr_code_url: Option<String>,
}

impl From<RoomBill> for super::Room {
    fn from(bill: RoomBill) -> Self {
        Self {
            id: bill.room_id,
            name: bill.room_name,
            status: bill.status,
            billing_status: bill.billing_status,
            start: bill.start,
            end: bill.end,
            minutes: 0.0,
            price_rule: bill.price_rule,
            orders: bill.orders,
            discount_type: bill.discount_type,
            discount_value: bill.discount_value,
            total: 0,
            qr_code_url: bill.qr_code_url,
            version: 0,
        }
    }
}

/// Replace a room's full order list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLinesUpsert {
    pub room_id: i64,
    pub orders: Vec<OrderLine>,
}

/// Attach a price rule to a room's bill
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleAttach {
    pub room_id: i64,
    pub rule_id: i64,
    /// Session start (Unix millis)
    pub start: i64,
}

/// Update a bill's billing status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillStatusUpdate {
    pub room_id: i64,
    pub billing_status: BillingStatus,
}

/// Apply or clear a discount on a bill
///
/// `discount_type == None` clears the discount.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscountUpdate {
    pub room_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_type: Option<DiscountType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_value: Option<f64>,
}

/// Move the active bill between two rooms
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillSwap {
    pub from_room_id: i64,
    pub to_room_id: i64,
}

/// Payment method enum
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Cash,
    Transfer,
}

/// Finalize a room's payment
///
/// Idempotent server-side: reissuing the same total for an already-paid
/// room must not double-charge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentFinalize {
    pub room_id: i64,
    pub total: i64,
    pub method: PaymentMethod,
}

/// Cancel an in-progress payment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentCancel {
    pub room_id: i64,
}

/// Create a transfer-payment QR through the gateway
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QrCreate {
    pub room_id: i64,
    pub amount: i64,
    #[serde(default)]
    pub cancel_url: String,
    #[serde(default)]
    pub return_url: String,
}

/// Gateway response carrying the checkout reference
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QrCreated {
    /// Checkout reference string embeddable as a QR payload
    pub qr_code: String,
}
