//! Backend API client
//!
//! The HTTP collaborator that persists bills, serves the catalogs and
//! brokers payment-gateway QR creation. [`BackendApi`] is the seam the
//! rest of the client programs against; [`HttpBackendClient`] is the
//! reqwest implementation.

mod http;

pub use http::HttpBackendClient;

use async_trait::async_trait;
use shared::models::{
    BillStatusUpdate, BillSwap, DiscountUpdate, Dish, OrderLinesUpsert, PaymentCancel,
    PaymentFinalize, PriceRule, QrCreate, QrCreated, RoomBill, RuleAttach,
};

use crate::error::ClientResult;

/// Backend HTTP surface consumed by the client core
#[async_trait]
pub trait BackendApi: Send + Sync {
    /// Fetch the room roster with each room's active bill, if any
    async fn fetch_rooms(&self) -> ClientResult<Vec<RoomBill>>;

    /// Fetch the price-rule catalog
    async fn fetch_price_rules(&self) -> ClientResult<Vec<PriceRule>>;

    /// Fetch the dish catalog
    async fn fetch_dishes(&self) -> ClientResult<Vec<Dish>>;

    /// Replace a room's active bill's order lines
    async fn upsert_order_lines(&self, payload: &OrderLinesUpsert) -> ClientResult<()>;

    /// Attach a price rule to a room's bill
    async fn attach_rule(&self, payload: &RuleAttach) -> ClientResult<()>;

    /// Update a bill's billing status
    async fn update_bill_status(&self, payload: &BillStatusUpdate) -> ClientResult<()>;

    /// Delete a single order line from a bill
    async fn delete_order_line(&self, room_id: i64, dish_id: i64) -> ClientResult<()>;

    /// Apply or clear a discount on a bill
    async fn update_discount(&self, payload: &DiscountUpdate) -> ClientResult<()>;

    /// Move the active bill between two rooms
    async fn swap_bill(&self, payload: &BillSwap) -> ClientResult<()>;

    /// Finalize a room's payment (idempotent server-side)
    async fn finalize_payment(&self, payload: &PaymentFinalize) -> ClientResult<()>;

    /// Cancel an in-progress payment
    async fn cancel_payment(&self, payload: &PaymentCancel) -> ClientResult<()>;

    /// Create a transfer-payment QR through the gateway
    async fn create_payment_qr(&self, payload: &QrCreate) -> ClientResult<QrCreated>;
}
