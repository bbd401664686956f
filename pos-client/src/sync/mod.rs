//! Outbound persistence
//!
//! Ledger mutations update local state synchronously; persistence is
//! fire-and-forget through a debounced dispatcher. Failures never roll
//! back locally - the recovery strategy is a full roster reload, because
//! local state may already reflect several subsequent edits.

mod debounce;

pub use debounce::Debouncer;

use shared::models::{
    BillStatusUpdate, BillSwap, DiscountUpdate, OrderLinesUpsert, PaymentCancel, PaymentFinalize,
    QrCreate, QrCreated, RuleAttach,
};

use crate::api::BackendApi;
use crate::error::ClientResult;

/// Discriminant used to key debounce coalescing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallKind {
    UpsertOrderLines,
    AttachRule,
    UpdateStatus,
    DeleteOrderLine,
    UpdateDiscount,
    SwapBill,
    FinalizePayment,
    CancelPayment,
    CreateQr,
}

/// One backend mutation, carrying its full payload
#[derive(Debug, Clone)]
pub enum OutboundCall {
    UpsertOrderLines(OrderLinesUpsert),
    AttachRule(RuleAttach),
    UpdateStatus(BillStatusUpdate),
    DeleteOrderLine { room_id: i64, dish_id: i64 },
    UpdateDiscount(DiscountUpdate),
    SwapBill(BillSwap),
    FinalizePayment(PaymentFinalize),
    CancelPayment(PaymentCancel),
    CreateQr(QrCreate),
}

impl OutboundCall {
    pub fn kind(&self) -> CallKind {
        match self {
            OutboundCall::UpsertOrderLines(_) => CallKind::UpsertOrderLines,
            OutboundCall::AttachRule(_) => CallKind::AttachRule,
            OutboundCall::UpdateStatus(_) => CallKind::UpdateStatus,
            OutboundCall::DeleteOrderLine { .. } => CallKind::DeleteOrderLine,
            OutboundCall::UpdateDiscount(_) => CallKind::UpdateDiscount,
            OutboundCall::SwapBill(_) => CallKind::SwapBill,
            OutboundCall::FinalizePayment(_) => CallKind::FinalizePayment,
            OutboundCall::CancelPayment(_) => CallKind::CancelPayment,
            OutboundCall::CreateQr(_) => CallKind::CreateQr,
        }
    }

    /// Room the call targets (swap keys on the source room)
    pub fn room_id(&self) -> i64 {
        match self {
            OutboundCall::UpsertOrderLines(p) => p.room_id,
            OutboundCall::AttachRule(p) => p.room_id,
            OutboundCall::UpdateStatus(p) => p.room_id,
            OutboundCall::DeleteOrderLine { room_id, .. } => *room_id,
            OutboundCall::UpdateDiscount(p) => p.room_id,
            OutboundCall::SwapBill(p) => p.from_room_id,
            OutboundCall::FinalizePayment(p) => p.room_id,
            OutboundCall::CancelPayment(p) => p.room_id,
            OutboundCall::CreateQr(p) => p.room_id,
        }
    }

    /// Execute against the backend; only QR creation returns a payload
    pub async fn execute(&self, api: &dyn BackendApi) -> ClientResult<Option<QrCreated>> {
        match self {
            OutboundCall::UpsertOrderLines(p) => api.upsert_order_lines(p).await.map(|_| None),
            OutboundCall::AttachRule(p) => api.attach_rule(p).await.map(|_| None),
            OutboundCall::UpdateStatus(p) => api.update_bill_status(p).await.map(|_| None),
            OutboundCall::DeleteOrderLine { room_id, dish_id } => {
                api.delete_order_line(*room_id, *dish_id).await.map(|_| None)
            }
            OutboundCall::UpdateDiscount(p) => api.update_discount(p).await.map(|_| None),
            OutboundCall::SwapBill(p) => api.swap_bill(p).await.map(|_| None),
            OutboundCall::FinalizePayment(p) => api.finalize_payment(p).await.map(|_| None),
            OutboundCall::CancelPayment(p) => api.cancel_payment(p).await.map(|_| None),
            OutboundCall::CreateQr(p) => api.create_payment_qr(p).await.map(Some),
        }
    }
}

/// A queued outbound call plus the room version captured at enqueue time
#[derive(Debug, Clone)]
pub struct SyncJob {
    /// Correlation id for tracing a job through coalescing and dispatch
    pub id: uuid::Uuid,
    pub call: OutboundCall,
    pub version: u64,
}

impl SyncJob {
    pub fn new(call: OutboundCall, version: u64) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            call,
            version,
        }
    }
}

/// Completion report handed back to the service loop
#[derive(Debug)]
pub struct SyncOutcome {
    pub kind: CallKind,
    pub room_id: i64,
    /// Room version captured when the job was enqueued; mismatches against
    /// the live room mark the outcome stale
    pub version: u64,
    pub result: ClientResult<Option<QrCreated>>,
}
