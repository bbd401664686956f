//! LedgerService - the single logical thread of control
//!
//! All billing mutations funnel through one `select!` loop consuming user
//! commands, realtime channel traffic and sync-dispatch outcomes. The
//! ledger mutates synchronously inside the loop; persistence rides the
//! debounced dispatcher and failures resync the roster wholesale.
//!
//! ```text
//! commands ──┐
//! realtime ──┼─► LedgerService ─► RoomLedger (sole write path)
//! outcomes ──┘         │
//!                      ├─► Debouncer ─► BackendApi
//!                      └─► broadcast<UiEvent> ─► presentation layer
//! ```

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc};

use shared::message::{ConnectionState, RealtimeMessage};
use shared::models::{
    BillStatusUpdate, BillSwap, BillingStatus, DiscountType, DiscountUpdate, Dish,
    OrderLinesUpsert, PaymentCancel, PaymentFinalize, PaymentMethod, PriceRule, QrCreate, Room,
};
use shared::util::now_millis;

use crate::api::BackendApi;
use crate::config::ClientConfig;
use crate::error::LedgerError;
use crate::events::UiEvent;
use crate::ledger::RoomLedger;
use crate::realtime::ChannelEvent;
use crate::sync::{CallKind, Debouncer, OutboundCall, SyncJob, SyncOutcome};

/// User action entering the service loop
#[derive(Debug, Clone)]
pub enum LedgerCommand {
    ActivateRule { room_id: i64, rule: PriceRule },
    AddDish { room_id: i64, dish: Dish },
    /// Raw text from the quantity input; bad input is dropped silently
    SetOrderQuantity { room_id: i64, dish_id: i64, input: String },
    RemoveOrderLine { room_id: i64, dish_id: i64 },
    /// Raw text from the discount input; bad input is dropped silently
    ApplyDiscount { room_id: i64, discount_type: DiscountType, input: String },
    ClearDiscount { room_id: i64 },
    OpenCheckout { room_id: i64 },
    CancelCheckout { room_id: i64 },
    ConfirmCashPayment { room_id: i64 },
    RequestTransferQr { room_id: i64 },
    ConfirmTransferPayment { room_id: i64 },
    CancelSession { room_id: i64 },
    SwapRooms { from_room_id: i64, to_room_id: i64 },
    /// Force a roster resync from the backend
    Reload,
}

/// Cloneable handle for the presentation layer
#[derive(Clone)]
pub struct LedgerHandle {
    command_tx: mpsc::Sender<LedgerCommand>,
    ui_tx: broadcast::Sender<UiEvent>,
}

impl LedgerHandle {
    pub async fn send(&self, command: LedgerCommand) {
        if self.command_tx.send(command).await.is_err() {
            tracing::error!("Ledger service gone, command dropped");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<UiEvent> {
        self.ui_tx.subscribe()
    }
}

/// The event loop owning the room ledger
pub struct LedgerService {
    ledger: RoomLedger,
    api: Arc<dyn BackendApi>,
    debouncer: Debouncer,
    ui_tx: broadcast::Sender<UiEvent>,
    command_rx: mpsc::Receiver<LedgerCommand>,
    channel_rx: mpsc::Receiver<ChannelEvent>,
    outcome_rx: mpsc::Receiver<SyncOutcome>,
    /// Last authoritative clock value from the realtime channel
    clock_ms: Option<i64>,
}

impl LedgerService {
    /// Build the service and its handle
    ///
    /// `channel_rx` is the realtime supervisor's output. The roster starts
    /// as the configured fixed set of empty boxes; call
    /// [`LedgerCommand::Reload`] (or let any failure do it) to hydrate
    /// from the backend.
    pub fn new(
        api: Arc<dyn BackendApi>,
        config: &ClientConfig,
        channel_rx: mpsc::Receiver<ChannelEvent>,
    ) -> (Self, LedgerHandle) {
        let (command_tx, command_rx) = mpsc::channel(64);
        let (ui_tx, _) = broadcast::channel(256);
        let (outcome_tx, outcome_rx) = mpsc::channel(64);
        let debouncer = Debouncer::spawn(
            Arc::clone(&api),
            Duration::from_millis(config.debounce_window_ms),
            outcome_tx,
        );

        let service = Self {
            ledger: RoomLedger::with_roster(config.room_count),
            api,
            debouncer,
            ui_tx: ui_tx.clone(),
            command_rx,
            channel_rx,
            outcome_rx,
            clock_ms: None,
        };
        let handle = LedgerHandle { command_tx, ui_tx };
        (service, handle)
    }

    /// Read-only roster access for tests and embedding callers
    pub fn ledger(&self) -> &RoomLedger {
        &self.ledger
    }

    fn emit(&self, event: UiEvent) {
        // No subscribers is fine
        let _ = self.ui_tx.send(event);
    }

    /// Clock for periodic recomputes: authoritative tick when we have one
    fn recompute_clock(&self) -> i64 {
        self.clock_ms.unwrap_or_else(now_millis)
    }

    async fn enqueue(&mut self, room_id: i64, call: OutboundCall) {
        let version = self.ledger.version(room_id);
        self.debouncer.enqueue(SyncJob::new(call, version)).await;
    }

    /// Run until every input channel closes
    pub async fn run(mut self) {
        tracing::info!("Ledger service started");
        loop {
            tokio::select! {
                command = self.command_rx.recv() => match command {
                    Some(command) => self.handle_command(command).await,
                    None => break,
                },
                event = self.channel_rx.recv() => match event {
                    Some(event) => self.handle_channel_event(event).await,
                    None => break,
                },
                outcome = self.outcome_rx.recv() => match outcome {
                    Some(outcome) => self.handle_outcome(outcome).await,
                    None => break,
                },
            }
        }
        tracing::info!("Ledger service stopping");
    }

    async fn handle_command(&mut self, command: LedgerCommand) {
        match command {
            LedgerCommand::ActivateRule { room_id, rule } => {
                match self.ledger.activate_rule(room_id, &rule, now_millis()) {
                    Ok(room) => {
                        let start = room.start.unwrap_or_else(now_millis);
                        self.emit(UiEvent::RoomsChanged);
                        self.enqueue(
                            room_id,
                            OutboundCall::AttachRule(shared::models::RuleAttach {
                                room_id,
                                rule_id: rule.id,
                                start,
                            }),
                        )
                        .await;
                    }
                    Err(e) => self.reject(e),
                }
            }
            LedgerCommand::AddDish { room_id, dish } => {
                match self.ledger.add_dish(room_id, &dish, self.recompute_clock()) {
                    Ok(room) => {
                        let orders = room.orders.clone();
                        self.emit(UiEvent::RoomsChanged);
                        self.enqueue(
                            room_id,
                            OutboundCall::UpsertOrderLines(OrderLinesUpsert { room_id, orders }),
                        )
                        .await;
                    }
                    Err(e) => self.reject(e),
                }
            }
            LedgerCommand::SetOrderQuantity { room_id, dish_id, input } => {
                // Non-numeric or negative input is ignored without feedback
                let Ok(quantity) = input.trim().parse::<i32>() else {
                    return;
                };
                if quantity < 0 {
                    return;
                }
                self.apply_quantity(room_id, dish_id, quantity).await;
            }
            LedgerCommand::RemoveOrderLine { room_id, dish_id } => {
                self.apply_quantity(room_id, dish_id, 0).await;
            }
            LedgerCommand::ApplyDiscount { room_id, discount_type, input } => {
                let Ok(value) = input.trim().parse::<f64>() else {
                    return;
                };
                if !value.is_finite() || value < 0.0 {
                    return;
                }
                match self
                    .ledger
                    .apply_discount(room_id, discount_type, value, self.recompute_clock())
                {
                    Ok(_) => {
                        self.emit(UiEvent::RoomsChanged);
                        self.enqueue(
                            room_id,
                            OutboundCall::UpdateDiscount(DiscountUpdate {
                                room_id,
                                discount_type: Some(discount_type),
                                discount_value: Some(value),
                            }),
                        )
                        .await;
                    }
                    Err(e) => self.reject(e),
                }
            }
            LedgerCommand::ClearDiscount { room_id } => {
                match self.ledger.clear_discount(room_id, self.recompute_clock()) {
                    Ok(_) => {
                        self.emit(UiEvent::RoomsChanged);
                        self.enqueue(
                            room_id,
                            OutboundCall::UpdateDiscount(DiscountUpdate {
                                room_id,
                                discount_type: None,
                                discount_value: None,
                            }),
                        )
                        .await;
                    }
                    Err(e) => self.reject(e),
                }
            }
            LedgerCommand::OpenCheckout { room_id } => {
                // Freeze at whichever clock is further along so the frozen
                // bill never shows less than the last rendered total
                let freeze = self.recompute_clock().max(now_millis());
                match self.ledger.open_checkout(room_id, freeze) {
                    Ok(_) => {
                        self.emit(UiEvent::RoomsChanged);
                        self.enqueue(
                            room_id,
                            OutboundCall::UpdateStatus(BillStatusUpdate {
                                room_id,
                                billing_status: BillingStatus::Paying,
                            }),
                        )
                        .await;
                    }
                    Err(e) => self.reject(e),
                }
            }
            LedgerCommand::CancelCheckout { room_id } => {
                match self.ledger.cancel_checkout(room_id, self.recompute_clock()) {
                    Ok(room) => {
                        let billing_status = room.billing_status.unwrap_or(BillingStatus::Draft);
                        self.emit(UiEvent::RoomsChanged);
                        self.enqueue(room_id, OutboundCall::CancelPayment(PaymentCancel { room_id }))
                            .await;
                        self.enqueue(
                            room_id,
                            OutboundCall::UpdateStatus(BillStatusUpdate { room_id, billing_status }),
                        )
                        .await;
                    }
                    Err(e) => self.reject(e),
                }
            }
            LedgerCommand::ConfirmCashPayment { room_id } => {
                self.confirm_payment(room_id, PaymentMethod::Cash).await;
            }
            LedgerCommand::ConfirmTransferPayment { room_id } => {
                self.confirm_payment(room_id, PaymentMethod::Transfer).await;
            }
            LedgerCommand::RequestTransferQr { room_id } => {
                let room = match self.ledger.room(room_id) {
                    Ok(room) if room.billing_status == Some(BillingStatus::Paying) => room,
                    Ok(_) => {
                        self.emit(UiEvent::Warning(format!(
                            "Room {room_id} is not in checkout; open checkout before requesting a QR"
                        )));
                        return;
                    }
                    Err(e) => {
                        self.reject(e);
                        return;
                    }
                };
                let amount = room.total;
                self.enqueue(
                    room_id,
                    OutboundCall::CreateQr(QrCreate {
                        room_id,
                        amount,
                        cancel_url: String::new(),
                        return_url: String::new(),
                    }),
                )
                .await;
            }
            LedgerCommand::CancelSession { room_id } => {
                match self.ledger.cancel_session(room_id) {
                    Ok(_) => {
                        self.emit(UiEvent::RoomsChanged);
                        self.enqueue(
                            room_id,
                            OutboundCall::UpdateStatus(BillStatusUpdate {
                                room_id,
                                billing_status: BillingStatus::Canceled,
                            }),
                        )
                        .await;
                        self.enqueue(room_id, OutboundCall::CancelPayment(PaymentCancel { room_id }))
                            .await;
                    }
                    Err(e) => self.reject(e),
                }
            }
            LedgerCommand::SwapRooms { from_room_id, to_room_id } => {
                match self.ledger.swap_rooms(from_room_id, to_room_id) {
                    Ok(()) => {
                        self.emit(UiEvent::RoomsChanged);
                        self.enqueue(
                            from_room_id,
                            OutboundCall::SwapBill(BillSwap { from_room_id, to_room_id }),
                        )
                        .await;
                    }
                    Err(e) => self.reject(e),
                }
            }
            LedgerCommand::Reload => self.reload("manual reload").await,
        }
    }

    async fn apply_quantity(&mut self, room_id: i64, dish_id: i64, quantity: i32) {
        let before = self.ledger.version(room_id);
        match self
            .ledger
            .set_line_quantity(room_id, dish_id, quantity, self.recompute_clock())
        {
            Ok(room) => {
                // Unknown line: nothing changed, nothing to persist
                if room.version == before {
                    return;
                }
                let orders = room.orders.clone();
                self.emit(UiEvent::RoomsChanged);
                if quantity == 0 {
                    self.enqueue(room_id, OutboundCall::DeleteOrderLine { room_id, dish_id })
                        .await;
                } else {
                    self.enqueue(
                        room_id,
                        OutboundCall::UpsertOrderLines(OrderLinesUpsert { room_id, orders }),
                    )
                    .await;
                }
            }
            Err(e) => self.reject(e),
        }
    }

    async fn confirm_payment(&mut self, room_id: i64, method: PaymentMethod) {
        let room = match self.ledger.room(room_id) {
            Ok(room) => room,
            Err(e) => {
                self.reject(e);
                return;
            }
        };
        if room.billing_status != Some(BillingStatus::Paying) {
            self.emit(UiEvent::Warning(format!(
                "Room {room_id} is not awaiting payment"
            )));
            return;
        }
        let total = room.total;
        self.enqueue(
            room_id,
            OutboundCall::FinalizePayment(PaymentFinalize { room_id, total, method }),
        )
        .await;
    }

    async fn handle_channel_event(&mut self, event: ChannelEvent) {
        match event {
            ChannelEvent::Message(RealtimeMessage::MinuteTick { timestamp }) => {
                self.clock_ms = Some(timestamp);
                self.ledger.apply_tick(timestamp);
                self.emit(UiEvent::RoomsChanged);
            }
            ChannelEvent::Message(RealtimeMessage::PaymentStatus { room_id, success }) => {
                if !success {
                    tracing::warn!(room_id, "Gateway reported failed payment");
                    self.emit(UiEvent::Warning(format!(
                        "Payment for room {room_id} was not completed"
                    )));
                    return;
                }
                match self.ledger.finalize(room_id) {
                    Ok(total) => {
                        tracing::info!(room_id, total, "Transfer confirmed by gateway");
                        self.emit(UiEvent::RoomsChanged);
                    }
                    Err(e) => {
                        // Duplicate or late notification for an already
                        // settled room; the channel is at-least-once
                        tracing::warn!(room_id, error = %e, "Ignoring payment status");
                    }
                }
            }
            // Pong and unknown message types carry nothing for billing
            ChannelEvent::Message(_) => {}
            ChannelEvent::State(state) => {
                if state != ConnectionState::Connected {
                    tracing::warn!(?state, "Realtime channel degraded");
                }
                self.emit(UiEvent::Connection(state));
            }
        }
    }

    async fn handle_outcome(&mut self, outcome: SyncOutcome) {
        match outcome.result {
            Ok(payload) => {
                let live_version = self.ledger.version(outcome.room_id);
                if outcome.version != live_version {
                    tracing::warn!(
                        room_id = outcome.room_id,
                        kind = ?outcome.kind,
                        "Discarding stale sync outcome"
                    );
                    return;
                }
                match (outcome.kind, payload) {
                    (CallKind::CreateQr, Some(qr)) => {
                        match self.ledger.set_qr_reference(outcome.room_id, qr.qr_code) {
                            Ok(_) => self.emit(UiEvent::RoomsChanged),
                            Err(e) => {
                                tracing::warn!(room_id = outcome.room_id, error = %e, "QR arrived late")
                            }
                        }
                    }
                    (CallKind::FinalizePayment, _) => {
                        match self.ledger.finalize(outcome.room_id) {
                            Ok(total) => {
                                tracing::info!(room_id = outcome.room_id, total, "Payment finalized");
                                self.emit(UiEvent::RoomsChanged);
                            }
                            Err(e) => {
                                // Already reset by a gateway notification
                                tracing::warn!(room_id = outcome.room_id, error = %e, "Finalize ack ignored");
                            }
                        }
                    }
                    _ => {}
                }
            }
            Err(e) => {
                let detail = if outcome.kind == CallKind::FinalizePayment {
                    let attempted = self
                        .ledger
                        .room(outcome.room_id)
                        .map(|r| r.total)
                        .unwrap_or_default();
                    format!(
                        "Payment of {attempted} VND for room {} failed: {e}",
                        outcome.room_id
                    )
                } else {
                    format!("Saving room {} failed: {e}", outcome.room_id)
                };
                self.emit(UiEvent::Error(detail));
                self.reload("persistence failure").await;
            }
        }
    }

    fn reject(&self, error: LedgerError) {
        if error.is_advisory() {
            self.emit(UiEvent::Warning(error.to_string()));
        } else {
            self.emit(UiEvent::Error(error.to_string()));
        }
    }

    /// Full roster resync: local optimistic state is discarded wholesale
    async fn reload(&mut self, reason: &str) {
        tracing::info!(reason, "Reloading roster from backend");
        match self.api.fetch_rooms().await {
            Ok(bills) => {
                let rooms: Vec<Room> = bills.into_iter().map(Room::from).collect();
                self.ledger.replace_all(rooms, self.recompute_clock());
                self.emit(UiEvent::RoomsChanged);
            }
            Err(e) => {
                tracing::error!(error = %e, "Roster reload failed");
                self.emit(UiEvent::Error(format!("Reload failed: {e}")));
            }
        }
    }
}
