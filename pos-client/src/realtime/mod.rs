//! Realtime channel supervision
//!
//! The transport itself is an opaque collaborator; this module owns only
//! the connection bookkeeping around it: reconnect with capped
//! exponential backoff, heartbeat pings while connected, pause-when-
//! hidden, and forwarding of messages and connection-state changes to the
//! service loop. Connection state may suppress stale displays upstream
//! but never mutates billing state.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;

use shared::message::{ConnectionState, RealtimeMessage};
use shared::util::now_millis;

use crate::error::ClientResult;

/// Heartbeat payload emitted on the ping interval
#[derive(Debug, Clone, serde::Serialize)]
pub struct HeartbeatPing {
    pub timestamp: i64,
    pub client: &'static str,
}

pub const CLIENT_TAG: &str = "pos-client-v1";

/// A live transport session
///
/// `events` yields pushed messages until the transport drops; `heartbeat`
/// accepts keep-alive pings (transports that do their own keep-alive may
/// discard them).
pub struct RealtimeConnection {
    pub events: mpsc::Receiver<RealtimeMessage>,
    pub heartbeat: mpsc::Sender<HeartbeatPing>,
}

/// Transport seam: produces live connections on demand
#[async_trait]
pub trait RealtimeConnector: Send + Sync {
    async fn connect(&self) -> ClientResult<RealtimeConnection>;
}

/// Event forwarded to the service loop
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelEvent {
    Message(RealtimeMessage),
    State(ConnectionState),
}

/// Shared pause flag (page hidden, app backgrounded)
#[derive(Clone, Default)]
pub struct PauseHandle {
    paused: Arc<AtomicBool>,
}

impl PauseHandle {
    pub fn pause(&self) {
        self.paused.store(true, Ordering::Relaxed);
    }

    pub fn resume(&self) {
        self.paused.store(false, Ordering::Relaxed);
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Relaxed)
    }
}

/// Reconnect delay for an attempt: base × 1.5^attempt, capped at 30 s
pub fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    const CAP: Duration = Duration::from_secs(30);
    let factor = 1.5_f64.powi(attempt.min(32) as i32);
    let delay = base.mul_f64(factor);
    delay.min(CAP)
}

/// Settings for the supervisor loop
#[derive(Debug, Clone)]
pub struct SupervisorSettings {
    pub heartbeat_interval: Duration,
    pub reconnect_delay: Duration,
    pub max_reconnect_attempts: u32,
}

impl SupervisorSettings {
    pub fn from_config(config: &crate::config::ClientConfig) -> Self {
        Self {
            heartbeat_interval: Duration::from_millis(config.heartbeat_interval_ms),
            reconnect_delay: Duration::from_millis(config.reconnect_delay_ms),
            max_reconnect_attempts: config.max_reconnect_attempts,
        }
    }
}

/// Supervises a connector and forwards its traffic to the service loop
pub struct RealtimeSupervisor<C: RealtimeConnector> {
    connector: C,
    settings: SupervisorSettings,
    out_tx: mpsc::Sender<ChannelEvent>,
    pause: PauseHandle,
}

impl<C: RealtimeConnector> RealtimeSupervisor<C> {
    pub fn new(connector: C, settings: SupervisorSettings, out_tx: mpsc::Sender<ChannelEvent>) -> Self {
        Self {
            connector,
            settings,
            out_tx,
            pause: PauseHandle::default(),
        }
    }

    pub fn pause_handle(&self) -> PauseHandle {
        self.pause.clone()
    }

    async fn forward(&self, event: ChannelEvent) -> bool {
        self.out_tx.send(event).await.is_ok()
    }

    /// Run until the service side hangs up or reconnects are exhausted
    pub async fn run(self) {
        let mut attempts: u32 = 0;

        loop {
            if self.pause.is_paused() {
                // Hidden page: skip network activity, reset the backoff
                attempts = 0;
                tokio::time::sleep(Duration::from_millis(500)).await;
                continue;
            }

            match self.connector.connect().await {
                Ok(mut conn) => {
                    attempts = 0;
                    if !self.forward(ChannelEvent::State(ConnectionState::Connected)).await {
                        return;
                    }
                    tracing::info!("Realtime channel connected");

                    let mut heartbeat = tokio::time::interval(self.settings.heartbeat_interval);
                    loop {
                        tokio::select! {
                            msg = conn.events.recv() => match msg {
                                Some(msg) => {
                                    if !self.forward(ChannelEvent::Message(msg)).await {
                                        return;
                                    }
                                }
                                None => {
                                    tracing::warn!("Realtime channel dropped");
                                    if !self
                                        .forward(ChannelEvent::State(ConnectionState::Disconnected))
                                        .await
                                    {
                                        return;
                                    }
                                    break;
                                }
                            },
                            _ = heartbeat.tick() => {
                                let ping = HeartbeatPing {
                                    timestamp: now_millis(),
                                    client: CLIENT_TAG,
                                };
                                let _ = conn.heartbeat.send(ping).await;
                            }
                        }
                    }
                    // Clean drop: retry after the base delay
                    tokio::time::sleep(self.settings.reconnect_delay).await;
                }
                Err(e) => {
                    attempts += 1;
                    tracing::warn!(attempt = attempts, error = %e, "Realtime connect failed");
                    if !self
                        .forward(ChannelEvent::State(ConnectionState::Error(e.to_string())))
                        .await
                    {
                        return;
                    }
                    if attempts >= self.settings.max_reconnect_attempts {
                        tracing::error!("Reconnect attempts exhausted, supervisor stopping");
                        return;
                    }
                    tokio::time::sleep(backoff_delay(self.settings.reconnect_delay, attempts)).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use std::sync::Mutex;

    #[test]
    fn backoff_grows_geometrically_and_caps() {
        let base = Duration::from_millis(1_000);
        assert_eq!(backoff_delay(base, 1), Duration::from_millis(1_500));
        assert_eq!(backoff_delay(base, 2), Duration::from_millis(2_250));
        assert!(backoff_delay(base, 20) <= Duration::from_secs(30));
        assert_eq!(backoff_delay(base, 30), Duration::from_secs(30));
    }

    /// Fails the first connect, then serves a scripted message stream
    struct ScriptedConnector {
        remaining_failures: Mutex<u32>,
        messages: Vec<RealtimeMessage>,
    }

    #[async_trait]
    impl RealtimeConnector for ScriptedConnector {
        async fn connect(&self) -> ClientResult<RealtimeConnection> {
            {
                let mut failures = self.remaining_failures.lock().unwrap();
                if *failures > 0 {
                    *failures -= 1;
                    return Err(ClientError::Internal("connection refused".into()));
                }
            }
            let (tx, rx) = mpsc::channel(16);
            let (heartbeat_tx, _heartbeat_rx) = mpsc::channel(16);
            for msg in self.messages.clone() {
                tx.send(msg).await.unwrap();
            }
            // Sender dropped here: the stream ends after the scripted messages
            Ok(RealtimeConnection {
                events: rx,
                heartbeat: heartbeat_tx,
            })
        }
    }

    #[tokio::test]
    async fn reconnects_after_failure_and_forwards_messages() {
        let connector = ScriptedConnector {
            remaining_failures: Mutex::new(1),
            messages: vec![
                RealtimeMessage::MinuteTick { timestamp: 1_000 },
                RealtimeMessage::PaymentStatus {
                    room_id: 3,
                    success: true,
                },
            ],
        };
        let settings = SupervisorSettings {
            heartbeat_interval: Duration::from_secs(60),
            reconnect_delay: Duration::from_millis(10),
            max_reconnect_attempts: 5,
        };
        let (out_tx, mut out_rx) = mpsc::channel(32);
        let supervisor = RealtimeSupervisor::new(connector, settings, out_tx);
        tokio::spawn(supervisor.run());

        assert!(matches!(
            out_rx.recv().await.unwrap(),
            ChannelEvent::State(ConnectionState::Error(_))
        ));
        assert_eq!(
            out_rx.recv().await.unwrap(),
            ChannelEvent::State(ConnectionState::Connected)
        );
        assert_eq!(
            out_rx.recv().await.unwrap(),
            ChannelEvent::Message(RealtimeMessage::MinuteTick { timestamp: 1_000 })
        );
        assert_eq!(
            out_rx.recv().await.unwrap(),
            ChannelEvent::Message(RealtimeMessage::PaymentStatus {
                room_id: 3,
                success: true
            })
        );
        assert_eq!(
            out_rx.recv().await.unwrap(),
            ChannelEvent::State(ConnectionState::Disconnected)
        );
    }
}
