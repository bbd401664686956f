//! Debounced dispatch of outbound calls
//!
//! Order-quantity edits arrive as bursts of rapid taps, so every
//! server-triggering mutation funnels through a trailing-edge debounce:
//! repeats for the same `(call kind, room)` key within the window collapse
//! to the most recent payload, and dispatch happens once the window
//! elapses with no newer repeat. Local ledger state has already been
//! updated synchronously by the time a job lands here.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;

use super::{CallKind, SyncJob, SyncOutcome};
use crate::api::BackendApi;

/// Handle to the debounce worker
#[derive(Clone)]
pub struct Debouncer {
    job_tx: mpsc::Sender<SyncJob>,
}

impl Debouncer {
    /// Spawn the worker; completed dispatches report through `outcome_tx`
    pub fn spawn(
        api: Arc<dyn BackendApi>,
        window: Duration,
        outcome_tx: mpsc::Sender<SyncOutcome>,
    ) -> Self {
        let (job_tx, job_rx) = mpsc::channel(256);
        tokio::spawn(run(api, window, job_rx, outcome_tx));
        Self { job_tx }
    }

    /// Queue a call; repeats within the window replace the pending payload
    pub async fn enqueue(&self, job: SyncJob) {
        if self.job_tx.send(job).await.is_err() {
            tracing::error!("Debounce worker gone, outbound call dropped");
        }
    }
}

async fn run(
    api: Arc<dyn BackendApi>,
    window: Duration,
    mut job_rx: mpsc::Receiver<SyncJob>,
    outcome_tx: mpsc::Sender<SyncOutcome>,
) {
    let mut pending: HashMap<(CallKind, i64), (SyncJob, Instant)> = HashMap::new();

    loop {
        let next_deadline = pending.values().map(|(_, d)| *d).min();

        tokio::select! {
            job = job_rx.recv() => {
                match job {
                    Some(job) => {
                        let key = (job.call.kind(), job.call.room_id());
                        let deadline = Instant::now() + window;
                        if pending.insert(key, (job, deadline)).is_some() {
                            tracing::debug!(?key, "Coalesced repeated outbound call");
                        }
                    }
                    None => break,
                }
            }
            _ = sleep_until_opt(next_deadline) => {
                let now = Instant::now();
                let due: Vec<(CallKind, i64)> = pending
                    .iter()
                    .filter(|(_, (_, deadline))| *deadline <= now)
                    .map(|(key, _)| *key)
                    .collect();
                for key in due {
                    if let Some((job, _)) = pending.remove(&key) {
                        dispatch(Arc::clone(&api), job, outcome_tx.clone());
                    }
                }
            }
        }
    }

    // Channel closed: flush whatever is still pending
    for (_, (job, _)) in pending.drain() {
        dispatch(Arc::clone(&api), job, outcome_tx.clone());
    }
    tracing::info!("Debounce worker stopping");
}

async fn sleep_until_opt(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

fn dispatch(api: Arc<dyn BackendApi>, job: SyncJob, outcome_tx: mpsc::Sender<SyncOutcome>) {
    tokio::spawn(async move {
        let kind = job.call.kind();
        let room_id = job.call.room_id();
        let result = job.call.execute(api.as_ref()).await;
        if let Err(e) = &result {
            tracing::error!(job_id = %job.id, room_id, ?kind, error = %e, "Outbound call failed");
        }
        let outcome = SyncOutcome {
            kind,
            room_id,
            version: job.version,
            result,
        };
        if outcome_tx.send(outcome).await.is_err() {
            tracing::debug!("Outcome channel closed");
        }
    });
}
