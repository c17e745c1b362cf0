use std::collections::HashSet;
use std::time::Instant;

use doorman_core::{Clock, CooldownGate, Notification, PresenceTracker};
use doorman_speech::{Announcer, Composer};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("engine task exited")]
    ChannelClosed,
}

/// Summary of one presence-update cycle, returned to the caller and
/// serialized over D-Bus.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CycleReport {
    pub arrivals: Vec<String>,
    pub departures: Vec<String>,
    /// Messages handed to the speech pipeline this cycle, in dispatch
    /// order (departures before arrivals). Entries are attempts, not
    /// delivery confirmations.
    pub announced: Vec<String>,
}

/// Daemon status snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct EngineStatus {
    pub present: Vec<String>,
    pub known_count: usize,
    pub uptime_secs: u64,
}

/// Messages sent from D-Bus handlers to the engine task.
enum EngineRequest {
    Report {
        labels: HashSet<String>,
        reply: oneshot::Sender<CycleReport>,
    },
    Status {
        reply: oneshot::Sender<EngineStatus>,
    },
}

/// Clone-safe handle to the engine task.
#[derive(Clone)]
pub struct EngineHandle {
    tx: mpsc::Sender<EngineRequest>,
}

impl EngineHandle {
    /// Submit one recognition snapshot for processing.
    pub async fn report(&self, labels: HashSet<String>) -> Result<CycleReport, EngineError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(EngineRequest::Report {
                labels,
                reply: reply_tx,
            })
            .await
            .map_err(|_| EngineError::ChannelClosed)?;
        reply_rx.await.map_err(|_| EngineError::ChannelClosed)
    }

    pub async fn status(&self) -> Result<EngineStatus, EngineError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(EngineRequest::Status { reply: reply_tx })
            .await
            .map_err(|_| EngineError::ChannelClosed)?;
        reply_rx.await.map_err(|_| EngineError::ChannelClosed)
    }
}

/// Spawn the engine on a dedicated task.
///
/// The task owns all mutable presence state (tracker and cooldown
/// ledger) and processes one request at a time, so concurrent D-Bus
/// handlers cannot interleave read-modify-write cycles. External calls
/// inside a cycle are bounded by the composer and announcer timeouts,
/// so a stalled backend delays but never wedges the queue.
pub fn spawn_engine<C>(
    gate: CooldownGate<C>,
    composer: Composer,
    announcer: Announcer,
) -> EngineHandle
where
    C: Clock + 'static,
{
    let (tx, mut rx) = mpsc::channel::<EngineRequest>(16);

    tokio::spawn(async move {
        tracing::info!("engine task started");
        let started = Instant::now();
        let mut tracker = PresenceTracker::new();
        let mut gate = gate;

        while let Some(req) = rx.recv().await {
            match req {
                EngineRequest::Report { labels, reply } => {
                    let report =
                        run_cycle(&mut tracker, &mut gate, &composer, &announcer, labels).await;
                    let _ = reply.send(report);
                }
                EngineRequest::Status { reply } => {
                    let _ = reply.send(EngineStatus {
                        present: tracker.present(),
                        known_count: tracker.known_count(),
                        uptime_secs: started.elapsed().as_secs(),
                    });
                }
            }
        }
        tracing::info!("engine task exiting");
    });

    EngineHandle { tx }
}

/// Process one presence snapshot: diff, gate, compose, announce.
///
/// Departures are dispatched before arrivals. Each identity is handled
/// independently; no failure aborts the cycle. The cooldown stamp is
/// written immediately after admission so that a downstream composition
/// or speech failure does not re-open the window.
async fn run_cycle<C: Clock>(
    tracker: &mut PresenceTracker,
    gate: &mut CooldownGate<C>,
    composer: &Composer,
    announcer: &Announcer,
    labels: HashSet<String>,
) -> CycleReport {
    let diff = tracker.update(labels);
    let mut report = CycleReport {
        arrivals: diff.arrivals.iter().map(|n| n.identity.clone()).collect(),
        departures: diff.departures.iter().map(|n| n.identity.clone()).collect(),
        announced: Vec::new(),
    };

    for notification in diff.departures.iter().chain(diff.arrivals.iter()) {
        dispatch(gate, composer, announcer, notification, &mut report).await;
    }

    report
}

async fn dispatch<C: Clock>(
    gate: &mut CooldownGate<C>,
    composer: &Composer,
    announcer: &Announcer,
    notification: &Notification,
    report: &mut CycleReport,
) {
    let Notification {
        identity,
        kind,
        first_time,
    } = notification;

    if !gate.admit(identity, *kind) {
        tracing::debug!(
            identity,
            kind = kind.as_str(),
            "notification suppressed by cooldown"
        );
        return;
    }
    gate.record(identity, *kind);

    let text = composer.compose(identity, *kind, *first_time).await;
    tracing::info!(
        identity,
        kind = kind.as_str(),
        first_time = *first_time,
        "dispatching notification"
    );
    announcer.announce(&text).await;
    report.announced.push(text);
}
