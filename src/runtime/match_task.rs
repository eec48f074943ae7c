//! Per-match command loop.
//!
//! Each live match is owned by exactly one tokio task. Commands arrive over
//! an mpsc channel, so handler execution is serialized by construction and
//! the `Match` aggregate needs no lock. Saves and event broadcast happen
//! after a transition is accepted, never inside it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use time::OffsetDateTime;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::ai::BotPlayer;
use crate::domain::commands::{Command, Event};
use crate::domain::snapshot::MatchSnapshot;
use crate::domain::state::{Match, Phase};
use crate::errors::EngineError;
use crate::runtime::{bot_driver, timer};
use crate::runtime::store::GameStore;

const COMMAND_QUEUE_DEPTH: usize = 64;
const EVENT_QUEUE_DEPTH: usize = 256;

pub(crate) struct Envelope {
    pub cmd: Command,
    pub reply: Option<oneshot::Sender<Result<Vec<Event>, EngineError>>>,
}

/// Cheap clonable handle to a running match task.
#[derive(Clone)]
pub struct MatchHandle {
    pub game_id: Uuid,
    cmd_tx: mpsc::Sender<Envelope>,
    event_tx: broadcast::Sender<Event>,
    shutdown: CancellationToken,
    tick_armed: Arc<AtomicBool>,
}

impl MatchHandle {
    /// Submit a command and wait for the engine's verdict.
    pub async fn submit(&self, cmd: Command) -> Result<Vec<Event>, EngineError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Envelope {
                cmd,
                reply: Some(tx),
            })
            .await
            .map_err(|_| EngineError::MatchClosed)?;
        rx.await.map_err(|_| EngineError::MatchClosed)?
    }

    /// Fire-and-forget submission for the ticker. Dropped when the queue
    /// is full; the next tick covers it.
    pub(crate) fn submit_detached(&self, cmd: Command) {
        let _ = self.cmd_tx.try_send(Envelope { cmd, reply: None });
    }

    pub fn events(&self) -> broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Resolved when the match task has stopped.
    pub fn done(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Stop the match task and its ticker without waiting for the match
    /// to end. Pending commands are dropped.
    pub fn close(&self) {
        self.shutdown.cancel();
    }

    /// Whether a turn deadline is currently armed. The ticker skips
    /// matches with nothing to time out.
    pub(crate) fn tick_armed(&self) -> bool {
        self.tick_armed.load(Ordering::Relaxed)
    }
}

/// Spawn the owning task for `state`, plus its ticker.
pub fn spawn(
    state: Match,
    store: Arc<dyn GameStore>,
    bot: Arc<dyn BotPlayer>,
) -> MatchHandle {
    let (cmd_tx, cmd_rx) = mpsc::channel(COMMAND_QUEUE_DEPTH);
    let (event_tx, _) = broadcast::channel(EVENT_QUEUE_DEPTH);
    let handle = MatchHandle {
        game_id: state.id,
        cmd_tx,
        event_tx,
        shutdown: CancellationToken::new(),
        tick_armed: Arc::new(AtomicBool::new(state.turn_deadline.is_some())),
    };

    timer::spawn_ticker(handle.clone(), Duration::from_secs(1));
    tokio::spawn(run(state, cmd_rx, handle.clone(), store, bot));
    handle
}

async fn run(
    mut state: Match,
    mut cmd_rx: mpsc::Receiver<Envelope>,
    handle: MatchHandle,
    store: Arc<dyn GameStore>,
    bot: Arc<dyn BotPlayer>,
) {
    let game_id = state.id;
    // Gate for the currently scheduled bot action, if any. Canceled as soon
    // as any command is accepted so a stale decision never lands.
    let mut bot_gate: Option<CancellationToken> = None;
    let mut saved_version = state.last_saved;

    loop {
        let envelope = tokio::select! {
            biased;
            _ = handle.shutdown.cancelled() => break,
            maybe = cmd_rx.recv() => match maybe {
                Some(envelope) => envelope,
                None => break,
            },
        };
        let now = OffsetDateTime::now_utc();
        debug!(game_id = %game_id, actor = %envelope.cmd.actor_id, "command received");

        match state.apply(&envelope.cmd, now) {
            Ok(events) => {
                // Some accepted transitions emit no events (a bot seat
                // toggling connection, say) but still advance the version
                // and must be persisted.
                if state.last_saved > saved_version {
                    saved_version = state.last_saved;
                    if let Some(gate) = bot_gate.take() {
                        gate.cancel();
                    }
                    info!(
                        game_id = %game_id,
                        phase = ?state.phase,
                        version = state.last_saved,
                        events = events.len(),
                        "transition accepted"
                    );
                    if let Err(err) = store.save_game(MatchSnapshot::capture(&state)).await {
                        warn!(game_id = %game_id, error = %err, "snapshot save failed");
                    }
                    for event in &events {
                        let _ = handle.event_tx.send(event.clone());
                    }
                }
                handle
                    .tick_armed
                    .store(state.turn_deadline.is_some(), Ordering::Relaxed);

                let ended = state.phase == Phase::Ended;
                if !ended && state.bot_to_act() && bot_gate.is_none() {
                    let gate = CancellationToken::new();
                    bot_gate = Some(gate.clone());
                    bot_driver::schedule(handle.clone(), bot.clone(), state.clone(), gate);
                }

                if let Some(reply) = envelope.reply {
                    let _ = reply.send(Ok(events));
                }
                if ended {
                    break;
                }
            }
            Err(err) => {
                debug!(game_id = %game_id, error = %err, "command rejected");
                if let Some(reply) = envelope.reply {
                    let _ = reply.send(Err(err.into()));
                }
            }
        }
    }

    if let Some(gate) = bot_gate.take() {
        gate.cancel();
    }
    handle.shutdown.cancel();
    info!(game_id = %game_id, "match task stopped");
}
