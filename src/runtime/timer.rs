//! Periodic tick source for turn deadlines.
//!
//! Wall-clock checks live in the engine's `Tick` handler; this task only
//! keeps ticks flowing while the match is alive. A tick that arrives
//! before the deadline is a no-op, so the cadence does not need to be
//! exact.

use std::time::Duration;

use tokio::time::MissedTickBehavior;

use crate::domain::commands::{Command, CommandKind};
use crate::runtime::match_task::MatchHandle;

pub(crate) const TICKER_ACTOR: &str = "ticker";

pub(crate) fn spawn_ticker(handle: MatchHandle, period: Duration) {
    tokio::spawn(async move {
        let done = handle.done();
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                _ = done.cancelled() => return,
                _ = interval.tick() => {}
            }
            // Nothing to time out while no deadline is armed.
            if !handle.tick_armed() {
                continue;
            }
            handle.submit_detached(Command {
                actor_id: TICKER_ACTOR.to_string(),
                kind: CommandKind::Tick,
            });
        }
    });
}
