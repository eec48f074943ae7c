//! Deferred bot actions.
//!
//! A bot never answers instantly: the match task hands us a copy of the
//! state and a gate token, we sleep a human-ish delay, then decide and
//! submit one command through the normal path. If anything else lands
//! first the match task cancels the gate and the stale decision is
//! dropped. Announcements do not consume the turn; the match task simply
//! schedules the bot again after one, so a belote turn plays out as two
//! delayed commands.

use std::ops::RangeInclusive;
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::ai::{BotAction, BotPlayer};
use crate::domain::commands::{Command, CommandKind};
use crate::domain::state::Match;
use crate::runtime::match_task::MatchHandle;

const THINKING_MS: RangeInclusive<u64> = 500..=1500;

pub(crate) fn schedule(
    handle: MatchHandle,
    bot: Arc<dyn BotPlayer>,
    state: Match,
    gate: CancellationToken,
) {
    let delay = Duration::from_millis(rand::rng().random_range(THINKING_MS));

    tokio::spawn(async move {
        tokio::select! {
            _ = gate.cancelled() => return,
            _ = tokio::time::sleep(delay) => {}
        }

        let seat = state.active_seat;
        let Some(actor_id) = state.player_at(seat).map(|p| p.id.clone()) else {
            return;
        };
        let action = match bot.decide(&state, seat) {
            Ok(action) => action,
            Err(err) => {
                // Leave the stall to the turn timer.
                warn!(game_id = %handle.game_id, seat, error = %err, "bot could not act");
                return;
            }
        };
        let kind = match action {
            BotAction::Bid { value, suit } => CommandKind::PlaceBid { value, suit },
            BotAction::Pass => CommandKind::Pass,
            BotAction::Declare(kind) => CommandKind::DeclareAnnouncement { kind },
            BotAction::Play(card) => CommandKind::PlayCard { card },
        };
        if let Err(err) = handle.submit(Command { actor_id, kind }).await {
            warn!(game_id = %handle.game_id, seat, error = %err, "bot command rejected");
        }
    });
}
