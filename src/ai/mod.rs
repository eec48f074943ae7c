//! Automated players.
//!
//! Bots see the same `Match` state as everyone else and are expected to
//! pick actions from the legal-move queries; anything they return is still
//! validated by the command handlers like any human move.

use std::fmt;

mod heuristic;
mod random;

pub use heuristic::HeuristicBot;
pub use random::RandomBot;

use crate::domain::bidding::BidValue;
use crate::domain::cards::{Card, Suit};
use crate::domain::state::{AnnouncementKind, Match, Seat};

/// Errors that can occur during bot decision-making.
#[derive(Debug)]
pub enum BotError {
    /// The bot was asked to act when it has no legal action.
    NoLegalAction,
    /// The bot hit an internal error.
    Internal(String),
}

impl fmt::Display for BotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BotError::NoLegalAction => write!(f, "bot has no legal action"),
            BotError::Internal(msg) => write!(f, "bot internal error: {msg}"),
        }
    }
}

impl std::error::Error for BotError {}

/// One action a bot wants to take. Declarations do not consume the turn,
/// so a bot may be asked again immediately after declaring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotAction {
    Bid { value: BidValue, suit: Suit },
    Pass,
    Declare(AnnouncementKind),
    Play(Card),
}

/// Trait for automated players.
///
/// `decide` takes `&self` so implementations keep RNG state behind a
/// `Mutex`; a single bot instance may serve several seats.
pub trait BotPlayer: Send + Sync {
    fn name(&self) -> &'static str;

    /// Choose an action for `seat` in the current state.
    fn decide(&self, state: &Match, seat: Seat) -> Result<BotAction, BotError>;
}

/// Create a bot by type name. Unrecognized names get `None`.
pub fn create_bot(bot_type: &str, seed: Option<u64>) -> Option<Box<dyn BotPlayer>> {
    match bot_type {
        "heuristic" => Some(Box::new(HeuristicBot::new(seed))),
        "random" => Some(Box::new(RandomBot::new(seed))),
        _ => None,
    }
}
