//! Domain layer: pure game logic, no IO and no clocks of its own.

pub mod bidding;
pub mod cards;
pub mod commands;
pub mod dealing;
pub mod engine;
pub mod rules;
pub mod snapshot;
pub mod state;

#[cfg(test)]
mod tests_engine;
#[cfg(test)]
mod tests_rules;

// Re-exports for ergonomics
pub use bidding::{Bid, BidValue, Contract};
pub use cards::{card_beats, Card, Rank, Suit, DECK_SIZE, HAND_SIZE};
pub use commands::{Command, CommandKind, EndReason, Event};
pub use snapshot::{MatchSnapshot, PublicView};
pub use state::{
    Match, MatchConfig, MatchStatus, Phase, Player, Seat, Team, TeamScores,
};
