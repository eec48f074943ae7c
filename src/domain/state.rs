//! The `Match` aggregate and its supporting state types.
//!
//! Seat math mirrors a fixed four-seat table: 0=South, 1=West, 2=North,
//! 3=East in UI terms, though the engine only relies on the +1 mod 4
//! rotation. Seats 0 and 2 form team A, seats 1 and 3 team B.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::bidding::{Bid, Contract};
use crate::domain::cards::{Card, Suit};

pub type Seat = u8; // 0..=3
pub const SEATS: usize = 4;

#[inline]
pub fn next_seat(seat: Seat) -> Seat {
    (seat + 1) % SEATS as u8
}

/// Returns the seat `n` steps clockwise from `start`.
#[inline]
pub fn nth_from(start: Seat, n: u8) -> Seat {
    (start + n) % SEATS as u8
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Team {
    A,
    B,
}

impl Team {
    /// Teams alternate by seat parity: 0,2 -> A; 1,3 -> B.
    pub fn of(seat: Seat) -> Team {
        if seat % 2 == 0 {
            Team::A
        } else {
            Team::B
        }
    }

    pub fn opponent(self) -> Team {
        match self {
            Team::A => Team::B,
            Team::B => Team::A,
        }
    }
}

/// Overall match progression phases.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum Phase {
    /// Seats are still being filled.
    Waiting,
    /// Players bid for the contract in fixed turn order.
    Bidding,
    /// Tricks are played out (8 per round).
    Playing,
    /// Terminal: target score reached or a player abandoned.
    Ended,
}

/// Orthogonal status flag overlaying any phase.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum MatchStatus {
    Active,
    Paused,
    Abandoned,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum PauseReason {
    Disconnection { seats: Vec<Seat> },
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum AnnouncementKind {
    Belote,
    Rebelote,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Announcement {
    pub kind: AnnouncementKind,
    pub seat: Seat,
    #[serde(with = "time::serde::rfc3339")]
    pub at: OffsetDateTime,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: String,
    pub display_name: String,
    pub seat: Seat,
    pub team: Team,
    pub hand: Vec<Card>,
    pub connected: bool,
    pub is_bot: bool,
    pub has_abandoned: bool,
    /// Announcements declared this round; cleared at each deal.
    pub announcements: Vec<Announcement>,
}

impl Player {
    pub fn has_declared(&self, kind: AnnouncementKind) -> bool {
        self.announcements.iter().any(|a| a.kind == kind)
    }
}

/// A card on the table, remembering who played it.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct SeatedCard {
    pub seat: Seat,
    pub card: Card,
}

/// A resolved trick appended to the round history.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct TrickRecord {
    /// Exactly 4 cards in play order.
    pub cards: [SeatedCard; 4],
    pub winner_seat: Seat,
    pub winning_team: Team,
    pub points: u16,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Default, Serialize, Deserialize)]
pub struct TeamScores {
    pub team_a: i32,
    pub team_b: i32,
}

impl TeamScores {
    pub fn get(&self, team: Team) -> i32 {
        match team {
            Team::A => self.team_a,
            Team::B => self.team_b,
        }
    }

    pub fn add(&mut self, team: Team, delta: i32) {
        match team {
            Team::A => self.team_a += delta,
            Team::B => self.team_b += delta,
        }
    }
}

/// Static per-match configuration.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct MatchConfig {
    /// First team to reach this cumulative score wins. `None` repeats
    /// rounds until a player abandons.
    pub target_score: Option<i32>,
    /// Per-turn deadline in seconds.
    pub turn_secs: u64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            target_score: Some(1000),
            turn_secs: 30,
        }
    }
}

/// The authoritative aggregate for one match. All mutation goes through the
/// command handlers in `domain::engine`; collaborators only ever see
/// snapshots of this state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: Uuid,
    pub config: MatchConfig,
    pub phase: Phase,
    pub status: MatchStatus,
    pub pause_reason: Option<PauseReason>,
    /// Filled in seat order; exactly 4 once the phase leaves Waiting.
    pub players: Vec<Player>,
    pub active_seat: Seat,
    /// Seat that opens bidding for the current round; rotates each round.
    pub round_opener: Seat,
    pub trump_suit: Option<Suit>,
    pub contract: Option<Contract>,
    /// Append-only within a bidding round.
    pub bids: Vec<Bid>,
    pub consecutive_passes: u8,
    pub current_trick: Vec<SeatedCard>,
    /// Resolved tricks for the current round (a round is exactly 8).
    pub tricks: Vec<TrickRecord>,
    pub scores: TeamScores,
    #[serde(with = "time::serde::rfc3339::option")]
    pub turn_deadline: Option<OffsetDateTime>,
    pub last_announcement: Option<Announcement>,
    /// Base seed all per-deal shuffle seeds derive from.
    pub rng_seed: u64,
    /// Number of deals performed so far (redeals included).
    pub deal_no: u32,
    /// Monotonically increasing version marker, bumped on every accepted
    /// command. Consumers apply a snapshot only if this is newer.
    pub last_saved: u64,
}

impl Match {
    pub fn new(id: Uuid, config: MatchConfig, rng_seed: u64) -> Self {
        Self {
            id,
            config,
            phase: Phase::Waiting,
            status: MatchStatus::Active,
            pause_reason: None,
            players: Vec::with_capacity(SEATS),
            active_seat: 0,
            round_opener: 0,
            trump_suit: None,
            contract: None,
            bids: Vec::new(),
            consecutive_passes: 0,
            current_trick: Vec::with_capacity(SEATS),
            tricks: Vec::new(),
            scores: TeamScores::default(),
            turn_deadline: None,
            last_announcement: None,
            rng_seed,
            deal_no: 0,
            last_saved: 0,
        }
    }

    pub fn player_at(&self, seat: Seat) -> Option<&Player> {
        self.players.iter().find(|p| p.seat == seat)
    }

    pub fn player_at_mut(&mut self, seat: Seat) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.seat == seat)
    }

    /// Seat of the player with this external id, if seated.
    pub fn seat_of(&self, player_id: &str) -> Option<Seat> {
        self.players.iter().find(|p| p.id == player_id).map(|p| p.seat)
    }

    pub fn active_player(&self) -> Option<&Player> {
        self.player_at(self.active_seat)
    }

    /// Whether the seat currently expected to act belongs to a bot.
    pub fn bot_to_act(&self) -> bool {
        matches!(self.phase, Phase::Bidding | Phase::Playing)
            && self.status == MatchStatus::Active
            && self.active_player().is_some_and(|p| p.is_bot)
    }

    /// Suit led in the current trick, if any card is down.
    pub fn lead_suit(&self) -> Option<Suit> {
        self.current_trick.first().map(|sc| sc.card.suit)
    }
}
