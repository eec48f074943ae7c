//! Inbound command and derived event sum types.
//!
//! A command is a tagged union covering exactly the state machine's
//! transition table; unknown tags fail serde deserialization before they
//! reach the engine. Events describe what an accepted command changed, with
//! enough of the delta to render without replaying history.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::domain::bidding::{BidValue, Contract};
use crate::domain::cards::{Card, Suit};
use crate::domain::state::{AnnouncementKind, PauseReason, Seat, Team, TeamScores};

/// One inbound command, tagged with the actor it claims to come from.
/// Bot-synthesized commands travel through this same type; there is no
/// privileged bot path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    pub actor_id: String,
    #[serde(flatten)]
    pub kind: CommandKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum CommandKind {
    AddPlayer { display_name: String, is_bot: bool },
    PlaceBid { value: BidValue, suit: Suit },
    Pass,
    Coinche,
    Surcoinche,
    DeclareAnnouncement { kind: AnnouncementKind },
    PlayCard { card: Card },
    Disconnect,
    Reconnect,
    Abandon,
    /// Periodic timer check; forces the default action once the turn
    /// deadline has passed. Idempotent.
    Tick,
}

impl Command {
    pub fn new(actor_id: impl Into<String>, kind: CommandKind) -> Self {
        Self {
            actor_id: actor_id.into(),
            kind,
        }
    }
}

/// Why a match ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    TargetScoreReached,
    Abandoned { seat: Seat },
}

/// Derived event emitted alongside a successful transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum Event {
    PlayerJoined {
        seat: Seat,
        player_id: String,
        is_bot: bool,
    },
    /// Fourth seat filled: cards dealt, bidding opened.
    GameStarted {
        first_bidder: Seat,
    },
    BidPlaced {
        seat: Seat,
        value: BidValue,
        suit: Suit,
    },
    Passed {
        seat: Seat,
    },
    /// Three passes after a bid: the contract stands and play begins.
    ContractLocked {
        contract: Contract,
        trump: Suit,
    },
    /// Four passes with no contract: fresh hands, bidding restarts.
    Redealt,
    Coinched {
        seat: Seat,
    },
    Surcoinched {
        seat: Seat,
    },
    AnnouncementMade {
        seat: Seat,
        kind: AnnouncementKind,
    },
    CardPlayed {
        seat: Seat,
        card: Card,
    },
    TrickWon {
        trick_no: u8,
        winner_seat: Seat,
        winning_team: Team,
        points: u16,
    },
    RoundSettled {
        contract_team: Team,
        trick_points: u16,
        delta: i32,
        made: bool,
        scores: TeamScores,
    },
    TurnTimedOut {
        seat: Seat,
        #[serde(with = "time::serde::rfc3339")]
        deadline: OffsetDateTime,
    },
    GamePaused {
        reason: PauseReason,
    },
    GameResumed,
    MatchEnded {
        winner: Option<Team>,
        reason: EndReason,
        scores: TeamScores,
    },
}
