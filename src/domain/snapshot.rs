//! Snapshots of match state: a lossless persistence document and a
//! redacted per-seat view that never exposes other players' hands.

use serde::{Deserialize, Serialize};

use crate::domain::bidding::{Bid, BidValue, Contract};
use crate::domain::cards::{Card, Suit};
use crate::domain::state::{
    Announcement, Match, MatchStatus, PauseReason, Phase, Seat, SeatedCard, Team, TeamScores,
    TrickRecord,
};
use crate::errors::domain::DomainError;

/// Full-fidelity snapshot for persistence. Round-trips losslessly back
/// into a `Match`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchSnapshot {
    /// Mirrors `Match::last_saved`; strictly increases across saves of the
    /// same match, so a store can refuse stale writes.
    pub version: u64,
    pub state: Match,
}

impl MatchSnapshot {
    pub fn capture(state: &Match) -> Self {
        Self {
            version: state.last_saved,
            state: state.clone(),
        }
    }

    pub fn restore(self) -> Match {
        self.state
    }

    pub fn is_newer_than(&self, other: &MatchSnapshot) -> bool {
        self.version > other.version
    }

    pub fn to_json(&self) -> Result<String, DomainError> {
        serde_json::to_string(self)
            .map_err(|e| DomainError::illegal(format!("snapshot encode failed: {e}")))
    }

    pub fn from_json(raw: &str) -> Result<Self, DomainError> {
        serde_json::from_str(raw)
            .map_err(|e| DomainError::illegal(format!("snapshot decode failed: {e}")))
    }
}

/// Public info about one seat. Other players' cards are reduced to a count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeatPublic {
    pub seat: Seat,
    pub display_name: String,
    pub team: Team,
    pub is_bot: bool,
    pub connected: bool,
    pub hand_size: u8,
    pub announcements: Vec<Announcement>,
}

/// Header shared by every phase of the public view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchHeader {
    pub status: MatchStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pause_reason: Option<PauseReason>,
    pub seats: Vec<SeatPublic>,
    pub scores: TeamScores,
    pub round_opener: Seat,
    pub deal_no: u32,
}

/// Per-seat view of a match, safe to hand to any client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicView {
    pub viewer: Seat,
    pub header: MatchHeader,
    pub hand: Vec<Card>,
    pub phase: PhaseView,
}

/// Adjacently tagged union of phase-specific public data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "phase", content = "data")]
pub enum PhaseView {
    Waiting {
        seats_filled: u8,
    },
    Bidding {
        to_act: Seat,
        bids: Vec<Bid>,
        contract: Option<Contract>,
        legal_bids: Vec<BidValue>,
    },
    Playing {
        to_act: Seat,
        trump: Suit,
        contract: Option<Contract>,
        current_trick: Vec<SeatedCard>,
        tricks_taken: TeamScores,
        legal_plays: Vec<Card>,
        last_trick: Option<TrickRecord>,
    },
    Ended {
        scores: TeamScores,
    },
}

impl PublicView {
    /// Build the view `seat` is allowed to see.
    pub fn for_seat(state: &Match, seat: Seat) -> Result<Self, DomainError> {
        let viewer = state
            .player_at(seat)
            .ok_or_else(|| DomainError::not_found(format!("no player at seat {seat}")))?;

        let header = MatchHeader {
            status: state.status,
            pause_reason: state.pause_reason.clone(),
            seats: state
                .players
                .iter()
                .map(|p| SeatPublic {
                    seat: p.seat,
                    display_name: p.display_name.clone(),
                    team: p.team,
                    is_bot: p.is_bot,
                    connected: p.connected,
                    hand_size: p.hand.len() as u8,
                    announcements: p.announcements.clone(),
                })
                .collect(),
            scores: state.scores,
            round_opener: state.round_opener,
            deal_no: state.deal_no,
        };

        let phase = match state.phase {
            Phase::Waiting => PhaseView::Waiting {
                seats_filled: state.players.len() as u8,
            },
            Phase::Bidding => PhaseView::Bidding {
                to_act: state.active_seat,
                bids: state.bids.clone(),
                contract: state.contract,
                legal_bids: state.legal_bids(),
            },
            Phase::Playing => {
                let trump = state
                    .trump_suit
                    .ok_or_else(|| DomainError::phase("no trump suit set"))?;
                let mut tricks_taken = TeamScores::default();
                for t in &state.tricks {
                    tricks_taken.add(t.winning_team, 1);
                }
                PhaseView::Playing {
                    to_act: state.active_seat,
                    trump,
                    contract: state.contract,
                    current_trick: state.current_trick.clone(),
                    tricks_taken,
                    legal_plays: state.legal_plays_for(seat),
                    last_trick: state.tricks.last().cloned(),
                }
            }
            Phase::Ended => PhaseView::Ended {
                scores: state.scores,
            },
        };

        Ok(Self {
            viewer: seat,
            header,
            hand: viewer.hand.clone(),
            phase,
        })
    }
}
