//! Bid and contract types.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::domain::cards::Suit;
use crate::domain::state::{Seat, Team};

pub const MIN_BID: u16 = 80;
pub const MAX_BID: u16 = 160;
pub const BID_STEP: u16 = 10;
/// Point target a capot contract settles against.
pub const CAPOT_TARGET: u16 = 250;

/// A bid amount: a multiple of 10 in 80..=160, or capot (all eight tricks).
/// Capot outbids every numeric value.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "points")]
pub enum BidValue {
    Points(u16),
    Capot,
}

impl BidValue {
    /// The point threshold this bid commits the contracting team to.
    pub fn target_points(self) -> u16 {
        match self {
            BidValue::Points(p) => p,
            BidValue::Capot => CAPOT_TARGET,
        }
    }
}

impl Ord for BidValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (BidValue::Capot, BidValue::Capot) => Ordering::Equal,
            (BidValue::Capot, BidValue::Points(_)) => Ordering::Greater,
            (BidValue::Points(_), BidValue::Capot) => Ordering::Less,
            (BidValue::Points(a), BidValue::Points(b)) => a.cmp(b),
        }
    }
}

impl PartialOrd for BidValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// One entry in a round's append-only bid sequence.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Bid {
    pub value: BidValue,
    pub suit: Suit,
    pub seat: Seat,
}

/// The standing contract for a round, derived from the highest accepted bid.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    pub value: BidValue,
    pub suit: Suit,
    pub team: Team,
    pub coinched: bool,
    pub surcoinched: bool,
}

impl Contract {
    pub fn new(value: BidValue, suit: Suit, team: Team) -> Self {
        Self {
            value,
            suit,
            team,
            coinched: false,
            surcoinched: false,
        }
    }

    /// Score multiplier: 4 surcoinched, 2 coinched, 1 otherwise.
    pub fn multiplier(&self) -> i32 {
        if self.surcoinched {
            4
        } else if self.coinched {
            2
        } else {
            1
        }
    }
}
