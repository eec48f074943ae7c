//! Rule-of-thumb bot: bids on long suits, declares when eligible, wins
//! tricks cheaply and dumps low cards otherwise.

use parking_lot::Mutex;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use crate::domain::bidding::{BidValue, MAX_BID};
use crate::domain::cards::{card_beats, relative_strength, trump_points, Card, Suit};
use crate::domain::rules::{can_declare_belote, can_declare_rebelote};
use crate::domain::state::{AnnouncementKind, Match, Phase, Seat, SeatedCard, Team};

use super::{BotAction, BotError, BotPlayer};

/// Only bid values up to this are considered; longer odds get a pass.
const RAISE_CEILING: u16 = 120;
/// Flat estimate for tricks the partner will bring in.
const PARTNER_ALLOWANCE: u16 = 40;
/// Chance to bid at all when the hand qualifies. Keeps seeded games varied.
const BID_APPETITE: f64 = 0.8;

pub struct HeuristicBot {
    rng: Mutex<ChaCha8Rng>,
}

impl HeuristicBot {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => ChaCha8Rng::seed_from_u64(s),
            None => ChaCha8Rng::from_os_rng(),
        };
        Self {
            rng: Mutex::new(rng),
        }
    }

    /// Longest suit wins; suit point strength breaks ties.
    fn best_suit(hand: &[Card]) -> (Suit, u16) {
        let mut best = (Suit::Clubs, 0usize, 0u16);
        for suit in Suit::ALL {
            let count = hand.iter().filter(|c| c.suit == suit).count();
            let strength: u16 = hand
                .iter()
                .filter(|c| c.suit == suit)
                .map(|c| trump_points(c.rank))
                .sum();
            if (count, strength) > (best.1, best.2) {
                best = (suit, count, strength);
            }
        }
        (best.0, best.2)
    }

    fn choose_bid(&self, state: &Match, seat: Seat) -> Result<BotAction, BotError> {
        let hand = state
            .player_at(seat)
            .map(|p| p.hand.as_slice())
            .ok_or(BotError::NoLegalAction)?;
        let (suit, strength) = Self::best_suit(hand);

        let next = match state.contract.map(|c| c.value) {
            None => 80,
            Some(BidValue::Points(p)) if p < RAISE_CEILING && p < MAX_BID => p + 10,
            Some(_) => return Ok(BotAction::Pass),
        };
        if strength + PARTNER_ALLOWANCE < next {
            return Ok(BotAction::Pass);
        }

        let mut rng = self.rng.lock();
        if !rng.random_bool(BID_APPETITE) {
            return Ok(BotAction::Pass);
        }
        Ok(BotAction::Bid {
            value: BidValue::Points(next),
            suit,
        })
    }

    /// Seat/card currently winning the open trick, if any card is down.
    fn trick_leader(trick: &[SeatedCard], trump: Suit) -> Option<SeatedCard> {
        let lead = trick.first()?.card.suit;
        trick.iter().copied().reduce(|best, sc| {
            if card_beats(sc.card, best.card, lead, trump) {
                sc
            } else {
                best
            }
        })
    }

    fn choose_play(&self, state: &Match, seat: Seat) -> Result<BotAction, BotError> {
        let trump = state.trump_suit.ok_or(BotError::NoLegalAction)?;
        if let Some(player) = state.player_at(seat) {
            if can_declare_belote(player, trump) {
                return Ok(BotAction::Declare(AnnouncementKind::Belote));
            }
            if can_declare_rebelote(player, trump) {
                return Ok(BotAction::Declare(AnnouncementKind::Rebelote));
            }
        }

        let legal = state.legal_plays_for(seat);
        if legal.is_empty() {
            return Err(BotError::NoLegalAction);
        }
        let lowest = |cards: &[Card]| -> Option<Card> {
            cards
                .iter()
                .copied()
                .min_by_key(|&c| relative_strength(c, trump))
        };

        let card = match Self::trick_leader(&state.current_trick, trump) {
            // Leading: push the strongest card and force the table.
            None => legal
                .iter()
                .copied()
                .max_by_key(|&c| relative_strength(c, trump)),
            Some(best) => {
                let lead = state.lead_suit().unwrap_or(best.card.suit);
                if Team::of(best.seat) == Team::of(seat) {
                    // Partner holds the trick; keep the cheap cards moving.
                    lowest(&legal)
                } else {
                    let winners: Vec<Card> = legal
                        .iter()
                        .copied()
                        .filter(|&c| card_beats(c, best.card, lead, trump))
                        .collect();
                    // Cheapest card that still takes the trick, else discard low.
                    lowest(&winners).or_else(|| lowest(&legal))
                }
            }
        };
        card.map(BotAction::Play).ok_or(BotError::NoLegalAction)
    }
}

impl BotPlayer for HeuristicBot {
    fn name(&self) -> &'static str {
        "heuristic"
    }

    fn decide(&self, state: &Match, seat: Seat) -> Result<BotAction, BotError> {
        match state.phase {
            Phase::Bidding => self.choose_bid(state, seat),
            Phase::Playing => self.choose_play(state, seat),
            Phase::Waiting | Phase::Ended => Err(BotError::NoLegalAction),
        }
    }
}
