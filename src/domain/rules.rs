//! Pure rules functions: play legality, trick resolution, scoring and
//! settlement arithmetic. No state mutation, no I/O; the state machine in
//! `domain::engine` is the only caller that turns these values into
//! transitions.

use crate::domain::bidding::{BidValue, BID_STEP, MAX_BID, MIN_BID};
use crate::domain::cards::{
    card_beats, card_points, hand_has_suit, Card, Rank, Suit,
};
use crate::domain::state::{AnnouncementKind, Player};

/// Bonus for winning the last trick of a round (dix de der).
pub const LAST_TRICK_BONUS: u16 = 10;
/// Bonus per declared belote/rebelote announcement.
pub const ANNOUNCEMENT_BONUS: u16 = 20;
/// Card points in a round plus the last-trick bonus, for any trump suit.
pub const ROUND_POINT_TOTAL: u16 = 162;

/// Whether `card` may be played from `hand` onto `trick_so_far`.
///
/// An empty trick accepts anything. Otherwise the lead suit must be
/// followed when the hand holds it; a hand void in the lead suit may cut or
/// discard freely (overtrumping is deliberately not required).
pub fn is_legal_play(card: Card, hand: &[Card], trick_so_far: &[Card], _trump: Suit) -> bool {
    let Some(lead) = trick_so_far.first().map(|c| c.suit) else {
        return true;
    };
    if hand_has_suit(hand, lead) {
        return card.suit == lead;
    }
    true
}

/// All cards of `hand` that `is_legal_play` accepts, in hand order.
/// Non-empty whenever the hand is non-empty.
pub fn legal_plays(hand: &[Card], trick_so_far: &[Card], trump: Suit) -> Vec<Card> {
    hand.iter()
        .copied()
        .filter(|&c| is_legal_play(c, hand, trick_so_far, trump))
        .collect()
}

/// Index (in play order) of the winning card of a complete trick.
pub fn trick_winner(trick: &[Card; 4], trump: Suit) -> usize {
    let lead = trick[0].suit;
    let mut best = 0usize;
    for i in 1..trick.len() {
        if card_beats(trick[i], trick[best], lead, trump) {
            best = i;
        }
    }
    best
}

/// Card points in a trick, trump-aware, plus 20 per declared announcement
/// attributed to this computation.
pub fn trick_points(trick: &[Card; 4], trump: Suit, declared_announcements: u16) -> u16 {
    let cards: u16 = trick.iter().map(|&c| card_points(c, trump)).sum();
    cards + ANNOUNCEMENT_BONUS * declared_announcements
}

/// Whether `value` is an acceptable next bid over the standing contract.
///
/// Numeric bids must be multiples of 10 in 80..=160 and strictly exceed the
/// current contract; capot exceeds any numeric bid.
pub fn is_legal_bid(value: BidValue, current: Option<BidValue>) -> bool {
    match value {
        BidValue::Points(p) => {
            if p < MIN_BID || p > MAX_BID || p % BID_STEP != 0 {
                return false;
            }
        }
        BidValue::Capot => {}
    }
    match current {
        None => true,
        Some(standing) => value > standing,
    }
}

/// All bid values that would currently be accepted.
pub fn legal_bid_values(current: Option<BidValue>) -> Vec<BidValue> {
    let mut values: Vec<BidValue> = (MIN_BID..=MAX_BID)
        .step_by(BID_STEP as usize)
        .map(BidValue::Points)
        .collect();
    values.push(BidValue::Capot);
    values.retain(|&v| is_legal_bid(v, current));
    values
}

fn holds(player: &Player, suit: Suit, rank: Rank) -> bool {
    player.hand.contains(&Card { suit, rank })
}

/// Belote: the holder of both trump Queen and King may declare once per
/// round, when playing the first of the pair.
pub fn can_declare_belote(player: &Player, trump: Suit) -> bool {
    holds(player, trump, Rank::Queen)
        && holds(player, trump, Rank::King)
        && !player.has_declared(AnnouncementKind::Belote)
}

/// Rebelote: follows a declared belote, while at least one of the pair is
/// still in hand, at most once per round.
pub fn can_declare_rebelote(player: &Player, trump: Suit) -> bool {
    player.has_declared(AnnouncementKind::Belote)
        && !player.has_declared(AnnouncementKind::Rebelote)
        && (holds(player, trump, Rank::Queen) || holds(player, trump, Rank::King))
}

/// Settlement delta for the contracting team.
///
/// Made contracts score the trick points taken times the coinche
/// multiplier; failed contracts lose the contract value times the
/// multiplier. Defenders are not credited in this model.
pub fn settle_contract(trick_points_won: u16, contract_points: u16, multiplier: i32) -> i32 {
    if trick_points_won >= contract_points {
        trick_points_won as i32 * multiplier
    } else {
        -(contract_points as i32) * multiplier
    }
}
