//! Core card types and trump-aware strength/point tables.
//!
//! Coinche is played with a 32-card deck (7 through Ace in four suits).
//! Rank order and point values both depend on whether the card's suit is
//! trump for the round: the 9 and Jack are promoted to the top of the trump
//! order and carry 14 and 20 points there.

use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum Suit {
    Clubs,
    Diamonds,
    Hearts,
    Spades,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Clubs, Suit::Diamonds, Suit::Hearts, Suit::Spades];
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum Rank {
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
    Ace,
}

impl Rank {
    pub const ALL: [Rank; 8] = [
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
        Rank::Ace,
    ];
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Card {
    pub suit: Suit,
    pub rank: Rank,
}

// Note: Ord on Card is only for stable sorting of hands: suit order C<D<H<S
// then natural rank order. Trick resolution must go through strength
// functions that know the trump and lead suits.
impl Ord for Card {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        match self.suit.cmp(&other.suit) {
            std::cmp::Ordering::Equal => self.rank.cmp(&other.rank),
            ord => ord,
        }
    }
}

impl PartialOrd for Card {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

pub const DECK_SIZE: usize = 32;
pub const HAND_SIZE: usize = 8;

/// Full 32-card deck in suit-then-rank order (shuffled before dealing).
pub fn full_deck() -> Vec<Card> {
    let mut deck = Vec::with_capacity(DECK_SIZE);
    for suit in Suit::ALL {
        for rank in Rank::ALL {
            deck.push(Card { suit, rank });
        }
    }
    deck
}

/// Strength index within the trump order (low to high): 7,8,Q,K,10,A,9,J.
pub fn trump_strength(rank: Rank) -> u8 {
    match rank {
        Rank::Seven => 0,
        Rank::Eight => 1,
        Rank::Queen => 2,
        Rank::King => 3,
        Rank::Ten => 4,
        Rank::Ace => 5,
        Rank::Nine => 6,
        Rank::Jack => 7,
    }
}

/// Strength index within the plain-suit order (low to high): 7,8,9,J,Q,K,10,A.
pub fn plain_strength(rank: Rank) -> u8 {
    match rank {
        Rank::Seven => 0,
        Rank::Eight => 1,
        Rank::Nine => 2,
        Rank::Jack => 3,
        Rank::Queen => 4,
        Rank::King => 5,
        Rank::Ten => 6,
        Rank::Ace => 7,
    }
}

/// Point value of a trump card.
pub fn trump_points(rank: Rank) -> u16 {
    match rank {
        Rank::Seven | Rank::Eight => 0,
        Rank::Nine => 14,
        Rank::Ten => 10,
        Rank::Jack => 20,
        Rank::Queen => 3,
        Rank::King => 4,
        Rank::Ace => 11,
    }
}

/// Point value of a non-trump card.
pub fn plain_points(rank: Rank) -> u16 {
    match rank {
        Rank::Seven | Rank::Eight | Rank::Nine => 0,
        Rank::Ten => 10,
        Rank::Jack => 2,
        Rank::Queen => 3,
        Rank::King => 4,
        Rank::Ace => 11,
    }
}

/// Point value of `card` under the round's trump suit.
pub fn card_points(card: Card, trump: Suit) -> u16 {
    if card.suit == trump {
        trump_points(card.rank)
    } else {
        plain_points(card.rank)
    }
}

/// Strength of a card relative to trump only, ignoring the lead suit.
///
/// Any trump outranks any non-trump; within a category the suit-specific
/// order applies. Used for "highest card" / "lowest card" selection when a
/// single total order over a hand is needed (bot play, timeout defaults).
pub fn relative_strength(card: Card, trump: Suit) -> u8 {
    if card.suit == trump {
        8 + trump_strength(card.rank)
    } else {
        plain_strength(card.rank)
    }
}

pub fn hand_has_suit(hand: &[Card], suit: Suit) -> bool {
    hand.iter().any(|c| c.suit == suit)
}

/// Whether `a` beats `b` in a trick where `lead` was led and `trump` is trump.
///
/// Trump beats non-trump; within trumps the trump order decides; within the
/// lead suit the plain order decides; a card of neither suit beats nothing.
pub fn card_beats(a: Card, b: Card, lead: Suit, trump: Suit) -> bool {
    let a_trump = a.suit == trump;
    let b_trump = b.suit == trump;
    if a_trump && !b_trump {
        return true;
    }
    if b_trump && !a_trump {
        return false;
    }
    if a_trump && b_trump {
        return trump_strength(a.rank) > trump_strength(b.rank);
    }
    let a_follows = a.suit == lead;
    let b_follows = b.suit == lead;
    if a_follows && !b_follows {
        return true;
    }
    if b_follows && !a_follows {
        return false;
    }
    if a_follows && b_follows {
        return plain_strength(a.rank) > plain_strength(b.rank);
    }
    false
}
