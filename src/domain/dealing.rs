//! Deterministic shuffling and dealing.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::domain::cards::{full_deck, Card, DECK_SIZE, HAND_SIZE};
use crate::domain::state::{Match, SEATS};
use crate::errors::domain::DomainError;

/// Derive the shuffle seed for one deal from the match's base seed.
///
/// Same match seed + deal number always reproduces the same hands, which is
/// what makes a match replayable from its event log.
pub fn derive_deal_seed(match_seed: u64, deal_no: u32) -> u64 {
    match_seed
        .wrapping_add((deal_no as u64).wrapping_mul(1_000_000))
        .wrapping_add(1)
}

/// Fisher-Yates shuffle with a seeded RNG.
pub fn shuffle(deck: &mut [Card], seed: u64) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    deck.shuffle(&mut rng);
}

/// Partition a pre-shuffled 32-card deck into four hands of eight, assigned
/// in seat order. Clears each player's per-round announcements.
pub fn deal(state: &mut Match, deck: Vec<Card>) -> Result<(), DomainError> {
    if state.players.len() != SEATS {
        return Err(DomainError::capacity(format!(
            "cannot deal to {} players, need {SEATS}",
            state.players.len()
        )));
    }
    if deck.len() != DECK_SIZE {
        return Err(DomainError::capacity(format!(
            "cannot deal a {}-card deck, need {DECK_SIZE}",
            deck.len()
        )));
    }

    for player in state.players.iter_mut() {
        let start = player.seat as usize * HAND_SIZE;
        let mut hand = deck[start..start + HAND_SIZE].to_vec();
        hand.sort();
        player.hand = hand;
        player.announcements.clear();
    }
    Ok(())
}

/// Shuffle a fresh deck with the seed derived for the next deal and hand the
/// cards out. Bumps the match's deal counter.
pub fn deal_next(state: &mut Match) -> Result<(), DomainError> {
    let seed = derive_deal_seed(state.rng_seed, state.deal_no);
    let mut deck = full_deck();
    shuffle(&mut deck, seed);
    deal(state, deck)?;
    state.deal_no += 1;
    Ok(())
}
