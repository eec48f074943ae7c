//! Bot that picks uniformly among legal actions. Baseline for tests.

use parking_lot::Mutex;
use rand::prelude::*;
use rand::rngs::StdRng;

use super::{BotAction, BotError, BotPlayer};
use crate::domain::cards::Suit;
use crate::domain::state::{Match, Phase, Seat};

pub struct RandomBot {
    /// Interior mutability: `decide` takes `&self` but the RNG advances.
    rng: Mutex<StdRng>,
}

impl RandomBot {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_os_rng(),
        };
        Self {
            rng: Mutex::new(rng),
        }
    }
}

impl BotPlayer for RandomBot {
    fn name(&self) -> &'static str {
        "random"
    }

    fn decide(&self, state: &Match, seat: Seat) -> Result<BotAction, BotError> {
        let mut rng = self.rng.lock();

        match state.phase {
            Phase::Bidding => {
                // Pass most of the time so auctions terminate.
                if rng.random_bool(0.7) {
                    return Ok(BotAction::Pass);
                }
                let values = state.legal_bids();
                let Some(&value) = values.choose(&mut *rng) else {
                    return Ok(BotAction::Pass);
                };
                let Some(&suit) = Suit::ALL.choose(&mut *rng) else {
                    return Ok(BotAction::Pass);
                };
                Ok(BotAction::Bid { value, suit })
            }
            Phase::Playing => {
                let legal = state.legal_plays_for(seat);
                let card = legal.choose(&mut *rng).ok_or(BotError::NoLegalAction)?;
                Ok(BotAction::Play(*card))
            }
            Phase::Waiting | Phase::Ended => Err(BotError::NoLegalAction),
        }
    }
}
