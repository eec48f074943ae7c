//! Registry of live match tasks.

use std::sync::Arc;

use dashmap::DashMap;
use rand::Rng;
use tracing::info;
use uuid::Uuid;

use crate::ai::BotPlayer;
use crate::domain::snapshot::MatchSnapshot;
use crate::domain::state::{Match, MatchConfig};
use crate::errors::EngineError;
use crate::runtime::match_task::{self, MatchHandle};
use crate::runtime::store::GameStore;

/// Creates and tracks per-match tasks. One per process.
pub struct MatchRegistry {
    store: Arc<dyn GameStore>,
    bot: Arc<dyn BotPlayer>,
    matches: DashMap<Uuid, MatchHandle>,
}

impl MatchRegistry {
    pub fn new(store: Arc<dyn GameStore>, bot: Arc<dyn BotPlayer>) -> Self {
        Self {
            store,
            bot,
            matches: DashMap::new(),
        }
    }

    /// Create a fresh match, persist its initial snapshot and start its task.
    pub async fn create_match(&self, config: MatchConfig) -> Result<MatchHandle, EngineError> {
        let game_id = Uuid::new_v4();
        let seed: u64 = rand::rng().random();
        let state = Match::new(game_id, config, seed);
        self.store
            .create_game(MatchSnapshot::capture(&state))
            .await?;

        let handle = match_task::spawn(state, self.store.clone(), self.bot.clone());
        self.matches.insert(game_id, handle.clone());
        info!(game_id = %game_id, "match created");
        Ok(handle)
    }

    /// Restart the task for a stored match, e.g. after a process restart.
    pub async fn resume_match(&self, game_id: Uuid) -> Result<MatchHandle, EngineError> {
        if let Some(handle) = self.matches.get(&game_id) {
            return Ok(handle.clone());
        }
        let state = self.store.load_game(game_id).await?.restore();
        let handle = match_task::spawn(state, self.store.clone(), self.bot.clone());
        self.matches.insert(game_id, handle.clone());
        info!(game_id = %game_id, "match resumed");
        Ok(handle)
    }

    pub fn get(&self, game_id: Uuid) -> Result<MatchHandle, EngineError> {
        self.matches
            .get(&game_id)
            .map(|h| h.clone())
            .ok_or(EngineError::GameNotFound { game_id })
    }

    /// Stop and forget a match. The snapshot stays in the store, so it can
    /// be resumed later.
    pub fn remove(&self, game_id: Uuid) {
        if let Some((_, handle)) = self.matches.remove(&game_id) {
            handle.close();
        }
    }
}
