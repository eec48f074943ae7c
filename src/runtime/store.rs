//! Persistence collaborator contract and an in-memory implementation.

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::watch;
use uuid::Uuid;

use crate::domain::snapshot::MatchSnapshot;
use crate::errors::EngineError;

/// Where match snapshots go after every accepted command.
///
/// Implementations must refuse stale writes: a save whose version is not
/// newer than the stored one returns an error and changes nothing.
#[async_trait]
pub trait GameStore: Send + Sync {
    /// Register a new match. Fails if the id is already present.
    async fn create_game(&self, snapshot: MatchSnapshot) -> Result<(), EngineError>;

    async fn load_game(&self, game_id: Uuid) -> Result<MatchSnapshot, EngineError>;

    async fn save_game(&self, snapshot: MatchSnapshot) -> Result<(), EngineError>;

    /// Watch the latest snapshot of a match as saves land.
    async fn subscribe(
        &self,
        game_id: Uuid,
    ) -> Result<watch::Receiver<MatchSnapshot>, EngineError>;
}

/// Store backed by a process-local map. Used by tests and single-node runs.
#[derive(Default)]
pub struct InMemoryStore {
    games: DashMap<Uuid, watch::Sender<MatchSnapshot>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GameStore for InMemoryStore {
    async fn create_game(&self, snapshot: MatchSnapshot) -> Result<(), EngineError> {
        let game_id = snapshot.state.id;
        match self.games.entry(game_id) {
            Entry::Occupied(_) => Err(EngineError::store(format!(
                "game {game_id} already exists"
            ))),
            Entry::Vacant(slot) => {
                let (tx, _rx) = watch::channel(snapshot);
                slot.insert(tx);
                Ok(())
            }
        }
    }

    async fn load_game(&self, game_id: Uuid) -> Result<MatchSnapshot, EngineError> {
        let tx = self
            .games
            .get(&game_id)
            .ok_or(EngineError::GameNotFound { game_id })?;
        let snapshot = tx.borrow().clone();
        Ok(snapshot)
    }

    async fn save_game(&self, snapshot: MatchSnapshot) -> Result<(), EngineError> {
        let game_id = snapshot.state.id;
        let tx = self
            .games
            .get(&game_id)
            .ok_or(EngineError::GameNotFound { game_id })?;
        let stale = !snapshot.is_newer_than(&tx.borrow());
        if stale {
            return Err(EngineError::store(format!(
                "stale write for game {game_id} at version {}",
                snapshot.version
            )));
        }
        // send_replace stores the value even when nobody subscribes.
        tx.send_replace(snapshot);
        Ok(())
    }

    async fn subscribe(
        &self,
        game_id: Uuid,
    ) -> Result<watch::Receiver<MatchSnapshot>, EngineError> {
        let tx = self
            .games
            .get(&game_id)
            .ok_or(EngineError::GameNotFound { game_id })?;
        Ok(tx.subscribe())
    }
}
