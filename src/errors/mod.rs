//! Error types: domain-level rejections and runtime-boundary failures.

pub mod domain;

use thiserror::Error;
use uuid::Uuid;

use crate::errors::domain::DomainError;

/// Runtime-boundary error. Wraps domain rejections and adds the failure
/// modes of the collaborator layer (registry lookups, closed channels,
/// store operations).
#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("game not found: {game_id}")]
    GameNotFound { game_id: Uuid },
    #[error("match task is no longer running")]
    MatchClosed,
    #[error("store error: {detail}")]
    Store { detail: String },
}

impl EngineError {
    pub fn store(detail: impl Into<String>) -> Self {
        Self::Store {
            detail: detail.into(),
        }
    }
}
