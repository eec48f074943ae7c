//! Domain-level error type used by the match state machine.
//!
//! This error type is transport- and storage-agnostic. The runtime layer
//! converts it into `EngineError` for callers; the kinds stay observable so
//! clients can tell a wrong-phase rejection from a wrong-turn one.

use std::error::Error;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Rejection raised by a command handler before any state mutation.
///
/// Every accepted command fully applies; every rejected command leaves the
/// match untouched and surfaces one of these kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Command issued in a phase that does not permit it.
    Phase(String),
    /// Actor is not the active seat.
    Turn { expected: u8, got: u8 },
    /// Payload violates a rules-engine constraint (illegal card, illegal
    /// bid value, duplicate announcement, ...).
    IllegalContent(String),
    /// Seat table or deck capacity violated.
    Capacity(String),
    /// Command references a player or resource the match does not know.
    NotFound(String),
}

impl Display for DomainError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            DomainError::Phase(d) => write!(f, "phase error: {d}"),
            DomainError::Turn { expected, got } => {
                write!(f, "turn error: seat {got} acted, seat {expected} is active")
            }
            DomainError::IllegalContent(d) => write!(f, "illegal content: {d}"),
            DomainError::Capacity(d) => write!(f, "capacity error: {d}"),
            DomainError::NotFound(d) => write!(f, "not found: {d}"),
        }
    }
}

impl Error for DomainError {}

impl DomainError {
    pub fn phase(detail: impl Into<String>) -> Self {
        Self::Phase(detail.into())
    }

    pub fn turn(expected: u8, got: u8) -> Self {
        Self::Turn { expected, got }
    }

    pub fn illegal(detail: impl Into<String>) -> Self {
        Self::IllegalContent(detail.into())
    }

    pub fn capacity(detail: impl Into<String>) -> Self {
        Self::Capacity(detail.into())
    }

    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::NotFound(detail.into())
    }
}
