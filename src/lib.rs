//! Server-side engine for coinche, the four-player two-team trick-taking
//! card game.
//!
//! Layering:
//! - [`domain`] is pure: cards, dealing, rules, the `Match` aggregate and
//!   its command handlers. No IO, no clocks, no randomness beyond seeds
//!   carried in the state.
//! - [`ai`] holds automated players that pick from the legal-move queries.
//! - [`runtime`] wraps a match in a tokio task, persists snapshots through
//!   a [`runtime::GameStore`], schedules bot turns and drives the turn
//!   timer.
//!
//! All mutation goes through [`domain::Match::apply`], which validates the
//! whole command before touching state, so a rejection is always a no-op.

pub mod ai;
pub mod domain;
pub mod errors;
pub mod runtime;
pub mod telemetry;

pub use errors::EngineError;
